pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::{FailPoint, InMemoryStore, InMemoryTransaction};
pub use postgres::{PostgresStore, PostgresTransaction};
pub use query::{OrderQuery, ProductQuery};
pub use store::{OrderStore, ProductStore, StoreTransaction, UnitOfWork};
