use serde::{Deserialize, Serialize};

/// Declares a row identifier backed by the `SERIAL` primary key of its table.
///
/// Identifiers are assigned by the store; zero and negative values never
/// name an existing row.
macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Wraps a raw database id.
            pub fn new(id: i32) -> Self {
                Self(id)
            }

            /// Returns the raw database id.
            pub fn as_i32(&self) -> i32 {
                self.0
            }

            /// Returns true if the id could name a stored row.
            pub fn is_valid(&self) -> bool {
                self.0 > 0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

row_id!(
    /// Identifier of a row in `products`.
    ProductId
);

row_id!(
    /// Identifier of a row in `orders`.
    OrderId
);

row_id!(
    /// Identifier of a row in `order_items`.
    OrderItemId
);

row_id!(
    /// Identifier of the user owning an order. Users live in another service.
    UserId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_id_preserves_value() {
        let id = ProductId::new(42);
        assert_eq!(id.as_i32(), 42);
        assert_eq!(i32::from(id), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn zero_and_negative_ids_are_invalid() {
        assert!(!OrderId::new(0).is_valid());
        assert!(!OrderId::new(-3).is_valid());
        assert!(OrderId::new(1).is_valid());
    }

    #[test]
    fn row_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&UserId::new(7)).unwrap();
        assert_eq!(json, "7");
        let id: UserId = serde_json::from_str("7").unwrap();
        assert_eq!(id, UserId::new(7));
    }
}
