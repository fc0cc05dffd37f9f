use common::UserId;
use domain::{Order, OrderStatus, Product};

/// Builder for querying orders by predicate.
///
/// Filters are combined with AND. An empty query matches every order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderQuery {
    /// Filter by status.
    pub status: Option<OrderStatus>,

    /// Filter by owning user.
    pub user_id: Option<UserId>,

    /// Maximum number of orders to return.
    pub limit: Option<usize>,

    /// Number of orders to skip.
    pub offset: Option<usize>,
}

impl OrderQuery {
    /// Creates a new empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query for orders in a given status.
    pub fn for_status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Creates a query for a user's orders.
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Default::default()
        }
    }

    /// Filters by status.
    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Filters by owning user.
    pub fn user_id(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Limits the number of results.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips a number of results.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Returns true if the order satisfies every filter.
    pub fn matches(&self, order: &Order) -> bool {
        self.status.is_none_or(|status| order.status == status)
            && self.user_id.is_none_or(|user_id| order.user_id == user_id)
    }
}

/// Builder for querying products by predicate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    /// Case-insensitive substring of the product name.
    pub name_contains: Option<String>,

    /// Exact category.
    pub category: Option<String>,

    /// Maximum number of products to return.
    pub limit: Option<usize>,

    /// Number of products to skip.
    pub offset: Option<usize>,
}

impl ProductQuery {
    /// Creates a new empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by a case-insensitive name fragment.
    pub fn name_contains(mut self, fragment: impl Into<String>) -> Self {
        self.name_contains = Some(fragment.into());
        self
    }

    /// Filters by category.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Limits the number of results.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips a number of results.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Returns true if the product satisfies every filter.
    pub fn matches(&self, product: &Product) -> bool {
        let name_ok = self.name_contains.as_ref().is_none_or(|fragment| {
            product
                .name
                .to_lowercase()
                .contains(&fragment.to_lowercase())
        });
        let category_ok = self
            .category
            .as_ref()
            .is_none_or(|category| &product.category == category);
        name_ok && category_ok
    }
}

/// Applies `offset` then `limit` to an already filtered, ordered iterator.
pub(crate) fn paginate<T>(
    items: impl Iterator<Item = T>,
    offset: Option<usize>,
    limit: Option<usize>,
) -> Vec<T> {
    items
        .skip(offset.unwrap_or(0))
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use common::{Money, OrderId, ProductId};

    use super::*;

    fn order(user: i32, status: OrderStatus) -> Order {
        Order {
            id: OrderId::new(1),
            user_id: UserId::new(user),
            total: Money::zero(),
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_order_query_matches_everything() {
        assert!(OrderQuery::new().matches(&order(1, OrderStatus::Done)));
    }

    #[test]
    fn order_filters_combine_with_and() {
        let query = OrderQuery::for_user(UserId::new(1)).status(OrderStatus::New);
        assert!(query.matches(&order(1, OrderStatus::New)));
        assert!(!query.matches(&order(1, OrderStatus::Done)));
        assert!(!query.matches(&order(2, OrderStatus::New)));
    }

    #[test]
    fn product_name_filter_ignores_case() {
        let product = Product {
            id: ProductId::new(1),
            name: "Blue Widget".to_string(),
            description: String::new(),
            price: Money::from_cents(100),
            quantity: 1,
            category: "tools".to_string(),
            created_at: Utc::now(),
        };
        assert!(ProductQuery::new().name_contains("widget").matches(&product));
        assert!(!ProductQuery::new().category("toys").matches(&product));
    }

    #[test]
    fn paginate_skips_then_takes() {
        let page = paginate(1..=10, Some(2), Some(3));
        assert_eq!(page, vec![3, 4, 5]);
    }
}
