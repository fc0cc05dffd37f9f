//! Order CRUD and add-item endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{OrderId, UserId};
use domain::{DomainError, NewOrder, Order, OrderItem, OrderStatus, OrderUpdate};
use fulfillment::{AddOrderItem, FulfillmentError, OrderFulfillment};
use serde::{Deserialize, Serialize};
use store::{OrderQuery, OrderStore, UnitOfWork};

use crate::AppStore;
use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: UnitOfWork> {
    pub store: S,
    pub fulfillment: OrderFulfillment<S>,
}

impl<S: AppStore> AppState<S> {
    /// Builds the state over one store shared by the handlers and the workflow.
    pub fn new(store: S) -> Self {
        Self {
            fulfillment: OrderFulfillment::new(store.clone()),
            store,
        }
    }
}

// -- Request types --

/// Body of `POST /orders/{id}/order`.
///
/// Missing fields read as zero and fail validation.
#[derive(Deserialize)]
pub struct AddItemRequest {
    #[serde(default)]
    pub product_id: i32,
    #[serde(default)]
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub status: Option<String>,
    pub user: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct MessageResponse {
    pub msg: &'static str,
}

impl MessageResponse {
    fn new(msg: &'static str) -> Json<Self> {
        Json(Self { msg })
    }
}

// -- Handlers --

/// GET /orders: list every order.
#[tracing::instrument(skip(state))]
pub async fn list<S: AppStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let orders = state.store.query_orders(OrderQuery::new()).await?;
    Ok(Json(orders))
}

/// POST /orders: create an order; `total` and `status` are optional.
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: AppStore>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<NewOrder>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(req) = payload?;
    if !req.user_id.is_valid() {
        return Err(DomainError::MissingId { field: "user_id" }.into());
    }

    let order = state.store.create_order(req).await?;
    tracing::info!(order_id = %order.id, user_id = %order.user_id, "order created");

    Ok((StatusCode::CREATED, MessageResponse::new("Created successfully")))
}

/// GET /orders/search: orders by `status`, or by `user` when no status is given.
#[tracing::instrument(skip(state))]
pub async fn search<S: AppStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let status = params.status.filter(|s| !s.is_empty());
    let user = params.user.filter(|u| !u.is_empty());

    let query = match (status, user) {
        (Some(status), _) => OrderQuery::for_status(status.parse::<OrderStatus>()?),
        (None, Some(user)) => {
            let user_id: i32 = user
                .parse()
                .map_err(|e| ApiError::BadRequest(format!("Invalid user id: {e}")))?;
            OrderQuery::for_user(UserId::new(user_id))
        }
        (None, None) => {
            return Err(ApiError::BadRequest(
                "either status or user query parameter is required".to_string(),
            ));
        }
    };

    let orders = state.store.query_orders(query).await?;
    Ok(Json(orders))
}

/// GET /orders/{id}: load one order.
#[tracing::instrument(skip(state))]
pub async fn get<S: AppStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = find_order(&state.store, order_id).await?;
    Ok(Json(order))
}

/// PUT /orders/{id}: replace the fields present in the body.
#[tracing::instrument(skip(state, payload))]
pub async fn update<S: AppStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    payload: Result<Json<OrderUpdate>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let Json(update) = payload?;

    match state.fulfillment.edit_order(order_id, &update).await {
        Ok(_) => Ok(MessageResponse::new("Updated successfully")),
        Err(FulfillmentError::OrderNotFound(id)) => Err(not_found(id)),
        Err(e) => Err(e.into()),
    }
}

/// DELETE /orders/{id}: delete an order and its line items.
#[tracing::instrument(skip(state))]
pub async fn delete<S: AppStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    if !state.store.delete_order(order_id).await? {
        return Err(not_found(order_id));
    }

    tracing::info!(%order_id, "order deleted");
    Ok(MessageResponse::new("Deleted successfully"))
}

/// POST /orders/{id}/order: reserve stock and add a line item to the order.
#[tracing::instrument(skip(state, payload))]
pub async fn add_item<S: AppStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    payload: Result<Json<AddItemRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let order_id = parse_order_id(&id)?;
    let Json(req) = payload?;
    let cmd = AddOrderItem::parse(order_id.as_i32(), req.product_id, req.quantity)?;

    state.fulfillment.add_order_item(cmd).await?;

    Ok((StatusCode::CREATED, MessageResponse::new("Created successfully")))
}

/// GET /orders/{id}/items: the line items of an order, oldest first.
#[tracing::instrument(skip(state))]
pub async fn items<S: AppStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<OrderItem>>, ApiError> {
    let order_id = parse_order_id(&id)?;
    find_order(&state.store, order_id).await?;

    let items = state.store.get_items_for_order(order_id).await?;
    Ok(Json(items))
}

async fn find_order<S: AppStore>(store: &S, id: OrderId) -> Result<Order, ApiError> {
    store.get_order(id).await?.ok_or_else(|| not_found(id))
}

fn not_found(id: OrderId) -> ApiError {
    ApiError::NotFound(format!("Order {id} not found"))
}

fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    let id: i32 = id
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))?;
    Ok(OrderId::new(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_order_id() {
        assert_eq!(parse_order_id("7").unwrap(), OrderId::new(7));
        assert!(matches!(
            parse_order_id("abc"),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn test_add_item_request_defaults_missing_fields() {
        let req: AddItemRequest = serde_json::from_str(r#"{"quantity": 2}"#).unwrap();
        assert_eq!(req.product_id, 0);
        assert_eq!(req.quantity, 2);
    }
}
