//! Order CRUD endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use common::{Money, Order, OrderId, UserId};
use coordinator::{
    CreateOrder, MessagePublisher, OrderCache, OrderCoordinator, Outcome, Status, UpdateOrder,
};
use order_store::{OrderStore, Page, PageRequest};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Response header carrying the number of tolerated cache/publisher failures.
pub const WARNINGS_HEADER: &str = "x-order-warnings";

const DEFAULT_PAGE_SIZE: u32 = 20;

/// Shared application state accessible from all handlers.
pub struct AppState<S, C, P>
where
    S: OrderStore,
    C: OrderCache,
    P: MessagePublisher,
{
    pub coordinator: OrderCoordinator<S, C, P>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct OrderRequest {
    pub product: String,
    pub quantity: u32,
    pub price_cents: i64,
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub user_id: String,
    pub product: String,
    pub quantity: u32,
    pub price_cents: i64,
    pub total_cents: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.to_string(),
            user_id: order.user_id.to_string(),
            total_cents: order.total().cents(),
            product: order.product.to_string(),
            quantity: order.quantity,
            price_cents: order.price.cents(),
            created_at: order.created_at.to_rfc3339(),
            updated_at: order.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct OrderPageResponse {
    pub items: Vec<OrderResponse>,
    pub page: u32,
    pub size: u32,
    pub total_items: u64,
    pub total_pages: u64,
}

impl From<Page<Order>> for OrderPageResponse {
    fn from(page: Page<Order>) -> Self {
        let page = page.map(OrderResponse::from);
        Self {
            items: page.items,
            page: page.page,
            size: page.size,
            total_items: page.total_items,
            total_pages: page.total_pages,
        }
    }
}

// -- Handlers --

/// POST /users/:user_id/orders: create an order for a user.
#[tracing::instrument(skip(state, body))]
pub async fn create<S, C, P>(
    State(state): State<Arc<AppState<S, C, P>>>,
    Path(user_id): Path<String>,
    body: Result<Json<OrderRequest>, JsonRejection>,
) -> Result<Response, ApiError>
where
    S: OrderStore + 'static,
    C: OrderCache + 'static,
    P: MessagePublisher + 'static,
{
    let user_id = UserId::from_uuid(parse_uuid(&user_id)?);
    let Json(req) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let outcome = state
        .coordinator
        .create_order(CreateOrder::new(
            user_id,
            req.product,
            req.quantity,
            Money::from_cents(req.price_cents),
        ))
        .await?;

    Ok(respond(outcome.map(OrderResponse::from)))
}

/// GET /orders/:id: read an order through the cache.
#[tracing::instrument(skip(state))]
pub async fn get<S, C, P>(
    State(state): State<Arc<AppState<S, C, P>>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError>
where
    S: OrderStore + 'static,
    C: OrderCache + 'static,
    P: MessagePublisher + 'static,
{
    let order_id = parse_order_id(&id)?;
    let outcome = state.coordinator.get_order(order_id).await?;

    Ok(respond(outcome.map(OrderResponse::from)))
}

/// GET /users/:user_id/orders: one page of a user's orders.
#[tracing::instrument(skip(state, query))]
pub async fn list<S, C, P>(
    State(state): State<Arc<AppState<S, C, P>>>,
    Path(user_id): Path<String>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Response, ApiError>
where
    S: OrderStore + 'static,
    C: OrderCache + 'static,
    P: MessagePublisher + 'static,
{
    let user_id = UserId::from_uuid(parse_uuid(&user_id)?);
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let request = PageRequest::new(
        query.page.unwrap_or(0),
        query.size.unwrap_or(DEFAULT_PAGE_SIZE),
    );

    let outcome = state.coordinator.list_orders(user_id, request).await?;

    Ok(respond(outcome.map(OrderPageResponse::from)))
}

/// PUT /orders/:id: replace an order's product, quantity and price.
#[tracing::instrument(skip(state, body))]
pub async fn update<S, C, P>(
    State(state): State<Arc<AppState<S, C, P>>>,
    Path(id): Path<String>,
    body: Result<Json<OrderRequest>, JsonRejection>,
) -> Result<Response, ApiError>
where
    S: OrderStore + 'static,
    C: OrderCache + 'static,
    P: MessagePublisher + 'static,
{
    let order_id = parse_order_id(&id)?;
    let Json(req) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let outcome = state
        .coordinator
        .update_order(UpdateOrder::new(
            order_id,
            req.product,
            Money::from_cents(req.price_cents),
            req.quantity,
        ))
        .await?;

    Ok(respond(outcome.map(OrderResponse::from)))
}

/// DELETE /orders/:id: delete an order.
#[tracing::instrument(skip(state))]
pub async fn delete<S, C, P>(
    State(state): State<Arc<AppState<S, C, P>>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError>
where
    S: OrderStore + 'static,
    C: OrderCache + 'static,
    P: MessagePublisher + 'static,
{
    let order_id = parse_order_id(&id)?;
    let outcome = state.coordinator.delete_order(order_id).await?;

    Ok(respond(outcome))
}

/// Renders an outcome with its status code and warning count header.
fn respond<T: Serialize>(outcome: Outcome<T>) -> Response {
    let mut response = match outcome.status {
        Status::Created => (StatusCode::CREATED, Json(outcome.value)).into_response(),
        Status::Ok => (StatusCode::OK, Json(outcome.value)).into_response(),
        Status::NoContent => StatusCode::NO_CONTENT.into_response(),
    };

    if !outcome.warnings.is_empty() {
        response.headers_mut().insert(
            WARNINGS_HEADER,
            HeaderValue::from(outcome.warnings.len()),
        );
    }
    response
}

fn parse_uuid(id: &str) -> Result<uuid::Uuid, ApiError> {
    uuid::Uuid::parse_str(id).map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))
}

fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    Ok(OrderId::from(parse_uuid(id)?))
}
