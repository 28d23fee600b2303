use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};

use crate::{
    domain::OrderStatus,
    dto::orders::{CreateOrderRequest, OrderList, OrderWithItems, UpdateOrderStatusRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Order,
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_order))
        .route("/my-orders", get(my_orders))
        .route("/customer/{customer_id}", get(orders_by_customer))
        .route("/restaurant/{restaurant_id}", get(orders_by_restaurant))
        .route(
            "/restaurant/{restaurant_id}/active",
            get(active_orders_by_restaurant),
        )
        .route("/status/{status}", get(orders_by_status))
        .route("/{id}", get(get_order))
        .route("/{id}/status", put(update_order_status))
        .route("/{id}/cancel", put(cancel_order))
        .route("/{id}/delivery/{delivery_id}", put(attach_delivery))
        .route("/{id}/payment/{payment_id}", put(attach_payment))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order created", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Invalid items"),
        (status = 404, description = "Restaurant not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::create_order(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/my-orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<OrderStatus>, Query, description = "Filter by status"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn my_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::my_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/orders/customer/{customer_id}", security(("bearer_auth" = [])), tag = "Orders")]
pub async fn orders_by_customer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(customer_id): Path<i64>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::orders_by_customer(&state, &user, customer_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/orders/restaurant/{restaurant_id}", security(("bearer_auth" = [])), tag = "Orders")]
pub async fn orders_by_restaurant(
    State(state): State<AppState>,
    user: AuthUser,
    Path(restaurant_id): Path<i64>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::orders_by_restaurant(&state, &user, restaurant_id, false).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/orders/restaurant/{restaurant_id}/active", security(("bearer_auth" = [])), tag = "Orders")]
pub async fn active_orders_by_restaurant(
    State(state): State<AppState>,
    user: AuthUser,
    Path(restaurant_id): Path<i64>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::orders_by_restaurant(&state, &user, restaurant_id, true).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/status/{status}",
    params(
        ("status" = OrderStatus, Path, description = "Order status")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn orders_by_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(status): Path<OrderStatus>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::orders_by_status(&state, &user, status).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = i64, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order with items", body = ApiResponse<OrderWithItems>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::get_order(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}/status",
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Updated order", body = ApiResponse<Order>),
        (status = 409, description = "Illegal transition")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::update_order_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}/cancel",
    responses(
        (status = 200, description = "Cancelled order", body = ApiResponse<Order>),
        (status = 409, description = "Order already delivered")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::cancel_order(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(put, path = "/api/orders/{id}/delivery/{delivery_id}", security(("bearer_auth" = [])), tag = "Orders")]
pub async fn attach_delivery(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, delivery_id)): Path<(i64, i64)>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::attach_delivery(&state, &user, id, delivery_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(put, path = "/api/orders/{id}/payment/{payment_id}", security(("bearer_auth" = [])), tag = "Orders")]
pub async fn attach_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, payment_id)): Path<(i64, i64)>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::attach_payment(&state, &user, id, payment_id).await?;
    Ok(Json(resp))
}
