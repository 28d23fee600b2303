use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};

use crate::{
    dto::deliveries::{
        AssignDeliveryRequest, CreateDeliveryRequest, DeliveryList, OptimalDeliveriesQuery,
        UpdateDeliveryStatusRequest, UpdateEstimatedTimeRequest, UpdateLocationRequest,
        UpdateNotesRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Delivery,
    response::ApiResponse,
    services::delivery_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_delivery))
        .route("/track/{code}", get(track_delivery))
        .route("/order/{order_id}", get(delivery_by_order))
        .route("/my-deliveries", get(my_deliveries))
        .route("/my-active-deliveries", get(my_active_deliveries))
        .route("/pending", get(pending_deliveries))
        .route("/unassigned", get(unassigned_deliveries))
        .route("/optimal", get(optimal_deliveries))
        .route("/{id}", get(get_delivery))
        .route("/{id}/assign", put(assign_delivery))
        .route("/{id}/accept", put(accept_delivery))
        .route("/{id}/status", put(update_delivery_status))
        .route("/{id}/location", put(update_location))
        .route("/{id}/estimated-time", put(update_estimated_time))
        .route("/{id}/notes", put(update_notes))
        .route("/{id}/cancel", put(cancel_delivery))
}

#[utoipa::path(
    post,
    path = "/api/deliveries",
    request_body = CreateDeliveryRequest,
    responses(
        (status = 200, description = "Delivery created with tracking code", body = ApiResponse<Delivery>),
        (status = 409, description = "Delivery already exists for order")
    ),
    security(("bearer_auth" = [])),
    tag = "Deliveries"
)]
pub async fn create_delivery(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateDeliveryRequest>,
) -> AppResult<Json<ApiResponse<Delivery>>> {
    let resp = delivery_service::create_delivery(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/deliveries/track/{code}",
    params(
        ("code" = String, Path, description = "Tracking code")
    ),
    responses(
        (status = 200, description = "Delivery", body = ApiResponse<Delivery>),
        (status = 404, description = "Unknown tracking code")
    ),
    tag = "Deliveries"
)]
pub async fn track_delivery(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<ApiResponse<Delivery>>> {
    let resp = delivery_service::track_delivery(&state, code).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/deliveries/order/{order_id}", security(("bearer_auth" = [])), tag = "Deliveries")]
pub async fn delivery_by_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(order_id): Path<i64>,
) -> AppResult<Json<ApiResponse<Delivery>>> {
    let resp = delivery_service::delivery_by_order(&state, &user, order_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/deliveries/my-deliveries", security(("bearer_auth" = [])), tag = "Deliveries")]
pub async fn my_deliveries(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<DeliveryList>>> {
    let resp = delivery_service::my_deliveries(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/deliveries/my-active-deliveries", security(("bearer_auth" = [])), tag = "Deliveries")]
pub async fn my_active_deliveries(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<DeliveryList>>> {
    let resp = delivery_service::my_active_deliveries(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/deliveries/pending", security(("bearer_auth" = [])), tag = "Deliveries")]
pub async fn pending_deliveries(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<DeliveryList>>> {
    let resp = delivery_service::pending_deliveries(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/deliveries/unassigned", security(("bearer_auth" = [])), tag = "Deliveries")]
pub async fn unassigned_deliveries(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<DeliveryList>>> {
    let resp = delivery_service::unassigned_deliveries(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/deliveries/optimal",
    params(
        ("latitude" = f64, Query, description = "Courier latitude"),
        ("longitude" = f64, Query, description = "Courier longitude"),
        ("max" = Option<u64>, Query, description = "Maximum deliveries, default 5")
    ),
    security(("bearer_auth" = [])),
    tag = "Deliveries"
)]
pub async fn optimal_deliveries(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OptimalDeliveriesQuery>,
) -> AppResult<Json<ApiResponse<DeliveryList>>> {
    let resp = delivery_service::optimal_deliveries(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/deliveries/{id}",
    params(
        ("id" = i64, Path, description = "Delivery ID")
    ),
    security(("bearer_auth" = [])),
    tag = "Deliveries"
)]
pub async fn get_delivery(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Delivery>>> {
    let resp = delivery_service::get_delivery(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/deliveries/{id}/assign",
    request_body = AssignDeliveryRequest,
    responses(
        (status = 200, description = "Assigned delivery", body = ApiResponse<Delivery>),
        (status = 409, description = "Delivery is not pending")
    ),
    security(("bearer_auth" = [])),
    tag = "Deliveries"
)]
pub async fn assign_delivery(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<AssignDeliveryRequest>,
) -> AppResult<Json<ApiResponse<Delivery>>> {
    let resp = delivery_service::assign_delivery(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/deliveries/{id}/accept",
    responses(
        (status = 200, description = "Accepted delivery", body = ApiResponse<Delivery>),
        (status = 409, description = "Delivery is not pending")
    ),
    security(("bearer_auth" = [])),
    tag = "Deliveries"
)]
pub async fn accept_delivery(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Delivery>>> {
    let resp = delivery_service::accept_delivery(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/deliveries/{id}/status",
    request_body = UpdateDeliveryStatusRequest,
    responses(
        (status = 200, description = "Updated delivery", body = ApiResponse<Delivery>),
        (status = 409, description = "Illegal transition")
    ),
    security(("bearer_auth" = [])),
    tag = "Deliveries"
)]
pub async fn update_delivery_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateDeliveryStatusRequest>,
) -> AppResult<Json<ApiResponse<Delivery>>> {
    let resp = delivery_service::update_delivery_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(put, path = "/api/deliveries/{id}/location", request_body = UpdateLocationRequest, security(("bearer_auth" = [])), tag = "Deliveries")]
pub async fn update_location(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateLocationRequest>,
) -> AppResult<Json<ApiResponse<Delivery>>> {
    let resp = delivery_service::update_location(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(put, path = "/api/deliveries/{id}/estimated-time", request_body = UpdateEstimatedTimeRequest, security(("bearer_auth" = [])), tag = "Deliveries")]
pub async fn update_estimated_time(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateEstimatedTimeRequest>,
) -> AppResult<Json<ApiResponse<Delivery>>> {
    let resp = delivery_service::update_estimated_time(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(put, path = "/api/deliveries/{id}/notes", request_body = UpdateNotesRequest, security(("bearer_auth" = [])), tag = "Deliveries")]
pub async fn update_notes(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateNotesRequest>,
) -> AppResult<Json<ApiResponse<Delivery>>> {
    let resp = delivery_service::update_notes(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/deliveries/{id}/cancel",
    responses(
        (status = 200, description = "Cancelled delivery", body = ApiResponse<Delivery>),
        (status = 409, description = "Delivery already completed")
    ),
    security(("bearer_auth" = [])),
    tag = "Deliveries"
)]
pub async fn cancel_delivery(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Delivery>>> {
    let resp = delivery_service::cancel_delivery(&state, &user, id).await?;
    Ok(Json(resp))
}
