use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};

use crate::{
    domain::PaymentStatus,
    dto::payments::{
        CardPaymentRequest, CashPaymentRequest, ExpiredSweepResult, PaymentList, PaymentStats,
        RefundRequest, UpdatePaymentStatusRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Payment,
    response::ApiResponse,
    services::payment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/card", post(create_card_payment))
        .route("/cash-on-delivery", post(create_cash_payment))
        .route("/my-payments", get(my_payments))
        .route("/customer/{customer_id}", get(payments_by_customer))
        .route("/order/{order_id}", get(payment_by_order))
        .route("/status/{status}", get(payments_by_status))
        .route("/stats", get(payment_stats))
        .route("/process-expired", post(process_expired))
        .route("/{id}", get(get_payment))
        .route("/{id}/confirm-cash", put(confirm_cash_payment))
        .route("/{id}/refund", post(refund_payment))
        .route("/{id}/status", put(update_payment_status))
}

#[utoipa::path(
    post,
    path = "/api/payments/card",
    request_body = CardPaymentRequest,
    responses(
        (status = 200, description = "Processed card payment", body = ApiResponse<Payment>),
        (status = 502, description = "Card processor unreachable")
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn create_card_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CardPaymentRequest>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let resp = payment_service::create_card_payment(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/payments/cash-on-delivery",
    request_body = CashPaymentRequest,
    responses(
        (status = 200, description = "Pending cash payment", body = ApiResponse<Payment>)
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn create_cash_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CashPaymentRequest>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let resp = payment_service::create_cash_payment(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/payments/{id}/confirm-cash",
    responses(
        (status = 200, description = "Confirmed payment", body = ApiResponse<Payment>),
        (status = 400, description = "Not a cash payment")
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn confirm_cash_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let resp = payment_service::confirm_cash_payment(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/payments/{id}",
    params(
        ("id" = i64, Path, description = "Payment ID")
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn get_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let resp = payment_service::get_payment(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/payments/order/{order_id}", security(("bearer_auth" = [])), tag = "Payments")]
pub async fn payment_by_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(order_id): Path<i64>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let resp = payment_service::payment_by_order(&state, &user, order_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/payments/my-payments", security(("bearer_auth" = [])), tag = "Payments")]
pub async fn my_payments(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<PaymentList>>> {
    let resp = payment_service::my_payments(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/payments/customer/{customer_id}", security(("bearer_auth" = [])), tag = "Payments")]
pub async fn payments_by_customer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(customer_id): Path<i64>,
) -> AppResult<Json<ApiResponse<PaymentList>>> {
    let resp = payment_service::payments_by_customer(&state, &user, customer_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/payments/status/{status}",
    params(
        ("status" = PaymentStatus, Path, description = "Payment status")
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn payments_by_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(status): Path<PaymentStatus>,
) -> AppResult<Json<ApiResponse<PaymentList>>> {
    let resp = payment_service::payments_by_status(&state, &user, status).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/payments/{id}/refund",
    request_body = RefundRequest,
    responses(
        (status = 200, description = "Refunded payment", body = ApiResponse<Payment>),
        (status = 400, description = "Refund exceeds captured amount"),
        (status = 409, description = "Payment not completed")
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn refund_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<RefundRequest>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let resp = payment_service::refund_payment(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/payments/{id}/status",
    request_body = UpdatePaymentStatusRequest,
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn update_payment_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdatePaymentStatusRequest>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let resp = payment_service::update_payment_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/payments/stats", security(("bearer_auth" = [])), tag = "Payments")]
pub async fn payment_stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<PaymentStats>>> {
    let resp = payment_service::payment_stats(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/payments/process-expired",
    responses(
        (status = 200, description = "Sweep result", body = ApiResponse<ExpiredSweepResult>)
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn process_expired(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ExpiredSweepResult>>> {
    let resp = payment_service::process_expired_payments(&state, &user).await?;
    Ok(Json(resp))
}
