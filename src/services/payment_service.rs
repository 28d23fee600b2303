use chrono::{Datelike, TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use crate::{
    audit::log_audit,
    domain::{PaymentMethod, PaymentStatus},
    dto::payments::{
        CardPaymentRequest, CashPaymentRequest, ExpiredSweepResult, PaymentList, PaymentStats,
        RefundRequest, UpdatePaymentStatusRequest,
    },
    entity::payments::{
        ActiveModel as PaymentActive, Column as PaymentCol, Entity as Payments,
        Model as PaymentModel,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Payment,
    policy::{Action, Resource, authorize},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Card payment: record first, then create and confirm an intent with the
/// external processor. The gateway's verdict decides the final status; a
/// transport failure is itself recorded as FAILED. No retries.
pub async fn create_card_payment(
    state: &AppState,
    user: &AuthUser,
    payload: CardPaymentRequest,
) -> AppResult<ApiResponse<Payment>> {
    authorize(user, Action::CreatePayment, Resource::None)?;

    if payload.amount <= Decimal::ZERO {
        return Err(AppError::BadRequest("amount must be positive".into()));
    }

    let payment = PaymentActive {
        id: NotSet,
        order_id: Set(payload.order_id),
        amount: Set(payload.amount),
        payment_method: Set(PaymentMethod::CreditCard),
        status: Set(PaymentStatus::Processing),
        transaction_id: Set(None),
        gateway_response: Set(None),
        failure_reason: Set(None),
        refund_amount: Set(None),
        refunded_at: Set(None),
        customer_id: Set(Some(user.user_id)),
        payment_intent_id: Set(None),
        created_at: NotSet,
        processed_at: Set(None),
    }
    .insert(&state.orm)
    .await?;

    let outcome = state
        .card_gateway
        .create_and_confirm_intent(
            payload.amount,
            "usd",
            &payload.payment_method_id,
            payload.order_id,
        )
        .await;

    let mut active: PaymentActive = payment.into();
    let updated = match outcome {
        Ok(intent) => {
            let status = match intent.status.as_str() {
                "succeeded" => PaymentStatus::Completed,
                "requires_action" => PaymentStatus::Pending,
                other => {
                    active.failure_reason = Set(Some(format!("Payment failed: {other}")));
                    PaymentStatus::Failed
                }
            };
            active.transaction_id = Set(Some(intent.intent_id.clone()));
            active.payment_intent_id = Set(Some(intent.intent_id));
            active.gateway_response = Set(Some(intent.raw));
            active.status = Set(status);
            if matches!(status, PaymentStatus::Completed | PaymentStatus::Failed) {
                active.processed_at = Set(Some(Utc::now().into()));
            }
            active.update(&state.orm).await?
        }
        Err(err) => {
            active.status = Set(PaymentStatus::Failed);
            active.failure_reason = Set(Some(err.to_string()));
            active.processed_at = Set(Some(Utc::now().into()));
            active.update(&state.orm).await?;
            return Err(AppError::Upstream(err.to_string()));
        }
    };

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "payment_card",
        Some("payments"),
        Some(serde_json::json!({ "payment_id": updated.id, "status": updated.status })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Payment processed",
        payment_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn create_cash_payment(
    state: &AppState,
    user: &AuthUser,
    payload: CashPaymentRequest,
) -> AppResult<ApiResponse<Payment>> {
    authorize(user, Action::CreatePayment, Resource::None)?;

    if payload.amount <= Decimal::ZERO {
        return Err(AppError::BadRequest("amount must be positive".into()));
    }

    let reference = format!("COD_{}", Utc::now().timestamp_millis());
    let payment = PaymentActive {
        id: NotSet,
        order_id: Set(payload.order_id),
        amount: Set(payload.amount),
        payment_method: Set(PaymentMethod::CashOnDelivery),
        status: Set(PaymentStatus::Pending),
        transaction_id: Set(Some(reference)),
        gateway_response: Set(None),
        failure_reason: Set(None),
        refund_amount: Set(None),
        refunded_at: Set(None),
        customer_id: Set(Some(user.user_id)),
        payment_intent_id: Set(None),
        created_at: NotSet,
        processed_at: Set(None),
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Payment created",
        payment_from_entity(payment),
        Some(Meta::empty()),
    ))
}

/// Settlement of a cash payment by the courier at the door.
pub async fn confirm_cash_payment(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<Payment>> {
    authorize(user, Action::ConfirmCashPayment, Resource::None)?;

    let payment = Payments::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if payment.payment_method != PaymentMethod::CashOnDelivery {
        return Err(AppError::BadRequest(
            "Only cash on delivery payments can be confirmed".into(),
        ));
    }

    payment.status.ensure_transition(PaymentStatus::Completed)?;

    let now = Utc::now();
    let result = Payments::update_many()
        .col_expr(PaymentCol::Status, Expr::value(PaymentStatus::Completed))
        .col_expr(PaymentCol::ProcessedAt, Expr::value(now))
        .filter(PaymentCol::Id.eq(id))
        .filter(PaymentCol::Status.eq(payment.status))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::Conflict(
            "Payment was modified concurrently".into(),
        ));
    }

    let updated = Payments::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "payment_cash_confirm",
        Some("payments"),
        Some(serde_json::json!({ "payment_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Payment confirmed",
        payment_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn get_payment(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<Payment>> {
    let payment = Payments::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    authorize(
        user,
        Action::ViewPayment,
        Resource::Payment {
            customer_id: payment.customer_id,
        },
    )?;

    Ok(ApiResponse::success(
        "Payment",
        payment_from_entity(payment),
        None,
    ))
}

pub async fn payment_by_order(
    state: &AppState,
    user: &AuthUser,
    order_id: i64,
) -> AppResult<ApiResponse<Payment>> {
    authorize(user, Action::ViewPayment, Resource::None)?;

    let payment = Payments::find()
        .filter(PaymentCol::OrderId.eq(order_id))
        .order_by_desc(PaymentCol::CreatedAt)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success(
        "Payment",
        payment_from_entity(payment),
        None,
    ))
}

pub async fn my_payments(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<PaymentList>> {
    let items = Payments::find()
        .filter(PaymentCol::CustomerId.eq(user.user_id))
        .order_by_desc(PaymentCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(payment_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Payments",
        PaymentList { items },
        Some(Meta::empty()),
    ))
}

pub async fn payments_by_customer(
    state: &AppState,
    user: &AuthUser,
    customer_id: i64,
) -> AppResult<ApiResponse<PaymentList>> {
    authorize(user, Action::ViewPayment, Resource::None)?;

    let items = Payments::find()
        .filter(PaymentCol::CustomerId.eq(customer_id))
        .order_by_desc(PaymentCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(payment_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Payments",
        PaymentList { items },
        Some(Meta::empty()),
    ))
}

pub async fn payments_by_status(
    state: &AppState,
    user: &AuthUser,
    status: PaymentStatus,
) -> AppResult<ApiResponse<PaymentList>> {
    authorize(user, Action::ViewPayment, Resource::None)?;

    let items = Payments::find()
        .filter(PaymentCol::Status.eq(status))
        .order_by_desc(PaymentCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(payment_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Payments",
        PaymentList { items },
        Some(Meta::empty()),
    ))
}

/// Refunds only come off COMPLETED payments and never exceed the captured
/// amount. An external intent gets refunded at the processor first; its
/// response is appended to the stored gateway transcript.
pub async fn refund_payment(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: RefundRequest,
) -> AppResult<ApiResponse<Payment>> {
    authorize(user, Action::RefundPayment, Resource::None)?;

    let payment = Payments::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if payment.status != PaymentStatus::Completed {
        return Err(AppError::Conflict(
            "Can only refund completed payments".into(),
        ));
    }
    if payload.amount <= Decimal::ZERO {
        return Err(AppError::BadRequest("refund amount must be positive".into()));
    }
    if payload.amount > payment.amount {
        return Err(AppError::BadRequest(
            "Refund amount cannot exceed payment amount".into(),
        ));
    }

    let mut gateway_response = payment.gateway_response.clone();
    if let Some(intent_id) = payment.payment_intent_id.as_deref() {
        let refund = state
            .card_gateway
            .create_refund(intent_id, payload.amount)
            .await
            .map_err(|err| AppError::Upstream(format!("Refund failed: {err}")))?;

        gateway_response = Some(match gateway_response {
            Some(existing) => format!("{existing}\nRefund: {}", refund.raw),
            None => format!("Refund: {}", refund.raw),
        });
    }

    let next = if payload.amount == payment.amount {
        PaymentStatus::Refunded
    } else {
        PaymentStatus::PartiallyRefunded
    };

    let now = Utc::now();
    let result = Payments::update_many()
        .col_expr(PaymentCol::Status, Expr::value(next))
        .col_expr(PaymentCol::RefundAmount, Expr::value(payload.amount))
        .col_expr(PaymentCol::RefundedAt, Expr::value(now))
        .col_expr(PaymentCol::GatewayResponse, Expr::value(gateway_response))
        .filter(PaymentCol::Id.eq(id))
        .filter(PaymentCol::Status.eq(PaymentStatus::Completed))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::Conflict(
            "Payment was modified concurrently".into(),
        ));
    }

    let updated = Payments::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "payment_refund",
        Some("payments"),
        Some(serde_json::json!({ "payment_id": id, "amount": payload.amount })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Payment refunded",
        payment_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn update_payment_status(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: UpdatePaymentStatusRequest,
) -> AppResult<ApiResponse<Payment>> {
    authorize(user, Action::AdjustPayment, Resource::None)?;

    let payment = Payments::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    payment.status.ensure_transition(payload.status)?;

    let mut update = Payments::update_many()
        .col_expr(PaymentCol::Status, Expr::value(payload.status));
    if matches!(
        payload.status,
        PaymentStatus::Completed | PaymentStatus::Failed
    ) {
        update = update.col_expr(PaymentCol::ProcessedAt, Expr::value(Utc::now()));
    }

    let result = update
        .filter(PaymentCol::Id.eq(id))
        .filter(PaymentCol::Status.eq(payment.status))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::Conflict(
            "Payment was modified concurrently".into(),
        ));
    }

    let updated = Payments::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success(
        "Payment updated",
        payment_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn payment_stats(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<PaymentStats>> {
    authorize(user, Action::ViewPaymentStats, Resource::None)?;

    let total_payments = Payments::find().count(&state.orm).await? as i64;
    let completed_payments = Payments::find()
        .filter(PaymentCol::Status.eq(PaymentStatus::Completed))
        .count(&state.orm)
        .await? as i64;
    let pending_payments = Payments::find()
        .filter(PaymentCol::Status.eq(PaymentStatus::Pending))
        .count(&state.orm)
        .await? as i64;
    let failed_payments = Payments::find()
        .filter(PaymentCol::Status.eq(PaymentStatus::Failed))
        .count(&state.orm)
        .await? as i64;

    let now = Utc::now();
    let start_of_month = Utc
        .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now);

    let revenue: (Option<Decimal>,) = sqlx::query_as(
        "SELECT SUM(amount) FROM payments WHERE status = 'COMPLETED' AND created_at >= $1",
    )
    .bind(start_of_month)
    .fetch_one(&state.pool)
    .await?;

    let stats = PaymentStats {
        total_payments,
        completed_payments,
        pending_payments,
        failed_payments,
        monthly_revenue: revenue.0.unwrap_or(Decimal::ZERO),
    };

    Ok(ApiResponse::success("Stats", stats, Some(Meta::empty())))
}

/// On-demand sweep: every PENDING payment older than the configured window
/// is force-cancelled. There is no background scheduler; an admin triggers
/// this explicitly.
pub async fn process_expired_payments(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<ExpiredSweepResult>> {
    authorize(user, Action::SweepExpiredPayments, Resource::None)?;

    let cutoff = Utc::now() - chrono::Duration::minutes(state.config.payment_expiry_minutes);

    let result = Payments::update_many()
        .col_expr(PaymentCol::Status, Expr::value(PaymentStatus::Cancelled))
        .col_expr(
            PaymentCol::FailureReason,
            Expr::value(Some("Payment expired".to_string())),
        )
        .filter(PaymentCol::Status.eq(PaymentStatus::Pending))
        .filter(PaymentCol::CreatedAt.lt(cutoff))
        .exec(&state.orm)
        .await?;

    tracing::info!(cancelled = result.rows_affected, "expired payment sweep");

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "payment_expired_sweep",
        Some("payments"),
        Some(serde_json::json!({ "cancelled": result.rows_affected })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Expired payments processed",
        ExpiredSweepResult {
            cancelled: result.rows_affected,
        },
        Some(Meta::empty()),
    ))
}

pub(crate) fn payment_from_entity(model: PaymentModel) -> Payment {
    Payment {
        id: model.id,
        order_id: model.order_id,
        amount: model.amount,
        payment_method: model.payment_method,
        status: model.status,
        transaction_id: model.transaction_id,
        gateway_response: model.gateway_response,
        failure_reason: model.failure_reason,
        refund_amount: model.refund_amount,
        refunded_at: model.refunded_at.map(|dt| dt.with_timezone(&Utc)),
        customer_id: model.customer_id,
        payment_intent_id: model.payment_intent_id,
        created_at: model.created_at.with_timezone(&Utc),
        processed_at: model.processed_at.map(|dt| dt.with_timezone(&Utc)),
    }
}
