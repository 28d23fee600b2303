use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{domain::PaymentStatus, models::Payment};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CardPaymentRequest {
    pub order_id: i64,
    pub amount: Decimal,
    pub payment_method_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CashPaymentRequest {
    pub order_id: i64,
    pub amount: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefundRequest {
    pub amount: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePaymentStatusRequest {
    pub status: PaymentStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentList {
    pub items: Vec<Payment>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentStats {
    pub total_payments: i64,
    pub completed_payments: i64,
    pub pending_payments: i64,
    pub failed_payments: i64,
    pub monthly_revenue: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ExpiredSweepResult {
    pub cancelled: u64,
}
