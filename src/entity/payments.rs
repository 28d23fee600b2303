use sea_orm::entity::prelude::*;

use crate::domain::{PaymentMethod, PaymentStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub order_id: i64,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub gateway_response: Option<String>,
    pub failure_reason: Option<String>,
    pub refund_amount: Option<Decimal>,
    pub refunded_at: Option<DateTimeWithTimeZone>,
    pub customer_id: Option<i64>,
    pub payment_intent_id: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub processed_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
