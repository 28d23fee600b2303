use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[sea_orm(string_value = "CUSTOMER")]
    Customer,
    #[sea_orm(string_value = "RESTAURANT")]
    Restaurant,
    #[sea_orm(string_value = "DELIVERY")]
    Delivery,
    #[sea_orm(string_value = "ADMIN")]
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "CUSTOMER",
            Role::Restaurant => "RESTAURANT",
            Role::Delivery => "DELIVERY",
            Role::Admin => "ADMIN",
        }
    }

    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "CUSTOMER" => Ok(Role::Customer),
            "RESTAURANT" => Ok(Role::Restaurant),
            "DELIVERY" => Ok(Role::Delivery),
            "ADMIN" => Ok(Role::Admin),
            other => Err(AppError::BadRequest(format!("Unknown role: {other}"))),
        }
    }
}

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "CONFIRMED")]
    Confirmed,
    #[sea_orm(string_value = "PREPARING")]
    Preparing,
    #[sea_orm(string_value = "READY_FOR_PICKUP")]
    ReadyForPickup,
    #[sea_orm(string_value = "OUT_FOR_DELIVERY")]
    OutForDelivery,
    #[sea_orm(string_value = "DELIVERED")]
    Delivered,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
    #[sea_orm(string_value = "REFUNDED")]
    Refunded,
}

impl OrderStatus {
    /// Legal transitions. The fulfilment chain moves one step at a time;
    /// CANCELLED is reachable from anything not yet delivered, REFUNDED only
    /// from DELIVERED or CANCELLED.
    pub fn can_transition(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, next) {
            (Pending, Confirmed)
            | (Confirmed, Preparing)
            | (Preparing, ReadyForPickup)
            | (ReadyForPickup, OutForDelivery)
            | (OutForDelivery, Delivered) => true,
            (Delivered | Cancelled | Refunded, Cancelled) => false,
            (_, Cancelled) => true,
            (Delivered | Cancelled, Refunded) => true,
            _ => false,
        }
    }

    pub fn ensure_transition(self, next: OrderStatus) -> Result<(), AppError> {
        if self.can_transition(next) {
            Ok(())
        } else {
            Err(AppError::Conflict(format!(
                "Illegal order transition {self:?} -> {next:?}"
            )))
        }
    }

    pub fn active_statuses() -> [OrderStatus; 4] {
        [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::ReadyForPickup,
        ]
    }
}

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "ASSIGNED")]
    Assigned,
    #[sea_orm(string_value = "PICKED_UP")]
    PickedUp,
    #[sea_orm(string_value = "OUT_FOR_DELIVERY")]
    OutForDelivery,
    #[sea_orm(string_value = "DELIVERED")]
    Delivered,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
    #[sea_orm(string_value = "FAILED")]
    Failed,
}

impl DeliveryStatus {
    pub fn can_transition(self, next: DeliveryStatus) -> bool {
        use DeliveryStatus::*;
        match (self, next) {
            (Pending, Assigned)
            | (Assigned, PickedUp)
            | (PickedUp, OutForDelivery)
            | (OutForDelivery, Delivered) => true,
            (Delivered, Cancelled) => false,
            (Cancelled | Failed, Cancelled) => false,
            (_, Cancelled) => true,
            (Assigned | PickedUp | OutForDelivery, Failed) => true,
            _ => false,
        }
    }

    pub fn ensure_transition(self, next: DeliveryStatus) -> Result<(), AppError> {
        if self.can_transition(next) {
            Ok(())
        } else {
            Err(AppError::Conflict(format!(
                "Illegal delivery transition {self:?} -> {next:?}"
            )))
        }
    }

    pub fn active_statuses() -> [DeliveryStatus; 3] {
        [
            DeliveryStatus::Assigned,
            DeliveryStatus::PickedUp,
            DeliveryStatus::OutForDelivery,
        ]
    }
}

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "PROCESSING")]
    Processing,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "FAILED")]
    Failed,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
    #[sea_orm(string_value = "REFUNDED")]
    Refunded,
    #[sea_orm(string_value = "PARTIALLY_REFUNDED")]
    PartiallyRefunded,
}

impl PaymentStatus {
    /// PROCESSING -> PENDING covers a gateway "requires action" outcome;
    /// PENDING -> CANCELLED is the expiry sweep.
    pub fn can_transition(self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;
        match (self, next) {
            (Pending, Processing) => true,
            (Processing, Completed | Failed | Pending) => true,
            (Pending, Completed | Failed | Cancelled) => true,
            (Completed, Refunded | PartiallyRefunded) => true,
            _ => false,
        }
    }

    pub fn ensure_transition(self, next: PaymentStatus) -> Result<(), AppError> {
        if self.can_transition(next) {
            Ok(())
        } else {
            Err(AppError::Conflict(format!(
                "Illegal payment transition {self:?} -> {next:?}"
            )))
        }
    }
}

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "CREDIT_CARD")]
    CreditCard,
    #[sea_orm(string_value = "DEBIT_CARD")]
    DebitCard,
    #[sea_orm(string_value = "CASH_ON_DELIVERY")]
    CashOnDelivery,
}
