use crate::{domain::Role, error::AppError, middleware::auth::AuthUser};

/// Sensitive operations gated by role and ownership. Actions with no arm for
/// a non-admin role below are implicitly admin-only.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    ViewUser,
    ManageUsers,
    CreateRestaurant,
    UpdateRestaurant,
    ApproveRestaurant,
    ViewAnyRestaurant,
    ManageMenu,
    CreateOrder,
    ViewOrder,
    AdvanceOrder,
    CancelOrder,
    LinkOrder,
    CreateDelivery,
    ViewDelivery,
    ViewDeliveryQueue,
    AcceptDelivery,
    AssignDelivery,
    UpdateDelivery,
    CancelDelivery,
    CreatePayment,
    ViewPayment,
    ConfirmCashPayment,
    RefundPayment,
    AdjustPayment,
    ViewPaymentStats,
    SweepExpiredPayments,
}

/// Ownership facts the caller resolved from its own store. `None` when the
/// action has no resource (pure role checks).
#[derive(Copy, Clone, Debug, Default)]
pub enum Resource {
    #[default]
    None,
    User {
        id: i64,
    },
    Restaurant {
        owner_id: i64,
    },
    Order {
        customer_id: i64,
        restaurant_owner_id: Option<i64>,
    },
    Delivery {
        delivery_person_id: Option<i64>,
    },
    Payment {
        customer_id: Option<i64>,
    },
}

/// Single authorization decision point. Pure: every rule is a function of
/// the subject's role and the resource's ownership facts.
pub fn authorize(subject: &AuthUser, action: Action, resource: Resource) -> Result<(), AppError> {
    if subject.role == Role::Admin {
        return Ok(());
    }

    let allowed = match (subject.role, action) {
        (_, Action::ViewUser) => {
            matches!(resource, Resource::User { id } if id == subject.user_id)
        }
        (Role::Restaurant, Action::CreateRestaurant | Action::CreateDelivery) => true,
        (Role::Restaurant, Action::UpdateRestaurant | Action::ManageMenu) => {
            matches!(resource, Resource::Restaurant { owner_id } if owner_id == subject.user_id)
        }
        (Role::Customer, Action::CreateOrder | Action::CreatePayment) => true,
        (Role::Customer, Action::ViewOrder | Action::CancelOrder) => {
            matches!(resource, Resource::Order { customer_id, .. } if customer_id == subject.user_id)
        }
        (Role::Restaurant, Action::ViewOrder | Action::AdvanceOrder | Action::CancelOrder) => {
            match resource {
                Resource::Order {
                    restaurant_owner_id: Some(owner_id),
                    ..
                } => owner_id == subject.user_id,
                Resource::Restaurant { owner_id } => owner_id == subject.user_id,
                _ => false,
            }
        }
        (
            Role::Delivery,
            Action::ViewDeliveryQueue | Action::AcceptDelivery | Action::ConfirmCashPayment,
        ) => true,
        (Role::Delivery, Action::ViewDelivery | Action::UpdateDelivery | Action::CancelDelivery) => {
            matches!(
                resource,
                Resource::Delivery { delivery_person_id: Some(pid) } if pid == subject.user_id
            )
        }
        (Role::Customer, Action::ViewPayment) => {
            matches!(
                resource,
                Resource::Payment { customer_id: Some(cid) } if cid == subject.user_id
            )
        }
        _ => false,
    };

    if allowed { Ok(()) } else { Err(AppError::Forbidden) }
}
