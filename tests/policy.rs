use axum_food_delivery_api::domain::Role;
use axum_food_delivery_api::error::AppError;
use axum_food_delivery_api::middleware::auth::AuthUser;
use axum_food_delivery_api::policy::{Action, Resource, authorize};

fn subject(user_id: i64, role: Role) -> AuthUser {
    AuthUser {
        user_id,
        email: format!("user{user_id}@example.com"),
        role,
    }
}

fn assert_forbidden(result: Result<(), AppError>) {
    assert!(matches!(result, Err(AppError::Forbidden)));
}

#[test]
fn admin_is_allowed_everything() {
    let admin = subject(1, Role::Admin);
    authorize(&admin, Action::ManageUsers, Resource::None).unwrap();
    authorize(&admin, Action::RefundPayment, Resource::None).unwrap();
    authorize(
        &admin,
        Action::CancelOrder,
        Resource::Order {
            customer_id: 99,
            restaurant_owner_id: None,
        },
    )
    .unwrap();
}

#[test]
fn customer_owns_their_orders_and_payments() {
    let customer = subject(7, Role::Customer);

    authorize(&customer, Action::CreateOrder, Resource::None).unwrap();
    authorize(
        &customer,
        Action::ViewOrder,
        Resource::Order {
            customer_id: 7,
            restaurant_owner_id: None,
        },
    )
    .unwrap();
    assert_forbidden(authorize(
        &customer,
        Action::ViewOrder,
        Resource::Order {
            customer_id: 8,
            restaurant_owner_id: None,
        },
    ));

    authorize(
        &customer,
        Action::ViewPayment,
        Resource::Payment { customer_id: Some(7) },
    )
    .unwrap();
    assert_forbidden(authorize(
        &customer,
        Action::ViewPayment,
        Resource::Payment { customer_id: Some(8) },
    ));

    // Refunds stay with admins.
    assert_forbidden(authorize(&customer, Action::RefundPayment, Resource::None));
}

#[test]
fn restaurant_owner_manages_own_restaurant_only() {
    let owner = subject(3, Role::Restaurant);

    authorize(&owner, Action::CreateRestaurant, Resource::None).unwrap();
    authorize(
        &owner,
        Action::ManageMenu,
        Resource::Restaurant { owner_id: 3 },
    )
    .unwrap();
    assert_forbidden(authorize(
        &owner,
        Action::ManageMenu,
        Resource::Restaurant { owner_id: 4 },
    ));

    authorize(
        &owner,
        Action::AdvanceOrder,
        Resource::Order {
            customer_id: 7,
            restaurant_owner_id: Some(3),
        },
    )
    .unwrap();
    assert_forbidden(authorize(
        &owner,
        Action::AdvanceOrder,
        Resource::Order {
            customer_id: 7,
            restaurant_owner_id: Some(4),
        },
    ));

    // Approval is an admin gate.
    assert_forbidden(authorize(&owner, Action::ApproveRestaurant, Resource::None));
}

#[test]
fn courier_works_the_queue_and_their_own_runs() {
    let courier = subject(5, Role::Delivery);

    authorize(&courier, Action::ViewDeliveryQueue, Resource::None).unwrap();
    authorize(&courier, Action::AcceptDelivery, Resource::None).unwrap();
    authorize(&courier, Action::ConfirmCashPayment, Resource::None).unwrap();

    authorize(
        &courier,
        Action::UpdateDelivery,
        Resource::Delivery {
            delivery_person_id: Some(5),
        },
    )
    .unwrap();
    assert_forbidden(authorize(
        &courier,
        Action::UpdateDelivery,
        Resource::Delivery {
            delivery_person_id: Some(6),
        },
    ));
    assert_forbidden(authorize(
        &courier,
        Action::UpdateDelivery,
        Resource::Delivery {
            delivery_person_id: None,
        },
    ));

    // Assigning someone else is an admin operation.
    assert_forbidden(authorize(&courier, Action::AssignDelivery, Resource::None));
}

#[test]
fn self_lookup_is_allowed_for_every_role() {
    for role in [Role::Customer, Role::Restaurant, Role::Delivery] {
        let user = subject(11, role);
        authorize(&user, Action::ViewUser, Resource::User { id: 11 }).unwrap();
        assert_forbidden(authorize(&user, Action::ViewUser, Resource::User { id: 12 }));
    }
}

#[test]
fn role_checks_fail_without_ownership_facts() {
    // A handler passing Resource::None where ownership matters must not
    // accidentally grant access.
    let customer = subject(7, Role::Customer);
    assert_forbidden(authorize(&customer, Action::ViewOrder, Resource::None));

    let courier = subject(5, Role::Delivery);
    assert_forbidden(authorize(&courier, Action::ViewDelivery, Resource::None));
}
