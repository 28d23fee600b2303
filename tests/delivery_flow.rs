use std::sync::Arc;

use async_trait::async_trait;
use axum_food_delivery_api::{
    card::{CardGateway, CardGatewayError, IntentOutcome, RefundOutcome},
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    domain::{DeliveryStatus, Role},
    dto::deliveries::{
        AssignDeliveryRequest, CreateDeliveryRequest, OptimalDeliveriesQuery,
        UpdateDeliveryStatusRequest,
    },
    entity::deliveries::ActiveModel as DeliveryActive,
    error::AppError,
    middleware::auth::AuthUser,
    services::delivery_service,
    state::AppState,
};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};

struct NoopGateway;

#[async_trait]
impl CardGateway for NoopGateway {
    async fn create_and_confirm_intent(
        &self,
        _amount: Decimal,
        _currency: &str,
        _payment_method_id: &str,
        _order_id: i64,
    ) -> Result<IntentOutcome, CardGatewayError> {
        Err(CardGatewayError::Malformed("not wired in this test".into()))
    }

    async fn create_refund(
        &self,
        _intent_id: &str,
        _amount: Decimal,
    ) -> Result<RefundOutcome, CardGatewayError> {
        Err(CardGatewayError::Malformed("not wired in this test".into()))
    }
}

// Tracking codes, assignment semantics and the first-come queue. Skipped
// when no DATABASE_URL is configured.
#[tokio::test]
async fn delivery_assignment_and_queue_flow() -> anyhow::Result<()> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run flow tests.");
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;

    let admin = AuthUser {
        user_id: 1,
        email: "admin@example.com".into(),
        role: Role::Admin,
    };
    let courier = AuthUser {
        user_id: 7,
        email: "courier@example.com".into(),
        role: Role::Delivery,
    };

    // Delivery for order 100: PENDING with a fresh tracking code.
    let first = delivery_service::create_delivery(
        &state,
        &admin,
        CreateDeliveryRequest {
            order_id: 100,
            pickup_address: Some("Kitchen".into()),
            delivery_address: Some("Door".into()),
            delivery_notes: None,
            estimated_delivery_time: None,
        },
    )
    .await?
    .data
    .unwrap();

    assert_eq!(first.status, DeliveryStatus::Pending);
    assert!(!first.tracking_code.is_empty());
    assert!(first.delivery_person_id.is_none());

    let second = delivery_service::create_delivery(
        &state,
        &admin,
        CreateDeliveryRequest {
            order_id: 101,
            pickup_address: None,
            delivery_address: None,
            delivery_notes: None,
            estimated_delivery_time: None,
        },
    )
    .await?
    .data
    .unwrap();

    assert_ne!(first.tracking_code, second.tracking_code);

    // A second delivery for the same order is rejected.
    let err = delivery_service::create_delivery(
        &state,
        &admin,
        CreateDeliveryRequest {
            order_id: 100,
            pickup_address: None,
            delivery_address: None,
            delivery_notes: None,
            estimated_delivery_time: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // The queue lists both, oldest first, and honours the cap.
    let queue = delivery_service::optimal_deliveries(
        &state,
        &courier,
        OptimalDeliveriesQuery {
            latitude: 52.52,
            longitude: 13.40,
            max: Some(1),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(queue.items.len(), 1);
    assert_eq!(queue.items[0].id, first.id);

    // Assign courier 7: PENDING -> ASSIGNED with assigned_at stamped.
    let assigned = delivery_service::assign_delivery(
        &state,
        &admin,
        first.id,
        AssignDeliveryRequest {
            delivery_person_id: 7,
        },
    )
    .await?
    .data
    .unwrap();

    assert_eq!(assigned.status, DeliveryStatus::Assigned);
    assert_eq!(assigned.delivery_person_id, Some(7));
    assert!(assigned.assigned_at.is_some());

    // A second assignment attempt fails; the record keeps its courier.
    let err = delivery_service::assign_delivery(
        &state,
        &admin,
        first.id,
        AssignDeliveryRequest {
            delivery_person_id: 8,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let unchanged = delivery_service::get_delivery(&state, &courier, first.id)
        .await?
        .data
        .unwrap();
    assert_eq!(unchanged.delivery_person_id, Some(7));
    assert_eq!(unchanged.status, DeliveryStatus::Assigned);

    // The courier walks the chain; each step stamps its timestamp.
    let picked = delivery_service::update_delivery_status(
        &state,
        &courier,
        first.id,
        UpdateDeliveryStatusRequest {
            status: DeliveryStatus::PickedUp,
        },
    )
    .await?
    .data
    .unwrap();
    assert!(picked.picked_up_at.is_some());

    // Skipping from PICKED_UP straight to DELIVERED is illegal.
    let err = delivery_service::update_delivery_status(
        &state,
        &courier,
        first.id,
        UpdateDeliveryStatusRequest {
            status: DeliveryStatus::Delivered,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Public tracking works without identity.
    let tracked = delivery_service::track_delivery(&state, first.tracking_code.clone())
        .await?
        .data
        .unwrap();
    assert_eq!(tracked.id, first.id);

    // Courier self-accept claims the remaining pending delivery.
    let accepted = delivery_service::accept_delivery(&state, &courier, second.id)
        .await?
        .data
        .unwrap();
    assert_eq!(accepted.delivery_person_id, Some(courier.user_id));
    assert_eq!(accepted.status, DeliveryStatus::Assigned);

    // A delivered record cannot be cancelled.
    let delivered = DeliveryActive {
        id: NotSet,
        order_id: Set(200),
        delivery_person_id: Set(Some(courier.user_id)),
        status: Set(DeliveryStatus::Delivered),
        pickup_address: Set(None),
        delivery_address: Set(None),
        assigned_at: Set(None),
        picked_up_at: Set(None),
        delivered_at: Set(None),
        estimated_delivery_time: Set(None),
        current_latitude: Set(None),
        current_longitude: Set(None),
        delivery_notes: Set(None),
        tracking_code: Set("TRKDELIVERED200".into()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let err = delivery_service::cancel_delivery(&state, &courier, delivered.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Cancelling an undelivered run succeeds.
    let cancelled = delivery_service::cancel_delivery(&state, &courier, second.id)
        .await?
        .data
        .unwrap();
    assert_eq!(cancelled.status, DeliveryStatus::Cancelled);

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE order_items, orders, menu_items, deliveries, payments, audit_logs, restaurants, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState {
        pool,
        orm,
        config: AppConfig {
            database_url: database_url.to_string(),
            host: "127.0.0.1".into(),
            port: 0,
            jwt_secret: "test-secret".into(),
            jwt_ttl_hours: 24,
            card_gateway_url: String::new(),
            card_gateway_key: String::new(),
            payment_expiry_minutes: 30,
        },
        card_gateway: Arc::new(NoopGateway),
    })
}
