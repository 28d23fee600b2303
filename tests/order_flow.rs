use std::sync::Arc;

use async_trait::async_trait;
use axum_food_delivery_api::{
    card::{CardGateway, CardGatewayError, IntentOutcome, RefundOutcome},
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    domain::{OrderStatus, Role},
    dto::orders::{CreateOrderItemRequest, CreateOrderRequest, UpdateOrderStatusRequest},
    entity::{
        orders::ActiveModel as OrderActive, restaurants::ActiveModel as RestaurantActive,
        users::ActiveModel as UserActive,
    },
    error::AppError,
    middleware::auth::AuthUser,
    services::order_service,
    state::AppState,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
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

// Order placement and lifecycle against a real database. Skipped when no
// DATABASE_URL is configured.
#[tokio::test]
async fn order_creation_totals_and_lifecycle() -> anyhow::Result<()> {
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

    let customer_id = create_user(&state, Role::Customer, "customer@example.com").await?;
    let owner_id = create_user(&state, Role::Restaurant, "owner@example.com").await?;
    let restaurant_id = create_restaurant(&state, owner_id).await?;

    let customer = AuthUser {
        user_id: customer_id,
        email: "customer@example.com".into(),
        role: Role::Customer,
    };
    let owner = AuthUser {
        user_id: owner_id,
        email: "owner@example.com".into(),
        role: Role::Restaurant,
    };

    // Two line items: 2 x 5.00 + 1 x 3.50 = 13.50.
    let resp = order_service::create_order(
        &state,
        &customer,
        CreateOrderRequest {
            restaurant_id,
            delivery_address: Some("42 Test Lane".into()),
            special_instructions: None,
            items: vec![
                CreateOrderItemRequest {
                    menu_item_id: 10,
                    item_name: "Burger".into(),
                    quantity: 2,
                    unit_price: dec!(5.00),
                    special_requests: None,
                },
                CreateOrderItemRequest {
                    menu_item_id: 11,
                    item_name: "Fries".into(),
                    quantity: 1,
                    unit_price: dec!(3.50),
                    special_requests: Some("extra salt".into()),
                },
            ],
        },
    )
    .await?;

    let created = resp.data.unwrap();
    assert_eq!(created.order.total_amount, dec!(13.50));
    assert_eq!(created.order.status, OrderStatus::Pending);
    assert_eq!(created.items.len(), 2);
    assert_eq!(created.items[0].total_price, dec!(10.00));
    assert_eq!(created.items[1].total_price, dec!(3.50));

    let order_id = created.order.id;

    // The restaurant confirms the order.
    let confirmed = order_service::update_order_status(
        &state,
        &owner,
        order_id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Confirmed,
        },
    )
    .await?;
    assert_eq!(confirmed.data.unwrap().status, OrderStatus::Confirmed);

    // Jumping straight to DELIVERED is rejected without touching the row.
    let err = order_service::update_order_status(
        &state,
        &owner,
        order_id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Delivered,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let after = order_service::get_order(&state, &customer, order_id).await?;
    assert_eq!(after.data.unwrap().order.status, OrderStatus::Confirmed);

    // Cancelling before delivery succeeds.
    let cancelled = order_service::cancel_order(&state, &customer, order_id).await?;
    assert_eq!(cancelled.data.unwrap().status, OrderStatus::Cancelled);

    // A delivered order cannot be cancelled.
    let delivered = OrderActive {
        id: NotSet,
        customer_id: Set(customer_id),
        restaurant_id: Set(restaurant_id),
        total_amount: Set(dec!(10.00)),
        status: Set(OrderStatus::Delivered),
        delivery_address: Set(None),
        special_instructions: Set(None),
        delivery_id: Set(None),
        payment_id: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let err = order_service::cancel_order(&state, &customer, delivered.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Another customer cannot see the order at all.
    let stranger = AuthUser {
        user_id: customer_id + 1000,
        email: "stranger@example.com".into(),
        role: Role::Customer,
    };
    let err = order_service::get_order(&state, &stranger, delivered.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    // Orders without items or with non-positive quantities never reach the
    // database.
    let err = order_service::create_order(
        &state,
        &customer,
        CreateOrderRequest {
            restaurant_id,
            delivery_address: None,
            special_instructions: None,
            items: vec![],
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = order_service::create_order(
        &state,
        &customer,
        CreateOrderRequest {
            restaurant_id,
            delivery_address: None,
            special_instructions: None,
            items: vec![CreateOrderItemRequest {
                menu_item_id: 10,
                item_name: "Burger".into(),
                quantity: 0,
                unit_price: dec!(5.00),
                special_requests: None,
            }],
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

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
        config: test_config(database_url),
        card_gateway: Arc::new(NoopGateway),
    })
}

fn test_config(database_url: &str) -> AppConfig {
    AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "test-secret".into(),
        jwt_ttl_hours: 24,
        card_gateway_url: String::new(),
        card_gateway_key: String::new(),
        payment_expiry_minutes: 30,
    }
}

async fn create_user(state: &AppState, role: Role, email: &str) -> anyhow::Result<i64> {
    let user = UserActive {
        id: NotSet,
        email: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        name: Set("Test User".into()),
        phone: Set(None),
        address: Set(None),
        role: Set(role),
        active: Set(true),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}

async fn create_restaurant(state: &AppState, owner_id: i64) -> anyhow::Result<i64> {
    let restaurant = RestaurantActive {
        id: NotSet,
        name: Set("Test Kitchen".into()),
        address: Set("1 Test Street".into()),
        phone: Set(None),
        email: Set(None),
        cuisine_type: Set("Testish".into()),
        description: Set(None),
        image_url: Set(None),
        opening_time: Set(None),
        closing_time: Set(None),
        rating: Set(0.0),
        total_reviews: Set(0),
        delivery_fee: Set(None),
        estimated_delivery_time: Set(None),
        active: Set(true),
        approved: Set(true),
        owner_id: Set(owner_id),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(restaurant.id)
}
