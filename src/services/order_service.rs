use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

use crate::{
    audit::log_audit,
    domain::OrderStatus,
    dto::orders::{CreateOrderRequest, OrderList, OrderWithItems, UpdateOrderStatusRequest},
    entity::{
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{
            ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel,
        },
        restaurants::Entity as Restaurants,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderItem},
    policy::{Action, Resource, authorize},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    state::AppState,
};

/// Line total is always the product of unit price and quantity; it is
/// recomputed whenever either operand is set.
pub fn line_total(unit_price: Decimal, quantity: i32) -> Decimal {
    unit_price * Decimal::from(quantity)
}

/// Order total is the sum of its line totals, computed server-side at
/// creation. Later item edits do not re-sum the order.
pub fn order_total(lines: &[(Decimal, i32)]) -> Decimal {
    lines
        .iter()
        .fold(Decimal::ZERO, |acc, (price, qty)| acc + line_total(*price, *qty))
}

pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    authorize(user, Action::CreateOrder, Resource::None)?;

    if payload.items.is_empty() {
        return Err(AppError::BadRequest("Order has no items".into()));
    }
    for item in &payload.items {
        if item.quantity <= 0 {
            return Err(AppError::BadRequest("quantity must be greater than 0".into()));
        }
        if item.unit_price <= Decimal::ZERO {
            return Err(AppError::BadRequest("unit price must be positive".into()));
        }
    }

    let restaurant = Restaurants::find_by_id(payload.restaurant_id)
        .one(&state.orm)
        .await?;
    if restaurant.is_none() {
        return Err(AppError::NotFound);
    }

    let lines: Vec<(Decimal, i32)> = payload
        .items
        .iter()
        .map(|i| (i.unit_price, i.quantity))
        .collect();
    let total_amount = order_total(&lines);

    let txn = state.orm.begin().await?;

    let order = OrderActive {
        id: NotSet,
        customer_id: Set(user.user_id),
        restaurant_id: Set(payload.restaurant_id),
        total_amount: Set(total_amount),
        status: Set(OrderStatus::Pending),
        delivery_address: Set(payload.delivery_address),
        special_instructions: Set(payload.special_instructions),
        delivery_id: Set(None),
        payment_id: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut items: Vec<OrderItem> = Vec::with_capacity(payload.items.len());
    for item in payload.items {
        let inserted = OrderItemActive {
            id: NotSet,
            order_id: Set(order.id),
            menu_item_id: Set(item.menu_item_id),
            item_name: Set(item.item_name),
            quantity: Set(item.quantity),
            unit_price: Set(item.unit_price),
            total_price: Set(line_total(item.unit_price, item.quantity)),
            special_requests: Set(item.special_requests),
        }
        .insert(&txn)
        .await?;

        items.push(order_item_from_entity(inserted));
    }

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_create",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "total": order.total_amount })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order created",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let resource = order_resource(state, &order).await?;
    authorize(user, Action::ViewOrder, resource)?;

    let items = load_items(state, order.id).await?;

    Ok(ApiResponse::success(
        "Order",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn my_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination.normalize();

    let mut finder = Orders::find().filter(OrderCol::CustomerId.eq(user.user_id));
    if let Some(status) = query.status {
        finder = finder.filter(OrderCol::Status.eq(status));
    }
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Orders", OrderList { items }, Some(meta)))
}

pub async fn orders_by_customer(
    state: &AppState,
    user: &AuthUser,
    customer_id: i64,
) -> AppResult<ApiResponse<OrderList>> {
    authorize(user, Action::ViewOrder, Resource::None)?;

    let items = Orders::find()
        .filter(OrderCol::CustomerId.eq(customer_id))
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Orders",
        OrderList { items },
        Some(Meta::empty()),
    ))
}

pub async fn orders_by_restaurant(
    state: &AppState,
    user: &AuthUser,
    restaurant_id: i64,
    active_only: bool,
) -> AppResult<ApiResponse<OrderList>> {
    let restaurant = Restaurants::find_by_id(restaurant_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    authorize(
        user,
        Action::ViewOrder,
        Resource::Restaurant {
            owner_id: restaurant.owner_id,
        },
    )?;

    let mut finder = Orders::find().filter(OrderCol::RestaurantId.eq(restaurant_id));
    if active_only {
        finder = finder.filter(OrderCol::Status.is_in(OrderStatus::active_statuses()));
    }

    let items = finder
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Orders",
        OrderList { items },
        Some(Meta::empty()),
    ))
}

pub async fn orders_by_status(
    state: &AppState,
    user: &AuthUser,
    status: OrderStatus,
) -> AppResult<ApiResponse<OrderList>> {
    authorize(user, Action::ViewOrder, Resource::None)?;

    let items = Orders::find()
        .filter(OrderCol::Status.eq(status))
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Orders",
        OrderList { items },
        Some(Meta::empty()),
    ))
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let resource = order_resource(state, &order).await?;
    authorize(user, Action::AdvanceOrder, resource)?;

    order.status.ensure_transition(payload.status)?;
    let updated = transition_order(state, id, order.status, payload.status).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_status_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": updated.id, "status": updated.status })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order updated",
        order_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn cancel_order(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<Order>> {
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let resource = order_resource(state, &order).await?;
    authorize(user, Action::CancelOrder, resource)?;

    if order.status == OrderStatus::Delivered {
        return Err(AppError::Conflict("Cannot cancel a delivered order".into()));
    }
    order.status.ensure_transition(OrderStatus::Cancelled)?;

    let updated = transition_order(state, id, order.status, OrderStatus::Cancelled).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_cancel",
        Some("orders"),
        Some(serde_json::json!({ "order_id": updated.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order cancelled",
        order_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn attach_delivery(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    delivery_id: i64,
) -> AppResult<ApiResponse<Order>> {
    authorize(user, Action::LinkOrder, Resource::None)?;

    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: OrderActive = order.into();
    active.delivery_id = Set(Some(delivery_id));
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Delivery attached",
        order_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn attach_payment(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payment_id: i64,
) -> AppResult<ApiResponse<Order>> {
    authorize(user, Action::LinkOrder, Resource::None)?;

    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: OrderActive = order.into();
    active.payment_id = Set(Some(payment_id));
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Payment attached",
        order_from_entity(updated),
        Some(Meta::empty()),
    ))
}

/// Compare-and-swap on the status column. A concurrent writer that moved the
/// order first makes the update match zero rows, which surfaces as Conflict
/// instead of silently overwriting.
async fn transition_order(
    state: &AppState,
    id: i64,
    current: OrderStatus,
    next: OrderStatus,
) -> AppResult<OrderModel> {
    let result = Orders::update_many()
        .col_expr(OrderCol::Status, Expr::value(next))
        .col_expr(OrderCol::UpdatedAt, Expr::value(Utc::now()))
        .filter(OrderCol::Id.eq(id))
        .filter(OrderCol::Status.eq(current))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::Conflict("Order was modified concurrently".into()));
    }

    Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

async fn order_resource(state: &AppState, order: &OrderModel) -> AppResult<Resource> {
    let restaurant_owner_id = Restaurants::find_by_id(order.restaurant_id)
        .one(&state.orm)
        .await?
        .map(|r| r.owner_id);

    Ok(Resource::Order {
        customer_id: order.customer_id,
        restaurant_owner_id,
    })
}

async fn load_items(state: &AppState, order_id: i64) -> AppResult<Vec<OrderItem>> {
    Ok(OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .order_by_asc(OrderItemCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect())
}

pub(crate) fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        customer_id: model.customer_id,
        restaurant_id: model.restaurant_id,
        total_amount: model.total_amount,
        status: model.status,
        delivery_address: model.delivery_address,
        special_instructions: model.special_instructions,
        delivery_id: model.delivery_id,
        payment_id: model.payment_id,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

pub(crate) fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        menu_item_id: model.menu_item_id,
        item_name: model.item_name,
        quantity: model.quantity,
        unit_price: model.unit_price,
        total_price: model.total_price,
        special_requests: model.special_requests,
    }
}
