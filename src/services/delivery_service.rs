use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::{
    audit::log_audit,
    domain::DeliveryStatus,
    dto::deliveries::{
        AssignDeliveryRequest, CreateDeliveryRequest, DeliveryList, OptimalDeliveriesQuery,
        UpdateDeliveryStatusRequest, UpdateEstimatedTimeRequest, UpdateLocationRequest,
        UpdateNotesRequest,
    },
    entity::deliveries::{
        ActiveModel as DeliveryActive, Column as DeliveryCol, Entity as Deliveries,
        Model as DeliveryModel,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Delivery,
    policy::{Action, Resource, authorize},
    response::{ApiResponse, Meta},
    state::AppState,
};

static TRACKING_SEQ: AtomicU64 = AtomicU64::new(0);

/// Time-based tracking code, unique via the process-local sequence suffix.
fn generate_tracking_code() -> String {
    let millis = Utc::now().timestamp_millis();
    let seq = TRACKING_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("TRK{millis}{seq:04}")
}

pub async fn create_delivery(
    state: &AppState,
    user: &AuthUser,
    payload: CreateDeliveryRequest,
) -> AppResult<ApiResponse<Delivery>> {
    authorize(user, Action::CreateDelivery, Resource::None)?;

    let exists = Deliveries::find()
        .filter(DeliveryCol::OrderId.eq(payload.order_id))
        .one(&state.orm)
        .await?;
    if exists.is_some() {
        return Err(AppError::Conflict(
            "Delivery already exists for this order".into(),
        ));
    }

    let delivery = DeliveryActive {
        id: NotSet,
        order_id: Set(payload.order_id),
        delivery_person_id: Set(None),
        status: Set(DeliveryStatus::Pending),
        pickup_address: Set(payload.pickup_address),
        delivery_address: Set(payload.delivery_address),
        assigned_at: Set(None),
        picked_up_at: Set(None),
        delivered_at: Set(None),
        estimated_delivery_time: Set(payload.estimated_delivery_time.map(Into::into)),
        current_latitude: Set(None),
        current_longitude: Set(None),
        delivery_notes: Set(payload.delivery_notes),
        tracking_code: Set(generate_tracking_code()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "delivery_create",
        Some("deliveries"),
        Some(serde_json::json!({ "delivery_id": delivery.id, "order_id": delivery.order_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Delivery created",
        delivery_from_entity(delivery),
        Some(Meta::empty()),
    ))
}

pub async fn get_delivery(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<Delivery>> {
    let delivery = Deliveries::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    authorize(
        user,
        Action::ViewDelivery,
        Resource::Delivery {
            delivery_person_id: delivery.delivery_person_id,
        },
    )?;

    Ok(ApiResponse::success(
        "Delivery",
        delivery_from_entity(delivery),
        None,
    ))
}

pub async fn delivery_by_order(
    state: &AppState,
    user: &AuthUser,
    order_id: i64,
) -> AppResult<ApiResponse<Delivery>> {
    authorize(user, Action::ViewDelivery, Resource::None)?;

    let delivery = Deliveries::find()
        .filter(DeliveryCol::OrderId.eq(order_id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success(
        "Delivery",
        delivery_from_entity(delivery),
        None,
    ))
}

/// Public tracking endpoint; the code itself is the capability.
pub async fn track_delivery(state: &AppState, code: String) -> AppResult<ApiResponse<Delivery>> {
    let delivery = Deliveries::find()
        .filter(DeliveryCol::TrackingCode.eq(code))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success(
        "Delivery",
        delivery_from_entity(delivery),
        None,
    ))
}

pub async fn my_deliveries(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<DeliveryList>> {
    let items = Deliveries::find()
        .filter(DeliveryCol::DeliveryPersonId.eq(user.user_id))
        .order_by_desc(DeliveryCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(delivery_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Deliveries",
        DeliveryList { items },
        Some(Meta::empty()),
    ))
}

pub async fn my_active_deliveries(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<DeliveryList>> {
    let items = Deliveries::find()
        .filter(DeliveryCol::DeliveryPersonId.eq(user.user_id))
        .filter(DeliveryCol::Status.is_in(DeliveryStatus::active_statuses()))
        .order_by_desc(DeliveryCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(delivery_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Deliveries",
        DeliveryList { items },
        Some(Meta::empty()),
    ))
}

pub async fn pending_deliveries(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<DeliveryList>> {
    authorize(user, Action::ViewDeliveryQueue, Resource::None)?;

    let items = Deliveries::find()
        .filter(DeliveryCol::Status.eq(DeliveryStatus::Pending))
        .order_by_asc(DeliveryCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(delivery_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Deliveries",
        DeliveryList { items },
        Some(Meta::empty()),
    ))
}

pub async fn unassigned_deliveries(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<DeliveryList>> {
    authorize(user, Action::ViewDeliveryQueue, Resource::None)?;

    let items = Deliveries::find()
        .filter(DeliveryCol::Status.eq(DeliveryStatus::Pending))
        .filter(DeliveryCol::DeliveryPersonId.is_null())
        .order_by_asc(DeliveryCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(delivery_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Deliveries",
        DeliveryList { items },
        Some(Meta::empty()),
    ))
}

/// Admin assignment of an arbitrary courier.
pub async fn assign_delivery(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: AssignDeliveryRequest,
) -> AppResult<ApiResponse<Delivery>> {
    authorize(user, Action::AssignDelivery, Resource::None)?;
    claim_pending(state, user, id, payload.delivery_person_id).await
}

/// Courier self-assignment.
pub async fn accept_delivery(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<Delivery>> {
    authorize(user, Action::AcceptDelivery, Resource::None)?;
    claim_pending(state, user, id, user.user_id).await
}

/// Assignment is only legal while the delivery is still PENDING and
/// unclaimed. The conditional update makes two couriers racing for the same
/// delivery resolve to exactly one winner.
async fn claim_pending(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    delivery_person_id: i64,
) -> AppResult<ApiResponse<Delivery>> {
    let now = Utc::now();
    let result = Deliveries::update_many()
        .col_expr(DeliveryCol::DeliveryPersonId, Expr::value(delivery_person_id))
        .col_expr(DeliveryCol::Status, Expr::value(DeliveryStatus::Assigned))
        .col_expr(DeliveryCol::AssignedAt, Expr::value(now))
        .col_expr(DeliveryCol::UpdatedAt, Expr::value(now))
        .filter(DeliveryCol::Id.eq(id))
        .filter(DeliveryCol::Status.eq(DeliveryStatus::Pending))
        .filter(DeliveryCol::DeliveryPersonId.is_null())
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        // Either the id is unknown or someone else claimed it first.
        return match Deliveries::find_by_id(id).one(&state.orm).await? {
            None => Err(AppError::NotFound),
            Some(_) => Err(AppError::Conflict("Delivery is not in pending status".into())),
        };
    }

    let delivery = Deliveries::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "delivery_assign",
        Some("deliveries"),
        Some(serde_json::json!({ "delivery_id": id, "delivery_person_id": delivery_person_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Delivery assigned",
        delivery_from_entity(delivery),
        Some(Meta::empty()),
    ))
}

pub async fn update_delivery_status(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: UpdateDeliveryStatusRequest,
) -> AppResult<ApiResponse<Delivery>> {
    let delivery = Deliveries::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    authorize(
        user,
        Action::UpdateDelivery,
        Resource::Delivery {
            delivery_person_id: delivery.delivery_person_id,
        },
    )?;

    delivery.status.ensure_transition(payload.status)?;
    let updated = transition_delivery(state, id, delivery.status, payload.status).await?;

    Ok(ApiResponse::success(
        "Delivery updated",
        delivery_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn update_location(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: UpdateLocationRequest,
) -> AppResult<ApiResponse<Delivery>> {
    let delivery = Deliveries::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    authorize(
        user,
        Action::UpdateDelivery,
        Resource::Delivery {
            delivery_person_id: delivery.delivery_person_id,
        },
    )?;

    let mut active: DeliveryActive = delivery.into();
    active.current_latitude = Set(Some(payload.latitude));
    active.current_longitude = Set(Some(payload.longitude));
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Location updated",
        delivery_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn update_estimated_time(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: UpdateEstimatedTimeRequest,
) -> AppResult<ApiResponse<Delivery>> {
    let delivery = Deliveries::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    authorize(
        user,
        Action::UpdateDelivery,
        Resource::Delivery {
            delivery_person_id: delivery.delivery_person_id,
        },
    )?;

    let mut active: DeliveryActive = delivery.into();
    active.estimated_delivery_time = Set(Some(payload.estimated_delivery_time.into()));
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Estimated time updated",
        delivery_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn update_notes(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: UpdateNotesRequest,
) -> AppResult<ApiResponse<Delivery>> {
    let delivery = Deliveries::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    authorize(
        user,
        Action::UpdateDelivery,
        Resource::Delivery {
            delivery_person_id: delivery.delivery_person_id,
        },
    )?;

    let mut active: DeliveryActive = delivery.into();
    active.delivery_notes = Set(Some(payload.notes));
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Notes updated",
        delivery_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn cancel_delivery(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<Delivery>> {
    let delivery = Deliveries::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    authorize(
        user,
        Action::CancelDelivery,
        Resource::Delivery {
            delivery_person_id: delivery.delivery_person_id,
        },
    )?;

    if delivery.status == DeliveryStatus::Delivered {
        return Err(AppError::Conflict("Cannot cancel a delivered order".into()));
    }
    delivery.status.ensure_transition(DeliveryStatus::Cancelled)?;

    let updated = transition_delivery(state, id, delivery.status, DeliveryStatus::Cancelled).await?;

    Ok(ApiResponse::success(
        "Delivery cancelled",
        delivery_from_entity(updated),
        Some(Meta::empty()),
    ))
}

/// First-come queue of unassigned pending deliveries. The courier's
/// coordinates are accepted but not used for ranking; there is no
/// geographic optimization here.
pub async fn optimal_deliveries(
    state: &AppState,
    user: &AuthUser,
    query: OptimalDeliveriesQuery,
) -> AppResult<ApiResponse<DeliveryList>> {
    authorize(user, Action::ViewDeliveryQueue, Resource::None)?;

    let max = query.max.unwrap_or(5).clamp(1, 50);
    tracing::debug!(
        latitude = query.latitude,
        longitude = query.longitude,
        max,
        "optimal delivery lookup"
    );

    let items = Deliveries::find()
        .filter(DeliveryCol::Status.eq(DeliveryStatus::Pending))
        .filter(DeliveryCol::DeliveryPersonId.is_null())
        .order_by_asc(DeliveryCol::CreatedAt)
        .order_by_asc(DeliveryCol::Id)
        .limit(max)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(delivery_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Deliveries",
        DeliveryList { items },
        Some(Meta::empty()),
    ))
}

/// Compare-and-swap status move that also stamps the matching timestamp.
async fn transition_delivery(
    state: &AppState,
    id: i64,
    current: DeliveryStatus,
    next: DeliveryStatus,
) -> AppResult<DeliveryModel> {
    let now = Utc::now();
    let mut update = Deliveries::update_many()
        .col_expr(DeliveryCol::Status, Expr::value(next))
        .col_expr(DeliveryCol::UpdatedAt, Expr::value(now));

    update = match next {
        DeliveryStatus::Assigned => update.col_expr(DeliveryCol::AssignedAt, Expr::value(now)),
        DeliveryStatus::PickedUp => update.col_expr(DeliveryCol::PickedUpAt, Expr::value(now)),
        DeliveryStatus::Delivered => update.col_expr(DeliveryCol::DeliveredAt, Expr::value(now)),
        _ => update,
    };

    let result = update
        .filter(DeliveryCol::Id.eq(id))
        .filter(DeliveryCol::Status.eq(current))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::Conflict(
            "Delivery was modified concurrently".into(),
        ));
    }

    Deliveries::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

pub(crate) fn delivery_from_entity(model: DeliveryModel) -> Delivery {
    Delivery {
        id: model.id,
        order_id: model.order_id,
        delivery_person_id: model.delivery_person_id,
        status: model.status,
        pickup_address: model.pickup_address,
        delivery_address: model.delivery_address,
        assigned_at: model.assigned_at.map(|dt| dt.with_timezone(&Utc)),
        picked_up_at: model.picked_up_at.map(|dt| dt.with_timezone(&Utc)),
        delivered_at: model.delivered_at.map(|dt| dt.with_timezone(&Utc)),
        estimated_delivery_time: model
            .estimated_delivery_time
            .map(|dt| dt.with_timezone(&Utc)),
        current_latitude: model.current_latitude,
        current_longitude: model.current_longitude,
        delivery_notes: model.delivery_notes,
        tracking_code: model.tracking_code,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
