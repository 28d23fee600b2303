use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::{
    audit::log_audit,
    dto::restaurants::{
        CreateRestaurantRequest, RestaurantList, UpdateRatingRequest, UpdateRestaurantRequest,
    },
    entity::restaurants::{
        ActiveModel as RestaurantActive, Column as RestaurantCol, Entity as Restaurants,
        Model as RestaurantModel,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Restaurant,
    policy::{Action, Resource, authorize},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

/// Condition shared by every customer-facing read: listed only when the
/// restaurant is both active and approved.
fn visible() -> Condition {
    Condition::all()
        .add(RestaurantCol::Active.eq(true))
        .add(RestaurantCol::Approved.eq(true))
}

pub async fn create_restaurant(
    state: &AppState,
    user: &AuthUser,
    payload: CreateRestaurantRequest,
) -> AppResult<ApiResponse<Restaurant>> {
    authorize(user, Action::CreateRestaurant, Resource::None)?;

    // New restaurants wait for admin approval before becoming visible.
    let restaurant = RestaurantActive {
        id: NotSet,
        name: Set(payload.name),
        address: Set(payload.address),
        phone: Set(payload.phone),
        email: Set(payload.email),
        cuisine_type: Set(payload.cuisine_type),
        description: Set(payload.description),
        image_url: Set(payload.image_url),
        opening_time: Set(payload.opening_time),
        closing_time: Set(payload.closing_time),
        rating: Set(0.0),
        total_reviews: Set(0),
        delivery_fee: Set(payload.delivery_fee),
        estimated_delivery_time: Set(payload.estimated_delivery_time),
        active: Set(true),
        approved: Set(false),
        owner_id: Set(user.user_id),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "restaurant_create",
        Some("restaurants"),
        Some(serde_json::json!({ "restaurant_id": restaurant.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Restaurant created",
        restaurant_from_entity(restaurant),
        Some(Meta::empty()),
    ))
}

pub async fn list_restaurants(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<RestaurantList>> {
    let (page, limit, offset) = pagination.normalize();

    let finder = Restaurants::find()
        .filter(visible())
        .order_by_desc(RestaurantCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(restaurant_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Restaurants",
        RestaurantList { items },
        Some(meta),
    ))
}

pub async fn get_restaurant(state: &AppState, id: i64) -> AppResult<ApiResponse<Restaurant>> {
    let record = Restaurants::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success(
        "Restaurant",
        restaurant_from_entity(record),
        None,
    ))
}

pub async fn my_restaurants(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<RestaurantList>> {
    let items = Restaurants::find()
        .filter(RestaurantCol::OwnerId.eq(user.user_id))
        .order_by_desc(RestaurantCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(restaurant_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Restaurants",
        RestaurantList { items },
        Some(Meta::empty()),
    ))
}

pub async fn restaurants_by_owner(
    state: &AppState,
    user: &AuthUser,
    owner_id: i64,
) -> AppResult<ApiResponse<RestaurantList>> {
    authorize(user, Action::ViewAnyRestaurant, Resource::None)?;

    let items = Restaurants::find()
        .filter(RestaurantCol::OwnerId.eq(owner_id))
        .order_by_desc(RestaurantCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(restaurant_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Restaurants",
        RestaurantList { items },
        Some(Meta::empty()),
    ))
}

pub async fn restaurants_by_cuisine(
    state: &AppState,
    cuisine: String,
) -> AppResult<ApiResponse<RestaurantList>> {
    let items = Restaurants::find()
        .filter(visible().add(RestaurantCol::CuisineType.eq(cuisine)))
        .order_by_desc(RestaurantCol::Rating)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(restaurant_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Restaurants",
        RestaurantList { items },
        Some(Meta::empty()),
    ))
}

pub async fn search_restaurants(
    state: &AppState,
    name: String,
) -> AppResult<ApiResponse<RestaurantList>> {
    let items = Restaurants::find()
        .filter(visible().add(RestaurantCol::Name.contains(&name)))
        .order_by_desc(RestaurantCol::Rating)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(restaurant_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Restaurants",
        RestaurantList { items },
        Some(Meta::empty()),
    ))
}

pub async fn top_rated_restaurants(state: &AppState) -> AppResult<ApiResponse<RestaurantList>> {
    let items = Restaurants::find()
        .filter(visible())
        .order_by_desc(RestaurantCol::Rating)
        .limit(20)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(restaurant_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Restaurants",
        RestaurantList { items },
        Some(Meta::empty()),
    ))
}

pub async fn update_restaurant(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: UpdateRestaurantRequest,
) -> AppResult<ApiResponse<Restaurant>> {
    let record = Restaurants::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    authorize(
        user,
        Action::UpdateRestaurant,
        Resource::Restaurant {
            owner_id: record.owner_id,
        },
    )?;

    let mut active: RestaurantActive = record.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(address) = payload.address {
        active.address = Set(address);
    }
    if let Some(cuisine) = payload.cuisine_type {
        active.cuisine_type = Set(cuisine);
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(email) = payload.email {
        active.email = Set(Some(email));
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url));
    }
    if let Some(opening) = payload.opening_time {
        active.opening_time = Set(Some(opening));
    }
    if let Some(closing) = payload.closing_time {
        active.closing_time = Set(Some(closing));
    }
    if let Some(fee) = payload.delivery_fee {
        active.delivery_fee = Set(Some(fee));
    }
    if let Some(eta) = payload.estimated_delivery_time {
        active.estimated_delivery_time = Set(Some(eta));
    }
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Restaurant updated",
        restaurant_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn update_rating(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: UpdateRatingRequest,
) -> AppResult<ApiResponse<Restaurant>> {
    authorize(user, Action::ApproveRestaurant, Resource::None)?;

    if !(0.0..=5.0).contains(&payload.rating) {
        return Err(AppError::BadRequest("rating must be between 0 and 5".into()));
    }

    let record = Restaurants::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: RestaurantActive = record.into();
    active.rating = Set(payload.rating);
    active.total_reviews = Set(payload.total_reviews);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Rating updated",
        restaurant_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn approve_restaurant(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<Restaurant>> {
    authorize(user, Action::ApproveRestaurant, Resource::None)?;
    set_approval(state, user, id, true).await
}

/// Rejection also deactivates so the listing cannot resurface by toggling
/// the active flag alone.
pub async fn reject_restaurant(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<Restaurant>> {
    authorize(user, Action::ApproveRestaurant, Resource::None)?;
    set_approval(state, user, id, false).await
}

async fn set_approval(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    approved: bool,
) -> AppResult<ApiResponse<Restaurant>> {
    let record = Restaurants::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: RestaurantActive = record.into();
    active.approved = Set(approved);
    if !approved {
        active.active = Set(false);
    }
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        if approved {
            "restaurant_approve"
        } else {
            "restaurant_reject"
        },
        Some("restaurants"),
        Some(serde_json::json!({ "restaurant_id": updated.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        if approved { "Approved" } else { "Rejected" },
        restaurant_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub(crate) fn restaurant_from_entity(model: RestaurantModel) -> Restaurant {
    Restaurant {
        id: model.id,
        name: model.name,
        address: model.address,
        phone: model.phone,
        email: model.email,
        cuisine_type: model.cuisine_type,
        description: model.description,
        image_url: model.image_url,
        opening_time: model.opening_time,
        closing_time: model.closing_time,
        rating: model.rating,
        total_reviews: model.total_reviews,
        delivery_fee: model.delivery_fee,
        estimated_delivery_time: model.estimated_delivery_time,
        active: model.active,
        approved: model.approved,
        owner_id: model.owner_id,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
