use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    audit::log_audit,
    domain::Role,
    dto::users::UserList,
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::User,
    policy::{Action, Resource, authorize},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::user_service::user_from_entity,
    state::AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct UserStats {
    pub total_users: i64,
    pub customers: i64,
    pub restaurant_owners: i64,
    pub delivery_people: i64,
}

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<UserList>> {
    authorize(user, Action::ManageUsers, Resource::None)?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Users::find().order_by_desc(UserCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(user_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Users", UserList { items }, Some(meta)))
}

pub async fn users_by_role(
    state: &AppState,
    user: &AuthUser,
    role: Role,
) -> AppResult<ApiResponse<UserList>> {
    authorize(user, Action::ManageUsers, Resource::None)?;

    let items = Users::find()
        .filter(UserCol::Role.eq(role))
        .order_by_desc(UserCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(user_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Users",
        UserList { items },
        Some(Meta::empty()),
    ))
}

pub async fn active_users(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<UserList>> {
    authorize(user, Action::ManageUsers, Resource::None)?;

    let items = Users::find()
        .filter(UserCol::Active.eq(true))
        .order_by_desc(UserCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(user_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Users",
        UserList { items },
        Some(Meta::empty()),
    ))
}

pub async fn search_users(
    state: &AppState,
    user: &AuthUser,
    name: String,
) -> AppResult<ApiResponse<UserList>> {
    authorize(user, Action::ManageUsers, Resource::None)?;

    let items = Users::find()
        .filter(UserCol::Active.eq(true))
        .filter(UserCol::Name.contains(&name))
        .order_by_asc(UserCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(user_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Users",
        UserList { items },
        Some(Meta::empty()),
    ))
}

pub async fn activate_user(state: &AppState, user: &AuthUser, id: i64) -> AppResult<ApiResponse<User>> {
    authorize(user, Action::ManageUsers, Resource::None)?;
    set_active(state, user, id, true).await
}

pub async fn deactivate_user(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<User>> {
    authorize(user, Action::ManageUsers, Resource::None)?;
    set_active(state, user, id, false).await
}

async fn set_active(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    active: bool,
) -> AppResult<ApiResponse<User>> {
    let record = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut model: UserActive = record.into();
    model.active = Set(active);
    model.updated_at = Set(Utc::now().into());
    let updated = model.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        if active { "user_activate" } else { "user_deactivate" },
        Some("users"),
        Some(serde_json::json!({ "user_id": updated.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        if active { "User activated" } else { "User deactivated" },
        user_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn user_stats(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<UserStats>> {
    authorize(user, Action::ManageUsers, Resource::None)?;

    let total_users = Users::find().count(&state.orm).await? as i64;
    let customers = count_active_role(state, Role::Customer).await?;
    let restaurant_owners = count_active_role(state, Role::Restaurant).await?;
    let delivery_people = count_active_role(state, Role::Delivery).await?;

    let stats = UserStats {
        total_users,
        customers,
        restaurant_owners,
        delivery_people,
    };

    Ok(ApiResponse::success("Stats", stats, Some(Meta::empty())))
}

async fn count_active_role(state: &AppState, role: Role) -> AppResult<i64> {
    Ok(Users::find()
        .filter(UserCol::Active.eq(true))
        .filter(UserCol::Role.eq(role))
        .count(&state.orm)
        .await? as i64)
}
