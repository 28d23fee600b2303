use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};

use crate::{
    domain::Role,
    dto::users::UserList,
    error::AppResult,
    middleware::auth::AuthUser,
    models::User,
    response::ApiResponse,
    routes::params::{NameQuery, Pagination},
    services::admin_service::{self, UserStats},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/role/{role}", get(users_by_role))
        .route("/users/active", get(active_users))
        .route("/users/search", get(search_users))
        .route("/users/{id}/activate", put(activate_user))
        .route("/users/{id}/deactivate", put(deactivate_user))
        .route("/stats", get(user_stats))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "All users (admin only)", body = ApiResponse<UserList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<UserList>>> {
    let resp = admin_service::list_users(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/users/role/{role}",
    params(
        ("role" = Role, Path, description = "User role")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn users_by_role(
    State(state): State<AppState>,
    user: AuthUser,
    Path(role): Path<Role>,
) -> AppResult<Json<ApiResponse<UserList>>> {
    let resp = admin_service::users_by_role(&state, &user, role).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/admin/users/active", security(("bearer_auth" = [])), tag = "Admin")]
pub async fn active_users(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<UserList>>> {
    let resp = admin_service::active_users(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/users/search",
    params(
        ("name" = String, Query, description = "Name fragment")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn search_users(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<NameQuery>,
) -> AppResult<Json<ApiResponse<UserList>>> {
    let resp = admin_service::search_users(&state, &user, query.name).await?;
    Ok(Json(resp))
}

#[utoipa::path(put, path = "/api/admin/users/{id}/activate", security(("bearer_auth" = [])), tag = "Admin")]
pub async fn activate_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = admin_service::activate_user(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(put, path = "/api/admin/users/{id}/deactivate", security(("bearer_auth" = [])), tag = "Admin")]
pub async fn deactivate_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = admin_service::deactivate_user(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "User counts by role", body = ApiResponse<UserStats>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn user_stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<UserStats>>> {
    let resp = admin_service::user_stats(&state, &user).await?;
    Ok(Json(resp))
}
