use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};

use crate::{
    dto::menu::{
        CategoryList, CreateMenuItemRequest, MenuItemList, UpdateAvailabilityRequest,
        UpdateMenuItemRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::MenuItem,
    response::ApiResponse,
    routes::params::NameQuery,
    services::menu_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_menu_item))
        .route("/restaurant/{restaurant_id}", get(menu_by_restaurant))
        .route("/restaurant/{restaurant_id}/all", get(full_menu_by_restaurant))
        .route(
            "/restaurant/{restaurant_id}/category/{category}",
            get(menu_by_category),
        )
        .route("/restaurant/{restaurant_id}/categories", get(categories))
        .route("/restaurant/{restaurant_id}/search", get(search_menu_items))
        .route("/{id}", get(get_menu_item).put(update_menu_item).delete(delete_menu_item))
        .route("/{id}/availability", put(update_availability))
}

#[utoipa::path(
    post,
    path = "/api/menu",
    request_body = CreateMenuItemRequest,
    responses(
        (status = 200, description = "Menu item created", body = ApiResponse<MenuItem>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Menu"
)]
pub async fn create_menu_item(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateMenuItemRequest>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    let resp = menu_service::create_menu_item(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/menu/{id}", tag = "Menu")]
pub async fn get_menu_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    let resp = menu_service::get_menu_item(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/menu/restaurant/{restaurant_id}",
    responses(
        (status = 200, description = "Available menu items", body = ApiResponse<MenuItemList>)
    ),
    tag = "Menu"
)]
pub async fn menu_by_restaurant(
    State(state): State<AppState>,
    Path(restaurant_id): Path<i64>,
) -> AppResult<Json<ApiResponse<MenuItemList>>> {
    let resp = menu_service::menu_by_restaurant(&state, restaurant_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/menu/restaurant/{restaurant_id}/all",
    security(("bearer_auth" = [])),
    tag = "Menu"
)]
pub async fn full_menu_by_restaurant(
    State(state): State<AppState>,
    user: AuthUser,
    Path(restaurant_id): Path<i64>,
) -> AppResult<Json<ApiResponse<MenuItemList>>> {
    let resp = menu_service::full_menu_by_restaurant(&state, &user, restaurant_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/menu/restaurant/{restaurant_id}/category/{category}",
    tag = "Menu"
)]
pub async fn menu_by_category(
    State(state): State<AppState>,
    Path((restaurant_id, category)): Path<(i64, String)>,
) -> AppResult<Json<ApiResponse<MenuItemList>>> {
    let resp = menu_service::menu_by_category(&state, restaurant_id, category).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/menu/restaurant/{restaurant_id}/categories", tag = "Menu")]
pub async fn categories(
    State(state): State<AppState>,
    Path(restaurant_id): Path<i64>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let resp = menu_service::categories_by_restaurant(&state, restaurant_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/menu/restaurant/{restaurant_id}/search",
    params(
        ("name" = String, Query, description = "Name fragment")
    ),
    tag = "Menu"
)]
pub async fn search_menu_items(
    State(state): State<AppState>,
    Path(restaurant_id): Path<i64>,
    Query(query): Query<NameQuery>,
) -> AppResult<Json<ApiResponse<MenuItemList>>> {
    let resp = menu_service::search_menu_items(&state, restaurant_id, query.name).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/menu/{id}",
    request_body = UpdateMenuItemRequest,
    security(("bearer_auth" = [])),
    tag = "Menu"
)]
pub async fn update_menu_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateMenuItemRequest>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    let resp = menu_service::update_menu_item(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/menu/{id}/availability",
    request_body = UpdateAvailabilityRequest,
    security(("bearer_auth" = [])),
    tag = "Menu"
)]
pub async fn update_availability(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateAvailabilityRequest>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    let resp = menu_service::update_availability(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/menu/{id}",
    security(("bearer_auth" = [])),
    tag = "Menu"
)]
pub async fn delete_menu_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = menu_service::delete_menu_item(&state, &user, id).await?;
    Ok(Json(resp))
}
