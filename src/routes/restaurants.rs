use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};

use crate::{
    dto::restaurants::{
        CreateRestaurantRequest, RestaurantList, UpdateRatingRequest, UpdateRestaurantRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Restaurant,
    response::ApiResponse,
    routes::params::{NameQuery, Pagination},
    services::restaurant_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_restaurant).get(list_restaurants))
        .route("/my-restaurants", get(my_restaurants))
        .route("/owner/{owner_id}", get(restaurants_by_owner))
        .route("/cuisine/{cuisine}", get(restaurants_by_cuisine))
        .route("/search", get(search_restaurants))
        .route("/top-rated", get(top_rated))
        .route("/{id}", get(get_restaurant).put(update_restaurant))
        .route("/{id}/rating", put(update_rating))
        .route("/{id}/approve", put(approve_restaurant))
        .route("/{id}/reject", put(reject_restaurant))
}

#[utoipa::path(
    post,
    path = "/api/restaurants",
    request_body = CreateRestaurantRequest,
    responses(
        (status = 200, description = "Restaurant created (pending approval)", body = ApiResponse<Restaurant>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Restaurants"
)]
pub async fn create_restaurant(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateRestaurantRequest>,
) -> AppResult<Json<ApiResponse<Restaurant>>> {
    let resp = restaurant_service::create_restaurant(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/restaurants",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Active approved restaurants", body = ApiResponse<RestaurantList>)
    ),
    tag = "Restaurants"
)]
pub async fn list_restaurants(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<RestaurantList>>> {
    let resp = restaurant_service::list_restaurants(&state, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/restaurants/my-restaurants", tag = "Restaurants")]
pub async fn my_restaurants(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<RestaurantList>>> {
    let resp = restaurant_service::my_restaurants(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/restaurants/owner/{owner_id}", tag = "Restaurants")]
pub async fn restaurants_by_owner(
    State(state): State<AppState>,
    user: AuthUser,
    Path(owner_id): Path<i64>,
) -> AppResult<Json<ApiResponse<RestaurantList>>> {
    let resp = restaurant_service::restaurants_by_owner(&state, &user, owner_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/restaurants/cuisine/{cuisine}", tag = "Restaurants")]
pub async fn restaurants_by_cuisine(
    State(state): State<AppState>,
    Path(cuisine): Path<String>,
) -> AppResult<Json<ApiResponse<RestaurantList>>> {
    let resp = restaurant_service::restaurants_by_cuisine(&state, cuisine).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/restaurants/search",
    params(
        ("name" = String, Query, description = "Name fragment")
    ),
    tag = "Restaurants"
)]
pub async fn search_restaurants(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> AppResult<Json<ApiResponse<RestaurantList>>> {
    let resp = restaurant_service::search_restaurants(&state, query.name).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/restaurants/top-rated", tag = "Restaurants")]
pub async fn top_rated(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<RestaurantList>>> {
    let resp = restaurant_service::top_rated_restaurants(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/restaurants/{id}",
    params(
        ("id" = i64, Path, description = "Restaurant ID")
    ),
    responses(
        (status = 200, description = "Restaurant", body = ApiResponse<Restaurant>),
        (status = 404, description = "Not Found")
    ),
    tag = "Restaurants"
)]
pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Restaurant>>> {
    let resp = restaurant_service::get_restaurant(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/restaurants/{id}",
    request_body = UpdateRestaurantRequest,
    responses(
        (status = 200, description = "Updated restaurant", body = ApiResponse<Restaurant>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Restaurants"
)]
pub async fn update_restaurant(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateRestaurantRequest>,
) -> AppResult<Json<ApiResponse<Restaurant>>> {
    let resp = restaurant_service::update_restaurant(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/restaurants/{id}/rating",
    request_body = UpdateRatingRequest,
    security(("bearer_auth" = [])),
    tag = "Restaurants"
)]
pub async fn update_rating(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateRatingRequest>,
) -> AppResult<Json<ApiResponse<Restaurant>>> {
    let resp = restaurant_service::update_rating(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/restaurants/{id}/approve",
    security(("bearer_auth" = [])),
    tag = "Restaurants"
)]
pub async fn approve_restaurant(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Restaurant>>> {
    let resp = restaurant_service::approve_restaurant(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/restaurants/{id}/reject",
    security(("bearer_auth" = [])),
    tag = "Restaurants"
)]
pub async fn reject_restaurant(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Restaurant>>> {
    let resp = restaurant_service::reject_restaurant(&state, &user, id).await?;
    Ok(Json(resp))
}
