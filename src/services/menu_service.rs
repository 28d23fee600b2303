use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::{
    dto::menu::{
        CategoryList, CreateMenuItemRequest, MenuItemList, UpdateAvailabilityRequest,
        UpdateMenuItemRequest,
    },
    entity::{
        menu_items::{
            ActiveModel as MenuItemActive, Column as MenuItemCol, Entity as MenuItems,
            Model as MenuItemModel,
        },
        restaurants::Entity as Restaurants,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::MenuItem,
    policy::{Action, Resource, authorize},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Look up the restaurant's owner so the policy can decide menu management.
async fn restaurant_owner(state: &AppState, restaurant_id: i64) -> AppResult<i64> {
    let restaurant = Restaurants::find_by_id(restaurant_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(restaurant.owner_id)
}

pub async fn create_menu_item(
    state: &AppState,
    user: &AuthUser,
    payload: CreateMenuItemRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    let owner_id = restaurant_owner(state, payload.restaurant_id).await?;
    authorize(user, Action::ManageMenu, Resource::Restaurant { owner_id })?;

    if payload.price <= Decimal::ZERO {
        return Err(AppError::BadRequest("price must be positive".into()));
    }

    let item = MenuItemActive {
        id: NotSet,
        name: Set(payload.name),
        description: Set(payload.description),
        price: Set(payload.price),
        restaurant_id: Set(payload.restaurant_id),
        category: Set(payload.category),
        image_url: Set(payload.image_url),
        available: Set(true),
        ingredients: Set(payload.ingredients),
        allergens: Set(payload.allergens),
        preparation_time: Set(payload.preparation_time),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Menu item created",
        menu_item_from_entity(item),
        Some(Meta::empty()),
    ))
}

pub async fn get_menu_item(state: &AppState, id: i64) -> AppResult<ApiResponse<MenuItem>> {
    let item = MenuItems::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success("Menu item", menu_item_from_entity(item), None))
}

/// Customer-facing menu: available items only.
pub async fn menu_by_restaurant(
    state: &AppState,
    restaurant_id: i64,
) -> AppResult<ApiResponse<MenuItemList>> {
    let items = MenuItems::find()
        .filter(MenuItemCol::RestaurantId.eq(restaurant_id))
        .filter(MenuItemCol::Available.eq(true))
        .order_by_asc(MenuItemCol::Category)
        .order_by_asc(MenuItemCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(menu_item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Menu",
        MenuItemList { items },
        Some(Meta::empty()),
    ))
}

/// Owner view including unavailable items.
pub async fn full_menu_by_restaurant(
    state: &AppState,
    user: &AuthUser,
    restaurant_id: i64,
) -> AppResult<ApiResponse<MenuItemList>> {
    let owner_id = restaurant_owner(state, restaurant_id).await?;
    authorize(user, Action::ManageMenu, Resource::Restaurant { owner_id })?;

    let items = MenuItems::find()
        .filter(MenuItemCol::RestaurantId.eq(restaurant_id))
        .order_by_asc(MenuItemCol::Category)
        .order_by_asc(MenuItemCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(menu_item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Menu",
        MenuItemList { items },
        Some(Meta::empty()),
    ))
}

pub async fn menu_by_category(
    state: &AppState,
    restaurant_id: i64,
    category: String,
) -> AppResult<ApiResponse<MenuItemList>> {
    let items = MenuItems::find()
        .filter(MenuItemCol::RestaurantId.eq(restaurant_id))
        .filter(MenuItemCol::Available.eq(true))
        .filter(MenuItemCol::Category.eq(category))
        .order_by_asc(MenuItemCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(menu_item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Menu",
        MenuItemList { items },
        Some(Meta::empty()),
    ))
}

pub async fn categories_by_restaurant(
    state: &AppState,
    restaurant_id: i64,
) -> AppResult<ApiResponse<CategoryList>> {
    let categories: Vec<Option<String>> = MenuItems::find()
        .select_only()
        .column(MenuItemCol::Category)
        .distinct()
        .filter(MenuItemCol::RestaurantId.eq(restaurant_id))
        .filter(MenuItemCol::Available.eq(true))
        .into_tuple()
        .all(&state.orm)
        .await?;

    let items = categories.into_iter().flatten().collect();

    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(Meta::empty()),
    ))
}

pub async fn search_menu_items(
    state: &AppState,
    restaurant_id: i64,
    name: String,
) -> AppResult<ApiResponse<MenuItemList>> {
    let items = MenuItems::find()
        .filter(MenuItemCol::RestaurantId.eq(restaurant_id))
        .filter(MenuItemCol::Available.eq(true))
        .filter(MenuItemCol::Name.contains(&name))
        .order_by_asc(MenuItemCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(menu_item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Menu",
        MenuItemList { items },
        Some(Meta::empty()),
    ))
}

pub async fn update_menu_item(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: UpdateMenuItemRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    let item = MenuItems::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let owner_id = restaurant_owner(state, item.restaurant_id).await?;
    authorize(user, Action::ManageMenu, Resource::Restaurant { owner_id })?;

    if let Some(price) = payload.price {
        if price <= Decimal::ZERO {
            return Err(AppError::BadRequest("price must be positive".into()));
        }
    }

    let mut active: MenuItemActive = item.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(category) = payload.category {
        active.category = Set(Some(category));
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url));
    }
    if let Some(ingredients) = payload.ingredients {
        active.ingredients = Set(Some(ingredients));
    }
    if let Some(allergens) = payload.allergens {
        active.allergens = Set(Some(allergens));
    }
    if let Some(prep) = payload.preparation_time {
        active.preparation_time = Set(Some(prep));
    }
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Menu item updated",
        menu_item_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn update_availability(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: UpdateAvailabilityRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    let item = MenuItems::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let owner_id = restaurant_owner(state, item.restaurant_id).await?;
    authorize(user, Action::ManageMenu, Resource::Restaurant { owner_id })?;

    let mut active: MenuItemActive = item.into();
    active.available = Set(payload.available);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Availability updated",
        menu_item_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn delete_menu_item(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let item = MenuItems::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let owner_id = restaurant_owner(state, item.restaurant_id).await?;
    authorize(user, Action::ManageMenu, Resource::Restaurant { owner_id })?;

    MenuItems::delete_by_id(id).exec(&state.orm).await?;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub(crate) fn menu_item_from_entity(model: MenuItemModel) -> MenuItem {
    MenuItem {
        id: model.id,
        name: model.name,
        description: model.description,
        price: model.price,
        restaurant_id: model.restaurant_id,
        category: model.category,
        image_url: model.image_url,
        available: model.available,
        ingredients: model.ingredients,
        allergens: model.allergens,
        preparation_time: model.preparation_time,
    }
}
