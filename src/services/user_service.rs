use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::Utc;
use password_hash::rand_core::OsRng;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

use crate::{
    audit::log_audit,
    dto::users::{ChangePasswordRequest, UpdateProfileRequest},
    entity::users::{ActiveModel as UserActive, Entity as Users, Model as UserModel},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::User,
    policy::{Action, Resource, authorize},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn get_profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<User>> {
    let record = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success("Profile", user_from_entity(record), None))
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<User>> {
    let record = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    // Role and email are immutable after registration.
    let mut active: UserActive = record.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(address) = payload.address {
        active.address = Set(Some(address));
    }
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "profile_update",
        Some("users"),
        Some(serde_json::json!({ "user_id": updated.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Profile updated",
        user_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn change_password(
    state: &AppState,
    user: &AuthUser,
    payload: ChangePasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let record = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let parsed_hash = PasswordHash::new(&record.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    let argon2 = Argon2::default();
    if argon2
        .verify_password(payload.old_password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::BadRequest("Old password is incorrect".into()));
    }

    let salt = SaltString::generate(&mut OsRng);
    let new_hash = argon2
        .hash_password(payload.new_password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();

    let mut active: UserActive = record.into();
    active.password_hash = Set(new_hash);
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "password_change",
        Some("users"),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Password changed",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn get_user(state: &AppState, user: &AuthUser, id: i64) -> AppResult<ApiResponse<User>> {
    authorize(user, Action::ViewUser, Resource::User { id })?;

    let record = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success("User", user_from_entity(record), None))
}

pub(crate) fn user_from_entity(model: UserModel) -> User {
    User {
        id: model.id,
        email: model.email,
        name: model.name,
        phone: model.phone,
        address: model.address,
        role: model.role,
        active: model.active,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
