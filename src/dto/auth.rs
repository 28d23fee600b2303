use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{domain::Role, models::User};

#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Role,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// JWT payload: subject is the email, `uid` the numeric user id.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub uid: i64,
    pub role: String,
    pub exp: usize,
}
