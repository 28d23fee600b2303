use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Method, Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{DecodingKey, Validation, decode};

use crate::{
    domain::Role, dto::auth::Claims, error::AppError, middleware::auth::AuthUser, state::AppState,
};

/// Request paths that are forwarded without authentication: auth endpoints,
/// health/docs, public restaurant and menu reads, and tracking by code.
fn is_public(method: &Method, path: &str) -> bool {
    if path == "/health" || path == "/docs" || path.starts_with("/docs/") {
        return true;
    }
    if path.starts_with("/api/auth/") {
        return true;
    }
    if method != Method::GET {
        return false;
    }
    if path.starts_with("/api/restaurants") {
        return !path.contains("/my-restaurants") && !path.contains("/owner/");
    }
    path.starts_with("/api/menu/restaurant/") || path.starts_with("/api/deliveries/track/")
}

/// The authentication boundary. Verifies the bearer token once, then hands
/// downstream handlers a trusted `AuthUser` extension together with the
/// `X-User-*` headers.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if is_public(req.method(), req.uri().path()) {
        return next.run(req).await;
    }

    let user = match verify_bearer(&state, req.headers()) {
        Ok(user) => user,
        Err(err) => return err.into_response(),
    };

    inject_identity_headers(req.headers_mut(), &user);
    req.extensions_mut().insert(user);
    next.run(req).await
}

fn verify_bearer(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, AppError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

    if !auth_str.starts_with("Bearer ") {
        return Err(AppError::Unauthorized("Invalid Authorization scheme".into()));
    }
    let token = auth_str.trim_start_matches("Bearer ").trim();

    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|err| AppError::Unauthorized(format!("Token rejected: {err}")))?;

    let role = Role::parse(&decoded.claims.role)
        .map_err(|_| AppError::Unauthorized("Unknown role claim".into()))?;

    Ok(AuthUser {
        user_id: decoded.claims.uid,
        email: decoded.claims.sub,
        role,
    })
}

fn inject_identity_headers(headers: &mut HeaderMap, user: &AuthUser) {
    if let Ok(value) = HeaderValue::from_str(&user.user_id.to_string()) {
        headers.insert("x-user-id", value);
    }
    if let Ok(value) = HeaderValue::from_str(&user.email) {
        headers.insert("x-user-email", value);
    }
    if let Ok(value) = HeaderValue::from_str(user.role.as_str()) {
        headers.insert("x-user-role", value);
    }
}
