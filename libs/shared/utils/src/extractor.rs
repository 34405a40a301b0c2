use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use headers::{authorization::Bearer, Authorization, HeaderMapExt};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::jwt::validate_token;

/// Validates the bearer token and stores the `User` in request extensions.
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or_else(|| AppError::Auth("Missing or malformed bearer token".to_string()))?;
    let token = auth.token();

    let user = validate_token(token, &config.supabase_jwt_secret)
        .map_err(AppError::Auth)?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Capability check: admins, or the professional who owns the calendar.
pub fn require_staff_for(user: &User, professional_id: &str) -> Result<(), AppError> {
    if user.is_admin() || user.is_professional(professional_id) {
        Ok(())
    } else {
        Err(AppError::Auth("Not authorized for this professional's calendar".to_string()))
    }
}

/// Capability check: admins or any professional.
pub fn require_any_staff(user: &User) -> Result<(), AppError> {
    let is_professional = user.role.as_deref() == Some(shared_models::auth::ROLE_PROFESSIONAL);
    if user.is_admin() || is_professional {
        Ok(())
    } else {
        Err(AppError::Auth("Staff role required".to_string()))
    }
}
