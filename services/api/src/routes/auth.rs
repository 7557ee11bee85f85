//! Authentication and password recovery routes

use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use serde_json::json;
use tracing::info;

use crate::{
    codes::SecretKind,
    error::{ApiError, ApiResult, AppJson, AppQuery},
    middleware::CurrentUser,
    models::{
        ChangeEmailRequest, ChangePasswordRequest, ForgotPasswordQuery, LoginRequest,
        RedeemCodeRequest, ResetPasswordRequest, SignupRequest,
    },
    state::AppState,
    validation,
};

/// Register a new user and hand out an initial token pair
pub async fn signup(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SignupRequest>,
) -> ApiResult<impl IntoResponse> {
    payload.validate().map_err(ApiError::Validation)?;

    let email = validation::normalize_email(&payload.email);
    if state.users.email_taken(&email).await? {
        return Err(ApiError::field("User with this email already exists."));
    }

    let user = state
        .users
        .create(&email, &payload.password, payload.phone_or_default())
        .await?;

    let access = state.jwt.generate_access_token(user.id)?;
    let refresh = state.jwt.generate_refresh_token(user.id)?;

    info!("Registered user {}", user.email);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "email": user.email,
            "phoneNumber": user.phone_number,
            "access": access,
            "refresh": refresh,
        })),
    ))
}

/// Exchange credentials for an access/refresh token pair
pub async fn get_token(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let email = validation::normalize_email(&payload.email);

    let user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if !state.users.verify_password(&user, &payload.password).await? {
        return Err(ApiError::Unauthorized);
    }

    let access = state.jwt.generate_access_token(user.id)?;
    let refresh = state.jwt.generate_refresh_token(user.id)?;

    Ok(Json(json!({ "access": access, "refresh": refresh })))
}

/// Change the authenticated user's email, and nothing else
pub async fn change_email(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    AppJson(payload): AppJson<ChangeEmailRequest>,
) -> ApiResult<impl IntoResponse> {
    validation::validate_email(&payload.email).map_err(ApiError::field)?;

    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    let email = validation::normalize_email(&payload.email);
    if email == user.email || state.users.email_taken(&email).await? {
        return Err(ApiError::field("User with this email already exists."));
    }

    state.users.update_email(user.id, &email).await?;
    info!("User {} changed email to {}", user.id, email);

    Ok(Json(json!({ "email": email })))
}

/// Change the authenticated user's password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    AppJson(payload): AppJson<ChangePasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    if !state.users.verify_password(&user, &payload.password).await? {
        return Err(ApiError::field("Old password is incorrect!"));
    }
    payload.validate().map_err(ApiError::Validation)?;

    state.users.set_password(user.id, &payload.new_password).await?;

    Ok(Json(json!({ "success": "Password successfully changed." })))
}

/// Issue (or re-issue) a reset code and mail it to the user
pub async fn send_reset_code(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ForgotPasswordQuery>,
) -> ApiResult<impl IntoResponse> {
    validation::validate_email(&query.email).map_err(ApiError::field)?;

    let email = validation::normalize_email(&query.email);
    let user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User with this email does not exist.".to_string()))?;

    let code = state.codes.get_or_create(&email, SecretKind::ResetCode).await;
    // delivery failures are swallowed; the code stays redeemable either way
    state.mailer.send_reset_code(&user.email, &code);

    Ok(Json(json!({
        "success": format!("Successfully sent a reset code to {}.", user.email)
    })))
}

/// Redeem a reset code for a session token
pub async fn redeem_reset_code(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RedeemCodeRequest>,
) -> ApiResult<impl IntoResponse> {
    validation::validate_reset_code(&payload.code).map_err(ApiError::field)?;

    let email = validation::normalize_email(&payload.email);
    state
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User with this email does not exist.".to_string()))?;

    if !state
        .codes
        .try_consume(&email, SecretKind::ResetCode, &payload.code)
        .await
    {
        return Err(ApiError::field("Invalid or expired reset code."));
    }

    let session_token = state
        .codes
        .get_or_create(&email, SecretKind::SessionToken)
        .await;

    Ok(Json(json!({ "sessionToken": session_token })))
}

/// Final step of the forgot-password flow
///
/// Identity comes from the email plus a live session token, not from an
/// authenticated session. The token is consumed only after the payload
/// itself validates.
pub async fn reset_password(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ResetPasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    payload.validate().map_err(ApiError::Validation)?;

    let email = validation::normalize_email(&payload.email);
    let user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User with this email does not exist.".to_string()))?;

    if !state
        .codes
        .try_consume(&email, SecretKind::SessionToken, &payload.session_token)
        .await
    {
        return Err(ApiError::field("Invalid or expired session token."));
    }

    state.users.set_password(user.id, &payload.new_password).await?;
    info!("Password reset completed for {}", user.email);

    Ok(Json(json!({
        "success": format!("Successfully changed password for {}.", user.email)
    })))
}
