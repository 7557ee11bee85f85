//! Profile settings and homepage routes

use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use tracing::info;

use crate::{
    error::{ApiError, ApiResult, AppJson},
    middleware::CurrentUser,
    models::{SettingsUpdateRequest, UserInfoResponse},
    state::AppState,
};

/// Get the authenticated user's profile
pub async fn get_settings(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    Ok(Json(UserInfoResponse::from(&user)))
}

/// Partially update the profile, optionally changing the password in the same
/// request
///
/// All requested changes validate up front and then apply together; a failed
/// password check leaves the profile fields untouched too.
pub async fn update_settings(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    AppJson(payload): AppJson<SettingsUpdateRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    let password_change = payload.password_change().map_err(ApiError::Validation)?;
    if let Some(change) = &password_change {
        if !state.users.verify_password(&user, &change.password).await? {
            return Err(ApiError::field("Old password is incorrect!"));
        }
        change.validate().map_err(ApiError::Validation)?;
    }
    payload.validate_info().map_err(ApiError::Validation)?;

    if let Some(change) = &password_change {
        state.users.set_password(user.id, &change.new_password).await?;
    }
    let updated = state.users.update_info(user.id, &payload).await?;

    Ok(Json(UserInfoResponse::from(&updated)))
}

/// Delete the authenticated user's account; owned places cascade away
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> ApiResult<impl IntoResponse> {
    let deleted = state.users.delete(user_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("User not found.".to_string()));
    }

    info!("User {} deleted their account", user_id);
    Ok(StatusCode::NO_CONTENT)
}

/// Profile plus the user's own places in one payload
pub async fn homepage(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    let places = state.places.list_for_owner(user_id).await?;

    let mut body = serde_json::to_value(UserInfoResponse::from(&user))
        .map_err(anyhow::Error::from)?;
    body["places"] = serde_json::to_value(&places).map_err(anyhow::Error::from)?;

    Ok(Json(body))
}

#[cfg(test)]
mod tests {
    use crate::models::UserInfoResponse;

    #[test]
    fn profile_response_uses_camel_case_and_hides_the_hash() {
        let response = UserInfoResponse {
            email: "john@example.com".to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            phone_number: "+375291506285".to_string(),
            avatar_url: None,
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["firstName"], "John");
        assert_eq!(value["phoneNumber"], "+375291506285");
        assert!(value.get("password").is_none());
        assert!(value.get("passwordHash").is_none());
    }

    #[test]
    fn homepage_merges_places_into_the_profile() {
        let response = UserInfoResponse {
            email: "john@example.com".to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            phone_number: "+375291506285".to_string(),
            avatar_url: None,
        };

        let mut body = serde_json::to_value(&response).unwrap();
        body["places"] = serde_json::json!([]);

        assert_eq!(body["email"], "john@example.com");
        assert!(body["places"].as_array().unwrap().is_empty());
    }
}
