//! User model and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::validation;

/// Sentinel stored when no phone number is supplied at signup
pub const DEFAULT_PHONE_NUMBER: &str = "+000000000";

/// User entity
///
/// Deliberately not serializable: the password hash must never reach a
/// response body. Client-facing shapes go through [`UserInfoResponse`].
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-facing profile shape
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoResponse {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub avatar_url: Option<String>,
}

impl From<&User> for UserInfoResponse {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            phone_number: user.phone_number.clone(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}

/// Request for user registration
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub phone_number: Option<String>,
    pub password: String,
    pub confirmation_password: String,
}

impl SignupRequest {
    /// Validate the payload, collecting every field error
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Err(e) = validation::validate_email(&self.email) {
            errors.push(e);
        }
        // absent means "use the sentinel"; present means "must be valid"
        if let Some(phone_number) = &self.phone_number {
            if let Err(e) = validation::validate_phone_number(phone_number) {
                errors.push(e);
            }
        }
        if let Err(e) = validation::validate_password(&self.password) {
            errors.push(e);
        }
        if self.password != self.confirmation_password {
            errors.push("Passwords don't match!".to_string());
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// The phone number to persist
    pub fn phone_or_default(&self) -> &str {
        self.phone_number.as_deref().unwrap_or(DEFAULT_PHONE_NUMBER)
    }
}

/// Request for user login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request for changing the authenticated user's email
#[derive(Debug, Deserialize)]
pub struct ChangeEmailRequest {
    pub email: String,
}

/// Request for an authenticated password change
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub password: String,
    pub new_password: String,
    pub confirmation_password: String,
}

impl ChangePasswordRequest {
    /// Cross-field checks that need no persisted state
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Err(e) = validation::validate_password(&self.new_password) {
            errors.push(e);
        }
        if self.new_password != self.confirmation_password {
            errors.push("New passwords don't match!".to_string());
        }
        if self.new_password == self.password {
            errors.push("New password must differ from the old one.".to_string());
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Partial profile update; absent fields stay unchanged
///
/// When `password` is present this doubles as a combined password change and
/// then requires `newPassword` and `confirmationPassword` as well. Nothing is
/// applied unless every requested change validates.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdateRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub avatar_url: Option<String>,
    pub password: Option<String>,
    pub new_password: Option<String>,
    pub confirmation_password: Option<String>,
}

impl SettingsUpdateRequest {
    /// Validate the profile fields
    pub fn validate_info(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Some(phone_number) = &self.phone_number {
            if let Err(e) = validation::validate_phone_number(phone_number) {
                errors.push(e);
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Extract the embedded password change, if one was requested
    ///
    /// Any of the three password fields present makes all three mandatory.
    pub fn password_change(&self) -> Result<Option<ChangePasswordRequest>, Vec<String>> {
        match (&self.password, &self.new_password, &self.confirmation_password) {
            (None, None, None) => Ok(None),
            (Some(password), Some(new_password), Some(confirmation_password)) => {
                Ok(Some(ChangePasswordRequest {
                    password: password.clone(),
                    new_password: new_password.clone(),
                    confirmation_password: confirmation_password.clone(),
                }))
            }
            _ => Err(vec![
                "Not all of the fields for a password change were provided.".to_string(),
            ]),
        }
    }
}

/// Query for requesting a reset code
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordQuery {
    pub email: String,
}

/// Request for redeeming a reset code
#[derive(Debug, Deserialize)]
pub struct RedeemCodeRequest {
    pub email: String,
    pub code: String,
}

/// Request for the final step of the forgot-password flow
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub session_token: String,
    pub new_password: String,
    pub confirmation_password: String,
}

impl ResetPasswordRequest {
    /// Checks that must pass before the session token is consumed
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Err(e) = validation::validate_password(&self.new_password) {
            errors.push(e);
        }
        if self.new_password != self.confirmation_password {
            errors.push("New passwords don't match!".to_string());
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
