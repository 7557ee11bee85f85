//! Domain models and request/response payloads

pub mod place;
pub mod user;

// Re-export for convenience
pub use place::{
    Category, GeoPoint, NewPlace, PlaceChanges, PlaceCreateRequest, PlaceImage,
    PlaceImagesRequest, PlaceResponse, PlaceUpdateRequest, PlacesQuery, MAX_SECONDARY_IMAGES,
};
pub use user::{
    ChangeEmailRequest, ChangePasswordRequest, ForgotPasswordQuery, LoginRequest,
    RedeemCodeRequest, ResetPasswordRequest, SettingsUpdateRequest, SignupRequest, User,
    UserInfoResponse, DEFAULT_PHONE_NUMBER,
};
