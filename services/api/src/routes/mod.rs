//! API service routes

pub mod auth;
pub mod places;
pub mod users;

use axum::{
    middleware,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::json;

use crate::{middleware::auth_middleware, state::AppState};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/auth/change-email", patch(auth::change_email))
        .route("/auth/change-password", patch(auth::change_password))
        .route(
            "/users/settings",
            get(users::get_settings)
                .patch(users::update_settings)
                .delete(users::delete_account),
        )
        .route("/homepage", get(users::homepage))
        .route("/places", get(places::list_places).post(places::create_place))
        .route(
            "/places/:id",
            patch(places::update_place).delete(places::delete_place),
        )
        .route(
            "/places/:id/images",
            post(places::update_images).delete(places::remove_images),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/get-token", post(auth::get_token))
        .route(
            "/auth/reset-password",
            get(auth::send_reset_code)
                .post(auth::redeem_reset_code)
                .patch(auth::reset_password),
        )
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "routes4life-api"
    }))
}
