//! Place and place-image routes
//!
//! Reads are open to any authenticated user; mutation of a place is
//! restricted to its owner.

use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::info;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult, AppJson, AppQuery},
    middleware::CurrentUser,
    models::{
        place::plan_image_batch, PlaceCreateRequest, PlaceImagesRequest, PlaceUpdateRequest,
        PlacesQuery,
    },
    state::AppState,
};

async fn require_owner(state: &AppState, place_id: Uuid, user_id: Uuid) -> ApiResult<()> {
    let owner = state
        .places
        .owner_of(place_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Place not found.".to_string()))?;

    if owner != user_id {
        return Err(ApiError::Forbidden);
    }
    Ok(())
}

/// List places, optionally within a distance of a center point
pub async fn list_places(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    AppQuery(query): AppQuery<PlacesQuery>,
) -> ApiResult<impl IntoResponse> {
    let filter = query.filter().map_err(ApiError::Validation)?;
    let places = state.places.list(user_id, filter).await?;

    Ok(Json(places))
}

/// Create a place owned by the requesting user
pub async fn create_place(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    AppJson(payload): AppJson<PlaceCreateRequest>,
) -> ApiResult<impl IntoResponse> {
    let new_place = payload.validate().map_err(ApiError::Validation)?;

    let place_id = state.places.create(user_id, &new_place).await?;
    let place = state
        .places
        .get(place_id, user_id)
        .await?
        .context("place missing right after creation")?;

    Ok((StatusCode::CREATED, Json(place)))
}

/// Partially update a place; only its owner may do so
pub async fn update_place(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(place_id): Path<Uuid>,
    AppJson(payload): AppJson<PlaceUpdateRequest>,
) -> ApiResult<impl IntoResponse> {
    require_owner(&state, place_id, user_id).await?;

    let changes = payload.validate().map_err(ApiError::Validation)?;
    state.places.update(place_id, &changes, user_id).await?;

    let place = state
        .places
        .get(place_id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Place not found.".to_string()))?;

    Ok(Json(place))
}

/// Delete a place; images and ratings go with it
pub async fn delete_place(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(place_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    require_owner(&state, place_id, user_id).await?;

    state.places.delete(place_id).await?;
    info!("User {} deleted place {}", user_id, place_id);

    Ok(StatusCode::NO_CONTENT)
}

async fn run_image_batch(
    state: &AppState,
    place_id: Uuid,
    user_id: Uuid,
    to_delete: &[Uuid],
    to_upload: &[String],
) -> ApiResult<impl IntoResponse + use<>> {
    require_owner(state, place_id, user_id).await?;

    let existing = state.places.image_ids(place_id).await?;
    let delete_ids =
        plan_image_batch(&existing, to_delete, to_upload.len()).map_err(ApiError::field)?;

    state
        .places
        .apply_image_batch(place_id, &delete_ids, to_upload)
        .await?;

    let place = state
        .places
        .get(place_id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Place not found.".to_string()))?;

    Ok(Json(place))
}

/// Add and remove secondary images in one atomic batch
pub async fn update_images(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(place_id): Path<Uuid>,
    AppJson(payload): AppJson<PlaceImagesRequest>,
) -> ApiResult<impl IntoResponse> {
    run_image_batch(
        &state,
        place_id,
        user_id,
        &payload.image_ids_to_delete,
        &payload.images_to_upload,
    )
    .await
}

/// Remove secondary images
pub async fn remove_images(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(place_id): Path<Uuid>,
    AppJson(payload): AppJson<PlaceImagesRequest>,
) -> ApiResult<impl IntoResponse> {
    run_image_batch(&state, place_id, user_id, &payload.image_ids_to_delete, &[]).await
}
