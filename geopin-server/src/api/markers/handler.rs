//! Markers API Handlers

use axum::{
    Form, Json,
    extract::{Query, State, rejection::FormRejection},
};
use shared::{CreateMarkerForm, CreateMarkerResponse, MarkersQuery, MarkersResponse};

use crate::core::ServerState;
use crate::db::NewMarker;
use crate::utils::validation::{
    MAX_NAME_LEN, validate_coordinate, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};

/// GET /markers - markers split by ownership, plus every tag
pub async fn list(
    State(state): State<ServerState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Json<MarkersResponse> {
    let query = MarkersQuery::from_pairs(pairs);
    let listing = state.markers.list(&query).await;
    let tags = state.markers.tags_by_count().await;

    tracing::debug!(
        user_id = query.user_id,
        tags = ?query.tags,
        search = ?query.search,
        mine = listing.my_markers.len(),
        others = listing.other_markers.len(),
        "Markers listed"
    );

    Json(MarkersResponse {
        my_markers: listing.my_markers,
        other_markers: listing.other_markers,
        tags,
        user: serde_json::json!({ "id": query.user_id }),
    })
}

/// POST /markers - create a marker owned by `user_id`
pub async fn create(
    State(state): State<ServerState>,
    form: Result<Form<CreateMarkerForm>, FormRejection>,
) -> AppResult<Json<CreateMarkerResponse>> {
    let Form(form) = form?;

    if form.user_id == 0 {
        return Err(AppError::Unauthorized);
    }
    validate_required_text(&form.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&form.tag, "tag", MAX_NAME_LEN)?;
    validate_optional_text(&form.new_tag, "new_tag", MAX_NAME_LEN)?;
    validate_coordinate(form.coordinate())?;

    state
        .markers
        .create(NewMarker {
            author: form.user_id,
            name: form.name.trim().to_string(),
            tag: form.effective_tag().map(str::to_string),
            at: form.coordinate(),
        })
        .await?;

    Ok(Json(CreateMarkerResponse::success()))
}
