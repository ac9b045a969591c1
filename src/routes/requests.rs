use axum::{
    extract::{Json, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json as AxumJson},
};
use serde_json::json;

use crate::aid::documents::DocumentKind;
use crate::aid::{AidRequestDraft, DraftUpdate, SubmissionAck};
use crate::error::AppError;
use crate::state::AppState;

pub async fn create_draft(State(state): State<AppState>) -> impl IntoResponse {
    let draft = state.aid.create_draft().await;
    (StatusCode::CREATED, AxumJson(draft))
}

pub async fn get_draft(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<AxumJson<AidRequestDraft>, AppError> {
    Ok(AxumJson(state.aid.get(&id).await?))
}

pub async fn update_draft(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<DraftUpdate>,
) -> Result<AxumJson<AidRequestDraft>, AppError> {
    Ok(AxumJson(state.aid.apply_update(&id, update).await?))
}

pub async fn next_step(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<AxumJson<AidRequestDraft>, AppError> {
    Ok(AxumJson(state.aid.advance(&id).await?))
}

pub async fn previous_step(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<AxumJson<AidRequestDraft>, AppError> {
    Ok(AxumJson(state.aid.retreat(&id).await?))
}

fn parse_kind(name: &str) -> Result<DocumentKind, AppError> {
    match name {
        "id-proof" => Ok(DocumentKind::IdProof),
        "damage-photos" => Ok(DocumentKind::DamagePhotos),
        "official-reports" => Ok(DocumentKind::OfficialReports),
        _ => Err(AppError::Validation(format!("unknown attachment kind: {name}"))),
    }
}

/// Multipart document intake. Each part is named for its attachment kind;
/// a part that fails the kind's type filter aborts the request with the
/// kind's rejection message and is not stored.
pub async fn upload_documents(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<AxumJson<serde_json::Value>, AppError> {
    let mut uploaded = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::Validation(format!("invalid upload: {err}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let kind = parse_kind(&name)?;
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().unwrap_or("").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|err| AppError::Validation(format!("invalid upload: {err}")))?
            .to_vec();

        let stored = state.aid.attach(&id, kind, &file_name, &content_type, bytes).await?;
        uploaded.push(stored);
    }

    if uploaded.is_empty() {
        return Err(AppError::Validation("no files provided".to_string()));
    }
    Ok(AxumJson(json!({ "uploaded": uploaded })))
}

pub async fn remove_document(
    State(state): State<AppState>,
    Path((id, kind, index)): Path<(String, String, usize)>,
) -> Result<AxumJson<AidRequestDraft>, AppError> {
    let kind = parse_kind(&kind)?;
    Ok(AxumJson(state.aid.remove_document(&id, kind, index).await?))
}

pub async fn submit_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<AxumJson<SubmissionAck>, AppError> {
    Ok(AxumJson(state.aid.submit(&id).await?))
}
