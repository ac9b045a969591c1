use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::catalog::{Campaign, DisasterCategory};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CampaignQuery {
    pub category: Option<String>,
    pub q: Option<String>,
}

#[derive(Serialize)]
struct CampaignView<'a> {
    #[serde(flatten)]
    campaign: &'a Campaign,
    progress_pct: f64,
}

fn view(campaign: &Campaign) -> CampaignView<'_> {
    CampaignView {
        campaign,
        progress_pct: campaign.progress_pct(),
    }
}

pub async fn list_campaigns(
    State(state): State<AppState>,
    Query(params): Query<CampaignQuery>,
) -> Result<Json<Value>, AppError> {
    let category = DisasterCategory::parse_filter(params.category.as_deref())?;
    let campaigns: Vec<_> = state
        .catalog
        .search(category, params.q.as_deref())
        .into_iter()
        .map(view)
        .collect();
    Ok(Json(json!({ "campaigns": campaigns })))
}

pub async fn get_campaign(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let campaign = state.catalog.get(&id).ok_or(AppError::NotFound("campaign"))?;
    Ok(Json(json!({ "campaign": view(campaign) })))
}
