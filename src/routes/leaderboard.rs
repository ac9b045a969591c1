use axum::{
    extract::Query,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::community::{leaderboard_totals, seeded_donors, LeaderboardWindow};
use crate::error::AppError;

#[derive(Deserialize)]
pub struct LeaderboardQuery {
    pub window: Option<String>,
}

pub async fn leaderboard(Query(params): Query<LeaderboardQuery>) -> Result<Json<Value>, AppError> {
    let window = LeaderboardWindow::parse(params.window.as_deref())?;
    let donors = seeded_donors();
    let totals = leaderboard_totals(&donors);
    Ok(Json(json!({
        "window": window,
        "donors": donors,
        "totals": totals,
    })))
}
