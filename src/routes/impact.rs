use axum::response::Json;

use crate::community::{impact_report, ImpactReport};

pub async fn impact() -> Json<ImpactReport> {
    Json(impact_report())
}
