use crate::{errors::ServiceError, handlers::AppState, services::dashboard::DashboardStats};
use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::get,
    Router,
};

#[utoipa::path(
    get,
    path = "/dashboard/stats",
    summary = "Dashboard statistics",
    responses(
        (status = 200, description = "Form counts by status", body = DashboardStats),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "dashboard"
)]
pub async fn dashboard_stats(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let stats = state.services.dashboard.stats().await?;
    Ok(Json(stats))
}

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/dashboard/stats", get(dashboard_stats))
}
