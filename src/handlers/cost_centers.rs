use crate::{
    errors::ServiceError,
    handlers::AppState,
    services::cost_centers::{CostCenterDetails, CreateCostCenterInput},
};
use axum::{
    extract::{rejection::QueryRejection, Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CostCenterQuery {
    /// Only cost centers owned by this customer
    #[serde(default, deserialize_with = "crate::services::empty_as_none")]
    pub customer_id: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CostCenterList {
    pub cost_centers: Vec<CostCenterDetails>,
}

#[utoipa::path(
    get,
    path = "/cost-centers",
    summary = "List cost centers",
    params(CostCenterQuery),
    responses(
        (status = 200, description = "Cost centers with their customer", body = CostCenterList),
        (status = 400, description = "Invalid query", body = crate::errors::ErrorResponse),
    ),
    tag = "cost-centers"
)]
pub async fn list_cost_centers(
    State(state): State<AppState>,
    query: Result<Query<CostCenterQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let Query(query) = query?;
    let cost_centers = state.services.cost_centers.list(query.customer_id).await?;
    Ok(Json(CostCenterList { cost_centers }))
}

#[utoipa::path(
    post,
    path = "/cost-centers",
    summary = "Create cost center",
    request_body = CreateCostCenterInput,
    responses(
        (status = 201, description = "Cost center created", body = CostCenterDetails),
        (status = 400, description = "Invalid data or unknown customer", body = crate::errors::ErrorResponse),
        (status = 409, description = "Cost center code already in use", body = crate::errors::ErrorResponse),
    ),
    tag = "cost-centers"
)]
pub async fn create_cost_center(
    State(state): State<AppState>,
    Json(payload): Json<CreateCostCenterInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let cost_center = state.services.cost_centers.create(payload).await?;
    Ok((StatusCode::CREATED, Json(cost_center)))
}

pub fn cost_center_routes() -> Router<AppState> {
    Router::new().route(
        "/cost-centers",
        get(list_cost_centers).post(create_cost_center),
    )
}
