use crate::{
    entities::customer,
    errors::ServiceError,
    handlers::AppState,
    services::customers::CreateCustomerInput,
};
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CustomerList {
    pub customers: Vec<customer::Model>,
}

#[utoipa::path(
    get,
    path = "/customers",
    summary = "List customers",
    responses(
        (status = 200, description = "All customers", body = CustomerList),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "customers"
)]
pub async fn list_customers(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let customers = state.services.customers.list().await?;
    Ok(Json(CustomerList { customers }))
}

#[utoipa::path(
    post,
    path = "/customers",
    summary = "Create customer",
    request_body = CreateCustomerInput,
    responses(
        (status = 201, description = "Customer created", body = customer::Model),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 409, description = "Customer code already in use", body = crate::errors::ErrorResponse),
    ),
    tag = "customers"
)]
pub async fn create_customer(
    State(state): State<AppState>,
    Json(payload): Json<CreateCustomerInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let customer = state.services.customers.create(payload).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

pub fn customer_routes() -> Router<AppState> {
    Router::new().route("/customers", get(list_customers).post(create_customer))
}
