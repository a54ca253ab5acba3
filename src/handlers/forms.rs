use crate::{
    entities::form::{FormStatus, FormType},
    errors::ServiceError,
    handlers::{common::FormFields, AppState},
    services::{
        attachments::Attachment,
        forms::{CreateFormInput, FormDetails, FormFilter, FormList},
    },
};
use axum::{
    extract::{rejection::QueryRejection, Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Multipart body of `POST /forms`.
#[derive(Debug, ToSchema)]
pub struct CreateFormRequest {
    pub form_type: FormType,
    #[schema(value_type = String, example = "1250.00")]
    pub total_amount: Decimal,
    pub cost_center_id: i32,
    pub submitted_by_id: i32,
    pub assigned_to_id: Option<i32>,
    pub remarks: Option<String>,
    /// Receipt or supporting document
    #[schema(value_type = Option<String>, format = Binary)]
    pub attachment: Option<Attachment>,
}

impl TryFrom<FormFields> for CreateFormRequest {
    type Error = ServiceError;

    fn try_from(mut fields: FormFields) -> Result<Self, Self::Error> {
        Ok(Self {
            form_type: fields.parse_required("form_type")?,
            total_amount: fields.parse_required("total_amount")?,
            cost_center_id: fields.parse_required("cost_center_id")?,
            submitted_by_id: fields.parse_required("submitted_by_id")?,
            assigned_to_id: fields.parse_optional("assigned_to_id")?,
            remarks: fields.optional("remarks").map(str::to_string),
            attachment: fields.take_attachment(),
        })
    }
}

impl From<CreateFormRequest> for CreateFormInput {
    fn from(request: CreateFormRequest) -> Self {
        Self {
            form_type: request.form_type,
            total_amount: request.total_amount,
            cost_center_id: request.cost_center_id,
            submitted_by_id: request.submitted_by_id,
            assigned_to_id: request.assigned_to_id,
            remarks: request.remarks,
            attachment: request.attachment,
        }
    }
}

/// Body of `PUT /forms/{id}/status`, sent as form fields or JSON.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: FormStatus,
}

impl TryFrom<FormFields> for UpdateStatusRequest {
    type Error = ServiceError;

    fn try_from(fields: FormFields) -> Result<Self, Self::Error> {
        Ok(Self {
            status: fields.parse_required("status")?,
        })
    }
}

/// Body of `PUT /forms/{id}/assign`, sent as form fields or JSON.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignFormRequest {
    pub assigned_to_id: i32,
}

impl TryFrom<FormFields> for AssignFormRequest {
    type Error = ServiceError;

    fn try_from(fields: FormFields) -> Result<Self, Self::Error> {
        Ok(Self {
            assigned_to_id: fields.parse_required("assigned_to_id")?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FormUpdateResponse {
    pub message: String,
    pub form: FormDetails,
}

#[utoipa::path(
    get,
    path = "/forms",
    summary = "List forms",
    description = "Every form matching all provided filters, oldest first",
    params(FormFilter),
    responses(
        (status = 200, description = "Matching forms", body = FormList),
        (status = 400, description = "Invalid filter value", body = crate::errors::ErrorResponse),
    ),
    tag = "forms"
)]
pub async fn list_forms(
    State(state): State<AppState>,
    filter: Result<Query<FormFilter>, QueryRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let Query(filter) = filter?;
    let forms = state.services.forms.list(filter).await?;
    Ok(Json(forms))
}

#[utoipa::path(
    post,
    path = "/forms",
    summary = "Create form",
    description = "Creates a pending form with a generated form number and an optional attachment",
    request_body(content = CreateFormRequest, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Form created", body = FormDetails),
        (status = 400, description = "Missing or invalid fields", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "forms"
)]
pub async fn create_form(
    State(state): State<AppState>,
    fields: FormFields,
) -> Result<impl IntoResponse, ServiceError> {
    let request = CreateFormRequest::try_from(fields)?;
    let form = state.services.forms.create(request.into()).await?;
    Ok((StatusCode::CREATED, Json(form)))
}

#[utoipa::path(
    get,
    path = "/forms/{id}",
    summary = "Get form",
    params(("id" = i32, Path, description = "Form id")),
    responses(
        (status = 200, description = "The form", body = FormDetails),
        (status = 404, description = "Form not found", body = crate::errors::ErrorResponse),
    ),
    tag = "forms"
)]
pub async fn get_form(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let form = state.services.forms.get(id).await?;
    Ok(Json(form))
}

#[utoipa::path(
    put,
    path = "/forms/{id}/status",
    summary = "Update form status",
    params(("id" = i32, Path, description = "Form id")),
    request_body(content = UpdateStatusRequest, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Status updated", body = FormUpdateResponse),
        (status = 400, description = "Unknown status", body = crate::errors::ErrorResponse),
        (status = 404, description = "Form not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Transition not allowed", body = crate::errors::ErrorResponse),
    ),
    tag = "forms"
)]
pub async fn update_form_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    fields: FormFields,
) -> Result<impl IntoResponse, ServiceError> {
    let request = UpdateStatusRequest::try_from(fields)?;
    let form = state.services.forms.update_status(id, request.status).await?;
    Ok(Json(FormUpdateResponse {
        message: "Status updated successfully".to_string(),
        form,
    }))
}

#[utoipa::path(
    put,
    path = "/forms/{id}/assign",
    summary = "Assign form",
    params(("id" = i32, Path, description = "Form id")),
    request_body(content = AssignFormRequest, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Form assigned", body = FormUpdateResponse),
        (status = 400, description = "Unknown assignee", body = crate::errors::ErrorResponse),
        (status = 404, description = "Form not found", body = crate::errors::ErrorResponse),
    ),
    tag = "forms"
)]
pub async fn assign_form(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    fields: FormFields,
) -> Result<impl IntoResponse, ServiceError> {
    let request = AssignFormRequest::try_from(fields)?;
    let form = state
        .services
        .forms
        .assign(id, request.assigned_to_id)
        .await?;
    Ok(Json(FormUpdateResponse {
        message: "Form assigned successfully".to_string(),
        form,
    }))
}

pub fn form_routes() -> Router<AppState> {
    Router::new()
        .route("/forms", get(list_forms).post(create_form))
        .route("/forms/:id", get(get_form))
        .route("/forms/:id/status", put(update_form_status))
        .route("/forms/:id/assign", put(assign_form))
}
