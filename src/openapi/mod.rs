use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Reimbursement Forms API",
        version = "1.0.0",
        description = r#"
# Reimbursement Forms API

Tracks employee reimbursement, cash advance and liquidation forms.

- **Directory**: customers, their cost centers, and users
- **Forms**: creation with a generated form number (`REI-2025-0001`) and an optional attachment,
  review status updates and assignment
- **Dashboard**: form counts by status

Form-style endpoints (`POST /forms`, `PUT /forms/{id}/status`, `PUT /forms/{id}/assign`) accept
`multipart/form-data`; the status and assign endpoints also take urlencoded or JSON bodies.

Errors share one body:

```json
{
  "error": "Not Found",
  "message": "Not found: Form not found",
  "request_id": "4b8f0b1e-...",
  "timestamp": "2025-01-01T00:00:00Z"
}
```
"#
    ),
    paths(
        crate::handlers::customers::list_customers,
        crate::handlers::customers::create_customer,
        crate::handlers::cost_centers::list_cost_centers,
        crate::handlers::cost_centers::create_cost_center,
        crate::handlers::users::list_users,
        crate::handlers::users::create_user,
        crate::handlers::forms::list_forms,
        crate::handlers::forms::create_form,
        crate::handlers::forms::get_form,
        crate::handlers::forms::update_form_status,
        crate::handlers::forms::assign_form,
        crate::handlers::dashboard::dashboard_stats,
        crate::handlers::health::health_check,
    ),
    components(
        schemas(
            crate::entities::customer::Model,
            crate::entities::cost_center::Model,
            crate::entities::user::Model,
            crate::entities::user::UserRole,
            crate::entities::form::Model,
            crate::entities::form::FormType,
            crate::entities::form::FormStatus,
            crate::services::customers::CreateCustomerInput,
            crate::services::cost_centers::CreateCostCenterInput,
            crate::services::cost_centers::CostCenterDetails,
            crate::services::users::CreateUserInput,
            crate::services::forms::FormDetails,
            crate::services::forms::FormList,
            crate::services::dashboard::DashboardStats,
            crate::handlers::customers::CustomerList,
            crate::handlers::cost_centers::CostCenterList,
            crate::handlers::users::UserList,
            crate::handlers::forms::CreateFormRequest,
            crate::handlers::forms::UpdateStatusRequest,
            crate::handlers::forms::AssignFormRequest,
            crate::handlers::forms::FormUpdateResponse,
            crate::handlers::health::HealthResponse,
            crate::handlers::health::ComponentStatus,
            crate::errors::ErrorResponse
        )
    ),
    tags(
        (name = "customers", description = "Customer directory"),
        (name = "cost-centers", description = "Cost centers owned by customers"),
        (name = "users", description = "Submitters and reviewers"),
        (name = "forms", description = "Form lifecycle"),
        (name = "dashboard", description = "Aggregate statistics"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
