use crate::{
    entities::user::{self, UserRole},
    errors::ServiceError,
    handlers::AppState,
    services::users::CreateUserInput,
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
pub struct UserQuery {
    #[serde(default, deserialize_with = "crate::services::empty_as_none")]
    pub role: Option<UserRole>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserList {
    pub users: Vec<user::Model>,
}

#[utoipa::path(
    get,
    path = "/users",
    summary = "List users",
    params(UserQuery),
    responses(
        (status = 200, description = "Users, optionally filtered by role", body = UserList),
        (status = 400, description = "Unknown role", body = crate::errors::ErrorResponse),
    ),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let Query(query) = query?;
    let users = state.services.users.list(query.role).await?;
    Ok(Json(UserList { users }))
}

#[utoipa::path(
    post,
    path = "/users",
    summary = "Create user",
    request_body = CreateUserInput,
    responses(
        (status = 201, description = "User created", body = user::Model),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 409, description = "Username or email already in use", body = crate::errors::ErrorResponse),
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let user = state.services.users.create(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/users", get(list_users).post(create_user))
}
