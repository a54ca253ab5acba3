use crate::{
    db::DbPool,
    entities::user::{self, UserRole},
    errors::ServiceError,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserInput {
    #[validate(length(min = 1, max = 100))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 255))]
    pub full_name: String,
    /// Defaults to `employee`
    #[serde(default)]
    pub role: Option<UserRole>,
}

/// Service for managing users
#[derive(Clone)]
pub struct UserService {
    db_pool: Arc<DbPool>,
}

impl UserService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, role: Option<UserRole>) -> Result<Vec<user::Model>, ServiceError> {
        let db = &*self.db_pool;
        let mut query = user::Entity::find();
        if let Some(role) = role {
            query = query.filter(user::Column::Role.eq(role));
        }

        query
            .order_by_asc(user::Column::Id)
            .all(db)
            .await
            .map_err(|e| {
                error!("Failed to list users: {}", e);
                ServiceError::DatabaseError(e)
            })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, user_id: i32) -> Result<user::Model, ServiceError> {
        let db = &*self.db_pool;
        user::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))
    }

    /// Creates an active user; duplicate username or email is a conflict
    #[instrument(skip(self), fields(username = %input.username))]
    pub async fn create(&self, input: CreateUserInput) -> Result<user::Model, ServiceError> {
        input.validate()?;
        let db = &*self.db_pool;

        let user = user::ActiveModel {
            username: Set(input.username),
            email: Set(input.email),
            full_name: Set(input.full_name),
            role: Set(input.role.unwrap_or_default()),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| {
            error!("Failed to create user: {}", e);
            ServiceError::from(e)
        })?;

        info!(user_id = user.id, role = %user.role, "User created");
        Ok(user)
    }
}
