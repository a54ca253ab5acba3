use crate::{db::DbPool, entities::customer, errors::ServiceError};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCustomerInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub code: String,
    pub description: Option<String>,
}

/// Service for managing customers
#[derive(Clone)]
pub struct CustomerService {
    db_pool: Arc<DbPool>,
}

impl CustomerService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Lists all customers in insertion order
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<customer::Model>, ServiceError> {
        let db = &*self.db_pool;
        customer::Entity::find()
            .order_by_asc(customer::Column::Id)
            .all(db)
            .await
            .map_err(|e| {
                error!("Failed to list customers: {}", e);
                ServiceError::DatabaseError(e)
            })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, customer_id: i32) -> Result<customer::Model, ServiceError> {
        let db = &*self.db_pool;
        customer::Entity::find_by_id(customer_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Customer"))
    }

    /// Creates a customer; a duplicate code is reported as a conflict
    #[instrument(skip(self), fields(code = %input.code))]
    pub async fn create(
        &self,
        input: CreateCustomerInput,
    ) -> Result<customer::Model, ServiceError> {
        input.validate()?;
        let db = &*self.db_pool;

        let customer = customer::ActiveModel {
            name: Set(input.name),
            code: Set(input.code),
            description: Set(input.description),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| {
            error!("Failed to create customer: {}", e);
            ServiceError::from(e)
        })?;

        info!(customer_id = customer.id, "Customer created");
        Ok(customer)
    }
}
