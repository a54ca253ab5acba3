use crate::{
    db::DbPool,
    entities::{cost_center, customer},
    errors::ServiceError,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCostCenterInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub code: String,
    pub description: Option<String>,
    pub customer_id: i32,
}

/// A cost center together with the customer that owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CostCenterDetails {
    pub id: i32,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub customer_id: i32,
    pub customer: customer::Model,
}

impl CostCenterDetails {
    pub fn new(cost_center: cost_center::Model, customer: customer::Model) -> Self {
        Self {
            id: cost_center.id,
            name: cost_center.name,
            code: cost_center.code,
            description: cost_center.description,
            customer_id: cost_center.customer_id,
            customer,
        }
    }

    /// Pairs rows from `find_also_related`; the foreign key guarantees the customer.
    pub(crate) fn from_pair(
        (cost_center, customer): (cost_center::Model, Option<customer::Model>),
    ) -> Result<Self, ServiceError> {
        let customer = customer.ok_or_else(|| {
            ServiceError::InternalError(format!(
                "cost center {} references a missing customer",
                cost_center.id
            ))
        })?;
        Ok(Self::new(cost_center, customer))
    }
}

/// Service for managing cost centers
#[derive(Clone)]
pub struct CostCenterService {
    db_pool: Arc<DbPool>,
}

impl CostCenterService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Lists cost centers, optionally only those of one customer
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        customer_id: Option<i32>,
    ) -> Result<Vec<CostCenterDetails>, ServiceError> {
        let db = &*self.db_pool;
        let mut query = cost_center::Entity::find();
        if let Some(customer_id) = customer_id {
            query = query.filter(cost_center::Column::CustomerId.eq(customer_id));
        }

        let rows = query
            .order_by_asc(cost_center::Column::Id)
            .find_also_related(customer::Entity)
            .all(db)
            .await
            .map_err(|e| {
                error!("Failed to list cost centers: {}", e);
                ServiceError::DatabaseError(e)
            })?;

        rows.into_iter().map(CostCenterDetails::from_pair).collect()
    }

    #[instrument(skip(self))]
    pub async fn get(&self, cost_center_id: i32) -> Result<CostCenterDetails, ServiceError> {
        let db = &*self.db_pool;
        let row = cost_center::Entity::find_by_id(cost_center_id)
            .find_also_related(customer::Entity)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Cost center"))?;
        CostCenterDetails::from_pair(row)
    }

    /// Creates a cost center under an existing customer
    #[instrument(skip(self), fields(code = %input.code, customer_id = input.customer_id))]
    pub async fn create(
        &self,
        input: CreateCostCenterInput,
    ) -> Result<CostCenterDetails, ServiceError> {
        input.validate()?;
        let db = &*self.db_pool;

        let customer = customer::Entity::find_by_id(input.customer_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::ValidationError(format!(
                    "customer {} does not exist",
                    input.customer_id
                ))
            })?;

        let cost_center = cost_center::ActiveModel {
            name: Set(input.name),
            code: Set(input.code),
            description: Set(input.description),
            customer_id: Set(input.customer_id),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| {
            error!("Failed to create cost center: {}", e);
            ServiceError::from(e)
        })?;

        info!(cost_center_id = cost_center.id, "Cost center created");
        Ok(CostCenterDetails::new(cost_center, customer))
    }
}
