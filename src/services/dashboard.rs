use crate::{
    db::DbPool,
    entities::form::{self, FormStatus},
    errors::ServiceError,
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, instrument};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    pub total_forms: u64,
    pub pending_forms: u64,
    pub approved_forms: u64,
    pub rejected_forms: u64,
}

#[derive(Clone)]
pub struct DashboardService {
    db_pool: Arc<DbPool>,
}

impl DashboardService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Form counts overall and per review outcome
    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<DashboardStats, ServiceError> {
        Ok(DashboardStats {
            total_forms: self.count(None).await?,
            pending_forms: self.count(Some(FormStatus::Pending)).await?,
            approved_forms: self.count(Some(FormStatus::Approved)).await?,
            rejected_forms: self.count(Some(FormStatus::Rejected)).await?,
        })
    }

    async fn count(&self, status: Option<FormStatus>) -> Result<u64, ServiceError> {
        let db = &*self.db_pool;
        let mut query = form::Entity::find();
        if let Some(status) = status {
            query = query.filter(form::Column::Status.eq(status));
        }
        query.count(db).await.map_err(|e| {
            error!("Failed to count forms: {}", e);
            ServiceError::DatabaseError(e)
        })
    }
}
