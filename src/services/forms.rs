use crate::{
    clock::{system_clock, SharedClock},
    db::DbPool,
    entities::{
        cost_center, customer,
        form::{self, FormStatus, FormType},
        user,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        attachments::{Attachment, AttachmentStore, StoredAttachment},
        cost_centers::CostCenterDetails,
        empty_as_none, form_numbers,
    },
};
use chrono::Datelike;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr,
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};
use tracing::{error, info, instrument};
use utoipa::{IntoParams, ToSchema};

/// Input for [`FormService::create`].
#[derive(Debug, Clone)]
pub struct CreateFormInput {
    pub form_type: FormType,
    pub total_amount: Decimal,
    pub cost_center_id: i32,
    pub submitted_by_id: i32,
    pub assigned_to_id: Option<i32>,
    pub remarks: Option<String>,
    pub attachment: Option<Attachment>,
}

/// Optional predicates for [`FormService::list`]; unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FormFilter {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub form_type: Option<FormType>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub status: Option<FormStatus>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub submitted_by_id: Option<i32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub assigned_to_id: Option<i32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub cost_center_id: Option<i32>,
    /// Matches forms charged to any cost center of this customer
    #[serde(default, deserialize_with = "empty_as_none")]
    pub customer_id: Option<i32>,
}

/// A form with its submitter, assignee and cost center resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FormDetails {
    #[serde(flatten)]
    pub form: form::Model,
    pub submitted_by: user::Model,
    pub assigned_to: Option<user::Model>,
    pub cost_center: CostCenterDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FormList {
    pub forms: Vec<FormDetails>,
    pub total: usize,
}

/// Service for the form lifecycle: creation, lookup, status and assignment.
#[derive(Clone)]
pub struct FormService {
    db_pool: Arc<DbPool>,
    attachments: Arc<AttachmentStore>,
    clock: SharedClock,
    enforce_status_transitions: bool,
    event_sender: Option<Arc<EventSender>>,
}

impl FormService {
    pub fn new(db_pool: Arc<DbPool>, attachments: Arc<AttachmentStore>) -> Self {
        Self {
            db_pool,
            attachments,
            clock: system_clock(),
            enforce_status_transitions: false,
            event_sender: None,
        }
    }

    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    /// Restricts status updates to the moves in [`FormStatus::allowed_next`].
    pub fn with_status_transitions(mut self, enforce: bool) -> Self {
        self.enforce_status_transitions = enforce;
        self
    }

    pub fn with_event_sender(mut self, event_sender: Arc<EventSender>) -> Self {
        self.event_sender = Some(event_sender);
        self
    }

    /// Creates a pending form, numbering it and storing its attachment.
    ///
    /// The number is allocated in the same transaction as the insert. An
    /// attachment written for a form that then fails to commit is removed.
    #[instrument(skip(self, input), fields(form_type = %input.form_type))]
    pub async fn create(&self, input: CreateFormInput) -> Result<FormDetails, ServiceError> {
        if input.total_amount < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "total_amount must not be negative".to_string(),
            ));
        }

        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(|e| {
            error!("Failed to start transaction for form creation: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        // The counter bump must be the first statement. SQLite cannot upgrade a
        // transaction that already read to a writer while others hold read
        // locks, but a transaction that writes first waits on busy_timeout.
        let now = self.clock.now();
        let form_number = form_numbers::allocate(&txn, input.form_type, now.year()).await?;

        ensure_exists::<cost_center::Entity, _>(&txn, input.cost_center_id, "Cost center").await?;
        ensure_exists::<user::Entity, _>(&txn, input.submitted_by_id, "Submitting user").await?;
        if let Some(assignee) = input.assigned_to_id {
            ensure_exists::<user::Entity, _>(&txn, assignee, "Assigned user").await?;
        }

        let stored = match &input.attachment {
            Some(attachment) => Some(self.attachments.save(&form_number, attachment).await?),
            None => None,
        };

        let active = form::ActiveModel {
            form_number: Set(form_number),
            form_type: Set(input.form_type),
            date_created: Set(now),
            total_amount: Set(input.total_amount),
            remarks: Set(input.remarks),
            status: Set(FormStatus::Pending),
            attachment_path: Set(stored.as_ref().map(|s| s.public_path.clone())),
            submitted_by_id: Set(input.submitted_by_id),
            assigned_to_id: Set(input.assigned_to_id),
            cost_center_id: Set(input.cost_center_id),
            ..Default::default()
        };

        let model = match insert_and_commit(txn, active).await {
            Ok(model) => model,
            Err(e) => {
                self.discard_attachment(stored.as_ref()).await;
                return Err(e);
            }
        };

        info!(form_id = model.id, form_number = %model.form_number, "Form created");
        self.emit(Event::FormCreated {
            form_id: model.id,
            form_number: model.form_number.clone(),
            form_type: model.form_type,
        });

        self.details(model).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, form_id: i32) -> Result<FormDetails, ServiceError> {
        let form = self.find_form(&*self.db_pool, form_id).await?;
        self.details(form).await
    }

    /// Sets a form's status.
    ///
    /// Any status is accepted unless transitions are enforced, in which case
    /// moves outside the transition table fail with `InvalidOperation`.
    /// Re-applying the current status is always allowed.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        form_id: i32,
        status: FormStatus,
    ) -> Result<FormDetails, ServiceError> {
        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(|e| {
            error!("Failed to start transaction for status update: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        lock_form(&txn, form_id).await?;
        let existing = self.find_form(&txn, form_id).await?;
        let old_status = existing.status;
        if self.enforce_status_transitions
            && old_status != status
            && !old_status.can_transition_to(status)
        {
            return Err(ServiceError::InvalidOperation(format!(
                "cannot move form {} from {} to {}",
                existing.form_number, old_status, status
            )));
        }

        let mut active: form::ActiveModel = existing.into();
        active.status = Set(status);
        let updated = update_and_commit(txn, active).await?;

        info!(form_id, %old_status, new_status = %status, "Form status updated");
        self.emit(Event::FormStatusChanged {
            form_id,
            old_status,
            new_status: status,
        });

        self.details(updated).await
    }

    /// Assigns a form to a reviewer.
    #[instrument(skip(self))]
    pub async fn assign(
        &self,
        form_id: i32,
        assigned_to_id: i32,
    ) -> Result<FormDetails, ServiceError> {
        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(|e| {
            error!("Failed to start transaction for assignment: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        lock_form(&txn, form_id).await?;
        let existing = self.find_form(&txn, form_id).await?;
        ensure_exists::<user::Entity, _>(&txn, assigned_to_id, "Assigned user").await?;

        let mut active: form::ActiveModel = existing.into();
        active.assigned_to_id = Set(Some(assigned_to_id));
        let updated = update_and_commit(txn, active).await?;

        info!(form_id, assigned_to_id, "Form assigned");
        self.emit(Event::FormAssigned {
            form_id,
            assigned_to_id,
        });

        self.details(updated).await
    }

    /// Lists forms matching every provided filter, in creation order.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: FormFilter) -> Result<FormList, ServiceError> {
        let db = &*self.db_pool;
        let mut query = form::Entity::find();

        if let Some(form_type) = filter.form_type {
            query = query.filter(form::Column::FormType.eq(form_type));
        }
        if let Some(status) = filter.status {
            query = query.filter(form::Column::Status.eq(status));
        }
        if let Some(submitted_by_id) = filter.submitted_by_id {
            query = query.filter(form::Column::SubmittedById.eq(submitted_by_id));
        }
        if let Some(assigned_to_id) = filter.assigned_to_id {
            query = query.filter(form::Column::AssignedToId.eq(assigned_to_id));
        }
        if let Some(cost_center_id) = filter.cost_center_id {
            query = query.filter(form::Column::CostCenterId.eq(cost_center_id));
        }
        if let Some(customer_id) = filter.customer_id {
            query = query
                .join(JoinType::InnerJoin, form::Relation::CostCenter.def())
                .filter(cost_center::Column::CustomerId.eq(customer_id));
        }

        let forms = query
            .order_by_asc(form::Column::Id)
            .all(db)
            .await
            .map_err(|e| {
                error!("Failed to list forms: {}", e);
                ServiceError::DatabaseError(e)
            })?;

        let forms = self.resolve(forms).await?;
        Ok(FormList {
            total: forms.len(),
            forms,
        })
    }

    /// The cost center a form is charged to.
    pub async fn cost_center_for(
        &self,
        form: &form::Model,
    ) -> Result<cost_center::Model, ServiceError> {
        cost_center::Entity::find_by_id(form.cost_center_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Cost center"))
    }

    pub async fn submitter_for(&self, form: &form::Model) -> Result<user::Model, ServiceError> {
        user::Entity::find_by_id(form.submitted_by_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))
    }

    /// `None` while the form is unassigned.
    pub async fn assignee_for(
        &self,
        form: &form::Model,
    ) -> Result<Option<user::Model>, ServiceError> {
        match form.assigned_to_id {
            Some(user_id) => Ok(user::Entity::find_by_id(user_id)
                .one(&*self.db_pool)
                .await?),
            None => Ok(None),
        }
    }

    pub async fn customer_for(
        &self,
        cost_center: &cost_center::Model,
    ) -> Result<customer::Model, ServiceError> {
        customer::Entity::find_by_id(cost_center.customer_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Customer"))
    }

    async fn find_form<C: ConnectionTrait>(
        &self,
        conn: &C,
        form_id: i32,
    ) -> Result<form::Model, ServiceError> {
        form::Entity::find_by_id(form_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Form"))
    }

    async fn details(&self, form: form::Model) -> Result<FormDetails, ServiceError> {
        self.resolve(vec![form])
            .await?
            .pop()
            .ok_or_else(|| ServiceError::InternalError("form vanished while resolving".into()))
    }

    /// Resolves relations for a batch of forms with one query per relation.
    async fn resolve(&self, forms: Vec<form::Model>) -> Result<Vec<FormDetails>, ServiceError> {
        if forms.is_empty() {
            return Ok(Vec::new());
        }
        let db = &*self.db_pool;

        let user_ids: BTreeSet<i32> = forms
            .iter()
            .flat_map(|f| std::iter::once(f.submitted_by_id).chain(f.assigned_to_id))
            .collect();
        let cost_center_ids: BTreeSet<i32> = forms.iter().map(|f| f.cost_center_id).collect();

        let users: HashMap<i32, user::Model> = user::Entity::find()
            .filter(user::Column::Id.is_in(user_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let cost_centers: HashMap<i32, CostCenterDetails> = cost_center::Entity::find()
            .filter(cost_center::Column::Id.is_in(cost_center_ids))
            .find_also_related(customer::Entity)
            .all(db)
            .await?
            .into_iter()
            .map(|pair| CostCenterDetails::from_pair(pair).map(|cc| (cc.id, cc)))
            .collect::<Result<_, _>>()?;

        forms
            .into_iter()
            .map(|form| {
                let submitted_by = users.get(&form.submitted_by_id).cloned().ok_or_else(|| {
                    ServiceError::InternalError(format!(
                        "form {} references missing user {}",
                        form.id, form.submitted_by_id
                    ))
                })?;
                let assigned_to = form.assigned_to_id.and_then(|id| users.get(&id).cloned());
                let cost_center = cost_centers
                    .get(&form.cost_center_id)
                    .cloned()
                    .ok_or_else(|| {
                        ServiceError::InternalError(format!(
                            "form {} references missing cost center {}",
                            form.id, form.cost_center_id
                        ))
                    })?;
                Ok(FormDetails {
                    form,
                    submitted_by,
                    assigned_to,
                    cost_center,
                })
            })
            .collect()
    }

    async fn discard_attachment(&self, stored: Option<&StoredAttachment>) {
        if let Some(stored) = stored {
            self.attachments.discard(stored).await;
        }
    }

    fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            sender.send_or_log(event);
        }
    }
}

/// Takes the write lock on a form row before the transaction reads anything.
///
/// The no-op `UPDATE` makes SQLite start the transaction as a writer and holds
/// the row lock on Postgres until commit.
async fn lock_form(txn: &DatabaseTransaction, form_id: i32) -> Result<(), ServiceError> {
    let result = form::Entity::update_many()
        .col_expr(form::Column::Status, Expr::col(form::Column::Status).into())
        .filter(form::Column::Id.eq(form_id))
        .exec(txn)
        .await
        .map_err(|e| {
            error!("Failed to lock form {}: {}", form_id, e);
            ServiceError::DatabaseError(e)
        })?;
    if result.rows_affected == 0 {
        return Err(ServiceError::not_found("Form"));
    }
    Ok(())
}

/// Fails with a validation error when `id` does not name an `E` row.
async fn ensure_exists<E, C>(conn: &C, id: i32, what: &str) -> Result<(), ServiceError>
where
    E: EntityTrait,
    <E::PrimaryKey as sea_orm::PrimaryKeyTrait>::ValueType: From<i32>,
    C: ConnectionTrait,
{
    match E::find_by_id(id).one(conn).await? {
        Some(_) => Ok(()),
        None => Err(ServiceError::ValidationError(format!(
            "{what} {id} does not exist"
        ))),
    }
}

async fn insert_and_commit(
    txn: DatabaseTransaction,
    active: form::ActiveModel,
) -> Result<form::Model, ServiceError> {
    let model = active.insert(&txn).await.map_err(|e| {
        error!("Failed to insert form: {}", e);
        ServiceError::from(e)
    })?;
    txn.commit().await.map_err(|e| {
        error!("Failed to commit form creation: {}", e);
        ServiceError::DatabaseError(e)
    })?;
    Ok(model)
}

async fn update_and_commit(
    txn: DatabaseTransaction,
    active: form::ActiveModel,
) -> Result<form::Model, ServiceError> {
    let model = active.update(&txn).await.map_err(|e| {
        error!("Failed to update form: {}", e);
        ServiceError::from(e)
    })?;
    txn.commit().await.map_err(|e| {
        error!("Failed to commit form update: {}", e);
        ServiceError::DatabaseError(e)
    })?;
    Ok(model)
}
