use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FormType {
    #[sea_orm(string_value = "reimbursement")]
    Reimbursement,
    #[sea_orm(string_value = "cash_advance")]
    CashAdvance,
    #[sea_orm(string_value = "liquidation")]
    Liquidation,
}

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FormStatus {
    #[default]
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl FormStatus {
    /// Moves allowed when status transitions are enforced.
    pub fn allowed_next(self) -> &'static [FormStatus] {
        match self {
            FormStatus::Pending => &[FormStatus::Approved, FormStatus::Rejected],
            FormStatus::Approved => &[FormStatus::Completed],
            FormStatus::Rejected | FormStatus::Completed => &[],
        }
    }

    pub fn can_transition_to(self, next: FormStatus) -> bool {
        self.allowed_next().contains(&next)
    }
}

/// A reimbursement, cash advance or liquidation request.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "forms")]
#[schema(as = Form)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// `{PREFIX}-{year}-{NNNN}`, assigned once at creation
    #[sea_orm(unique)]
    pub form_number: String,
    pub form_type: FormType,
    pub date_created: DateTime<Utc>,
    #[schema(value_type = String, example = "1250.00")]
    pub total_amount: Decimal,
    pub remarks: Option<String>,
    pub status: FormStatus,
    /// Public path of the uploaded attachment, e.g. `/uploads/REI-2025-0001.pdf`
    pub attachment_path: Option<String>,
    pub submitted_by_id: i32,
    pub assigned_to_id: Option<i32>,
    pub cost_center_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cost_center::Entity",
        from = "Column::CostCenterId",
        to = "super::cost_center::Column::Id"
    )]
    CostCenter,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SubmittedById",
        to = "super::user::Column::Id"
    )]
    SubmittedBy,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AssignedToId",
        to = "super::user::Column::Id"
    )]
    AssignedTo,
}

impl Related<super::cost_center::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CostCenter.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
