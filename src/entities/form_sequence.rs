use sea_orm::entity::prelude::*;

/// Last form number handed out per form type and calendar year.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "form_sequences")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub form_type: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub year: i32,
    pub last_value: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
