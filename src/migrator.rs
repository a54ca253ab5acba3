use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_directory_tables::Migration),
            Box::new(m20250101_000002_create_forms_table::Migration),
            Box::new(m20250101_000003_create_form_sequences_table::Migration),
        ]
    }
}

#[derive(DeriveIden)]
enum Customers {
    Table,
    Id,
    Name,
    Code,
    Description,
}

#[derive(DeriveIden)]
enum CostCenters {
    Table,
    Id,
    Name,
    Code,
    Description,
    CustomerId,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    FullName,
    Role,
    IsActive,
}

#[derive(DeriveIden)]
enum Forms {
    Table,
    Id,
    FormNumber,
    FormType,
    DateCreated,
    TotalAmount,
    Remarks,
    Status,
    AttachmentPath,
    SubmittedById,
    AssignedToId,
    CostCenterId,
}

#[derive(DeriveIden)]
enum FormSequences {
    Table,
    FormType,
    Year,
    LastValue,
}

mod m20250101_000001_create_directory_tables {
    use super::{CostCenters, Customers, Users};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000001_create_directory_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Customers::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Customers::Name).string().not_null())
                        .col(
                            ColumnDef::new(Customers::Code)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Customers::Description).text().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CostCenters::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CostCenters::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(CostCenters::Name).string().not_null())
                        .col(
                            ColumnDef::new(CostCenters::Code)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(CostCenters::Description).text().null())
                        .col(ColumnDef::new(CostCenters::CustomerId).integer().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_cost_centers_customer_id")
                                .from(CostCenters::Table, CostCenters::CustomerId)
                                .to(Customers::Table, Customers::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_cost_centers_customer_id")
                        .table(CostCenters::Table)
                        .col(CostCenters::CustomerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Users::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Users::Username)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                        .col(ColumnDef::new(Users::FullName).string().not_null())
                        .col(
                            ColumnDef::new(Users::Role)
                                .string_len(32)
                                .not_null()
                                .default("employee"),
                        )
                        .col(
                            ColumnDef::new(Users::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(CostCenters::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }
}

mod m20250101_000002_create_forms_table {
    use super::{CostCenters, Forms, Users};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000002_create_forms_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Forms::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Forms::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Forms::FormNumber)
                                .string_len(32)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Forms::FormType).string_len(32).not_null())
                        .col(
                            ColumnDef::new(Forms::DateCreated)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Forms::TotalAmount)
                                .decimal_len(14, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Forms::Remarks).text().null())
                        .col(
                            ColumnDef::new(Forms::Status)
                                .string_len(32)
                                .not_null()
                                .default("pending"),
                        )
                        .col(ColumnDef::new(Forms::AttachmentPath).string().null())
                        .col(ColumnDef::new(Forms::SubmittedById).integer().not_null())
                        .col(ColumnDef::new(Forms::AssignedToId).integer().null())
                        .col(ColumnDef::new(Forms::CostCenterId).integer().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_forms_submitted_by_id")
                                .from(Forms::Table, Forms::SubmittedById)
                                .to(Users::Table, Users::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_forms_assigned_to_id")
                                .from(Forms::Table, Forms::AssignedToId)
                                .to(Users::Table, Users::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_forms_cost_center_id")
                                .from(Forms::Table, Forms::CostCenterId)
                                .to(CostCenters::Table, CostCenters::Id),
                        )
                        .to_owned(),
                )
                .await?;

            for (name, column) in [
                ("idx_forms_form_type", Forms::FormType),
                ("idx_forms_status", Forms::Status),
                ("idx_forms_submitted_by_id", Forms::SubmittedById),
                ("idx_forms_assigned_to_id", Forms::AssignedToId),
                ("idx_forms_cost_center_id", Forms::CostCenterId),
            ] {
                manager
                    .create_index(
                        Index::create()
                            .if_not_exists()
                            .name(name)
                            .table(Forms::Table)
                            .col(column)
                            .to_owned(),
                    )
                    .await?;
            }

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Forms::Table).to_owned())
                .await
        }
    }
}

mod m20250101_000003_create_form_sequences_table {
    use super::FormSequences;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000003_create_form_sequences_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(FormSequences::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(FormSequences::FormType)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(ColumnDef::new(FormSequences::Year).integer().not_null())
                        .col(
                            ColumnDef::new(FormSequences::LastValue)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .primary_key(
                            Index::create()
                                .name("pk_form_sequences")
                                .col(FormSequences::FormType)
                                .col(FormSequences::Year),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(FormSequences::Table).to_owned())
                .await
        }
    }
}
