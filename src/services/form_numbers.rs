//! Form number allocation.
//!
//! Numbers look like `REI-2025-0007`: a prefix per form type, the calendar
//! year, and a four digit counter kept per type and year in the
//! `form_sequences` table. The counter row is bumped with a single
//! `UPDATE ... SET last_value = last_value + 1` in the caller's transaction,
//! so concurrent creations serialize on the row and never share a value, and
//! a rolled back creation also rolls back its number.

use crate::{
    entities::{form::FormType, form_sequence},
    errors::ServiceError,
};
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
};
use tracing::{debug, error};

/// Prefix used for form types without a dedicated one
pub const DEFAULT_PREFIX: &str = "FORM";

pub fn prefix_for(form_type: &str) -> &'static str {
    match form_type {
        "reimbursement" => "REI",
        "cash_advance" => "CA",
        "liquidation" => "LIQ",
        _ => DEFAULT_PREFIX,
    }
}

/// Counters past 9999 widen instead of wrapping.
pub fn format_form_number(prefix: &str, year: i32, sequence: i32) -> String {
    format!("{prefix}-{year}-{sequence:04}")
}

/// Advances the `(form_type, year)` counter and returns the new value.
pub async fn next_sequence<C>(conn: &C, form_type: &str, year: i32) -> Result<i32, ServiceError>
where
    C: ConnectionTrait,
{
    form_sequence::Entity::insert(form_sequence::ActiveModel {
        form_type: Set(form_type.to_string()),
        year: Set(year),
        last_value: Set(0),
    })
    .on_conflict(
        OnConflict::columns([form_sequence::Column::FormType, form_sequence::Column::Year])
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(conn)
    .await
    .map_err(|e| {
        error!("Failed to seed form sequence {}/{}: {}", form_type, year, e);
        ServiceError::DatabaseError(e)
    })?;

    form_sequence::Entity::update_many()
        .col_expr(
            form_sequence::Column::LastValue,
            Expr::col(form_sequence::Column::LastValue).add(1),
        )
        .filter(form_sequence::Column::FormType.eq(form_type))
        .filter(form_sequence::Column::Year.eq(year))
        .exec(conn)
        .await
        .map_err(|e| {
            error!("Failed to advance form sequence {}/{}: {}", form_type, year, e);
            ServiceError::DatabaseError(e)
        })?;

    let sequence = form_sequence::Entity::find_by_id((form_type.to_string(), year))
        .one(conn)
        .await?
        .ok_or_else(|| {
            ServiceError::InternalError(format!("form sequence {form_type}/{year} vanished"))
        })?;

    debug!(form_type, year, value = sequence.last_value, "Form sequence advanced");
    Ok(sequence.last_value)
}

/// Allocates the next form number for `form_type` in `year`.
pub async fn allocate<C>(conn: &C, form_type: FormType, year: i32) -> Result<String, ServiceError>
where
    C: ConnectionTrait,
{
    let key = form_type.as_ref();
    let sequence = next_sequence(conn, key, year).await?;
    Ok(format_form_number(prefix_for(key), year, sequence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{establish_connection_with_config, run_migrations, DbConfig};
    use sea_orm::TransactionTrait;

    #[test]
    fn known_types_have_short_prefixes() {
        assert_eq!(prefix_for("reimbursement"), "REI");
        assert_eq!(prefix_for("cash_advance"), "CA");
        assert_eq!(prefix_for("liquidation"), "LIQ");
        assert_eq!(prefix_for("travel"), "FORM");
        assert_eq!(prefix_for(""), "FORM");
    }

    #[test]
    fn numbers_are_zero_padded() {
        assert_eq!(format_form_number("REI", 2025, 1), "REI-2025-0001");
        assert_eq!(format_form_number("CA", 2025, 42), "CA-2025-0042");
        assert_eq!(format_form_number("LIQ", 2025, 12345), "LIQ-2025-12345");
    }

    #[tokio::test]
    async fn counters_are_per_type_and_year() {
        let db = establish_connection_with_config(&DbConfig::in_memory())
            .await
            .unwrap();
        run_migrations(&db).await.unwrap();

        assert_eq!(
            allocate(&db, FormType::Reimbursement, 2025).await.unwrap(),
            "REI-2025-0001"
        );
        assert_eq!(
            allocate(&db, FormType::Reimbursement, 2025).await.unwrap(),
            "REI-2025-0002"
        );
        assert_eq!(
            allocate(&db, FormType::CashAdvance, 2025).await.unwrap(),
            "CA-2025-0001"
        );
        assert_eq!(
            allocate(&db, FormType::Reimbursement, 2026).await.unwrap(),
            "REI-2026-0001"
        );
    }

    #[tokio::test]
    async fn rolled_back_allocation_is_reused() {
        let db = establish_connection_with_config(&DbConfig::in_memory())
            .await
            .unwrap();
        run_migrations(&db).await.unwrap();

        let txn = db.begin().await.unwrap();
        assert_eq!(
            allocate(&txn, FormType::Liquidation, 2025).await.unwrap(),
            "LIQ-2025-0001"
        );
        txn.rollback().await.unwrap();

        assert_eq!(
            allocate(&db, FormType::Liquidation, 2025).await.unwrap(),
            "LIQ-2025-0001"
        );
    }
}
