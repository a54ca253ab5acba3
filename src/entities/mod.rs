//! SeaORM entities for the reimbursement schema.
//!
//! Foreign keys are plain id columns. Resolving a form's cost center,
//! submitter or assignee goes through the lookup accessors on
//! [`crate::services::forms::FormService`] rather than embedded back-references.

pub mod cost_center;
pub mod customer;
pub mod form;
pub mod form_sequence;
pub mod user;
