//! Order lifecycle rules for the kusina admin service.
//!
//! This crate holds the pure business logic of the order state machine:
//! transition validation and planning, the cash-on-delivery approval
//! workflow, and the store-to-customer distance estimator. Nothing in here
//! performs I/O; the engine crate feeds in authoritative order records and
//! persists the results.

use kusina_types::OrderStatus;
use thiserror::Error;

pub mod approval;
pub mod distance;
pub mod transitions;

pub use approval::{approval_context, approve, reject, review_required, ApprovalContext};
pub use distance::haversine_km;
pub use transitions::{plan, StatusChange, Transition, DEFAULT_REJECTION_REASON};

/// Errors produced while validating an order update.
///
/// Every variant maps to a caller error; none of them leaves the order
/// partially mutated.
#[derive(Debug, Error, PartialEq)]
pub enum OrderError {
	/// The requested status would move the order backwards.
	#[error("invalid status: cannot move backwards")]
	InvalidTransition { from: OrderStatus, to: OrderStatus },
	/// An extra field was malformed, e.g. a non-finite delivery time.
	#[error("validation failed: {0}")]
	Validation(String),
	/// The update carried no fields, or no field differed from the
	/// stored record.
	#[error("no changes provided")]
	NoChange,
}
