//! Optional observability for SDK operations.
//!
//! Every operation runs through [`observe`] (or [`observe_sync`]), which opens the
//! operation span and records one `attempt` plus one terminal outcome.
//!
//! # Feature Flags
//!
//! - `tracing`: spans named `security_advisor.op` with `op` and `stage` fields.
//! - `metrics`: counter `security_advisor_op_total` labeled by `op` and `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the SDK.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// Bearer token + account extraction from an authenticator.
	TokenExtraction,
	/// Account settings + location detail lookups.
	LocationResolution,
	/// Comparison of a service URL against the resolved location.
	EndpointVerification,
	/// API key exchange at the IAM token endpoint.
	IamTokenExchange,
}
impl OpKind {
	/// Label used for the `op` span field and metric label.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpKind::TokenExtraction => "token_extraction",
			OpKind::LocationResolution => "location_resolution",
			OpKind::EndpointVerification => "endpoint_verification",
			OpKind::IamTokenExchange => "iam_token_exchange",
		}
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// The operation started.
	Attempt,
	/// The operation returned `Ok`.
	Success,
	/// The operation returned `Err`.
	Failure,
}
impl OpOutcome {
	/// Label used for the `outcome` metric label.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
		}
	}

	/// Terminal outcome of `result`.
	pub fn of<T, E>(result: &Result<T, E>) -> Self {
		if result.is_ok() { OpOutcome::Success } else { OpOutcome::Failure }
	}
}

/// Runs `fut` inside the span of `kind` and records its attempt and outcome.
pub async fn observe<T, E, F>(kind: OpKind, stage: &'static str, fut: F) -> Result<T, E>
where
	F: Future<Output = Result<T, E>>,
{
	record_op_outcome(kind, OpOutcome::Attempt);

	let result = OpSpan::new(kind, stage).instrument(fut).await;

	record_op_outcome(kind, OpOutcome::of(&result));

	result
}

/// Synchronous counterpart of [`observe`].
pub fn observe_sync<T, E>(
	kind: OpKind,
	stage: &'static str,
	f: impl FnOnce() -> Result<T, E>,
) -> Result<T, E> {
	record_op_outcome(kind, OpOutcome::Attempt);

	let result = OpSpan::new(kind, stage).in_scope(f);

	record_op_outcome(kind, OpOutcome::of(&result));

	result
}
