// self
use crate::obs::{OpKind, OpOutcome};

/// Increments `security_advisor_op_total{op, outcome}` when the `metrics` feature is on.
pub fn record_op_outcome(kind: OpKind, outcome: OpOutcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!(
		"security_advisor_op_total",
		"op" => kind.as_str(),
		"outcome" => outcome.as_str()
	)
	.increment(1);

	#[cfg(not(feature = "metrics"))]
	let _ = (kind, outcome);
}
