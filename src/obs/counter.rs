//! `metrics` counters; no-ops without the feature.

// self
use crate::{
	_prelude::*,
	obs::{OpKind, OpOutcome},
};

pub(super) fn record_outcome(kind: OpKind, outcome: OpOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"heketi_client_op_total",
			"op" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

pub(super) fn record_poll_attempt(pending: bool) {
	#[cfg(feature = "metrics")]
	{
		let pending = if pending { "true" } else { "false" };

		metrics::counter!("heketi_client_poll_attempts_total", "pending" => pending).increment(1);
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = pending;
	}
}

pub(super) fn record_redirect(status: StatusCode) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("heketi_client_redirects_total", "status" => status.as_u16().to_string())
			.increment(1);
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = status;
	}
}
