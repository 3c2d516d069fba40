//! `tracing` spans and events; no-ops without the feature.

// self
use crate::{
	_prelude::*,
	obs::{OpKind, OpOutcome},
};

#[cfg(feature = "tracing")]
pub(super) type OpSpan = tracing::Span;
#[cfg(not(feature = "tracing"))]
#[derive(Clone, Copy, Debug)]
pub(super) struct OpSpan;

pub(super) fn open(kind: OpKind, target: &str) -> OpSpan {
	#[cfg(feature = "tracing")]
	{
		tracing::debug_span!(
			"heketi_client.op",
			op = kind.as_str(),
			path = target,
			outcome = tracing::field::Empty
		)
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, target);

		OpSpan
	}
}

pub(super) async fn within<F>(span: &OpSpan, fut: F) -> F::Output
where
	F: Future,
{
	#[cfg(feature = "tracing")]
	{
		use tracing::Instrument;

		fut.instrument(span.clone()).await
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = span;

		fut.await
	}
}

pub(super) fn close(span: &OpSpan, outcome: OpOutcome) {
	#[cfg(feature = "tracing")]
	{
		span.record("outcome", outcome.as_str());
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (span, outcome);
	}
}

pub(super) fn poll_event(attempt: u32, status: StatusCode, pending: bool) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(attempt, status = status.as_u16(), pending, "Polled job resource.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (attempt, status, pending);
	}
}

pub(super) fn redirect_event(status: StatusCode, target: &Url) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(status = status.as_u16(), location = target.as_str(), "Following redirect.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (status, target);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn spans_wrap_without_altering_output() {
		let span = open(OpKind::Poll, "/queue/1");
		let value = within(&span, async { 42 }).await;

		close(&span, OpOutcome::Completed);

		assert_eq!(value, 42);
	}
}
