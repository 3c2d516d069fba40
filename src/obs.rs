//! Optional observability for signed sends and job polls.
//!
//! # Feature Flags
//!
//! - `tracing`: each [`Client::send`](crate::client::Client::send) and
//!   [`Client::wait_for_job`](crate::client::Client::wait_for_job) runs inside a
//!   `heketi_client.op` span with `op`, `path`, and (once settled) `outcome` fields. Poll
//!   iterations and followed redirects emit `debug` events.
//! - `metrics`: `heketi_client_op_total{op,outcome}` counts settled operations,
//!   `heketi_client_poll_attempts_total{pending}` counts poll requests, and
//!   `heketi_client_redirects_total{status}` counts followed redirects.
//!
//! With both features off every helper compiles down to the wrapped future.

mod counter;
mod span;

// self
use crate::_prelude::*;

/// Operations observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// Signed request dispatch, redirects included.
	Send,
	/// Long-running job poll loop.
	Poll,
}
impl OpKind {
	/// Stable label used in span and metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Send => "send",
			Self::Poll => "poll",
		}
	}
}

/// How an observed operation settled, one label per error category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// The operation produced a response.
	Completed,
	/// The job reported a failure while pending.
	JobFailed,
	/// The poll loop used up its attempt budget.
	Exhausted,
	/// The poll loop ran past its deadline.
	Deadline,
	/// Request construction, dispatch, redirects, or location handling failed.
	Transport,
	/// The request could not be signed.
	Signing,
	/// Local configuration was rejected.
	Config,
	/// The server answered with a status the caller did not accept.
	Rejected,
}
impl OpOutcome {
	/// Classifies a settled operation.
	pub fn of<T>(result: &Result<T>) -> Self {
		match result {
			Ok(_) => Self::Completed,
			Err(Error::JobFailed(_)) => Self::JobFailed,
			Err(Error::PollExhausted { .. }) => Self::Exhausted,
			Err(Error::PollDeadline { .. }) => Self::Deadline,
			Err(Error::Transport(_)) => Self::Transport,
			Err(Error::Signing(_)) => Self::Signing,
			Err(Error::Config(_)) => Self::Config,
			Err(Error::Api(_)) => Self::Rejected,
		}
	}

	/// Stable label used in span and metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Completed => "completed",
			Self::JobFailed => "job_failed",
			Self::Exhausted => "exhausted",
			Self::Deadline => "deadline",
			Self::Transport => "transport",
			Self::Signing => "signing",
			Self::Config => "config",
			Self::Rejected => "rejected",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` as one observed operation against `target` and records how it settled.
pub(crate) async fn observe<T, F>(kind: OpKind, target: &str, fut: F) -> Result<T>
where
	F: Future<Output = Result<T>>,
{
	let span = span::open(kind, target);
	let result = span::within(&span, fut).await;
	let outcome = OpOutcome::of(&result);

	span::close(&span, outcome);
	counter::record_outcome(kind, outcome);

	result
}

/// Records one poll request and whether the job was still pending.
pub(crate) fn poll_attempt(attempt: u32, status: StatusCode, pending: bool) {
	span::poll_event(attempt, status, pending);
	counter::record_poll_attempt(pending);
}

/// Records a redirect the client is about to follow.
pub(crate) fn redirect(status: StatusCode, target: &Url) {
	span::redirect_event(status, target);
	counter::record_redirect(status);
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		api_error::ApiError,
		auth::SigningError,
		error::{ConfigError, TransportError},
	};

	fn outcome_of(err: Error) -> &'static str {
		OpOutcome::of::<()>(&Err(err)).as_str()
	}

	#[test]
	fn every_error_category_gets_its_own_label() {
		let api = || ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "boom");
		let invalid_header =
			HeaderValue::from_str("\n").expect_err("Newlines are not valid header values.");

		assert_eq!(OpOutcome::of(&Ok(())).as_str(), "completed");
		assert_eq!(outcome_of(Error::JobFailed(api())), "job_failed");
		assert_eq!(outcome_of(Error::PollExhausted { attempts: 3 }), "exhausted");
		assert_eq!(outcome_of(Error::PollDeadline { deadline: Duration::seconds(1) }), "deadline");
		assert_eq!(
			outcome_of(TransportError::TooManyRedirects { max: 10 }.into()),
			"transport"
		);
		assert_eq!(outcome_of(SigningError::from(invalid_header).into()), "signing");
		assert_eq!(
			outcome_of(ConfigError::UnsupportedScheme { scheme: "ftp".into() }.into()),
			"config"
		);
		assert_eq!(outcome_of(Error::Api(api())), "rejected");
	}

	#[tokio::test]
	async fn observe_passes_the_result_through() {
		let ok = observe(OpKind::Send, "/clusters", async { Ok::<_, Error>(7) }).await;
		let err = observe(OpKind::Poll, "/queue/1", async {
			Err::<(), _>(Error::PollExhausted { attempts: 1 })
		})
		.await;

		assert_eq!(ok.expect("Successful future should pass through."), 7);
		assert!(matches!(err, Err(Error::PollExhausted { attempts: 1 })));
	}

	#[test]
	fn event_helpers_accept_any_status() {
		poll_attempt(1, StatusCode::OK, true);
		redirect(
			StatusCode::SEE_OTHER,
			&Url::parse("http://heketi.test/volumes/1").expect("Failed to parse test URL."),
		);
	}
}
