//! Long-running job polling.
//!
//! The server answers slow operations with `202 Accepted` and a `Location` naming a job
//! resource. [`Client::wait_for_job`] polls that resource with freshly signed GETs: while the
//! job runs each poll carries `X-Pending: true` with `200 OK`, a failure while pending carries
//! `X-Pending: true` with any other status, and a finished job answers without the
//! indicator (typically by redirecting to the resource it produced, which the client follows
//! and re-signs like any other redirect).
//!
//! The loop itself has no natural end against a misbehaving server, so [`PollPolicy`] lets
//! callers bound it by attempt count and by wall-clock deadline. Dropping the returned future
//! cancels the loop at its next await point.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{
	_prelude::*,
	client::Client,
	error::TransportError,
	http::{HttpRequest, JobHttpClient},
	obs::{self, OpKind},
	response::ServerResponse,
};

/// Pacing and bounds for one poll loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollPolicy {
	/// Pause between a pending answer and the next poll.
	pub interval: Duration,
	/// Maximum number of poll requests; `None` polls until the job settles.
	pub max_attempts: Option<u32>,
	/// Wall-clock budget for the whole loop, requests included; `None` means no deadline.
	pub deadline: Option<Duration>,
}
impl PollPolicy {
	const DEFAULT_INTERVAL: Duration = Duration::seconds(2);

	/// Creates an unbounded policy polling every `interval`.
	pub fn new(interval: Duration) -> Self {
		Self::default().with_interval(interval)
	}

	/// Overrides the poll interval; negative values are treated as zero.
	pub fn with_interval(mut self, interval: Duration) -> Self {
		self.interval = clamp_non_negative(interval);

		self
	}

	/// Caps the number of poll requests; zero is treated as one.
	pub fn with_max_attempts(mut self, attempts: u32) -> Self {
		self.max_attempts = Some(attempts.max(1));

		self
	}

	/// Bounds the whole loop by `deadline`; negative values are treated as zero.
	pub fn with_deadline(mut self, deadline: Duration) -> Self {
		self.deadline = Some(clamp_non_negative(deadline));

		self
	}

	fn exhausted(&self, attempts: u32) -> bool {
		self.max_attempts.is_some_and(|max| attempts >= max)
	}
}
impl Default for PollPolicy {
	fn default() -> Self {
		Self { interval: Self::DEFAULT_INTERVAL, max_attempts: None, deadline: None }
	}
}

/// Thread-safe counters for poll loops run by a client and its clones.
#[derive(Debug, Default)]
pub struct PollStats {
	attempts: AtomicU64,
	completed: AtomicU64,
	failed: AtomicU64,
}
impl PollStats {
	/// Returns the total number of poll requests issued.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of loops that ended with a completed response.
	pub fn completed(&self) -> u64 {
		self.completed.load(Ordering::Relaxed)
	}

	/// Returns the number of loops that ended with an error.
	pub fn failed(&self) -> u64 {
		self.failed.load(Ordering::Relaxed)
	}

	fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	fn record_completed(&self) {
		self.completed.fetch_add(1, Ordering::Relaxed);
	}

	fn record_failed(&self) {
		self.failed.fetch_add(1, Ordering::Relaxed);
	}
}

impl<C> Client<C>
where
	C: ?Sized + JobHttpClient,
{
	/// Polls the job named by `initial`'s `Location` until it completes or fails.
	///
	/// Returns the first poll response without the pending indicator, unchanged. A pending
	/// response with any status other than `200 OK` ends the loop with [`Error::JobFailed`].
	/// Transport, signing, and location failures end it immediately. Exceeding the policy's
	/// bounds yields [`Error::PollExhausted`] or [`Error::PollDeadline`].
	pub async fn wait_for_job(
		&self,
		initial: ServerResponse,
		policy: &PollPolicy,
	) -> Result<ServerResponse> {
		let target = initial.location().map(|url| url.path().to_owned()).unwrap_or_default();
		let result = obs::observe(OpKind::Poll, &target, async move {
			match policy.deadline {
				Some(deadline) => tokio::time::timeout(
					deadline.unsigned_abs(),
					self.poll_until_settled(initial, policy),
				)
				.await
				.map_err(|_| Error::PollDeadline { deadline })?,
				None => self.poll_until_settled(initial, policy).await,
			}
		})
		.await;

		if result.is_ok() {
			self.poll_stats.record_completed();
		} else {
			self.poll_stats.record_failed();
		}

		result
	}

	/// Sends `request` and, when the server accepts it as a job (`202` with `Location`), waits
	/// for the job per `policy`. Any other response is returned as-is.
	pub async fn send_and_wait(
		&self,
		request: HttpRequest,
		policy: &PollPolicy,
	) -> Result<ServerResponse> {
		let response = self.send(request).await?;

		if response.status() == StatusCode::ACCEPTED && response.has_location() {
			self.wait_for_job(response, policy).await
		} else {
			Ok(response)
		}
	}

	async fn poll_until_settled(
		&self,
		initial: ServerResponse,
		policy: &PollPolicy,
	) -> Result<ServerResponse> {
		let location = initial.location()?;
		let mut attempts = 0;

		loop {
			let request = http::Request::builder()
				.method(Method::GET)
				.uri(location.as_str())
				.body(Vec::new())
				.map_err(TransportError::from)?;

			attempts = next_attempt(attempts);
			self.poll_stats.record_attempt();

			let response = self.dispatch(request).await?;
			let pending = response.is_pending();

			obs::poll_attempt(attempts, response.status(), pending);

			if !pending {
				return Ok(response);
			}
			if response.status() != StatusCode::OK {
				return Err(Error::JobFailed(self.error_extractor.extract(&response)));
			}
			if policy.exhausted(attempts) {
				return Err(Error::PollExhausted { attempts });
			}

			tokio::time::sleep(policy.interval.unsigned_abs()).await;
		}
	}
}

fn next_attempt(attempts: u32) -> u32 {
	attempts.saturating_add(1)
}

fn clamp_non_negative(value: Duration) -> Duration {
	if value.is_negative() { Duration::ZERO } else { value }
}
