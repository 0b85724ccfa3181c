//! Completion poller
//!
//! Re-reads an execution at a fixed interval until a predicate holds, the
//! bound expires, or the wait is cancelled. The finished and succeeded waits
//! differ only in their [`PollPolicy`]: a finished wait rides out store read
//! failures, a succeeded wait stops at the first one.

use runwatch_client::{ClientError, ExecutionStore};
use runwatch_core::domain::condition::Execution;
use runwatch_core::domain::pipeline::PipelineExecution;
use runwatch_core::domain::task::TaskExecution;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::TrackerConfig;
use crate::error::{Result, TrackError};

/// Bound and failure policy of one wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Total time allowed before the wait fails with `Timeout`
    pub timeout: Duration,
    /// Pause between two checks
    pub interval: Duration,
    /// Treat store read failures as "not yet" instead of failing the wait
    pub tolerate_fetch_errors: bool,
}

impl PollPolicy {
    /// Policy for waiting until an execution has a completion time
    pub fn finished(timeout: Duration, interval: Duration) -> Self {
        Self {
            timeout,
            interval,
            tolerate_fetch_errors: true,
        }
    }

    /// Policy for waiting until an execution reports success
    pub fn succeeded(timeout: Duration, interval: Duration) -> Self {
        Self {
            timeout,
            interval,
            tolerate_fetch_errors: false,
        }
    }
}

/// Bounded polling over the execution store
#[derive(Clone)]
pub struct CompletionPoller {
    store: Arc<dyn ExecutionStore>,
    config: TrackerConfig,
    cancel: CancellationToken,
}

impl CompletionPoller {
    /// Creates a new poller
    pub fn new(store: Arc<dyn ExecutionStore>, config: TrackerConfig) -> Self {
        Self {
            store,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Aborts pending waits with `Cancelled` once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    // =============================================================================
    // Task Runs
    // =============================================================================

    /// Waits until the task run has a completion time
    pub async fn wait_task_finished(
        &self,
        name: &str,
        namespace: &str,
        timeout: Duration,
    ) -> Result<TaskExecution> {
        let policy = PollPolicy::finished(timeout, self.config.poll_interval);
        self.wait_task(name, namespace, &policy, |t| t.is_finished())
            .await
    }

    /// Waits until the task run reports `Succeeded=True`
    pub async fn wait_task_succeeded(
        &self,
        name: &str,
        namespace: &str,
        timeout: Duration,
    ) -> Result<TaskExecution> {
        let policy = PollPolicy::succeeded(timeout, self.config.poll_interval);
        self.wait_task(name, namespace, &policy, |t| t.is_succeeded())
            .await
    }

    async fn wait_task(
        &self,
        name: &str,
        namespace: &str,
        policy: &PollPolicy,
        predicate: impl Fn(&TaskExecution) -> bool,
    ) -> Result<TaskExecution> {
        let store = self.store.as_ref();
        let what = format!("taskrun {}/{}", namespace, name);
        self.poll(
            &what,
            policy,
            move || store.get_task_execution(name, namespace),
            predicate,
        )
        .await
    }

    // =============================================================================
    // Pipeline Runs
    // =============================================================================

    /// Waits until the pipeline run has a completion time
    pub async fn wait_pipeline_finished(
        &self,
        name: &str,
        namespace: &str,
        timeout: Duration,
    ) -> Result<PipelineExecution> {
        let policy = PollPolicy::finished(timeout, self.config.poll_interval);
        self.wait_pipeline(name, namespace, &policy, |p| p.is_finished())
            .await
    }

    /// Waits until the pipeline run reports `Succeeded=True`
    pub async fn wait_pipeline_succeeded(
        &self,
        name: &str,
        namespace: &str,
        timeout: Duration,
    ) -> Result<PipelineExecution> {
        let policy = PollPolicy::succeeded(timeout, self.config.poll_interval);
        self.wait_pipeline(name, namespace, &policy, |p| p.is_succeeded())
            .await
    }

    async fn wait_pipeline(
        &self,
        name: &str,
        namespace: &str,
        policy: &PollPolicy,
        predicate: impl Fn(&PipelineExecution) -> bool,
    ) -> Result<PipelineExecution> {
        let store = self.store.as_ref();
        let what = format!("pipelinerun {}/{}", namespace, name);
        self.poll(
            &what,
            policy,
            move || store.get_pipeline_execution(name, namespace),
            predicate,
        )
        .await
    }

    // =============================================================================
    // Generic Waits
    // =============================================================================

    /// Re-fetches a snapshot until `predicate` holds and returns that snapshot
    ///
    /// The first fetch happens immediately. Fetch failures either count as
    /// "not yet" or end the wait, depending on `policy.tolerate_fetch_errors`.
    pub async fn poll<T, F, Fut, P>(
        &self,
        what: &str,
        policy: &PollPolicy,
        mut fetch: F,
        predicate: P,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, ClientError>>,
        P: Fn(&T) -> bool,
    {
        let predicate = &predicate;
        self.run(what, policy, move || {
            let snapshot = fetch();
            async move {
                let snapshot = snapshot.await?;
                Ok::<_, TrackError>(predicate(&snapshot).then_some(snapshot))
            }
        })
        .await
    }

    /// Waits until an arbitrary check returns `true`
    ///
    /// Any error returned by the check ends the wait.
    pub async fn wait_until<F, Fut>(&self, what: &str, timeout: Duration, mut check: F) -> Result<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        let policy = PollPolicy::succeeded(timeout, self.config.poll_interval);
        self.run(what, &policy, move || {
            let done = check();
            async move { Ok::<_, TrackError>(done.await?.then_some(())) }
        })
        .await
    }

    /// The polling loop shared by every wait
    ///
    /// `attempt` yields `Some` once the wait is over. A fetch that is still
    /// pending when the bound expires also ends in `Timeout`.
    async fn run<T, F, Fut>(&self, what: &str, policy: &PollPolicy, mut attempt: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        info!("Waiting up to {:?} for {}", policy.timeout, what);

        let deadline = Instant::now() + policy.timeout;
        let timed_out = || TrackError::Timeout {
            what: what.to_string(),
            timeout: policy.timeout,
        };
        let cancelled = || {
            info!("Wait for {} cancelled", what);
            TrackError::Cancelled(what.to_string())
        };

        loop {
            let outcome = tokio::select! {
                biased;

                _ = self.cancel.cancelled() => return Err(cancelled()),

                outcome = time::timeout_at(deadline, attempt()) => match outcome {
                    Ok(outcome) => outcome,
                    Err(_) => return Err(timed_out()),
                },
            };

            match outcome {
                Ok(Some(value)) => {
                    info!("{} is ready", what);
                    return Ok(value);
                }
                Ok(None) => debug!("{} is not ready yet", what),
                Err(TrackError::Fetch(e)) if policy.tolerate_fetch_errors => {
                    warn!("Failed to read {}, retrying: {}", what, e);
                }
                Err(e) => return Err(e),
            }

            let now = Instant::now();
            if now >= deadline {
                warn!("Gave up on {} after {:?}", what, policy.timeout);
                return Err(timed_out());
            }

            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => return Err(cancelled()),

                _ = time::sleep(policy.interval.min(deadline - now)) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeStore, Step, failed_task, pipeline, running_task, succeeded_task};
    use runwatch_core::domain::condition::{Condition, ConditionStatus, SUCCEEDED};

    const TIMEOUT: Duration = Duration::from_secs(10);
    const INTERVAL: Duration = Duration::from_secs(1);

    fn poller(store: FakeStore) -> (Arc<FakeStore>, CompletionPoller) {
        let store = Arc::new(store);
        let config = TrackerConfig::default().with_poll_interval(INTERVAL);
        let poller = CompletionPoller::new(store.clone(), config);
        (store, poller)
    }

    #[tokio::test(start_paused = true)]
    async fn test_finished_returns_completed_snapshot() {
        let (store, poller) = poller(FakeStore::new().with_task_script(
            "build-1",
            vec![
                Step::Ready(running_task("build-1")),
                Step::Ready(running_task("build-1")),
                Step::Ready(failed_task("build-1")),
            ],
        ));
        let start = Instant::now();

        let task = poller.wait_task_finished("build-1", "dev", TIMEOUT).await.unwrap();
        assert!(task.is_finished());
        assert!(!task.is_succeeded());
        assert_eq!(store.task_reads("build-1"), 3);
        assert_eq!(start.elapsed(), 2 * INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_finished_times_out_despite_fetch_errors() {
        let (_, poller) = poller(FakeStore::new().with_task_script(
            "build-1",
            vec![
                Step::Unavailable,
                Step::Ready(running_task("build-1")),
                Step::Unavailable,
                Step::Ready(running_task("build-1")),
            ],
        ));
        let start = Instant::now();

        let err = poller.wait_task_finished("build-1", "dev", TIMEOUT).await.unwrap_err();
        let elapsed = start.elapsed();
        assert!(err.is_timeout(), "unexpected error: {err}");
        assert!(elapsed >= TIMEOUT && elapsed <= TIMEOUT + INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_finished_tolerates_run_not_created_yet() {
        let (_, poller) = poller(FakeStore::new().with_task_script(
            "build-1",
            vec![Step::Unavailable, Step::Unavailable, Step::Ready(succeeded_task("build-1"))],
        ));

        let task = poller.wait_task_finished("build-1", "dev", TIMEOUT).await.unwrap();
        assert_eq!(task.metadata.name, "build-1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeded_fails_fast_on_fetch_error() {
        let (store, poller) = poller(
            FakeStore::new().with_task_script("build-1", vec![Step::Unavailable]),
        );
        let start = Instant::now();

        let err = poller.wait_task_succeeded("build-1", "dev", TIMEOUT).await.unwrap_err();
        assert!(err.is_fetch(), "unexpected error: {err}");
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(store.task_reads("build-1"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeded_ignores_failed_completion() {
        // A failed run is finished but never succeeds, so the wait runs out
        let (_, poller) = poller(FakeStore::new().with_task(failed_task("build-1")));

        let err = poller.wait_task_succeeded("build-1", "dev", TIMEOUT).await.unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_longer_than_remaining_time() {
        let store = Arc::new(FakeStore::new().with_task(running_task("build-1")));
        let config = TrackerConfig::default().with_poll_interval(Duration::from_secs(3));
        let poller = CompletionPoller::new(store, config);
        let start = Instant::now();

        let err = poller.wait_task_finished("build-1", "dev", TIMEOUT).await.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(start.elapsed(), TIMEOUT);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_wait() {
        let token = CancellationToken::new();
        let (_, poller) = poller(FakeStore::new().with_task(running_task("build-1")));
        let poller = poller.with_cancellation(token.clone());

        tokio::spawn(async move {
            time::sleep(Duration::from_millis(3500)).await;
            token.cancel();
        });
        let start = Instant::now();

        let err = poller.wait_task_finished("build-1", "dev", TIMEOUT).await.unwrap_err();
        assert!(matches!(err, TrackError::Cancelled(_)));
        assert!(start.elapsed() < TIMEOUT);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pipeline_waits() {
        let mut done = pipeline("pr", &[]);
        done.status.completion_time = Some(chrono::Utc::now());
        done.status.conditions = vec![Condition::new(SUCCEEDED, ConditionStatus::True)];
        let (_, poller) = poller(FakeStore::new().with_pipeline(done));

        let run = poller.wait_pipeline_finished("pr", "dev", TIMEOUT).await.unwrap();
        assert!(run.has_succeeded());
        assert!(poller.wait_pipeline_succeeded("pr", "dev", TIMEOUT).await.is_ok());

        let err = poller
            .wait_pipeline_succeeded("missing", "dev", TIMEOUT)
            .await
            .unwrap_err();
        assert!(err.is_fetch());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_custom_check() {
        let (_, poller) = poller(FakeStore::new());
        let mut checks = 0;

        poller
            .wait_until("release plan to match", TIMEOUT, || {
                checks += 1;
                let done = checks == 4;
                async move { Ok::<_, TrackError>(done) }
            })
            .await
            .unwrap();
        assert_eq!(checks, 4);

        let err = poller
            .wait_until("release plan to match", TIMEOUT, || async {
                Err::<bool, _>(TrackError::not_found("condition Matched is not set"))
            })
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
