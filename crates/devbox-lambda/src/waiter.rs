//! Instance readiness waiter (exponential backoff)
//!
//! Polls the instance list until every requested instance is ready or the
//! deadline passes. One list call per iteration covers all pending
//! instances, so waiting for N instances costs the same as waiting for one.

use crate::error::{ApiError, CommonError, WaitError};
use crate::model::Instance;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::{Instant, sleep};

/// Growth factor applied to the poll interval after each unready iteration
pub const BACKOFF_FACTOR: f64 = 1.5;

/// Upper bound on a single sleep
pub const MAX_BACKOFF: Duration = Duration::from_secs(15);

/// Where the waiter reads instance snapshots from
#[async_trait]
pub trait InstanceSource: Send + Sync {
    async fn list_instances(&self) -> Result<Vec<Instance>, ApiError<CommonError>>;
}

/// Progress callbacks, invoked between polls
pub trait WaitObserver: Send {
    /// An instance became ready
    fn on_ready(&mut self, _instance: &Instance) {}

    /// Some instances are still pending; the waiter sleeps `next_delay` next
    fn on_pending(&mut self, _pending: &[String], _next_delay: Duration) {}
}

impl WaitObserver for () {}

/// Deadline and initial poll interval
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaitPolicy {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(600),
            poll_interval: Duration::from_secs(5),
        }
    }
}

/// Successive sleep durations: `min(P * 1.5^(n-1), 15s)`
#[derive(Debug, Clone)]
pub struct Backoff {
    next: Duration,
}

impl Backoff {
    pub fn new(initial: Duration) -> Self {
        Self { next: initial }
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let current = self.next.min(MAX_BACKOFF);
        self.next = current.mul_f64(BACKOFF_FACTOR).min(MAX_BACKOFF);
        Some(current)
    }
}

/// Polls an [`InstanceSource`] until instances are ready
pub struct ReadinessWaiter<'a, S: InstanceSource + ?Sized> {
    source: &'a S,
    /// `None` when the timeout is too large to represent, i.e. never
    deadline: Option<Instant>,
    poll_interval: Duration,
}

impl<'a, S: InstanceSource + ?Sized> ReadinessWaiter<'a, S> {
    /// Deadline is `now + policy.timeout`; a timeout past the clock's range
    /// never expires
    pub fn new(source: &'a S, policy: &WaitPolicy) -> Self {
        Self {
            source,
            deadline: Instant::now().checked_add(policy.timeout),
            poll_interval: policy.poll_interval,
        }
    }

    pub fn with_deadline(source: &'a S, deadline: Instant, poll_interval: Duration) -> Self {
        Self {
            source,
            deadline: Some(deadline),
            poll_interval,
        }
    }

    /// Wait for a single instance
    pub async fn wait_for<O: WaitObserver + ?Sized>(
        &self,
        id: &str,
        observer: &mut O,
    ) -> Result<Instance, WaitError> {
        let mut ready = self.wait_for_all(&[id.to_string()], observer).await?;
        ready.pop().ok_or_else(|| WaitError::Timeout {
            pending: vec![id.to_string()],
        })
    }

    /// Wait for every id; results come back in the order requested
    ///
    /// The deadline is checked before every poll, including the first, so a
    /// deadline that has already passed fails without calling the provider.
    /// Errors from the list call abort the wait immediately.
    pub async fn wait_for_all<O: WaitObserver + ?Sized>(
        &self,
        ids: &[String],
        observer: &mut O,
    ) -> Result<Vec<Instance>, WaitError> {
        let mut ready: HashMap<String, Instance> = HashMap::new();
        let mut backoff = Backoff::new(self.poll_interval);

        loop {
            let pending = pending_ids(ids, &ready);
            if pending.is_empty() {
                break;
            }

            if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Err(WaitError::Timeout { pending });
            }

            let instances = self.source.list_instances().await?;
            for instance in instances {
                if pending.contains(&instance.id) && instance.is_ready() {
                    tracing::info!(
                        id = %instance.id,
                        ip = instance.public_ip().unwrap_or_default(),
                        status = %instance.status,
                        "Instance ready"
                    );
                    observer.on_ready(&instance);
                    ready.insert(instance.id.clone(), instance);
                }
            }

            let pending = pending_ids(ids, &ready);
            if pending.is_empty() {
                break;
            }

            let delay = backoff.next().unwrap_or(MAX_BACKOFF);
            tracing::debug!(
                pending = pending.len(),
                delay_ms = delay.as_millis() as u64,
                "Waiting for instances"
            );
            observer.on_pending(&pending, delay);
            sleep(delay).await;
        }

        let mut resolved = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(instance) = ready.get(id) {
                resolved.push(instance.clone());
            }
        }
        Ok(resolved)
    }
}

/// Wait for one instance under `policy`
pub async fn wait_for_instance<S, O>(
    source: &S,
    id: &str,
    policy: &WaitPolicy,
    observer: &mut O,
) -> Result<Instance, WaitError>
where
    S: InstanceSource + ?Sized,
    O: WaitObserver + ?Sized,
{
    ReadinessWaiter::new(source, policy)
        .wait_for(id, observer)
        .await
}

/// Wait for several instances under `policy`
pub async fn wait_for_instances<S, O>(
    source: &S,
    ids: &[String],
    policy: &WaitPolicy,
    observer: &mut O,
) -> Result<Vec<Instance>, WaitError>
where
    S: InstanceSource + ?Sized,
    O: WaitObserver + ?Sized,
{
    ReadinessWaiter::new(source, policy)
        .wait_for_all(ids, observer)
        .await
}

/// Ids not yet satisfied, in request order, without duplicates
fn pending_ids(ids: &[String], ready: &HashMap<String, Instance>) -> Vec<String> {
    let mut pending: Vec<String> = Vec::new();
    for id in ids {
        if !ready.contains_key(id) && !pending.contains(id) {
            pending.push(id.clone());
        }
    }
    pending
}
