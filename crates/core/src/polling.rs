//! Cooperative polling tasks that drive a [`TicketManager`] and, optionally, its
//! [`CompletionManager`](crate::completion::CompletionManager).
//!
//! The polling loop itself is expressed the idiomatic-Rust way, as a long-running async task,
//! but it is registered and suspended entirely through the
//! [`TaskingRuntime`](crate::task::TaskingRuntime) seam (mirroring
//! `nanos6_register_polling_service`/the host runtime's suspend primitive), never through a
//! hardcoded `tokio::spawn`/`tokio::time::sleep`, so the polling subsystem stays host-runtime
//! agnostic.

use crate::issuer::Issuer;
use crate::polling_period::PollingPeriodController;
use crate::task::{Task, TaskingRuntime};
use crate::ticket_manager::TicketManager;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// A handle to a spawned polling task, used to request and await its shutdown.
pub struct PollingHandle {
    name: &'static str,
    must_finish: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
}

impl PollingHandle {
    /// Requests the polling task to stop and cooperatively waits until it has.
    ///
    /// Mirrors the original unregistration sequence: set `mustFinish`, then yield in 1 ms steps
    /// until the task observes it and flips `finished`.
    pub async fn stop(&self) {
        self.must_finish.store(true, Ordering::Release);
        while !self.finished.load(Ordering::Acquire) {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        tracing::debug!(task = self.name, "polling task unregistered");
    }
}

/// Spawns the request polling task ("TAMPI" in the original naming): each tick calls
/// [`TicketManager::check_requests`] and folds the completion count into `period_ctrl` to get
/// the next wait period.
pub fn spawn_request_polling<I, T, R>(
    manager: Arc<TicketManager<I, T>>,
    mut period_ctrl: PollingPeriodController,
    runtime: Arc<R>,
) -> PollingHandle
where
    I: Issuer + Send + Sync + 'static,
    I::Request: Send,
    I::Status: Send,
    I::Descriptor: Send,
    T: Task + Send + Sync + 'static,
    R: TaskingRuntime + Send + Sync + 'static,
{
    let must_finish = Arc::new(AtomicBool::new(false));
    let finished = Arc::new(AtomicBool::new(false));
    let task_must_finish = must_finish.clone();
    let task_finished = finished.clone();
    let suspend_on = runtime.clone();

    runtime.register_polling("TAMPI", async move {
        tracing::debug!(task = "TAMPI", "request polling task started");
        loop {
            if task_must_finish.load(Ordering::Acquire) {
                break;
            }
            let completed = manager.check_requests();
            let wait_us = period_ctrl.step(completed);
            suspend_on.suspend(wait_us).await;
        }
        task_finished.store(true, Ordering::Release);
        tracing::debug!(task = "TAMPI", "request polling task stopped");
    });

    PollingHandle {
        name: "TAMPI",
        must_finish,
        finished,
    }
}

/// Spawns the completion polling task ("TAMPI Comp" in the original naming), if enabled: each
/// tick drains the completion queue via [`TicketManager::process_completions`].
pub fn spawn_completion_polling<I, T, R>(
    manager: Arc<TicketManager<I, T>>,
    mut period_ctrl: PollingPeriodController,
    runtime: Arc<R>,
) -> PollingHandle
where
    I: Issuer + Send + Sync + 'static,
    I::Request: Send,
    I::Status: Send,
    I::Descriptor: Send,
    T: Task + Send + Sync + 'static,
    R: TaskingRuntime + Send + Sync + 'static,
{
    let must_finish = Arc::new(AtomicBool::new(false));
    let finished = Arc::new(AtomicBool::new(false));
    let task_must_finish = must_finish.clone();
    let task_finished = finished.clone();
    let suspend_on = runtime.clone();

    runtime.register_polling("TAMPI Comp", async move {
        tracing::debug!(task = "TAMPI Comp", "completion polling task started");
        loop {
            if task_must_finish.load(Ordering::Acquire) {
                break;
            }
            let completed = manager.process_completions();
            let wait_us = period_ctrl.step(completed);
            suspend_on.suspend(wait_us).await;
        }
        task_finished.store(true, Ordering::Release);
        tracing::debug!(task = "TAMPI Comp", "completion polling task stopped");
    });

    PollingHandle {
        name: "TAMPI Comp",
        must_finish,
        finished,
    }
}
