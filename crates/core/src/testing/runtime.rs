use super::FakeTask;
use crate::task::TaskingRuntime;
use std::future::Future;
use std::time::Duration;

/// A single-threaded [`TaskingRuntime`] fake with a fixed current task and CPU.
pub struct FakeRuntime {
    current: FakeTask,
    cpu: usize,
    num_cpus: usize,
}

impl FakeRuntime {
    /// Creates a runtime with `num_cpus` logical CPUs, a fresh current task pinned to CPU 0.
    #[must_use]
    pub fn new(num_cpus: usize) -> Self {
        Self {
            current: FakeTask::new(),
            cpu: 0,
            num_cpus,
        }
    }

    /// Creates a runtime with an explicit current task and CPU.
    #[must_use]
    pub fn with_current(current: FakeTask, cpu: usize, num_cpus: usize) -> Self {
        Self {
            current,
            cpu,
            num_cpus,
        }
    }
}

impl TaskingRuntime for FakeRuntime {
    type Task = FakeTask;

    fn current_task(&self) -> Self::Task {
        self.current.clone()
    }

    fn current_cpu(&self) -> usize {
        self.cpu
    }

    fn num_cpus(&self) -> usize {
        self.num_cpus
    }

    fn register_polling<F>(&self, name: &'static str, body: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::debug!(task = name, "fake runtime registering polling task");
        let _ = tokio::spawn(body);
    }

    fn suspend(&self, micros: u64) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(Duration::from_micros(micros))
    }
}
