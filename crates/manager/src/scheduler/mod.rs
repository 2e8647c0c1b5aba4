//! The [`TaskScheduler`] runs every registered [`ScheduledTask`] on its own period, each in its
//! own tokio task, until the [`ShutdownSignal`] is triggered.

use crate::{ScheduledTask, ShutdownReason, ShutdownSignal, TaskConfig};

use std::{collections::HashMap, sync::Arc, time::Instant};

use rollup_node_watcher::FatalErrors;
use tokio::{
    sync::{mpsc, Notify},
    task::JoinHandle,
    time::MissedTickBehavior,
};

mod command;
pub use command::SchedulerCommand;

mod handle;
pub use handle::SchedulerHandle;

mod metrics;
use metrics::TaskMetrics;

/// The size of the command channel.
const COMMAND_CHANNEL_SIZE: usize = 100;

/// A registered task.
struct Registration {
    task: Arc<dyn ScheduledTask>,
    config: TaskConfig,
    wake: Arc<Notify>,
}

/// The task scheduler.
pub struct TaskScheduler {
    /// The handle receiver used to receive commands.
    handle_rx: mpsc::Receiver<SchedulerCommand>,
    /// The registered tasks, by name.
    tasks: HashMap<&'static str, Registration>,
    /// The fatal error channels of the chain event watchers.
    watchers: Vec<FatalErrors>,
    /// The shutdown signal.
    shutdown: ShutdownSignal,
}

impl std::fmt::Debug for TaskScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskScheduler")
            .field("tasks", &self.tasks.keys().collect::<Vec<_>>())
            .field("watchers", &self.watchers.len())
            .field("shutdown", &self.shutdown)
            .finish()
    }
}

impl TaskScheduler {
    /// Create a new [`TaskScheduler`] instance and its handle.
    pub fn new() -> (Self, SchedulerHandle) {
        let (handle_tx, handle_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let scheduler = Self {
            handle_rx,
            tasks: HashMap::new(),
            watchers: Vec::new(),
            shutdown: ShutdownSignal::new(),
        };
        (scheduler, SchedulerHandle::new(handle_tx))
    }

    /// Returns the shutdown signal of the scheduler.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Registers the task. A task registered under an existing name replaces it.
    pub fn add_task(&mut self, task: Arc<dyn ScheduledTask>, config: TaskConfig) {
        let name = task.name();
        tracing::debug!(target: "rollup::manager", task = name, period = ?config.period, "registering task");
        self.tasks.insert(name, Registration { task, config, wake: Arc::new(Notify::new()) });
    }

    /// Shuts the scheduler down on the first error received on the channel.
    pub fn watch_fatal_errors(&mut self, errors: FatalErrors) {
        self.watchers.push(errors);
    }

    /// Runs the tasks until the shutdown signal is triggered, then stops them and returns the
    /// reason.
    pub async fn run(mut self) -> ShutdownReason {
        let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(self.tasks.len());
        for registration in self.tasks.values() {
            handles.push(tokio::spawn(drive_task(
                registration.task.clone(),
                registration.config,
                registration.wake.clone(),
                self.shutdown.clone(),
            )));
        }
        for mut errors in std::mem::take(&mut self.watchers) {
            let shutdown = self.shutdown.clone();
            handles.push(tokio::spawn(async move {
                if let Some(err) = errors.recv().await {
                    tracing::error!(target: "rollup::manager", %err, "watcher failed");
                    shutdown.trigger(ShutdownReason::WatcherFailed(err.to_string()));
                }
            }));
        }

        let mut commands_open = true;
        let reason = loop {
            tokio::select! {
                command = self.handle_rx.recv(), if commands_open => match command {
                    Some(SchedulerCommand::RunNow(name)) => match self.tasks.get(name) {
                        Some(registration) => registration.wake.notify_one(),
                        None => tracing::warn!(target: "rollup::manager", task = name, "unknown task"),
                    },
                    Some(SchedulerCommand::Shutdown) => {
                        self.shutdown.trigger(ShutdownReason::Requested);
                    }
                    None => commands_open = false,
                },
                reason = self.shutdown.wait() => break reason,
            }
        };

        for handle in handles {
            handle.abort();
        }
        tracing::info!(target: "rollup::manager", %reason, "scheduler stopped");
        reason
    }
}

/// Runs the task on every period tick or wake-up, until shutdown.
async fn drive_task(
    task: Arc<dyn ScheduledTask>,
    config: TaskConfig,
    wake: Arc<Notify>,
    shutdown: ShutdownSignal,
) {
    let name = task.name();
    let metrics = TaskMetrics::new_with_labels(&[("task", name)]);
    let mut interval = tokio::time::interval(config.period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = wake.notified() => {}
            _ = shutdown.wait() => return,
        }

        // Keep running while the task reports more work.
        loop {
            let start = Instant::now();
            let result = task.run_task().await;
            metrics.runs.increment(1);
            metrics.run_duration.record(start.elapsed().as_secs_f64());

            match result {
                Ok(true) => {}
                Ok(false) => break,
                Err(err) if err.is_fatal() => {
                    tracing::error!(target: "rollup::manager", task = name, %err, "task failed");
                    shutdown.trigger(ShutdownReason::TaskFailed { task: name, error: err.to_string() });
                    return
                }
                Err(err) => {
                    metrics.failures.increment(1);
                    tracing::warn!(target: "rollup::manager", task = name, %err, "task run failed");
                    break
                }
            }
        }
    }
}
