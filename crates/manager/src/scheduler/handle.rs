use super::{metrics::HandleMetrics, SchedulerCommand};

use tokio::sync::mpsc;

/// The handle used to send commands to the task scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    /// The channel used to send commands to the scheduler.
    to_scheduler_tx: mpsc::Sender<SchedulerCommand>,
    handle_metrics: HandleMetrics,
}

impl SchedulerHandle {
    /// Create a new scheduler handle.
    pub(crate) fn new(to_scheduler_tx: mpsc::Sender<SchedulerCommand>) -> Self {
        Self { to_scheduler_tx, handle_metrics: HandleMetrics::default() }
    }

    /// Sends a command to the scheduler.
    pub async fn send_command(&self, command: SchedulerCommand) {
        if let Err(err) = self.to_scheduler_tx.send(command).await {
            self.handle_metrics.handle_send_command_failed.increment(1);
            tracing::error!(target: "rollup::manager", %err, "failed to send command to scheduler");
        }
    }

    /// Sends a command to the scheduler to run the named task now.
    pub async fn run_now(&self, task: &'static str) {
        self.send_command(SchedulerCommand::RunNow(task)).await;
    }

    /// Sends a command to the scheduler to shut down.
    pub async fn shutdown(&self) {
        self.send_command(SchedulerCommand::Shutdown).await;
    }
}
