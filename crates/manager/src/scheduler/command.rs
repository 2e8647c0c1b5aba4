/// The commands that can be sent to the task scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerCommand {
    /// Runs the named task now instead of waiting for its next period.
    RunNow(&'static str),
    /// Shuts the scheduler down.
    Shutdown,
}
