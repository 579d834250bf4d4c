pub mod model;
pub mod shell;

pub use model::*;
pub use shell::*;

/// Capability that runs one command to completion.
///
/// Implementations own I/O redirection, limit enforcement and exit telemetry.
/// A failure to run the command at all (spawn error, unreadable input file)
/// is reported as `Err`, never as an [`ExecutionResult`].
pub trait Executor {
    fn execute(&self, request: &ExecutionRequest) -> anyhow::Result<ExecutionResult>;
}

impl<E: Executor + ?Sized> Executor for &E {
    fn execute(&self, request: &ExecutionRequest) -> anyhow::Result<ExecutionResult> {
        (**self).execute(request)
    }
}

impl<E: Executor + ?Sized> Executor for Box<E> {
    fn execute(&self, request: &ExecutionRequest) -> anyhow::Result<ExecutionResult> {
        (**self).execute(request)
    }
}
