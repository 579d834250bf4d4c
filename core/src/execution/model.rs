use std::{path::PathBuf, time::Duration};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub command: String,
    pub input_filename: Option<PathBuf>,
    pub output_filename: Option<PathBuf>,
    /// Seconds. `None` means unenforced.
    pub time_limit: Option<u64>,
    /// Megabytes. `None` means unenforced.
    pub memory_limit: Option<u64>,
}

impl ExecutionRequest {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            input_filename: None,
            output_filename: None,
            time_limit: None,
            memory_limit: None,
        }
    }

    pub fn input_filename(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_filename = Some(path.into());
        self
    }

    pub fn output_filename(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_filename = Some(path.into());
        self
    }

    pub fn time_limit(mut self, limit: Option<u64>) -> Self {
        self.time_limit = limit;
        self
    }

    pub fn memory_limit(mut self, limit: Option<u64>) -> Self {
        self.memory_limit = limit;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionInfo {
    pub exit_code: Option<i32>,
    pub exit_signal: Option<String>,
    pub exceeded_cpu_limits: bool,
}

impl ExecutionInfo {
    pub fn exited(code: i32) -> Self {
        Self {
            exit_code: Some(code),
            ..Default::default()
        }
    }

    pub fn signaled(signal: impl Into<String>) -> Self {
        Self {
            exit_signal: Some(signal.into()),
            ..Default::default()
        }
    }

    pub fn exceeded_cpu_limits(mut self, exceeded: bool) -> Self {
        self.exceeded_cpu_limits = exceeded;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    pub info: ExecutionInfo,
    /// Captured standard error of the process. Empty when the executor does not capture it.
    pub stderr: String,
    pub elapsed: Duration,
}

impl From<ExecutionInfo> for ExecutionResult {
    fn from(info: ExecutionInfo) -> Self {
        Self {
            info,
            ..Default::default()
        }
    }
}
