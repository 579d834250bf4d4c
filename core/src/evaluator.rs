use std::path::Path;

use serde::Deserialize;

use crate::execution::{ExecutionInfo, ExecutionRequest, ExecutionResult, Executor};

/// Classification of a solution run.
///
/// Evaluators in this crate only produce `Ok`, `Rte` and `Tle`.
/// The other variants belong to collaborators that compare outputs or report
/// internal failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Verdict {
    Ac,
    Ok,
    Wa,
    Rte,
    Tle,
    Err,
}

impl Verdict {
    pub fn code(&self) -> String {
        self.to_string()
    }

    pub fn name(&self) -> &'static str {
        use Verdict::*;
        match self {
            Ac => "Accepted",
            Ok => "OK",
            Wa => "Wrong Answer",
            Rte => "Runtime Error",
            Tle => "Time Limit Exceeded",
            Err => "Internal Error",
        }
    }

    /// Derives the verdict from exit telemetry.
    ///
    /// Exceeding the CPU limits wins over any exit code or signal.
    pub fn classify(info: &ExecutionInfo) -> Self {
        if info.exceeded_cpu_limits {
            Verdict::Tle
        } else if info.exit_signal.is_some() {
            Verdict::Rte
        } else if info.exit_code.map_or(false, |code| code != 0) {
            Verdict::Rte
        } else {
            Verdict::Ok
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationResult {
    pub execution_result: ExecutionResult,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EvaluatorConfig {
    pub solution_command: String,
    /// Seconds.
    #[serde(default)]
    pub time_limit: Option<u64>,
    /// Megabytes.
    #[serde(default)]
    pub memory_limit: Option<u64>,
}

impl EvaluatorConfig {
    pub fn new(solution_command: impl Into<String>) -> Self {
        Self {
            solution_command: solution_command.into(),
            time_limit: None,
            memory_limit: None,
        }
    }

    pub fn time_limit(mut self, secs: u64) -> Self {
        self.time_limit = Some(secs);
        self
    }

    pub fn memory_limit(mut self, mb: u64) -> Self {
        self.memory_limit = Some(mb);
        self
    }
}

pub trait Evaluator {
    fn evaluate(
        &self,
        input_path: &Path,
        output_path: &Path,
        config: &EvaluatorConfig,
    ) -> anyhow::Result<EvaluationResult>;
}

/// Runs the solution once per input file (batch-style problems).
#[derive(Debug, Clone)]
pub struct BatchEvaluator<E> {
    executor: E,
}

impl<E: Executor> BatchEvaluator<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }
}

impl<E: Executor> Evaluator for BatchEvaluator<E> {
    fn evaluate(
        &self,
        input_path: &Path,
        output_path: &Path,
        config: &EvaluatorConfig,
    ) -> anyhow::Result<EvaluationResult> {
        let request = ExecutionRequest::new(&config.solution_command)
            .input_filename(input_path)
            .output_filename(output_path)
            .time_limit(config.time_limit)
            .memory_limit(config.memory_limit);

        let execution_result = self.executor.execute(&request)?;
        let verdict = Verdict::classify(&execution_result.info);
        log::debug!(
            "{} => {} ({:?})",
            input_path.to_string_lossy(),
            verdict,
            execution_result.info
        );

        Ok(EvaluationResult {
            execution_result,
            verdict,
        })
    }
}
