pub mod config;
pub mod evaluator;
pub mod execution;
pub mod spec;
pub mod style;
pub mod suite;
pub mod testcase;

pub use crate::config::Config;

pub use evaluator::{BatchEvaluator, EvaluationResult, Evaluator, EvaluatorConfig, Verdict};
pub use execution::{ExecutionInfo, ExecutionRequest, ExecutionResult, Executor, ShellExecutor};
pub use spec::{assemble_test_suite, Generators, ProblemSpec, Spec, TestSpec};
pub use suite::{GroupId, TestGroup, TestSuite, TestSuiteBuilder};
pub use testcase::{Closure, TestCase, TestCaseBuilder, TestCaseData};
