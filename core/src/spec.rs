//! Test suite assembly from author-declared generators.
//!
//! An author registers generators in the order they should run:
//!
//! ```
//! use tcgen_core::spec::{assemble_test_suite, Generators};
//! use tcgen_core::testcase::Closure;
//!
//! let generators = Generators::new()
//!     .sample(|b| {
//!         b.input(["1 2"])?;
//!         b.output(["3"])?;
//!         Ok(())
//!     })
//!     .group(|b| {
//!         b.subtasks([1])?;
//!         b.case(Closure::noop())?;
//!         Ok(())
//!     });
//!
//! let suite = assemble_test_suite("sum", generators, Closure::noop(), Closure::noop()).unwrap();
//! assert_eq!(suite.sample_test_cases()[0].id(), "sum_sample_1");
//! assert_eq!(suite.test_groups()[0].test_cases()[0].id(), "sum_1_1");
//! ```

use std::{fmt, rc::Rc};

use crate::{
    evaluator::EvaluatorConfig,
    suite::{TestSuite, TestSuiteBuilder},
    testcase::Closure,
};

pub type GeneratorFn<'a> = Box<dyn FnMut(&mut TestSuiteBuilder) -> anyhow::Result<()> + 'a>;

/// Ordered registry of sample, catch-all and group generators.
#[derive(Default)]
pub struct Generators<'a> {
    samples: Vec<GeneratorFn<'a>>,
    test_cases: Option<GeneratorFn<'a>>,
    groups: Vec<GeneratorFn<'a>>,
}

impl<'a> Generators<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Each sample generator yields exactly one sample test case.
    pub fn sample<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut TestSuiteBuilder) -> anyhow::Result<()> + 'a,
    {
        self.samples.push(Box::new(f));
        self
    }

    /// Catch-all generator. When set, group generators are never invoked.
    pub fn test_cases<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut TestSuiteBuilder) -> anyhow::Result<()> + 'a,
    {
        self.test_cases = Some(Box::new(f));
        self
    }

    pub fn group<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut TestSuiteBuilder) -> anyhow::Result<()> + 'a,
    {
        self.groups.push(Box::new(f));
        self
    }

    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    pub fn has_test_cases(&self) -> bool {
        self.test_cases.is_some()
    }
}

impl fmt::Debug for Generators<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Generators")
            .field("samples", &self.samples.len())
            .field("test_cases", &self.test_cases.is_some())
            .field("groups", &self.groups.len())
            .finish()
    }
}

/// Runs every generator in registration order and builds the suite.
///
/// A sample or group boundary is opened right before its generator runs.
/// Errors returned by a generator abort assembly unchanged.
pub fn assemble_test_suite(
    slug: &str,
    generators: Generators,
    before: Closure,
    after: Closure,
) -> anyhow::Result<TestSuite> {
    log::debug!(
        "Assembling test suite '{}': {} sample generator(s), {} group generator(s), catch-all: {}",
        slug,
        generators.num_samples(),
        generators.num_groups(),
        generators.has_test_cases()
    );
    let Generators {
        samples,
        test_cases,
        groups,
    } = generators;

    let mut builder = TestSuiteBuilder::new(slug);
    builder.set_before_closure(before).set_after_closure(after);

    for mut sample in samples {
        builder.new_sample_test_case()?;
        sample(&mut builder)?;
    }

    if let Some(mut test_cases) = test_cases {
        if !groups.is_empty() {
            log::debug!(
                "Catch-all generator is registered; ignoring {} test group(s)",
                groups.len()
            );
        }
        builder.new_main_group()?;
        test_cases(&mut builder)?;
    } else {
        for mut group in groups {
            builder.new_test_group()?;
            group(&mut builder)?;
        }
    }

    let suite = builder.build()?;
    log::debug!(
        "Assembled test suite '{}': {} sample(s), {} group(s)",
        slug,
        suite.sample_test_cases().len(),
        suite.test_groups().len()
    );
    Ok(suite)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradingConfig {
    /// Seconds.
    pub time_limit: u64,
    /// Megabytes.
    pub memory_limit: u64,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            time_limit: 2,
            memory_limit: 64,
        }
    }
}

impl GradingConfig {
    pub fn evaluator_config(&self, solution_command: impl Into<String>) -> EvaluatorConfig {
        EvaluatorConfig::new(solution_command)
            .time_limit(self.time_limit)
            .memory_limit(self.memory_limit)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipleTestCasesConfig {
    /// Name of the input variable holding the number of cases per file.
    pub counter: Option<String>,
    /// Printed before each case's output, e.g. `"Case #{}: "`.
    pub output_prefix: Option<String>,
}

impl MultipleTestCasesConfig {
    pub fn is_enabled(&self) -> bool {
        self.counter.is_some()
    }
}

#[derive(Clone)]
pub struct SeedSetter(Rc<dyn Fn(u64)>);

impl SeedSetter {
    pub fn new(f: impl Fn(u64) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn noop() -> Self {
        Self::new(|_| {})
    }

    pub fn set_seed(&self, seed: u64) {
        (self.0)(seed)
    }
}

impl fmt::Debug for SeedSetter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("SeedSetter(..)")
    }
}

/// Problem-level configuration an author supplies alongside test data.
pub trait ProblemSpec {
    type IoFormat;
    type Constraints;

    fn io_format(&self) -> Self::IoFormat;

    fn constraint_suite(&self) -> Self::Constraints;

    fn grading_config(&self) -> GradingConfig {
        GradingConfig::default()
    }

    fn multiple_test_cases_config(&self) -> MultipleTestCasesConfig {
        MultipleTestCasesConfig::default()
    }
}

pub trait TestSpec: ProblemSpec {
    fn generators(&self) -> Generators<'_>;

    fn before_test_case(&self) -> Closure {
        Closure::noop()
    }

    fn after_test_case(&self) -> Closure {
        Closure::noop()
    }

    fn seed_setter(&self) -> SeedSetter {
        SeedSetter::noop()
    }

    fn build_test_suite(&self, slug: &str) -> anyhow::Result<TestSuite> {
        assemble_test_suite(
            slug,
            self.generators(),
            self.before_test_case(),
            self.after_test_case(),
        )
    }

    fn build_spec(&self, slug: &str) -> anyhow::Result<Spec<Self>>
    where
        Self: Sized,
    {
        Ok(Spec {
            seed_setter: self.seed_setter(),
            multiple_test_cases_config: self.multiple_test_cases_config(),
            grading_config: self.grading_config(),
            io_format: self.io_format(),
            constraint_suite: self.constraint_suite(),
            test_suite: self.build_test_suite(slug)?,
        })
    }
}

/// Everything a generator or runner needs about one problem.
pub struct Spec<P: ProblemSpec> {
    pub seed_setter: SeedSetter,
    pub multiple_test_cases_config: MultipleTestCasesConfig,
    pub grading_config: GradingConfig,
    pub io_format: P::IoFormat,
    pub constraint_suite: P::Constraints,
    pub test_suite: TestSuite,
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;

    use anyhow::bail;

    use super::*;
    use crate::suite::GroupId;

    type Calls = Rc<RefCell<Vec<String>>>;

    fn recorder(calls: &Calls, name: &str) -> impl FnMut(&mut TestSuiteBuilder) -> anyhow::Result<()> {
        let calls = calls.clone();
        let name = name.to_owned();
        move |b: &mut TestSuiteBuilder| {
            calls.borrow_mut().push(name.clone());
            if name.starts_with("sample") {
                b.input([name.as_str()])?;
            } else {
                b.case(Closure::noop())?;
            }
            Ok(())
        }
    }

    fn assemble(generators: Generators) -> anyhow::Result<TestSuite> {
        assemble_test_suite("foo", generators, Closure::noop(), Closure::noop())
    }

    #[test]
    fn samples_are_discovered_in_order() {
        let calls = Calls::default();
        let generators = Generators::new()
            .sample(recorder(&calls, "sample1"))
            .sample(recorder(&calls, "sample2"))
            .sample(recorder(&calls, "sample3"));
        let suite = assemble(generators).unwrap();

        assert_eq!(*calls.borrow(), ["sample1", "sample2", "sample3"]);
        let ids: Vec<_> = suite.sample_test_cases().iter().map(|t| t.id()).collect();
        assert_eq!(ids, ["foo_sample_1", "foo_sample_2", "foo_sample_3"]);
        assert!(suite.test_groups().is_empty());
    }

    #[test]
    fn sample_generator_emitting_nothing_still_yields_a_case() {
        let suite = assemble(Generators::new().sample(|_| Ok(()))).unwrap();
        assert_eq!(suite.sample_test_cases().len(), 1);
    }

    #[test]
    fn groups_are_discovered_in_order() {
        let calls = Calls::default();
        let generators = Generators::new()
            .sample(recorder(&calls, "sample1"))
            .group(recorder(&calls, "group1"))
            .group(recorder(&calls, "group2"));
        let suite = assemble(generators).unwrap();

        assert_eq!(*calls.borrow(), ["sample1", "group1", "group2"]);
        let group_ids: Vec<_> = suite.test_groups().iter().map(|g| g.id()).collect();
        assert_eq!(group_ids, [GroupId::Numbered(1), GroupId::Numbered(2)]);
        assert_eq!(suite.test_groups()[1].test_cases()[0].id(), "foo_2_1");
    }

    #[test]
    fn catch_all_preempts_groups() {
        let calls = Calls::default();
        let generators = Generators::new()
            .group(recorder(&calls, "group1"))
            .test_cases(recorder(&calls, "test_cases"))
            .group(recorder(&calls, "group2"));
        let suite = assemble(generators).unwrap();

        assert_eq!(*calls.borrow(), ["test_cases"]);
        assert_eq!(suite.test_groups().len(), 1);
        assert_eq!(suite.test_groups()[0].id(), GroupId::Main);
        assert_eq!(suite.test_groups()[0].test_cases()[0].id(), "foo_1");
    }

    #[test]
    fn generator_error_aborts_assembly() {
        let calls = Calls::default();
        let generators = Generators::new()
            .sample(recorder(&calls, "sample1"))
            .sample(|_| bail!("bad sample"))
            .sample(recorder(&calls, "sample3"))
            .group(recorder(&calls, "group1"));
        let err = assemble(generators).unwrap_err();

        assert_eq!(err.to_string(), "bad sample");
        assert_eq!(*calls.borrow(), ["sample1"]);
    }

    #[test]
    fn builder_misuse_inside_generator_is_fatal() {
        let generators = Generators::new().group(|b| {
            b.output(["42"])?;
            Ok(())
        });
        let err = assemble(generators).unwrap_err();
        assert_eq!(
            err.downcast_ref::<crate::suite::SuiteError>(),
            Some(&crate::suite::SuiteError::NoSampleOpen)
        );
    }

    #[test]
    fn registry_counts_registered_generators() {
        let generators = Generators::new()
            .sample(|_| Ok(()))
            .group(|_| Ok(()))
            .group(|_| Ok(()));
        assert_eq!(generators.num_samples(), 1);
        assert_eq!(generators.num_groups(), 2);
        assert!(!generators.has_test_cases());
        assert!(generators.test_cases(|_| Ok(())).has_test_cases());
    }

    #[test]
    fn empty_registry_yields_empty_suite() {
        let suite = assemble(Generators::new()).unwrap();
        assert_eq!(suite.all_test_cases().count(), 0);
    }

    #[test]
    fn grading_config_feeds_evaluator_config() {
        let cfg = GradingConfig {
            time_limit: 3,
            memory_limit: 128,
        }
        .evaluator_config("python Sol.py");
        assert_eq!(cfg, EvaluatorConfig::new("python Sol.py").time_limit(3).memory_limit(128));
    }
}
