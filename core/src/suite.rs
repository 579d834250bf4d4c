use std::{collections::BTreeSet, fmt};

use crate::testcase::{
    Closure, SampleData, SubtaskId, TestCase, TestCaseBuildError, TestCaseData,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupId {
    Sample,
    /// The single group produced by a catch-all generator.
    Main,
    /// 1-based.
    Numbered(u32),
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use GroupId::*;
        match self {
            Sample => write!(f, "sample"),
            Main => write!(f, "main"),
            Numbered(n) => write!(f, "group {}", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestGroup {
    id: GroupId,
    subtask_ids: BTreeSet<SubtaskId>,
    test_cases: Vec<TestCase>,
}

impl TestGroup {
    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn subtask_ids(&self) -> &BTreeSet<SubtaskId> {
        &self.subtask_ids
    }

    pub fn test_cases(&self) -> &[TestCase] {
        &self.test_cases
    }
}

#[derive(Debug, Clone)]
pub struct TestSuite {
    sample_test_cases: Vec<TestCase>,
    test_groups: Vec<TestGroup>,
    before_closure: Closure,
    after_closure: Closure,
}

impl TestSuite {
    pub fn sample_test_cases(&self) -> &[TestCase] {
        &self.sample_test_cases
    }

    /// Either a single [`GroupId::Main`] group or numbered groups in order.
    pub fn test_groups(&self) -> &[TestGroup] {
        &self.test_groups
    }

    pub fn has_numbered_groups(&self) -> bool {
        self.test_groups
            .iter()
            .any(|g| matches!(g.id, GroupId::Numbered(_)))
    }

    /// Samples first, then every group's cases in order.
    pub fn all_test_cases(&self) -> impl Iterator<Item = &TestCase> {
        self.sample_test_cases
            .iter()
            .chain(self.test_groups.iter().flat_map(|g| g.test_cases.iter()))
    }

    pub fn find_test_case(&self, id: &str) -> Option<&TestCase> {
        self.all_test_cases().find(|t| t.id() == id)
    }

    /// Runs the before closure, the case's own closure (official cases only),
    /// then the after closure.
    ///
    /// The first failure is returned as is; later closures are not run.
    pub fn apply(&self, test_case: &TestCase) -> anyhow::Result<()> {
        self.before_closure.call()?;
        if let Some(TestCaseData::Official(closure)) = test_case.data() {
            closure.call()?;
        }
        self.after_closure.call()
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SuiteError {
    #[error("No sample test case is open")]
    NoSampleOpen,

    #[error("Cannot add an official test case while a sample test case is open")]
    CaseInsideSample,

    #[error("Sample test cases must come before official test cases")]
    SampleAfterOfficial,

    #[error("Cannot mix the catch-all group with numbered test groups")]
    MixedGroupKinds,

    #[error(transparent)]
    Build(#[from] TestCaseBuildError),
}

#[derive(Debug)]
struct PendingSample {
    input: Vec<String>,
    output: Option<Vec<String>>,
    subtask_ids: BTreeSet<SubtaskId>,
}

#[derive(Debug)]
struct PendingGroup {
    id: GroupId,
    subtask_ids: BTreeSet<SubtaskId>,
    cases: Vec<(Option<String>, Closure)>,
}

impl PendingGroup {
    fn new(id: GroupId) -> Self {
        Self {
            id,
            subtask_ids: BTreeSet::new(),
            cases: Vec::new(),
        }
    }
}

/// Accumulates sample cases and test groups.
///
/// Opening a new sample or group commits whatever was open before, so data
/// emitted between two boundaries lands in the right place.
#[derive(Debug)]
pub struct TestSuiteBuilder {
    slug: String,
    before_closure: Closure,
    after_closure: Closure,
    sample_test_cases: Vec<TestCase>,
    test_groups: Vec<TestGroup>,
    pending_sample: Option<PendingSample>,
    pending_group: Option<PendingGroup>,
}

impl TestSuiteBuilder {
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            before_closure: Closure::noop(),
            after_closure: Closure::noop(),
            sample_test_cases: Vec::new(),
            test_groups: Vec::new(),
            pending_sample: None,
            pending_group: None,
        }
    }

    pub fn set_slug(&mut self, slug: impl Into<String>) -> &mut Self {
        self.slug = slug.into();
        self
    }

    pub fn set_before_closure(&mut self, closure: Closure) -> &mut Self {
        self.before_closure = closure;
        self
    }

    pub fn set_after_closure(&mut self, closure: Closure) -> &mut Self {
        self.after_closure = closure;
        self
    }

    pub fn new_sample_test_case(&mut self) -> Result<(), SuiteError> {
        if self.pending_group.is_some() || !self.test_groups.is_empty() {
            return Err(SuiteError::SampleAfterOfficial);
        }
        self.commit_sample()?;
        self.pending_sample = Some(PendingSample {
            input: Vec::new(),
            output: None,
            subtask_ids: BTreeSet::new(),
        });
        Ok(())
    }

    pub fn new_test_group(&mut self) -> Result<(), SuiteError> {
        self.commit_sample()?;
        self.commit_group()?;
        if self.test_groups.iter().any(|g| g.id == GroupId::Main) {
            return Err(SuiteError::MixedGroupKinds);
        }
        let n = self.test_groups.len() as u32 + 1;
        self.open_group(GroupId::Numbered(n));
        Ok(())
    }

    /// Opens the single group used by a catch-all generator.
    pub fn new_main_group(&mut self) -> Result<(), SuiteError> {
        self.commit_sample()?;
        self.commit_group()?;
        if !self.test_groups.is_empty() {
            return Err(SuiteError::MixedGroupKinds);
        }
        self.open_group(GroupId::Main);
        Ok(())
    }

    pub fn input<I, S>(&mut self, lines: I) -> Result<(), SuiteError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sample = self.pending_sample.as_mut().ok_or(SuiteError::NoSampleOpen)?;
        sample.input.extend(lines.into_iter().map(Into::into));
        Ok(())
    }

    pub fn output<I, S>(&mut self, lines: I) -> Result<(), SuiteError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sample = self.pending_sample.as_mut().ok_or(SuiteError::NoSampleOpen)?;
        sample
            .output
            .get_or_insert_with(Vec::new)
            .extend(lines.into_iter().map(Into::into));
        Ok(())
    }

    /// Sets the subtasks of the open sample, or of every case in the open group.
    /// Outside any boundary this opens the catch-all group.
    pub fn subtasks(&mut self, ids: impl IntoIterator<Item = SubtaskId>) -> Result<(), SuiteError> {
        let ids = ids.into_iter().collect();
        if let Some(sample) = self.pending_sample.as_mut() {
            sample.subtask_ids = ids;
            return Ok(());
        }
        self.current_group()?.subtask_ids = ids;
        Ok(())
    }

    pub fn case(&mut self, closure: Closure) -> Result<(), SuiteError> {
        self.push_case(None, closure)
    }

    pub fn case_with_description(
        &mut self,
        description: impl Into<String>,
        closure: Closure,
    ) -> Result<(), SuiteError> {
        self.push_case(Some(description.into()), closure)
    }

    pub fn build(mut self) -> Result<TestSuite, SuiteError> {
        self.commit_sample()?;
        self.commit_group()?;
        Ok(TestSuite {
            sample_test_cases: self.sample_test_cases,
            test_groups: self.test_groups,
            before_closure: self.before_closure,
            after_closure: self.after_closure,
        })
    }

    fn push_case(&mut self, description: Option<String>, closure: Closure) -> Result<(), SuiteError> {
        if self.pending_sample.is_some() {
            return Err(SuiteError::CaseInsideSample);
        }
        self.current_group()?.cases.push((description, closure));
        Ok(())
    }

    fn current_group(&mut self) -> Result<&mut PendingGroup, SuiteError> {
        if self.pending_group.is_none() {
            self.new_main_group()?;
        }
        Ok(self
            .pending_group
            .get_or_insert_with(|| PendingGroup::new(GroupId::Main)))
    }

    fn open_group(&mut self, id: GroupId) {
        self.pending_group = Some(PendingGroup::new(id));
    }

    fn test_case_id(&self, group: GroupId, n: usize) -> String {
        use GroupId::*;
        match group {
            Sample => format!("{}_sample_{}", self.slug, n),
            Main => format!("{}_{}", self.slug, n),
            Numbered(g) => format!("{}_{}_{}", self.slug, g, n),
        }
    }

    fn commit_sample(&mut self) -> Result<(), SuiteError> {
        let Some(sample) = self.pending_sample.take() else {
            return Ok(());
        };
        let id = self.test_case_id(GroupId::Sample, self.sample_test_cases.len() + 1);
        let test_case = TestCase::builder()
            .id(id)
            .subtask_ids(sample.subtask_ids)
            .data(TestCaseData::Sample(SampleData {
                input: sample.input,
                output: sample.output,
            }))
            .build()?;
        self.sample_test_cases.push(test_case);
        Ok(())
    }

    fn commit_group(&mut self) -> Result<(), SuiteError> {
        let Some(group) = self.pending_group.take() else {
            return Ok(());
        };
        let mut test_cases = Vec::with_capacity(group.cases.len());
        for (i, (description, closure)) in group.cases.into_iter().enumerate() {
            let mut builder = TestCase::builder()
                .id(self.test_case_id(group.id, i + 1))
                .subtask_ids(group.subtask_ids.iter().copied())
                .data(TestCaseData::Official(closure));
            if let Some(description) = description {
                builder = builder.description(description);
            }
            test_cases.push(builder.build()?);
        }
        self.test_groups.push(TestGroup {
            id: group.id,
            subtask_ids: group.subtask_ids,
            test_cases,
        });
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::{cell::RefCell, rc::Rc};

    use maplit::btreeset;

    use super::*;

    fn lines(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn samples_get_sequential_ids_and_data() {
        let mut b = TestSuiteBuilder::new("foo");
        b.new_sample_test_case().unwrap();
        b.input(["1 2"]).unwrap();
        b.output(["3"]).unwrap();
        b.new_sample_test_case().unwrap();
        b.subtasks([2]).unwrap();
        b.input(["5", "6"]).unwrap();
        let suite = b.build().unwrap();

        let samples = suite.sample_test_cases();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].id(), "foo_sample_1");
        assert_eq!(
            samples[0].data(),
            Some(&TestCaseData::Sample(SampleData {
                input: lines(&["1 2"]),
                output: Some(lines(&["3"])),
            }))
        );
        assert_eq!(samples[1].id(), "foo_sample_2");
        assert_eq!(samples[1].subtask_ids(), &btreeset! {2});
        assert_eq!(
            samples[1].data(),
            Some(&TestCaseData::Sample(SampleData {
                input: lines(&["5", "6"]),
                output: None,
            }))
        );
        assert!(suite.test_groups().is_empty());
    }

    #[test]
    fn group_subtasks_apply_to_every_case() {
        let mut b = TestSuiteBuilder::new("foo");
        b.new_test_group().unwrap();
        b.case(Closure::noop()).unwrap();
        b.subtasks([1, 2]).unwrap();
        b.case_with_description("N = 1", Closure::noop()).unwrap();
        b.new_test_group().unwrap();
        b.subtasks([2]).unwrap();
        b.case(Closure::noop()).unwrap();
        let suite = b.build().unwrap();

        let groups = suite.test_groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].id(), GroupId::Numbered(1));
        assert_eq!(groups[0].subtask_ids(), &btreeset! {1, 2});
        let ids: Vec<_> = groups[0].test_cases().iter().map(|t| t.id()).collect();
        assert_eq!(ids, ["foo_1_1", "foo_1_2"]);
        assert!(groups[0]
            .test_cases()
            .iter()
            .all(|t| t.subtask_ids() == &btreeset! {1, 2}));
        assert_eq!(groups[0].test_cases()[1].description(), Some("N = 1"));
        assert_eq!(groups[1].test_cases()[0].id(), "foo_2_1");
        assert!(suite.has_numbered_groups());
    }

    #[test]
    fn cases_without_group_go_to_main_group() {
        let mut b = TestSuiteBuilder::new("foo");
        b.case(Closure::noop()).unwrap();
        b.case(Closure::noop()).unwrap();
        let suite = b.build().unwrap();

        assert_eq!(suite.test_groups().len(), 1);
        assert_eq!(suite.test_groups()[0].id(), GroupId::Main);
        let ids: Vec<_> = suite.all_test_cases().map(|t| t.id()).collect();
        assert_eq!(ids, ["foo_1", "foo_2"]);
        assert!(!suite.has_numbered_groups());
    }

    #[test]
    fn misuse_is_rejected() {
        let mut b = TestSuiteBuilder::new("foo");
        assert_eq!(b.input(["1"]).unwrap_err(), SuiteError::NoSampleOpen);

        b.new_sample_test_case().unwrap();
        assert_eq!(
            b.case(Closure::noop()).unwrap_err(),
            SuiteError::CaseInsideSample
        );

        b.new_main_group().unwrap();
        assert_eq!(b.output(["1"]).unwrap_err(), SuiteError::NoSampleOpen);
        assert_eq!(
            b.new_sample_test_case().unwrap_err(),
            SuiteError::SampleAfterOfficial
        );
        assert_eq!(b.new_test_group().unwrap_err(), SuiteError::MixedGroupKinds);
    }

    #[test]
    fn apply_runs_closures_around_official_case() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let push = |s: &'static str| {
            let log = log.clone();
            Closure::new(move || {
                log.borrow_mut().push(s);
                Ok(())
            })
        };

        let mut b = TestSuiteBuilder::new("foo");
        b.set_before_closure(push("before"))
            .set_after_closure(push("after"));
        b.new_sample_test_case().unwrap();
        b.input(["1"]).unwrap();
        b.new_main_group().unwrap();
        b.case(push("case")).unwrap();
        let suite = b.build().unwrap();

        suite.apply(&suite.sample_test_cases()[0]).unwrap();
        suite.apply(suite.find_test_case("foo_1").unwrap()).unwrap();
        assert_eq!(
            *log.borrow(),
            ["before", "after", "before", "case", "after"]
        );
    }

    #[test]
    fn apply_skips_after_closure_when_case_fails() {
        let after_called = Rc::new(RefCell::new(false));
        let flag = after_called.clone();

        let mut b = TestSuiteBuilder::new("foo");
        b.set_after_closure(Closure::new(move || {
            *flag.borrow_mut() = true;
            Ok(())
        }));
        b.case(Closure::new(|| anyhow::bail!("N out of range")))
            .unwrap();
        let suite = b.build().unwrap();

        let err = suite.apply(suite.find_test_case("foo_1").unwrap()).unwrap_err();
        assert_eq!(err.to_string(), "N out of range");
        assert!(!*after_called.borrow());
    }
}
