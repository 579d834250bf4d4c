use std::{collections::BTreeSet, fmt, rc::Rc};

pub type SubtaskId = u32;

/// Deferred test data emission.
///
/// Equality is identity: two closures are equal only when they are clones of
/// the same allocation.
#[derive(Clone)]
pub struct Closure(Rc<dyn Fn() -> anyhow::Result<()>>);

impl Closure {
    pub fn new(f: impl Fn() -> anyhow::Result<()> + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn noop() -> Self {
        Self::new(|| Ok(()))
    }

    pub fn call(&self) -> anyhow::Result<()> {
        (self.0)()
    }
}

impl PartialEq for Closure {
    fn eq(&self, other: &Self) -> bool {
        Rc::as_ptr(&self.0) as *const () == Rc::as_ptr(&other.0) as *const ()
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Closure({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleData {
    pub input: Vec<String>,
    pub output: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TestCaseData {
    /// Literal input (and optionally output) lines written by the author.
    Sample(SampleData),
    /// Input produced later by running the closure.
    Official(Closure),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    id: String,
    description: Option<String>,
    subtask_ids: BTreeSet<SubtaskId>,
    data: Option<TestCaseData>,
}

impl TestCase {
    pub fn builder() -> TestCaseBuilder {
        TestCaseBuilder::default()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// An empty set means the case is not tied to any particular subtask.
    pub fn subtask_ids(&self) -> &BTreeSet<SubtaskId> {
        &self.subtask_ids
    }

    pub fn data(&self) -> Option<&TestCaseData> {
        self.data.as_ref()
    }

    pub fn is_sample(&self) -> bool {
        matches!(self.data, Some(TestCaseData::Sample(_)))
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TestCaseBuildError {
    #[error("Test case id is not set")]
    MissingId,
}

#[derive(Debug, Clone, Default)]
pub struct TestCaseBuilder {
    id: Option<String>,
    description: Option<String>,
    subtask_ids: BTreeSet<SubtaskId>,
    data: Option<TestCaseData>,
}

impl TestCaseBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn subtask_ids(mut self, ids: impl IntoIterator<Item = SubtaskId>) -> Self {
        self.subtask_ids = ids.into_iter().collect();
        self
    }

    pub fn data(mut self, data: TestCaseData) -> Self {
        self.data = Some(data);
        self
    }

    pub fn build(self) -> Result<TestCase, TestCaseBuildError> {
        let id = self.id.ok_or(TestCaseBuildError::MissingId)?;
        Ok(TestCase {
            id,
            description: self.description,
            subtask_ids: self.subtask_ids,
            data: self.data,
        })
    }
}
