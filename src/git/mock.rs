use crate::error::{BumpError, Result};
use crate::git::Repository;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MockState {
    tags: Vec<String>,
    created: Vec<String>,
    pushed: Vec<(String, String)>,
    commits: Vec<(PathBuf, String)>,
    push_preference: Option<String>,
    snapshots: usize,
    fail_create: bool,
    fail_push: bool,
}

/// Mock repository for testing without actual git operations
pub struct MockRepository {
    path: PathBuf,
    state: Mutex<MockState>,
}

impl MockRepository {
    /// Create a new empty mock repository rooted at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        MockRepository {
            path: path.into(),
            state: Mutex::new(MockState::default()),
        }
    }

    /// Create a mock repository that already has the given tags
    pub fn with_tags<I, S>(path: impl Into<PathBuf>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let repo = MockRepository::new(path);
        for tag in tags {
            repo.add_tag(tag);
        }
        repo
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        // a panicking test thread must not hide the recorded calls from others
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add a pre-existing tag
    pub fn add_tag(&self, name: impl Into<String>) {
        self.state().tags.push(name.into());
    }

    /// Store a raw `bump.defaultPush` value, valid or not
    pub fn set_raw_push_preference(&self, value: impl Into<String>) {
        self.state().push_preference = Some(value.into());
    }

    /// Make every `create_tag` call fail
    pub fn fail_create(&self) {
        self.state().fail_create = true;
    }

    /// Make every push call fail
    pub fn fail_push(&self) {
        self.state().fail_push = true;
    }

    /// Tags created through [Repository::create_tag], in call order
    pub fn created_tags(&self) -> Vec<String> {
        self.state().created.clone()
    }

    /// Number of [Repository::create_tag_from_snapshot] calls
    pub fn snapshot_count(&self) -> usize {
        self.state().snapshots
    }

    /// `(remote, tag)` pairs pushed, in call order
    pub fn pushed(&self) -> Vec<(String, String)> {
        self.state().pushed.clone()
    }

    /// `(path, message)` pairs committed, in call order
    pub fn commits(&self) -> Vec<(PathBuf, String)> {
        self.state().commits.clone()
    }
}

impl Repository for MockRepository {
    fn path(&self) -> &Path {
        &self.path
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        Ok(self.state().tags.clone())
    }

    fn create_tag(&self, name: &str) -> Result<()> {
        let mut state = self.state();
        if state.fail_create {
            return Err(BumpError::tag(format!("Cannot create tag '{}': mock failure", name)));
        }
        if state.tags.iter().any(|t| t == name) {
            return Err(BumpError::tag(format!("Tag '{}' already exists", name)));
        }
        state.tags.push(name.to_string());
        state.created.push(name.to_string());
        Ok(())
    }

    fn create_tag_from_snapshot(
        &self,
        choose: &mut dyn FnMut(&[String]) -> Result<String>,
    ) -> Result<String> {
        let snapshot = {
            let mut state = self.state();
            state.snapshots += 1;
            state.tags.clone()
        };
        let name = choose(&snapshot)?;
        self.create_tag(&name)?;
        Ok(name)
    }

    fn push_tag(&self, remote: &str, name: &str) -> Result<()> {
        let mut state = self.state();
        if state.fail_push {
            return Err(BumpError::remote("mock push failure"));
        }
        state.pushed.push((remote.to_string(), name.to_string()));
        Ok(())
    }

    fn push_tags(&self, remote: &str) -> Result<()> {
        let mut state = self.state();
        if state.fail_push {
            return Err(BumpError::remote("mock push failure"));
        }
        let tags = state.tags.clone();
        state
            .pushed
            .extend(tags.into_iter().map(|tag| (remote.to_string(), tag)));
        Ok(())
    }

    fn commit_file(&self, relative_path: &Path, message: &str) -> Result<()> {
        self.state()
            .commits
            .push((relative_path.to_path_buf(), message.to_string()));
        Ok(())
    }

    fn push_preference(&self) -> Result<Option<bool>> {
        match &self.state().push_preference {
            Some(value) => super::parse_push_preference(value).map(Some),
            None => Ok(None),
        }
    }

    fn set_push_preference(&self, value: bool) -> Result<()> {
        self.state().push_preference = Some(value.to_string());
        Ok(())
    }
}
