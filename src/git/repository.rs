use crate::config::LockConfig;
use crate::error::{BumpError, Result};
use crate::git::lock::RepoLock;
use git2::{
    ConfigLevel, Cred, CredentialType, ErrorCode, PushOptions, RemoteCallbacks,
    Repository as Git2Repo, Signature,
};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

/// Git config key holding the per-repository push preference
pub const PUSH_PREFERENCE_KEY: &str = "bump.defaultPush";

/// Wrapper around git2::Repository with our trait interface
///
/// The handle owns the mutex half of its [RepoLock]; every mutating call holds
/// the lock for its whole duration.
pub struct Git2Repository {
    repo: Mutex<Git2Repo>,
    workdir: PathBuf,
    git_dir: PathBuf,
    lock_config: LockConfig,
}

impl Git2Repository {
    /// Open or discover a git repository from `path` upwards
    pub fn discover<P: AsRef<Path>>(path: P, lock_config: LockConfig) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;
        Self::from_git2(repo, lock_config)
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo, lock_config: LockConfig) -> Result<Self> {
        let workdir = repo
            .workdir()
            .ok_or_else(|| BumpError::tag("bare repositories have no working tree to tag from"))?
            .to_path_buf();
        let git_dir = repo.path().to_path_buf();
        debug!(workdir = %workdir.display(), "opened repository");

        Ok(Git2Repository {
            repo: Mutex::new(repo),
            workdir,
            git_dir,
            lock_config,
        })
    }

    /// Take the repository lock for a mutating operation
    pub fn lock(&self) -> Result<RepoLock<'_, Git2Repo>> {
        RepoLock::acquire(&self.repo, &self.git_dir, &self.lock_config)
    }

    fn read(&self) -> Result<std::sync::MutexGuard<'_, Git2Repo>> {
        self.repo
            .lock()
            .map_err(|_| BumpError::lock("repository handle mutex poisoned"))
    }
}

/// Signature from the repository config, or a fixed tool identity
fn signature(repo: &Git2Repo) -> Result<Signature<'static>> {
    let sig = repo
        .signature()
        .or_else(|_| Signature::now("git-bump", "git-bump@localhost"))?;
    Ok(sig)
}

/// Credential and push-status callbacks shared by all pushes
fn remote_callbacks<'a>() -> RemoteCallbacks<'a> {
    let mut callbacks = RemoteCallbacks::new();

    callbacks.credentials(|_url, username_from_url, allowed_types| {
        let username = username_from_url.unwrap_or("git");

        if allowed_types.contains(CredentialType::SSH_KEY) {
            if let Ok(cred) = Cred::ssh_key_from_agent(username) {
                return Ok(cred);
            }

            if let Some(home) = dirs::home_dir() {
                for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                    let path = home.join(".ssh").join(key);
                    if path.exists() {
                        if let Ok(cred) = Cred::ssh_key(username, None, &path, None) {
                            return Ok(cred);
                        }
                    }
                }
            }
        }

        Cred::default()
    });

    callbacks.push_update_reference(|refname, status| match status {
        Some(message) => Err(git2::Error::from_str(&format!(
            "remote rejected {}: {}",
            refname, message
        ))),
        None => Ok(()),
    });

    callbacks
}

fn push_refspecs(repo: &Git2Repo, remote_name: &str, refspecs: &[String]) -> Result<()> {
    let mut remote = repo
        .find_remote(remote_name)
        .map_err(|e| BumpError::remote(format!("Cannot find remote '{}': {}", remote_name, e)))?;

    let mut push_options = PushOptions::new();
    push_options.remote_callbacks(remote_callbacks());

    remote.push(refspecs, Some(&mut push_options)).map_err(|e| {
        if e.class() == git2::ErrorClass::Net {
            BumpError::remote(format!("Network error during push to '{}': {}", remote_name, e))
        } else {
            BumpError::remote(format!("Push to '{}' failed: {}", remote_name, e))
        }
    })
}

fn tag_names(repo: &Git2Repo) -> Result<Vec<String>> {
    let tags = repo.tag_names(None)?;
    Ok(tags.iter().flatten().map(|s| s.to_string()).collect())
}

/// Annotated tag on HEAD whose message is the tag name
fn create_annotated_tag(repo: &Git2Repo, name: &str) -> Result<()> {
    let head = repo
        .head()
        .and_then(|h| h.peel_to_commit())
        .map_err(|e| BumpError::tag(format!("Cannot resolve HEAD commit: {}", e)))?;
    let tagger = signature(repo)?;

    repo.tag(name, head.as_object(), &tagger, name, false)
        .map_err(|e| match e.code() {
            ErrorCode::Exists => BumpError::tag(format!("Tag '{}' already exists", name)),
            _ => BumpError::tag(format!("Cannot create tag '{}': {}", name, e)),
        })?;

    info!(tag = name, commit = %head.id(), "created tag");
    Ok(())
}

fn tag_refspec(name: &str) -> String {
    format!("refs/tags/{}:refs/tags/{}", name, name)
}

impl super::Repository for Git2Repository {
    fn path(&self) -> &Path {
        &self.workdir
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        let repo = self.read()?;
        tag_names(&repo)
    }

    fn create_tag(&self, name: &str) -> Result<()> {
        let repo = self.lock()?;
        create_annotated_tag(&repo, name)
    }

    fn create_tag_from_snapshot(
        &self,
        choose: &mut dyn FnMut(&[String]) -> Result<String>,
    ) -> Result<String> {
        let repo = self.lock()?;
        let tags = tag_names(&repo)?;
        let name = choose(&tags)?;
        create_annotated_tag(&repo, &name)?;
        Ok(name)
    }

    fn push_tag(&self, remote: &str, name: &str) -> Result<()> {
        let repo = self.lock()?;
        push_refspecs(&repo, remote, &[tag_refspec(name)])?;
        info!(tag = name, remote, "pushed tag");
        Ok(())
    }

    fn push_tags(&self, remote: &str) -> Result<()> {
        let repo = self.lock()?;
        let refspecs: Vec<String> = repo
            .tag_names(None)?
            .iter()
            .flatten()
            .map(tag_refspec)
            .collect();

        if refspecs.is_empty() {
            debug!(remote, "no tags to push");
            return Ok(());
        }

        push_refspecs(&repo, remote, &refspecs)?;
        info!(count = refspecs.len(), remote, "pushed tags");
        Ok(())
    }

    fn commit_file(&self, relative_path: &Path, message: &str) -> Result<()> {
        let repo = self.lock()?;

        let mut index = repo.index()?;
        index.add_path(relative_path)?;
        index.write()?;

        let tree_id = index.write_tree()?;
        let tree = repo.find_tree(tree_id)?;
        let author = signature(&repo)?;

        let parent = match repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if e.code() == ErrorCode::UnbornBranch => None,
            Err(e) => return Err(e.into()),
        };
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        let oid = repo.commit(Some("HEAD"), &author, &author, message, &tree, &parents)?;
        info!(file = %relative_path.display(), commit = %oid, "committed version file");
        Ok(())
    }

    fn push_preference(&self) -> Result<Option<bool>> {
        let repo = self.read()?;
        let config = repo.config()?;

        match config.get_string(PUSH_PREFERENCE_KEY) {
            Ok(value) => super::parse_push_preference(&value).map(Some),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_push_preference(&self, value: bool) -> Result<()> {
        let repo = self.lock()?;
        let mut config = repo.config()?.open_level(ConfigLevel::Local)?;
        config.set_bool(PUSH_PREFERENCE_KEY, value)?;
        debug!(value, "stored push preference");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::Repository;
    use std::fs;
    use tempfile::TempDir;

    fn init_repo() -> (TempDir, Git2Repository) {
        let dir = TempDir::new().unwrap();
        let repo = Git2Repo::init(dir.path()).unwrap();
        {
            let mut config = repo.config().unwrap();
            config.set_str("user.name", "Test User").unwrap();
            config.set_str("user.email", "test@example.com").unwrap();
        }
        fs::write(dir.path().join("README.md"), "hello\n").unwrap();
        let handle = Git2Repository::from_git2(repo, LockConfig::default()).unwrap();
        handle
            .commit_file(Path::new("README.md"), "Initial commit")
            .unwrap();
        (dir, handle)
    }

    #[test]
    fn test_create_and_list_tags() {
        let (_dir, repo) = init_repo();
        assert!(repo.list_tags().unwrap().is_empty());

        repo.create_tag("v0.1.0").unwrap();
        repo.create_tag("v0.2.0-rc.1").unwrap();

        let mut tags = repo.list_tags().unwrap();
        tags.sort();
        assert_eq!(tags, vec!["v0.1.0".to_string(), "v0.2.0-rc.1".to_string()]);
    }

    #[test]
    fn test_created_tag_is_annotated_with_its_name() {
        let (dir, repo) = init_repo();
        repo.create_tag("v1.0.0").unwrap();

        let raw = Git2Repo::open(dir.path()).unwrap();
        let reference = raw.find_reference("refs/tags/v1.0.0").unwrap();
        let tag = reference.peel_to_tag().unwrap();
        assert_eq!(tag.message(), Some("v1.0.0"));
    }

    #[test]
    fn test_create_existing_tag_fails() {
        let (_dir, repo) = init_repo();
        repo.create_tag("v1.0.0").unwrap();

        let err = repo.create_tag("v1.0.0").unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_create_tag_from_snapshot() {
        let (_dir, repo) = init_repo();
        repo.create_tag("v1.0.0").unwrap();

        let created = repo
            .create_tag_from_snapshot(&mut |tags| {
                assert_eq!(tags, ["v1.0.0".to_string()]);
                Ok("v1.0.1".to_string())
            })
            .unwrap();

        assert_eq!(created, "v1.0.1");
        assert_eq!(repo.list_tags().unwrap().len(), 2);
    }

    #[test]
    fn test_create_tag_from_snapshot_choice_fails() {
        let (dir, repo) = init_repo();
        let result =
            repo.create_tag_from_snapshot(&mut |_| Err(BumpError::InvalidSuffix("x".to_string())));

        assert!(matches!(result, Err(BumpError::InvalidSuffix(_))));
        assert!(repo.list_tags().unwrap().is_empty());
        assert!(!dir.path().join(".git").join("bump.lock").exists());
    }

    #[test]
    fn test_lock_file_released_after_create() {
        let (dir, repo) = init_repo();
        repo.create_tag("v1.0.0").unwrap();
        assert!(!dir.path().join(".git").join("bump.lock").exists());
    }

    #[test]
    fn test_push_preference_round_trip() {
        let (_dir, repo) = init_repo();
        assert_eq!(repo.push_preference().unwrap(), None);

        repo.set_push_preference(true).unwrap();
        assert_eq!(repo.push_preference().unwrap(), Some(true));

        repo.set_push_preference(false).unwrap();
        assert_eq!(repo.push_preference().unwrap(), Some(false));
    }

    #[test]
    fn test_push_preference_invalid_value() {
        let (dir, repo) = init_repo();
        {
            let raw = Git2Repo::open(dir.path()).unwrap();
            raw.config()
                .unwrap()
                .set_str(PUSH_PREFERENCE_KEY, "sometimes")
                .unwrap();
        }
        assert!(repo.push_preference().is_err());
    }

    #[test]
    fn test_push_to_missing_remote_fails() {
        let (_dir, repo) = init_repo();
        repo.create_tag("v1.0.0").unwrap();

        let err = repo.push_tag("origin", "v1.0.0").unwrap_err();
        assert!(matches!(err, BumpError::Remote(_)));
    }

    #[test]
    fn test_push_tag_to_bare_remote() {
        let (_dir, repo) = init_repo();
        let remote_dir = TempDir::new().unwrap();
        let remote = Git2Repo::init_bare(remote_dir.path()).unwrap();
        {
            let raw = Git2Repo::open(repo.path()).unwrap();
            raw.remote("origin", remote_dir.path().to_str().unwrap())
                .unwrap();
        }

        repo.create_tag("v1.0.0").unwrap();
        repo.push_tag("origin", "v1.0.0").unwrap();

        assert!(remote.find_reference("refs/tags/v1.0.0").is_ok());
    }

    #[test]
    fn test_bare_repository_rejected() {
        let dir = TempDir::new().unwrap();
        let bare = Git2Repo::init_bare(dir.path()).unwrap();
        assert!(Git2Repository::from_git2(bare, LockConfig::default()).is_err());
    }
}
