//! Unit tests for source-control providers

use super::*;

use camino::Utf8PathBuf;
use git2::{Repository, Signature};
use tempfile::TempDir;

struct FakeProvider(&'static str);

impl ScmProvider for FakeProvider {
    fn id(&self) -> &str {
        self.0
    }

    fn clone_branch(&self, _: &str, _: &str, _: &Utf8Path, _: &CancellationToken) -> FetchResult<()> {
        Ok(())
    }
}

/// Local repository with a single commit on `release`
fn origin_repo() -> (TempDir, String) {
    let temp_dir = TempDir::new().unwrap();
    let repo = Repository::init(temp_dir.path()).unwrap();
    std::fs::write(temp_dir.path().join("bower.json"), r#"{"name":"origin"}"#).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(std::path::Path::new("bower.json")).unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let signature = Signature::now("Sprout Tests", "tests@example.com").unwrap();
    let commit_id = repo
        .commit(Some("HEAD"), &signature, &signature, "initial", &tree, &[])
        .unwrap();
    let commit = repo.find_commit(commit_id).unwrap();
    repo.branch("release", &commit, false).unwrap();

    let url = temp_dir.path().to_str().unwrap().to_string();
    (temp_dir, url)
}

#[test]
fn test_registry_defaults_and_lookup() {
    let registry = ProviderRegistry::with_defaults();
    assert_eq!(registry.ids(), vec![GIT_PROVIDER]);
    assert!(registry.get(GIT_PROVIDER).is_some());
    assert!(registry.get("hg").is_none());
}

#[test]
fn test_register_replaces_same_id() {
    let mut registry = ProviderRegistry::with_defaults();
    registry.register(Arc::new(FakeProvider("hg")));
    registry.register(Arc::new(FakeProvider(GIT_PROVIDER)));

    assert_eq!(registry.ids(), vec!["hg", GIT_PROVIDER]);
}

#[test]
fn test_clone_local_branch() {
    let (_origin, url) = origin_repo();
    let temp_dir = TempDir::new().unwrap();
    let dest = Utf8PathBuf::try_from(temp_dir.path().join("origin")).unwrap();
    std::fs::create_dir(&dest).unwrap();

    GitProvider::new()
        .clone_branch(&url, "release", &dest, &CancellationToken::new())
        .unwrap();

    assert!(dest.join("bower.json").is_file());
    let cloned = Repository::open(dest.as_std_path()).unwrap();
    assert_eq!(cloned.head().unwrap().shorthand(), Some("release"));
}

#[test]
fn test_clone_unknown_branch_fails() {
    let (_origin, url) = origin_repo();
    let temp_dir = TempDir::new().unwrap();
    let dest = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();

    let result = GitProvider::new().clone_branch(&url, "no-such-branch", &dest, &CancellationToken::new());
    assert!(matches!(result, Err(SproutError::CloneFailure { .. })));
}

#[test]
fn test_cancelled_clone_does_not_start() {
    let temp_dir = TempDir::new().unwrap();
    let dest = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    let token = CancellationToken::new();
    token.cancel();

    let result = GitProvider::new().clone_branch("https://example.invalid/a.git", "master", &dest, &token);
    assert!(matches!(result, Err(SproutError::Cancelled { .. })));
}
