//! Unit tests for discovery

use super::*;

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use sprout_core::error::SproutError;
use sprout_core::types::{ResolutionOutcome, ResolvedReason, UnresolvedReason};
use sprout_registry::{MemorySource, RegistryResult};

const ROOT: &str = r#"{"name":"app","dependencies":{"left-pad":"foo/left-pad#master"}}"#;

fn discoverer(source: MemorySource, settings: ResolutionSettings) -> Discoverer {
    Discoverer::new(Arc::new(source), settings, "bower.json")
}

fn outcomes(discovery: &Discovery) -> Vec<(String, ResolutionOutcome)> {
    discovery
        .packages
        .values()
        .map(|p| (p.name.clone(), p.resolution))
        .collect()
}

#[tokio::test]
async fn test_single_dependency() {
    let source = MemorySource::new().with_manifest("foo/left-pad#master", r#"{"name":"left-pad"}"#);
    let discovery = discoverer(source, ResolutionSettings::default())
        .discover(ROOT, "bower.json")
        .await
        .unwrap();

    assert_eq!(discovery.packages.len(), 1);
    let package = &discovery.packages["left-pad"];
    assert_eq!(package.resolution, ResolutionOutcome::Resolved(ResolvedReason::UsedAsIs));
    assert_eq!(package.path, "foo/left-pad");
    assert_eq!(package.branch, "master");
    assert!(discovery.comments.is_empty());
}

#[tokio::test]
async fn test_no_dependencies() {
    for root in [
        r#"{"name":"app"}"#,
        r#"{"name":"app","dependencies":["foo/bar"]}"#,
        r#"{"name":"app","dependencies":"foo/bar"}"#,
    ] {
        let discovery = discoverer(MemorySource::new(), ResolutionSettings::default())
            .discover(root, "bower.json")
            .await
            .unwrap();
        assert!(discovery.packages.is_empty());
        assert!(discovery.comments.is_empty());
    }
}

#[tokio::test]
async fn test_transitive_dependencies() {
    let source = MemorySource::new()
        .with_manifest(
            "Polymer/core-ajax#master",
            r#"{"name":"core-ajax","dependencies":{"polymer":"Polymer/polymer#0.5.2"}}"#,
        )
        .with_manifest(
            "Polymer/polymer#0.5.2",
            r#"{"name":"polymer","dependencies":{"platform":"Polymer/platform"}}"#,
        )
        .with_manifest("Polymer/platform#master", r#"{"name":"platform"}"#);

    let root = r#"{"name":"app","dependencies":{"core-ajax":"Polymer/core-ajax"}}"#;
    let discovery = discoverer(source, ResolutionSettings::default())
        .discover(root, "bower.json")
        .await
        .unwrap();

    let names: Vec<&str> = discovery.packages.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["core-ajax", "polymer", "platform"]);
    assert_eq!(discovery.resolved_count(), 3);
}

#[tokio::test]
async fn test_cycles_terminate_and_first_seen_wins() {
    let source = MemorySource::new()
        .with_manifest(
            "acme/a#master",
            r#"{"name":"a","dependencies":{"b":"acme/b#master","shared":"acme/shared#v2"}}"#,
        )
        .with_manifest("acme/b#master", r#"{"name":"b","dependencies":{"a":"acme/a#master"}}"#)
        .with_manifest("acme/shared#v1", r#"{"name":"shared"}"#);

    let root = r#"{"name":"app","dependencies":{"a":"acme/a","shared":"acme/shared#v1"}}"#;
    let discovery = discoverer(source, ResolutionSettings::default())
        .discover(root, "bower.json")
        .await
        .unwrap();

    assert_eq!(discovery.packages.len(), 3);
    assert_eq!(discovery.packages["shared"].branch, "v1");
}

#[tokio::test]
async fn test_conflicting_duplicate_is_reported() {
    let source = MemorySource::new()
        .with_manifest(
            "acme/a#master",
            r#"{"name":"a","dependencies":{"shared":"other/shared#v2","b":"acme/b"}}"#,
        )
        .with_manifest("acme/b#master", r#"{"name":"b","dependencies":{"shared":"acme/shared#v1"}}"#)
        .with_manifest("acme/shared#v1", r#"{"name":"shared"}"#);

    let root = r#"{"name":"app","dependencies":{"shared":"acme/shared#v1","a":"acme/a"}}"#;
    let discovery = discoverer(source, ResolutionSettings::default())
        .discover(root, "bower.json")
        .await
        .unwrap();

    assert_eq!(discovery.packages["shared"].spec(), "acme/shared#v1");
    // the matching redeclaration in b is not a conflict
    assert_eq!(discovery.comments.altered.len(), 1);
    assert_eq!(
        discovery.comments.altered[0],
        "shared: 'other/shared#v2' -> 'acme/shared#v1' (pinned to first declared source)"
    );
    assert!(discovery.comments.unresolved.is_empty());
}

#[tokio::test]
async fn test_sub_manifest_failures_are_isolated() {
    let source = MemorySource::new()
        .with_manifest("acme/broken#master", "{ not json")
        .with_manifest(
            "acme/good#master",
            r#"{"name":"good","dependencies":{"leaf":"acme/leaf"}}"#,
        )
        .with_manifest("acme/leaf#master", r#"{"name":"leaf"}"#);

    let root = r#"{"name":"app","dependencies":{
        "broken":"acme/broken",
        "missing":"acme/missing",
        "good":"acme/good"
    }}"#;
    let discovery = discoverer(source, ResolutionSettings::default())
        .discover(root, "bower.json")
        .await
        .unwrap();

    // every package stays resolved even when its own manifest could not be read
    for name in ["broken", "missing", "good", "leaf"] {
        assert!(discovery.packages[name].is_resolved(), "{}", name);
    }
}

#[tokio::test]
async fn test_malformed_root_is_fatal() {
    let result = discoverer(MemorySource::new(), ResolutionSettings::default())
        .discover(r#"{"dependencies":{}}"#, "bower.json")
        .await;
    assert!(matches!(result, Err(SproutError::MalformedManifest { .. })));
}

#[tokio::test]
async fn test_unresolved_packages_are_not_followed() {
    let mut settings = ResolutionSettings::default();
    settings.ignored_dependencies.insert("skipped".to_string());

    let root = r#"{"name":"app","dependencies":{
        "skipped":"acme/skipped",
        "star":"*",
        "ranged":"acme/ranged#^1.0.0"
    }}"#;
    let discovery = discoverer(MemorySource::new(), settings)
        .discover(root, "bower.json")
        .await
        .unwrap();

    assert_eq!(discovery.resolved_count(), 0);
    assert_eq!(discovery.comments.ignored.len(), 1);
    assert_eq!(discovery.comments.unresolved.len(), 2);
    assert_eq!(
        discovery.packages["ranged"].resolution,
        ResolutionOutcome::Unresolved(UnresolvedReason::ComplexVersionUnsupported)
    );
}

#[tokio::test]
async fn test_dev_dependencies_only_from_root() {
    let source = MemorySource::new().with_manifest(
        "acme/lib#master",
        r#"{"name":"lib","devDependencies":{"test-tool":"acme/test-tool"}}"#,
    );
    let root = r#"{"name":"app","devDependencies":{"lib":"acme/lib"}}"#;

    let discovery = discoverer(source, ResolutionSettings::default())
        .discover(root, "bower.json")
        .await
        .unwrap();

    assert!(discovery.packages.contains_key("lib"));
    assert!(!discovery.packages.contains_key("test-tool"));
}

#[tokio::test]
async fn test_discovery_is_idempotent() {
    let make_source = || {
        MemorySource::new()
            .with_manifest(
                "acme/a#master",
                r#"{"name":"a","dependencies":{"c":"acme/c#from-a"}}"#,
            )
            .with_manifest(
                "acme/b#master",
                r#"{"name":"b","dependencies":{"c":"acme/c#from-b"}}"#,
            )
            .with_manifest("acme/c#from-a", r#"{"name":"c"}"#)
            .with_manifest("acme/c#from-b", r#"{"name":"c"}"#)
    };
    let root = r#"{"name":"app","dependencies":{"a":"acme/a","b":"acme/b"}}"#;

    let first = discoverer(make_source(), ResolutionSettings::default())
        .discover(root, "bower.json")
        .await
        .unwrap();
    let second = discoverer(make_source(), ResolutionSettings::default())
        .discover(root, "bower.json")
        .await
        .unwrap();

    assert_eq!(outcomes(&first), outcomes(&second));
    assert_eq!(first.packages["c"].branch, second.packages["c"].branch);
    assert_eq!(first.packages["c"].branch, "from-a");
}

/// Source that records the peak number of concurrent manifest reads
struct CountingSource {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl PackageSource for CountingSource {
    async fn fetch_manifest(&self, package: &Package, _manifest_file: &str) -> RegistryResult<String> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(format!(r#"{{"name":"{}"}}"#, package.name))
    }

    async fn download_archive(&self, _package: &Package) -> RegistryResult<Vec<u8>> {
        Ok(Vec::new())
    }

    fn clone_url(&self, package: &Package) -> String {
        package.path.clone()
    }
}

#[tokio::test]
async fn test_siblings_are_fetched_concurrently() {
    let root = r#"{"name":"app","dependencies":{"a":"x/a","b":"x/b","c":"x/c","d":"x/d"}}"#;

    let unbounded = Arc::new(CountingSource { in_flight: AtomicUsize::new(0), peak: AtomicUsize::new(0) });
    Discoverer::new(unbounded.clone(), ResolutionSettings::default(), "bower.json")
        .discover(root, "bower.json")
        .await
        .unwrap();
    assert_eq!(unbounded.peak.load(Ordering::SeqCst), 4);

    let capped = Arc::new(CountingSource { in_flight: AtomicUsize::new(0), peak: AtomicUsize::new(0) });
    Discoverer::new(capped.clone(), ResolutionSettings::default(), "bower.json")
        .with_concurrency_limit(Some(2))
        .discover(root, "bower.json")
        .await
        .unwrap();
    assert!(capped.peak.load(Ordering::SeqCst) <= 2);
}
