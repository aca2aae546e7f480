//! Unit tests for reference resolution

use super::*;

use crate::layout::{BOWER_LAYOUT, PUB_LAYOUT};
use tempfile::TempDir;

/// Pub project `app` with `lib/main.dart` and `packages/args/args.dart`
fn pub_project() -> (TempDir, Arc<Project>) {
    let temp_dir = TempDir::new().unwrap();
    let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    std::fs::write(root.join("pubspec.yaml"), "name: app\n").unwrap();
    std::fs::create_dir_all(root.join("lib/src")).unwrap();
    std::fs::write(root.join("lib/main.dart"), "").unwrap();
    std::fs::write(root.join("lib/src/util.dart"), "").unwrap();
    std::fs::create_dir_all(root.join("packages/args")).unwrap();
    std::fs::write(root.join("packages/args/args.dart"), "").unwrap();
    (temp_dir, Arc::new(Project::new(root)))
}

#[test]
fn test_self_reference_is_computed_once() {
    let (_guard, project) = pub_project();
    assert_eq!(project.self_reference(), None);

    ReferenceResolver::new(project.clone(), PUB_LAYOUT);
    assert_eq!(project.self_reference().as_deref(), Some("app"));

    // later constructions reuse the cached value
    std::fs::write(project.root().join("pubspec.yaml"), "name: renamed\n").unwrap();
    ReferenceResolver::new(project.clone(), PUB_LAYOUT);
    assert_eq!(project.self_reference().as_deref(), Some("app"));
}

#[test]
fn test_resolve_external_reference() {
    let (_guard, project) = pub_project();
    let resolver = ReferenceResolver::new(project.clone(), PUB_LAYOUT);

    assert_eq!(
        resolver.resolve_to_location("package:args/args.dart").unwrap(),
        project.root().join("packages/args/args.dart")
    );
    assert!(resolver.resolve_to_location("package:args/missing.dart").is_none());
}

#[test]
fn test_resolve_self_reference_to_source_dir() {
    let (_guard, project) = pub_project();
    let resolver = ReferenceResolver::new(project.clone(), PUB_LAYOUT);

    assert_eq!(
        resolver.resolve_to_location("package:app/src/util.dart").unwrap(),
        project.root().join("lib/src/util.dart")
    );
}

#[test]
fn test_resolve_rejects_bad_references() {
    let (_guard, project) = pub_project();
    let resolver = ReferenceResolver::new(project, PUB_LAYOUT);

    for reference in [
        "bower:args/args.dart",
        "package:args",
        "package:/args.dart",
        "package:args/",
        "package:../pubspec.yaml",
        "package:args/../../pubspec.yaml",
    ] {
        assert!(resolver.resolve_to_location(reference).is_none(), "{}", reference);
    }
}

#[test]
fn test_reference_for_files() {
    let (_guard, project) = pub_project();
    let root = project.root().to_path_buf();
    let resolver = ReferenceResolver::new(project, PUB_LAYOUT);

    assert_eq!(
        resolver.reference_for(&root.join("packages/args/args.dart")).as_deref(),
        Some("package:args/args.dart")
    );
    assert_eq!(
        resolver.reference_for(&root.join("lib/src/util.dart")).as_deref(),
        Some("package:app/src/util.dart")
    );
    assert!(resolver.reference_for(&root.join("packages/args")).is_none());
    assert!(resolver.reference_for(&root.join("test/main_test.dart")).is_none());
    assert!(resolver.reference_for(Utf8Path::new("/elsewhere/lib/a.dart")).is_none());
}

#[test]
fn test_reference_for_paths_with_parent_segments() {
    let (_guard, project) = pub_project();
    let root = project.root().to_path_buf();
    let resolver = ReferenceResolver::new(project, PUB_LAYOUT);

    assert_eq!(
        resolver.reference_for(&root.join("packages/args/../../lib/main.dart")).as_deref(),
        Some("package:app/main.dart")
    );
    assert_eq!(
        resolver.reference_for(&root.join("lib/../packages/args/./args.dart")).as_deref(),
        Some("package:args/args.dart")
    );
    assert!(resolver.reference_for(&root.join("packages/args/../../../app/lib/main.dart")).is_none());
}

#[test]
fn test_source_reference_needs_self_name() {
    let temp_dir = TempDir::new().unwrap();
    let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    let resolver = ReferenceResolver::new(Arc::new(Project::new(root.clone())), PUB_LAYOUT);

    assert!(resolver.reference_for(&root.join("lib/main.dart")).is_none());
}

#[test]
fn test_bower_layout_has_no_source_dir() {
    let temp_dir = TempDir::new().unwrap();
    let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    std::fs::write(root.join("bower.json"), r#"{"name":"app"}"#).unwrap();
    std::fs::create_dir_all(root.join("bower_components/polymer")).unwrap();
    std::fs::write(root.join("bower_components/polymer/polymer.html"), "").unwrap();
    let resolver = ReferenceResolver::new(Arc::new(Project::new(root.clone())), BOWER_LAYOUT);

    assert_eq!(
        resolver.reference_for(&root.join("bower_components/polymer/polymer.html")).as_deref(),
        Some("bower:polymer/polymer.html")
    );
    assert_eq!(
        resolver.resolve_to_location("bower:polymer/polymer.html").unwrap(),
        root.join("bower_components/polymer/polymer.html")
    );
    assert!(resolver.reference_for(&root.join("lib/a.js")).is_none());
}
