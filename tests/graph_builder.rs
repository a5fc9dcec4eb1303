mod common;

use std::path::Path;

use monobuild::dag::declarations::{parse_declaration, referenced_paths};
use monobuild::dag::{FileDeclarationSource, GraphBuilder};
use monobuild::errors::GraphError;
use monobuild::fs::mock::MockFileSystem;
use monobuild::project::ProjectRegistry;

use common::{edges, names};

fn registry(names: &[&str]) -> ProjectRegistry {
    ProjectRegistry::from_dirs(Path::new("/repo"), names.iter().copied())
}

fn declare(fs: &MockFileSystem, project: &str, contents: &str) {
    fs.add_file(format!("/repo/{project}/settings.gradle"), contents);
}

#[test]
fn parses_quoted_and_parenthesised_declarations() {
    assert_eq!(parse_declaration("includeBuild '../core'"), Some("../core"));
    assert_eq!(parse_declaration("includeBuild(\"../lib-a\")"), Some("../lib-a"));
    assert_eq!(parse_declaration("  includeBuild ( '../x' ) // trailing"), Some("../x"));
    assert_eq!(parse_declaration("//#includeBuild '../tools'"), Some("../tools"));
    assert_eq!(parse_declaration("rootProject.name = 'app'"), None);
    assert_eq!(parse_declaration("// includeBuild '../core'"), None);
}

#[test]
fn referenced_paths_keep_file_order() {
    let lines = ["includeBuild '../b'", "something else", "includeBuild '../a'"];
    assert_eq!(referenced_paths(lines), vec!["../b", "../a"]);
}

#[test]
fn builds_edges_from_prerequisite_to_dependent() {
    common::init_tracing();
    let fs = MockFileSystem::new();
    declare(&fs, "lib-a", "includeBuild '../core'\n");
    declare(&fs, "lib-b", "includeBuild('../core')\n");
    declare(&fs, "app", "includeBuild '../lib-a'\nincludeBuild '../lib-b'\n");

    let registry = registry(&["core", "lib-a", "lib-b", "app"]);
    let source = FileDeclarationSource::new(&fs, "settings.gradle");
    let graph = GraphBuilder::new(&source).build(&registry).unwrap();

    assert_eq!(graph.len(), 4);
    assert_eq!(
        edges(&graph),
        vec![
            ("core".to_string(), "lib-a".to_string()),
            ("core".to_string(), "lib-b".to_string()),
            ("lib-a".to_string(), "app".to_string()),
            ("lib-b".to_string(), "app".to_string()),
        ]
    );

    let app = registry.get(Path::new("/repo/app")).unwrap();
    assert_eq!(names(graph.ancestors(app)), vec!["core", "lib-a", "lib-b"]);

    let core = registry.get(Path::new("/repo/core")).unwrap();
    assert_eq!(names(graph.dependents_of(core)), vec!["lib-a", "lib-b"]);
    assert!(graph.dependencies_of(core).is_empty());
}

#[test]
fn duplicate_declarations_collapse_to_one_edge() {
    let fs = MockFileSystem::new();
    declare(
        &fs,
        "app",
        "includeBuild '../core'\nincludeBuild \"../core\"\nincludeBuild '../core/.'\n",
    );

    let registry = registry(&["core", "app"]);
    let source = FileDeclarationSource::new(&fs, "settings.gradle");
    let graph = GraphBuilder::new(&source).build(&registry).unwrap();

    assert_eq!(graph.edge_count(), 1);
}

#[test]
fn commented_out_declaration_still_counts() {
    let fs = MockFileSystem::new();
    declare(&fs, "app", "//#includeBuild '../tools'\n");

    let registry = registry(&["tools", "app"]);
    let source = FileDeclarationSource::new(&fs, "settings.gradle");
    let graph = GraphBuilder::new(&source).build(&registry).unwrap();

    let app = registry.get(Path::new("/repo/app")).unwrap();
    assert_eq!(names(graph.dependencies_of(app)), vec!["tools"]);
}

#[test]
fn projects_without_declaration_file_have_no_edges() {
    let fs = MockFileSystem::new();
    let registry = registry(&["a", "b"]);
    let source = FileDeclarationSource::new(&fs, "settings.gradle");
    let graph = GraphBuilder::new(&source).build(&registry).unwrap();

    assert_eq!(graph.len(), 2);
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn cycle_is_a_fatal_error_naming_the_projects() {
    let fs = MockFileSystem::new();
    declare(&fs, "a", "includeBuild '../b'\n");
    declare(&fs, "b", "includeBuild '../c'\n");
    declare(&fs, "c", "includeBuild '../a'\n");

    let registry = registry(&["a", "b", "c"]);
    let source = FileDeclarationSource::new(&fs, "settings.gradle");
    let err = GraphBuilder::new(&source).build(&registry).unwrap_err();

    match err {
        GraphError::Cycle(path) => {
            assert_eq!(path.first(), path.last());
            assert_eq!(path.len(), 4);
            for name in ["a", "b", "c"] {
                assert!(path.iter().any(|p| p == name), "{name} missing from {path:?}");
            }
        }
        other => panic!("expected Cycle, got {other:?}"),
    }
}

#[test]
fn with_several_cycles_the_one_with_the_smallest_name_is_reported() {
    let fs = MockFileSystem::new();
    declare(&fs, "x", "includeBuild '../y'\n");
    declare(&fs, "y", "includeBuild '../x'\n");
    declare(&fs, "b", "includeBuild '../c'\n");
    declare(&fs, "c", "includeBuild '../b'\n");

    let registry = registry(&["b", "c", "x", "y"]);
    let source = FileDeclarationSource::new(&fs, "settings.gradle");
    let err = GraphBuilder::new(&source).build(&registry).unwrap_err();

    match err {
        GraphError::Cycle(path) => {
            assert_eq!(path.len(), 3);
            assert!(path.iter().all(|p| p == "b" || p == "c"), "{path:?}");
        }
        other => panic!("expected Cycle, got {other:?}"),
    }
}

#[test]
fn self_reference_is_a_cycle() {
    let fs = MockFileSystem::new();
    declare(&fs, "a", "includeBuild '.'\n");

    let registry = registry(&["a"]);
    let source = FileDeclarationSource::new(&fs, "settings.gradle");
    let err = GraphBuilder::new(&source).build(&registry).unwrap_err();

    assert!(matches!(err, GraphError::Cycle(ref p) if p == &["a".to_string(), "a".to_string()]));
}

#[test]
fn reference_to_unknown_project_is_dangling() {
    let fs = MockFileSystem::new();
    declare(&fs, "app", "includeBuild '../missing'\n");

    let registry = registry(&["app"]);
    let source = FileDeclarationSource::new(&fs, "settings.gradle");
    let err = GraphBuilder::new(&source).build(&registry).unwrap_err();

    match err {
        GraphError::DanglingReference { from, to } => {
            assert_eq!(from, "app");
            assert_eq!(to, Path::new("/repo/missing"));
        }
        other => panic!("expected DanglingReference, got {other:?}"),
    }
}

#[test]
fn unreadable_declaration_file_aborts_with_context() {
    let fs = MockFileSystem::new();
    declare(&fs, "app", "includeBuild '../core'\n");
    fs.fail_reads_of("/repo/app/settings.gradle");

    let registry = registry(&["core", "app"]);
    let source = FileDeclarationSource::new(&fs, "settings.gradle");
    let err = GraphBuilder::new(&source).build(&registry).unwrap_err();

    match err {
        GraphError::Declarations { project, .. } => assert_eq!(project, "app"),
        other => panic!("expected Declarations, got {other:?}"),
    }
}

#[test]
fn retain_only_keeps_edges_between_retained_projects() {
    let graph = monobuild_test_utils::builders::diamond();
    let keep: Vec<_> = graph
        .projects()
        .into_iter()
        .filter(|p| p.name() != "lib-b")
        .cloned()
        .collect();

    let pruned = graph.retain_only(&keep);

    assert_eq!(names(pruned.projects()), vec!["app", "core", "lib-a"]);
    assert_eq!(
        edges(&pruned),
        vec![
            ("core".to_string(), "lib-a".to_string()),
            ("lib-a".to_string(), "app".to_string()),
        ]
    );
}

#[test]
fn dependency_map_lists_direct_dependencies_by_name() {
    let graph = monobuild_test_utils::builders::diamond();
    let map = graph.dependency_map();

    assert_eq!(map["app"], vec!["lib-a", "lib-b"]);
    assert_eq!(map["lib-a"], vec!["core"]);
    assert!(map["core"].is_empty());
}
