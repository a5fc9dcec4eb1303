mod common;

use std::fs;
use std::sync::Arc;

use monobuild::engine::{Pipeline, PipelineOutcome};
use monobuild::errors::{MonobuildError, SchedulerError};
use monobuild::exec::ProjectAction;
use monobuild::fs::RealFileSystem;
use monobuild::report::Console;
use monobuild::types::TaskKind;
use monobuild_test_utils::builders::{Monorepo, MonorepoBuilder};
use monobuild_test_utils::fake_action::RecordingAction;
use monobuild_test_utils::with_timeout;

use common::names;

/// `libs/core <- libs/lib-a, libs/lib-b <- app`, plus an unrelated `tools`.
fn diamond_repo() -> MonorepoBuilder {
    MonorepoBuilder::new()
        .pattern("*")
        .pattern("libs/*")
        .project("libs/core")
        .project("libs/lib-a")
        .project("libs/lib-b")
        .project("app")
        .project("tools")
        .depends_on("libs/lib-a", "libs/core")
        .depends_on("libs/lib-b", "libs/core")
        .depends_on("app", "libs/lib-a")
        .depends_on("app", "libs/lib-b")
}

fn pipeline(repo: &Monorepo, console: &Console) -> Pipeline {
    Pipeline::new(repo.settings(2), Arc::new(RealFileSystem), console.clone())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn build_and_test_run_over_the_affected_projects() {
    common::init_tracing();
    let repo = diamond_repo().build();
    let console = Console::buffered();
    let pipeline = pipeline(&repo, &console);
    let workspace = pipeline.load_workspace().unwrap();

    let build = RecordingAction::new().shared();
    let test = RecordingAction::new().shared();
    let build_action: Arc<dyn ProjectAction> = build.clone();
    let test_action: Arc<dyn ProjectAction> = test.clone();

    let outcome = with_timeout(pipeline.build_and_test(
        &workspace,
        ["libs/lib-a/src/Main.java"],
        build_action,
        test_action,
    ))
    .await
    .unwrap();

    let PipelineOutcome::Completed { passes, .. } = outcome else {
        panic!("expected passes to run");
    };
    assert_eq!(passes.len(), 2);
    assert_eq!(passes[0].0, TaskKind::Build);
    assert_eq!(passes[1].0, TaskKind::Test);
    assert_eq!(names(&passes[1].1.succeeded), vec!["app", "core", "lib-a"]);

    let mut built = build.started();
    built.sort();
    assert_eq!(built, vec!["app", "core", "lib-a"]);
    assert_eq!(test.started().len(), 3);

    let out = repo.path("out/projects");
    assert_eq!(fs::read_to_string(out.join("changed.txt")).unwrap(), "libs/lib-a\n");
    assert_eq!(
        fs::read_to_string(out.join("built.txt")).unwrap(),
        "app\nlibs/core\nlibs/lib-a\n"
    );

    let printed = console.captured();
    for section in ["Changed projects", "Affected projects", "Building", "Testing"] {
        assert!(printed.contains(section), "missing {section}: {printed}");
    }
    assert!(printed.contains("Success! Total time"));
}

#[tokio::test]
async fn nothing_changed_means_nothing_to_do() {
    let repo = diamond_repo().build();
    let console = Console::buffered();
    let pipeline = pipeline(&repo, &console);
    let workspace = pipeline.load_workspace().unwrap();

    let build = RecordingAction::new().shared();
    let test = RecordingAction::new().shared();

    let outcome = pipeline
        .build_and_test(&workspace, ["README.md"], build.clone(), test.clone())
        .await
        .unwrap();

    assert_eq!(outcome, PipelineOutcome::NothingToDo);
    assert!(build.started().is_empty());
    assert!(test.started().is_empty());
    assert!(console.captured().contains("No projects changed"));
    assert!(!repo.path("out/projects/built.txt").exists());
}

#[tokio::test]
async fn failed_build_stops_before_the_test_pass() {
    let repo = diamond_repo().build();
    let console = Console::buffered();
    let pipeline = pipeline(&repo, &console);
    let workspace = pipeline.load_workspace().unwrap();

    let build = RecordingAction::new().failing(&["core"]).shared();
    let test = RecordingAction::new().shared();

    let err = with_timeout(pipeline.build_and_test(
        &workspace,
        ["libs/core/build.gradle"],
        build.clone(),
        test.clone(),
    ))
    .await
    .unwrap_err();

    let report = match err {
        MonobuildError::Scheduler(SchedulerError::Failed(report)) => report,
        other => panic!("expected a failed pass, got {other:?}"),
    };
    assert_eq!(names(&report.failed), vec!["core"]);
    assert_eq!(names(&report.skipped), vec!["app", "lib-a", "lib-b"]);
    assert!(test.started().is_empty());

    let printed = console.captured();
    assert!(printed.contains("Building failed"));
    assert!(printed.contains("Skipped"));
}

#[tokio::test]
async fn deploy_lists_only_projects_with_a_deploy_script() {
    let repo = diamond_repo()
        .script("app", "deploy.sh", "exit 0")
        .script("tools", "deploy.sh", "exit 0")
        .build();
    let console = Console::buffered();
    let pipeline = pipeline(&repo, &console);
    let workspace = pipeline.load_workspace().unwrap();

    let deploy = RecordingAction::new().shared();
    let outcome = with_timeout(pipeline.deploy(
        &workspace,
        ["libs/lib-b/settings.gradle"],
        deploy.clone(),
    ))
    .await
    .unwrap();

    assert!(matches!(outcome, PipelineOutcome::Completed { .. }));
    assert_eq!(
        fs::read_to_string(repo.path("out/projects/deployed.txt")).unwrap(),
        "app\n"
    );
    let printed = console.captured();
    assert!(printed.contains("Pending Deployment"));
    assert!(!printed.contains("tools "), "tools is not affected");
}

#[tokio::test]
async fn deploy_without_scripts_is_nothing_to_do() {
    let repo = diamond_repo().build();
    let console = Console::buffered();
    let pipeline = pipeline(&repo, &console);
    let workspace = pipeline.load_workspace().unwrap();

    let deploy = RecordingAction::new().shared();
    let outcome = pipeline
        .deploy(&workspace, ["app/src/index.ts"], deploy.clone())
        .await
        .unwrap();

    assert_eq!(outcome, PipelineOutcome::NothingToDo);
    assert!(deploy.started().is_empty());
    assert!(console.captured().contains("No projects to deploy"));
}

#[test]
fn graph_command_writes_graph_json() {
    let repo = diamond_repo().build();
    let console = Console::buffered();
    let pipeline = pipeline(&repo, &console);
    let workspace = pipeline.load_workspace().unwrap();

    let path = pipeline.graph(&workspace).unwrap();

    assert_eq!(path, repo.path("out/projects/graph.json"));
    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["app"], serde_json::json!(["lib-a", "lib-b"]));
    assert_eq!(value["tools"], serde_json::json!([]));

    let printed = console.captured();
    assert!(printed.lines().any(|l| l.starts_with("lib-a") && l.ends_with(": core")));
}
