mod common;

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use monobuild::dag::DependencyGraph;
use monobuild::impact::{affected, changed_projects, ImpactAnalysis};
use monobuild::project::Project;
use monobuild_test_utils::builders::{diamond, graph_from_edges, project};
use proptest::prelude::*;

use common::names;

fn all_projects(graph: &DependencyGraph) -> Vec<Project> {
    graph.projects().into_iter().cloned().collect()
}

#[test]
fn change_in_lib_a_affects_its_ancestors_and_descendants_only() {
    let graph = diamond();
    let impact = ImpactAnalysis::analyze(&graph, ["lib-a/src/Main.java"], Path::new("/repo"));

    assert_eq!(names(&impact.changed), vec!["lib-a"]);
    assert_eq!(names(&impact.affected), vec!["app", "core", "lib-a"]);
}

#[test]
fn change_in_core_affects_everything_downstream() {
    let graph = diamond();
    let impact = ImpactAnalysis::analyze(&graph, ["core/build.gradle"], Path::new("/repo"));

    assert_eq!(names(&impact.changed), vec!["core"]);
    assert_eq!(names(&impact.affected), vec!["app", "core", "lib-a", "lib-b"]);
}

#[test]
fn no_changed_files_means_nothing_to_do() {
    let graph = diamond();
    let impact = ImpactAnalysis::analyze(&graph, Vec::<String>::new(), Path::new("/repo"));

    assert!(impact.is_empty());
    assert!(impact.affected.is_empty());
}

#[test]
fn files_outside_every_project_are_ignored() {
    let projects = all_projects(&diamond());
    let changed = changed_projects(
        &projects,
        ["README.md", ".monobuild/projects.txt", "docs/guide.md"],
        Path::new("/repo"),
    );
    assert!(changed.is_empty());
}

#[test]
fn containment_respects_path_component_boundaries() {
    let projects = vec![project("lib-a"), project("lib-a2")];
    let changed = changed_projects(&projects, ["lib-a2/file.txt"], Path::new("/repo"));
    assert_eq!(names(&changed), vec!["lib-a2"]);
}

#[test]
fn nested_projects_are_all_marked_changed() {
    let projects = vec![
        Project::new("services", "/repo/services"),
        Project::new("api", "/repo/services/api"),
    ];
    let changed = changed_projects(&projects, ["services/api/main.go"], Path::new("/repo"));
    assert_eq!(names(&changed), vec!["api", "services"]);
}

#[test]
fn changed_projects_are_sorted_and_deduplicated() {
    let projects = all_projects(&diamond());
    let changed = changed_projects(
        &projects,
        ["lib-b/a", "app/b", "lib-b/c", "./app/d"],
        Path::new("/repo"),
    );
    assert_eq!(names(&changed), vec!["app", "lib-b"]);
}

#[test]
fn affected_graph_is_pruned_to_affected_projects() {
    let graph = diamond();
    let impact = ImpactAnalysis::analyze(&graph, ["lib-a/x"], Path::new("/repo"));
    let pruned = impact.affected_graph(&graph);

    assert_eq!(names(pruned.projects()), vec!["app", "core", "lib-a"]);
    assert_eq!(pruned.edge_count(), 2);
}

/// Brute-force reachability over an edge list.
fn reachable(edges: &[(usize, usize)], start: usize, forward: bool) -> HashSet<usize> {
    let mut seen = HashSet::new();
    let mut stack = vec![start];
    while let Some(n) = stack.pop() {
        for &(a, b) in edges {
            let (from, to) = if forward { (a, b) } else { (b, a) };
            if from == n && seen.insert(to) {
                stack.push(to);
            }
        }
    }
    seen
}

fn dag_strategy(max_nodes: usize) -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1..=max_nodes).prop_flat_map(|n| {
        let edges = proptest::collection::vec((0..n, 0..n), 0..n * 2).prop_map(|raw| {
            // Only lower -> higher index edges, so the graph is acyclic.
            let set: BTreeSet<(usize, usize)> = raw
                .into_iter()
                .filter(|(a, b)| a != b)
                .map(|(a, b)| (a.min(b), a.max(b)))
                .collect();
            set.into_iter().collect::<Vec<_>>()
        });
        (Just(n), edges)
    })
}

fn name(i: usize) -> String {
    format!("p{i:02}")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn affected_is_changed_plus_reachable_in_either_direction(
        (n, edge_list) in dag_strategy(12),
        changed_idx in proptest::collection::btree_set(0..12usize, 0..4),
    ) {
        let node_names: Vec<String> = (0..n).map(name).collect();
        let name_refs: Vec<&str> = node_names.iter().map(String::as_str).collect();
        let edge_names: Vec<(String, String)> =
            edge_list.iter().map(|&(a, b)| (name(a), name(b))).collect();
        let edge_refs: Vec<(&str, &str)> =
            edge_names.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
        let graph = graph_from_edges(&name_refs, &edge_refs);

        let changed_idx: Vec<usize> = changed_idx.into_iter().filter(|&i| i < n).collect();
        let changed: Vec<Project> = changed_idx.iter().map(|&i| project(&name(i))).collect();

        let mut expected: BTreeSet<String> = BTreeSet::new();
        for &c in &changed_idx {
            expected.insert(name(c));
            expected.extend(reachable(&edge_list, c, true).into_iter().map(name));
            expected.extend(reachable(&edge_list, c, false).into_iter().map(name));
        }

        let result = affected(&graph, &changed);
        let result_names = names(&result);

        // Sorted, deduplicated, equal to the oracle.
        let mut sorted = result_names.clone();
        sorted.sort();
        sorted.dedup();
        prop_assert_eq!(&sorted, &result_names);
        prop_assert_eq!(result_names, expected.into_iter().collect::<Vec<_>>());

        if changed.is_empty() {
            prop_assert!(result.is_empty());
        }
    }

    #[test]
    fn acyclic_declarations_never_report_a_cycle((n, edge_list) in dag_strategy(12)) {
        let node_names: Vec<String> = (0..n).map(name).collect();
        let name_refs: Vec<&str> = node_names.iter().map(String::as_str).collect();
        let edge_names: Vec<(String, String)> =
            edge_list.iter().map(|&(a, b)| (name(a), name(b))).collect();
        let edge_refs: Vec<(&str, &str)> =
            edge_names.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
        let graph = graph_from_edges(&name_refs, &edge_refs);

        prop_assert!(graph.find_cycle().is_none());
        for p in graph.projects() {
            prop_assert!(!graph.ancestors(p).contains(&p));
        }
    }

    #[test]
    fn closing_an_edge_backwards_creates_a_cycle((n, edge_list) in dag_strategy(10)) {
        prop_assume!(!edge_list.is_empty());
        let (a, b) = edge_list[0];
        let node_names: Vec<String> = (0..n).map(name).collect();
        let name_refs: Vec<&str> = node_names.iter().map(String::as_str).collect();
        let edge_names: Vec<(String, String)> =
            edge_list.iter().map(|&(a, b)| (name(a), name(b))).collect();
        let edge_refs: Vec<(&str, &str)> =
            edge_names.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
        let mut graph = graph_from_edges(&name_refs, &edge_refs);

        graph.add_dependency(&project(&name(b)), &project(&name(a))).unwrap();
        let cycle = graph.find_cycle();
        prop_assert!(cycle.is_some());
        let cycle = cycle.unwrap();
        prop_assert_eq!(cycle.first(), cycle.last());
    }
}
