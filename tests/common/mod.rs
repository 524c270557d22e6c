#![allow(dead_code)]

use paperboy_dag::dag::TaskGraph;

/// Task ids of `graph` in insertion order, as owned strings.
pub fn task_ids(graph: &TaskGraph) -> Vec<String> {
    graph.task_ids().map(|id| id.to_string()).collect()
}

/// Upstream ids of `task`, as owned strings.
pub fn deps(graph: &TaskGraph, task: &str) -> Vec<String> {
    graph
        .dependencies_of(task)
        .into_iter()
        .map(|id| id.to_string())
        .collect()
}

/// All edges of `graph` as `(upstream, downstream)` pairs.
pub fn edges(graph: &TaskGraph) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for id in graph.task_ids() {
        for dep in graph.dependencies_of(id.as_str()) {
            out.push((dep.to_string(), id.to_string()));
        }
    }
    out.sort();
    out
}
