// src/dag/graph.rs

use std::borrow::Borrow;
use std::collections::HashMap;

use chrono::NaiveDateTime;
use petgraph::Direction;
use petgraph::algo::{has_path_connecting, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, Reversed};
use serde::Serialize;

use crate::dag::policy::TaskPolicy;
use crate::dag::task::{ProduceWork, Task, TaskId, TaskRole};
use crate::errors::{PaperboyError, Result};
use crate::types::WeightRule;

impl Borrow<str> for TaskId {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

/// Graph-wide settings handed to the backend alongside the tasks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DagSpec {
    pub dag_id: String,
    pub description: String,
    pub schedule_interval: Option<String>,
    pub start_date: NaiveDateTime,
    pub end_date: Option<NaiveDateTime>,
    pub concurrency: usize,
    pub max_active_runs: usize,
    pub catchup: bool,
    pub dagrun_timeout_secs: Option<u64>,
    pub weight_rule: WeightRule,
}

/// A task plus its resolved policy.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskNode {
    pub id: TaskId,
    pub task: Task,
    pub policy: TaskPolicy,
}

impl TaskNode {
    pub fn role(&self) -> TaskRole {
        self.task.role()
    }
}

/// Immutable-once-built task graph for one job.
///
/// Edges point from upstream to downstream: `a -> b` means `b` waits for
/// `a`. Node iteration follows insertion order, so output is stable across
/// rebuilds of the same input.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    dag: DagSpec,
    graph: DiGraph<TaskNode, ()>,
    index: HashMap<TaskId, NodeIndex>,
}

impl TaskGraph {
    pub fn new(dag: DagSpec) -> Self {
        Self {
            dag,
            graph: DiGraph::new(),
            index: HashMap::new(),
        }
    }

    /// Add a task. A second task with the same id is a construction error.
    pub fn add_task(&mut self, task: Task, policy: TaskPolicy) -> Result<TaskId> {
        let id = task.task_id();
        if self.index.contains_key(&id) {
            return Err(PaperboyError::ValidationError(format!(
                "{}: duplicate task id '{}'",
                self.dag.dag_id, id
            )));
        }

        let node = self.graph.add_node(TaskNode {
            id: id.clone(),
            task,
            policy,
        });
        self.index.insert(id.clone(), node);
        Ok(id)
    }

    /// Make `downstream` wait for `upstream`.
    pub fn add_dependency(&mut self, upstream: &str, downstream: &str) -> Result<()> {
        let from = self.node_index(upstream)?;
        let to = self.node_index(downstream)?;
        self.graph.update_edge(from, to, ());
        Ok(())
    }

    /// Fail with [`PaperboyError::DagCycle`] unless the graph is acyclic.
    pub fn ensure_acyclic(&self) -> Result<()> {
        self.topological_order().map(|_| ())
    }

    pub fn dag(&self) -> &DagSpec {
        &self.dag
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All tasks in insertion order.
    pub fn tasks(&self) -> impl Iterator<Item = &TaskNode> {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }

    pub fn task_ids(&self) -> impl Iterator<Item = &TaskId> {
        self.tasks().map(|node| &node.id)
    }

    pub fn task(&self, id: &str) -> Option<&TaskNode> {
        self.index.get(id).map(|idx| &self.graph[*idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Immediate upstream tasks of `id`, in insertion order.
    pub fn dependencies_of(&self, id: &str) -> Vec<&TaskId> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Immediate downstream tasks of `id`, in insertion order.
    pub fn dependents_of(&self, id: &str) -> Vec<&TaskId> {
        self.neighbors(id, Direction::Outgoing)
    }

    pub fn in_degree(&self, id: &str) -> usize {
        self.dependencies_of(id).len()
    }

    pub fn out_degree(&self, id: &str) -> usize {
        self.dependents_of(id).len()
    }

    /// Tasks with no upstream.
    pub fn sources(&self) -> Vec<&TaskId> {
        self.task_ids().filter(|id| self.in_degree(id.as_str()) == 0).collect()
    }

    /// Tasks with no downstream.
    pub fn sinks(&self) -> Vec<&TaskId> {
        self.task_ids().filter(|id| self.out_degree(id.as_str()) == 0).collect()
    }

    /// Whether `to` is reachable from `from` (a task reaches itself).
    pub fn has_path(&self, from: &str, to: &str) -> bool {
        match (self.index.get(from), self.index.get(to)) {
            (Some(a), Some(b)) => has_path_connecting(&self.graph, *a, *b, None),
            _ => false,
        }
    }

    /// Whether every path from `from` to `to` passes through `via`.
    pub fn all_paths_pass_through(&self, from: &str, via: &str, to: &str) -> bool {
        let (Some(&a), Some(&v), Some(&b)) =
            (self.index.get(from), self.index.get(via), self.index.get(to))
        else {
            return false;
        };

        // Search from `a` while refusing to step onto `v`.
        let mut stack = vec![a];
        let mut seen = vec![false; self.graph.node_count()];
        while let Some(n) = stack.pop() {
            if n == b {
                return false;
            }
            if std::mem::replace(&mut seen[n.index()], true) {
                continue;
            }
            for next in self.graph.neighbors_directed(n, Direction::Outgoing) {
                if next != v {
                    stack.push(next);
                }
            }
        }
        true
    }

    pub fn topological_order(&self) -> Result<Vec<&TaskId>> {
        toposort(&self.graph, None)
            .map(|order| order.into_iter().map(|idx| &self.graph[idx].id).collect())
            .map_err(|cycle| {
                PaperboyError::DagCycle(format!(
                    "{}: cycle involving task '{}'",
                    self.dag.dag_id,
                    self.graph[cycle.node_id()].id
                ))
            })
    }

    /// Priority the backend should use for `id`, according to the graph's
    /// weight rule.
    pub fn effective_priority(&self, id: &str) -> Option<u64> {
        let start = *self.index.get(id)?;
        let own = u64::from(self.graph[start].policy.priority_weight);

        let related: u64 = match self.dag.weight_rule {
            WeightRule::Absolute => 0,
            WeightRule::Downstream => {
                let mut sum = 0u64;
                let mut dfs = Dfs::new(&self.graph, start);
                while let Some(n) = dfs.next(&self.graph) {
                    if n != start {
                        sum += u64::from(self.graph[n].policy.priority_weight);
                    }
                }
                sum
            }
            WeightRule::Upstream => {
                let reversed = Reversed(&self.graph);
                let mut sum = 0u64;
                let mut dfs = Dfs::new(reversed, start);
                while let Some(n) = dfs.next(reversed) {
                    if n != start {
                        sum += u64::from(self.graph[n].policy.priority_weight);
                    }
                }
                sum
            }
        };

        Some(own + related)
    }

    /// Graphviz rendering, left to right, one node per task.
    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("digraph \"{}\" {{\n", self.dag.dag_id));
        out.push_str("    rankdir=LR;\n");
        for node in self.tasks() {
            out.push_str(&format!(
                "    \"{}\" [label=\"{}\\n{:?}\"];\n",
                node.id,
                node.id,
                node.role()
            ));
        }
        for edge in self.graph.raw_edges() {
            out.push_str(&format!(
                "    \"{}\" -> \"{}\";\n",
                self.graph[edge.source()].id,
                self.graph[edge.target()].id
            ));
        }
        out.push_str("}\n");
        out
    }

    fn node_index(&self, id: &str) -> Result<NodeIndex> {
        self.index.get(id).copied().ok_or_else(|| {
            PaperboyError::ValidationError(format!(
                "{}: unknown task '{}'",
                self.dag.dag_id, id
            ))
        })
    }

    fn neighbors(&self, id: &str, dir: Direction) -> Vec<&TaskId> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };
        let mut found: Vec<NodeIndex> = self.graph.neighbors_directed(idx, dir).collect();
        found.sort();
        found.into_iter().map(|n| &self.graph[n].id).collect()
    }
}
