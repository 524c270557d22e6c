use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::dag::graph::TaskGraph;
use crate::dag::scheduler_step::SchedulerStep;
use crate::dag::task::TaskId;
use crate::dag::task_info::{ScheduledTask, TaskOutcome, TaskRunState};
use crate::types::TriggerRule;

/// Readiness tracker for one run of a [`TaskGraph`].
///
/// It is responsible for:
/// - handing out the tasks whose trigger rules are satisfied
/// - re-dispatching failed tasks while their retry policy allows
/// - marking dependents `UpstreamFailed` when a required upstream failed
/// - noticing when every task is terminal
///
/// It never runs anything, sleeps or spawns threads; retry delays are
/// returned to the caller in [`ScheduledTask::delay`].
#[derive(Debug)]
pub struct Scheduler<'g> {
    graph: &'g TaskGraph,
    states: HashMap<TaskId, TaskRunState>,
    /// Attempts dispatched so far, per task.
    attempts: HashMap<TaskId, u32>,
    started: bool,
    finished: bool,
}

impl<'g> Scheduler<'g> {
    pub fn new(graph: &'g TaskGraph) -> Self {
        let states = graph
            .task_ids()
            .map(|id| (id.clone(), TaskRunState::Pending))
            .collect();

        Self {
            graph,
            states,
            attempts: HashMap::new(),
            started: false,
            finished: false,
        }
    }

    /// Begin the run: dispatch every task without upstream.
    pub fn start(&mut self) -> SchedulerStep {
        if self.started {
            warn!(dag_id = %self.graph.dag().dag_id, "start called twice; ignoring");
            return SchedulerStep::default();
        }
        self.started = true;

        let mut step = SchedulerStep::default();
        let roots: Vec<TaskId> = self.graph.sources().into_iter().cloned().collect();
        for id in roots {
            self.dispatch(&id, Duration::ZERO, &mut step);
        }
        step.run_just_finished = self.maybe_finish_run();
        step
    }

    /// Report the outcome of a running task; returns the tasks to run next.
    pub fn handle_completion(&mut self, task: &str, outcome: TaskOutcome) -> Vec<ScheduledTask> {
        self.step_completion(task, outcome).newly_scheduled
    }

    /// Manual-step variant of `handle_completion` that returns a rich [`SchedulerStep`].
    pub fn step_completion(&mut self, task: &str, outcome: TaskOutcome) -> SchedulerStep {
        let mut step = SchedulerStep::default();
        let graph = self.graph;

        let Some(node) = graph.task(task) else {
            warn!(task = %task, "completion for unknown task; ignoring");
            return step;
        };
        let id = node.id.clone();

        if self.states.get(task) != Some(&TaskRunState::Running) {
            warn!(task = %task, state = ?self.states.get(task), "completion for task that is not running; ignoring");
            return step;
        }

        match outcome {
            TaskOutcome::Success => {
                self.states.insert(id.clone(), TaskRunState::Success);
                debug!(task = %id, "task succeeded");
            }
            TaskOutcome::Failed => {
                let attempt = self.attempts.get(task).copied().unwrap_or(1);
                if let Some(delay) = node.policy.retry.delay_after_attempt(attempt) {
                    info!(task = %id, attempt, ?delay, "task failed; scheduling retry");
                    self.attempts.insert(id.clone(), attempt + 1);
                    step.newly_scheduled.push(ScheduledTask {
                        task_id: id.clone(),
                        role: node.role(),
                        attempt: attempt + 1,
                        delay,
                    });
                    return step;
                }

                warn!(task = %id, attempt, "task failed; no retries left");
                self.states.insert(id.clone(), TaskRunState::Failed);
                step.newly_failed.push(id.clone());
            }
        }

        self.propagate_from(&id, &mut step);
        step.run_just_finished = self.maybe_finish_run();
        step
    }

    pub fn run_state_of(&self, task: &str) -> Option<TaskRunState> {
        self.states.get(task).copied()
    }

    /// Attempts dispatched for `task` so far (0 if never dispatched).
    pub fn attempts_of(&self, task: &str) -> Option<u32> {
        if !self.graph.contains(task) {
            return None;
        }
        Some(self.attempts.get(task).copied().unwrap_or(0))
    }

    /// Whether every upstream of `task` has finished in a way its trigger
    /// rule accepts. Returns `None` if the task is unknown.
    pub fn deps_satisfied(&self, task: &str) -> Option<bool> {
        let node = self.graph.task(task)?;
        let deps = self.graph.dependencies_of(task);
        let states = deps.iter().map(|d| self.state(d.as_str()));

        Some(match node.policy.trigger_rule {
            TriggerRule::AllSuccess => states.into_iter().all(|s| s == TaskRunState::Success),
            TriggerRule::AllDone => states.into_iter().all(|s| s.is_terminal()),
        })
    }

    /// Tasks that are currently dispatched and not yet reported back.
    pub fn running(&self) -> Vec<&TaskId> {
        self.graph
            .task_ids()
            .filter(|id| self.state(id.as_str()) == TaskRunState::Running)
            .collect()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn state(&self, task: &str) -> TaskRunState {
        self.states.get(task).copied().unwrap_or(TaskRunState::Pending)
    }

    fn dispatch(&mut self, id: &TaskId, delay: Duration, step: &mut SchedulerStep) {
        let graph = self.graph;
        let Some(node) = graph.task(id.as_str()) else {
            return;
        };
        self.states.insert(id.clone(), TaskRunState::Running);
        self.attempts.insert(id.clone(), 1);
        debug!(task = %id, "dispatching task");
        step.newly_scheduled.push(ScheduledTask {
            task_id: id.clone(),
            role: node.role(),
            attempt: 1,
            delay,
        });
    }

    /// Re-evaluate the pending dependents of a task that just became
    /// terminal, following `UpstreamFailed` transitively.
    fn propagate_from(&mut self, finished: &TaskId, step: &mut SchedulerStep) {
        let graph = self.graph;
        let mut worklist = vec![finished.clone()];

        while let Some(current) = worklist.pop() {
            let dependents: Vec<TaskId> = graph
                .dependents_of(current.as_str())
                .into_iter()
                .cloned()
                .collect();

            for dep in dependents {
                if self.state(dep.as_str()) != TaskRunState::Pending {
                    continue;
                }

                let Some(node) = graph.task(dep.as_str()) else {
                    continue;
                };
                let upstream: Vec<TaskRunState> = graph
                    .dependencies_of(dep.as_str())
                    .iter()
                    .map(|u| self.state(u.as_str()))
                    .collect();

                let any_unsuccessful = upstream.iter().any(|s| s.is_unsuccessful());
                let all_terminal = upstream.iter().all(|s| s.is_terminal());

                match node.policy.trigger_rule {
                    TriggerRule::AllSuccess if any_unsuccessful => {
                        debug!(task = %dep, "upstream failed; task will not run");
                        self.states.insert(dep.clone(), TaskRunState::UpstreamFailed);
                        step.newly_failed.push(dep.clone());
                        worklist.push(dep);
                    }
                    _ if all_terminal => self.dispatch(&dep, Duration::ZERO, step),
                    _ => {}
                }
            }
        }
    }

    fn maybe_finish_run(&mut self) -> bool {
        if self.finished || !self.states.values().all(|s| s.is_terminal()) {
            return false;
        }

        info!(dag_id = %self.graph.dag().dag_id, "all tasks terminal; run finished");
        self.finished = true;
        true
    }
}
