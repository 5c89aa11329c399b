use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::error::WizardError;
use crate::stations::{GeoPoint, StationRecord};
use crate::wizard::DeliveryMethod;

/// Steps of the usability test, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    #[serde(rename = "intro")]
    Intro,
    #[serde(rename = "Task 1")]
    Task1,
    #[serde(rename = "Task 2")]
    Task2,
    #[serde(rename = "Task 3")]
    Task3,
    Feedback,
    #[serde(rename = "Thank You")]
    ThankYou,
}

impl Step {
    /// Whether `to` is reachable from this step in one move.
    ///
    /// All edges are forward except Task 2 → Task 1 ("Back to Search").
    pub fn can_transition_to(self, to: Step) -> bool {
        use Step::*;

        matches!(
            (self, to),
            (Intro, Task1)
                | (Task1, Task2)
                | (Task2, Task1)
                | (Task2, Task3)
                | (Task3, Feedback)
                | (Feedback, ThankYou)
        )
    }

    /// The timed task that runs during this step, if any
    pub fn task(self) -> Option<Task> {
        match self {
            Step::Task1 => Some(Task::Search),
            Step::Task2 => Some(Task::Results),
            Step::Task3 => Some(Task::Delivery),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Step::ThankYou
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Intro => "Intro",
            Step::Task1 => "Task 1",
            Step::Task2 => "Task 2",
            Step::Task3 => "Task 3",
            Step::Feedback => "Feedback",
            Step::ThankYou => "Thank You",
        };
        f.write_str(name)
    }
}

/// The three timed tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Task {
    #[serde(rename = "Task 1")]
    Search,
    #[serde(rename = "Task 2")]
    Results,
    #[serde(rename = "Task 3")]
    Delivery,
}

impl Task {
    pub const ALL: [Task; 3] = [Task::Search, Task::Results, Task::Delivery];
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Task::Search => "Task 1",
            Task::Results => "Task 2",
            Task::Delivery => "Task 3",
        };
        f.write_str(name)
    }
}

/// Timing and outcome of one task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub started_at: Option<Timestamp>,
    /// Elapsed seconds; `None` when the task ended without having started
    pub duration_secs: Option<f64>,
    pub success: bool,
}

impl Default for TaskRecord {
    fn default() -> Self {
        TaskRecord {
            started_at: None,
            duration_secs: Some(0.0),
            success: false,
        }
    }
}

/// State of one participant's run through the test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    step: Step,
    tasks: BTreeMap<Task, TaskRecord>,
    results: Option<SearchResults>,
    pub search_location: String,
    pub results_sent: bool,
    /// Channel used by the last successful send
    pub sent_via: Option<DeliveryMethod>,
}

/// Stations and their map points, always from the same search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    pub stations: Vec<StationRecord>,
    pub locations: Vec<GeoPoint>,
}

impl SearchResults {
    pub fn new(stations: Vec<StationRecord>) -> Self {
        let locations = stations.iter().filter_map(StationRecord::location).collect();
        SearchResults {
            stations,
            locations,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Session {
            step: Step::Intro,
            tasks: Task::ALL
                .iter()
                .map(|t| (*t, TaskRecord::default()))
                .collect(),
            results: None,
            search_location: String::new(),
            results_sent: false,
            sent_via: None,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    /// Move to `to` if the step table allows it.
    ///
    /// Entering a task step starts its timer unless it already has one.
    pub fn transition(&mut self, to: Step) -> Result<(), WizardError> {
        if !self.step.can_transition_to(to) {
            return Err(WizardError::InvalidTransition {
                from: self.step,
                to,
            });
        }

        debug!("Step {} -> {}", self.step, to);
        self.step = to;

        if let Some(task) = to.task() {
            if self.task(task).started_at.is_none() {
                self.mark_task_start(task);
            }
        }

        Ok(())
    }

    pub fn task(&self, task: Task) -> &TaskRecord {
        // Every task is inserted by `new` and never removed
        &self.tasks[&task]
    }

    fn task_mut(&mut self, task: Task) -> &mut TaskRecord {
        self.tasks.entry(task).or_default()
    }

    pub fn mark_task_start(&mut self, task: Task) {
        self.task_mut(task).started_at = Some(Timestamp::now());
    }

    /// Record the elapsed time since the task started
    pub fn mark_task_end(&mut self, task: Task) {
        let now = Timestamp::now();
        let record = self.task_mut(task);
        record.duration_secs = record
            .started_at
            .map(|start| now.duration_since(start).as_secs_f64());
        debug!("{} ended after {:?}s", task, record.duration_secs);
    }

    pub fn set_success(&mut self, task: Task, success: bool) {
        self.task_mut(task).success = success;
    }

    pub fn durations(&self) -> [Option<f64>; 3] {
        Task::ALL.map(|t| self.task(t).duration_secs)
    }

    pub fn successes(&self) -> [bool; 3] {
        Task::ALL.map(|t| self.task(t).success)
    }

    pub fn results(&self) -> Option<&SearchResults> {
        self.results.as_ref()
    }

    /// Replace stored results with those of a new search
    pub fn store_results(&mut self, location: &str, stations: Vec<StationRecord>) {
        self.results = Some(SearchResults::new(stations));
        self.search_location = location.to_string();
    }

    pub fn clear_results(&mut self) {
        self.results = None;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
