//! Filter, sort and search state behind the task list screen.
//!
//! # Responsibility
//! - Define the filter and sort choices offered to the user.
//! - Derive the visible list from a snapshot of loaded tasks.
//!
//! # Invariants
//! - Sorting is stable; ties keep snapshot order.
//! - `All` + `Default` shows the snapshot exactly as loaded (storage order).
//! - Search always runs over the whole snapshot, ignoring the active filter.

use crate::model::plural::tasks_count_label;
use crate::model::task::Task;
use crate::service::task_service::search_in;
use std::cmp::Reverse;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Completion filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskFilter {
    #[default]
    All,
    Completed,
    NotCompleted,
}

impl TaskFilter {
    pub const ALL: [TaskFilter; 3] = [Self::All, Self::Completed, Self::NotCompleted];

    /// User-facing label.
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "Все",
            Self::Completed => "Выполненные",
            Self::NotCompleted => "Не выполненные",
        }
    }

    /// Stable machine name, accepted back by `FromStr`.
    pub fn slug(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Completed => "completed",
            Self::NotCompleted => "not-completed",
        }
    }

    pub fn accepts(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Completed => task.is_completed,
            Self::NotCompleted => !task.is_completed,
        }
    }
}

impl Display for TaskFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for TaskFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|filter| filter.slug() == normalized)
            .ok_or_else(|| {
                format!("unknown filter `{value}`; expected all|completed|not-completed")
            })
    }
}

/// Ordering choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskSort {
    CompletedFirst,
    NotCompletedFirst,
    /// Newest first.
    #[default]
    Default,
}

impl TaskSort {
    pub const ALL: [TaskSort; 3] = [Self::CompletedFirst, Self::NotCompletedFirst, Self::Default];

    pub fn label(self) -> &'static str {
        match self {
            Self::CompletedFirst => "Сначала выполненные",
            Self::NotCompletedFirst => "Сначала невыполненные",
            Self::Default => "По умолчанию",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Self::CompletedFirst => "completed-first",
            Self::NotCompletedFirst => "not-completed-first",
            Self::Default => "default",
        }
    }
}

impl Display for TaskSort {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for TaskSort {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|sort| sort.slug() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown sort `{value}`; expected default|completed-first|not-completed-first"
                )
            })
    }
}

pub fn filter_tasks(tasks: &[Task], filter: TaskFilter) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| filter.accepts(task))
        .cloned()
        .collect()
}

pub fn sort_tasks(tasks: &mut [Task], sort: TaskSort) {
    match sort {
        TaskSort::Default => tasks.sort_by_key(|task| Reverse(task.created_at)),
        // `false < true`, so reversing the flag puts completed tasks first.
        TaskSort::CompletedFirst => {
            tasks.sort_by_key(|task| (Reverse(task.is_completed), Reverse(task.created_at)))
        }
        TaskSort::NotCompletedFirst => {
            tasks.sort_by_key(|task| (task.is_completed, Reverse(task.created_at)))
        }
    }
}

/// Current list state: chosen filter and sort over a loaded snapshot.
#[derive(Debug, Clone, Default)]
pub struct TaskListView {
    filter: TaskFilter,
    sort: TaskSort,
    snapshot: Vec<Task>,
}

impl TaskListView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the snapshot, keeping filter and sort.
    pub fn reload(&mut self, tasks: Vec<Task>) {
        self.snapshot = tasks;
    }

    pub fn set_filter(&mut self, filter: TaskFilter) {
        self.filter = filter;
    }

    pub fn set_sort(&mut self, sort: TaskSort) {
        self.sort = sort;
    }

    pub fn filter(&self) -> TaskFilter {
        self.filter
    }

    pub fn sort(&self) -> TaskSort {
        self.sort
    }

    pub fn snapshot(&self) -> &[Task] {
        &self.snapshot
    }

    pub fn is_pristine(&self) -> bool {
        self.filter == TaskFilter::All && self.sort == TaskSort::Default
    }

    /// Tasks to show with the current filter and sort.
    pub fn visible(&self) -> Vec<Task> {
        if self.is_pristine() {
            return self.snapshot.clone();
        }

        let mut tasks = filter_tasks(&self.snapshot, self.filter);
        sort_tasks(&mut tasks, self.sort);
        tasks
    }

    /// Matches across every loaded task; a blank query falls back to
    /// [`Self::visible`].
    pub fn search(&self, query: &str) -> Vec<Task> {
        if query.trim().is_empty() {
            return self.visible();
        }
        search_in(self.snapshot.clone(), query)
    }

    /// Like [`Self::search`] but only over locally created tasks.
    pub fn search_local(&self, query: &str) -> Vec<Task> {
        if query.trim().is_empty() {
            return self.visible();
        }
        let local = self
            .snapshot
            .iter()
            .filter(|task| task.is_local())
            .cloned()
            .collect();
        search_in(local, query)
    }

    /// Footer text such as `"5 задач"` for `count` shown tasks.
    pub fn count_label(count: usize) -> String {
        tasks_count_label(i64::try_from(count).unwrap_or(i64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::{filter_tasks, sort_tasks, TaskFilter, TaskListView, TaskSort};
    use crate::model::task::Task;

    fn task(title: &str, completed: bool, created_at: i64) -> Task {
        let mut task = Task::new(title, None);
        task.is_completed = completed;
        task.created_at = created_at;
        task
    }

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|task| task.title.as_str()).collect()
    }

    fn sample() -> Vec<Task> {
        vec![
            task("old-open", false, 100),
            task("new-done", true, 400),
            task("mid-open", false, 300),
            task("old-done", true, 200),
        ]
    }

    #[test]
    fn filters_by_completion() {
        let tasks = sample();
        assert_eq!(filter_tasks(&tasks, TaskFilter::All).len(), 4);
        assert_eq!(
            titles(&filter_tasks(&tasks, TaskFilter::Completed)),
            ["new-done", "old-done"]
        );
        assert_eq!(
            titles(&filter_tasks(&tasks, TaskFilter::NotCompleted)),
            ["old-open", "mid-open"]
        );
    }

    #[test]
    fn sorts_by_completion_group_then_newest() {
        let mut tasks = sample();
        sort_tasks(&mut tasks, TaskSort::Default);
        assert_eq!(titles(&tasks), ["new-done", "mid-open", "old-done", "old-open"]);

        sort_tasks(&mut tasks, TaskSort::CompletedFirst);
        assert_eq!(titles(&tasks), ["new-done", "old-done", "mid-open", "old-open"]);

        sort_tasks(&mut tasks, TaskSort::NotCompletedFirst);
        assert_eq!(titles(&tasks), ["mid-open", "old-open", "new-done", "old-done"]);
    }

    #[test]
    fn pristine_view_keeps_snapshot_order() {
        let mut view = TaskListView::new();
        view.reload(sample());
        assert_eq!(
            titles(&view.visible()),
            ["old-open", "new-done", "mid-open", "old-done"]
        );

        view.set_filter(TaskFilter::All);
        view.set_sort(TaskSort::Default);
        assert!(view.is_pristine());
    }

    #[test]
    fn filtered_view_applies_default_sort() {
        let mut view = TaskListView::new();
        view.reload(sample());
        view.set_filter(TaskFilter::NotCompleted);
        assert_eq!(titles(&view.visible()), ["mid-open", "old-open"]);
    }

    #[test]
    fn search_ignores_filter_and_blank_query_restores_view() {
        let mut view = TaskListView::new();
        view.reload(sample());
        view.set_filter(TaskFilter::Completed);

        assert_eq!(titles(&view.search("OPEN")), ["old-open", "mid-open"]);
        assert_eq!(titles(&view.search("  ")), ["new-done", "old-done"]);
    }

    #[test]
    fn local_search_skips_remote_tasks() {
        let mut tasks = sample();
        tasks[0].server_id = 7;
        let mut view = TaskListView::new();
        view.reload(tasks);

        assert_eq!(titles(&view.search_local("open")), ["mid-open"]);
    }

    #[test]
    fn parses_slugs() {
        assert_eq!(
            "Not-Completed".parse::<TaskFilter>(),
            Ok(TaskFilter::NotCompleted)
        );
        assert_eq!(
            "completed-first".parse::<TaskSort>(),
            Ok(TaskSort::CompletedFirst)
        );
        assert!("newest".parse::<TaskSort>().is_err());
    }

    #[test]
    fn count_label_is_pluralized() {
        assert_eq!(TaskListView::count_label(1), "1 задача");
        assert_eq!(TaskListView::count_label(24), "24 задачи");
    }
}
