//! Sequential execution plans
//!
//! Sheet creation in the remote engine is not observable until the creating
//! command has returned, so a document compiles to a list of tasks that must
//! run one after another. Each task receives the accumulator returned by the
//! previous one: the list of resolved sheet names.

use serde_json::Value;

use crate::codec::js_string;

/// Prologue shared by every task body
const ACCUMULATOR: &str = "var args = arguments[0] || [];";

/// What a task does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    /// Append the name of the active sheet
    ActiveSheet,
    /// Create the sheet if missing, then append its name
    EnsureSheet(String),
    /// Replay every sheet's instructions against the accumulated names
    Replay { sheets: usize },
}

/// One step of a [`Plan`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    kind: TaskKind,
    body: String,
}

impl Task {
    pub(crate) fn active_sheet() -> Self {
        Self {
            kind: TaskKind::ActiveSheet,
            body: format!(
                "function(){{{}args.push(Api.GetActiveSheet().GetName());return args;}}",
                ACCUMULATOR
            ),
        }
    }

    pub(crate) fn ensure_sheet(name: &str) -> Self {
        let quoted = js_string(name);
        Self {
            kind: TaskKind::EnsureSheet(name.to_string()),
            body: format!(
                "function(){{{}if(!Api.GetSheet({q})){{Api.AddSheet({q});}}args.push({q});return args;}}",
                ACCUMULATOR,
                q = quoted
            ),
        }
    }

    /// Replay task over compiled sheet functions, in declaration order
    pub(crate) fn replay(sheet_bodies: &[String]) -> Self {
        let calls: String = sheet_bodies
            .iter()
            .enumerate()
            .map(|(i, body)| format!("({})(Api.GetSheet(args[{}]));", body, i))
            .collect();
        Self {
            kind: TaskKind::Replay {
                sheets: sheet_bodies.len(),
            },
            body: format!("function(){{{}{}return args;}}", ACCUMULATOR, calls),
        }
    }

    pub fn kind(&self) -> &TaskKind {
        &self.kind
    }

    /// Function source of the task
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Command text calling the task with the previous accumulator
    pub fn invoke(&self, accumulator: Option<&Value>) -> String {
        match accumulator {
            Some(acc) => format!("({})({})", self.body, acc),
            None => format!("({})()", self.body),
        }
    }
}

/// Ordered list of tasks; task `i + 1` must not start before task `i` settled
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Plan {
    tasks: Vec<Task>,
}

impl Plan {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }
}

impl IntoIterator for Plan {
    type Item = Task;
    type IntoIter = std::vec::IntoIter<Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.into_iter()
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_ensure_sheet_body() {
        let task = Task::ensure_sheet("Q1");
        assert_eq!(task.kind(), &TaskKind::EnsureSheet("Q1".to_string()));
        assert_eq!(
            task.body(),
            "function(){var args = arguments[0] || [];\
             if(!Api.GetSheet(\"Q1\")){Api.AddSheet(\"Q1\");}args.push(\"Q1\");return args;}"
        );
    }

    #[test]
    fn test_invoke_threads_accumulator() {
        let task = Task::active_sheet();
        assert!(task.invoke(None).ends_with("})()"));
        let acc = json!(["Sheet1", "Q1"]);
        assert!(task.invoke(Some(&acc)).ends_with(r#"})(["Sheet1","Q1"])"#));
    }

    #[test]
    fn test_replay_calls_each_sheet_in_order() {
        let task = Task::replay(&["function(sheet){a}".to_string(), "function(sheet){b}".to_string()]);
        assert_eq!(task.kind(), &TaskKind::Replay { sheets: 2 });
        assert_eq!(
            task.body(),
            "function(){var args = arguments[0] || [];\
             (function(sheet){a})(Api.GetSheet(args[0]));\
             (function(sheet){b})(Api.GetSheet(args[1]));return args;}"
        );
    }
}
