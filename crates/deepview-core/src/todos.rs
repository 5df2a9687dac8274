use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    Pending,
    InProgress,
    Completed,
}

impl TodoStatus {
    pub const ALL: [TodoStatus; 3] = [Self::Pending, Self::InProgress, Self::Completed];

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            Self::Pending => "○",
            Self::InProgress => "◔",
            Self::Completed => "✓",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub content: String,
    pub status: TodoStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoGroup<'a> {
    pub status: TodoStatus,
    pub label: &'static str,
    pub items: Vec<&'a TodoItem>,
}

/// Always three groups, pending first. Items keep their input order.
pub fn group_todos(todos: &[TodoItem]) -> Vec<TodoGroup<'_>> {
    TodoStatus::ALL
        .into_iter()
        .map(|status| TodoGroup {
            status,
            label: status.label(),
            items: todos.iter().filter(|todo| todo.status == status).collect(),
        })
        .collect()
}
