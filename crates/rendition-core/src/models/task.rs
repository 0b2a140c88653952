use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Waiting,
    Running,
    Success,
    Error,
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            TaskStatus::Waiting => write!(f, "waiting"),
            TaskStatus::Running => write!(f, "running"),
            TaskStatus::Success => write!(f, "success"),
            TaskStatus::Error => write!(f, "error"),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(TaskStatus::Waiting),
            "running" => Ok(TaskStatus::Running),
            "success" => Ok(TaskStatus::Success),
            "error" => Ok(TaskStatus::Error),
            _ => Err(anyhow::anyhow!("Invalid task status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Task {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            status: TaskStatus::Waiting,
            error: None,
        }
    }

    /// Applies a partial update: only fields named in `patch.fields` change.
    pub fn apply(&mut self, patch: &TaskPatch) {
        for field in &patch.fields {
            match field {
                TaskField::Name => {
                    if let Some(name) = &patch.name {
                        self.name = name.clone();
                    }
                }
                TaskField::Status => {
                    if let Some(status) = patch.status {
                        self.status = status;
                    }
                }
                TaskField::Error => self.error = patch.error.clone(),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskField {
    Name,
    Status,
    Error,
}

/// Partial update for a Task. Fields not listed in `fields` are left untouched
/// by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    pub fields: Vec<TaskField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            fields: vec![TaskField::Name],
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn status(status: TaskStatus) -> Self {
        Self {
            fields: vec![TaskField::Status],
            status: Some(status),
            ..Default::default()
        }
    }

    /// Status `error` together with the error text.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            fields: vec![TaskField::Status, TaskField::Error],
            status: Some(TaskStatus::Error),
            error: Some(error.into()),
            ..Default::default()
        }
    }
}
