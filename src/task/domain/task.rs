//! Task aggregate root and its assignment state.

use super::{DeadlineInput, TaskDomainError, TaskId};
use crate::user::domain::{User, UserId};
use crate::timestamp::truncate_to_millis;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Name snapshot stored on tasks with no assigned user.
pub const UNASSIGNED_NAME: &str = "unassigned";

/// Assignment state of a task.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Assignment {
    /// No user is responsible for the task.
    #[default]
    Unassigned,
    /// The task is assigned to a user.
    Assigned {
        /// Assigned user identifier.
        user_id: UserId,
        /// Snapshot of the user's name at assignment time.
        user_name: String,
    },
}

impl Assignment {
    /// Builds an assignment to the given user, snapshotting their name.
    #[must_use]
    pub fn to_user(user: &User) -> Self {
        Self::Assigned {
            user_id: user.id(),
            user_name: user.name().to_owned(),
        }
    }

    /// Returns the assigned user, if any.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Unassigned => None,
            Self::Assigned { user_id, .. } => Some(*user_id),
        }
    }

    /// Returns the wire value of `assignedUser` (empty when unassigned).
    #[must_use]
    pub fn user_field(&self) -> String {
        self.user_id().map(|id| id.to_string()).unwrap_or_default()
    }

    /// Returns the wire value of `assignedUserName`.
    #[must_use]
    pub fn user_name(&self) -> &str {
        match self {
            Self::Unassigned => UNASSIGNED_NAME,
            Self::Assigned { user_name, .. } => user_name,
        }
    }
}

/// Validated client-writable fields of a task, excluding the assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDetails {
    name: String,
    description: String,
    deadline: DateTime<Utc>,
    completed: bool,
}

impl TaskDetails {
    /// Validates raw task fields. Absent optional fields take their defaults
    /// (empty description, not completed).
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::MissingName`] or
    /// [`TaskDomainError::MissingDeadline`] when a required field is absent,
    /// and [`TaskDomainError::InvalidDeadline`] when the deadline cannot be
    /// interpreted.
    pub fn new(
        name: Option<String>,
        description: Option<String>,
        deadline: Option<&DeadlineInput>,
        completed: Option<bool>,
    ) -> Result<Self, TaskDomainError> {
        let required_name = name
            .filter(|value| !value.trim().is_empty())
            .ok_or(TaskDomainError::MissingName)?;
        let resolved_deadline = deadline
            .ok_or(TaskDomainError::MissingDeadline)?
            .resolve()?;

        Ok(Self {
            name: required_name,
            description: description.unwrap_or_default(),
            deadline: resolved_deadline,
            completed: completed.unwrap_or(false),
        })
    }

    /// Returns the task name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the resolved deadline.
    #[must_use]
    pub const fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "TaskDocument", try_from = "TaskDocument")]
pub struct Task {
    id: TaskId,
    name: String,
    description: String,
    deadline: DateTime<Utc>,
    completed: bool,
    assignment: Assignment,
    date_created: DateTime<Utc>,
}

impl Task {
    /// Creates a new task.
    #[must_use]
    pub fn new(details: TaskDetails, assignment: Assignment, clock: &impl Clock) -> Self {
        Self {
            id: TaskId::new(),
            name: details.name,
            description: details.description,
            deadline: details.deadline,
            completed: details.completed,
            assignment,
            date_created: truncate_to_millis(clock.utc()),
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description (empty when none was given).
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the deadline.
    #[must_use]
    pub const fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    /// Returns whether the task is completed.
    #[must_use]
    pub const fn completed(&self) -> bool {
        self.completed
    }

    /// Returns the assignment state.
    #[must_use]
    pub const fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn date_created(&self) -> DateTime<Utc> {
        self.date_created
    }

    /// Overwrites every writable field and the assignment; the identifier
    /// and creation time are kept.
    pub fn replace(&mut self, details: TaskDetails, assignment: Assignment) {
        self.name = details.name;
        self.description = details.description;
        self.deadline = details.deadline;
        self.completed = details.completed;
        self.assignment = assignment;
    }

    /// Sets the assignment without touching other fields.
    pub fn set_assignment(&mut self, assignment: Assignment) {
        self.assignment = assignment;
    }
}

/// Flat wire and storage representation of a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskDocument {
    #[serde(rename = "_id")]
    id: TaskId,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(with = "crate::timestamp")]
    deadline: DateTime<Utc>,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    assigned_user: String,
    #[serde(default)]
    assigned_user_name: String,
    #[serde(with = "crate::timestamp")]
    date_created: DateTime<Utc>,
}

impl From<Task> for TaskDocument {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            assigned_user: task.assignment.user_field(),
            assigned_user_name: task.assignment.user_name().to_owned(),
            name: task.name,
            description: task.description,
            deadline: task.deadline,
            completed: task.completed,
            date_created: task.date_created,
        }
    }
}

impl TryFrom<TaskDocument> for Task {
    type Error = TaskDomainError;

    fn try_from(document: TaskDocument) -> Result<Self, Self::Error> {
        let assignment = if document.assigned_user.is_empty() {
            Assignment::Unassigned
        } else {
            let user_id = document
                .assigned_user
                .parse::<UserId>()
                .map_err(|_| TaskDomainError::InvalidAssignedUser(document.assigned_user.clone()))?;
            Assignment::Assigned {
                user_id,
                user_name: document.assigned_user_name,
            }
        };

        Ok(Self {
            id: document.id,
            name: document.name,
            description: document.description,
            deadline: document.deadline,
            completed: document.completed,
            assignment,
            date_created: document.date_created,
        })
    }
}
