//! User aggregate and its validated writable profile.

use super::{UserDomainError, UserId};
use crate::task::domain::TaskId;
use crate::timestamp::truncate_to_millis;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Validated client-writable fields of a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    name: String,
    email: String,
    pending_tasks: Vec<TaskId>,
}

impl UserProfile {
    /// Validates raw user fields.
    ///
    /// A missing `pending_tasks` list is treated as empty.
    ///
    /// # Errors
    ///
    /// Returns [`UserDomainError::MissingName`] or
    /// [`UserDomainError::MissingEmail`] when a required field is absent or
    /// blank, and [`UserDomainError::InvalidTaskReference`] when a pending
    /// task entry is not a task identifier.
    pub fn new(
        name: Option<String>,
        email: Option<String>,
        pending_tasks: Option<Vec<String>>,
    ) -> Result<Self, UserDomainError> {
        let required_name = name
            .filter(|value| !value.trim().is_empty())
            .ok_or(UserDomainError::MissingName)?;
        let required_email = email
            .filter(|value| !value.trim().is_empty())
            .ok_or(UserDomainError::MissingEmail)?;

        let mut references: Vec<TaskId> = Vec::new();
        for raw in pending_tasks.unwrap_or_default() {
            let task_id = raw
                .parse::<TaskId>()
                .map_err(|_| UserDomainError::InvalidTaskReference(raw.clone()))?;
            if !references.contains(&task_id) {
                references.push(task_id);
            }
        }

        Ok(Self {
            name: required_name,
            email: required_email,
            pending_tasks: references,
        })
    }

    /// Returns the user name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the pending task references, de-duplicated in input order.
    #[must_use]
    pub fn pending_tasks(&self) -> &[TaskId] {
        &self.pending_tasks
    }
}

/// User aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    id: UserId,
    name: String,
    email: String,
    #[serde(default)]
    pending_tasks: Vec<TaskId>,
    #[serde(with = "crate::timestamp")]
    date_created: DateTime<Utc>,
}

impl User {
    /// Creates a new user from a validated profile.
    #[must_use]
    pub fn new(profile: UserProfile, clock: &impl Clock) -> Self {
        Self {
            id: UserId::new(),
            name: profile.name,
            email: profile.email,
            pending_tasks: profile.pending_tasks,
            date_created: truncate_to_millis(clock.utc()),
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the user name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the tasks currently assigned to this user.
    #[must_use]
    pub fn pending_tasks(&self) -> &[TaskId] {
        &self.pending_tasks
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn date_created(&self) -> DateTime<Utc> {
        self.date_created
    }

    /// Overwrites every writable field; the identifier and creation time are
    /// kept.
    pub fn replace_profile(&mut self, profile: UserProfile) {
        self.name = profile.name;
        self.email = profile.email;
        self.pending_tasks = profile.pending_tasks;
    }

    /// Adds a pending task reference if not already present.
    ///
    /// Returns `true` when the list changed.
    pub fn add_pending_task(&mut self, task_id: TaskId) -> bool {
        if self.pending_tasks.contains(&task_id) {
            return false;
        }
        self.pending_tasks.push(task_id);
        true
    }

    /// Removes every occurrence of a pending task reference.
    ///
    /// Returns `true` when the list changed.
    pub fn remove_pending_task(&mut self, task_id: TaskId) -> bool {
        let before = self.pending_tasks.len();
        self.pending_tasks.retain(|id| *id != task_id);
        before != self.pending_tasks.len()
    }
}
