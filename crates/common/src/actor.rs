//! Audit identity threaded through every mutation.

/// Audit stamp used when no caller identity is available.
pub const SYSTEM_ACTOR: &str = "system";

/// The identity performing a mutation, recorded in `createdBy`/`updatedBy`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Actor(Option<String>);

impl Actor {
    /// The anonymous system actor.
    pub fn system() -> Self {
        Self(None)
    }

    /// An identified caller. Blank identifiers fall back to the system actor.
    pub fn user(id: impl Into<String>) -> Self {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            Self(None)
        } else {
            Self(Some(trimmed.to_string()))
        }
    }

    /// Returns the value written to the audit fields.
    pub fn stamp(&self) -> &str {
        self.0.as_deref().unwrap_or(SYSTEM_ACTOR)
    }

    pub fn is_system(&self) -> bool {
        self.0.is_none()
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.stamp())
    }
}
