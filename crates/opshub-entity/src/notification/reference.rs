//! Polymorphic entity reference.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of entity a notification can point back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefKind {
    /// A project.
    Project,
    /// A task.
    Task,
    /// A comment.
    Comment,
    /// A published project update.
    ProjectUpdate,
}

/// Weak pointer from a notification to the entity that triggered it.
///
/// Existence of the target is not enforced here; deleting the target never
/// cascades to the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    /// The referenced entity's kind.
    pub kind: RefKind,
    /// Opaque identifier of the referenced entity.
    pub id: Uuid,
}

impl EntityRef {
    /// Create a reference to an entity.
    pub fn new(kind: RefKind, id: Uuid) -> Self {
        Self { kind, id }
    }
}
