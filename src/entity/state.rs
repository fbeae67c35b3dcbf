use serde::{Deserialize, Serialize};

/// Dirty state of a buffered entity.
///
/// Replaces the loose `isNew / isEdited / isDeleted` flags with one value per
/// entity. The flag view is still available through the `is_*` accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum EditState {
    /// Hydrated from the server, untouched.
    #[default]
    Unmodified,
    /// Added in the buffer, not yet known to the server.
    Created,
    /// Server entity with local field edits.
    Modified,
    /// Server entity marked for deletion. `edited` records whether local
    /// edits happened before or after the delete mark.
    Deleted { edited: bool },
    /// Added in the buffer, then deleted. Never reaches the server.
    CreatedThenDeleted,
}

impl EditState {
    /// State after a field edit.
    pub fn edited(self) -> Self {
        match self {
            EditState::Unmodified => EditState::Modified,
            EditState::Deleted { .. } => EditState::Deleted { edited: true },
            other => other,
        }
    }

    /// State after a delete request.
    pub fn deleted(self) -> Self {
        match self {
            EditState::Unmodified => EditState::Deleted { edited: false },
            EditState::Modified => EditState::Deleted { edited: true },
            EditState::Created => EditState::CreatedThenDeleted,
            other => other,
        }
    }

    /// State after a cheap, local undo. Only an unedited delete mark can be
    /// lifted without asking the server for the canonical record.
    pub fn restored(self) -> Option<Self> {
        match self {
            EditState::Deleted { edited: false } => Some(EditState::Unmodified),
            _ => None,
        }
    }

    pub fn is_new(self) -> bool {
        matches!(self, EditState::Created | EditState::CreatedThenDeleted)
    }

    pub fn is_edited(self) -> bool {
        matches!(
            self,
            EditState::Created
                | EditState::Modified
                | EditState::Deleted { edited: true }
                | EditState::CreatedThenDeleted
        )
    }

    pub fn is_deleted(self) -> bool {
        matches!(
            self,
            EditState::Deleted { .. } | EditState::CreatedThenDeleted
        )
    }

    pub fn is_dirty(self) -> bool {
        self != EditState::Unmodified
    }

    /// Needs a create call: new and still wanted.
    pub fn needs_create(self) -> bool {
        self == EditState::Created
    }

    /// Needs an update call: existing, edited, not deleted.
    pub fn needs_update(self) -> bool {
        self == EditState::Modified
    }

    /// Needs a delete call: existing and marked deleted.
    pub fn needs_delete(self) -> bool {
        matches!(self, EditState::Deleted { .. })
    }
}
