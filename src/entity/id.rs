use std::fmt;

use serde::{Deserialize, Serialize};

/// Client-minted placeholder for an entity the server has not acknowledged yet.
///
/// Tokens are only meaningful inside the buffer that minted them. The `new-<n>`
/// rendering is for logs; nothing ever parses it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TempId(u64);

impl TempId {
    pub fn token(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TempId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "new-{}", self.0)
    }
}

/// Mints fresh temporary ids, one counter per buffer.
#[derive(Debug, Default)]
pub struct TempIdGenerator {
    next: u64,
}

impl TempIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> TempId {
        self.next += 1;
        TempId(self.next)
    }
}

/// Identity of a buffered product or variant.
///
/// `Temporary` ids live only in the buffer and get resolved to a
/// `Persisted` id by the commit engine. The two namespaces cannot collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum EntityId {
    Temporary(TempId),
    Persisted(String),
}

impl EntityId {
    pub fn persisted(id: impl Into<String>) -> Self {
        EntityId::Persisted(id.into())
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self, EntityId::Temporary(_))
    }

    /// The server id, if this entity has one.
    pub fn as_persisted(&self) -> Option<&str> {
        match self {
            EntityId::Persisted(id) => Some(id),
            EntityId::Temporary(_) => None,
        }
    }

    pub fn as_temporary(&self) -> Option<TempId> {
        match self {
            EntityId::Temporary(temp) => Some(*temp),
            EntityId::Persisted(_) => None,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Temporary(temp) => temp.fmt(f),
            EntityId::Persisted(id) => f.write_str(id),
        }
    }
}

impl From<TempId> for EntityId {
    fn from(temp: TempId) -> Self {
        EntityId::Temporary(temp)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        EntityId::Persisted(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        EntityId::Persisted(id)
    }
}
