use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Identity of a clip: its storage path.
///
/// The path is the only stable identifier the backend exposes. Rename is an
/// identity-changing operation, so holders of a `ClipPath` must migrate their
/// keys when a rename is confirmed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ClipPath(pub String);

impl ClipPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identity this path becomes after a rename to `new_name`.
    ///
    /// Mirrors the backend's rename semantics: the final path component is
    /// replaced, everything else stays.
    pub fn renamed(&self, new_name: &str) -> ClipPath {
        match self.0.rfind('/') {
            Some(idx) => ClipPath(format!("{}/{}", &self.0[..idx], new_name)),
            None => ClipPath(new_name.to_string()),
        }
    }
}

impl From<&str> for ClipPath {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ClipPath {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for ClipPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub color: String,
}

/// A recorded clip as the backend reports it.
///
/// The engine holds read-through copies of these plus local optimistic
/// overlays; the backend owns the truth.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClipRecord {
    pub name: String,
    pub path: ClipPath,
    /// Duration in seconds; 0.0 when the container header could not be read.
    pub length: f64,
    pub size: u64,
    pub created_at: DateTime<Local>,
    pub updated_at: DateTime<Local>,
    pub tags: Vec<Tag>,
    pub liked: bool,
}
