//! ============================================================================
//! Directory Types - Profiles, viewers, cursors and error taxonomy
//! ============================================================================

use serde::{Deserialize, Serialize};

/// Image shown on a card when a profile has no images of its own
pub const DEFAULT_PROFILE_IMAGE: &str = "https://imgs.search.brave.com/VneMoX7Cl7XDPD7DguYtmdLDfVBIwtaLV6fbnFx77Jc/rs:fit:860:0:0:0/g:ce/aHR0cHM6Ly90NC5m/dGNkbi5uZXQvanBn/LzEwLzU0LzA5LzI3/LzM2MF9GXzEwNTQw/OTI3ODBfbGlPYllR/bzEwUG4yeE9vNENt/R1laTWVXaXcwUDdD/VDIuanBn";

/// Occupation shown on a card when a profile leaves it blank
pub const DEFAULT_OCCUPATION: &str = "Professional";

// ============================================================================
// Profiles
// ============================================================================

/// A member profile as stored in the backing store.
/// The controller never mutates these; they are passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// Stable unique record id
    pub id: String,
    pub full_name: String,
    #[serde(default)]
    pub occupation: Option<String>,
    /// Ordered image references, the first one is the cover
    #[serde(default)]
    pub profile_images: Vec<String>,
    /// Identity of the account that owns this profile
    #[serde(default)]
    pub uid: Option<String>,
}

impl ProfileRecord {
    pub fn new(id: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            full_name: full_name.into(),
            occupation: None,
            profile_images: Vec::new(),
            uid: None,
        }
    }

    pub fn with_owner(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    pub fn with_occupation(mut self, occupation: impl Into<String>) -> Self {
        self.occupation = Some(occupation.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.profile_images.push(image.into());
        self
    }

    /// True when this record belongs to the given identity
    pub fn is_owned_by(&self, identity: &str) -> bool {
        self.uid.as_deref() == Some(identity)
    }

    /// Occupation for display, falling back to a generic title
    pub fn display_occupation(&self) -> &str {
        match self.occupation.as_deref() {
            Some(o) if !o.trim().is_empty() => o,
            _ => DEFAULT_OCCUPATION,
        }
    }

    /// Cover image for display, falling back to the placeholder
    pub fn cover_image(&self) -> &str {
        self.profile_images
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_PROFILE_IMAGE)
    }

    /// Route of the full profile page for this record
    pub fn profile_path(&self) -> String {
        format!("/profile/{}", self.id)
    }
}

// ============================================================================
// Viewer
// ============================================================================

/// Who is looking at the directory.
/// Supplied by the session provider; the controller only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Viewer {
    #[default]
    Anonymous,
    Authenticated { identity: String },
}

impl Viewer {
    pub fn authenticated(identity: impl Into<String>) -> Self {
        Viewer::Authenticated {
            identity: identity.into(),
        }
    }

    /// Identity token, absent for guests
    pub fn identity(&self) -> Option<&str> {
        match self {
            Viewer::Anonymous => None,
            Viewer::Authenticated { identity } => Some(identity),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Viewer::Authenticated { .. })
    }
}

impl std::fmt::Display for Viewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Viewer::Anonymous => write!(f, "guest"),
            Viewer::Authenticated { identity } => write!(f, "member:{}", identity),
        }
    }
}

// ============================================================================
// Paging
// ============================================================================

/// Opaque continuation token: a position in store order.
///
/// Positions are issued by the store that served the page and stay valid
/// when the record at that position is later removed. Only store
/// implementations look inside, through [`Cursor::position`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(position: impl Into<String>) -> Self {
        Cursor(position.into())
    }

    /// Store-facing position key
    pub fn position(&self) -> &str {
        &self.0
    }
}

/// Kind of page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// First page on mount or after a viewer change, never gated
    Initial,
    /// "Show more" gesture, always gated
    LoadMore,
}

// ============================================================================
// Errors
// ============================================================================

/// Errors raised by a backing profile store
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Unknown cursor position: {0}")]
    UnknownCursor(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Record codec error: {0}")]
    Codec(String),
}

impl StoreError {
    /// Network/availability failures a later gesture may recover from
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// Errors reported by the page fetcher
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Fetch failed: {0}")]
    FetchFailed(#[from] StoreError),
}

impl FetchError {
    /// Whether repeating the same gesture later may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::FetchFailed(e) => e.is_transient(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_fallbacks() {
        let bare = ProfileRecord::new("p1", "Asha Rao");
        assert_eq!(bare.display_occupation(), DEFAULT_OCCUPATION);
        assert_eq!(bare.cover_image(), DEFAULT_PROFILE_IMAGE);

        let blank = ProfileRecord::new("p2", "Ravi").with_occupation("  ");
        assert_eq!(blank.display_occupation(), DEFAULT_OCCUPATION);

        let full = ProfileRecord::new("p3", "Meera")
            .with_occupation("Architect")
            .with_image("https://cdn.example/a.jpg")
            .with_image("https://cdn.example/b.jpg");
        assert_eq!(full.display_occupation(), "Architect");
        assert_eq!(full.cover_image(), "https://cdn.example/a.jpg");
        assert_eq!(full.profile_path(), "/profile/p3");
    }

    #[test]
    fn test_ownership() {
        let record = ProfileRecord::new("p1", "Asha").with_owner("uid-1");
        assert!(record.is_owned_by("uid-1"));
        assert!(!record.is_owned_by("uid-2"));
        assert!(!ProfileRecord::new("p2", "Ravi").is_owned_by("uid-1"));
    }

    #[test]
    fn test_viewer_identity() {
        assert_eq!(Viewer::Anonymous.identity(), None);
        assert!(!Viewer::default().is_authenticated());

        let member = Viewer::authenticated("uid-9");
        assert_eq!(member.identity(), Some("uid-9"));
        assert!(member.is_authenticated());
        assert_eq!(member.to_string(), "member:uid-9");
    }

    #[test]
    fn test_cursor_is_opaque_position() {
        let cursor = Cursor::new("42");
        assert_eq!(cursor.position(), "42");
        assert_eq!(cursor, Cursor::new(String::from("42")));
    }

    #[test]
    fn test_error_classification() {
        assert!(StoreError::Unavailable("timeout".into()).is_transient());
        assert!(!StoreError::UnknownCursor("x".into()).is_transient());
        assert!(!StoreError::Storage("disk".into()).is_transient());

        let err: FetchError = StoreError::Unavailable("offline".into()).into();
        assert!(err.to_string().contains("offline"));
        assert!(err.is_transient());
        assert!(!FetchError::from(StoreError::Codec("bad bytes".into())).is_transient());
    }

    #[test]
    fn test_profile_json_defaults() {
        let record: ProfileRecord =
            serde_json::from_str(r#"{"id":"p1","full_name":"Asha"}"#).unwrap();
        assert_eq!(record.occupation, None);
        assert!(record.profile_images.is_empty());
        assert_eq!(record.uid, None);
    }
}
