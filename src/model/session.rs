//! Session: the one remote browser the run owns.

use std::fmt;

/// Opaque session id handed out by the `WebDriver` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque handle to a located page element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The browser session held across attempts.
///
/// Owned by the run loop and lent to one attempt at a time.
/// The id is absent until a session is created, and cleared when the
/// session is destroyed or found to be gone on the remote side.
#[derive(Debug, Clone)]
pub struct Session {
    base_url: String,
    id: Option<SessionId>,
}

impl Session {
    /// A session slot for the given endpoint, with no session yet.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            id: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn id(&self) -> Option<&SessionId> {
        self.id.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.id.is_some()
    }

    /// Records a freshly created session.
    pub fn attach(&mut self, id: SessionId) {
        self.id = Some(id);
    }

    /// Forgets the current session, returning its id if there was one.
    pub fn clear(&mut self) -> Option<SessionId> {
        self.id.take()
    }
}
