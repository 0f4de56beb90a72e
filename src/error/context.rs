//! Runtime context stamped onto every captured report.

use chrono::Utc;
use uuid::Uuid;

use super::report::{ErrorContext, ErrorScope};

/// Default user agent when the host does not provide one.
pub const DEFAULT_USER_AGENT: &str = concat!("stayfront/", env!("CARGO_PKG_VERSION"));

/// Mutable description of the environment the service runs in.
///
/// The session id is fixed for the lifetime of the value; url and user are
/// updated as the user navigates and signs in or out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeContext {
    url: String,
    user_agent: String,
    session_id: String,
    build_version: String,
    user_id: Option<String>,
}

impl RuntimeContext {
    /// Creates a context with a fresh session id.
    pub fn new(build_version: impl Into<String>) -> Self {
        Self {
            url: "/".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            session_id: format!("session_{}", Uuid::new_v4().simple()),
            build_version: build_version.into(),
            user_id: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    pub fn set_user(&mut self, user_id: Option<String>) {
        self.user_id = user_id;
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn build_version(&self) -> &str {
        &self.build_version
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Freezes the current state into a report context.
    pub fn snapshot(&self, scope: ErrorScope) -> ErrorContext {
        ErrorContext {
            timestamp: Utc::now(),
            url: self.url.clone(),
            user_agent: self.user_agent.clone(),
            session_id: self.session_id.clone(),
            build_version: self.build_version.clone(),
            user_id: self.user_id.clone(),
            feature: None,
            component: None,
            action: None,
        }
        .with_scope(scope)
    }
}

impl Default for RuntimeContext {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_VERSION"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_ids_differ_between_contexts() {
        let a = RuntimeContext::new("1.0.0");
        let b = RuntimeContext::new("1.0.0");
        assert_ne!(a.session_id(), b.session_id());
        assert!(a.session_id().starts_with("session_"));
    }

    #[test]
    fn test_snapshot_carries_user_and_scope() {
        let mut context = RuntimeContext::new("2.3.1").with_url("/listings/42");
        context.set_user(Some("guest-7".to_string()));

        let snapshot = context.snapshot(ErrorScope::new().action("book"));

        assert_eq!(snapshot.url, "/listings/42");
        assert_eq!(snapshot.build_version, "2.3.1");
        assert_eq!(snapshot.user_id.as_deref(), Some("guest-7"));
        assert_eq!(snapshot.action.as_deref(), Some("book"));
        assert_eq!(snapshot.session_id, context.session_id());
    }

    #[test]
    fn test_default_user_agent() {
        let snapshot = RuntimeContext::default().snapshot(ErrorScope::default());
        assert!(snapshot.user_agent.starts_with("stayfront/"));
    }

    #[test]
    fn test_clearing_user() {
        let mut context = RuntimeContext::default();
        context.set_user(Some("owner-1".to_string()));
        context.set_user(None);
        assert!(context.user_id().is_none());
    }
}
