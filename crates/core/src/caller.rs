use serde::{Deserialize, Serialize};

/// An authenticated administrator, as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Stable user identifier issued by the identity provider.
    pub id: String,
    /// Email address of the administrator at the time of the call.
    pub email: String,
}

impl Principal {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
        }
    }
}

/// Who is making a call and from where.
///
/// Handed explicitly to every mutating operation. The audit service reads
/// it once per call and never keeps it around.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerContext {
    /// The acting principal, or `None` when the session is not authenticated.
    pub principal: Option<Principal>,
    /// User-agent string of the calling environment, when one is available.
    pub user_agent: Option<String>,
}

impl CallerContext {
    /// A context without an authenticated principal.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A context for the given authenticated principal.
    pub fn authenticated(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
            user_agent: None,
        }
    }

    /// Attach the user-agent string of the calling environment.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_has_no_principal() {
        let ctx = CallerContext::anonymous();
        assert!(!ctx.is_authenticated());
        assert!(ctx.user_agent.is_none());
    }

    #[test]
    fn authenticated_with_user_agent() {
        let ctx = CallerContext::authenticated(Principal::new("u-1", "ops@example.com"))
            .with_user_agent("Mozilla/5.0");
        assert!(ctx.is_authenticated());
        assert_eq!(ctx.principal.as_ref().unwrap().email, "ops@example.com");
        assert_eq!(ctx.user_agent.as_deref(), Some("Mozilla/5.0"));
    }
}
