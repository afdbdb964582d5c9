//! Authentication session state machine.
//!
//! Auth state is an explicit machine, `Anonymous -> Authenticating ->
//! Authenticated`, rather than an ambient "current user" lookup. The cart
//! store reconciles local and remote carts on the `Authenticating ->
//! Authenticated` edge, and the edge methods here fire at most once per
//! transition so reconciliation cannot run twice for one login.

use secrecy::{ExposeSecret, SecretString};

/// Bearer token for the storefront API.
///
/// Wraps `SecretString` so the token never appears in `Debug` output or
/// logs.
#[derive(Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(SecretString::from(raw.into()))
    }

    /// Expose the raw token for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AccessToken").field(&"[REDACTED]").finish()
    }
}

/// Authentication state for one client session.
#[derive(Debug, Clone)]
pub enum AuthState {
    /// No user; the cart lives in local storage.
    Anonymous,
    /// Login started but no token yet.
    Authenticating,
    /// Logged in; the remote cart is authoritative.
    Authenticated(AccessToken),
}

/// Session owning the auth state machine.
#[derive(Debug, Clone)]
pub struct Session {
    state: AuthState,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// New anonymous session.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: AuthState::Anonymous,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &AuthState {
        &self.state
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self.state, AuthState::Authenticated(_))
    }

    /// Current token, when authenticated.
    #[must_use]
    pub const fn token(&self) -> Option<&AccessToken> {
        match &self.state {
            AuthState::Authenticated(token) => Some(token),
            _ => None,
        }
    }

    /// `Anonymous -> Authenticating`. Returns `false` (no edge) from any
    /// other state, which is how duplicate login attempts are ignored.
    pub fn begin_login(&mut self) -> bool {
        match self.state {
            AuthState::Anonymous => {
                self.state = AuthState::Authenticating;
                true
            }
            _ => false,
        }
    }

    /// `Authenticating -> Authenticated`. Returns `false` when no login is
    /// in flight.
    pub fn complete_login(&mut self, token: AccessToken) -> bool {
        match self.state {
            AuthState::Authenticating => {
                self.state = AuthState::Authenticated(token);
                true
            }
            _ => false,
        }
    }

    /// `Authenticating -> Anonymous` after a failed login.
    pub fn fail_login(&mut self) {
        if matches!(self.state, AuthState::Authenticating) {
            self.state = AuthState::Anonymous;
        }
    }

    /// Any state `-> Anonymous`. Returns `true` only when the session was
    /// authenticated.
    pub fn logout(&mut self) -> bool {
        let was_authenticated = self.is_authenticated();
        self.state = AuthState::Anonymous;
        was_authenticated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_edges_fire_once() {
        let mut session = Session::new();
        assert!(session.begin_login());
        assert!(!session.begin_login());
        assert!(session.complete_login(AccessToken::new("t1")));
        assert!(!session.complete_login(AccessToken::new("t2")));
        assert!(session.is_authenticated());
        assert!(!session.begin_login());
    }

    #[test]
    fn test_failed_login_returns_to_anonymous() {
        let mut session = Session::new();
        assert!(session.begin_login());
        session.fail_login();
        assert!(!session.is_authenticated());
        // A fresh attempt is allowed after the rollback.
        assert!(session.begin_login());
    }

    #[test]
    fn test_logout_edge() {
        let mut session = Session::new();
        assert!(!session.logout());
        session.begin_login();
        session.complete_login(AccessToken::new("t"));
        assert!(session.logout());
        assert!(!session.logout());
        assert!(session.token().is_none());
    }

    #[test]
    fn test_token_is_redacted_in_debug() {
        let token = AccessToken::new("super-secret");
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("super-secret"));
        assert_eq!(token.expose(), "super-secret");
    }
}
