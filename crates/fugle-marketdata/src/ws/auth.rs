/*
[INPUT]:  Transport open, server auth verdicts, auth-timeout expiry, resets
[OUTPUT]: Authentication state and the captured handshake failure
[POS]:    WebSocket layer - handshake state machine
[UPDATE]: When changing handshake rules or timeout handling
*/

use std::sync::Weak;
use std::time::Duration;

use tokio::task::AbortHandle;

use super::client::Inner;
use crate::error::AuthError;

/// Handshake progress of a streaming client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Pending,
    Authenticating,
    Authenticated,
    Unauthenticated,
}

impl AuthState {
    /// No further automatic transition happens from a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, AuthState::Authenticated | AuthState::Unauthenticated)
    }
}

/// State plus pending error. An error is never held while `Authenticated`.
#[derive(Debug, Default)]
pub(crate) struct AuthMachine {
    state: AuthState,
    error: Option<AuthError>,
}

impl AuthMachine {
    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn error(&self) -> Option<&AuthError> {
        self.error.as_ref()
    }

    /// Auth frame is about to go out
    pub fn begin(&mut self) {
        self.state = AuthState::Authenticating;
        self.error = None;
    }

    /// Server confirmed the credentials. Only honoured mid-handshake.
    pub fn authenticate(&mut self) -> bool {
        if self.state != AuthState::Authenticating {
            return false;
        }
        self.state = AuthState::Authenticated;
        self.error = None;
        true
    }

    /// Terminal failure, applied regardless of the current state
    pub fn fail(&mut self, error: AuthError) {
        self.state = AuthState::Unauthenticated;
        self.error = Some(error);
    }

    /// Timer expiry; a no-op unless still waiting for the verdict
    pub fn time_out(&mut self, duration: Duration) -> bool {
        if self.state != AuthState::Authenticating {
            return false;
        }
        self.fail(AuthError::Timeout { duration });
        true
    }

    pub fn reset(&mut self) {
        self.state = AuthState::Pending;
        self.error = None;
    }
}

/// Arm the auth-timeout timer for connection `generation`
pub(crate) fn spawn_timeout(inner: Weak<Inner>, generation: u64, duration: Duration) -> AbortHandle {
    tokio::spawn(async move {
        tokio::time::sleep(duration).await;
        if let Some(inner) = inner.upgrade() {
            inner.auth_timed_out(generation, duration);
        }
    })
    .abort_handle()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_pending() {
        let machine = AuthMachine::default();
        assert_eq!(machine.state(), AuthState::Pending);
        assert!(machine.error().is_none());
    }

    #[test]
    fn test_success_path() {
        let mut machine = AuthMachine::default();
        machine.begin();
        assert_eq!(machine.state(), AuthState::Authenticating);
        assert!(machine.authenticate());
        assert_eq!(machine.state(), AuthState::Authenticated);
        assert!(machine.error().is_none());
    }

    #[test]
    fn test_late_timeout_is_noop() {
        let mut machine = AuthMachine::default();
        machine.begin();
        assert!(machine.authenticate());
        assert!(!machine.time_out(Duration::from_secs(5)));
        assert_eq!(machine.state(), AuthState::Authenticated);
    }

    #[test]
    fn test_timeout_while_authenticating() {
        let mut machine = AuthMachine::default();
        machine.begin();
        assert!(machine.time_out(Duration::from_secs(5)));
        assert_eq!(machine.state(), AuthState::Unauthenticated);
        assert_eq!(
            machine.error(),
            Some(&AuthError::Timeout { duration: Duration::from_secs(5) })
        );
        assert!(!machine.authenticate());
    }

    #[test]
    fn test_rejection_overrides_authenticated() {
        let mut machine = AuthMachine::default();
        machine.begin();
        machine.authenticate();
        machine.fail(AuthError::Rejected { message: "nope".into() });
        assert_eq!(machine.state(), AuthState::Unauthenticated);
        assert!(machine.error().is_some());
    }

    #[test]
    fn test_reset_clears_error() {
        let mut machine = AuthMachine::default();
        machine.fail(AuthError::MissingCredentials);
        machine.reset();
        assert_eq!(machine.state(), AuthState::Pending);
        assert!(machine.error().is_none());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!AuthState::Pending.is_terminal());
        assert!(!AuthState::Authenticating.is_terminal());
        assert!(AuthState::Authenticated.is_terminal());
        assert!(AuthState::Unauthenticated.is_terminal());
    }
}
