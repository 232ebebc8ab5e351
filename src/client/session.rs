//! ## session
//!
//! Connection session state machine

use std::sync::Arc;

use super::credentials::ShareCredentials;
use crate::engine::ShareEngine;
use crate::error::ShareResult;

/// Lifecycle state of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unconnected,
    Connected,
    Failed,
}

/// Owns the engine handle for one share and drives connect-before-use.
///
/// Exactly one session per client; every operation goes through
/// [`ConnectionSession::ensure_connected`] before touching the engine.
pub struct ConnectionSession {
    engine: Arc<dyn ShareEngine>,
    state: SessionState,
}

impl ConnectionSession {
    pub fn new(engine: Arc<dyn ShareEngine>) -> Self {
        Self {
            engine,
            state: SessionState::Unconnected,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    /// The engine this session drives
    pub fn engine(&self) -> &Arc<dyn ShareEngine> {
        &self.engine
    }

    /// Establish the session if it is not already established.
    ///
    /// Idempotent while `Connected`. From `Unconnected` or `Failed` it
    /// authenticates against the engine; on failure the state resets to
    /// `Unconnected` so the next call retries cleanly.
    pub fn ensure_connected(&mut self, credentials: &ShareCredentials) -> ShareResult<()> {
        if self.is_connected() {
            trace!("session already connected");
            return Ok(());
        }
        let (workgroup, username) = split_user(credentials);
        debug!(
            "initializing session for {}@{}/{}",
            username,
            credentials.host(),
            credentials.share()
        );
        match self
            .engine
            .init(workgroup, username, &credentials.password)
        {
            Ok(()) => {
                self.state = SessionState::Connected;
                debug!("session connected");
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Unconnected;
                error!("session init failed: {}", e);
                Err(e.into())
            }
        }
    }

    /// Mark the session handle as invalidated; the next operation will
    /// reconnect.
    pub fn invalidate(&mut self) {
        self.state = SessionState::Failed;
    }

    /// Forget the established session without marking it failed
    pub fn reset(&mut self) {
        self.state = SessionState::Unconnected;
    }
}

/// Split the workgroup out of the username.
///
/// An explicit workgroup wins; otherwise a username of the form
/// `workgroup/user` is split on the first separator.
fn split_user(credentials: &ShareCredentials) -> (Option<&str>, &str) {
    if let Some(workgroup) = credentials.workgroup.as_deref() {
        return (Some(workgroup), &credentials.username);
    }
    match credentials.username.split_once('/') {
        Some((workgroup, username)) => (Some(workgroup), username),
        None => (None, &credentials.username),
    }
}
