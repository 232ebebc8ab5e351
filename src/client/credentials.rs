//! ## credentials
//!
//! Identity of the remote share

use std::fmt;

/// Identity of one remote share: host, share name and the credentials
/// used to authenticate against it.
///
/// The username may carry the workgroup inline as `workgroup/user`;
/// the session splits it before the first protocol call. Immutable
/// once handed to a client.
#[derive(Default, Clone)]
pub struct ShareCredentials {
    pub(crate) host: String,
    pub(crate) share: String,
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) workgroup: Option<String>,
}

impl ShareCredentials {
    pub fn new<S: AsRef<str>>(host: S, share: S) -> Self {
        Self {
            host: host.as_ref().to_string(),
            share: share.as_ref().to_string(),
            ..Default::default()
        }
    }

    /// Construct ShareCredentials with the provided username
    pub fn username<S: AsRef<str>>(mut self, username: S) -> Self {
        self.username = username.as_ref().to_string();
        self
    }

    /// Construct ShareCredentials with the provided password
    pub fn password<S: AsRef<str>>(mut self, password: S) -> Self {
        self.password = password.as_ref().to_string();
        self
    }

    /// Construct ShareCredentials with the provided workgroup
    pub fn workgroup<S: AsRef<str>>(mut self, workgroup: S) -> Self {
        self.workgroup = Some(workgroup.as_ref().to_string());
        self
    }

    /// Remote host
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Share name on the host
    pub fn share(&self) -> &str {
        &self.share
    }
}

impl fmt::Debug for ShareCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShareCredentials")
            .field("host", &self.host)
            .field("share", &self.share)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("workgroup", &self.workgroup)
            .finish()
    }
}
