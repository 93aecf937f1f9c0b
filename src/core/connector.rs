//! Resource-handle boundary: credentials and the connector trait.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::error::ResourceError;

/// Endpoint address and login used by every worker's connection.
///
/// Opaque to the schedulers. The password is redacted from `Debug` output so
/// credentials never end up in log lines.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// Endpoint address, e.g. `tcp://127.0.0.1:3306`.
    pub address: String,
    /// Login user.
    pub user: String,
    /// Login password.
    pub password: String,
}

impl Credentials {
    /// Build credentials from parts.
    pub fn new(
        address: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            user: user.into(),
            password: password.into(),
        }
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new("tcp://127.0.0.1:3306", "root", "")
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("address", &self.address)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Factory for the per-worker resource handles.
///
/// The pool serializes calls to [`connect`](Connector::connect) behind a
/// dedicated mutex, so implementations need not support concurrent
/// connection setup. Each returned connection is owned by exactly one worker
/// for its whole life and is handed back through
/// [`disconnect`](Connector::disconnect) on worker exit or after a failed job.
pub trait Connector: Send + Sync + 'static {
    /// Live connection handed to jobs.
    type Connection: Send + 'static;

    /// Open a connection.
    ///
    /// # Errors
    ///
    /// Returns a [`ResourceError`] when the endpoint cannot be reached or
    /// rejects the credentials.
    fn connect(&self, credentials: &Credentials) -> Result<Self::Connection, ResourceError>;

    /// Tear a connection down. The default simply drops it.
    fn disconnect(&self, conn: Self::Connection) {
        drop(conn);
    }
}

impl<T: Connector> Connector for Arc<T> {
    type Connection = T::Connection;

    fn connect(&self, credentials: &Credentials) -> Result<Self::Connection, ResourceError> {
        (**self).connect(credentials)
    }

    fn disconnect(&self, conn: Self::Connection) {
        (**self).disconnect(conn);
    }
}
