use std::time::Duration;

use serde::Deserialize;
use tonic::transport::Endpoint;

use crate::error::Result;

/// Default port of the Cassandra RPC service.
pub const DEFAULT_PORT: u16 = 9160;

/// Login credentials sent right after connecting.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Configuration for [`crate::CassandraClient::connect`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Host name or address of the server.
    pub host: String,
    /// Port of the RPC service.
    pub port: u16,
    /// Keyspace to select once connected.
    pub keyspace: Option<String>,
    /// Credentials to log in with once connected.
    pub credentials: Option<Credentials>,
    /// Timeout for establishing the connection, in milliseconds.
    pub connect_timeout_ms: Option<u64>,
    /// Timeout applied to every request, in milliseconds.
    pub request_timeout_ms: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            keyspace: None,
            credentials: None,
            connect_timeout_ms: Some(10_000),
            request_timeout_ms: None,
        }
    }
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn with_keyspace(mut self, keyspace: impl Into<String>) -> Self {
        self.keyspace = Some(keyspace.into());
        self
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// URI of the server, e.g. `http://localhost:9160`.
    pub fn uri(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Builds the transport endpoint for this configuration.
    pub fn endpoint(&self) -> Result<Endpoint> {
        let mut endpoint = Endpoint::from_shared(self.uri())?;
        if let Some(ms) = self.connect_timeout_ms {
            endpoint = endpoint.connect_timeout(Duration::from_millis(ms));
        }
        if let Some(ms) = self.request_timeout_ms {
            endpoint = endpoint.timeout(Duration::from_millis(ms));
        }
        Ok(endpoint)
    }
}
