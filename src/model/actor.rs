use super::tags::{Tags, ACCESS_PUBLIC, TAG_ACCESS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Name of the port every actor created through the manager exposes.
pub const PORT_NAME: &str = "http";

/// A running (or destroyed) actor as reported by the orchestration API.
///
/// An actor is only handed out by the resolver while its `access` tag is
/// `"public"`. Once `destroyed_at` is set the record is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: String,
    #[serde(default)]
    pub tags: Tags,
    pub build: String,
    #[serde(default)]
    pub network: Network,
    /// ISO-8601 timestamp. Lexicographic order equals chronological order.
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destroyed_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    #[serde(default)]
    pub ports: BTreeMap<String, Port>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub protocol: Protocol,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    Http,
    Https,
    Tcp,
    TcpTls,
    Udp,
}

/// Reasons an actor's public endpoint cannot be derived.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EndpointError {
    #[error("missing `{0}` port")]
    MissingPort(String),
    #[error("missing hostname")]
    MissingHostname,
    #[error("missing port")]
    MissingPortNumber,
    #[error("invalid protocol {0:?}")]
    UnsupportedProtocol(Protocol),
}

impl Port {
    /// A port is ready once the orchestration layer has filled in both the
    /// hostname and the port number.
    pub fn is_ready(&self) -> bool {
        let has_host = self.hostname.as_deref().is_some_and(|h| !h.is_empty());
        let has_port = self.port.is_some_and(|p| p != 0);
        has_host && has_port
    }
}

impl Actor {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn is_public(&self) -> bool {
        self.tag(TAG_ACCESS) == Some(ACCESS_PUBLIC)
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed_at.is_some()
    }

    /// True when every declared port is ready. An actor without ports is ready.
    pub fn ports_ready(&self) -> bool {
        self.network.ports.values().all(Port::is_ready)
    }

    /// Derives the URL clients use to reach the actor's [`PORT_NAME`] port.
    ///
    /// `https` maps to a TLS endpoint, `http` and `tcp` to a plain one. `tcp_tls`
    /// and `udp` ports cannot be reached this way.
    pub fn endpoint(&self) -> Result<String, EndpointError> {
        let port = self
            .network
            .ports
            .get(PORT_NAME)
            .ok_or_else(|| EndpointError::MissingPort(PORT_NAME.to_string()))?;
        let hostname = port
            .hostname
            .as_deref()
            .filter(|h| !h.is_empty())
            .ok_or(EndpointError::MissingHostname)?;
        let number = port
            .port
            .filter(|p| *p != 0)
            .ok_or(EndpointError::MissingPortNumber)?;

        let scheme = match port.protocol {
            Protocol::Https => "https",
            Protocol::Http | Protocol::Tcp => "http",
            Protocol::TcpTls | Protocol::Udp => {
                return Err(EndpointError::UnsupportedProtocol(port.protocol))
            }
        };
        let path = port.path.as_deref().unwrap_or("");

        Ok(format!("{scheme}://{hostname}:{number}{path}"))
    }
}
