//! Peer roles in a two-player session.
//!
//! Each client runs its own session and knows whether it is the host or the
//! guest. The host is the authoritative peer: when both clients compute an
//! outcome, the host's result wins. The role also namespaces persisted
//! fields so both peers can share one backing document.

use serde::{Deserialize, Serialize};

/// Which side of the connection this client is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerRole {
    /// The peer that created the room. Authoritative.
    #[default]
    Host,
    /// The peer that joined.
    Guest,
}

impl PeerRole {
    /// The other side of the connection.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            PeerRole::Host => PeerRole::Guest,
            PeerRole::Guest => PeerRole::Host,
        }
    }

    /// Whether this peer's computed outcomes are treated as ground truth.
    #[must_use]
    pub const fn is_authoritative(self) -> bool {
        matches!(self, PeerRole::Host)
    }

    /// Prefix used for this peer's fields in a shared document.
    #[must_use]
    pub const fn field_prefix(self) -> &'static str {
        match self {
            PeerRole::Host => "host",
            PeerRole::Guest => "guest",
        }
    }
}

impl std::fmt::Display for PeerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field_prefix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent() {
        assert_eq!(PeerRole::Host.opponent(), PeerRole::Guest);
        assert_eq!(PeerRole::Guest.opponent(), PeerRole::Host);
    }

    #[test]
    fn test_host_is_authoritative() {
        assert!(PeerRole::Host.is_authoritative());
        assert!(!PeerRole::Guest.is_authoritative());
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&PeerRole::Guest).unwrap();
        assert_eq!(json, "\"guest\"");
        let back: PeerRole = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PeerRole::Guest);
    }
}
