//! Bind address parsing and resolution.
//!
//! Accepts `host`, `host:port` and `[v6]:port`. A missing port is filled in
//! with [`DEFAULT_BIND_PORT`] with a single retry; every other malformed
//! input is reported as-is.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use thiserror::Error;

/// Gossip port used when the bind address does not name one.
pub const DEFAULT_BIND_PORT: u16 = 7946;

/// Error type for address parsing and resolution.
#[derive(Debug, Error)]
pub enum AddressError {
    #[error("address {0}: missing port in address")]
    MissingPort(String),

    #[error("address {0}: too many colons in address")]
    TooManyColons(String),

    #[error("address {0}: missing ']' in address")]
    MissingBracket(String),

    #[error("address {0}: unexpected '[' or ']' in address")]
    UnexpectedBracket(String),

    #[error("address {address}: invalid port {port:?}")]
    InvalidPort { address: String, port: String },

    #[error("failed to resolve {address}: {source}")]
    Resolve {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no addresses found for {0}")]
    NoAddress(String),
}

/// Split `host:port` into its parts without resolving anything.
pub fn split_host_port(hostport: &str) -> Result<(&str, &str), AddressError> {
    let err = |make: fn(String) -> AddressError| Err(make(hostport.to_string()));

    let (host, port_start) = if let Some(rest) = hostport.strip_prefix('[') {
        let end = match rest.find(']') {
            Some(end) => end + 1,
            None => return err(AddressError::MissingBracket),
        };

        match hostport.as_bytes().get(end + 1).copied() {
            None => return err(AddressError::MissingPort),
            Some(b':') if hostport[end + 1..].rfind(':') == Some(0) => {}
            Some(b':') => return err(AddressError::TooManyColons),
            Some(_) => return err(AddressError::MissingPort),
        }

        let host = &hostport[1..end];
        if host.contains('[') || host.contains(']') || hostport[end + 1..].contains(['[', ']']) {
            return err(AddressError::UnexpectedBracket);
        }
        (host, end + 2)
    } else {
        let colon = match hostport.rfind(':') {
            Some(colon) => colon,
            None => return err(AddressError::MissingPort),
        };

        let host = &hostport[..colon];
        if host.contains(':') {
            return err(AddressError::TooManyColons);
        }
        if hostport.contains(['[', ']']) {
            return err(AddressError::UnexpectedBracket);
        }
        (host, colon + 1)
    };

    Ok((host, &hostport[port_start..]))
}

/// Resolve a bind address to a concrete IP and port.
///
/// An empty host means all interfaces. Hostnames go through the system
/// resolver; the first IPv4 answer is preferred.
pub async fn resolve(address: &str) -> Result<SocketAddr, AddressError> {
    let with_port;
    let (host, port) = match split_host_port(address) {
        Ok(parts) => parts,
        Err(AddressError::MissingPort(_)) => {
            with_port = format!("{}:{}", address, DEFAULT_BIND_PORT);
            split_host_port(&with_port)?
        }
        Err(e) => return Err(e),
    };

    // An empty port means "any", as in `10.0.0.5:`.
    let port: u16 = if port.is_empty() {
        0
    } else {
        port.parse().map_err(|_| AddressError::InvalidPort {
            address: address.to_string(),
            port: port.to_string(),
        })?
    };

    if host.is_empty() {
        return Ok(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port));
    }

    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, port));
    }

    let candidates: Vec<SocketAddr> = tokio::net::lookup_host((host, port))
        .await
        .map_err(|source| AddressError::Resolve {
            address: address.to_string(),
            source,
        })?
        .collect();

    candidates
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| candidates.first())
        .copied()
        .ok_or_else(|| AddressError::NoAddress(address.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_host_port() {
        assert_eq!(split_host_port("10.0.0.5:9000").unwrap(), ("10.0.0.5", "9000"));
        assert_eq!(split_host_port("[::1]:80").unwrap(), ("::1", "80"));
        assert_eq!(split_host_port(":7946").unwrap(), ("", "7946"));
    }

    #[test]
    fn test_split_host_port_errors() {
        assert!(matches!(split_host_port("10.0.0.5"), Err(AddressError::MissingPort(_))));
        assert!(matches!(split_host_port("[::1]"), Err(AddressError::MissingPort(_))));
        assert!(matches!(split_host_port("::1"), Err(AddressError::TooManyColons(_))));
        assert!(matches!(split_host_port("[::1]:80:90"), Err(AddressError::TooManyColons(_))));
        assert!(matches!(split_host_port("[::1:80"), Err(AddressError::MissingBracket(_))));
        assert!(matches!(split_host_port("a]b:80"), Err(AddressError::UnexpectedBracket(_))));
    }

    #[tokio::test]
    async fn test_resolve_injects_default_port() {
        let addr = resolve("10.0.0.5").await.unwrap();
        assert_eq!(addr.ip().to_string(), "10.0.0.5");
        assert_eq!(addr.port(), DEFAULT_BIND_PORT);
    }

    #[tokio::test]
    async fn test_resolve_explicit_port() {
        let addr = resolve("10.0.0.5:9000").await.unwrap();
        assert_eq!(addr.ip().to_string(), "10.0.0.5");
        assert_eq!(addr.port(), 9000);
    }

    #[tokio::test]
    async fn test_resolve_empty_port_is_any() {
        let addr = resolve("10.0.0.5:").await.unwrap();
        assert_eq!(addr.ip().to_string(), "10.0.0.5");
        assert_eq!(addr.port(), 0);

        let addr = resolve("[::1]:").await.unwrap();
        assert_eq!(addr.port(), 0);
    }

    #[tokio::test]
    async fn test_resolve_ipv6_literal() {
        let addr = resolve("[::1]").await.unwrap();
        assert_eq!(addr.ip().to_string(), "::1");
        assert_eq!(addr.port(), DEFAULT_BIND_PORT);
    }

    #[tokio::test]
    async fn test_resolve_empty_binds_everywhere() {
        let addr = resolve("").await.unwrap();
        assert!(addr.ip().is_unspecified());
        assert_eq!(addr.port(), DEFAULT_BIND_PORT);
    }

    #[tokio::test]
    async fn test_resolve_hostname() {
        let addr = resolve("localhost:8000").await.unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 8000);
    }

    #[tokio::test]
    async fn test_resolve_rejects_bad_host() {
        assert!(resolve("not a host").await.is_err());
    }

    #[tokio::test]
    async fn test_resolve_other_errors_not_retried() {
        assert!(matches!(resolve("::1").await, Err(AddressError::TooManyColons(_))));
        assert!(matches!(
            resolve("10.0.0.5:http").await,
            Err(AddressError::InvalidPort { .. })
        ));
    }
}
