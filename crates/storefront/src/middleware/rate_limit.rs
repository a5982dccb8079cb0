//! Rate limiting for login and registration, using governor and
//! `tower_governor`.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

// =============================================================================
// Client IP Key Extractor
// =============================================================================

/// Proxy headers carrying the client address, most specific first.
const CLIENT_IP_HEADERS: &[&str] = &["cf-connecting-ip", "x-real-ip", "x-forwarded-for"];

/// Keys requests by client IP.
///
/// The TCP peer address is used unless `trust_proxy_headers` is set, which is
/// only safe behind a reverse proxy that overwrites these headers. A client
/// talking to the server directly could otherwise pick a new address per
/// request.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor {
    trust_proxy_headers: bool,
}

impl ClientIpKeyExtractor {
    #[must_use]
    pub const fn new(trust_proxy_headers: bool) -> Self {
        Self {
            trust_proxy_headers,
        }
    }
}

fn forwarded_ip<T>(req: &Request<T>) -> Option<IpAddr> {
    let headers = req.headers();
    CLIENT_IP_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            // X-Forwarded-For is a chain; the first entry is the client
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    })
}

fn peer_ip<T>(req: &Request<T>) -> Option<IpAddr> {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let forwarded = if self.trust_proxy_headers {
            forwarded_ip(req)
        } else {
            None
        };

        forwarded
            .or_else(|| peer_ip(req))
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

// =============================================================================
// Rate Limiter Configuration
// =============================================================================

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for auth endpoints: ~10 requests per minute per IP.
///
/// One token every 6 seconds with a burst of 5, which slows down password
/// guessing on login and account spam on registration.
///
/// # Panics
///
/// Does not panic: `per_second(6)` and `burst_size(5)` are valid positive
/// values that `GovernorConfigBuilder` always accepts.
#[must_use]
pub fn auth_rate_limiter(trust_proxy_headers: bool) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor::new(trust_proxy_headers))
        .per_second(6)
        .burst_size(5)
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use tower_governor::key_extractor::KeyExtractor;

    use super::*;

    fn request(headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder().uri("/login/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap()
    }

    fn from_peer(headers: &[(&str, &str)]) -> Request<()> {
        let mut req = request(headers);
        let peer: SocketAddr = "192.0.2.9:5555".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(peer));
        req
    }

    const BEHIND_PROXY: ClientIpKeyExtractor = ClientIpKeyExtractor::new(true);
    const DIRECT: ClientIpKeyExtractor = ClientIpKeyExtractor::new(false);

    #[test]
    fn test_direct_clients_share_a_key_whatever_they_claim() {
        let keys: HashSet<IpAddr> = (0..20)
            .map(|i| {
                let claimed = format!("10.0.0.{i}");
                DIRECT
                    .extract(&from_peer(&[("x-real-ip", claimed.as_str())]))
                    .unwrap()
            })
            .collect();
        assert_eq!(keys.len(), 1);
        assert!(keys.contains(&"192.0.2.9".parse::<IpAddr>().unwrap()));
    }

    #[test]
    fn test_direct_ignores_forwarded_for() {
        let req = from_peer(&[("x-forwarded-for", "198.51.100.4")]);
        assert_eq!(DIRECT.extract(&req).unwrap().to_string(), "192.0.2.9");
    }

    #[test]
    fn test_proxy_prefers_cloudflare_header() {
        let req = from_peer(&[
            ("x-forwarded-for", "10.0.0.1"),
            ("cf-connecting-ip", "203.0.113.7"),
        ]);
        assert_eq!(BEHIND_PROXY.extract(&req).unwrap().to_string(), "203.0.113.7");
    }

    #[test]
    fn test_proxy_uses_first_forwarded_address() {
        let req = from_peer(&[("x-forwarded-for", "198.51.100.4, 10.0.0.1")]);
        assert_eq!(BEHIND_PROXY.extract(&req).unwrap().to_string(), "198.51.100.4");
    }

    #[test]
    fn test_proxy_falls_back_to_peer_address() {
        let req = from_peer(&[("x-real-ip", "not an ip")]);
        assert_eq!(BEHIND_PROXY.extract(&req).unwrap().to_string(), "192.0.2.9");
    }

    #[test]
    fn test_no_address_is_an_error() {
        assert!(DIRECT.extract(&request(&[])).is_err());
        assert!(BEHIND_PROXY.extract(&request(&[])).is_err());
    }
}
