use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::state::AppState;

/// Key used when neither a forwarding header nor a peer address is known.
const UNKNOWN_CLIENT: &str = "unknown";

/// Longest `x-forwarded-for` hop accepted as a client key.
const MAX_FORWARDED_LEN: usize = 64;

/// Caller identity for rate limiting.
///
/// Behind a trusted proxy (`TRUST_PROXY=true`) this is the first
/// `x-forwarded-for` hop, provided it looks like an address. Otherwise the
/// header is ignored and the socket peer address is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientKey(pub String);

impl FromRequestParts<AppState> for ClientKey {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(resolve(parts, state.config.trust_proxy))
    }
}

fn resolve(parts: &Parts, trust_proxy: bool) -> ClientKey {
    if trust_proxy {
        if let Some(hop) = forwarded_for(&parts.headers) {
            return ClientKey(hop);
        }
    }

    let peer = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());

    ClientKey(peer.unwrap_or_else(|| UNKNOWN_CLIENT.to_string()))
}

/// First `x-forwarded-for` hop, if it is short and made only of address
/// characters.
fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get("x-forwarded-for")?.to_str().ok()?;
    let first = raw.split(',').next()?.trim();
    if first.is_empty() || first.len() > MAX_FORWARDED_LEN {
        return None;
    }
    first
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b':' || b == b'-')
        .then(|| first.to_string())
}
