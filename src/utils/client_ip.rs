//! Client identity resolution for admission control.

use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Resolves the client identity used as the admission limiter key.
///
/// When `behind_proxy` is `true`, the first parseable address of
/// `X-Forwarded-For`, then `X-Real-IP`, is preferred. Otherwise, or when
/// neither header yields an address, the socket peer address is used.
///
/// Only enable `behind_proxy` when a trusted reverse proxy sets these headers;
/// a directly exposed service would let clients pick their own key.
///
/// # Examples
///
/// ```ignore
/// let mut headers = HeaderMap::new();
/// headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
///
/// let peer: SocketAddr = "10.0.0.1:5000".parse().unwrap();
/// assert_eq!(client_identity(&headers, peer, true), "203.0.113.7");
/// assert_eq!(client_identity(&headers, peer, false), "10.0.0.1");
/// ```
pub fn client_identity(headers: &HeaderMap, peer: SocketAddr, behind_proxy: bool) -> String {
    if behind_proxy && let Some(ip) = forwarded_ip(headers) {
        return ip.to_string();
    }

    peer.ip().to_string()
}

fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let from_forwarded_for = headers
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok());

    from_forwarded_for.or_else(|| {
        headers
            .get(X_REAL_IP)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<IpAddr>().ok())
    })
}
