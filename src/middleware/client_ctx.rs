//! Per-request caller context.
//!
//! Authentication happens at the identity provider. By the time a request
//! reaches us the caller's uid, if any, travels in the `X-User-Uid` header.
//! Callers without a uid are fingerprinted from their request headers so that
//! anonymous votes can still be deduplicated.

use crate::error::{Error, Result};
use crate::identity::device_fingerprint;
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use std::net::IpAddr;

pub const USER_UID_HEADER: &str = "x-user-uid";

#[derive(Clone, Debug)]
pub struct ClientCtx {
    /// Identity-provider uid. None is an anonymous reader.
    uid: Option<String>,
    /// Stable hash of client signals, present for every caller.
    fingerprint: String,
}

impl ClientCtx {
    pub fn from_http_request(req: &HttpRequest) -> Self {
        let uid = header(req, USER_UID_HEADER)
            .map(str::trim)
            .filter(|uid| !uid.is_empty())
            .map(str::to_string);
        let ip = extract_client_ip(req);

        let fingerprint = device_fingerprint(&[
            header(req, "user-agent").unwrap_or_default(),
            header(req, "accept-language").unwrap_or_default(),
            ip.as_deref().unwrap_or_default(),
        ]);

        Self { uid, fingerprint }
    }

    pub fn uid(&self) -> Option<&str> {
        self.uid.as_deref()
    }

    /// Returns the uid or fails with `AuthenticationRequired`.
    pub fn require_uid(&self) -> Result<&str> {
        self.uid().ok_or(Error::AuthenticationRequired)
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

impl FromRequest for ClientCtx {
    type Error = actix_web::Error;
    type Future = Ready<std::result::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(ClientCtx::from_http_request(req)))
    }
}

fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}

/// Real client address: first X-Forwarded-For hop, then X-Real-IP, then the peer.
pub fn extract_client_ip(req: &HttpRequest) -> Option<String> {
    if let Some(xff) = header(req, "x-forwarded-for") {
        if let Some(first) = xff.split(',').next() {
            let first = first.trim();
            if first.parse::<IpAddr>().is_ok() {
                return Some(first.to_string());
            }
        }
    }

    if let Some(xri) = header(req, "x-real-ip") {
        let xri = xri.trim();
        if xri.parse::<IpAddr>().is_ok() {
            return Some(xri.to_string());
        }
    }

    req.peer_addr().map(|addr| addr.ip().to_string())
}
