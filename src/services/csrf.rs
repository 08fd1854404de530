//! # CSRF Token Service
//!
//! Stateless double-submit-cookie helpers: token minting, constant-time
//! comparison, and reading/writing the token on HTTP headers.
//!
//! Validity is defined purely by equality between the `csrf_token` cookie and
//! the `X-CSRF-Token` header. Nothing is stored on the server.

use axum::http::{HeaderMap, HeaderValue, Method, Uri, header, header::InvalidHeaderValue};
use rand::RngCore;
use tracing::{trace, warn};

use crate::error::CsrfError;
use crate::utils::constant::{
    CSRF_COOKIE_NAME, CSRF_HEADER_NAME, CSRF_TOKEN_BYTES, CSRF_TOKEN_TTL,
};
use crate::utils::static_object::{CSRF_FORCE_SECURE, CSRF_TRUST_FORWARDED_PROTO};

/// Decides when the token cookie carries the `Secure` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsrfConfig {
    /// Set `Secure` on every cookie regardless of the request scheme
    pub force_secure: bool,
    /// Treat `X-Forwarded-Proto: https` as a TLS request
    pub trust_forwarded_proto: bool,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            force_secure: false,
            trust_forwarded_proto: true,
        }
    }
}

impl CsrfConfig {
    /// Reads `CSRF_FORCE_SECURE` and `CSRF_TRUST_FORWARDED_PROTO`.
    pub fn from_env() -> Self {
        Self {
            force_secure: *CSRF_FORCE_SECURE,
            trust_forwarded_proto: *CSRF_TRUST_FORWARDED_PROTO,
        }
    }

    /// Whether the request reached us over TLS, directly or through a trusted proxy.
    pub fn is_secure_request(&self, uri: &Uri, headers: &HeaderMap) -> bool {
        if self.force_secure || uri.scheme_str() == Some("https") {
            return true;
        }

        self.trust_forwarded_proto
            && headers
                .get("x-forwarded-proto")
                .and_then(|value| value.to_str().ok())
                .is_some_and(|proto| proto.trim().eq_ignore_ascii_case("https"))
    }
}

/// GET, HEAD and OPTIONS never mutate state and are let through unchecked.
pub fn is_safe_method(method: &Method) -> bool {
    let method = method.as_str();
    ["GET", "HEAD", "OPTIONS"]
        .iter()
        .any(|safe| safe.eq_ignore_ascii_case(method))
}

/// Mints a fresh token: [`CSRF_TOKEN_BYTES`] random bytes, hex-encoded.
pub fn generate_token() -> String {
    let mut bytes = [0u8; CSRF_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Compares two tokens in time independent of the first differing byte.
///
/// Only a length mismatch returns early; tokens are fixed-length, so length is not secret.
pub fn tokens_match(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff: u8 = 0;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Finds the token cookie across every `Cookie` header. Empty values count as absent.
pub fn cookie_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == CSRF_COOKIE_NAME)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// Reads the first `X-CSRF-Token` header. Non-UTF8 or empty values count as absent.
pub fn header_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(CSRF_HEADER_NAME)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Checks the double-submit pair of an unsafe request.
pub fn verify(headers: &HeaderMap) -> Result<(), CsrfError> {
    let cookie = cookie_token(headers);
    let header = header_token(headers);

    let (Some(cookie), Some(header)) = (cookie, header) else {
        warn!(
            cookie_present = cookie.is_some(),
            header_present = header.is_some(),
            "Missing CSRF token"
        );
        return Err(CsrfError::Missing);
    };

    if !tokens_match(cookie, header) {
        warn!("CSRF token mismatch");
        return Err(CsrfError::Invalid);
    }

    trace!("CSRF token pair verified");
    Ok(())
}

/// Builds the `Set-Cookie` value carrying `token`.
///
/// The cookie is readable by scripts (no `HttpOnly`) so the client can echo it.
/// Fails only if `token` contains bytes not allowed in a header.
pub fn set_cookie_value(token: &str, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{CSRF_COOKIE_NAME}={token}; Path=/; Max-Age={}; SameSite=Strict",
        CSRF_TOKEN_TTL.as_secs()
    );
    if secure {
        cookie.push_str("; Secure");
    }

    HeaderValue::from_str(&cookie)
}
