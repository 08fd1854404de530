//! # Application Constants
//!
//! This module defines configuration constants used throughout the Flinkly service.
//! These constants control token lifetimes, result-set limits and catalog rules.

use std::time::Duration;

/// Name of the cookie carrying the anti-forgery token
pub const CSRF_COOKIE_NAME: &str = "csrf_token";

/// Name of the request header that must echo the cookie on unsafe methods
pub const CSRF_HEADER_NAME: &str = "x-csrf-token";

/// Response header echoing the id minted for each request
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Number of random bytes in a token (256 bits, 64 hex characters)
pub const CSRF_TOKEN_BYTES: usize = 32;

/// Lifetime of the anti-forgery cookie
///
/// Once the cookie expires the client must perform a safe request to obtain a new one.
pub const CSRF_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Result-set size used when `k` is absent, malformed or not positive
pub const DEFAULT_SIMILAR_LIMIT: usize = 8;

/// Upper bound for `k` on similarity queries
pub const MAX_SIMILAR_LIMIT: usize = 50;

/// Number of trending gigs returned when no limit is given
pub const DEFAULT_TRENDING_LIMIT: usize = 6;

/// Upper bound for the trending limit
pub const MAX_TRENDING_LIMIT: usize = 20;

/// Only gigs created inside this window are considered trending
pub const TRENDING_WINDOW: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Highest price a gig can be listed for, in cents (250 EUR)
pub const MAX_GIG_PRICE_CENTS: i64 = 25_000;

/// Longest delivery time a gig can promise, in days
pub const MAX_DELIVERY_DAYS: i32 = 90;

/// Maximum number of tags per gig
pub const MAX_TAGS_PER_GIG: usize = 10;

/// Maximum length of a single tag
pub const MAX_TAG_LENGTH: usize = 32;

/// Highest possible seller rating
pub const MAX_RATING: f64 = 5.0;
