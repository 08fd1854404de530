//! # Gig Types
//!
//! A gig is a listed service offering in the marketplace catalog. The
//! [`GigStatus`] enum corresponds to the PostgreSQL `gig_status` enum type.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::utils::constant::MAX_RATING;

/// Publication state of a gig.
///
/// Only [`GigStatus::Published`] gigs that are also `active` are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "gig_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GigStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

/// A catalog item, as read by the recommender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Gig {
    pub id: i64,
    pub seller_id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    /// In cents
    pub price: i64,
    pub delivery_days: i32,
    pub status: GigStatus,
    pub active: bool,
    pub completed_orders: i64,
    /// Between 0.0 and 5.0
    pub average_rating: f64,
    pub seller_verified: bool,
    #[serde(with = "time::serde::rfc3339", default = "now_utc")]
    pub created_at: OffsetDateTime,
}

fn now_utc() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

impl Gig {
    /// Whether the gig is visible to buyers and eligible for recommendations
    pub fn is_listed(&self) -> bool {
        self.status == GigStatus::Published && self.active
    }

    /// Seller trust level in `[0, 1]`, combining rating and verification.
    ///
    /// A non-finite rating counts as no rating.
    pub fn trust_level(&self) -> f64 {
        let rating = if self.average_rating.is_finite() {
            self.average_rating.clamp(0.0, MAX_RATING) / MAX_RATING
        } else {
            0.0
        };
        let verified = if self.seller_verified { 1.0 } else { 0.0 };
        0.8 * rating + 0.2 * verified
    }
}

/// A gig about to be published; the catalog assigns id, counters and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGig {
    pub seller_id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub price: i64,
    pub delivery_days: i32,
    pub seller_verified: bool,
}

/// Trims, lower-cases and de-duplicates tags while keeping first-seen order.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim().to_lowercase();
        if !tag.is_empty() && !normalized.contains(&tag) {
            normalized.push(tag);
        }
    }
    normalized
}
