//! # Similar Gig Recommendations
//!
//! Content-based scoring of catalog gigs against a reference gig. Each signal is
//! normalized to `[0, 1]` and combined through [`SimilarityWeights`]:
//!
//! - **Category**: 1.0 on identical category, otherwise 0
//! - **Tags**: Jaccard similarity of the tag sets, 0 when either is empty
//! - **Price**: `1 - min(1, |a - b| / reference price)`
//! - **Delivery**: same formula over delivery days
//! - **Trust**: `1 - |trust(a) - trust(b)|`, see [`Gig::trust_level`]

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, instrument, trace};

use crate::error::{AppError, AppResult};
use crate::models::Gig;
use crate::services::catalog::GigRepository;
use crate::utils::constant::{
    DEFAULT_SIMILAR_LIMIT, DEFAULT_TRENDING_LIMIT, MAX_SIMILAR_LIMIT, MAX_TRENDING_LIMIT,
    TRENDING_WINDOW,
};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Minimum combined weight of the category and tag signals
pub const MIN_PRIMARY_WEIGHT: f64 = 0.5;

/// Weight of each similarity signal. Must be non-negative and sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityWeights {
    pub category: f64,
    pub tags: f64,
    pub price: f64,
    pub delivery: f64,
    pub trust: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            category: 0.30,
            tags: 0.25,
            price: 0.15,
            delivery: 0.10,
            trust: 0.20,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum WeightsError {
    #[error("weight `{0}` is negative or not finite")]
    Negative(&'static str),
    #[error("weights sum to {0}, expected 1.0")]
    BadSum(f64),
    #[error("category and tag weights sum to {0}, expected at least 0.5")]
    WeakPrimary(f64),
}

impl SimilarityWeights {
    fn named(&self) -> [(&'static str, f64); 5] {
        [
            ("category", self.category),
            ("tags", self.tags),
            ("price", self.price),
            ("delivery", self.delivery),
            ("trust", self.trust),
        ]
    }

    pub fn total(&self) -> f64 {
        self.named().iter().map(|(_, weight)| weight).sum()
    }

    /// Checks the weights form a valid scoring policy.
    pub fn validate(&self) -> Result<(), WeightsError> {
        if let Some((name, _)) = self
            .named()
            .into_iter()
            .find(|(_, weight)| !weight.is_finite() || *weight < 0.0)
        {
            return Err(WeightsError::Negative(name));
        }

        let total = self.total();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(WeightsError::BadSum(total));
        }

        let primary = self.category + self.tags;
        if primary + WEIGHT_SUM_TOLERANCE < MIN_PRIMARY_WEIGHT {
            return Err(WeightsError::WeakPrimary(primary));
        }

        Ok(())
    }
}

/// Parameters of a similar-gigs lookup, already normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimilarQuery {
    pub gig_id: i64,
    /// Between 1 and [`MAX_SIMILAR_LIMIT`]
    pub k: usize,
    pub exclude_same_seller: bool,
}

impl SimilarQuery {
    /// Builds a query, replacing a non-positive `k` with the default and capping it.
    pub fn new(gig_id: i64, k: i64, exclude_same_seller: bool) -> Self {
        let k = if k <= 0 {
            DEFAULT_SIMILAR_LIMIT
        } else {
            usize::try_from(k).map_or(MAX_SIMILAR_LIMIT, |k| k.min(MAX_SIMILAR_LIMIT))
        };

        Self {
            gig_id,
            k,
            exclude_same_seller,
        }
    }

    /// Builds a query from loosely typed request input.
    ///
    /// A gig id that is not an integer cannot name a gig, so it is reported as
    /// `NotFound`. A malformed `k` or flag falls back to its default, an
    /// overflowing `k` is capped.
    pub fn from_raw(
        gig_id: &str,
        k: Option<&str>,
        exclude_same_seller: Option<&str>,
    ) -> AppResult<Self> {
        let gig_id = gig_id
            .trim()
            .parse::<i64>()
            .map_err(|_| AppError::NotFound("Gig not found"))?;
        let k = k.map(str::trim).map_or(0, parse_k);
        let exclude_same_seller = exclude_same_seller
            .and_then(parse_flag)
            .unwrap_or(true);

        Ok(Self::new(gig_id, k, exclude_same_seller))
    }
}

/// Digits-only values too large for `i64` are still positive and hit the cap.
fn parse_k(raw: &str) -> i64 {
    match raw.parse::<i64>() {
        Ok(k) => k,
        Err(_) if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) => i64::MAX,
        Err(_) => 0,
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// A candidate gig with its similarity to the reference gig
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredGig {
    pub gig: Gig,
    pub score: f64,
}

pub struct RecommendationService;

impl RecommendationService {
    /// Weighted similarity of `candidate` to `reference`, in `[0, 1]` for valid weights.
    pub fn calculate_similarity_score(
        reference: &Gig,
        candidate: &Gig,
        weights: &SimilarityWeights,
    ) -> f64 {
        let category = Self::category_match(reference, candidate);
        let tags = Self::tag_overlap(&reference.tags, &candidate.tags);
        let price = Self::proximity(reference.price as f64, candidate.price as f64);
        let delivery = Self::proximity(
            f64::from(reference.delivery_days),
            f64::from(candidate.delivery_days),
        );
        let trust = Self::trust_proximity(reference, candidate);

        let score = category * weights.category
            + tags * weights.tags
            + price * weights.price
            + delivery * weights.delivery
            + trust * weights.trust;

        trace!(
            reference = reference.id,
            candidate = candidate.id,
            category,
            tags,
            price,
            delivery,
            trust,
            "Similarity score calculated: {}",
            score
        );

        score
    }

    fn category_match(a: &Gig, b: &Gig) -> f64 {
        if a.category.trim().eq_ignore_ascii_case(b.category.trim()) {
            1.0
        } else {
            0.0
        }
    }

    /// Jaccard similarity of two tag lists, compared case-insensitively
    pub fn tag_overlap(tags_a: &[String], tags_b: &[String]) -> f64 {
        let to_set = |tags: &[String]| -> HashSet<String> {
            tags.iter()
                .map(|tag| tag.trim().to_lowercase())
                .filter(|tag| !tag.is_empty())
                .collect()
        };
        let set_a = to_set(tags_a);
        let set_b = to_set(tags_b);

        if set_a.is_empty() || set_b.is_empty() {
            return 0.0;
        }

        let intersection = set_a.intersection(&set_b).count();
        let union = set_a.union(&set_b).count();
        intersection as f64 / union as f64
    }

    /// `1 - min(1, |reference - candidate| / reference)`, normalized by the reference value.
    pub fn proximity(reference: f64, candidate: f64) -> f64 {
        if reference <= 0.0 {
            // Nothing to normalize by; only an exact match counts
            return if candidate == reference { 1.0 } else { 0.0 };
        }

        let diff = (reference - candidate).abs() / reference;
        (1.0 - diff.min(1.0)).max(0.0)
    }

    fn trust_proximity(a: &Gig, b: &Gig) -> f64 {
        (1.0 - (a.trust_level() - b.trust_level()).abs()).clamp(0.0, 1.0)
    }

    /// Higher score first, then more completed orders, then lower id.
    fn compare_ranked(a: &ScoredGig, b: &ScoredGig) -> Ordering {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.gig.completed_orders.cmp(&a.gig.completed_orders))
            .then_with(|| a.gig.id.cmp(&b.gig.id))
    }

    /// Scores and ranks `candidates` against `reference`, keeping the top `k`.
    ///
    /// The reference gig itself, unlisted gigs and (optionally) gigs of the same
    /// seller never appear in the result.
    pub fn rank_similar(
        reference: &Gig,
        candidates: &[Gig],
        query: &SimilarQuery,
        weights: &SimilarityWeights,
    ) -> Vec<ScoredGig> {
        let mut scored: Vec<ScoredGig> = candidates
            .iter()
            .filter(|candidate| candidate.id != reference.id && candidate.is_listed())
            .filter(|candidate| {
                !(query.exclude_same_seller && candidate.seller_id == reference.seller_id)
            })
            .map(|candidate| ScoredGig {
                score: Self::calculate_similarity_score(reference, candidate, weights),
                gig: candidate.clone(),
            })
            .collect();

        scored.sort_by(Self::compare_ranked);
        scored.truncate(query.k);
        scored
    }

    /// Looks up the reference gig and ranks every other listed gig against it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the reference gig does not exist or is not listed.
    #[instrument(skip(catalog, weights), err)]
    pub async fn get_similar(
        catalog: &dyn GigRepository,
        query: &SimilarQuery,
        weights: &SimilarityWeights,
    ) -> AppResult<Vec<ScoredGig>> {
        let Some(reference) = catalog.find_listed(query.gig_id).await? else {
            debug!("Reference gig not found or not listed");
            return Err(AppError::NotFound("Gig not found"));
        };

        let candidates = catalog.listed_gigs().await?;
        let ranked = Self::rank_similar(&reference, &candidates, query, weights);

        debug!(
            candidates = candidates.len(),
            returned = ranked.len(),
            "Similar gigs ranked"
        );
        Ok(ranked)
    }

    /// Clamps a requested trending limit, using the default when absent or not positive.
    pub fn trending_limit(limit: Option<i64>) -> usize {
        match limit {
            Some(limit) if limit > 0 => {
                usize::try_from(limit).map_or(MAX_TRENDING_LIMIT, |l| l.min(MAX_TRENDING_LIMIT))
            }
            _ => DEFAULT_TRENDING_LIMIT,
        }
    }

    /// Listed gigs created within the trending window, most completed orders first.
    ///
    /// Ties fall back to higher rating, then lower id.
    pub fn rank_trending(gigs: Vec<Gig>, now: OffsetDateTime, limit: usize) -> Vec<Gig> {
        let cutoff = now - TRENDING_WINDOW;
        let mut trending: Vec<Gig> = gigs
            .into_iter()
            .filter(|gig| gig.is_listed() && gig.created_at >= cutoff)
            .collect();

        trending.sort_by(|a, b| {
            b.completed_orders
                .cmp(&a.completed_orders)
                .then_with(|| b.average_rating.total_cmp(&a.average_rating))
                .then_with(|| a.id.cmp(&b.id))
        });
        trending.truncate(limit);
        trending
    }

    #[instrument(skip(catalog), err)]
    pub async fn get_trending(catalog: &dyn GigRepository, limit: usize) -> AppResult<Vec<Gig>> {
        let gigs = catalog.listed_gigs().await?;
        let trending = Self::rank_trending(gigs, OffsetDateTime::now_utc(), limit);
        debug!(returned = trending.len(), "Trending gigs ranked");
        Ok(trending)
    }
}
