//! # Gig Handlers
//!
//! This module implements the catalog endpoints: fetching and publishing gigs,
//! and the similar and trending recommendation lists.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use validator::{Validate, ValidationError};

use crate::error::{AppError, AppResult};
use crate::models::{AppState, NewGig, normalize_tags};
use crate::services::recommendation::{RecommendationService, SimilarQuery};
use crate::utils::constant::{
    MAX_DELIVERY_DAYS, MAX_GIG_PRICE_CENTS, MAX_TAG_LENGTH, MAX_TAGS_PER_GIG,
};

/// Request payload for publishing a gig
#[derive(Debug, Deserialize, Validate)]
pub struct PublishGigRequest {
    #[validate(range(min = 1))]
    pub seller_id: i64,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(min = 1, max = 64))]
    pub category: String,
    #[serde(default)]
    #[validate(custom(function = "validate_tags"))]
    pub tags: Vec<String>,
    /// In cents, at most 250 EUR
    #[validate(range(min = 1, max = MAX_GIG_PRICE_CENTS))]
    pub price: i64,
    #[validate(range(min = 1, max = MAX_DELIVERY_DAYS))]
    pub delivery_days: i32,
}

#[allow(clippy::ptr_arg)]
fn validate_tags(tags: &Vec<String>) -> Result<(), ValidationError> {
    if tags.len() > MAX_TAGS_PER_GIG {
        return Err(ValidationError::new("too_many_tags"));
    }
    if tags
        .iter()
        .any(|tag| tag.trim().is_empty() || tag.trim().chars().count() > MAX_TAG_LENGTH)
    {
        return Err(ValidationError::new("invalid_tag"));
    }
    Ok(())
}

impl From<PublishGigRequest> for NewGig {
    fn from(req: PublishGigRequest) -> Self {
        NewGig {
            seller_id: req.seller_id,
            title: req.title.trim().to_string(),
            description: req.description,
            category: req.category.trim().to_string(),
            tags: normalize_tags(&req.tags),
            price: req.price,
            delivery_days: req.delivery_days,
            // Verification is granted by moderation, never self-declared
            seller_verified: false,
        }
    }
}

/// Query parameters of the similar gigs endpoint, kept loose on purpose:
/// malformed values fall back to defaults instead of rejecting the request.
#[derive(Debug, Deserialize)]
pub struct SimilarParams {
    pub k: Option<String>,
    #[serde(alias = "excludeSameSeller")]
    pub exclude_same_seller: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrendingParams {
    pub limit: Option<String>,
}

/// Gets a single listed gig.
///
/// GET /api/gigs/{id}
///
/// # Returns
///
/// - `200 OK` with the gig
/// - `404 Not Found` - Unknown id, unlisted gig, or non-numeric id
#[instrument(skip(state))]
pub async fn get_gig(
    State(state): State<Arc<AppState>>,
    Path(gig_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let gig_id: i64 = gig_id
        .trim()
        .parse()
        .map_err(|_| AppError::NotFound("Gig not found"))?;

    let gig = state
        .catalog
        .find_listed(gig_id)
        .await?
        .ok_or(AppError::NotFound("Gig not found"))?;

    debug!("Gig retrieved");
    Ok(Json(gig))
}

/// Publishes a new gig.
///
/// POST /api/gigs
///
/// # Returns
///
/// - `201 Created` with the stored gig
/// - `400 Bad Request` - Payload is malformed or failed validation
/// - `403 Forbidden` - Missing or invalid CSRF token (rejected by middleware)
#[instrument(skip_all, fields(seller_id = tracing::field::Empty))]
pub async fn publish_gig(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PublishGigRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(payload) = payload.map_err(|e| {
        warn!(error = %e.body_text(), "Malformed gig submission");
        AppError::BadRequest("Invalid gig submission")
    })?;
    tracing::Span::current().record("seller_id", payload.seller_id);

    if let Err(e) = payload.validate() {
        warn!(error = %e, "Invalid gig submission");
        return Err(AppError::BadRequest("Invalid gig submission"));
    }

    let gig = state.catalog.publish(payload.into()).await?;
    info!(gig_id = gig.id, "Gig published");
    Ok((StatusCode::CREATED, Json(gig)))
}

/// Lists gigs similar to the given one.
///
/// GET /api/gigs/{id}/similar ?k=8&exclude_same_seller=true
///
/// # Query Parameters
///
/// - `k`: Result size (default: 8, max: 50; non-positive or malformed values use the default)
/// - `exclude_same_seller`: Skip gigs of the reference seller (default: true)
///
/// # Returns
///
/// - `200 OK` with `[{"gig": Gig, "score": f64}]`, best match first
/// - `404 Not Found` - Reference gig does not exist or is not listed
#[instrument(skip(state))]
pub async fn similar_gigs(
    State(state): State<Arc<AppState>>,
    Path(gig_id): Path<String>,
    Query(params): Query<SimilarParams>,
) -> AppResult<impl IntoResponse> {
    let query = SimilarQuery::from_raw(
        &gig_id,
        params.k.as_deref(),
        params.exclude_same_seller.as_deref(),
    )?;

    let items =
        RecommendationService::get_similar(state.catalog.as_ref(), &query, &state.weights).await?;

    debug!(returned = items.len(), "Similar gigs served");
    Ok(Json(items))
}

/// Lists trending gigs.
///
/// GET /api/gigs/trending ?limit=6
///
/// # Query Parameters
///
/// - `limit`: Result size (default: 6, max: 20)
#[instrument(skip(state))]
pub async fn trending_gigs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TrendingParams>,
) -> AppResult<impl IntoResponse> {
    let limit = RecommendationService::trending_limit(
        params
            .limit
            .as_deref()
            .and_then(|limit| limit.trim().parse().ok()),
    );

    let gigs = RecommendationService::get_trending(state.catalog.as_ref(), limit).await?;
    Ok(Json(gigs))
}
