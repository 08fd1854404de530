//! # Flinkly - Marketplace Backend
//!
//! ## Modules
//!
//! - [`handlers`] - HTTP request handlers for the catalog endpoints
//! - [`middleware`] - Double-submit-cookie CSRF protection
//! - [`models`] - Gig types and shared application state
//! - [`services`] - Catalog storage, CSRF tokens and recommendations
//! - [`utils`] - Constants, secrets and env-derived settings

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{get_gig, health_check, publish_gig, similar_gigs, trending_gigs};
use crate::middleware::csrf_middleware;
use crate::models::AppState;
use crate::services::{
    catalog::GigRepository, csrf::CsrfConfig, recommendation::SimilarityWeights,
};
use crate::utils::static_object::SIMILARITY_WEIGHTS;

/// Creates an Axum router configured from the environment.
///
/// This is a convenience function that calls [`app_with_config`] with the CSRF
/// cookie settings and similarity weights read from env variables.
///
/// # Environment Variables
///
/// - `CSRF_FORCE_SECURE` - Always mark the CSRF cookie `Secure` (default: false)
/// - `CSRF_TRUST_FORWARDED_PROTO` - Honour `X-Forwarded-Proto` (default: true)
/// - `SIMILARITY_WEIGHT_{CATEGORY,TAGS,PRICE,DELIVERY,TRUST}` - Signal weights
#[inline]
pub fn app(catalog: Arc<dyn GigRepository>) -> Router {
    app_with_config(catalog, CsrfConfig::from_env(), *SIMILARITY_WEIGHTS)
}

/// Creates an Axum router with application routes and state.
///
/// Every route, including the fallback, sits behind [`csrf_middleware`].
///
/// # Arguments
///
/// * `catalog` - Gig repository backing the API
/// * `csrf` - CSRF cookie configuration
/// * `weights` - Similarity weights; expected to pass [`SimilarityWeights::validate`]
pub fn app_with_config(
    catalog: Arc<dyn GigRepository>,
    csrf: CsrfConfig,
    weights: SimilarityWeights,
) -> Router {
    let state = Arc::new(AppState::new(catalog, csrf, weights));

    Router::new()
        .route("/health-check", get(health_check))
        .route("/api/gigs", post(publish_gig))
        .route("/api/gigs/trending", get(trending_gigs))
        .route("/api/gigs/{id}", get(get_gig))
        .route("/api/gigs/{id}/similar", get(similar_gigs))
        .layer(from_fn_with_state(Arc::clone(&state), csrf_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
