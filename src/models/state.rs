use std::sync::Arc;

use tracing::{debug, info};

use crate::services::{
    catalog::GigRepository, csrf::CsrfConfig, recommendation::SimilarityWeights,
};

/// Application state shared across requests. Needs to be thread-safe.
pub struct AppState {
    /// Source of gigs for lookups, publishing and recommendations.
    pub catalog: Arc<dyn GigRepository>,
    /// Cookie attributes for the anti-forgery token.
    pub csrf: CsrfConfig,
    /// Weights used to score similar gigs.
    pub weights: SimilarityWeights,
}

impl AppState {
    /// Creates a new application state with the provided services.
    ///
    /// # Arguments
    ///
    /// * `catalog` - Gig repository backing the API
    /// * `csrf` - Anti-forgery cookie configuration
    /// * `weights` - Validated similarity weights
    pub fn new(
        catalog: Arc<dyn GigRepository>,
        csrf: CsrfConfig,
        weights: SimilarityWeights,
    ) -> Self {
        info!("Initializing application state");
        debug!(?csrf, ?weights, "Using configuration");

        Self {
            catalog,
            csrf,
            weights,
        }
    }
}
