use std::env;
use std::sync::LazyLock;

use tracing::error;

use crate::services::recommendation::SimilarityWeights;

fn env_bool(name: &str, fallback: bool) -> bool {
    match env::var(name) {
        Ok(val) => match val.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            _ => {
                error!("Invalid {name} env var `{val}`, using fallback {fallback}");
                fallback
            }
        },
        Err(_) => fallback,
    }
}

fn env_weight(name: &str, fallback: f64) -> f64 {
    match env::var(name) {
        Ok(val) => val.trim().parse().unwrap_or_else(|_| {
            error!("Invalid {name} env var `{val}`, using fallback {fallback}");
            fallback
        }),
        Err(_) => fallback,
    }
}

/// Always mark the anti-forgery cookie `Secure`, even on plain HTTP requests.
pub static CSRF_FORCE_SECURE: LazyLock<bool> =
    LazyLock::new(|| env_bool("CSRF_FORCE_SECURE", false));

/// Honour `X-Forwarded-Proto: https` from a TLS-terminating proxy.
pub static CSRF_TRUST_FORWARDED_PROTO: LazyLock<bool> =
    LazyLock::new(|| env_bool("CSRF_TRUST_FORWARDED_PROTO", true));

/// Similarity weights, overridable per signal through `SIMILARITY_WEIGHT_*`.
pub static SIMILARITY_WEIGHTS: LazyLock<SimilarityWeights> = LazyLock::new(|| {
    let defaults = SimilarityWeights::default();
    let weights = SimilarityWeights {
        category: env_weight("SIMILARITY_WEIGHT_CATEGORY", defaults.category),
        tags: env_weight("SIMILARITY_WEIGHT_TAGS", defaults.tags),
        price: env_weight("SIMILARITY_WEIGHT_PRICE", defaults.price),
        delivery: env_weight("SIMILARITY_WEIGHT_DELIVERY", defaults.delivery),
        trust: env_weight("SIMILARITY_WEIGHT_TRUST", defaults.trust),
    };

    weights.validate().map(|_| weights).unwrap_or_else(|e| {
        error!("Rejected similarity weights from env ({e}), using defaults");
        defaults
    })
});
