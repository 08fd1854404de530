mod common;

use flinkly::error::AppError;
use flinkly::models::GigStatus;
use flinkly::services::catalog::{GigRepository, InMemoryCatalog};
use flinkly::services::recommendation::{
    RecommendationService, SimilarQuery, SimilarityWeights, WeightsError,
};
use time::{Duration, OffsetDateTime};

use common::{sample_catalog, sample_gig};

fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|tag| tag.to_string()).collect()
}

#[test]
fn identical_gigs_score_one() {
    let weights = SimilarityWeights::default();
    let a = sample_gig(1, 1, "design", &["logo", "branding"], 5000, 3, 4.8);
    let b = sample_gig(2, 2, "design", &["branding", "logo"], 5000, 3, 4.8);

    let score = RecommendationService::calculate_similarity_score(&a, &b, &weights);
    assert!((score - 1.0).abs() < 1e-9, "score was {score}");
}

#[test]
fn closer_candidate_scores_higher() {
    let weights = SimilarityWeights::default();
    let reference = sample_gig(1, 1, "design", &["logo", "branding"], 5000, 3, 4.8);
    let candidate_a = sample_gig(2, 2, "design", &["logo"], 5200, 3, 4.8);
    let candidate_b = sample_gig(3, 3, "writing", &[], 20000, 10, 3.0);

    let score_a =
        RecommendationService::calculate_similarity_score(&reference, &candidate_a, &weights);
    let score_b =
        RecommendationService::calculate_similarity_score(&reference, &candidate_b, &weights);

    // 0.30 category + 0.25 * 1/2 tags + 0.15 * 0.96 price + 0.10 delivery + 0.20 trust
    assert!((score_a - 0.869).abs() < 1e-9, "score was {score_a}");
    assert!(score_a > score_b);
    assert!((0.0..=1.0).contains(&score_b));
}

#[test]
fn tag_overlap_is_jaccard() {
    assert_eq!(
        RecommendationService::tag_overlap(&tags(&["logo", "branding"]), &tags(&["logo"])),
        0.5
    );
    assert_eq!(
        RecommendationService::tag_overlap(&tags(&["a", "b", "c"]), &tags(&["b", "c", "d"])),
        0.5
    );
    assert_eq!(
        RecommendationService::tag_overlap(&tags(&["Logo"]), &tags(&["logo"])),
        1.0
    );
    assert_eq!(RecommendationService::tag_overlap(&tags(&["logo"]), &[]), 0.0);
    assert_eq!(RecommendationService::tag_overlap(&[], &[]), 0.0);
    assert_eq!(RecommendationService::tag_overlap(&tags(&["x"]), &tags(&["y"])), 0.0);
}

#[test]
fn proximity_is_floored_and_normalized_by_reference() {
    assert_eq!(RecommendationService::proximity(5000.0, 5000.0), 1.0);
    assert!((RecommendationService::proximity(5000.0, 5200.0) - 0.96).abs() < 1e-12);
    assert!((RecommendationService::proximity(5000.0, 4800.0) - 0.96).abs() < 1e-12);
    assert_eq!(RecommendationService::proximity(5000.0, 20000.0), 0.0);
    assert_eq!(RecommendationService::proximity(3.0, 10.0), 0.0);
    assert_eq!(RecommendationService::proximity(0.0, 0.0), 1.0);
    assert_eq!(RecommendationService::proximity(0.0, 5.0), 0.0);
}

#[test]
fn default_weights_are_valid_and_favour_relevance() {
    let weights = SimilarityWeights::default();
    assert_eq!(weights.validate(), Ok(()));
    assert!((weights.total() - 1.0).abs() < 1e-9);
    assert!(weights.category + weights.tags >= 0.5);
}

#[test]
fn invalid_weights_are_rejected() {
    let bad_sum = SimilarityWeights {
        trust: 0.5,
        ..SimilarityWeights::default()
    };
    assert!(matches!(bad_sum.validate(), Err(WeightsError::BadSum(_))));

    let weak_primary = SimilarityWeights {
        category: 0.2,
        tags: 0.2,
        price: 0.2,
        delivery: 0.2,
        trust: 0.2,
    };
    assert!(matches!(weak_primary.validate(), Err(WeightsError::WeakPrimary(_))));

    let negative = SimilarityWeights {
        category: 0.7,
        tags: 0.5,
        price: -0.2,
        delivery: 0.0,
        trust: 0.0,
    };
    assert_eq!(negative.validate(), Err(WeightsError::Negative("price")));
}

#[test]
fn custom_weights_change_ranking() {
    let reference = sample_gig(1, 1, "design", &["logo"], 5000, 3, 4.8);
    // Same category, far price
    let same_category = sample_gig(2, 2, "design", &[], 20000, 3, 4.8);
    // Other category, same price and tags
    let same_tags = sample_gig(3, 3, "writing", &["logo"], 5000, 3, 4.8);
    let candidates = vec![same_category, same_tags];

    let category_heavy = SimilarityWeights {
        category: 0.5,
        tags: 0.1,
        price: 0.1,
        delivery: 0.1,
        trust: 0.2,
    };
    let tag_heavy = SimilarityWeights {
        category: 0.1,
        tags: 0.5,
        price: 0.1,
        delivery: 0.1,
        trust: 0.2,
    };

    let query = SimilarQuery::new(1, 8, true);
    let ranked =
        RecommendationService::rank_similar(&reference, &candidates, &query, &category_heavy);
    assert_eq!(ranked[0].gig.id, 2);

    let ranked = RecommendationService::rank_similar(&reference, &candidates, &query, &tag_heavy);
    assert_eq!(ranked[0].gig.id, 3);
}

#[test]
fn ranking_excludes_reference_unlisted_and_same_seller() {
    let gigs = sample_catalog();
    let reference = gigs[0].clone();
    let weights = SimilarityWeights::default();

    let ranked = RecommendationService::rank_similar(
        &reference,
        &gigs,
        &SimilarQuery::new(reference.id, 8, true),
        &weights,
    );
    let ids: Vec<i64> = ranked.iter().map(|scored| scored.gig.id).collect();
    assert_eq!(ids, vec![3, 5, 4]);
    assert!(ranked.windows(2).all(|pair| pair[0].score >= pair[1].score));

    let ranked = RecommendationService::rank_similar(
        &reference,
        &gigs,
        &SimilarQuery::new(reference.id, 8, false),
        &weights,
    );
    let ids: Vec<i64> = ranked.iter().map(|scored| scored.gig.id).collect();
    assert_eq!(ids, vec![2, 3, 5, 4]);
}

#[test]
fn non_finite_rating_counts_as_unrated() {
    let reference = sample_gig(1, 1, "design", &["logo"], 5000, 3, 4.8);
    let unrated = sample_gig(2, 2, "design", &["logo"], 5000, 3, 0.0);
    let mut corrupted = sample_gig(3, 3, "design", &["logo"], 5000, 3, f64::NAN);
    corrupted.completed_orders = 1;

    assert_eq!(corrupted.trust_level(), 0.0);
    let mut infinite = corrupted.clone();
    infinite.average_rating = f64::INFINITY;
    assert_eq!(infinite.trust_level(), 0.0);

    let weights = SimilarityWeights::default();
    let score = RecommendationService::calculate_similarity_score(&reference, &corrupted, &weights);
    assert!(score.is_finite());

    let better = sample_gig(4, 4, "design", &["logo"], 5000, 3, 4.8);
    let ranked = RecommendationService::rank_similar(
        &reference,
        &[corrupted, unrated, better],
        &SimilarQuery::new(1, 8, true),
        &weights,
    );
    let ids: Vec<i64> = ranked.iter().map(|scored| scored.gig.id).collect();
    assert_eq!(ids, vec![4, 3, 2]);
}

#[test]
fn ties_break_on_completed_orders_then_lower_id() {
    let reference = sample_gig(1, 1, "design", &["logo"], 5000, 3, 4.8);
    let mut busy = sample_gig(9, 2, "design", &["logo"], 5000, 3, 4.8);
    busy.completed_orders = 25;
    let quiet_low_id = sample_gig(4, 3, "design", &["logo"], 5000, 3, 4.8);
    let quiet_high_id = sample_gig(7, 4, "design", &["logo"], 5000, 3, 4.8);
    let candidates = vec![quiet_high_id, quiet_low_id, busy];

    let ranked = RecommendationService::rank_similar(
        &reference,
        &candidates,
        &SimilarQuery::new(1, 8, true),
        &SimilarityWeights::default(),
    );
    let ids: Vec<i64> = ranked.iter().map(|scored| scored.gig.id).collect();
    assert_eq!(ids, vec![9, 4, 7]);
}

#[test]
fn fewer_candidates_than_k_returns_all() {
    let gigs = sample_catalog();
    let ranked = RecommendationService::rank_similar(
        &gigs[0],
        &gigs,
        &SimilarQuery::new(1, 50, true),
        &SimilarityWeights::default(),
    );
    assert_eq!(ranked.len(), 3);

    let ranked = RecommendationService::rank_similar(
        &gigs[0],
        &gigs,
        &SimilarQuery::new(1, 2, true),
        &SimilarityWeights::default(),
    );
    assert_eq!(ranked.len(), 2);
}

#[test]
fn query_normalizes_loose_input() {
    let query = SimilarQuery::from_raw("12", None, None).unwrap();
    assert_eq!(query, SimilarQuery { gig_id: 12, k: 8, exclude_same_seller: true });

    assert_eq!(SimilarQuery::from_raw("12", Some("0"), None).unwrap().k, 8);
    assert_eq!(SimilarQuery::from_raw("12", Some("-3"), None).unwrap().k, 8);
    assert_eq!(SimilarQuery::from_raw("12", Some("abc"), None).unwrap().k, 8);
    assert_eq!(SimilarQuery::from_raw("12", Some("20"), None).unwrap().k, 20);
    assert_eq!(SimilarQuery::from_raw("12", Some("100"), None).unwrap().k, 50);
    assert_eq!(
        SimilarQuery::from_raw("12", Some("99999999999999999999"), None)
            .unwrap()
            .k,
        50
    );
    assert_eq!(
        SimilarQuery::from_raw("12", Some("-99999999999999999999"), None)
            .unwrap()
            .k,
        8
    );

    assert!(!SimilarQuery::from_raw("12", None, Some("false")).unwrap().exclude_same_seller);
    assert!(!SimilarQuery::from_raw("12", None, Some("NO")).unwrap().exclude_same_seller);
    assert!(SimilarQuery::from_raw("12", None, Some("maybe")).unwrap().exclude_same_seller);

    assert!(matches!(
        SimilarQuery::from_raw("abc", None, None),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn trending_respects_window_and_order() {
    let now = OffsetDateTime::now_utc();
    let mut gigs = sample_catalog();
    gigs[1].completed_orders = 5;
    gigs[2].completed_orders = 5;
    gigs[2].average_rating = 4.9;
    gigs[3].created_at = now - Duration::days(45);
    gigs[3].completed_orders = 500;

    let trending = RecommendationService::rank_trending(gigs.clone(), now, 10);
    let ids: Vec<i64> = trending.iter().map(|gig| gig.id).collect();
    assert_eq!(ids, vec![3, 2, 1, 5]);

    let trending = RecommendationService::rank_trending(gigs, now, 2);
    assert_eq!(trending.len(), 2);

    assert_eq!(RecommendationService::trending_limit(None), 6);
    assert_eq!(RecommendationService::trending_limit(Some(0)), 6);
    assert_eq!(RecommendationService::trending_limit(Some(4)), 4);
    assert_eq!(RecommendationService::trending_limit(Some(100)), 20);
}

#[test_log::test(tokio::test)]
async fn get_similar_reads_catalog_snapshot() {
    let catalog = InMemoryCatalog::from_gigs(sample_catalog());
    let weights = SimilarityWeights::default();

    let query = SimilarQuery::new(1, 8, true);
    let ranked = RecommendationService::get_similar(&catalog, &query, &weights)
        .await
        .unwrap();
    assert_eq!(ranked.len(), 3);
    assert!(ranked.iter().all(|scored| scored.gig.id != 1));

    let query = SimilarQuery::new(99, 8, true);
    let missing = RecommendationService::get_similar(&catalog, &query, &weights).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    // Draft reference is not listed
    let query = SimilarQuery::new(6, 8, true);
    let draft = RecommendationService::get_similar(&catalog, &query, &weights).await;
    assert!(matches!(draft, Err(AppError::NotFound(_))));
}

#[test_log::test(tokio::test)]
async fn archiving_a_gig_removes_it_from_recommendations() {
    let catalog = InMemoryCatalog::from_gigs(sample_catalog());
    let mut archived = catalog.find_listed(3).await.unwrap().unwrap();
    archived.status = GigStatus::Archived;
    catalog.insert(archived);

    let ranked = RecommendationService::get_similar(
        &catalog,
        &SimilarQuery::new(1, 8, true),
        &SimilarityWeights::default(),
    )
    .await
    .unwrap();
    let ids: Vec<i64> = ranked.iter().map(|scored| scored.gig.id).collect();
    assert_eq!(ids, vec![5, 4]);
}
