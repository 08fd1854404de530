#![allow(dead_code)]

use std::sync::{Arc, Once};

use flinkly::models::{Gig, GigStatus};
use flinkly::services::{
    catalog::InMemoryCatalog, csrf::CsrfConfig, recommendation::SimilarityWeights,
};
use reqwest::header::{HeaderMap, SET_COOKIE};
use time::OffsetDateTime;
use tokio::net::TcpListener;

pub fn init_tracing_once() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("flinkly=debug")
            .with_test_writer()
            .init();
    });
}

/// Builds a listed gig with neutral trust signals.
pub fn sample_gig(
    id: i64,
    seller_id: i64,
    category: &str,
    tags: &[&str],
    price: i64,
    delivery_days: i32,
    average_rating: f64,
) -> Gig {
    Gig {
        id,
        seller_id,
        title: format!("Gig {id}"),
        description: format!("Description of gig {id}"),
        category: category.to_string(),
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        price,
        delivery_days,
        status: GigStatus::Published,
        active: true,
        completed_orders: 0,
        average_rating,
        seller_verified: false,
        created_at: OffsetDateTime::now_utc(),
    }
}

/// A small catalog: gig 1 is the reference, seller 10 owns gigs 1 and 2.
pub fn sample_catalog() -> Vec<Gig> {
    let mut draft = sample_gig(6, 14, "design", &["logo"], 5000, 3, 4.8);
    draft.status = GigStatus::Draft;

    let mut inactive = sample_gig(7, 15, "design", &["logo"], 5000, 3, 4.8);
    inactive.active = false;

    vec![
        sample_gig(1, 10, "design", &["logo", "branding"], 5000, 3, 4.8),
        sample_gig(2, 10, "design", &["logo", "branding"], 5000, 3, 4.8),
        sample_gig(3, 11, "design", &["logo"], 5200, 3, 4.8),
        sample_gig(4, 12, "writing", &[], 20000, 10, 3.0),
        sample_gig(5, 13, "design", &["branding", "print"], 7000, 5, 4.0),
        draft,
        inactive,
    ]
}

/// Spawns the application on a random port with the given catalog.
///
/// Returned address format: `http://127.0.0.1:8492`
pub async fn spawn_app(catalog: Arc<InMemoryCatalog>) -> String {
    init_tracing_once();

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port at localhost");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        let app = flinkly::app_with_config(
            catalog,
            CsrfConfig::default(),
            SimilarityWeights::default(),
        );
        axum::serve(listener, app).await.unwrap();
    });

    let address = format!("http://127.0.0.1:{port}");

    // Wait for server to be ready
    let client = reqwest::Client::new();
    for _ in 0..10 {
        if client
            .get(format!("{address}/health-check"))
            .send()
            .await
            .is_ok()
        {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }

    address
}

/// All `Set-Cookie` values carrying the CSRF token.
pub fn csrf_set_cookies(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter(|value| value.starts_with("csrf_token="))
        .map(str::to_string)
        .collect()
}

/// The token value of the single CSRF `Set-Cookie` header, if any.
pub fn csrf_token(headers: &HeaderMap) -> Option<String> {
    let cookies = csrf_set_cookies(headers);
    assert!(cookies.len() <= 1, "more than one CSRF cookie set: {cookies:?}");
    cookies.first().map(|cookie| {
        cookie
            .trim_start_matches("csrf_token=")
            .split(';')
            .next()
            .unwrap_or_default()
            .to_string()
    })
}

/// Performs a GET on the health check and returns the issued token.
pub async fn fetch_token(client: &reqwest::Client, address: &str) -> String {
    let response = client
        .get(format!("{address}/health-check"))
        .send()
        .await
        .expect("Failed to execute request");
    csrf_token(response.headers()).expect("GET should issue a CSRF cookie")
}
