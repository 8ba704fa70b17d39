//! HTTP API for random questions, packages and search.
//!
//! Read-only JSON endpoints over the sampling and search core. Random and
//! search endpoints are rate limited per client address.

mod handlers;
mod middleware;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Settings;
use crate::rate_limit::{InMemoryRateLimitBackend, RateLimitBackend};
use crate::repository::{QuestionRepository, QuestionStore};
use crate::sampling::{CountCache, QuestionSampler};
use crate::search::{SearchIndex, SearchService};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub questions: Arc<QuestionRepository>,
    pub sampler: QuestionSampler,
    /// Counts for the three categories shown on question pages.
    pub page_counts: Arc<CountCache>,
    pub search: SearchService,
    pub rate_limiter: Arc<dyn RateLimitBackend>,
    pub default_quantity: u32,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let ctx = settings.create_db_context()?;
        let index = settings.create_search_index()?;
        Ok(Self::from_parts(ctx.questions(), Arc::new(index), settings))
    }

    /// Assemble state around an existing repository and index.
    pub fn from_parts(
        repo: QuestionRepository,
        index: Arc<dyn SearchIndex>,
        settings: &Settings,
    ) -> Self {
        let questions = Arc::new(repo);
        let store: Arc<dyn QuestionStore> = questions.clone();
        let interval = settings.refresh_interval();

        let sampler = QuestionSampler::new(
            store.clone(),
            Arc::new(CountCache::global().with_interval(interval)),
        )
        .with_window_size(settings.window_size)
        .with_max_quantity(settings.max_quantity);

        Self {
            questions,
            sampler,
            page_counts: Arc::new(CountCache::pages().with_interval(interval)),
            search: SearchService::new(index, store).with_max_quantity(settings.max_quantity),
            rate_limiter: Arc::new(InMemoryRateLimitBackend::new(settings.rate_limit())),
            default_quantity: settings.default_quantity,
        }
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings).await?;

    // Drop refilled buckets so idle clients do not accumulate.
    let limiter = state.rate_limiter.clone();
    let period = settings.rate_limit().period;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            match limiter.cleanup().await {
                Ok(0) => {}
                Ok(n) => tracing::debug!("Dropped {} idle rate limit buckets", n),
                Err(e) => tracing::warn!("Rate limit cleanup failed: {}", e),
            }
        }
    });

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use crate::models::Category;
    use crate::repository::testing::{seed, setup_test_repo};
    use crate::search::testing::MemoryIndex;

    struct TestApp {
        app: axum::Router,
        repo: QuestionRepository,
        index: Arc<MemoryIndex>,
        _dir: tempfile::TempDir,
    }

    async fn setup_test_app_with(settings: Settings) -> TestApp {
        let (repo, dir) = setup_test_repo().await;
        let index = Arc::new(MemoryIndex::new());
        let state = AppState::from_parts(repo.clone(), index.clone(), &settings);
        TestApp {
            app: create_router(state),
            repo,
            index,
            _dir: dir,
        }
    }

    async fn setup_test_app() -> TestApp {
        setup_test_app_with(Settings::default()).await
    }

    async fn get(app: &axum::Router, uri: &str) -> axum::response::Response {
        app.clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let t = setup_test_app().await;
        let response = get(&t.app, "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_random_questions_filtered() {
        let t = setup_test_app().await;
        seed(&t.repo, Category::WhatWhereWhen, None, 6, true).await;
        seed(&t.repo, Category::BrainRing, None, 6, true).await;

        // Ч, url-encoded
        let response = get(&t.app, "/api/questions/random?quantity=4&category=%D0%A7").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json(response).await;
        let items = body.as_array().unwrap();
        assert_eq!(items.len(), 4);
        for item in items {
            assert_eq!(item["question_type"], "Что-где-когда");
        }
    }

    #[tokio::test]
    async fn test_random_questions_default_quantity() {
        let t = setup_test_app().await;
        seed(&t.repo, Category::OwnGame, None, 15, true).await;

        let response = get(&t.app, "/api/questions/random").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await.as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_random_questions_rejects_bad_input() {
        let t = setup_test_app().await;
        seed(&t.repo, Category::OwnGame, None, 3, true).await;

        let response = get(&t.app, "/api/questions/random?category=nonsense").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json(response).await["error"]
            .as_str()
            .unwrap()
            .contains("nonsense"));

        let response = get(&t.app, "/api/questions/random?quantity=0").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = get(&t.app, "/api/questions/random?quantity=101").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_random_questions_empty_store() {
        let t = setup_test_app().await;
        let response = get(&t.app, "/api/questions/random").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_random_package() {
        let t = setup_test_app().await;
        seed(&t.repo, Category::BrainRing, Some("package_1"), 5, true).await;

        let response = get(&t.app, "/api/questions/random-package").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json(response).await;
        assert_eq!(body["package"], "package_1");
        assert_eq!(body["questions"].as_array().unwrap().len(), 5);

        // Б has packages, Я has none
        let response = get(&t.app, "/api/questions/random-package?category=%D0%91").await;
        assert_eq!(response.status(), StatusCode::OK);
        let response = get(&t.app, "/api/questions/random-package?category=%D0%AF").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_question_detail_hides_ineligible() {
        let t = setup_test_app().await;
        let published = seed(&t.repo, Category::BrainRing, None, 1, true).await;
        let draft = seed(&t.repo, Category::BrainRing, None, 1, false).await;

        let response = get(&t.app, &format!("/api/questions/{}", published[0])).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["id"], published[0]);

        let response = get(&t.app, &format!("/api/questions/{}", draft[0])).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_search_uses_index_ranking() {
        let t = setup_test_app().await;
        let ids = seed(&t.repo, Category::WhatWhereWhen, None, 3, true).await;
        t.index.rank(vec![ids[2], 9999, ids[0]]);

        // "вопрос", url-encoded
        let response = get(
            &t.app,
            "/api/questions/search?q=%D0%B2%D0%BE%D0%BF%D1%80%D0%BE%D1%81&fuzzy=true",
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json(response).await;
        assert_eq!(body["source"], "index");
        let found: Vec<i64> = body["questions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|q| q["id"].as_i64().unwrap())
            .collect();
        assert_eq!(found, vec![ids[2] as i64, ids[0] as i64]);
        assert!(t.index.last_request().unwrap().fuzzy);
    }

    #[tokio::test]
    async fn test_search_falls_back_to_store() {
        let t = setup_test_app().await;
        seed(&t.repo, Category::WhatWhereWhen, None, 3, true).await;
        seed(&t.repo, Category::BrainRing, None, 2, true).await;
        t.index.set_unavailable(true);

        let response = get(
            &t.app,
            "/api/questions/search?q=%D0%B2%D0%BE%D0%BF%D1%80%D0%BE%D1%81&category=%D0%91",
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json(response).await;
        assert_eq!(body["source"], "store");
        assert_eq!(body["questions"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_search_rejects_short_text() {
        let t = setup_test_app().await;
        let response = get(&t.app, "/api/questions/search?q=ab").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = get(&t.app, "/api/questions/search").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_counts() {
        let t = setup_test_app().await;
        seed(&t.repo, Category::WhatWhereWhen, None, 3, true).await;
        seed(&t.repo, Category::Erudite, None, 2, true).await;
        seed(&t.repo, Category::Erudite, None, 1, false).await;

        let body = json(get(&t.app, "/api/counts").await).await;
        assert_eq!(body["by_category"]["Что-где-когда"], 3);
        assert_eq!(body["by_category"]["Эрудитка"], 2);
        assert_eq!(body["by_category"]["Своя игра"], 0);
        assert_eq!(body["total"], 6);

        let body = json(get(&t.app, "/api/counts/pages").await).await;
        assert_eq!(body["by_category"].as_object().unwrap().len(), 3);
        assert!(body.get("total").is_none());
    }

    #[tokio::test]
    async fn test_rate_limit() {
        let settings = Settings {
            rate_limit_requests: 2,
            ..Settings::default()
        };
        let t = setup_test_app_with(settings).await;
        seed(&t.repo, Category::OwnGame, None, 3, true).await;

        for _ in 0..2 {
            let response = get(&t.app, "/api/questions/random?quantity=1").await;
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = get(&t.app, "/api/questions/random?quantity=1").await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let retry_after: u64 = response
            .headers()
            .get(header::RETRY_AFTER)
            .unwrap()
            .to_str()
            .unwrap()
            .parse()
            .unwrap();
        assert!(retry_after >= 1);

        // Lookups by id and counts are not throttled
        let response = get(&t.app, "/api/counts").await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
