// tests/job_live.rs
use anyhow::Result;
use async_trait::async_trait;
use auto_tech_news::config::{AppConfig, SOURCE_URL_META_KEY};
use auto_tech_news::http::StaticHttp;
use auto_tech_news::ingest::providers::newsapi::NewsApiProvider;
use auto_tech_news::ingest::types::{Article, ArticleSource};
use auto_tech_news::store::{ContentStore, MemoryStore, NewItem};
use auto_tech_news::{ArticleOrigin, NewsIngestionJob};
use std::sync::Arc;

fn cfg_with_key(key: &str) -> AppConfig {
    AppConfig {
        api_key: Some(key.to_string()),
        ..AppConfig::default()
    }
}

fn live_job(http: Arc<StaticHttp>, store: &Arc<MemoryStore>) -> NewsIngestionJob {
    NewsIngestionJob::from_config(&cfg_with_key("secret"), http, store.clone(), store.clone())
}

/// Serves a fixed list of articles, bypassing HTTP.
struct ListSource(Vec<Article>);

#[async_trait]
impl ArticleSource for ListSource {
    async fn fetch_latest(&self) -> Result<Vec<Article>> {
        Ok(self.0.clone())
    }
    fn name(&self) -> &'static str {
        "list"
    }
}

#[tokio::test]
async fn http_500_falls_back_to_static_articles() {
    let store = Arc::new(MemoryStore::new());
    let http = Arc::new(StaticHttp::ok(500, r#"{"status":"error"}"#));
    let job = live_job(http.clone(), &store);
    assert!(job.has_live_source());

    let report = job.run().await;
    assert_eq!(http.call_count(), 1);
    assert_eq!(report.origin, ArticleOrigin::Fallback);
    assert_eq!(report.created.len(), 5);
    for it in store.items().await {
        assert!(!it.meta.contains_key(SOURCE_URL_META_KEY));
    }
}

#[tokio::test]
async fn transport_error_falls_back() {
    let store = Arc::new(MemoryStore::new());
    let http = Arc::new(StaticHttp::failing("operation timed out"));
    let report = live_job(http, &store).run().await;
    assert_eq!(report.origin, ArticleOrigin::Fallback);
    assert_eq!(report.created.len(), 5);
}

#[tokio::test]
async fn malformed_or_empty_payload_falls_back() {
    for body in ["<html>oops</html>", r#"{"articles":[]}"#, r#"[{"title":"x"}]"#] {
        let store = Arc::new(MemoryStore::new());
        let http = Arc::new(StaticHttp::ok(200, body));
        let report = live_job(http, &store).run().await;
        assert_eq!(report.origin, ArticleOrigin::Fallback, "body: {body}");
    }
}

#[tokio::test]
async fn blank_credential_never_calls_the_api() {
    let store = Arc::new(MemoryStore::new());
    let http = Arc::new(StaticHttp::ok(200, r#"{"articles":[]}"#));
    let job =
        NewsIngestionJob::from_config(&cfg_with_key("  "), http.clone(), store.clone(), store);
    assert!(!job.has_live_source());
    job.run().await;
    assert_eq!(http.call_count(), 0);
}

#[tokio::test]
async fn request_carries_expected_query() {
    let http = Arc::new(StaticHttp::ok(200, r#"{"articles":[]}"#));
    let p = NewsApiProvider::new(http.clone(), "k3y");
    let out = p.fetch_latest().await.unwrap();
    assert!(out.is_empty());

    let calls = http.calls.lock().unwrap();
    let q = &calls[0];
    assert!(q.contains(&("category".to_string(), "technology".to_string())));
    assert!(q.contains(&("language".to_string(), "en".to_string())));
    assert!(q.contains(&("pageSize".to_string(), "5".to_string())));
    assert!(q.contains(&("apiKey".to_string(), "k3y".to_string())));
}

#[tokio::test]
async fn empty_title_fails_validation_not_dedupe() {
    let store = Arc::new(MemoryStore::new());
    let body = r#"{"status":"ok","articles":[
        {"title":"Quantum networking hits new milestone","description":"Researchers link three nodes.","url":"https://news.test/q"},
        {"title":"","description":"No headline here.","url":"https://news.test/empty"}
    ]}"#;
    let http = Arc::new(StaticHttp::ok(200, body));
    let report = live_job(http, &store).run().await;

    assert_eq!(report.origin, ArticleOrigin::Live);
    assert_eq!(report.candidates, 2);
    assert_eq!(report.created.len(), 1);
    assert_eq!(report.skipped_invalid, 1);
    assert_eq!(report.skipped_duplicate, 0);

    let items = store.items().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Quantum networking hits new milestone");
    assert_eq!(items[0].body, "Researchers link three nodes.");
    assert_eq!(
        items[0].meta.get(SOURCE_URL_META_KEY).map(String::as_str),
        Some("https://news.test/q")
    );
}

#[tokio::test]
async fn markup_only_description_is_invalid() {
    let store = Arc::new(MemoryStore::new());
    let job = NewsIngestionJob::new(store.clone(), store.clone()).with_live_source(Arc::new(
        ListSource(vec![Article::new("Headline", "<p>  </p>", "")]),
    ));
    let report = job.run().await;
    assert_eq!(report.origin, ArticleOrigin::Live);
    assert_eq!(report.skipped_invalid, 1);
    assert!(store.items().await.is_empty());
}

#[tokio::test]
async fn url_match_skips_regardless_of_title() {
    let store = Arc::new(MemoryStore::new());
    let id = store
        .insert_item(NewItem::published_post("Original headline", "body"))
        .await
        .unwrap();
    store
        .set_meta(id, SOURCE_URL_META_KEY, "https://news.test/story")
        .await
        .unwrap();

    let job = NewsIngestionJob::new(store.clone(), store.clone()).with_live_source(Arc::new(
        ListSource(vec![Article::new(
            "Completely different headline",
            "Updated summary.",
            "https://news.test/story",
        )]),
    ));
    let report = job.run().await;
    assert_eq!(report.skipped_duplicate, 1);
    assert!(report.created.is_empty());
    assert_eq!(store.items().await.len(), 1);
}

#[tokio::test]
async fn title_match_skips_even_with_new_url() {
    let store = Arc::new(MemoryStore::new());
    store
        .insert_item(NewItem::published_post("Same headline", "body"))
        .await
        .unwrap();

    let job = NewsIngestionJob::new(store.clone(), store.clone()).with_live_source(Arc::new(
        ListSource(vec![Article::new(
            "  Same   <em>headline</em> ",
            "Summary.",
            "https://news.test/new",
        )]),
    ));
    let report = job.run().await;
    assert_eq!(report.skipped_duplicate, 1);
    assert_eq!(store.items().await.len(), 1);
}

#[tokio::test]
async fn live_articles_are_idempotent_across_runs() {
    let store = Arc::new(MemoryStore::new());
    let body = r#"{"articles":[
        {"title":"A","description":"a","url":"https://news.test/a"},
        {"title":"B","description":"b","url":""},
        {"title":"A","description":"dup within batch","url":"https://news.test/a"}
    ]}"#;
    let http = Arc::new(StaticHttp::ok(200, body));
    let job = live_job(http, &store);

    let first = job.run().await;
    assert_eq!(first.created.len(), 2);
    assert_eq!(first.skipped_duplicate, 1);

    let second = job.run().await;
    assert!(second.created.is_empty());
    assert_eq!(second.skipped_duplicate, 3);
}

#[tokio::test]
async fn empty_candidate_list_has_no_side_effects() {
    let store = Arc::new(MemoryStore::new());
    let job = NewsIngestionJob::new(store.clone(), store.clone())
        .with_live_source(Arc::new(ListSource(vec![])))
        .with_fallback(Arc::new(ListSource(vec![])));
    let report = job.run().await;

    assert_eq!(report.origin, ArticleOrigin::None);
    assert_eq!(report.candidates, 0);
    assert_eq!(report.category, None);
    assert!(store.items().await.is_empty());
    assert!(store.categories().await.is_empty());
}
