// tests/job_fallback.rs
use auto_tech_news::http::StaticHttp;
use auto_tech_news::ingest::providers::fallback::fallback_articles;
use auto_tech_news::store::{MemoryStore, PostStatus};
use auto_tech_news::{AppConfig, ArticleOrigin, NewsIngestionJob};
use std::sync::Arc;

fn fallback_titles() -> Vec<String> {
    fallback_articles()
        .into_iter()
        .map(|a| a.title.unwrap_or_default())
        .collect()
}

#[tokio::test]
async fn no_credential_publishes_exactly_the_fallback_set() {
    let store = Arc::new(MemoryStore::new());
    let job = NewsIngestionJob::new(store.clone(), store.clone());
    assert!(!job.has_live_source());

    let report = job.run().await;
    assert_eq!(report.origin, ArticleOrigin::Fallback);
    assert_eq!(report.candidates, 5);
    assert_eq!(report.created.len(), 5);

    let items = store.items().await;
    let titles: Vec<String> = items.iter().map(|i| i.title.clone()).collect();
    assert_eq!(titles, fallback_titles());
    for it in &items {
        assert_eq!(it.status, PostStatus::Publish);
        assert_eq!(it.kind, "post");
        assert!(!it.body.is_empty());
    }
}

#[tokio::test]
async fn second_run_creates_nothing() {
    let store = Arc::new(MemoryStore::new());
    let job = NewsIngestionJob::new(store.clone(), store.clone());

    let first = job.run().await;
    let second = job.run().await;

    assert_eq!(first.created.len(), 5);
    assert!(second.created.is_empty());
    assert_eq!(second.skipped_duplicate, 5);
    assert_eq!(store.items().await.len(), 5);
}

#[tokio::test]
async fn category_is_created_once_across_runs() {
    let store = Arc::new(MemoryStore::new());
    let job = NewsIngestionJob::new(store.clone(), store.clone());
    let a = job.run().await;
    let b = job.run().await;
    let c = job.run().await;

    let cats = store.categories().await;
    assert_eq!(cats.len(), 1);
    assert_eq!(cats[0].name, "Technology News");
    assert_eq!(a.category, Some(cats[0].id));
    assert_eq!(b.category, a.category);
    assert_eq!(c.category, a.category);
}

#[tokio::test]
async fn padded_category_name_still_resolves_one_category() {
    let cfg = AppConfig::from_toml_str(r#"category_name = " Technology News""#).unwrap();
    let store = Arc::new(MemoryStore::new());
    let job = NewsIngestionJob::from_config(
        &cfg,
        Arc::new(StaticHttp::ok(200, "{}")),
        store.clone(),
        store.clone(),
    );
    let a = job.run().await;
    let b = job.run().await;

    let cats = store.categories().await;
    assert_eq!(cats.len(), 1);
    assert_eq!(cats[0].name, "Technology News");
    assert_eq!(a.category, Some(cats[0].id));
    assert_eq!(b.category, a.category);

    let padded = NewsIngestionJob::new(store.clone(), store.clone())
        .with_category_name("Technology News  ")
        .run()
        .await;
    assert_eq!(padded.category, a.category);
    assert_eq!(store.categories().await.len(), 1);
}

#[tokio::test]
async fn custom_category_name_is_used() {
    let store = Arc::new(MemoryStore::new());
    let job = NewsIngestionJob::new(store.clone(), store.clone()).with_category_name("Tech");
    job.run().await;
    let cats = store.categories().await;
    assert_eq!(cats.len(), 1);
    assert_eq!(cats[0].name, "Tech");
}
