use crate::support::{asset_bytes, Site};
use profile_reel::catalog::{AddOutcome, Catalog};
use profile_reel::extract::MobileMarkup;
use profile_reel::scrape::{ProfileScraper, ReelStop};
use profile_reel::ReelError;
use std::collections::BTreeSet;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

fn ids(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[tokio::test]
async fn test_three_photo_reel_survives_save_and_reload() {
    let site = Site::start().await;
    site.profile("alice", "Alice Liddell", 1).await;
    site.reel(&[1, 2, 3]).await;

    let root = TempDir::new().unwrap();
    let fetcher = site.fetcher(5);
    let extractor = MobileMarkup::new();
    let scraper = ProfileScraper::new(&fetcher, &extractor, Duration::ZERO, 5);

    let mut catalog = Catalog::load(root.path()).unwrap();
    assert!(catalog.existing_ids().is_empty());

    let outcome = catalog.add("alice", &scraper).await.unwrap();
    assert_eq!(
        outcome,
        AddOutcome::Added {
            photos: 3,
            stop: ReelStop::Exhausted
        }
    );

    for photo in [1, 2, 3] {
        let file = root.path().join("alice").join(format!("{}.jpg", photo));
        assert_eq!(std::fs::read(file).unwrap(), asset_bytes(photo));
    }

    assert_eq!(catalog.save().unwrap(), 1);

    let reloaded = Catalog::load(root.path()).unwrap();
    assert_eq!(reloaded.existing_ids(), &ids(&["alice"]));
    assert_eq!(reloaded.existing_folders().unwrap(), ids(&["alice"]));

    let record = reloaded.records().next().unwrap();
    assert_eq!(record.first_name.as_deref(), Some("Alice"));
    assert_eq!(record.last_name.as_deref(), Some("Liddell"));
    assert_eq!(record.hometown.as_deref(), Some("Oxford"));
    assert_eq!(record.current_residence.as_deref(), Some("London"));
    assert_eq!(record.about.get("Gender").map(String::as_str), Some("Female"));
    assert_eq!(
        record.cover_photo_ref.as_deref(),
        Some("/photo.php?fbid=9001&id=alice")
    );
    assert_eq!(
        record.photo_page_refs(),
        vec![
            "/photo.php?fbid=1&id=alice",
            "/photo.php?fbid=2",
            "/photo.php?fbid=3"
        ]
    );
    assert_eq!(
        record.neighbor_refs(),
        vec![
            (None, Some("/photo.php?fbid=2")),
            (Some("/photo.php?fbid=1"), Some("/photo.php?fbid=3")),
            (None, None)
        ]
    );
    assert!(record.asset_urls().iter().all(|url| url.is_some()));
}

#[tokio::test]
async fn test_second_add_makes_no_requests() {
    let site = Site::start().await;
    site.profile("alice", "Alice Liddell", 1).await;
    site.reel(&[1]).await;

    let root = TempDir::new().unwrap();
    let fetcher = site.fetcher(1);
    let extractor = MobileMarkup::new();
    let scraper = ProfileScraper::new(&fetcher, &extractor, Duration::ZERO, 5);

    let mut catalog = Catalog::load(root.path()).unwrap();
    let first = catalog.add("alice", &scraper).await.unwrap();
    assert!(matches!(first, AddOutcome::Added { photos: 1, .. }));

    let requests_after_first = site.request_count().await;
    let second = catalog.add("alice", &scraper).await.unwrap();

    assert_eq!(second, AddOutcome::Skipped);
    assert_eq!(site.request_count().await, requests_after_first);
    assert_eq!(catalog.pending().len(), 1);
}

#[tokio::test]
async fn test_duplicate_id_leaves_store_untouched() {
    let site = Site::start().await;
    site.profile("alice", "Alice Liddell", 1).await;
    site.reel(&[1, 2]).await;

    let root = TempDir::new().unwrap();
    let fetcher = site.fetcher(1);
    let extractor = MobileMarkup::new();
    let scraper = ProfileScraper::new(&fetcher, &extractor, Duration::ZERO, 5);

    let mut catalog = Catalog::load(root.path()).unwrap();
    catalog.add("alice", &scraper).await.unwrap();
    catalog.save().unwrap();

    let mut reloaded = Catalog::load(root.path()).unwrap();

    let store_path = reloaded.store_path();
    let modified_before = std::fs::metadata(&store_path).unwrap().modified().unwrap();
    let bytes_before = std::fs::read(&store_path).unwrap();
    let requests_before = site.request_count().await;

    let outcome = reloaded.add("alice", &scraper).await.unwrap();
    assert_eq!(outcome, AddOutcome::Skipped);
    assert_eq!(reloaded.save().unwrap(), 0);

    assert_eq!(site.request_count().await, requests_before);
    assert_eq!(
        std::fs::metadata(&store_path).unwrap().modified().unwrap(),
        modified_before
    );
    assert_eq!(std::fs::read(&store_path).unwrap(), bytes_before);
}

#[tokio::test]
async fn test_failed_profile_fetch_rolls_back_folder() {
    let site = Site::start().await;
    Mock::given(method("GET"))
        .and(path("/bob"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&site.server)
        .await;

    let root = TempDir::new().unwrap();
    let fetcher = site.fetcher(2);
    let extractor = MobileMarkup::new();
    let scraper = ProfileScraper::new(&fetcher, &extractor, Duration::ZERO, 5);

    let mut catalog = Catalog::load(root.path()).unwrap();
    let outcome = catalog.add("bob", &scraper).await.unwrap();

    assert!(matches!(outcome, AddOutcome::Failed { .. }));
    assert!(!root.path().join("bob").exists());
    assert!(!catalog.contains("bob"));
    assert!(catalog.check().is_ok());

    assert_eq!(catalog.save().unwrap(), 0);
    assert!(!catalog.store_path().exists());
}

#[tokio::test]
async fn test_unexpected_profile_markup_rolls_back_folder() {
    let site = Site::start().await;
    site.page(
        "/carol",
        "<html><head><title>Carol</title></head><body>Private profile</body></html>".to_string(),
    )
    .await;

    let root = TempDir::new().unwrap();
    let fetcher = site.fetcher(1);
    let extractor = MobileMarkup::new();
    let scraper = ProfileScraper::new(&fetcher, &extractor, Duration::ZERO, 5);

    let mut catalog = Catalog::load(root.path()).unwrap();
    let outcome = catalog.add("carol", &scraper).await.unwrap();

    match outcome {
        AddOutcome::Failed { reason } => assert!(reason.contains("photo links")),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(!root.path().join("carol").exists());
}

#[tokio::test]
async fn test_failure_after_download_is_fatal() {
    let site = Site::start().await;
    site.profile("dave", "Dave Bowman", 10).await;
    site.photo(10, r#"<a href="/photo.php?fbid=11">Next</a>"#).await;
    site.broken_photo(11).await;

    let root = TempDir::new().unwrap();
    let fetcher = site.fetcher(2);
    let extractor = MobileMarkup::new();
    let scraper = ProfileScraper::new(&fetcher, &extractor, Duration::ZERO, 5);

    let mut catalog = Catalog::load(root.path()).unwrap();
    let err = catalog.add("dave", &scraper).await.unwrap_err();

    assert!(matches!(err, ReelError::Database(_)));
    assert!(err.is_fatal());
    assert!(root.path().join("dave").join("10.jpg").exists());
}

#[tokio::test]
async fn test_fatal_failure_reports_uncommitted_folders() {
    let site = Site::start().await;
    site.profile("alice", "Alice Liddell", 1).await;
    site.reel(&[1]).await;
    site.profile("dave", "Dave Bowman", 10).await;
    site.photo(10, r#"<a href="/photo.php?fbid=11">Next</a>"#).await;
    site.broken_photo(11).await;

    let root = TempDir::new().unwrap();
    let fetcher = site.fetcher(2);
    let extractor = MobileMarkup::new();
    let scraper = ProfileScraper::new(&fetcher, &extractor, Duration::ZERO, 5);

    let mut catalog = Catalog::load(root.path()).unwrap();
    assert!(catalog.uncommitted_folders().unwrap().is_empty());

    catalog.add("alice", &scraper).await.unwrap();
    let err = catalog.add("dave", &scraper).await.unwrap_err();
    assert!(err.is_fatal());

    assert_eq!(
        catalog.uncommitted_folders().unwrap(),
        vec![root.path().join("alice"), root.path().join("dave")]
    );
}

#[tokio::test]
async fn test_saved_profiles_are_not_uncommitted() {
    let site = Site::start().await;
    site.profile("alice", "Alice Liddell", 1).await;
    site.reel(&[1]).await;

    let root = TempDir::new().unwrap();
    let fetcher = site.fetcher(2);
    let extractor = MobileMarkup::new();
    let scraper = ProfileScraper::new(&fetcher, &extractor, Duration::ZERO, 5);

    let mut catalog = Catalog::load(root.path()).unwrap();
    catalog.add("alice", &scraper).await.unwrap();
    assert_eq!(catalog.uncommitted_folders().unwrap().len(), 1);

    catalog.save().unwrap();
    assert!(catalog.uncommitted_folders().unwrap().is_empty());
}

#[tokio::test]
async fn test_photo_budget_caps_the_reel() {
    let site = Site::start().await;
    site.profile("erin", "Erin Hunt", 20).await;
    site.reel(&[20, 21, 22, 23]).await;

    let root = TempDir::new().unwrap();
    let fetcher = site.fetcher(1);
    let extractor = MobileMarkup::new();
    let scraper = ProfileScraper::new(&fetcher, &extractor, Duration::ZERO, 2);

    let mut catalog = Catalog::load(root.path()).unwrap();
    let outcome = catalog.add("erin", &scraper).await.unwrap();

    assert_eq!(
        outcome,
        AddOutcome::Added {
            photos: 2,
            stop: ReelStop::BudgetReached
        }
    );
    let mut files: Vec<String> = std::fs::read_dir(root.path().join("erin"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    files.sort();
    assert_eq!(files, vec!["20.jpg", "21.jpg"]);
}

#[tokio::test]
async fn test_unknown_folder_is_refused() {
    let site = Site::start().await;
    let root = TempDir::new().unwrap();
    let fetcher = site.fetcher(1);
    let extractor = MobileMarkup::new();
    let scraper = ProfileScraper::new(&fetcher, &extractor, Duration::ZERO, 5);

    let mut catalog = Catalog::load(root.path()).unwrap();
    std::fs::create_dir(root.path().join("mallory")).unwrap();

    let err = catalog.add("mallory", &scraper).await.unwrap_err();
    assert!(matches!(err, ReelError::AlreadyExistsOnDisk { .. }));
    assert!(err.is_fatal());
    assert_eq!(site.request_count().await, 0);
}

#[tokio::test]
async fn test_new_records_follow_stored_records() {
    let site = Site::start().await;
    site.profile("alice", "Alice Liddell", 1).await;
    site.reel(&[1]).await;
    site.profile("bob", "Bob Dylan", 30).await;
    site.reel(&[30, 31]).await;

    let root = TempDir::new().unwrap();
    let fetcher = site.fetcher(1);
    let extractor = MobileMarkup::new();
    let scraper = ProfileScraper::new(&fetcher, &extractor, Duration::ZERO, 5);

    let mut first_run = Catalog::load(root.path()).unwrap();
    first_run.add("alice", &scraper).await.unwrap();
    first_run.save().unwrap();

    let mut second_run = Catalog::load(root.path()).unwrap();
    second_run.add("alice", &scraper).await.unwrap();
    second_run.add("bob", &scraper).await.unwrap();
    assert_eq!(second_run.save().unwrap(), 1);

    let reloaded = Catalog::load(root.path()).unwrap();
    let order: Vec<&str> = reloaded.records().map(|r| r.id.as_str()).collect();
    assert_eq!(order, vec!["alice", "bob"]);
    assert_eq!(reloaded.existing_ids(), &ids(&["alice", "bob"]));
    assert_eq!(reloaded.records().nth(1).unwrap().photos.len(), 2);
}
