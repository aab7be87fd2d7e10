use cinelog::CinelogError;
use cinelog::ValidationError;
use cinelog::db::{DbActorHandle, DbReview};
use cinelog::review::{ListCriteria, ListQuery, ReviewDraft};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;

struct TempDb {
    path: PathBuf,
    handle: DbActorHandle,
}

impl TempDb {
    async fn new(tag: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX_EPOCH")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "cinelog-{tag}-{}-{nanos}.sqlite",
            std::process::id()
        ));
        let database_url = format!("sqlite:{}", path.display());
        let handle = cinelog::db::spawn(&database_url)
            .await
            .expect("failed to spawn DbActor");
        Self { path, handle }
    }

    async fn cleanup(self) {
        self.handle.stop();
        for suffix in ["-wal", "-shm"] {
            let side = PathBuf::from(format!("{}{suffix}", self.path.to_string_lossy()));
            let _ = fs::remove_file(&side).await;
        }
        let _ = fs::remove_file(&self.path).await;
    }
}

async fn add(db: &DbActorHandle, name: &str, rating: &str) -> DbReview {
    let draft = ReviewDraft::new(name, "some words", rating).expect("valid draft");
    db.create(draft).await.expect("create failed")
}

fn criteria(pairs: &[(&str, &str)]) -> ListCriteria {
    let mut q = ListQuery::default();
    for (k, v) in pairs {
        let v = Some((*v).to_string());
        match *k {
            "search" => q.search = v,
            "sort" => q.sort = v,
            "min_rating" => q.min_rating = v,
            "max_rating" => q.max_rating = v,
            "page" => q.page = v,
            other => panic!("unknown criteria key {other}"),
        }
    }
    ListCriteria::from(q)
}

fn names(reviews: &[DbReview]) -> Vec<&str> {
    reviews.iter().map(|r| r.name.as_str()).collect()
}

#[tokio::test]
async fn create_then_list_returns_record() {
    let tmp = TempDb::new("create").await;
    let db = &tmp.handle;

    let listing = db.list(ListCriteria::default()).await.unwrap();
    assert!(listing.reviews.is_empty());
    assert_eq!(listing.stats.total, 0);
    assert_eq!(listing.stats.total_pages, 0);

    let draft = ReviewDraft::new("  Inception ", " Great ", "5").unwrap();
    let created = db.create(draft).await.unwrap();
    assert!(created.id > 0);
    assert_eq!(created.name, "Inception");
    assert_eq!(created.review, "Great");
    assert_eq!(created.rating, 5);
    assert_eq!(created.created_at, created.updated_at);

    let listing = db.list(ListCriteria::default()).await.unwrap();
    assert_eq!(listing.reviews, vec![created.clone()]);
    assert_eq!(listing.stats.total, 1);
    assert_eq!(listing.stats.total_pages, 1);
    assert_eq!(listing.stats.highest_rated, Some(created.clone()));

    assert_eq!(db.get(created.id).await.unwrap(), Some(created));

    tmp.cleanup().await;
}

#[tokio::test]
async fn sort_high_and_stats_example() {
    let tmp = TempDb::new("example").await;
    let db = &tmp.handle;

    add(db, "Inception", "5").await;
    add(db, "Up", "3").await;

    let listing = db.list(criteria(&[("sort", "high")])).await.unwrap();
    assert_eq!(names(&listing.reviews), vec!["Inception", "Up"]);
    assert!((listing.stats.average_rating - 4.0).abs() < f64::EPSILON);
    assert_eq!(
        listing.stats.highest_rated.as_ref().map(|r| r.name.as_str()),
        Some("Inception")
    );

    let listing = db.list(criteria(&[("sort", "low")])).await.unwrap();
    assert_eq!(names(&listing.reviews), vec!["Up", "Inception"]);

    // Default order is newest first.
    let listing = db.list(ListCriteria::default()).await.unwrap();
    assert_eq!(names(&listing.reviews), vec!["Up", "Inception"]);

    let listing = db
        .list(criteria(&[("search", "up"), ("min_rating", "4")]))
        .await
        .unwrap();
    assert!(listing.reviews.is_empty());
    assert_eq!(listing.stats.total, 0);
    assert!(listing.stats.average_rating.abs() < f64::EPSILON);
    assert_eq!(listing.stats.highest_rated, None);
    assert_eq!(listing.stats.total_pages, 0);

    let listing = db.list(criteria(&[("search", "UP")])).await.unwrap();
    assert_eq!(names(&listing.reviews), vec!["Up"]);

    tmp.cleanup().await;
}

#[tokio::test]
async fn invalid_rating_leaves_store_unchanged() {
    let tmp = TempDb::new("invalid").await;
    let db = &tmp.handle;

    add(db, "Up", "3").await;
    assert_eq!(
        ReviewDraft::new("Inception", "Great", "6").unwrap_err(),
        ValidationError::InvalidRating
    );
    assert_eq!(
        ReviewDraft::new("Inception", "   ", "4").unwrap_err(),
        ValidationError::MissingField
    );

    let listing = db.list(ListCriteria::default()).await.unwrap();
    assert_eq!(listing.stats.total, 1);

    tmp.cleanup().await;
}

#[tokio::test]
async fn update_replaces_fields_and_keeps_identity() {
    let tmp = TempDb::new("update").await;
    let db = &tmp.handle;

    let original = add(db, "Up", "3").await;
    let other = add(db, "Heat", "4").await;

    let err = db
        .update(original.id + 1000, ReviewDraft::new("X", "Y", "1").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, CinelogError::NotFound(id) if id == original.id + 1000));
    assert_eq!(db.get(original.id).await.unwrap(), Some(original.clone()));
    assert_eq!(db.get(other.id).await.unwrap(), Some(other.clone()));

    let updated = db
        .update(original.id, ReviewDraft::new(" Up! ", "Better", "5").unwrap())
        .await
        .unwrap();
    assert_eq!(updated.id, original.id);
    assert_eq!(updated.name, "Up!");
    assert_eq!(updated.review, "Better");
    assert_eq!(updated.rating, 5);
    assert_eq!(updated.created_at, original.created_at);
    assert!(updated.updated_at >= original.updated_at);

    assert_eq!(db.get(other.id).await.unwrap(), Some(other));

    tmp.cleanup().await;
}

#[tokio::test]
async fn delete_is_idempotent() {
    let tmp = TempDb::new("delete").await;
    let db = &tmp.handle;

    let review = add(db, "Up", "3").await;
    assert!(db.delete(review.id).await.unwrap());
    assert_eq!(db.get(review.id).await.unwrap(), None);
    assert!(!db.delete(review.id).await.unwrap());
    assert!(!db.delete(424_242).await.unwrap());

    // Ids are not reused after deletion.
    let next = add(db, "Heat", "4").await;
    assert!(next.id > review.id);

    tmp.cleanup().await;
}

#[tokio::test]
async fn pages_reconstruct_filtered_set_in_order() {
    let tmp = TempDb::new("pages").await;
    let db = &tmp.handle;

    let mut all = Vec::new();
    for i in 0..13 {
        let rating = (i % 5 + 1).to_string();
        all.push(add(db, &format!("Movie {i:02}"), &rating).await);
    }

    for sort in ["", "high", "low"] {
        let first = db.list(criteria(&[("sort", sort)])).await.unwrap();
        assert_eq!(first.stats.total, 13);
        assert_eq!(first.stats.total_pages, 3);

        let mut collected = Vec::new();
        for page in 1..=first.stats.total_pages {
            let listing = db
                .list(criteria(&[("sort", sort), ("page", &page.to_string())]))
                .await
                .unwrap();
            assert_eq!(listing.stats, first.stats);
            assert!(listing.reviews.len() <= 5);
            collected.extend(listing.reviews);
        }

        let mut expected = all.clone();
        match sort {
            "high" => expected.sort_by(|a, b| b.rating.cmp(&a.rating).then(b.id.cmp(&a.id))),
            "low" => expected.sort_by(|a, b| a.rating.cmp(&b.rating).then(b.id.cmp(&a.id))),
            _ => expected.sort_by(|a, b| b.id.cmp(&a.id)),
        }
        assert_eq!(collected, expected, "sort={sort:?}");

        let beyond = db
            .list(criteria(&[("sort", sort), ("page", "4")]))
            .await
            .unwrap();
        assert!(beyond.reviews.is_empty());
        assert_eq!(beyond.stats.total, 13);
    }

    tmp.cleanup().await;
}

#[tokio::test]
async fn stats_follow_the_filter() {
    let tmp = TempDb::new("stats").await;
    let db = &tmp.handle;

    add(db, "Alien", "5").await;
    add(db, "Aliens", "4").await;
    add(db, "Alien 3", "2").await;
    add(db, "Prometheus", "3").await;
    add(db, "Alien Resurrection", "2").await;
    add(db, "Covenant", "1").await;

    let listing = db
        .list(criteria(&[("search", "alien"), ("max_rating", "4")]))
        .await
        .unwrap();
    assert_eq!(listing.stats.total, 3);
    // (4 + 2 + 2) / 3 = 2.666.. -> 2.67
    assert!((listing.stats.average_rating - 2.67).abs() < 1e-9);
    assert_eq!(
        listing.stats.highest_rated.as_ref().map(|r| r.name.as_str()),
        Some("Aliens")
    );

    let listing = db
        .list(criteria(&[("min_rating", "2"), ("max_rating", "3")]))
        .await
        .unwrap();
    assert_eq!(listing.stats.total, 3);
    assert!((listing.stats.average_rating - 2.33).abs() < 1e-9);

    // Unparseable bounds are ignored.
    let listing = db
        .list(criteria(&[("min_rating", "x"), ("max_rating", "")]))
        .await
        .unwrap();
    assert_eq!(listing.stats.total, 6);

    tmp.cleanup().await;
}

#[tokio::test]
async fn highest_rated_ties_pick_lowest_id() {
    let tmp = TempDb::new("ties").await;
    let db = &tmp.handle;

    let first = add(db, "Heat", "5").await;
    add(db, "Ronin", "5").await;
    add(db, "Collateral", "3").await;

    for sort in ["", "high", "low"] {
        let listing = db.list(criteria(&[("sort", sort)])).await.unwrap();
        assert_eq!(listing.stats.highest_rated, Some(first.clone()));
    }

    tmp.cleanup().await;
}

#[tokio::test]
async fn search_is_a_literal_substring() {
    let tmp = TempDb::new("literal").await;
    let db = &tmp.handle;

    add(db, "100% Wolf", "3").await;
    add(db, "Wolf_Man", "4").await;
    add(db, "Wolfwalkers", "5").await;

    let listing = db.list(criteria(&[("search", "%")])).await.unwrap();
    assert_eq!(names(&listing.reviews), vec!["100% Wolf"]);

    let listing = db.list(criteria(&[("search", "f_m")])).await.unwrap();
    assert_eq!(names(&listing.reviews), vec!["Wolf_Man"]);

    let listing = db.list(criteria(&[("search", "WOLF")])).await.unwrap();
    assert_eq!(listing.stats.total, 3);

    tmp.cleanup().await;
}

#[tokio::test]
async fn search_folds_non_ascii_case() {
    let tmp = TempDb::new("unicode").await;
    let db = &tmp.handle;

    let amelie = add(db, "Amélie", "5").await;
    add(db, "Ähnlich", "3").await;
    add(db, "Heat", "4").await;

    for term in ["AMÉLIE", "amélie", "MÉL"] {
        let listing = db.list(criteria(&[("search", term)])).await.unwrap();
        assert_eq!(names(&listing.reviews), vec!["Amélie"], "search={term:?}");
    }

    let listing = db.list(criteria(&[("search", "äHN")])).await.unwrap();
    assert_eq!(names(&listing.reviews), vec!["Ähnlich"]);

    // Renaming refreshes the folded copy.
    db.update(amelie.id, ReviewDraft::new("ÉCLAIR", "some words", "5").unwrap())
        .await
        .unwrap();
    let listing = db.list(criteria(&[("search", "amélie")])).await.unwrap();
    assert!(listing.reviews.is_empty());
    let listing = db.list(criteria(&[("search", "éclair")])).await.unwrap();
    assert_eq!(names(&listing.reviews), vec!["ÉCLAIR"]);

    tmp.cleanup().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_get_distinct_ids() {
    let tmp = TempDb::new("concurrent-create").await;

    let tasks: Vec<_> = (0..50)
        .map(|i| {
            let db = tmp.handle.clone();
            tokio::spawn(async move {
                let rating = (i % 5 + 1).to_string();
                add(&db, &format!("Movie {i}"), &rating).await.id
            })
        })
        .collect();

    let mut ids = Vec::new();
    for task in tasks {
        ids.push(task.await.expect("create task panicked"));
    }
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 50);

    let listing = tmp.handle.list(ListCriteria::default()).await.unwrap();
    assert_eq!(listing.stats.total, 50);

    tmp.cleanup().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn listing_during_creates_is_a_consistent_snapshot() {
    let tmp = TempDb::new("concurrent-list").await;

    // At most five rows, so every listing fits on one page and must show all of them.
    let writers: Vec<_> = (0..5)
        .map(|i| {
            let db = tmp.handle.clone();
            tokio::spawn(async move {
                add(&db, &format!("Film {i}"), &(i + 1).to_string()).await;
            })
        })
        .collect();

    let readers: Vec<_> = (0..20)
        .map(|_| {
            let db = tmp.handle.clone();
            tokio::spawn(async move {
                let listing = db.list(ListCriteria::default()).await.unwrap();
                let stats = &listing.stats;
                assert_eq!(stats.total, listing.reviews.len() as u64);
                assert!(stats.total_pages <= 1);
                assert_eq!(stats.highest_rated.is_none(), listing.reviews.is_empty());
                if let Some(top) = &stats.highest_rated {
                    let max = listing.reviews.iter().map(|r| r.rating).max();
                    assert_eq!(Some(top.rating), max);
                    assert!(listing.reviews.contains(top));
                }
            })
        })
        .collect();

    for task in writers.into_iter().chain(readers) {
        task.await.expect("task panicked");
    }

    let listing = tmp.handle.list(ListCriteria::default()).await.unwrap();
    assert_eq!(listing.stats.total, 5);
    assert!((listing.stats.average_rating - 3.0).abs() < f64::EPSILON);

    tmp.cleanup().await;
}
