mod common;

use common::{cookie, test_config, FakeCard, FakePage, FakeSite};
use job_monitor_lib::{
    ControlState, MonitorError, PageWalker, PaginationMode, SearchQuery, SessionStore, StopReason,
};

const SEARCH: &str = "https://jobs.example/search?keywords=rust";

fn query() -> SearchQuery {
    SearchQuery::from_url(SEARCH)
}

fn page_url(index: usize) -> String {
    query().page_url(index, 25, "start")
}

fn titles(records: &[job_monitor_lib::JobRecord]) -> Vec<&str> {
    records.iter().map(|r| r.title.as_str()).collect()
}

#[tokio::test]
async fn stops_when_second_page_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let site = FakeSite::new();
    site.route(SEARCH, vec![FakePage::jobs(&["A", "B", "C"])]);

    let walker = PageWalker::new(site.launcher(), &test_config(dir.path()));
    let walk = walker.walk(&query(), 100).await.unwrap();

    assert_eq!(titles(&walk.records), vec!["A", "B", "C"]);
    assert_eq!(walk.stop, StopReason::NoCards);
    site.with(|s| {
        assert_eq!(s.navigations, vec![SEARCH.to_string(), page_url(1)]);
        assert_eq!(s.closes, 1);
    });
}

#[tokio::test]
async fn stops_mid_page_at_target() {
    let dir = tempfile::tempdir().unwrap();
    let site = FakeSite::new();
    site.route(SEARCH, vec![FakePage::jobs(&["A", "B", "C", "D", "E"])]);

    let walker = PageWalker::new(site.launcher(), &test_config(dir.path()));
    let walk = walker.walk(&query(), 3).await.unwrap();

    assert_eq!(titles(&walk.records), vec!["A", "B", "C"]);
    assert_eq!(walk.stop, StopReason::TargetReached);
    assert_eq!(walk.pages, 1);
    site.with(|s| assert_eq!(s.navigations.len(), 1));
}

#[tokio::test]
async fn incomplete_cards_do_not_abort_the_page() {
    let dir = tempfile::tempdir().unwrap();
    let site = FakeSite::new();
    site.route(
        SEARCH,
        vec![FakePage::with_cards(vec![
            FakeCard::job("A", "Acme", "Delhi"),
            FakeCard::placeholder(),
            FakeCard::detached(),
            FakeCard::job("B", "Initech", "Pune"),
        ])],
    );

    let walker = PageWalker::new(site.launcher(), &test_config(dir.path()));
    let walk = walker.walk(&query(), 100).await.unwrap();

    assert_eq!(titles(&walk.records), vec!["A", "B"]);
    assert_eq!(walk.records[1].company, "Initech");
}

#[tokio::test]
async fn stops_when_reported_total_is_covered() {
    let dir = tempfile::tempdir().unwrap();
    let site = FakeSite::new();
    let full: Vec<String> = (0..25).map(|i| format!("Job {}", i)).collect();
    let full: Vec<&str> = full.iter().map(String::as_str).collect();
    site.route(SEARCH, vec![FakePage::jobs(&full).total("30 results")]);
    site.route(&page_url(1), vec![FakePage::jobs(&["Job 25", "Job 26", "Job 27", "Job 28", "Job 29"]).total("30 results")]);
    site.route(&page_url(2), vec![FakePage::jobs(&["never"])]);

    let walker = PageWalker::new(site.launcher(), &test_config(dir.path()));
    let walk = walker.walk(&query(), 100).await.unwrap();

    assert_eq!(walk.records.len(), 30);
    assert_eq!(walk.stop, StopReason::TotalReached);
    assert_eq!(walk.pages, 2);
    site.with(|s| assert!(!s.navigations.contains(&page_url(2))));
}

#[tokio::test]
async fn next_control_pagination_until_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let site = FakeSite::new();
    site.route(
        SEARCH,
        vec![
            FakePage::jobs(&["A", "B"]).next(ControlState::Enabled),
            FakePage::jobs(&["C"]).next(ControlState::Disabled),
        ],
    );
    let mut config = test_config(dir.path());
    config.pagination.mode = PaginationMode::NextControl;

    let walker = PageWalker::new(site.launcher(), &config);
    let walk = walker.walk(&query(), 100).await.unwrap();

    assert_eq!(titles(&walk.records), vec!["A", "B", "C"]);
    assert_eq!(walk.stop, StopReason::NoNextPage);
    site.with(|s| {
        assert_eq!(s.clicks, 1);
        assert_eq!(s.navigations.len(), 1);
    });
}

#[tokio::test]
async fn failed_click_keeps_partial_results() {
    let dir = tempfile::tempdir().unwrap();
    let site = FakeSite::new();
    site.route(SEARCH, vec![FakePage::jobs(&["A", "B"]).next(ControlState::Enabled)]);
    site.with(|s| s.fail_click = true);
    let mut config = test_config(dir.path());
    config.pagination.mode = PaginationMode::NextControl;

    let walker = PageWalker::new(site.launcher(), &config);
    let walk = walker.walk(&query(), 100).await.unwrap();

    assert_eq!(titles(&walk.records), vec!["A", "B"]);
    assert_eq!(walk.stop, StopReason::AdvanceFailed);
}

#[tokio::test]
async fn failed_offset_navigation_keeps_partial_results() {
    let dir = tempfile::tempdir().unwrap();
    let site = FakeSite::new();
    site.route(SEARCH, vec![FakePage::jobs(&["A"])]);
    site.fail_navigation(&page_url(1));

    let walker = PageWalker::new(site.launcher(), &test_config(dir.path()));
    let walk = walker.walk(&query(), 100).await.unwrap();

    assert_eq!(titles(&walk.records), vec!["A"]);
    assert_eq!(walk.stop, StopReason::AdvanceFailed);
}

#[tokio::test]
async fn first_page_failure_is_an_error_but_session_is_released() {
    let dir = tempfile::tempdir().unwrap();
    let site = FakeSite::new();
    site.fail_navigation(SEARCH);
    site.with(|s| s.browser_cookies = vec![cookie("li_at", "fresh")]);
    let config = test_config(dir.path());

    let walker = PageWalker::new(site.launcher(), &config);
    let err = walker.walk(&query(), 100).await.unwrap_err();

    assert!(matches!(err, MonitorError::Navigation { .. }));
    site.with(|s| assert_eq!(s.closes, 1));
    let saved = SessionStore::new(config.session_path.clone()).load();
    assert_eq!(saved, vec![cookie("li_at", "fresh")]);
}

#[tokio::test]
async fn cookies_round_trip_through_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let store = SessionStore::new(config.session_path.clone());
    store.save(&[cookie("li_at", "old")]).unwrap();

    let site = FakeSite::new();
    site.route(SEARCH, vec![FakePage::jobs(&["A"])]);
    site.with(|s| s.browser_cookies = vec![cookie("li_at", "new"), cookie("JSESSIONID", "x")]);

    let walker = PageWalker::new(site.launcher(), &config);
    walker.walk(&query(), 100).await.unwrap();

    site.with(|s| assert_eq!(s.launched_with, vec![vec![cookie("li_at", "old")]]));
    assert_eq!(store.load().len(), 2);
}

#[tokio::test]
async fn page_cap_bounds_an_endless_result_set() {
    let dir = tempfile::tempdir().unwrap();
    let site = FakeSite::new();
    let endless: Vec<_> = (0..10)
        .map(|i| FakePage::jobs(&[format!("Job {}", i).as_str()]).next(ControlState::Enabled))
        .collect();
    site.route(SEARCH, endless);
    let mut config = test_config(dir.path());
    config.pagination.mode = PaginationMode::NextControl;
    config.pagination.max_pages = 3;

    let walker = PageWalker::new(site.launcher(), &config);
    let walk = walker.walk(&query(), 100).await.unwrap();

    assert_eq!(walk.records.len(), 3);
    assert_eq!(walk.stop, StopReason::PageLimit);
}

#[tokio::test]
async fn reveal_polls_are_bounded() {
    let dir = tempfile::tempdir().unwrap();
    let site = FakeSite::new();
    site.route(SEARCH, vec![FakePage::jobs(&["A", "B"])]);
    let mut config = test_config(dir.path());
    config.pacing.reveal_polls = 4;
    config.pacing.card_threshold = 25;

    let walker = PageWalker::new(site.launcher(), &config);
    walker.walk(&query(), 1).await.unwrap();

    site.with(|s| assert_eq!(s.card_queries, 4));
}

#[tokio::test]
async fn reveal_stops_polling_at_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let site = FakeSite::new();
    site.route(SEARCH, vec![FakePage::jobs(&["A", "B"])]);
    let mut config = test_config(dir.path());
    config.pacing.reveal_polls = 10;
    config.pacing.card_threshold = 2;

    let walker = PageWalker::new(site.launcher(), &config);
    walker.walk(&query(), 1).await.unwrap();

    site.with(|s| assert_eq!(s.card_queries, 1));
}

#[tokio::test]
async fn offset_walk_stops_on_disabled_next_control() {
    let dir = tempfile::tempdir().unwrap();
    let site = FakeSite::new();
    site.route(SEARCH, vec![FakePage::jobs(&["A", "B"]).next(ControlState::Disabled)]);
    site.route(&page_url(1), vec![FakePage::jobs(&["C", "D"]).next(ControlState::Disabled)]);

    let walker = PageWalker::new(site.launcher(), &test_config(dir.path()));
    let walk = walker.walk(&query(), 100).await.unwrap();

    assert_eq!(titles(&walk.records), vec!["A", "B"]);
    assert_eq!(walk.stop, StopReason::NoNextPage);
    assert_eq!(walk.pages, 1);
    site.with(|s| assert_eq!(s.navigations, vec![SEARCH.to_string()]));
}

#[tokio::test]
async fn offset_walk_continues_when_next_control_is_not_rendered() {
    let dir = tempfile::tempdir().unwrap();
    let site = FakeSite::new();
    site.route(SEARCH, vec![FakePage::jobs(&["A"]).next(ControlState::Absent)]);
    site.route(&page_url(1), vec![FakePage::jobs(&["B"]).next(ControlState::Enabled)]);

    let walker = PageWalker::new(site.launcher(), &test_config(dir.path()));
    let walk = walker.walk(&query(), 100).await.unwrap();

    assert_eq!(titles(&walk.records), vec!["A", "B"]);
    assert_eq!(walk.stop, StopReason::NoCards);
}

#[tokio::test]
async fn cookie_save_failure_does_not_fail_the_walk() {
    let dir = tempfile::tempdir().unwrap();
    let site = FakeSite::new();
    site.route(SEARCH, vec![FakePage::jobs(&["A", "B"])]);
    site.with(|s| s.browser_cookies = vec![cookie("li_at", "fresh")]);
    let mut config = test_config(dir.path());
    config.session_path = dir.path().join("missing").join("cookies.json");

    let walker = PageWalker::new(site.launcher(), &config);
    let walk = walker.walk(&query(), 100).await.unwrap();

    assert_eq!(titles(&walk.records), vec!["A", "B"]);
    assert!(!config.session_path.exists());
    site.with(|s| assert_eq!(s.closes, 1));
}
