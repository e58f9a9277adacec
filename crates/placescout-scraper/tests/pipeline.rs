mod common;

use std::time::Duration;

use common::{fast_options, params, places, Fault, FakeMapsSession, FakePlace};
use placescout_scraper::{
    run, DetailStage, DiscoveryOutcome, FieldParseError, ItemError, ScraperError, SessionError,
};

fn positions(report: &placescout_scraper::ScrapeReport) -> Vec<u32> {
    report.records.iter().map(|r| r.position).collect()
}

#[tokio::test]
async fn one_failed_item_leaves_a_gap_and_is_reported() {
    let mut list = places(5);
    list[1] = FakePlace::new(2).with_fault(Fault::NeverReady);
    let session = FakeMapsSession::new(list, &[(800, 2), (1000, 5), (1000, 5)]);

    let report = run(&session, &params(3), &fast_options()).await.unwrap();

    assert_eq!(report.discovery, DiscoveryOutcome::LimitReached);
    assert_eq!(report.discovered, 3);
    assert_eq!(report.records.len(), 2);
    assert_eq!(positions(&report), vec![1, 3]);
    assert_eq!(report.failed_count(), 1);
    assert!(!report.is_complete());

    let failure = &report.failures[0];
    assert_eq!(failure.index, 1);
    assert_eq!(failure.position, 2);
    assert!(matches!(
        failure.error,
        ItemError::Stage {
            stage: DetailStage::AwaitPrimaryReady,
            source: SessionError::Timeout { .. },
        }
    ));
    // Transient failure is retried once before being recorded.
    assert_eq!(session.attempts(1), 2);
}

#[tokio::test]
async fn records_carry_listing_reference_and_coerced_numbers() {
    let session = FakeMapsSession::new(places(2), &[(1000, 2)]);

    let report = run(&session, &params(2), &fast_options()).await.unwrap();

    assert!(report.is_complete());
    let first = &report.records[0];
    assert_eq!(first.position, 1);
    assert_eq!(first.data_id.as_deref(), Some("ID1"));
    assert_eq!(first.coordinates.latitude.as_deref(), Some("-6.1"));
    assert_eq!(first.coordinates.longitude.as_deref(), Some("106.1"));
    assert_eq!(first.title, "Place 1");
    assert_eq!(first.rating, Some(4.5));
    assert_eq!(first.reviews, Some(1000));
    assert_eq!(first.phone, "");
    assert_eq!(first.website, "https://example.com/");
    assert_eq!(first.operating_hours.len(), 1);
    assert_eq!(first.services.len(), 1);
    assert!(first.url.as_deref().is_some_and(|u| u.contains("!1sID1")));
    assert_eq!(report.records[1].reviews, Some(2000));
}

#[tokio::test]
async fn navigates_to_the_search_url_first() {
    let session = FakeMapsSession::new(places(1), &[(1000, 1)]);
    let search = params(1);

    run(&session, &search, &fast_options()).await.unwrap();

    assert_eq!(session.navigated(), vec![search.search_url()]);
}

#[tokio::test]
async fn converged_list_shorter_than_limit_yields_natural_count() {
    let session = FakeMapsSession::new(places(4), &[(1000, 4), (1000, 4)]);

    let report = run(&session, &params(10), &fast_options()).await.unwrap();

    assert_eq!(report.discovery, DiscoveryOutcome::Converged);
    assert_eq!(report.discovered, 4);
    assert_eq!(positions(&report), vec![1, 2, 3, 4]);
    assert!(report.failures.is_empty());
    assert!(!report.is_complete());
}

#[tokio::test]
async fn empty_results_finish_without_records() {
    let session = FakeMapsSession::new(Vec::new(), &[(0, 0)]);

    let report = run(&session, &params(5), &fast_options()).await.unwrap();

    assert_eq!(report.discovery, DiscoveryOutcome::Converged);
    assert!(report.records.is_empty());
    assert!(report.failures.is_empty());
}

#[tokio::test]
async fn iteration_cap_stops_a_list_that_keeps_growing() {
    let frames: Vec<(u64, usize)> = (1..=50).map(|i| (i * 100, 1)).collect();
    let session = FakeMapsSession::new(places(1), &frames);
    let options = placescout_scraper::ScrapeOptions {
        max_scroll_iterations: 3,
        ..fast_options()
    };

    let report = run(&session, &params(5), &options).await.unwrap();

    assert_eq!(report.discovery, DiscoveryOutcome::IterationCapReached);
    assert_eq!(report.records.len(), 1);
}

#[tokio::test]
async fn navigation_failure_aborts_the_run() {
    let mut session = FakeMapsSession::new(places(3), &[(1000, 3)]);
    session.navigation_fails = true;

    let err = run(&session, &params(3), &fast_options()).await.unwrap_err();

    assert!(matches!(
        err,
        ScraperError::Session {
            source: SessionError::Navigation(_),
            ..
        }
    ));
}

#[tokio::test]
async fn flaky_item_succeeds_on_retry() {
    let list = vec![FakePlace::new(1).with_fault(Fault::FlakyOnce)];
    let session = FakeMapsSession::new(list, &[(1000, 1)]);

    let report = run(&session, &params(1), &fast_options()).await.unwrap();

    assert!(report.is_complete());
    assert_eq!(session.attempts(0), 2);
}

#[tokio::test]
async fn script_errors_are_not_retried() {
    let list = vec![FakePlace::new(1).with_fault(Fault::ScriptError)];
    let session = FakeMapsSession::new(list, &[(1000, 1)]);

    let report = run(&session, &params(1), &fast_options()).await.unwrap();

    assert_eq!(report.failed_count(), 1);
    assert_eq!(session.attempts(0), 1);
    assert!(matches!(
        report.failures[0].error,
        ItemError::Stage {
            source: SessionError::Script(_),
            ..
        }
    ));
}

#[tokio::test]
async fn absent_rating_keeps_the_record() {
    let mut place = FakePlace::new(1);
    place.rating = None;
    let session = FakeMapsSession::new(vec![place], &[(1000, 1)]);

    let report = run(&session, &params(1), &fast_options()).await.unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].rating, None);
    assert_eq!(report.records[0].reviews, Some(1000));
    assert_eq!(report.field_issues.len(), 1);
    assert_eq!(report.field_issues[0].field, "rating");
    assert_eq!(report.field_issues[0].error, FieldParseError::Absent);
}

#[tokio::test]
async fn missing_about_tab_leaves_services_empty() {
    let mut place = FakePlace::new(1);
    place.about_tab = false;
    let session = FakeMapsSession::new(vec![place], &[(1000, 1)]);

    let report = run(&session, &params(1), &fast_options()).await.unwrap();

    assert!(report.records[0].services.is_empty());
    assert_eq!(report.records[0].operating_hours.len(), 1);
}

#[tokio::test]
async fn hung_item_times_out_and_run_continues() {
    let list = vec![FakePlace::new(1).with_fault(Fault::Hangs), FakePlace::new(2)];
    let session = FakeMapsSession::new(list, &[(1000, 2)]);
    let options = placescout_scraper::ScrapeOptions {
        item_timeout: Duration::from_millis(50),
        item_max_retries: 0,
        ..fast_options()
    };

    let report = run(&session, &params(2), &options).await.unwrap();

    assert_eq!(positions(&report), vec![2]);
    assert!(matches!(
        report.failures[0].error,
        ItemError::Timeout { .. }
    ));
}

#[tokio::test]
async fn expired_run_deadline_fails_remaining_items() {
    let session = FakeMapsSession::new(places(3), &[(1000, 3)]);
    let options = placescout_scraper::ScrapeOptions {
        run_timeout: Some(Duration::ZERO),
        ..fast_options()
    };

    let report = run(&session, &params(3), &options).await.unwrap();

    assert!(report.records.is_empty());
    assert_eq!(report.failed_count(), 3);
    assert!(report
        .failures
        .iter()
        .all(|f| matches!(f.error, ItemError::RunDeadlineExceeded)));
    assert_eq!(session.attempts(0), 0);
}

#[tokio::test]
async fn record_count_never_exceeds_limit() {
    let session = FakeMapsSession::new(places(8), &[(1000, 8)]);

    let report = run(&session, &params(3), &fast_options()).await.unwrap();

    assert_eq!(report.records.len(), 3);
    assert_eq!(positions(&report), vec![1, 2, 3]);
}

#[tokio::test]
async fn lingering_detail_view_is_not_read_as_the_next_place() {
    let mut session = FakeMapsSession::new(places(2), &[(1000, 2)]);
    session.stale_for = Duration::from_millis(300);

    let report = run(&session, &params(2), &fast_options()).await.unwrap();

    assert!(report.is_complete());
    let titles: Vec<&str> = report.records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Place 1", "Place 2"]);
    assert_eq!(report.records[1].address, "Place 2 Street");
}

#[tokio::test]
async fn detail_view_that_never_changes_fails_the_item() {
    let mut session = FakeMapsSession::new(places(2), &[(1000, 2)]);
    session.stale_for = Duration::from_secs(60);
    let options = placescout_scraper::ScrapeOptions {
        view_change_timeout: Duration::from_millis(50),
        item_max_retries: 0,
        ..fast_options()
    };

    let report = run(&session, &params(2), &options).await.unwrap();

    assert!(report.records.is_empty());
    assert_eq!(report.failed_count(), 2);
    assert!(matches!(
        report.failures[0].error,
        ItemError::Stage {
            stage: DetailStage::AwaitPrimaryReady,
            source: SessionError::Timeout { .. },
        }
    ));
    assert!(report.failures[0].error.is_transient());
}

#[tokio::test]
async fn reordered_list_still_opens_the_discovered_place() {
    let mut session = FakeMapsSession::new(places(3), &[(1000, 3)]);
    session.reorder_after_reads = Some(3);

    let report = run(&session, &params(3), &fast_options()).await.unwrap();

    assert!(report.is_complete());
    for (n, record) in (1..=3).zip(&report.records) {
        assert_eq!(record.position, n);
        assert_eq!(record.title, format!("Place {n}"));
        assert_eq!(record.data_id.as_deref(), Some(format!("ID{n}").as_str()));
    }
}
