// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::TestSite;
use chrono::Local;
use sitecheck::domain::models::probe::{ProbeError, RemovalClass};
use sitecheck::domain::models::verdict::Verdict;
use sitecheck::utils::errors::SiteCheckError;
use tokio::sync::watch;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_full_run_against_mock_site() {
    let site = TestSite::start().await;
    site.sitemap(&["/new", "/thin", "/retired"]).await;
    site.page("/new", 200, 500).await;
    site.page("/thin", 200, 50).await;
    site.page("/gone", 404, 0).await;
    site.redirect("/retired", 301, "/landing").await;
    site.page("/landing", 200, 400).await;

    let input = site.input(&[
        ["https://www.example.com/old", "301", "https://www.example.com/new"],
        ["/thin-old", "301.0", "/thin"],
        ["/ignored", "200", "/elsewhere"],
        ["/gone", "404", "REMOVE"],
        ["/retired", "", "remove"],
    ]);
    let use_case = site.use_case(site.settings(&input));

    let (_tx, rx) = watch::channel(false);
    let outcome = use_case.execute(rx).await.unwrap();

    assert_eq!(outcome.total_rows, 5);
    assert!(outcome.sitemap.success);
    assert!(!outcome.sitemap.used_fallback);
    assert!(outcome.run.warnings.is_empty());
    assert!(!outcome.run.interrupted);
    assert_eq!(outcome.run.verdicts.len(), 4);
    assert_eq!(outcome.run.sitemap_urls, 3);
    let analysis = outcome.run.sitemap_analysis();
    assert_eq!(analysis.expected_found, 2);
    assert_eq!(analysis.removals_listed(), 1);

    match &outcome.run.verdicts[0] {
        Verdict::Redirect(v) => {
            assert_eq!(v.probe.requested_url, format!("http://{}/new", site.host()));
            assert!(v.url_accessible);
            assert!(v.expected_in_sitemap);
            assert!(v.original_removed);
            assert!(v.overall_success);
        }
        other => panic!("unexpected verdict {:?}", other),
    }
    match &outcome.run.verdicts[1] {
        Verdict::Redirect(v) => {
            assert_eq!(v.probe.error, Some(ProbeError::ContentTooSmall(50)));
            assert!(!v.url_accessible);
            assert!(!v.overall_success);
        }
        other => panic!("unexpected verdict {:?}", other),
    }
    match &outcome.run.verdicts[2] {
        Verdict::Removal(v) => {
            assert_eq!(v.removal_class, RemovalClass::Removed);
            assert!(v.fully_removed);
        }
        other => panic!("unexpected verdict {:?}", other),
    }
    match &outcome.run.verdicts[3] {
        Verdict::Removal(v) => {
            assert_eq!(v.probe.redirect_chain, vec![301]);
            assert_eq!(v.removal_class, RemovalClass::StillServed(200));
            assert!(!v.url_inaccessible);
            assert!(!v.removed_from_sitemap);
            assert!(!v.fully_removed);
        }
        other => panic!("unexpected verdict {:?}", other),
    }

    assert!(!outcome.succeeded());
    assert_eq!(outcome.failed_count(), 2);

    let date = Local::now().format("%Y-%m-%d").to_string();
    let csv_path = site.output_dir().join(format!("test_results_{}.csv", date));
    let html_path = site.output_dir().join(format!("test_report_{}.html", date));
    assert_eq!(outcome.reports, vec![csv_path.clone(), html_path.clone()]);

    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    assert_eq!(reader.records().count(), 4);
    let html = std::fs::read_to_string(&html_path).unwrap();
    assert!(html.contains("Response too small (50 bytes)"));
}

#[tokio::test]
async fn test_all_rules_passing() {
    let site = TestSite::start().await;
    site.sitemap(&["/psychics-list/"]).await;
    site.page("/psychics-list/", 200, 300).await;
    site.page("/old-page", 410, 0).await;

    let input = site.input(&[
        ["/psychics/", "301", "/psychics-list/"],
        ["/old-page", "301", "REMOVE"],
    ]);
    let use_case = site.use_case(site.settings(&input));

    let (_tx, rx) = watch::channel(false);
    let outcome = use_case.execute(rx).await.unwrap();

    assert_eq!(outcome.run.verdicts.len(), 2);
    assert!(outcome.succeeded());
    assert_eq!(outcome.failed_count(), 0);
}

#[tokio::test]
async fn test_unavailable_sitemap_fails_sitemap_checks() {
    let site = TestSite::start().await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&site.server)
        .await;
    site.page("/new", 200, 500).await;
    site.page("/gone", 404, 0).await;

    let input = site.input(&[["/old", "301", "/new"], ["/gone", "404", "REMOVE"]]);
    let use_case = site.use_case(site.settings(&input));

    let (_tx, rx) = watch::channel(false);
    let outcome = use_case.execute(rx).await.unwrap();

    assert!(!outcome.sitemap.success);
    assert_eq!(outcome.run.warnings.len(), 1);
    for verdict in &outcome.run.verdicts {
        assert!(!verdict.passed());
        if let Verdict::Redirect(v) = verdict {
            assert!(v.url_accessible);
            assert!(!v.expected_in_sitemap);
            assert!(!v.original_removed);
        }
    }
    // Reports are still produced
    assert_eq!(outcome.reports.len(), 2);
}

#[tokio::test]
async fn test_interrupted_before_start_still_writes_reports() {
    let site = TestSite::start().await;
    site.sitemap(&["/new"]).await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("n".repeat(200)))
        .expect(0)
        .mount(&site.server)
        .await;

    let input = site.input(&[["/old", "301", "/new"]]);
    let use_case = site.use_case(site.settings(&input));

    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();
    let outcome = use_case.execute(rx).await.unwrap();

    assert!(outcome.run.interrupted);
    assert!(outcome.run.verdicts.is_empty());
    assert!(!outcome.succeeded());
    assert_eq!(outcome.reports.len(), 2);
}

#[tokio::test]
async fn test_ambiguous_columns_abort_before_probing() {
    let site = TestSite::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&site.server)
        .await;

    let input = site.workdir.path().join("dupes.csv");
    std::fs::write(
        &input,
        "Original URL,Status Code,Expected URL,Expected URL\n/a,301,/b,/c\n",
    )
    .unwrap();
    let use_case = site.use_case(site.settings(&input));

    let (_tx, rx) = watch::channel(false);
    let err = use_case.execute(rx).await.unwrap_err();

    assert!(matches!(err, SiteCheckError::Validation(_)));
    assert!(!site.output_dir().exists());
}
