// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::*;
use crate::domain::models::probe::{ProbeError, ProbeResult, RemovalClass};
use crate::domain::models::site::SiteProfile;
use crate::domain::models::sitemap_index::FetchOutcome;
use crate::utils::retry_policy::RecordingSleeper;
use crate::utils::url_utils::UrlNormalizer;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// 预设响应
#[derive(Clone)]
enum Script {
    Respond {
        status: Option<u16>,
        chain: Vec<u16>,
        error: Option<ProbeError>,
    },
    /// 触发关闭信号后永远挂起
    Hang,
}

fn respond(status: u16) -> Script {
    Script::Respond {
        status: Some(status),
        chain: Vec::new(),
        error: None,
    }
}

struct ScriptedProber {
    scripts: HashMap<String, Script>,
    requested: Mutex<Vec<String>>,
    shutdown: Option<watch::Sender<bool>>,
}

impl ScriptedProber {
    fn new(scripts: Vec<(&str, Script)>) -> Self {
        Self {
            scripts: scripts
                .into_iter()
                .map(|(url, script)| (url.to_string(), script))
                .collect(),
            requested: Mutex::new(Vec::new()),
            shutdown: None,
        }
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl UrlProber for ScriptedProber {
    async fn probe(&self, request: &ProbeRequest) -> ProbeResult {
        self.requested.lock().unwrap().push(request.url.clone());
        let script = self.scripts.get(&request.url).cloned().unwrap_or(Script::Respond {
            status: None,
            chain: Vec::new(),
            error: Some(ProbeError::Connection("unscripted".to_string())),
        });

        match script {
            Script::Respond {
                status,
                chain,
                error,
            } => ProbeResult {
                requested_url: request.url.clone(),
                final_url: status.map(|_| request.url.clone()),
                resolved_status: status,
                elapsed: Duration::from_millis(25),
                redirect_chain: chain,
                attempts: 1,
                error,
            },
            Script::Hang => {
                if let Some(shutdown) = &self.shutdown {
                    let _ = shutdown.send(true);
                }
                std::future::pending().await
            }
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

fn profile() -> SiteProfile {
    SiteProfile::new("https", "qa", "qa-www.ex.com", "www.ex.com", &[], &[])
}

fn sitemap(urls: &[&str]) -> Arc<SitemapIndex> {
    Arc::new(SitemapIndex::from_locations(
        urls.iter().map(|url| url.to_string()).collect(),
        UrlNormalizer::new(&profile()),
        FetchOutcome {
            source_url: "https://qa-www.ex.com/sitemap.xml".to_string(),
            success: true,
            byte_size: 512,
            used_fallback: false,
            error: None,
        },
    ))
}

fn failed_sitemap() -> Arc<SitemapIndex> {
    Arc::new(SitemapIndex::empty(
        UrlNormalizer::new(&profile()),
        FetchOutcome {
            source_url: "https://qa-www.ex.com/sitemap.xml".to_string(),
            success: false,
            error: Some("HTTP 503".to_string()),
            ..FetchOutcome::default()
        },
    ))
}

fn service(prober: Arc<ScriptedProber>, index: Arc<SitemapIndex>) -> (VerificationService, Arc<RecordingSleeper>) {
    let sleeper = Arc::new(RecordingSleeper::new());
    let service = VerificationService::new(prober, index, UrlResolver::new(profile()), sleeper.clone());
    (service, sleeper)
}

fn redirect(original: &str, expected: &str) -> RedirectRule {
    RedirectRule {
        original_url: original.to_string(),
        expected_url: expected.to_string(),
        declared_status: 301,
    }
}

fn removal(original: &str) -> RemovalRule {
    RemovalRule {
        original_url: original.to_string(),
        declared_status: Some(301),
    }
}

fn never_shutdown() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    drop(tx);
    rx
}

#[tokio::test]
async fn test_redirect_success() {
    let prober = Arc::new(ScriptedProber::new(vec![(
        "https://qa-www.ex.com/new",
        respond(200),
    )]));
    let (service, _) = service(prober.clone(), sitemap(&["https://www.ex.com/new"]));

    let verdict = service.verify_redirect(&redirect("/old", "/new")).await;

    assert!(verdict.url_accessible);
    assert!(verdict.expected_in_sitemap);
    assert!(verdict.original_removed);
    assert!(verdict.overall_success);
    assert_eq!(verdict.prepared_original, "https://qa-www.ex.com/old");
    assert_eq!(prober.requested(), vec!["https://qa-www.ex.com/new"]);
}

#[tokio::test]
async fn test_redirect_with_small_body_is_not_accessible() {
    let prober = Arc::new(ScriptedProber::new(vec![(
        "https://qa-www.ex.com/new",
        Script::Respond {
            status: Some(200),
            chain: Vec::new(),
            error: Some(ProbeError::ContentTooSmall(50)),
        },
    )]));
    let (service, _) = service(prober, sitemap(&["https://www.ex.com/new"]));

    let verdict = service.verify_redirect(&redirect("/old", "/new")).await;

    assert!(!verdict.url_accessible);
    assert!(!verdict.overall_success);
    assert_eq!(verdict.probe.error, Some(ProbeError::ContentTooSmall(50)));
}

#[tokio::test]
async fn test_original_with_trailing_slash_is_compared_exactly() {
    let prober = Arc::new(ScriptedProber::new(vec![(
        "https://qa-www.ex.com/psychics-list",
        respond(200),
    )]));
    let (service, _) = service(
        prober,
        sitemap(&["https://www.ex.com/psychics-list", "https://www.ex.com/psychics"]),
    );

    let verdict = service
        .verify_redirect(&redirect("/psychics/", "/psychics-list"))
        .await;
    assert!(verdict.original_removed);
    assert!(verdict.overall_success);

    let verdict = service
        .verify_redirect(&redirect("/psychics", "/psychics-list"))
        .await;
    assert!(!verdict.original_removed);
    assert!(!verdict.overall_success);
}

#[tokio::test]
async fn test_failed_sitemap_fails_every_sitemap_check() {
    let prober = Arc::new(ScriptedProber::new(vec![
        ("https://qa-www.ex.com/new", respond(200)),
        ("https://qa-www.ex.com/gone", respond(404)),
    ]));
    let (service, _) = service(prober, failed_sitemap());

    let rules = RuleSet::new(
        vec![
            Rule::Redirect(redirect("/old", "/new")),
            Rule::Removal(removal("/gone")),
        ],
        2,
    );
    let run = service.run(&rules, never_shutdown()).await;

    assert_eq!(run.warnings.len(), 1);
    assert!(run.warnings[0].contains("HTTP 503"));
    match &run.verdicts[0] {
        Verdict::Redirect(v) => {
            assert!(v.url_accessible);
            assert!(!v.expected_in_sitemap);
            assert!(!v.original_removed);
            assert!(!v.overall_success);
        }
        other => panic!("unexpected verdict {:?}", other),
    }
    match &run.verdicts[1] {
        Verdict::Removal(v) => {
            assert!(v.url_inaccessible);
            assert!(!v.removed_from_sitemap);
            assert!(!v.fully_removed);
        }
        other => panic!("unexpected verdict {:?}", other),
    }
    assert!(!run.all_passed());
}

#[tokio::test]
async fn test_removal_redirected_away_but_still_in_sitemap() {
    let prober = Arc::new(ScriptedProber::new(vec![(
        "https://qa-www.ex.com/retired",
        Script::Respond {
            status: Some(301),
            chain: vec![301],
            error: None,
        },
    )]));
    let (service, _) = service(prober, sitemap(&["https://www.ex.com/retired"]));

    let verdict = service.verify_removal(&removal("/retired")).await;

    assert_eq!(verdict.removal_class, RemovalClass::RedirectedAway);
    assert!(verdict.removal_class.is_acceptable());
    assert!(verdict.url_inaccessible);
    assert!(!verdict.removed_from_sitemap);
    assert!(!verdict.fully_removed);
}

#[tokio::test]
async fn test_removal_404_absent_from_sitemap() {
    let prober = Arc::new(ScriptedProber::new(vec![(
        "https://qa-www.ex.com/gone",
        respond(404),
    )]));
    let (service, _) = service(prober, sitemap(&["https://www.ex.com/other"]));

    let verdict = service.verify_removal(&removal("/gone")).await;

    assert_eq!(verdict.removal_class, RemovalClass::Removed);
    assert!(verdict.fully_removed);
}

#[tokio::test]
async fn test_removal_error_statuses_are_not_removed() {
    let prober = Arc::new(ScriptedProber::new(vec![
        ("https://qa-www.ex.com/forbidden", respond(403)),
        ("https://qa-www.ex.com/outage", respond(503)),
        (
            "https://qa-www.ex.com/slow",
            Script::Respond {
                status: None,
                chain: Vec::new(),
                error: Some(ProbeError::Timeout),
            },
        ),
    ]));
    let (service, _) = service(prober, sitemap(&["https://www.ex.com/other"]));

    for (path, class) in [
        ("/forbidden", RemovalClass::StillServed(403)),
        ("/outage", RemovalClass::StillServed(503)),
        ("/slow", RemovalClass::Unreachable),
    ] {
        let verdict = service.verify_removal(&removal(path)).await;
        assert_eq!(verdict.removal_class, class);
        assert!(verdict.removed_from_sitemap);
        assert!(!verdict.url_inaccessible, "{}", path);
        assert!(!verdict.fully_removed, "{}", path);
    }
}

#[tokio::test]
async fn test_run_keeps_input_order_and_paces_requests() {
    let prober = Arc::new(ScriptedProber::new(vec![
        ("https://qa-www.ex.com/b", respond(404)),
        ("https://qa-www.ex.com/new", respond(200)),
    ]));
    let (service, sleeper) = service(prober.clone(), sitemap(&["https://www.ex.com/new"]));
    let service = service.with_request_interval(Duration::from_millis(250));

    let rules = RuleSet::new(
        vec![
            Rule::Removal(removal("/b")),
            Rule::Redirect(redirect("/a", "/new")),
        ],
        3,
    );
    let run = service.run(&rules, never_shutdown()).await;

    assert!(!run.interrupted);
    assert!(run.warnings.is_empty());
    assert!(run.all_passed());
    assert_eq!(
        prober.requested(),
        vec!["https://qa-www.ex.com/b", "https://qa-www.ex.com/new"]
    );
    assert_eq!(sleeper.calls(), vec![Duration::from_millis(250)]);
    assert_eq!(run.redirect_summary(), KindSummary { total: 1, passed: 1 });
    assert_eq!(run.removal_summary(), KindSummary { total: 1, passed: 1 });
}

#[tokio::test]
async fn test_sitemap_analysis_counts() {
    let prober = Arc::new(ScriptedProber::new(vec![
        ("https://qa-www.ex.com/new", respond(200)),
        ("https://qa-www.ex.com/missing", respond(200)),
        ("https://qa-www.ex.com/stale", respond(404)),
        ("https://qa-www.ex.com/b", respond(404)),
    ]));
    let (service, _) = service(
        prober,
        sitemap(&[
            "https://www.ex.com/new",
            "https://www.ex.com/old",
            "https://www.ex.com/stale",
        ]),
    );

    let rules = RuleSet::new(
        vec![
            Rule::Redirect(redirect("/old", "/new")),
            Rule::Redirect(redirect("/x", "/missing")),
            Rule::Removal(removal("/stale")),
            Rule::Removal(removal("/b")),
        ],
        4,
    );
    let run = service.run(&rules, never_shutdown()).await;
    let analysis = run.sitemap_analysis();

    assert_eq!(
        analysis,
        SitemapAnalysis {
            sitemap_urls: 3,
            redirects: 2,
            expected_found: 1,
            originals_removed: 1,
            removals: 2,
            removals_absent: 1,
        }
    );
    assert_eq!(analysis.originals_listed(), 1);
    assert_eq!(analysis.removals_listed(), 1);
}

#[tokio::test]
async fn test_interrupt_returns_partial_verdicts() {
    let (tx, rx) = watch::channel(false);
    let mut prober = ScriptedProber::new(vec![
        ("https://qa-www.ex.com/gone", respond(404)),
        ("https://qa-www.ex.com/slow", Script::Hang),
        ("https://qa-www.ex.com/never", respond(404)),
    ]);
    prober.shutdown = Some(tx);
    let prober = Arc::new(prober);
    let (service, _) = service(prober.clone(), sitemap(&[]));

    let rules = RuleSet::new(
        vec![
            Rule::Removal(removal("/gone")),
            Rule::Removal(removal("/slow")),
            Rule::Removal(removal("/never")),
        ],
        3,
    );
    let run = service.run(&rules, rx).await;

    assert!(run.interrupted);
    assert_eq!(run.verdicts.len(), 1);
    assert!(run.verdicts[0].passed());
    assert!(!run.all_passed());
    assert_eq!(
        prober.requested(),
        vec!["https://qa-www.ex.com/gone", "https://qa-www.ex.com/slow"]
    );
}

#[tokio::test]
async fn test_shutdown_before_start_probes_nothing() {
    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();
    let prober = Arc::new(ScriptedProber::new(vec![(
        "https://qa-www.ex.com/gone",
        respond(404),
    )]));
    let (service, _) = service(prober.clone(), sitemap(&[]));

    let rules = RuleSet::new(vec![Rule::Removal(removal("/gone"))], 1);
    let run = service.run(&rules, rx).await;

    assert!(run.interrupted);
    assert!(run.verdicts.is_empty());
    assert!(prober.requested().is_empty());
}
