//! E2E Test: Install, Activate and Upgrade
//!
//! Covers the first install, a failed pre-cache, replacing an older
//! version's caches and the page-facing version query.

use alloc::string::ToString;
use alloc::sync::Arc;

use cms_worker::{
    ActivateReport, CacheStore, FetchSource, HostControl, MemoryCacheStore, MessageEvent,
    PrecacheError, Request, Response, WorkerConfig, WorkerEvent, WorkerMessage, WorkerOutcome,
    WorkerError, WorkerState,
};

use crate::fixtures::{app_url, HtmlFixtures, ORIGIN};
use crate::harness::TestApp;

#[test]
fn test_first_install_caches_shell() {
    let app = TestApp::new().unwrap();
    let outcome = app.worker.dispatch(WorkerEvent::Install).unwrap();

    let WorkerOutcome::Installed(report) = outcome else {
        panic!("expected install report");
    };
    assert_eq!(report.cached, 14);
    assert!(report.error.is_none());
    assert_eq!(app.static_entries().len(), 14);
    assert!(app.static_entries().contains(&"https://code.jquery.com/jquery-3.6.0.min.js".to_string()));
    assert_eq!(app.worker.state(), WorkerState::Installed);
    assert_eq!(app.host.controls(), [HostControl::SkipWaiting]);
}

#[test]
fn test_activation_claims_clients() {
    let app = TestApp::new().unwrap();
    app.start().unwrap();
    assert_eq!(app.worker.state(), WorkerState::Activated);
    assert_eq!(
        app.host.controls(),
        [HostControl::SkipWaiting, HostControl::ClaimClients]
    );
}

#[test]
fn test_failed_asset_abandons_precache() {
    let app = TestApp::new().unwrap();
    app.network.route(
        "https://code.jquery.com/jquery-3.6.0.min.js",
        Response::basic(503, "unavailable"),
    );

    let outcome = app.worker.dispatch(WorkerEvent::Install).unwrap();
    let WorkerOutcome::Installed(report) = outcome else {
        panic!("expected install report");
    };
    assert_eq!(report.cached, 0);
    assert_eq!(
        report.error,
        Some(PrecacheError::BadStatus {
            url: "https://code.jquery.com/jquery-3.6.0.min.js".to_string(),
            status: 503,
        })
    );
    // Nothing partial is left behind and the worker still activates
    assert!(app.static_entries().is_empty());
    app.worker.dispatch(WorkerEvent::Activate).unwrap();
    assert_eq!(app.worker.state(), WorkerState::Activated);
}

#[test]
fn test_offline_install_still_completes() {
    let app = TestApp::new().unwrap();
    app.network.set_offline(true);
    app.start().unwrap();

    assert!(app.static_entries().is_empty());
    assert_eq!(app.navigate("/").source(), None);
}

#[test]
fn test_upgrade_purges_old_caches() {
    let store = Arc::new(MemoryCacheStore::new());
    for old in ["criminology-ms-v1", "criminology-static-v0"] {
        store.open(old).unwrap();
        store
            .put(old, &Request::new(app_url("/")), Response::basic(200, "stale shell"))
            .unwrap();
    }

    let app = TestApp::with_store(WorkerConfig::default(), store.clone()).unwrap();
    app.worker.dispatch(WorkerEvent::Install).unwrap();
    let outcome = app.worker.dispatch(WorkerEvent::Activate).unwrap();

    assert_eq!(
        outcome,
        WorkerOutcome::Activated(ActivateReport {
            deleted: vec!["criminology-ms-v1".to_string(), "criminology-static-v0".to_string()],
            kept: vec!["criminology-static-v1".to_string()],
        })
    );
    assert_eq!(store.keys(), ["criminology-static-v1"]);

    // The fresh shell wins over the stale copy
    app.network.set_offline(true);
    let root = app.navigate("/");
    assert_eq!(root.source(), Some(FetchSource::Cache));
    assert_ne!(root.response().map(|r| r.body.as_slice()), Some(&b"stale shell"[..]));
}

#[test]
fn test_dynamic_cache_survives_activation() {
    let store = Arc::new(MemoryCacheStore::new());
    store.open("criminology-dynamic-v1").unwrap();
    store
        .put(
            "criminology-dynamic-v1",
            &Request::new(app_url("/api/records")),
            Response::basic(200, "[]"),
        )
        .unwrap();

    let app = TestApp::with_store(WorkerConfig::default(), store.clone()).unwrap();
    app.start().unwrap();

    assert!(store.has("criminology-dynamic-v1"));
    assert_eq!(app.dynamic_entries(), [app_url("/api/records")]);
}

#[test]
fn test_fetch_before_activation_passes_through() {
    let app = TestApp::new().unwrap();
    app.worker.dispatch(WorkerEvent::Install).unwrap();
    assert_eq!(app.navigate("/").source(), None);
    assert!(app.network.requests().iter().all(|u| app.worker.config().static_asset_urls().contains(u)));
}

#[test]
fn test_page_queries_version() {
    let app = TestApp::new().unwrap();
    app.start().unwrap();
    app.host.take_controls();

    let message = MessageEvent::new(r#"{"type":"GET_VERSION"}"#, ORIGIN).with_port(7);
    assert_eq!(
        app.worker.dispatch(WorkerEvent::Message(message)).unwrap(),
        WorkerOutcome::Messaged(Some(WorkerMessage::GetVersion))
    );
    assert_eq!(
        app.host.controls(),
        [HostControl::PostMessage {
            port: 7,
            payload: br#"{"version":"criminology-ms-v1"}"#.to_vec(),
        }]
    );
}

#[test]
fn test_custom_origin_from_json() {
    let config = WorkerConfig::from_json(
        r#"{"origin":"https://cms.example.org","static_assets":["/","/static/css/style.css"]}"#,
    )
    .unwrap();
    let app = TestApp::with_config(config).unwrap();
    app.start().unwrap();

    assert_eq!(
        app.static_entries(),
        ["https://cms.example.org/", "https://cms.example.org/static/css/style.css"]
    );
}

#[test]
fn test_restarted_worker_serves_offline() {
    let app = TestApp::new().unwrap();
    app.start().unwrap();
    app.network.set_offline(true);

    let restarted = app.restart().unwrap();
    assert_eq!(restarted.worker.state(), WorkerState::Activated);
    // Nothing fetched again on restart
    assert!(restarted.network.requests().is_empty());

    let result = restarted.navigate("/dashboard");
    assert_eq!(result.source(), Some(FetchSource::OfflineFallback));
    assert_eq!(
        result.response().map(|r| r.body.clone()),
        Some(HtmlFixtures::index_page().into_bytes())
    );
}

#[test]
fn test_restarted_worker_rejects_install() {
    let app = TestApp::new().unwrap();
    app.start().unwrap();
    let restarted = app.restart().unwrap();

    assert!(matches!(
        restarted.worker.dispatch(WorkerEvent::Install),
        Err(WorkerError::InvalidStateTransition { .. })
    ));
    assert!(restarted.network.requests().is_empty());
}
