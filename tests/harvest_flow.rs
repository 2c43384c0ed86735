//! End-to-end harvest runs against a mock GitHub server.
//!
//! These tests exercise the real Octocrab gateway, the artifact store, and
//! the orchestrator together: the only substitutions are the HTTP server
//! (wiremock) and the output root (a temp directory).

use std::sync::Mutex;

use camino::Utf8PathBuf;
use magpie::{
    ArtifactStore, ExclusionSet, HarvestEvent, Harvester, OctocrabHarvestGateway,
    OrganizationName, PersonalAccessToken, ProgressSink,
};
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Progress sink that records events for assertions.
#[derive(Debug, Default)]
struct RecordingProgress {
    events: Mutex<Vec<HarvestEvent>>,
}

impl RecordingProgress {
    fn take(&self) -> Vec<HarvestEvent> {
        self.events
            .lock()
            .expect("events mutex should be available")
            .drain(..)
            .collect()
    }
}

impl ProgressSink for RecordingProgress {
    fn record(&self, event: HarvestEvent) {
        self.events
            .lock()
            .expect("events mutex should be available")
            .push(event);
    }
}

fn temp_store() -> (tempfile::TempDir, ArtifactStore) {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let root =
        Utf8PathBuf::from_path_buf(dir.path().join("output")).expect("temp path should be UTF-8");
    let store = ArtifactStore::open(root).expect("should open store");
    (dir, store)
}

fn gateway_for(server: &MockServer) -> OctocrabHarvestGateway {
    let token = PersonalAccessToken::new("test-token").expect("token should be valid");
    OctocrabHarvestGateway::for_token_with_base(&token, &server.uri())
        .expect("should create gateway")
}

fn organization() -> OrganizationName {
    OrganizationName::new("acme").expect("organization name should be valid")
}

async fn mount_repo_listing(server: &MockServer, repos: &[&str]) {
    let body: Vec<Value> = repos.iter().map(|name| json!({"name": name})).collect();
    Mock::given(method("GET"))
        .and(path("/orgs/acme/repos"))
        .and(query_param("type", "all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_pull_listing(server: &MockServer, repo: &str, numbers: &[u64]) {
    let body: Vec<Value> = numbers.iter().map(|n| json!({"number": n})).collect();
    Mock::given(method("GET"))
        .and(path(format!("/repos/acme/{repo}/pulls")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_artifacts(server: &MockServer, repo: &str, number: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/acme/{repo}/pulls/{number}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "number": number,
            "title": format!("PR {number}"),
            "state": "open"
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/repos/acme/{repo}/pulls/{number}/comments")))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": number * 10, "body": "looks good"}
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/repos/acme/{repo}/pulls/{number}/commits")))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"sha": format!("sha-{number}")}
        ])))
        .mount(server)
        .await;
}

fn read_artifact(store: &ArtifactStore, repo: &str, file: &str) -> String {
    let file_path = store.root().join(repo).join("pulls").join(file);
    std::fs::read_to_string(file_path.as_std_path()).expect("artifact file should exist")
}

#[tokio::test]
async fn full_harvest_writes_all_artifacts_at_the_expected_paths() {
    let server = MockServer::start().await;
    mount_repo_listing(&server, &["a", "b", "c"]).await;
    mount_pull_listing(&server, "a", &[1, 2]).await;
    mount_pull_listing(&server, "c", &[]).await;
    mount_artifacts(&server, "a", 1).await;
    mount_artifacts(&server, "a", 2).await;

    let (_guard, store) = temp_store();
    let gateway = gateway_for(&server);
    let progress = RecordingProgress::default();

    let harvester = Harvester::new(
        &gateway,
        &store,
        &progress,
        organization(),
        ExclusionSet::from_csv("b"),
        false,
    );
    let summary = harvester.run().await.expect("harvest should succeed");

    assert_eq!(summary.repositories, 2);
    assert_eq!(summary.pull_requests_saved, 2);

    for number in [1_u64, 2] {
        for kind in magpie::ArtifactKind::ALL {
            let file = kind.file_name(number);
            let contents = read_artifact(&store, "a", &file);
            let parsed: Vec<Value> =
                serde_json::from_str(&contents).expect("artifact should be a valid JSON array");
            assert!(!parsed.is_empty(), "{file} should hold the fetched items");
            assert!(
                contents.contains("\n  {"),
                "{file} should be pretty-printed: {contents}"
            );
        }
    }

    let details: Vec<Value> =
        serde_json::from_str(&read_artifact(&store, "a", "pr_1.json")).expect("should parse");
    assert_eq!(
        details,
        vec![json!({"number": 1, "title": "PR 1", "state": "open"})],
        "details artifact is a one-item collection of the PR object"
    );

    assert_eq!(
        read_artifact(&store, "a", "pr_1_review_comments.json"),
        read_artifact(&store, "a", "pr_1_comments.json"),
        "both comment kinds come from the same listing"
    );

    assert!(!store.root().join("b").exists(), "excluded repo untouched");
    assert!(
        store.root().join("c").join("pulls").is_dir(),
        "empty repo still gets its directory tree"
    );

    let events = progress.take();
    assert!(events.contains(&HarvestEvent::RepositoriesDiscovered {
        organization: "acme".to_owned(),
        total: 3,
        excluded: 1,
        names: vec!["a".to_owned(), "c".to_owned()],
    }));
    assert!(events.iter().any(|event| matches!(
        event,
        HarvestEvent::PullRequestSaved { number: 2, .. }
    )));
}

#[tokio::test]
async fn rerun_resumes_from_existing_details_and_fetches_nothing_new() {
    let server = MockServer::start().await;
    mount_repo_listing(&server, &["a"]).await;
    mount_pull_listing(&server, "a", &[1, 2]).await;

    // No artifact endpoints are mounted: a resumed run that tried to fetch
    // any artifact would get a 404 and abort.
    let (_guard, store) = temp_store();
    store.ensure_repo_dirs("a").expect("should create dirs");
    store
        .write(
            "a",
            1,
            magpie::ArtifactKind::Details,
            &[json!({"number": 1})],
        )
        .expect("should seed resume file");

    let gateway = gateway_for(&server);
    let progress = RecordingProgress::default();
    let harvester = Harvester::new(
        &gateway,
        &store,
        &progress,
        organization(),
        ExclusionSet::default(),
        false,
    );
    let summary = harvester.run().await.expect("resumed run should succeed");

    assert_eq!(summary.pull_requests_saved, 0);
    assert!(
        !store.exists("a", 2, magpie::ArtifactKind::Details),
        "PR 2 is skipped by the short-circuit, not harvested"
    );

    let events = progress.take();
    assert!(events.contains(&HarvestEvent::ResumePointFound {
        repository: "a".to_owned(),
        number: 1,
    }));
}

#[tokio::test]
async fn test_mode_processes_only_the_first_repository() {
    let server = MockServer::start().await;
    mount_repo_listing(&server, &["a", "c"]).await;
    mount_pull_listing(&server, "a", &[]).await;
    // Repo `c` has no pull listing mounted; touching it would abort the run.

    let (_guard, store) = temp_store();
    let gateway = gateway_for(&server);
    let progress = RecordingProgress::default();

    let harvester = Harvester::new(
        &gateway,
        &store,
        &progress,
        organization(),
        ExclusionSet::default(),
        true,
    );
    let summary = harvester.run().await.expect("test-mode run should succeed");

    assert_eq!(summary.repositories, 1);
    assert!(store.root().join("a").is_dir());
    assert!(!store.root().join("c").exists());
    assert!(progress.take().contains(&HarvestEvent::TestModeActive));
}
