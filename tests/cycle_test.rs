use folio_stats::config::{Limits, SlotBindings};
use folio_stats::display::{self, HtmlPage};
use folio_stats::{Aggregator, GithubClient, StatsResult};
use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;

const PAGE: &str = r#"<div class="stats">
  <div class="stat-item"><span class="stat-number" data-stat="projects">0</span> Projects</div>
  <div class="stat-item"><span class="stat-number" data-stat="commits">0</span> Commits</div>
  <div class="stat-item"><span class="stat-number" data-stat="languages">0</span> Languages</div>
</div>
"#;

fn aggregator(server: &MockServer) -> Aggregator<GithubClient> {
    let client = GithubClient::new(server.base_url(), None, Duration::from_secs(5)).unwrap();
    Aggregator::new(client, Limits::default())
}

fn mock_alice(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/users/alice");
        then.status(200).json_body(json!({
            "login": "alice",
            "public_repos": 2,
            "followers": 9,
            "following": 1
        }));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/users/alice/repos")
            .query_param("per_page", "100");
        then.status(200).json_body(json!([
            { "name": "a", "language": "X" },
            { "name": "b", "language": "Y" }
        ]));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/repos/alice/a/commits")
            .query_param("author", "alice")
            .query_param_exists("since")
            .query_param("per_page", "100");
        then.status(200).json_body(json!([
            { "sha": "1" }, { "sha": "2" }, { "sha": "3" }, { "sha": "4" }, { "sha": "5" }
        ]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/alice/b/commits");
        then.status(500);
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/alice/a/languages");
        then.status(200).json_body(json!({ "X": 1, "Y": 2 }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/alice/b/languages");
        then.status(200).json_body(json!({ "Y": 5 }));
    });
}

#[tokio::test]
async fn alice_scenario_over_http() {
    let server = MockServer::start();
    mock_alice(&server);

    let stats = aggregator(&server).compute_stats("alice").await.unwrap();

    assert_eq!(stats.public_repos, 2);
    assert_eq!(stats.total_commits, 5);
    assert_eq!(stats.languages, 2);
    assert_eq!(stats.followers, Some(9));
    assert_eq!(stats.following, Some(1));
}

#[tokio::test]
async fn cycle_updates_page_on_disk() {
    let server = MockServer::start();
    mock_alice(&server);

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("index.html");
    std::fs::write(&path, PAGE).unwrap();

    let mut page = HtmlPage::open(&path, &SlotBindings::default()).unwrap();
    display::init_placeholders(&mut page);
    let loading = std::fs::read_to_string(&path).unwrap();
    assert_eq!(loading.matches(">...</span>").count(), 3);

    let stats = aggregator(&server).run_cycle("alice").await;
    display::render(&mut page, &stats);

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains(r#"data-stat="projects" style="opacity: 1; transition: opacity 0.5s ease">2</span> Projects"#));
    assert!(written.contains(r#"data-stat="commits" style="opacity: 1; transition: opacity 0.5s ease">5</span> Commits"#));
    assert!(written.contains(r#"data-stat="languages" style="opacity: 1; transition: opacity 0.5s ease">2</span> Languages"#));
}

#[tokio::test]
async fn missing_profile_renders_fallback() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/users/ghost");
        then.status(404).json_body(json!({ "message": "Not Found" }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/users/ghost/repos");
        then.status(404).json_body(json!({ "message": "Not Found" }));
    });
    let commits = server.mock(|when, then| {
        when.method(GET).path_contains("/commits");
        then.status(200).json_body(json!([]));
    });

    let stats = aggregator(&server).run_cycle("ghost").await;

    assert_eq!(stats, StatsResult::FALLBACK);
    assert_eq!(
        (stats.public_repos, stats.total_commits, stats.languages),
        (3, 30, 10)
    );
    commits.assert_hits(0);
}

#[tokio::test]
async fn failing_repo_list_falls_back_even_if_profile_loads() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/users/alice");
        then.status(200).json_body(json!({ "public_repos": 40 }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/users/alice/repos");
        then.status(403).json_body(json!({ "message": "API rate limit exceeded" }));
    });

    let stats = aggregator(&server).run_cycle("alice").await;
    assert_eq!(stats, StatsResult::FALLBACK);
}

#[tokio::test]
async fn request_count_is_bounded_by_caps() {
    let server = MockServer::start();
    let repos: Vec<_> = (0..30).map(|i| json!({ "name": format!("r{i}") })).collect();
    server.mock(|when, then| {
        when.method(GET).path("/users/alice");
        then.status(200).json_body(json!({ "public_repos": 30 }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/users/alice/repos");
        then.status(200).json_body(json!(repos));
    });
    let commits = server.mock(|when, then| {
        when.method(GET).path_contains("/commits");
        then.status(200).json_body(json!([{ "sha": "1" }]));
    });
    let languages = server.mock(|when, then| {
        when.method(GET).path_contains("/languages");
        then.status(200).json_body(json!({ "Rust": 10 }));
    });

    let stats = aggregator(&server).compute_stats("alice").await.unwrap();

    assert_eq!(stats.public_repos, 30);
    assert_eq!(stats.total_commits, 10);
    assert_eq!(stats.languages, 1);
    commits.assert_hits(10);
    languages.assert_hits(20);
}
