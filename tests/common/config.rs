//! Test configuration helpers

use clip_stitch::config::{Config, FileCollisionAction};
use std::path::Path;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Configuration pointing workspaces and output into `root`
///
/// Workspaces go to `root/work` so tests can check they were cleaned up, the
/// published video goes to `root/out`.
pub fn test_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.processing.output_dir = root.join("out");
    config.processing.workspace_root = Some(root.join("work"));
    config.processing.file_collision = FileCollisionAction::Overwrite;
    config.fetch.timeout = Duration::from_secs(10);
    config.fetch.connect_timeout = Duration::from_secs(5);
    config
}

/// Serve `body` at `route` on `server`
pub async fn serve(server: &MockServer, route: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

/// Serve a 404 at `route` on `server`
pub async fn serve_missing(server: &MockServer, route: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

/// Absolute URL for `route` on `server`
pub fn url(server: &MockServer, route: &str) -> String {
    format!("{}{}", server.uri(), route)
}
