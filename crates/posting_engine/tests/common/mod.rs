#![allow(dead_code)]

use tokio::runtime::Runtime;
use wiremock::{Mock, MockServer};

/// Mock HTTP server driven by its own runtime, so blocking clients under test
/// can run their own.
pub struct TestServer {
    server: MockServer,
    runtime: Runtime,
}

impl TestServer {
    pub fn start() -> Self {
        let runtime = Runtime::new().expect("test runtime");
        let server = runtime.block_on(MockServer::start());
        Self { server, runtime }
    }

    pub fn mount(&self, mock: Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.server.uri(), path)
    }
}

pub fn html_page(body: &str) -> String {
    format!("<html><body>{body}</body></html>")
}
