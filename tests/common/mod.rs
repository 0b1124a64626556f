#![allow(dead_code)]

use async_trait::async_trait;
use gradhire_client::core::{
    connectivity, ApiRequest, ConnectivityGate, ConnectivityObserver, Endpoints, RawResponse,
    SecurityScope, Transport, TransportError, UnrestrictedScope,
};
use gradhire_client::{ResumeFlows, ServiceClient, Session};
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const BASE_URL: &str = "http://backend.test";
pub const RESUME_TEXT: &str = "Jane Doe\nData Analyst\nSQL, Python, Tableau";

#[derive(Clone)]
pub enum Reply {
    Respond(RawResponse),
    Refuse,
    Stall,
}

/// Transport stub keyed by URL path. Each path replays its queued replies in
/// order and keeps repeating the last one.
#[derive(Default)]
pub struct RoutedTransport {
    routes: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl RoutedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, path: &str, reply: Reply) -> Self {
        self.routes
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    pub fn on_json(self, path: &str, status: u16, value: serde_json::Value) -> Self {
        self.on(path, Reply::Respond(RawResponse::json(status, &value)))
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn request(&self, index: usize) -> ApiRequest {
        self.requests.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl Transport for RoutedTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, TransportError> {
        let path = request.url.path().to_string();
        self.requests.lock().unwrap().push(request);

        let reply = {
            let mut routes = self.routes.lock().unwrap();
            let queue = routes.get_mut(&path);
            match queue {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match reply {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Refuse) | None => Err(TransportError::Connect(Box::new(
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
            ))),
            Some(Reply::Stall) => std::future::pending().await,
        }
    }
}

pub struct Harness {
    pub flows: ResumeFlows,
    pub transport: Arc<RoutedTransport>,
    pub observer: ConnectivityObserver,
    pub dir: tempfile::TempDir,
}

/// Sandbox that refuses every grant.
pub struct DenyingScope;

impl SecurityScope for DenyingScope {
    fn start_access(&self, _path: &Path) -> bool {
        false
    }

    fn stop_access(&self, _path: &Path) {}
}

impl Harness {
    pub fn new(transport: RoutedTransport) -> Self {
        Self::with_scope(transport, Arc::new(UnrestrictedScope))
    }

    pub fn with_scope(transport: RoutedTransport, scope: Arc<dyn SecurityScope>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(transport);
        let (observer, gate) = connectivity(true);
        let flows = build_flows(transport.clone(), scope, gate, dir.path());
        Self {
            flows,
            transport,
            observer,
            dir,
        }
    }

    /// A picked résumé outside the app data directory.
    pub fn picked_pdf(&self) -> PathBuf {
        self.picked_pdf_with("My Resume.pdf", b"%PDF-1.4\n1 0 obj\n<<>>\nendobj\n%%EOF")
    }

    pub fn picked_pdf_with(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.dir.path().join("picked").join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, bytes).unwrap();
        path
    }

    /// File names in the directory holding the staged résumé.
    pub fn staging_entries(&self) -> Vec<String> {
        let Some(dir) = self.flows.staged_path().parent() else {
            return Vec::new();
        };
        let Ok(entries) = std::fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub fn session(&self) -> &Session {
        self.flows.session()
    }
}

fn build_flows(
    transport: Arc<RoutedTransport>,
    scope: Arc<dyn SecurityScope>,
    gate: ConnectivityGate,
    root: &Path,
) -> ResumeFlows {
    let endpoints = Endpoints::new(BASE_URL).unwrap();
    let client = ServiceClient::new(endpoints, transport)
        .with_scope(scope)
        .with_download_path(root.join("data").join("downloads").join("optimized_resume.pdf"));
    ResumeFlows::new(
        client,
        Session::new(),
        gate,
        root.join("data").join("resumes").join("staged_resume.pdf"),
    )
}

pub fn job_json(title: &str, score: i32) -> serde_json::Value {
    json!({
        "id": Uuid::new_v4(),
        "title": title,
        "company": "Initech",
        "location": "Bengaluru",
        "description": format!("{} role working with SQL and dashboards", title),
        "matchScore": score,
        "applyURL": "https://jobs.example/apply/1"
    })
}

pub fn upload_ok() -> serde_json::Value {
    json!({ "text": RESUME_TEXT })
}
