use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use ropey::Rope;
use tower_lsp::Client;
use tower_lsp::lsp_types::Url;

use crate::analyzer::AnalysisResult;

use super::config::ServerConfig;

/// In-memory representation of an open TaskJuggler document and its cached analysis.
#[derive(Debug, Default)]
pub(crate) struct Document {
    pub(crate) content: Rope,
    pub(crate) version: i32,
    pub(crate) cached_analysis: Option<Arc<AnalysisResult>>,
    /// Bumped on every edit; a debounced run only publishes if it still matches.
    pub(crate) debounce_seq: u64,
    /// Hash of the text the last published diagnostics were computed from.
    pub(crate) published_hash: Option<u64>,
}

impl Document {
    pub(crate) fn new(text: &str, version: i32) -> Self {
        Self {
            content: Rope::from_str(text),
            version,
            ..Default::default()
        }
    }
}

/// Raises the flag when dropped. The server drops a request future when the
/// client cancels it, which stops the blocking workspace scan at the next file.
pub(crate) struct CancelOnDrop(pub(crate) Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Primary LSP server state shared across handlers.
pub(crate) struct TjLanguageServer {
    pub(crate) client: Client,
    pub(crate) documents: Arc<DashMap<Url, Document>>,
    pub(crate) config: Mutex<ServerConfig>,
    pub(crate) workspace_root: Mutex<Option<PathBuf>>,
    /// Flag of the workspace search in flight; a newer search cancels it.
    pub(crate) active_search: Mutex<Option<Arc<AtomicBool>>>,
}

impl TjLanguageServer {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            documents: Arc::new(DashMap::new()),
            config: Mutex::new(ServerConfig::default()),
            workspace_root: Mutex::new(None),
            active_search: Mutex::new(None),
        }
    }

    pub(crate) fn config(&self) -> ServerConfig {
        match self.config.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub(crate) fn workspace_root(&self) -> Option<PathBuf> {
        self.workspace_root.lock().ok().and_then(|root| root.clone())
    }

    pub(crate) fn set_workspace_root(&self, root: Option<PathBuf>) {
        if let Ok(mut guard) = self.workspace_root.lock() {
            *guard = root;
        }
    }

    /// Text snapshot of an open document.
    pub(crate) fn snapshot(&self, uri: &Url) -> Option<(String, Rope)> {
        let doc = self.documents.get(uri)?;
        Some((doc.content.to_string(), doc.content.clone()))
    }

    /// Start tracking a new workspace search, cancelling the previous one.
    pub(crate) fn begin_search(&self) -> Arc<AtomicBool> {
        let flag = Arc::new(AtomicBool::new(false));
        if let Ok(mut active) = self.active_search.lock() {
            if let Some(previous) = active.replace(flag.clone()) {
                previous.store(true, Ordering::Relaxed);
            }
        }
        flag
    }
}
