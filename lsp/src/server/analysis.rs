use std::sync::Arc;

use tokio::task;
use tokio::time::{Duration, sleep};
use tower_lsp::lsp_types::Url;

use crate::analyzer::{AnalysisResult, LineIndex};

use super::state::TjLanguageServer;
use super::utils::compute_content_hash;

impl TjLanguageServer {
    /// Cached analysis of an open document, computed on demand.
    pub(crate) async fn get_or_compute_analysis(&self, uri: &Url) -> Option<Arc<AnalysisResult>> {
        if let Some(doc) = self.documents.get(uri) {
            if let Some(cached) = doc.cached_analysis.clone() {
                return Some(cached);
            }
        }

        let (content, rope, seq_snapshot) = {
            let doc = self.documents.get(uri)?;
            (doc.content.to_string(), doc.content.clone(), doc.debounce_seq)
        };
        let analyzer = self.config().analyzer();
        let computed = task::spawn_blocking(move || analyzer.analyze_indexed(&content, &LineIndex::from_rope(rope)))
            .await
            .ok()?;
        let computed = Arc::new(computed);

        if let Some(mut doc) = self.documents.get_mut(uri) {
            if doc.debounce_seq == seq_snapshot {
                doc.cached_analysis = Some(computed.clone());
            }
        }
        Some(computed)
    }

    /// Validate after `delay_ms` unless another edit arrives first. Results of a
    /// run that was overtaken by a newer edit are dropped, never published.
    pub(crate) async fn schedule_diagnostics(&self, uri: Url, delay_ms: u64) {
        let Some(scheduled_seq) = self.documents.get(&uri).map(|doc| doc.debounce_seq) else {
            return;
        };
        let documents = self.documents.clone();
        let client = self.client.clone();
        let analyzer = self.config().analyzer();

        tokio::spawn(async move {
            if delay_ms > 0 {
                sleep(Duration::from_millis(delay_ms)).await;
            }

            let (content, rope, version) = match documents.get(&uri) {
                Some(doc) if doc.debounce_seq == scheduled_seq => {
                    (doc.content.to_string(), doc.content.clone(), doc.version)
                }
                _ => return,
            };
            let hash = compute_content_hash(&content);

            let computed = match task::spawn_blocking(move || {
                analyzer.analyze_indexed(&content, &LineIndex::from_rope(rope))
            })
            .await
            {
                Ok(result) => Arc::new(result),
                Err(err) => {
                    tracing::error!(%uri, %err, "diagnostics task failed");
                    return;
                }
            };

            {
                let Some(mut doc) = documents.get_mut(&uri) else {
                    return;
                };
                if doc.debounce_seq != scheduled_seq {
                    tracing::trace!(%uri, "dropping stale diagnostics");
                    return;
                }
                doc.cached_analysis = Some(computed.clone());
                doc.published_hash = Some(hash);
            }

            tracing::debug!(%uri, count = computed.diagnostics.len(), "publishing diagnostics");
            client
                .publish_diagnostics(uri, computed.diagnostics.clone(), Some(version))
                .await;
        });
    }

    /// Re-validate right away, skipping the run when the text matches what the
    /// last published diagnostics were computed from.
    pub(crate) async fn validate_now(&self, uri: Url) {
        let unchanged = self.documents.get(&uri).is_some_and(|doc| {
            doc.published_hash
                .is_some_and(|published| published == compute_content_hash(&doc.content.to_string()))
        });
        if unchanged {
            return;
        }
        self.schedule_diagnostics(uri, 0).await;
    }

    pub(crate) async fn clear_diagnostics(&self, uri: Url) {
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }
}
