use std::collections::HashMap;
use std::path::PathBuf;

use tokio::task;
use tower_lsp::LanguageServer;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tracing::info;

use tjls_core::text::word_at;
use tjls_core::{Cancelled, complete_at, definition, find_references, keywords, plan_rename, prepare_rename, search_workspace};

use crate::analyzer::{LineIndex, hover_markdown, symbol_label, to_completion_item, to_lsp_symbol_kind};

use super::state::{CancelOnDrop, Document, TjLanguageServer};
use super::text::apply_change;

impl TjLanguageServer {
    /// Text of an open document plus the mapping for its positions.
    fn resolve(&self, uri: &Url, pos: Position) -> Option<(String, LineIndex, tjls_core::Position)> {
        let (text, rope) = self.snapshot(uri)?;
        let index = LineIndex::from_rope(rope);
        let core_pos = index.to_core_position(pos);
        Some((text, index, core_pos))
    }

    /// Drop cached results and re-validate every open document.
    async fn revalidate_all(&self) {
        let uris: Vec<Url> = self
            .documents
            .iter_mut()
            .map(|mut entry| {
                entry.cached_analysis = None;
                entry.published_hash = None;
                entry.debounce_seq = entry.debounce_seq.wrapping_add(1);
                entry.key().clone()
            })
            .collect();
        for uri in uris {
            self.schedule_diagnostics(uri, 0).await;
        }
    }
}

fn workspace_root_of(params: &InitializeParams) -> Option<PathBuf> {
    if let Some(folder) = params.workspace_folders.as_ref().and_then(|f| f.first()) {
        return folder.uri.to_file_path().ok();
    }
    #[allow(deprecated)]
    let root_uri = params.root_uri.as_ref();
    root_uri.and_then(|uri| uri.to_file_path().ok())
}

#[tower_lsp::async_trait]
impl LanguageServer for TjLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let root = workspace_root_of(&params);
        info!(?root, "TaskJuggler language server initializing");
        self.set_workspace_root(root);

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(TextDocumentSyncKind::INCREMENTAL),
                    save: Some(TextDocumentSyncSaveOptions::Supported(true)),
                    ..Default::default()
                })),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(false),
                    trigger_characters: Some(vec![" ".to_string(), ",".to_string(), "!".to_string()]),
                    ..Default::default()
                }),
                document_symbol_provider: Some(OneOf::Left(true)),
                workspace_symbol_provider: Some(OneOf::Left(true)),
                definition_provider: Some(OneOf::Left(true)),
                references_provider: Some(OneOf::Left(true)),
                rename_provider: Some(OneOf::Right(RenameOptions {
                    prepare_provider: Some(true),
                    work_done_progress_options: Default::default(),
                })),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "TaskJuggler Language Server".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        info!("TaskJuggler language server initialized");
        self.load_config().await;
    }

    async fn shutdown(&self) -> Result<()> {
        info!("TaskJuggler language server shutting down");
        Ok(())
    }

    async fn did_change_configuration(&self, _params: DidChangeConfigurationParams) {
        self.load_config().await;
        self.revalidate_all().await;
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        self.documents
            .insert(doc.uri.clone(), Document::new(&doc.text, doc.version));
        self.schedule_diagnostics(doc.uri, 0).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        {
            let mut entry = self.documents.entry(uri.clone()).or_default();
            entry.version = params.text_document.version;
            for change in &params.content_changes {
                apply_change(&mut entry.content, change);
            }
            entry.cached_analysis = None;
            entry.debounce_seq = entry.debounce_seq.wrapping_add(1);
        }
        let delay = self.config().debounce_ms;
        self.schedule_diagnostics(uri, delay).await;
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        self.validate_now(params.text_document.uri).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.remove(&uri);
        self.clear_diagnostics(uri).await;
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let Some((text, index, pos)) = self.resolve(uri, params.text_document_position_params.position) else {
            return Ok(None);
        };
        let Some((word, range)) = word_at(&text, pos) else {
            return Ok(None);
        };
        Ok(keywords::keyword(&word).map(|info| Hover {
            contents: HoverContents::Markup(MarkupContent {
                kind: MarkupKind::Markdown,
                value: hover_markdown(info),
            }),
            range: Some(index.to_lsp_range(range)),
        }))
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let Some((text, _, pos)) = self.resolve(uri, params.text_document_position.position) else {
            return Ok(None);
        };
        let items: Vec<CompletionItem> = task::spawn_blocking(move || complete_at(&text, pos))
            .await
            .unwrap_or_default()
            .into_iter()
            .map(to_completion_item)
            .collect();
        Ok(Some(CompletionResponse::Array(items)))
    }

    async fn document_symbol(&self, params: DocumentSymbolParams) -> Result<Option<DocumentSymbolResponse>> {
        let uri = &params.text_document.uri;
        if let Some(analysis) = self.get_or_compute_analysis(uri).await {
            if !analysis.symbols.is_empty() {
                return Ok(Some(DocumentSymbolResponse::Nested(analysis.symbols.clone())));
            }
        }
        Ok(None)
    }

    async fn symbol(&self, params: WorkspaceSymbolParams) -> Result<Option<Vec<SymbolInformation>>> {
        let Some(root) = self.workspace_root() else {
            return Ok(None);
        };
        let options = self.config().workspace;
        let overlay: HashMap<PathBuf, String> = self
            .documents
            .iter()
            .filter_map(|entry| Some((entry.key().to_file_path().ok()?, entry.content.to_string())))
            .collect();

        let flag = self.begin_search();
        let _cancel_on_drop = CancelOnDrop(flag.clone());
        let query = params.query;

        let found = task::spawn_blocking(move || {
            let symbols = search_workspace(&root, &query, &options, &overlay, &flag)?;
            let mut indexes: HashMap<PathBuf, Option<LineIndex>> = HashMap::new();
            let mut out = Vec::with_capacity(symbols.len());
            for found in symbols {
                let index = indexes.entry(found.path.clone()).or_insert_with(|| {
                    overlay
                        .get(&found.path)
                        .cloned()
                        .or_else(|| std::fs::read_to_string(&found.path).ok())
                        .map(|text| LineIndex::new(&text))
                });
                let (Some(index), Ok(uri)) = (index.as_ref(), Url::from_file_path(&found.path)) else {
                    continue;
                };
                let symbol = &found.symbol;
                out.push(SymbolInformation {
                    name: symbol_label(symbol),
                    kind: to_lsp_symbol_kind(symbol.kind()),
                    tags: None,
                    #[allow(deprecated)]
                    deprecated: None,
                    location: Location::new(uri, index.to_lsp_range(symbol.id_range)),
                    container_name: symbol.parent().map(str::to_string),
                });
            }
            Ok::<_, Cancelled>(out)
        })
        .await;

        match found {
            Ok(Ok(symbols)) => Ok(Some(symbols)),
            Ok(Err(Cancelled)) => Ok(None),
            Err(err) => {
                tracing::error!(%err, "workspace symbol search failed");
                Ok(None)
            }
        }
    }

    async fn goto_definition(&self, params: GotoDefinitionParams) -> Result<Option<GotoDefinitionResponse>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let Some((text, index, pos)) = self.resolve(uri, params.text_document_position_params.position) else {
            return Ok(None);
        };
        Ok(definition(&text, pos).map(|symbol| {
            GotoDefinitionResponse::Scalar(Location::new(uri.clone(), index.to_lsp_range(symbol.id_range)))
        }))
    }

    async fn references(&self, params: ReferenceParams) -> Result<Option<Vec<Location>>> {
        let uri = &params.text_document_position.text_document.uri;
        let Some((text, index, pos)) = self.resolve(uri, params.text_document_position.position) else {
            return Ok(None);
        };
        let locations: Vec<Location> = find_references(&text, pos, params.context.include_declaration)
            .into_iter()
            .map(|range| Location::new(uri.clone(), index.to_lsp_range(range)))
            .collect();
        Ok((!locations.is_empty()).then_some(locations))
    }

    async fn prepare_rename(&self, params: TextDocumentPositionParams) -> Result<Option<PrepareRenameResponse>> {
        let Some((text, index, pos)) = self.resolve(&params.text_document.uri, params.position) else {
            return Ok(None);
        };
        Ok(
            prepare_rename(&text, pos).map(|(range, placeholder)| PrepareRenameResponse::RangeWithPlaceholder {
                range: index.to_lsp_range(range),
                placeholder,
            }),
        )
    }

    async fn rename(&self, params: RenameParams) -> Result<Option<WorkspaceEdit>> {
        let uri = &params.text_document_position.text_document.uri;
        let Some((text, index, pos)) = self.resolve(uri, params.text_document_position.position) else {
            return Ok(None);
        };

        let edits = match plan_rename(&text, pos, &params.new_name) {
            Ok(edits) => edits,
            Err(err) => {
                info!(%err, new_name = %params.new_name, "rename rejected");
                self.client.show_message(MessageType::WARNING, err.to_string()).await;
                return Ok(None);
            }
        };
        let edits: Vec<TextEdit> = edits
            .into_iter()
            .map(|edit| TextEdit::new(index.to_lsp_range(edit.range), edit.new_text))
            .collect();

        let mut changes = HashMap::new();
        changes.insert(uri.clone(), edits);
        Ok(Some(WorkspaceEdit {
            changes: Some(changes),
            ..Default::default()
        }))
    }
}
