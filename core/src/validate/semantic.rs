use std::collections::{HashMap, HashSet};

use crate::diagnostic::{Diagnostic, DiagnosticCode};
use crate::options::AnalysisOptions;
use crate::references::{Reference, ReferenceContext};
use crate::symbols::{SymbolKind, SymbolTable};
use crate::text::Range;

/// Report every reference whose target is not defined.
///
/// `shifts` targets are shift definitions, which the symbol table does not
/// model, so they are never reported.
pub fn validate_references(symbols: &SymbolTable, references: &[Reference], options: &AnalysisOptions) -> Vec<Diagnostic> {
    references
        .iter()
        .filter(|r| r.context != ReferenceContext::Shifts)
        .filter(|r| r.kind != SymbolKind::Account || options.check_account_references)
        .filter(|r| !symbols.contains(r.kind, &r.target_id))
        .map(|r| {
            Diagnostic::error(
                r.source_range,
                DiagnosticCode::UndefinedReference,
                format!("Undefined {} '{}' referenced in {}", r.kind, r.target_id, r.context),
            )
        })
        .collect()
}

/// Task dependency graph built from `depends` edges only (depender to
/// dependee). Keys and edges keep first-seen document order. Ancestor
/// segments of dotted paths add no edge.
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    order: Vec<String>,
    edges: HashMap<String, Vec<(String, Range)>>,
}

impl DependencyGraph {
    pub fn from_references(references: &[Reference]) -> Self {
        let mut graph = Self::default();
        let depends = references
            .iter()
            .filter(|r| r.context == ReferenceContext::Depends && r.leaf);
        for r in depends {
            if let Some(owner) = &r.owner_task {
                graph.add_edge(owner, &r.target_id, r.source_range);
            }
        }
        graph
    }

    pub fn add_edge(&mut self, from: &str, to: &str, range: Range) {
        if !self.edges.contains_key(from) {
            self.order.push(from.to_string());
        }
        let edges = self.edges.entry(from.to_string()).or_default();
        if !edges.iter().any(|(t, _)| t == to) {
            edges.push((to.to_string(), range));
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn dependencies(&self, task: &str) -> impl Iterator<Item = &str> {
        self.edges.get(task).into_iter().flatten().map(|(t, _)| t.as_str())
    }

    /// Range of the first `from -> to` edge's reference.
    pub fn edge_range(&self, from: &str, to: &str) -> Option<Range> {
        self.edges.get(from)?.iter().find(|(t, _)| t == to).map(|(_, r)| *r)
    }

    /// First cycle found by depth-first search over the keys in order. The
    /// returned path starts and ends with the same task (`[a, b, a]`).
    pub fn first_cycle(&self) -> Option<Vec<String>> {
        let mut visited: HashSet<&str> = HashSet::new();

        for root in self.nodes() {
            if visited.contains(root) {
                continue;
            }
            // explicit stack of (node, next edge index) so deep chains cannot overflow
            let mut path: Vec<&str> = vec![root];
            let mut cursor: Vec<usize> = vec![0];
            let mut on_path: HashSet<&str> = HashSet::from([root]);
            visited.insert(root);

            while let Some(&node) = path.last() {
                let idx = cursor.len() - 1;
                let next = self.edges.get(node).and_then(|e| e.get(cursor[idx]));
                let Some((next, _)) = next else {
                    on_path.remove(node);
                    path.pop();
                    cursor.pop();
                    continue;
                };
                cursor[idx] += 1;
                let next = next.as_str();

                if on_path.contains(next) {
                    let start = path.iter().position(|n| *n == next).unwrap_or(0);
                    let mut cycle: Vec<String> = path[start..].iter().map(|s| s.to_string()).collect();
                    cycle.push(next.to_string());
                    return Some(cycle);
                }
                if visited.insert(next) {
                    path.push(next);
                    cursor.push(0);
                    on_path.insert(next);
                }
            }
        }
        None
    }
}

/// Report the first dependency cycle, if any.
pub fn validate_circular_dependencies(symbols: &SymbolTable, references: &[Reference]) -> Vec<Diagnostic> {
    let graph = DependencyGraph::from_references(references);
    let Some(cycle) = graph.first_cycle() else {
        return Vec::new();
    };

    let head = &cycle[0];
    let range = symbols
        .find(SymbolKind::Task, head)
        .map(|s| s.id_range)
        .or_else(|| cycle.get(1).and_then(|next| graph.edge_range(head, next)))
        .unwrap_or_default();

    tracing::debug!(cycle = ?cycle, "dependency cycle");
    vec![Diagnostic::error(
        range,
        DiagnosticCode::CircularDependency,
        format!("Circular dependency detected: {}", cycle.join(" → ")),
    )]
}
