use std::collections::VecDeque;
use std::path::Path;

use crate::types::TypeId;

/// One declared conversion edge: reads `from` on stdin, writes `to` on
/// stdout, by running `argv[0]` with `argv[1..]`.
#[derive(Debug, Clone)]
struct Edge {
    to: TypeId,
    argv: Vec<String>,
}

/// A single step of a selected conversion path, snapshotted at selection
/// time (SPEC_FULL §9: "Conversion path as immutable owned sequence").
/// Cloning `argv` here rather than keeping a live reference into the
/// registry is what gives a running job's reported/executed command line
/// immunity from a later `conversion` redeclaration.
#[derive(Debug, Clone)]
pub struct ConversionStep {
    pub argv: Vec<String>,
}

/// Named file types and the directed conversion graph between them.
///
/// Distilled-spec-external in principle (§6's "conversion registry
/// contract"), implemented in-crate here so the whole supervisor is
/// runnable and testable; the method names mirror that contract exactly
/// so a remote/pluggable registry could stand in without touching the
/// dispatcher.
#[derive(Debug, Default)]
pub struct ConversionRegistry {
    names: Vec<String>,
    // adjacency list, indexed by TypeId
    edges: Vec<Vec<Edge>>,
}

impl ConversionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file type, or return its existing id if already known.
    /// Idempotent, per §6.
    pub fn define_type(&mut self, name: &str) -> TypeId {
        if let Some(id) = self.find_type(name) {
            return id;
        }
        let id = TypeId(self.names.len());
        self.names.push(name.to_string());
        self.edges.push(Vec::new());
        id
    }

    pub fn find_type(&self, name: &str) -> Option<TypeId> {
        self.names.iter().position(|n| n == name).map(TypeId)
    }

    pub fn type_name(&self, id: TypeId) -> &str {
        &self.names[id.0]
    }

    /// Infer a file's type from its extension (substring after the last
    /// `.`). An extension that was never `type`-declared is not a file
    /// type the registry knows about.
    pub fn infer_file_type(&self, path: &str) -> Option<TypeId> {
        let ext = Path::new(path).extension()?.to_str()?;
        self.find_type(ext)
    }

    pub fn define_conversion(&mut self, from: TypeId, to: TypeId, argv: Vec<String>) {
        self.edges[from.0].push(Edge { to, argv });
    }

    /// Shortest path from `from` to `to` by edge count, via breadth-first
    /// search. Ties are broken by edge declaration order — a conversion's
    /// adjacency list is a `Vec` appended to in `define_conversion` order,
    /// so the first-declared edge at each BFS layer is the first explored,
    /// matching the authoritative tie-break of the original linear-scan
    /// registry. Returns `Some(vec![])` when `from == to` (§4.2 edge case).
    pub fn find_conversion_path(&self, from: TypeId, to: TypeId) -> Option<Vec<ConversionStep>> {
        if from == to {
            return Some(Vec::new());
        }

        let mut came_from: Vec<Option<(TypeId, usize)>> = vec![None; self.names.len()];
        let mut visited = vec![false; self.names.len()];
        visited[from.0] = true;

        let mut queue = VecDeque::new();
        queue.push_back(from);

        while let Some(current) = queue.pop_front() {
            for (edge_index, edge) in self.edges[current.0].iter().enumerate() {
                if visited[edge.to.0] {
                    continue;
                }
                visited[edge.to.0] = true;
                came_from[edge.to.0] = Some((current, edge_index));

                if edge.to == to {
                    return Some(self.reconstruct_path(from, to, &came_from));
                }
                queue.push_back(edge.to);
            }
        }

        None
    }

    fn reconstruct_path(
        &self,
        from: TypeId,
        to: TypeId,
        came_from: &[Option<(TypeId, usize)>],
    ) -> Vec<ConversionStep> {
        let mut steps = Vec::new();
        let mut current = to;
        while current != from {
            let (prev, edge_index) = came_from[current.0].expect("path reconstruction");
            let edge = &self.edges[prev.0][edge_index];
            steps.push(ConversionStep {
                argv: edge.argv.clone(),
            });
            current = prev;
        }
        steps.reverse();
        steps
    }
}
