//! Chunk planning.
//!
//! Entry chunks hold everything statically reachable from their entry.
//! Every dynamic import target starts an async chunk holding what its parent
//! does not already provide. Cache groups then move matching modules out of
//! the chunks their load mode admits into shared chunks.
//!
//! Chunk ids are assigned in creation order: entries, async chunks, then
//! shared chunks. Async chunks emptied by cache groups are dropped and the
//! remaining ids renumbered in the same order.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use weft_config::SplitChunksSpec;

use crate::graph::ModuleGraph;

/// Separator between group and parent names in generated shared chunk names.
pub const NAME_DELIMITER: char = '~';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkKind {
    Entry,
    Async,
    Shared,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    pub id: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub kind: ChunkKind,
    /// Loaded synchronously with an entry
    pub initial: bool,
    pub modules: Vec<PathBuf>,
    /// Chunks that load this one (async) or that it was split from (shared)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<usize>,
    /// Cache group a shared chunk was created by
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_group: Option<String>,
}

impl Chunk {
    pub fn contains(&self, module: &Path) -> bool {
        self.modules.iter().any(|m| m == module)
    }

    /// Name used for `[name]`: the chunk name, or its id.
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.id.to_string())
    }
}

pub struct ChunkPlanner<'a> {
    split_chunks: &'a SplitChunksSpec,
    root: &'a Path,
}

impl<'a> ChunkPlanner<'a> {
    /// `root` is joined with module paths before cache group patterns are
    /// matched.
    pub fn new(split_chunks: &'a SplitChunksSpec, root: &'a Path) -> Self {
        Self { split_chunks, root }
    }

    pub fn plan(&self, graph: &ModuleGraph) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut pending: VecDeque<(PathBuf, usize)> = VecDeque::new();

        for (name, entry) in graph.entries() {
            let (modules, dynamic) = graph.static_closure(entry);
            let id = chunks.len();
            chunks.push(Chunk {
                id,
                name: Some(name.to_string()),
                kind: ChunkKind::Entry,
                initial: true,
                modules,
                parents: Vec::new(),
                cache_group: None,
            });
            pending.extend(dynamic.into_iter().map(|target| (target, id)));
        }

        let mut async_roots: IndexMap<PathBuf, usize> = IndexMap::new();
        while let Some((target, parent)) = pending.pop_front() {
            if let Some(&existing) = async_roots.get(&target) {
                let chunk: &mut Chunk = &mut chunks[existing];
                if !chunk.parents.contains(&parent) {
                    chunk.parents.push(parent);
                }
                continue;
            }

            let (reached, dynamic) = graph.static_closure(&target);
            let available: FxHashSet<&PathBuf> = chunks[parent].modules.iter().collect();
            let modules: Vec<PathBuf> = reached
                .into_iter()
                .filter(|m| !available.contains(m))
                .collect();
            if modules.is_empty() {
                continue;
            }

            let id = chunks.len();
            async_roots.insert(target, id);
            chunks.push(Chunk {
                id,
                name: None,
                kind: ChunkKind::Async,
                initial: false,
                modules,
                parents: vec![parent],
                cache_group: None,
            });
            pending.extend(dynamic.into_iter().map(|target| (target, id)));
        }

        if !self.split_chunks.cache_groups.is_empty() {
            self.split_shared(graph, &mut chunks);
        }

        tracing::debug!(chunks = chunks.len(), "chunks planned");
        chunks
    }

    fn split_shared(&self, graph: &ModuleGraph, chunks: &mut Vec<Chunk>) {
        // Shared chunk name -> (group, modules, source chunk ids)
        let mut shared: IndexMap<String, (String, Vec<PathBuf>, Vec<usize>)> = IndexMap::new();
        let mut moves: Vec<(PathBuf, Vec<usize>)> = Vec::new();

        for module in graph.modules() {
            let containing: Vec<&Chunk> = chunks.iter().filter(|c| c.contains(&module.path)).collect();
            if containing.is_empty() {
                continue;
            }
            let resource = self.root.join(&module.path);
            let resource = resource.to_string_lossy();

            let selected = self.split_chunks.select(&resource, |group| {
                containing
                    .iter()
                    .filter(|c| group.chunks.admits(c.initial))
                    .count()
                    >= group.min_chunks
            });
            let Some((group_name, group)) = selected else {
                continue;
            };

            let sources: Vec<usize> = containing
                .iter()
                .filter(|c| group.chunks.admits(c.initial))
                .map(|c| c.id)
                .collect();
            let chunk_name = group.name.clone().unwrap_or_else(|| {
                let mut name = group_name.to_string();
                for source in &sources {
                    name.push(NAME_DELIMITER);
                    name.push_str(&chunks[*source].display_name());
                }
                name
            });

            tracing::debug!(module = %module.path.display(), group = group_name, chunk = %chunk_name, "moved to shared chunk");
            let entry = shared
                .entry(chunk_name)
                .or_insert_with(|| (group_name.to_string(), Vec::new(), Vec::new()));
            entry.1.push(module.path.clone());
            for source in &sources {
                if !entry.2.contains(source) {
                    entry.2.push(*source);
                }
            }
            moves.push((module.path.clone(), sources));
        }

        for (module, sources) in moves {
            for source in sources {
                chunks[source].modules.retain(|m| *m != module);
            }
        }

        for (name, (group, modules, parents)) in shared {
            let initial = parents.iter().any(|p| chunks[*p].initial);
            let id = chunks.len();
            chunks.push(Chunk {
                id,
                name: Some(name),
                kind: ChunkKind::Shared,
                initial,
                modules,
                parents,
                cache_group: Some(group),
            });
        }

        drop_emptied(chunks);
    }
}

fn is_emptied(chunk: &Chunk) -> bool {
    chunk.kind != ChunkKind::Entry && chunk.modules.is_empty()
}

/// Remove non-entry chunks left without modules and renumber the rest.
///
/// References to a removed chunk are redirected to the chunks that loaded it.
fn drop_emptied(chunks: &mut Vec<Chunk>) {
    if !chunks.iter().any(is_emptied) {
        return;
    }

    let mut next = 0;
    let new_ids: Vec<Option<usize>> = chunks
        .iter()
        .map(|chunk| {
            (!is_emptied(chunk)).then(|| {
                next += 1;
                next - 1
            })
        })
        .collect();
    let parents: Vec<Vec<usize>> = chunks.iter().map(|c| c.parents.clone()).collect();

    chunks.retain(|chunk| !is_emptied(chunk));
    for (id, chunk) in chunks.iter_mut().enumerate() {
        if chunk.id != id {
            tracing::debug!(from = chunk.id, to = id, "renumbered chunk");
        }
        let mut remapped = Vec::new();
        for parent in &chunk.parents {
            resolve(*parent, &new_ids, &parents, &mut Vec::new(), &mut remapped);
        }
        chunk.id = id;
        chunk.parents = remapped;
    }
}

/// Push the new ids standing in for `old`: itself when kept, otherwise the
/// ids standing in for its parents.
fn resolve(
    old: usize,
    new_ids: &[Option<usize>],
    parents: &[Vec<usize>],
    visiting: &mut Vec<usize>,
    out: &mut Vec<usize>,
) {
    match new_ids.get(old) {
        Some(Some(new)) => {
            if !out.contains(new) {
                out.push(*new);
            }
        }
        Some(None) if !visiting.contains(&old) => {
            visiting.push(old);
            for parent in &parents[old] {
                resolve(*parent, new_ids, parents, visiting, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::source::MemorySourceGraph;
    use weft_config::{CacheGroup, ChunksMode, EntryMap, Pattern, WeftConfig};

    fn project() -> MemorySourceGraph {
        MemorySourceGraph::new("/p")
            .with_file("src/main.js", "import 'lodash';\nimport('./admin');\nimport('./help');")
            .with_file("src/admin.js", "import 'chart';\nimport './shared';")
            .with_file("src/help.js", "import 'chart';\nimport './shared';")
            .with_file("src/shared.js", "")
            .with_file("node_modules/lodash/index.js", "")
            .with_file("node_modules/chart/index.js", "")
    }

    fn plan(groups: &[(&str, Option<&str>, ChunksMode, i32, usize)]) -> Vec<Chunk> {
        let mut config = WeftConfig {
            entry: EntryMap::new().with("main", "src/main.js"),
            ..WeftConfig::default()
        };
        for (name, test, chunks, priority, min_chunks) in groups {
            let test = test.map(|t| Pattern::new(t).unwrap());
            let mut group = CacheGroup::new(test, *chunks, *priority);
            group.min_chunks = *min_chunks;
            config
                .optimization
                .split_chunks
                .cache_groups
                .insert(name.to_string(), group);
        }
        let source = project();
        let graph = ModuleGraph::build(&config, &source, &mut Diagnostics::new()).unwrap();
        ChunkPlanner::new(&config.optimization.split_chunks, Path::new("/p")).plan(&graph)
    }

    fn modules(chunk: &Chunk) -> Vec<&str> {
        chunk.modules.iter().map(|m| m.to_str().unwrap()).collect()
    }

    #[test]
    fn dynamic_imports_create_async_chunks() {
        let chunks = plan(&[]);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].kind, ChunkKind::Entry);
        assert_eq!(modules(&chunks[0]), vec!["src/main.js", "node_modules/lodash/index.js"]);
        assert_eq!(chunks[1].kind, ChunkKind::Async);
        assert_eq!(chunks[1].parents, vec![0]);
        assert_eq!(
            modules(&chunks[1]),
            vec!["src/admin.js", "node_modules/chart/index.js", "src/shared.js"]
        );
        assert_eq!(chunks[2].display_name(), "2");
    }

    #[test]
    fn async_vendor_group_leaves_entry_alone() {
        let chunks = plan(&[("vendors", Some(r"[\\/]node_modules[\\/]"), ChunksMode::Async, 1, 1)]);
        assert_eq!(chunks.len(), 4);

        // lodash only lives in the initial chunk, which async groups skip
        assert!(chunks[0].contains(Path::new("node_modules/lodash/index.js")));

        let vendors = &chunks[3];
        assert_eq!(vendors.name.as_deref(), Some("vendors~1~2"));
        assert_eq!(modules(vendors), vec!["node_modules/chart/index.js"]);
        assert_eq!(vendors.parents, vec![1, 2]);
        assert!(!vendors.initial);
        assert!(!chunks[1].contains(Path::new("node_modules/chart/index.js")));
    }

    #[test]
    fn all_mode_collects_from_initial_chunks() {
        let chunks = plan(&[("vendors", Some("node_modules"), ChunksMode::All, 0, 1)]);
        let names: Vec<_> = chunks.iter().filter_map(|c| c.name.as_deref()).collect();
        assert_eq!(names, vec!["main", "vendors~main", "vendors~1~2"]);
        assert!(chunks[3].initial);
    }

    #[test]
    fn higher_priority_group_wins() {
        let chunks = plan(&[
            ("common", None, ChunksMode::Async, 0, 2),
            ("vendors", Some("node_modules"), ChunksMode::Async, 10, 1),
        ]);
        let shared: Vec<_> = chunks
            .iter()
            .filter(|c| c.kind == ChunkKind::Shared)
            .map(|c| (c.cache_group.as_deref().unwrap(), modules(c)))
            .collect();
        assert_eq!(
            shared,
            vec![
                ("vendors", vec!["node_modules/chart/index.js"]),
                ("common", vec!["src/shared.js"]),
            ]
        );
    }

    #[test]
    fn equal_priority_goes_to_first_declared_group() {
        let chunks = plan(&[
            ("first", Some("chart"), ChunksMode::Async, 5, 1),
            ("second", Some("node_modules"), ChunksMode::Async, 5, 1),
        ]);
        let groups: Vec<_> = chunks.iter().filter_map(|c| c.cache_group.as_deref()).collect();
        assert_eq!(groups, vec!["first"]);
    }

    #[test]
    fn min_chunks_filters_unshared_modules() {
        let shared: Vec<_> = plan(&[("common", None, ChunksMode::Async, 0, 2)])
            .into_iter()
            .filter(|c| c.kind == ChunkKind::Shared)
            .collect();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].name.as_deref(), Some("common~1~2"));
        assert_eq!(
            modules(&shared[0]),
            vec!["node_modules/chart/index.js", "src/shared.js"]
        );
    }

    #[test]
    fn async_chunk_emptied_by_group_is_dropped() {
        let mut config = WeftConfig {
            entry: EntryMap::new().with("main", "src/main.js"),
            ..WeftConfig::default()
        };
        config.optimization.split_chunks.cache_groups.insert(
            "vendors".to_string(),
            CacheGroup::new(Some(Pattern::new("node_modules").unwrap()), ChunksMode::Async, 1),
        );
        let source = MemorySourceGraph::new("/p")
            .with_file("src/main.js", "import('lodash');\nimport('./admin');")
            .with_file("src/admin.js", "")
            .with_file("node_modules/lodash/index.js", "");
        let graph = ModuleGraph::build(&config, &source, &mut Diagnostics::new()).unwrap();
        let chunks = ChunkPlanner::new(&config.optimization.split_chunks, Path::new("/p")).plan(&graph);

        let ids: Vec<_> = chunks.iter().map(|c| (c.id, c.kind)).collect();
        assert_eq!(
            ids,
            vec![(0, ChunkKind::Entry), (1, ChunkKind::Async), (2, ChunkKind::Shared)]
        );
        assert_eq!(modules(&chunks[1]), vec!["src/admin.js"]);

        let vendors = &chunks[2];
        assert_eq!(vendors.name.as_deref(), Some("vendors~1"));
        assert_eq!(modules(vendors), vec!["node_modules/lodash/index.js"]);
        assert_eq!(vendors.parents, vec![0]);
    }

    #[test]
    fn generated_names_list_source_chunks() {
        let names: Vec<_> = plan(&[("common", None, ChunksMode::Async, 0, 1)])
            .into_iter()
            .filter(|c| c.kind == ChunkKind::Shared)
            .filter_map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["common~1", "common~2", "common~1~2"]);
    }
}
