use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::build::helpers::default_min_chunks;
use crate::pattern::Pattern;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationSpec {
    #[serde(default)]
    pub split_chunks: SplitChunksSpec,
}

/// Shared-dependency extraction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitChunksSpec {
    /// Named groups in declaration order; order breaks priority ties
    #[serde(default)]
    pub cache_groups: IndexMap<String, CacheGroup>,
}

impl SplitChunksSpec {
    /// The group a module with `resource` should move to, if any.
    ///
    /// `accepts` tells whether a group's load mode admits at least one of the
    /// chunks that contain the module. Highest priority wins; on equal priority
    /// the first declared group wins.
    pub fn select<'a>(
        &'a self,
        resource: &str,
        mut accepts: impl FnMut(&CacheGroup) -> bool,
    ) -> Option<(&'a str, &'a CacheGroup)> {
        let mut best: Option<(&str, &CacheGroup)> = None;
        for (name, group) in &self.cache_groups {
            if !group.matches(resource) || !accepts(group) {
                continue;
            }
            match best {
                Some((_, current)) if current.priority >= group.priority => {}
                _ => best = Some((name.as_str(), group)),
            }
        }
        best
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheGroup {
    /// Resource paths this group collects; matches everything when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<Pattern>,

    /// Which chunks the group may pull modules out of
    #[serde(default)]
    pub chunks: ChunksMode,

    /// Higher priority wins when a module matches several groups
    #[serde(default)]
    pub priority: i32,

    /// Minimum number of chunks that must share a module
    #[serde(default = "default_min_chunks")]
    pub min_chunks: usize,

    /// Fixed chunk name; derived from the group and parent chunks when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl CacheGroup {
    pub fn new(test: Option<Pattern>, chunks: ChunksMode, priority: i32) -> Self {
        Self {
            test,
            chunks,
            priority,
            min_chunks: default_min_chunks(),
            name: None,
        }
    }

    pub fn matches(&self, resource: &str) -> bool {
        self.test.as_ref().is_none_or(|p| p.is_match(resource))
    }
}

/// Loading mode of the chunks a cache group may split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunksMode {
    /// Only chunks loaded synchronously with an entry
    Initial,
    /// Only chunks loaded on demand
    #[default]
    Async,
    /// Both
    All,
}

impl ChunksMode {
    pub fn admits(self, is_initial: bool) -> bool {
        match self {
            ChunksMode::Initial => is_initial,
            ChunksMode::Async => !is_initial,
            ChunksMode::All => true,
        }
    }
}
