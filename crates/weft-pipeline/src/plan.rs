//! The build plan: what the external engine must do and emit.

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::chunks::Chunk;
use crate::diagnostics::{Diagnostics, Severity};
use crate::emit::{Artifact, ArtifactKind};
use crate::graph::{Dependency, ModuleKind};
use crate::plugins::PluginPhase;
use crate::rules::{RuleMatch, StyleDelivery};

/// How a module ends up in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delivery {
    /// Part of the script bundle of every chunk that holds it
    Bundled,
    /// Bundled, and injected into the DOM as a `<style>` at runtime
    Injected,
    /// Moved into an extracted stylesheet
    Extracted,
    /// Stylesheet partial compiled into the stylesheet importing it
    Compiled,
    /// Written as a separate file; the bundle only holds its URL
    Emitted,
    /// Embedded in the bundle as a data URL or string
    Inlined,
    /// No rule handles this module; fails the build
    Unhandled,
}

impl Delivery {
    /// Whether the module's bytes count towards its chunks' script bundles.
    pub fn in_script(self) -> bool {
        matches!(self, Delivery::Bundled | Delivery::Injected | Delivery::Inlined)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedModule {
    pub path: PathBuf,
    pub kind: ModuleKind,
    pub size: u64,
    /// Rule and processor chain applied to the module
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<RuleMatch>,
    /// Style delivery requested by the chain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleDelivery>,
    pub delivery: Delivery,
    /// Ids of the chunks holding the module
    pub chunks: Vec<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,
}

/// Dev proxy the engine starts next to the watcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevServer {
    /// Address the proxy listens on
    pub listen: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    pub open: bool,
    /// Files whose change reloads connected browsers
    pub watch: Vec<String>,
}

/// Aggregated, ordered diagnostics as the error reporter prints them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub clear_console: bool,
    pub errors: usize,
    pub warnings: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub success_messages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedPlugin {
    pub plugin: String,
    pub phase: PluginPhase,
}

/// Everything the engine must do for one build, deterministic for a given
/// configuration and source tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildPlan {
    /// Directory artifacts are written to
    pub output_dir: PathBuf,
    pub public_path: String,
    pub entries: IndexMap<String, PathBuf>,
    pub modules: Vec<PlannedModule>,
    pub chunks: Vec<Chunk>,
    pub artifacts: Vec<Artifact>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub externals: Vec<String>,
    /// Post-processing steps in the order they ran
    pub plugins: Vec<AppliedPlugin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_server: Option<DevServer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<ErrorReport>,
    pub diagnostics: Diagnostics,
}

impl BuildPlan {
    pub fn module(&self, path: &Path) -> Option<&PlannedModule> {
        self.modules.iter().find(|m| m.path == path)
    }

    pub fn module_mut(&mut self, path: &Path) -> Option<&mut PlannedModule> {
        self.modules.iter_mut().find(|m| m.path == path)
    }

    pub fn artifact(&self, path: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.path == path)
    }

    pub fn artifacts_of(&self, kind: ArtifactKind) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter().filter(move |a| a.kind == kind)
    }

    /// Script artifact of a chunk.
    pub fn script_of_mut(&mut self, chunk: usize) -> Option<&mut Artifact> {
        self.artifacts
            .iter_mut()
            .find(|a| a.kind == ArtifactKind::Script && a.chunk == Some(chunk))
    }

    /// Paths of every artifact, in emission order.
    pub fn artifact_paths(&self) -> Vec<&str> {
        self.artifacts.iter().map(|a| a.path.as_str()).collect()
    }

    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            entries: self.entries.len(),
            modules: self.modules.len(),
            chunks: self.chunks.len(),
            scripts: self.artifacts_of(ArtifactKind::Script).count(),
            stylesheets: self.artifacts_of(ArtifactKind::Stylesheet).count(),
            assets: self.artifacts_of(ArtifactKind::Asset).count(),
            source_maps: self.artifacts_of(ArtifactKind::SourceMap).count(),
            total_size: self
                .artifacts
                .iter()
                .filter(|a| a.kind != ArtifactKind::SourceMap)
                .map(|a| a.size)
                .sum(),
            errors: self.diagnostics.count(Severity::Error),
            warnings: self.diagnostics.count(Severity::Warning),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Counts shown after planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub entries: usize,
    pub modules: usize,
    pub chunks: usize,
    pub scripts: usize,
    pub stylesheets: usize,
    pub assets: usize,
    pub source_maps: usize,
    pub total_size: u64,
    pub errors: usize,
    pub warnings: usize,
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} modules in {} chunks -> {} scripts, {} stylesheets, {} assets, {} source maps",
            self.modules, self.chunks, self.scripts, self.stylesheets, self.assets, self.source_maps
        )
    }
}
