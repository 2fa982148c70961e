//! # weft-pipeline
//!
//! Build planning on top of `weft-config`.
//!
//! Given a validated configuration and a source tree, the planner walks the
//! module graph from the entries, matches every module against the
//! configured rules, assigns modules to chunks, names the artifacts and runs
//! the configured plugins over the result. The output is a [`BuildPlan`]:
//! a deterministic description of what the external engine must emit.
//!
//! ## Quick Start
//!
//! ```
//! use weft_pipeline::{plan, MemorySourceGraph};
//! use weft_config::{EntryMap, WeftConfig};
//!
//! let config = WeftConfig {
//!     entry: EntryMap::new().with("main", "src/index.js"),
//!     ..WeftConfig::default()
//! };
//! let source = MemorySourceGraph::new("/project")
//!     .with_file("src/index.js", "import './util';")
//!     .with_file("src/util.js", "export const x = 1;");
//!
//! let plan = plan(&config, &source).unwrap();
//! assert_eq!(plan.artifact_paths(), vec!["main.js"]);
//! assert_eq!(plan.modules.len(), 2);
//! ```

pub mod chunks;
pub mod diagnostics;
pub mod emit;
pub mod error;
pub mod graph;
pub mod plan;
pub mod plugins;
pub mod rules;
pub mod scan;
pub mod source;

pub use chunks::{Chunk, ChunkKind, ChunkPlanner};
pub use diagnostics::{Diagnostic, DiagnosticCode, Diagnostics, Severity};
pub use emit::{Artifact, ArtifactKind, Emitter, SourceMapRef, check_collisions};
pub use error::{PipelineError, Result};
pub use graph::{Dependency, Module, ModuleGraph, ModuleKind, Resolution};
pub use plan::{
    AppliedPlugin, BuildPlan, Delivery, DevServer, ErrorReport, PlanSummary, PlannedModule,
};
pub use plugins::{PlanPlugin, PluginPhase, PluginPipeline};
pub use rules::{RuleMatch, RuleMatcher, StyleDelivery};
pub use scan::{ImportKind, ImportRef};
pub use source::{FsSourceGraph, MemorySourceGraph, SourceGraph};

use std::path::Path;

use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value;
use weft_config::{
    ConfigValidator, PluginRegistry, ProcessorKind, ProcessorRegistry, SchemaValidator,
    WeftConfig,
};

/// Plan a build with the built-in registries.
pub fn plan(config: &WeftConfig, source: &dyn SourceGraph) -> Result<BuildPlan> {
    Planner::default().plan(config, source)
}

/// Build planner holding the registries identities are resolved against.
#[derive(Debug, Clone, Default)]
pub struct Planner {
    processors: ProcessorRegistry,
    plugins: PluginRegistry,
}

impl Planner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registries(processors: ProcessorRegistry, plugins: PluginRegistry) -> Self {
        Self { processors, plugins }
    }

    /// Plan a build of `config` over `source`.
    ///
    /// Fails on an invalid configuration, a missing entry, colliding output
    /// paths or any error diagnostic, such as an unresolved import or a
    /// non-script module no rule handles. No partial plan is returned.
    pub fn plan(&self, config: &WeftConfig, source: &dyn SourceGraph) -> Result<BuildPlan> {
        SchemaValidator::with_registries(self.processors.clone(), self.plugins.clone())
            .validate(config)?;

        let mut diagnostics = Diagnostics::new();
        let graph = ModuleGraph::build(config, source, &mut diagnostics)?;

        let matcher = RuleMatcher::new(&config.module.rules, source.root(), config.context.as_deref());
        let partials = style_partials(&graph);
        let mut modules: Vec<PlannedModule> = graph
            .modules()
            .map(|module| {
                let partial = partials.contains(module.path.as_path());
                self.plan_module(module, partial, &matcher, &mut diagnostics)
            })
            .collect();

        let chunks = ChunkPlanner::new(&config.optimization.split_chunks, source.root()).plan(&graph);
        let positions: FxHashMap<&Path, usize> = modules
            .iter()
            .enumerate()
            .map(|(i, m)| (m.path.as_path(), i))
            .collect();
        let mut membership = vec![Vec::new(); modules.len()];
        for chunk in &chunks {
            for path in &chunk.modules {
                if let Some(&i) = positions.get(path.as_path()) {
                    membership[i].push(chunk.id);
                }
            }
        }
        for (module, ids) in modules.iter_mut().zip(membership) {
            module.chunks = ids;
        }

        let emitter = Emitter::new(&config.output, &config.devtool);
        let mut artifacts = emitter.emit_chunks(&chunks, &modules);
        for module in modules.iter().filter(|m| m.delivery == Delivery::Emitted) {
            let name = module
                .transform
                .as_ref()
                .and_then(|matched| self.asset_option(&matcher, matched, "name"))
                .and_then(Value::as_str);
            artifacts.push(emitter.emit_asset(module, name));
        }
        emitter.emit_devtool_maps(&mut artifacts);

        let mut plan = BuildPlan {
            output_dir: config.output.path.clone(),
            public_path: config.output.public_path.clone(),
            entries: graph
                .entries()
                .map(|(name, path)| (name.to_string(), path.to_path_buf()))
                .collect(),
            modules,
            chunks,
            artifacts,
            externals: graph.externals().to_vec(),
            diagnostics,
            ..BuildPlan::default()
        };

        PluginPipeline::from_config(config, &self.plugins)?.run(&mut plan)?;
        check_collisions(&plan.artifacts)?;

        if plan.diagnostics.has_errors() {
            return Err(PipelineError::BuildFailed {
                errors: plan.diagnostics.errors().cloned().collect(),
            });
        }

        let summary = plan.summary();
        tracing::info!(
            modules = summary.modules,
            chunks = summary.chunks,
            artifacts = plan.artifacts.len(),
            warnings = summary.warnings,
            "build planned"
        );
        Ok(plan)
    }

    fn plan_module(
        &self,
        module: &Module,
        partial: bool,
        matcher: &RuleMatcher<'_>,
        diagnostics: &mut Diagnostics,
    ) -> PlannedModule {
        let transform = matcher.match_module(&module.path);
        let style = transform
            .as_ref()
            .and_then(|matched| rules::style_delivery(&matched.chain, &self.processors));

        let delivery = match (&transform, style) {
            (None, _) if module.kind.is_native() => Delivery::Bundled,
            (None, _) if partial => Delivery::Compiled,
            (None, _) => {
                diagnostics.push(
                    Diagnostic::error(
                        DiagnosticCode::NoMatchingRule,
                        format!("no rule handles {:?} module, add a loader for it", module.kind)
                            .to_lowercase(),
                    )
                    .at(&module.path),
                );
                Delivery::Unhandled
            }
            (Some(_), Some(StyleDelivery::Inject)) => Delivery::Injected,
            // Moved into a stylesheet by the extraction plugin
            (Some(_), Some(StyleDelivery::Extract)) => Delivery::Bundled,
            (Some(matched), None) => self.asset_delivery(module, matcher, matched),
        };

        PlannedModule {
            path: module.path.clone(),
            kind: module.kind,
            size: module.size,
            transform,
            style,
            delivery,
            chunks: Vec::new(),
            dependencies: module.dependencies.clone(),
        }
    }

    fn asset_delivery(&self, module: &Module, matcher: &RuleMatcher<'_>, matched: &RuleMatch) -> Delivery {
        match self.asset_processor(matched) {
            Some((_, ProcessorKind::AssetFile)) => Delivery::Emitted,
            Some((_, ProcessorKind::AssetInline)) => {
                // Without a limit every file is inlined
                let limit = self
                    .asset_option(matcher, matched, "limit")
                    .and_then(Value::as_u64);
                match limit {
                    Some(limit) if module.size > limit => Delivery::Emitted,
                    _ => Delivery::Inlined,
                }
            }
            Some((_, ProcessorKind::AssetSource)) => Delivery::Inlined,
            _ => Delivery::Bundled,
        }
    }

    /// First asset-handling processor of a matched chain.
    fn asset_processor<'m>(&self, matched: &'m RuleMatch) -> Option<(&'m str, ProcessorKind)> {
        matched.chain.iter().find_map(|loader| {
            match self.processors.resolve(loader)? {
                kind @ (ProcessorKind::AssetFile
                | ProcessorKind::AssetInline
                | ProcessorKind::AssetSource) => Some((loader.as_str(), kind)),
                _ => None,
            }
        })
    }

    fn asset_option<'a>(
        &self,
        matcher: &RuleMatcher<'a>,
        matched: &RuleMatch,
        key: &str,
    ) -> Option<&'a Value> {
        let (loader, _) = self.asset_processor(matched)?;
        matcher.processor(matched, loader)?.options.get(key)
    }
}

/// Stylesheets pulled in through `@import`/`@use` by another stylesheet.
///
/// The stylesheet compiler inlines these, so they need no rule of their own.
fn style_partials(graph: &ModuleGraph) -> FxHashSet<&Path> {
    graph
        .modules()
        .filter(|m| m.kind == ModuleKind::Style)
        .flat_map(|m| &m.dependencies)
        .filter(|d| d.kind == ImportKind::StyleImport)
        .filter_map(Dependency::target)
        .collect()
}
