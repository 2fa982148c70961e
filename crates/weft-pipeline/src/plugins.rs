//! Plugin post-processing with execution phases.
//!
//! Plugins run in phase order (lower numbers first) so stylesheets exist
//! before they are minified and source maps are added after both. Within a
//! phase, plugins run in declaration order.

use serde::{Deserialize, Serialize};
use weft_config::{
    CssExtractOptions, CssMinimizerOptions, DevProxyOptions, FriendlyErrorsOptions, Hints,
    PerformanceSpec, PluginKind, PluginRegistry, PluginSpec, RenderContext,
    SourceMapPluginOptions, WeftConfig,
};

use crate::chunks::ChunkKind;
use crate::diagnostics::{Diagnostic, DiagnosticCode, Severity};
use crate::emit::{Artifact, ArtifactKind, SourceMapRef};
use crate::error::Result;
use crate::plan::{AppliedPlugin, BuildPlan, Delivery, DevServer, ErrorReport};
use crate::rules::StyleDelivery;

/// Plugin execution phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PluginPhase {
    /// Stylesheet extraction (always first)
    ///
    /// Creates the stylesheet artifacts later phases operate on.
    Extract = 10,

    /// Artifact optimization (CSS minification)
    Optimize = 20,

    /// Source map emission
    ///
    /// Runs after extraction so extracted stylesheets get maps too.
    SourceMaps = 30,

    /// Size analysis of the final artifacts
    Analyze = 40,

    /// Registered plugins without planning behaviour
    Custom = 50,

    /// Reporting and dev tooling (always last)
    ///
    /// Sees every diagnostic and every artifact.
    Report = 100,
}

impl From<PluginKind> for PluginPhase {
    fn from(kind: PluginKind) -> Self {
        match kind {
            PluginKind::CssExtract => PluginPhase::Extract,
            PluginKind::CssMinimizer => PluginPhase::Optimize,
            PluginKind::SourceMap => PluginPhase::SourceMaps,
            PluginKind::Custom => PluginPhase::Custom,
            PluginKind::FriendlyErrors | PluginKind::DevProxy => PluginPhase::Report,
        }
    }
}

/// A post-processing step over the build plan.
pub trait PlanPlugin: std::fmt::Debug {
    /// Identity shown in the plan
    fn name(&self) -> &str;

    fn phase(&self) -> PluginPhase;

    fn apply(&self, plan: &mut BuildPlan) -> Result<()>;
}

/// Plugins in registration order; sorted by phase once, when run.
#[derive(Debug, Default)]
pub struct PluginPipeline {
    plugins: Vec<Box<dyn PlanPlugin>>,
}

impl PluginPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instantiate the configured plugins, plus the built-in performance check.
    pub fn from_config(config: &WeftConfig, registry: &PluginRegistry) -> Result<Self> {
        let mut pipeline = Self::new();
        for spec in &config.plugins {
            let kind = registry.resolve(&spec.plugin).unwrap_or(PluginKind::Custom);
            pipeline.add(instantiate(spec, kind)?);
        }
        pipeline.add(Box::new(PerformancePlugin::new(config.performance.clone())));
        Ok(pipeline)
    }

    pub fn add(&mut self, plugin: Box<dyn PlanPlugin>) {
        self.plugins.push(plugin);
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Apply every plugin to `plan` in phase order.
    pub fn run(mut self, plan: &mut BuildPlan) -> Result<()> {
        // Stable sort keeps declaration order within a phase
        self.plugins.sort_by_key(|plugin| plugin.phase());
        for plugin in &self.plugins {
            tracing::debug!(plugin = plugin.name(), phase = ?plugin.phase(), "applying plugin");
            plugin.apply(plan)?;
            plan.plugins.push(AppliedPlugin {
                plugin: plugin.name().to_string(),
                phase: plugin.phase(),
            });
        }
        Ok(())
    }
}

fn instantiate(spec: &PluginSpec, kind: PluginKind) -> Result<Box<dyn PlanPlugin>> {
    let plugin: Box<dyn PlanPlugin> = match kind {
        PluginKind::CssExtract => Box::new(CssExtractPlugin {
            name: spec.plugin.clone(),
            options: spec.options_as()?,
        }),
        PluginKind::CssMinimizer => Box::new(CssMinimizerPlugin {
            name: spec.plugin.clone(),
            options: spec.options_as()?,
        }),
        PluginKind::SourceMap => Box::new(SourceMapPlugin {
            name: spec.plugin.clone(),
            options: spec.options_as()?,
        }),
        PluginKind::FriendlyErrors => Box::new(FriendlyErrorsPlugin {
            name: spec.plugin.clone(),
            options: spec.options_as()?,
        }),
        PluginKind::DevProxy => Box::new(DevProxyPlugin {
            name: spec.plugin.clone(),
            options: spec.options_as()?,
        }),
        PluginKind::Custom => Box::new(CustomPlugin {
            name: spec.plugin.clone(),
        }),
    };
    Ok(plugin)
}

/// Moves extract-delivered stylesheets into one stylesheet per chunk.
#[derive(Debug)]
pub struct CssExtractPlugin {
    name: String,
    options: CssExtractOptions,
}

impl PlanPlugin for CssExtractPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn phase(&self) -> PluginPhase {
        PluginPhase::Extract
    }

    fn apply(&self, plan: &mut BuildPlan) -> Result<()> {
        let mut stylesheets = Vec::new();
        for chunk in &plan.chunks {
            let extracted: Vec<_> = chunk
                .modules
                .iter()
                .filter_map(|path| plan.module(path))
                .filter(|m| m.style == Some(StyleDelivery::Extract))
                .map(|m| (m.path.clone(), m.size))
                .collect();
            if extracted.is_empty() {
                continue;
            }

            let name = chunk.display_name();
            let ctx = RenderContext {
                name: Some(&name),
                id: Some(chunk.id),
                ..Default::default()
            };
            let template = match chunk.kind {
                ChunkKind::Entry => &self.options.filename,
                ChunkKind::Async | ChunkKind::Shared => &self.options.chunk_filename,
            };

            let mut stylesheet = Artifact::new(template.render(&ctx), ArtifactKind::Stylesheet);
            stylesheet.chunk = Some(chunk.id);
            stylesheet.size = extracted.iter().map(|(_, size)| size).sum();
            stylesheet.modules = extracted.into_iter().map(|(path, _)| path).collect();
            stylesheets.push(stylesheet);
        }

        for stylesheet in &stylesheets {
            for path in &stylesheet.modules {
                if let Some(module) = plan.module_mut(path) {
                    module.delivery = Delivery::Extracted;
                }
            }
            if let Some(script) = stylesheet.chunk.and_then(|chunk| plan.script_of_mut(chunk)) {
                script.size = script.size.saturating_sub(stylesheet.size);
            }
            tracing::debug!(file = %stylesheet.path, modules = stylesheet.modules.len(), "extracted stylesheet");
        }
        plan.artifacts.extend(stylesheets);
        Ok(())
    }
}

/// Marks stylesheets matching `assetNameRegExp` for minification.
#[derive(Debug)]
pub struct CssMinimizerPlugin {
    name: String,
    options: CssMinimizerOptions,
}

impl PlanPlugin for CssMinimizerPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn phase(&self) -> PluginPhase {
        PluginPhase::Optimize
    }

    fn apply(&self, plan: &mut BuildPlan) -> Result<()> {
        for artifact in plan
            .artifacts
            .iter_mut()
            .filter(|a| a.kind == ArtifactKind::Stylesheet)
            .filter(|a| self.options.asset_name_reg_exp.is_match(&a.path))
        {
            artifact.minified_by = Some(self.options.css_processor.clone());
            if self.options.can_print {
                tracing::info!(file = %artifact.path, processor = %self.options.css_processor, "minifying stylesheet");
            }
        }
        Ok(())
    }
}

/// Adds source maps for scripts and stylesheets not excluded by prefix.
#[derive(Debug)]
pub struct SourceMapPlugin {
    name: String,
    options: SourceMapPluginOptions,
}

impl PlanPlugin for SourceMapPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn phase(&self) -> PluginPhase {
        PluginPhase::SourceMaps
    }

    fn apply(&self, plan: &mut BuildPlan) -> Result<()> {
        let mut maps = Vec::new();
        for artifact in plan.artifacts.iter_mut().filter(|a| {
            matches!(a.kind, ArtifactKind::Script | ArtifactKind::Stylesheet) && a.source_map.is_none()
        }) {
            if self.options.excludes(&artifact.path) {
                continue;
            }
            let Some(template) = &self.options.filename else {
                artifact.source_map = Some(SourceMapRef::Inline);
                continue;
            };

            let ctx = RenderContext {
                file: Some(&artifact.path),
                id: artifact.chunk,
                ..Default::default()
            };
            let path = template.render(&ctx);
            artifact.source_map = Some(SourceMapRef::File(path.clone()));

            let mut map = Artifact::new(path, ArtifactKind::SourceMap);
            map.chunk = artifact.chunk;
            map.map_of = Some(artifact.path.clone());
            maps.push(map);
        }
        plan.artifacts.extend(maps);
        Ok(())
    }
}

/// Orders diagnostics errors-first and records the report summary.
#[derive(Debug)]
pub struct FriendlyErrorsPlugin {
    name: String,
    options: FriendlyErrorsOptions,
}

impl PlanPlugin for FriendlyErrorsPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn phase(&self) -> PluginPhase {
        PluginPhase::Report
    }

    fn apply(&self, plan: &mut BuildPlan) -> Result<()> {
        plan.diagnostics.sort_by_severity();
        plan.report = Some(ErrorReport {
            clear_console: self.options.clear_console,
            errors: plan.diagnostics.count(Severity::Error),
            warnings: plan.diagnostics.count(Severity::Warning),
            success_messages: self.options.success_messages.clone(),
        });
        Ok(())
    }
}

/// Records the dev proxy that serves the build and reloads on change.
#[derive(Debug)]
pub struct DevProxyPlugin {
    name: String,
    options: DevProxyOptions,
}

impl PlanPlugin for DevProxyPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn phase(&self) -> PluginPhase {
        PluginPhase::Report
    }

    fn apply(&self, plan: &mut BuildPlan) -> Result<()> {
        let mut watch: Vec<String> = plan
            .artifacts
            .iter()
            .filter(|a| matches!(a.kind, ArtifactKind::Script | ArtifactKind::Stylesheet))
            .map(|a| a.path.clone())
            .collect();
        watch.extend(self.options.files.iter().cloned());

        plan.dev_server = Some(DevServer {
            listen: self.options.listen_url(),
            proxy: self.options.proxy.clone(),
            open: self.options.open,
            watch,
        });
        Ok(())
    }
}

/// Size limits on emitted artifacts, enabled by `performance.hints`.
#[derive(Debug)]
pub struct PerformancePlugin {
    spec: PerformanceSpec,
}

impl PerformancePlugin {
    pub fn new(spec: PerformanceSpec) -> Self {
        Self { spec }
    }
}

impl PlanPlugin for PerformancePlugin {
    fn name(&self) -> &str {
        "performance"
    }

    fn phase(&self) -> PluginPhase {
        PluginPhase::Analyze
    }

    fn apply(&self, plan: &mut BuildPlan) -> Result<()> {
        let severity = match self.spec.hints {
            Hints::Off => return Ok(()),
            Hints::Warning => Severity::Warning,
            Hints::Error => Severity::Error,
        };

        let oversized: Vec<Diagnostic> = plan
            .artifacts
            .iter()
            .filter(|a| a.kind != ArtifactKind::SourceMap && a.size > self.spec.max_asset_size)
            .map(|a| {
                Diagnostic::new(
                    severity,
                    DiagnosticCode::AssetSizeLimit,
                    format!(
                        "asset '{}' is {} bytes, over the {} byte limit",
                        a.path, a.size, self.spec.max_asset_size
                    ),
                )
            })
            .collect();
        for diagnostic in oversized {
            plan.diagnostics.push(diagnostic);
        }
        Ok(())
    }
}

/// Registered identity without planning behaviour; recorded only.
#[derive(Debug)]
pub struct CustomPlugin {
    name: String,
}

impl PlanPlugin for CustomPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn phase(&self) -> PluginPhase {
        PluginPhase::Custom
    }

    fn apply(&self, _plan: &mut BuildPlan) -> Result<()> {
        tracing::debug!(plugin = %self.name, "no planning behaviour, recorded only");
        Ok(())
    }
}
