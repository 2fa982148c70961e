//! Build configuration sections: entries, output naming, module rules,
//! plugins, optimization and performance.

mod entry;
mod helpers;
mod optimization;
mod output;
mod plugin;
mod rules;
mod types;

pub use entry::EntryMap;
pub use optimization::{CacheGroup, ChunksMode, OptimizationSpec, SplitChunksSpec};
pub use output::{FileNameTemplate, OutputSpec, Placeholder, RenderContext};
pub use plugin::{
    CssExtractOptions, CssMinimizerOptions, FriendlyErrorsOptions, PluginOptions, PluginSpec,
    SourceMapPluginOptions,
};
pub use rules::{ModuleSpec, ProcessorRef, TransformRule};
pub use types::{Devtool, Hints, PerformanceSpec};
