//! Ready-made configurations.

use indexmap::IndexMap;
use serde_json::json;

use crate::build::{
    CacheGroup, ChunksMode, CssExtractOptions, CssMinimizerOptions, Devtool, EntryMap,
    FileNameTemplate, FriendlyErrorsOptions, Hints, ModuleSpec, OptimizationSpec, OutputSpec,
    PerformanceSpec, PluginSpec, ProcessorRef, SourceMapPluginOptions, SplitChunksSpec,
    TransformRule,
};
use crate::config::WeftConfig;
use crate::dev::DevProxyOptions;
use crate::error::Result;
use crate::pattern::Pattern;
use crate::registry::{plugins, processors};

/// Script + Sass site build with extracted CSS and a proxying dev server.
///
/// - `main` bundle rooted at `./src/js/index.js`
/// - Babel for scripts outside `node_modules`
/// - `src/scss/main.scss` compiled by Sass and extracted into `main.css`
/// - fonts and images emitted as files
/// - explicit source maps for everything except `main.css`
/// - `node_modules` code used by async chunks split into a `vendors` chunk
pub fn classic() -> Result<WeftConfig> {
    let entry = EntryMap::new().with("main", "./src/js/index.js");

    let output = OutputSpec {
        filename: FileNameTemplate::from("[name].js"),
        source_map_filename: FileNameTemplate::from("[file].map"),
        public_path: "/".to_string(),
        ..OutputSpec::default()
    };

    let rules = vec![
        TransformRule::new(Pattern::new(r"\.js$")?, [ProcessorRef::new(processors::BABEL)])
            .exclude(Pattern::new("node_modules")?),
        TransformRule::new(
            Pattern::new(r"\.(s*)css$")?,
            [
                ProcessorRef::new(processors::CSS_EXTRACT),
                ProcessorRef::new(processors::CSS),
                ProcessorRef::new(processors::SASS),
            ],
        )
        .include("src/scss/main.scss"),
        TransformRule::new(
            Pattern::new(r"\.(ttf|otf|eot|woff2?|png|jpe?g|gif|svg|ico)$")?,
            [ProcessorRef::new(processors::FILE)],
        ),
    ];

    let plugins = vec![
        PluginSpec::with(plugins::CSS_EXTRACT, &CssExtractOptions::default())?,
        PluginSpec::with(
            plugins::CSS_MINIMIZER,
            &CssMinimizerOptions {
                asset_name_reg_exp: Pattern::new(r"\.optimize\.css$")?,
                css_processor: "cssnano".to_string(),
                css_processor_plugin_options: json!({
                    "preset": ["default", { "discardComments": { "removeAll": true } }]
                }),
                can_print: true,
            },
        )?,
        PluginSpec::with(plugins::FRIENDLY_ERRORS, &FriendlyErrorsOptions::default())?,
        PluginSpec::with(
            plugins::DEV_PROXY,
            &DevProxyOptions {
                host: "localhost".to_string(),
                port: 3000,
                proxy: Some("xxx".to_string()),
                open: false,
                files: Vec::new(),
            },
        )?,
        PluginSpec::with(
            plugins::SOURCE_MAP,
            &SourceMapPluginOptions {
                filename: Some(FileNameTemplate::from("[file].map")),
                exclude: vec!["main.css".to_string()],
            },
        )?,
    ];

    let mut cache_groups = IndexMap::new();
    cache_groups.insert(
        "vendors".to_string(),
        CacheGroup::new(Some(Pattern::new(r"[\\/]node_modules[\\/]")?), ChunksMode::Async, 1),
    );

    Ok(WeftConfig {
        context: None,
        entry,
        output,
        module: ModuleSpec { rules },
        plugins,
        optimization: OptimizationSpec {
            split_chunks: SplitChunksSpec { cache_groups },
        },
        performance: PerformanceSpec {
            hints: Hints::Off,
            ..PerformanceSpec::default()
        },
        devtool: Devtool::Disabled,
        profiles: IndexMap::new(),
    })
}
