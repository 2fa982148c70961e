//! End-to-end planning tests
//!
//! Plans the classic preset and small hand-built configurations over
//! in-memory and on-disk projects.

use std::fs;
use std::path::Path;

use serde_json::json;
use weft_config::{
    EntryMap, Hints, Pattern, PerformanceSpec, PluginSpec, ProcessorRef, TransformRule,
    WeftConfig, plugins, presets, processors,
};
use weft_pipeline::{
    ArtifactKind, ChunkKind, Delivery, DiagnosticCode, FsSourceGraph, MemorySourceGraph,
    PipelineError, PluginPhase, SourceGraph, plan,
};

const INDEX_JS: &str = "import '../scss/main.scss';\nimport { setup } from './app';\nsetup();\n";
const APP_JS: &str = "import logo from '../img/logo.png';\nexport function setup() {\n  return logo;\n}\n";
const MAIN_SCSS: &str = "@import 'variables';\n\n@font-face {\n  font-family: Inter;\n  src: url('../fonts/inter.woff2');\n}\n";

fn site_files() -> Vec<(&'static str, String)> {
    vec![
        ("src/js/index.js", INDEX_JS.to_string()),
        ("src/js/app.js", APP_JS.to_string()),
        ("src/scss/main.scss", MAIN_SCSS.to_string()),
        ("src/scss/_variables.scss", "$brand: #333;\n".to_string()),
        ("src/img/logo.png", "PNG".repeat(100)),
        ("src/fonts/inter.woff2", "WOFF".repeat(50)),
    ]
}

fn site() -> MemorySourceGraph {
    site_files()
        .into_iter()
        .fold(MemorySourceGraph::new("/site"), |source, (path, content)| {
            source.with_file(path, content)
        })
}

fn script_config(entry: &str) -> WeftConfig {
    WeftConfig {
        entry: EntryMap::new().with("main", entry),
        ..WeftConfig::default()
    }
}

#[test]
fn classic_site_emits_one_script_and_one_stylesheet() {
    let config = presets::classic().unwrap();
    let plan = plan(&config, &site()).unwrap();

    assert_eq!(plan.artifacts_of(ArtifactKind::Script).count(), 1);
    assert_eq!(plan.artifacts_of(ArtifactKind::Stylesheet).count(), 1);
    assert!(plan.modules.iter().all(|m| m.delivery != Delivery::Injected));

    assert_eq!(
        plan.artifact_paths(),
        vec!["main.js", "inter.woff2", "logo.png", "main.css", "main.js.map"]
    );

    let stylesheet = plan.artifact("main.css").unwrap();
    assert_eq!(stylesheet.modules, vec![Path::new("src/scss/main.scss")]);
    assert_eq!(stylesheet.source_map, None);
    assert_eq!(stylesheet.minified_by, None);

    let script = plan.artifact("main.js").unwrap();
    assert_eq!(script.size, (INDEX_JS.len() + APP_JS.len()) as u64);
}

#[test]
fn classic_site_module_deliveries() {
    let config = presets::classic().unwrap();
    let plan = plan(&config, &site()).unwrap();

    let deliveries: Vec<_> = plan
        .modules
        .iter()
        .map(|m| (m.path.to_str().unwrap(), m.delivery))
        .collect();
    assert_eq!(
        deliveries,
        vec![
            ("src/js/index.js", Delivery::Bundled),
            ("src/scss/main.scss", Delivery::Extracted),
            ("src/js/app.js", Delivery::Bundled),
            ("src/scss/_variables.scss", Delivery::Compiled),
            ("src/fonts/inter.woff2", Delivery::Emitted),
            ("src/img/logo.png", Delivery::Emitted),
        ]
    );

    let scss = plan.module(Path::new("src/scss/main.scss")).unwrap();
    let transform = scss.transform.as_ref().unwrap();
    assert_eq!(transform.rule, 1);
    assert_eq!(
        transform.execution,
        vec![processors::SASS, processors::CSS, processors::CSS_EXTRACT]
    );
    assert!(plan.diagnostics.is_empty());
}

#[test]
fn classic_site_summary() {
    let config = presets::classic().unwrap();
    let plan = plan(&config, &site()).unwrap();

    insta::assert_json_snapshot!(plan.summary(), @r#"
    {
      "entries": 1,
      "modules": 6,
      "chunks": 1,
      "scripts": 1,
      "stylesheets": 1,
      "assets": 2,
      "sourceMaps": 1,
      "totalSize": 742,
      "errors": 0,
      "warnings": 0
    }
    "#);
}

#[test]
fn classic_site_plugins_run_by_phase() {
    let config = presets::classic().unwrap();
    let plan = plan(&config, &site()).unwrap();

    let applied: Vec<_> = plan
        .plugins
        .iter()
        .map(|p| (p.plugin.as_str(), p.phase))
        .collect();
    assert_eq!(
        applied,
        vec![
            (plugins::CSS_EXTRACT, PluginPhase::Extract),
            (plugins::CSS_MINIMIZER, PluginPhase::Optimize),
            (plugins::SOURCE_MAP, PluginPhase::SourceMaps),
            ("performance", PluginPhase::Analyze),
            (plugins::FRIENDLY_ERRORS, PluginPhase::Report),
            (plugins::DEV_PROXY, PluginPhase::Report),
        ]
    );

    let dev = plan.dev_server.as_ref().unwrap();
    assert_eq!(dev.listen, "http://localhost:3000");
    assert_eq!(dev.proxy.as_deref(), Some("xxx"));
    assert_eq!(dev.watch, vec!["main.js", "main.css"]);

    let report = plan.report.as_ref().unwrap();
    assert_eq!((report.errors, report.warnings), (0, 0));
}

#[test]
fn classic_site_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    for (path, content) in site_files() {
        let full = dir.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }

    let source = FsSourceGraph::new(dir.path());
    assert!(source.exists(Path::new("src/js/index.js")));

    let config = presets::classic().unwrap();
    let plan = plan(&config, &source).unwrap();
    assert_eq!(
        plan.artifact_paths(),
        vec!["main.js", "inter.woff2", "logo.png", "main.css", "main.js.map"]
    );
    assert_eq!(plan.artifact("logo.png").unwrap().size, 300);
}

#[test]
fn style_loader_injects_instead_of_extracting() {
    let mut config = presets::classic().unwrap();
    config.module.rules[1].chain[0] = ProcessorRef::new(processors::STYLE);
    config.plugins.retain(|p| p.plugin != plugins::CSS_EXTRACT);

    let plan = plan(&config, &site()).unwrap();
    let scss = plan.module(Path::new("src/scss/main.scss")).unwrap();
    assert_eq!(scss.delivery, Delivery::Injected);
    assert_eq!(plan.artifacts_of(ArtifactKind::Stylesheet).count(), 0);
    assert_eq!(
        plan.artifact("main.js").unwrap().size,
        (INDEX_JS.len() + APP_JS.len() + MAIN_SCSS.len()) as u64
    );
}

#[test]
fn dynamic_import_splits_async_and_vendor_chunks() {
    let config = presets::classic().unwrap();
    let source = site()
        .with_file("src/js/index.js", "import('./admin');\n")
        .with_file("src/js/admin.js", "import Chart from 'chart.js';\n")
        .with_file("node_modules/chart.js/package.json", r#"{ "main": "dist/chart.js" }"#)
        .with_file("node_modules/chart.js/dist/chart.js", "module.exports = {};\n");

    let plan = plan(&config, &source).unwrap();
    let kinds: Vec<_> = plan.chunks.iter().map(|c| c.kind).collect();
    assert_eq!(kinds, vec![ChunkKind::Entry, ChunkKind::Async, ChunkKind::Shared]);

    let vendors = &plan.chunks[2];
    assert_eq!(vendors.name.as_deref(), Some("vendors~1"));
    assert_eq!(vendors.modules, vec![Path::new("node_modules/chart.js/dist/chart.js")]);

    let scripts: Vec<_> = plan
        .artifacts_of(ArtifactKind::Script)
        .map(|a| a.path.as_str())
        .collect();
    assert_eq!(scripts, vec!["main.js", "1.js", "2.js"]);

    let vendor_module = plan
        .module(Path::new("node_modules/chart.js/dist/chart.js"))
        .unwrap();
    assert_eq!(vendor_module.chunks, vec![2]);
}

#[test]
fn lazily_loaded_vendor_does_not_leave_an_empty_chunk() {
    let config = presets::classic().unwrap();
    let source = site()
        .with_file("src/js/index.js", "import('lodash');\n")
        .with_file("node_modules/lodash/index.js", "module.exports = {};\n");

    let plan = plan(&config, &source).unwrap();
    let chunks: Vec<_> = plan
        .chunks
        .iter()
        .map(|c| (c.id, c.kind, c.name.as_deref()))
        .collect();
    assert_eq!(
        chunks,
        vec![
            (0, ChunkKind::Entry, Some("main")),
            (1, ChunkKind::Shared, Some("vendors~1")),
        ]
    );
    assert_eq!(plan.chunks[1].parents, vec![0]);

    let scripts: Vec<_> = plan
        .artifacts_of(ArtifactKind::Script)
        .map(|a| (a.path.as_str(), a.size))
        .collect();
    assert_eq!(scripts, vec![("main.js", 18), ("1.js", 21)]);
    assert_eq!(
        plan.module(Path::new("node_modules/lodash/index.js")).unwrap().chunks,
        vec![1]
    );
}

#[test]
fn missing_entry_is_fatal() {
    let config = presets::classic().unwrap();
    let err = plan(&config, &MemorySourceGraph::new("/empty")).unwrap_err();
    match err {
        PipelineError::EntryNotFound { name, path } => {
            assert_eq!(name, "main");
            assert_eq!(path, Path::new("/empty/src/js/index.js"));
        }
        other => panic!("expected EntryNotFound, got {other:?}"),
    }
}

#[test]
fn invalid_config_fails_before_reading_sources() {
    let config = WeftConfig::default();
    let err = plan(&config, &MemorySourceGraph::new("/empty")).unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)));
}

#[test]
fn missing_relative_import_fails_the_build() {
    let source = MemorySourceGraph::new("/p").with_file("src/index.js", "import './gone';\n");
    let err = plan(&script_config("src/index.js"), &source).unwrap_err();
    let PipelineError::BuildFailed { errors } = err else {
        panic!("expected BuildFailed");
    };
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, DiagnosticCode::ModuleNotFound);
    assert_eq!(errors[0].path.as_deref(), Some(Path::new("src/index.js")));
}

#[test]
fn uninstalled_packages_stay_external() {
    let source = MemorySourceGraph::new("/p")
        .with_file("src/index.js", "import React from 'react';\nimport '@scope/ui/button';\n");
    let plan = plan(&script_config("src/index.js"), &source).unwrap();
    assert_eq!(plan.externals, vec!["react", "@scope/ui"]);
    assert_eq!(plan.modules.len(), 1);
}

#[test]
fn unmatched_assets_fail_the_build() {
    let source = MemorySourceGraph::new("/p")
        .with_file("src/index.js", "import data from './data.bin';\n")
        .with_file("src/data.bin", "01");
    let err = plan(&script_config("src/index.js"), &source).unwrap_err();

    let PipelineError::BuildFailed { errors } = err else {
        panic!("expected BuildFailed");
    };
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, DiagnosticCode::NoMatchingRule);
    assert_eq!(errors[0].path.as_deref(), Some(Path::new("src/data.bin")));
}

#[test]
fn classic_site_rejects_files_without_a_loader() {
    let config = presets::classic().unwrap();
    let source = site()
        .with_file("src/js/app.js", "import blob from '../data/blob.bin';\nexport function setup() {}\n")
        .with_file("src/data/blob.bin", "BIN");

    let err = plan(&config, &source).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::BuildFailed { ref errors } if errors[0].code == DiagnosticCode::NoMatchingRule
    ));
}

#[test]
fn url_loader_inlines_below_limit() {
    let mut config = script_config("src/index.js");
    config.module.rules.push(TransformRule::new(
        Pattern::new(r"\.png$").unwrap(),
        [ProcessorRef::new(processors::URL).with_options(json!({ "limit": 100, "name": "img/[name].[ext]" }))],
    ));
    let source = MemorySourceGraph::new("/p")
        .with_file("src/index.js", "import './icon.png';\nimport './photo.png';\n")
        .with_file("src/icon.png", "x".repeat(50))
        .with_file("src/photo.png", "x".repeat(500));

    let plan = plan(&config, &source).unwrap();
    assert_eq!(
        plan.module(Path::new("src/icon.png")).unwrap().delivery,
        Delivery::Inlined
    );
    assert_eq!(
        plan.module(Path::new("src/photo.png")).unwrap().delivery,
        Delivery::Emitted
    );
    assert_eq!(plan.artifact_paths(), vec!["main.js", "img/photo.png"]);
    assert_eq!(plan.artifact("main.js").unwrap().size, 43 + 50);
}

#[test]
fn colliding_asset_names_are_rejected() {
    let mut config = script_config("src/index.js");
    config.module.rules.push(TransformRule::new(
        Pattern::new(r"\.png$").unwrap(),
        [ProcessorRef::new(processors::FILE)],
    ));
    let source = MemorySourceGraph::new("/p")
        .with_file("src/index.js", "import './a/logo.png';\nimport './b/logo.png';\n")
        .with_file("src/a/logo.png", "a")
        .with_file("src/b/logo.png", "b");

    match plan(&config, &source).unwrap_err() {
        PipelineError::OutputCollision { path, first, second } => {
            assert_eq!(path, "logo.png");
            assert_eq!(first, "asset src/a/logo.png");
            assert_eq!(second, "asset src/b/logo.png");
        }
        other => panic!("expected OutputCollision, got {other:?}"),
    }
}

#[test]
fn performance_hints_as_errors_fail_the_build() {
    let mut config = script_config("src/index.js");
    config.performance = PerformanceSpec {
        hints: Hints::Error,
        max_asset_size: 10,
    };
    let source = MemorySourceGraph::new("/p").with_file("src/index.js", "console.log('hello world');\n");

    let err = plan(&config, &source).unwrap_err();
    let PipelineError::BuildFailed { errors } = err else {
        panic!("expected BuildFailed");
    };
    assert_eq!(errors[0].code, DiagnosticCode::AssetSizeLimit);
}

#[test]
fn unknown_registered_plugins_are_recorded() {
    let mut config = script_config("src/index.js");
    config.plugins.push(PluginSpec::new("banner-plugin"));
    let source = MemorySourceGraph::new("/p").with_file("src/index.js", "");

    let mut registry = weft_config::PluginRegistry::builtin();
    registry.register("banner-plugin", weft_config::PluginKind::Custom);
    let planner = weft_pipeline::Planner::with_registries(Default::default(), registry);

    let plan = planner.plan(&config, &source).unwrap();
    let applied: Vec<_> = plan.plugins.iter().map(|p| p.plugin.as_str()).collect();
    assert_eq!(applied, vec!["performance", "banner-plugin"]);
}
