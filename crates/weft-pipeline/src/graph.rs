//! Module graph construction.
//!
//! Walks from the configured entries through every reference the scanner
//! finds. Module paths are relative to the source root and normalized, so
//! they double as stable module ids.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use path_clean::PathClean;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use weft_config::WeftConfig;

use crate::diagnostics::{Diagnostic, DiagnosticCode, Diagnostics};
use crate::error::{PipelineError, Result};
use crate::scan::{ImportKind, SourceLang, scan};
use crate::source::SourceGraph;

/// Extensions tried, in order, for specifiers without one.
pub const RESOLVE_EXTENSIONS: &[&str] = &["js", "mjs", "jsx", "ts", "tsx", "json"];

const STYLE_EXTENSIONS: &[&str] = &["scss", "sass", "css"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    Script,
    Json,
    Style,
    Asset,
}

impl ModuleKind {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "js" | "mjs" | "cjs" | "jsx" | "ts" | "tsx" => ModuleKind::Script,
            "json" => ModuleKind::Json,
            "css" | "scss" | "sass" | "less" => ModuleKind::Style,
            _ => ModuleKind::Asset,
        }
    }

    /// Modules the engine loads without any processor.
    pub fn is_native(self) -> bool {
        matches!(self, ModuleKind::Script | ModuleKind::Json)
    }

    fn lang(self) -> Option<SourceLang> {
        match self {
            ModuleKind::Script => Some(SourceLang::Script),
            ModuleKind::Style => Some(SourceLang::Style),
            ModuleKind::Json | ModuleKind::Asset => None,
        }
    }
}

/// Where a reference led.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "target", rename_all = "lowercase")]
pub enum Resolution {
    Module(PathBuf),
    External(String),
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub specifier: String,
    pub kind: ImportKind,
    pub resolution: Resolution,
}

impl Dependency {
    pub fn target(&self) -> Option<&Path> {
        match &self.resolution {
            Resolution::Module(path) => Some(path),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub path: PathBuf,
    pub kind: ModuleKind,
    pub size: u64,
    pub dependencies: Vec<Dependency>,
}

/// Every module reachable from the entries, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct ModuleGraph {
    entries: IndexMap<String, PathBuf>,
    modules: IndexMap<PathBuf, Module>,
    externals: Vec<String>,
}

impl ModuleGraph {
    /// Build the graph for `config` from `source`.
    ///
    /// Missing entries are fatal; unresolvable relative references become
    /// error diagnostics and planning continues.
    pub fn build(
        config: &WeftConfig,
        source: &dyn SourceGraph,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self> {
        let context = config.context.clone().unwrap_or_default();
        let mut graph = ModuleGraph::default();
        let mut queue = VecDeque::new();

        for (name, entry) in config.entry.iter() {
            let path = context.join(entry).clean();
            if !source.exists(&path) {
                return Err(PipelineError::EntryNotFound {
                    name: name.to_string(),
                    path: source.root().join(&path),
                });
            }
            graph.entries.insert(name.to_string(), path.clone());
            queue.push_back(path);
        }

        let mut seen: FxHashSet<PathBuf> = queue.iter().cloned().collect();
        while let Some(path) = queue.pop_front() {
            let module = load_module(&path, source, diagnostics);
            for dependency in &module.dependencies {
                match &dependency.resolution {
                    Resolution::Module(target) => {
                        if seen.insert(target.clone()) {
                            queue.push_back(target.clone());
                        }
                    }
                    Resolution::External(name) => {
                        if !graph.externals.contains(name) {
                            graph.externals.push(name.clone());
                        }
                    }
                    Resolution::Missing => {}
                }
            }
            graph.modules.insert(path, module);
        }

        tracing::debug!(
            modules = graph.modules.len(),
            externals = graph.externals.len(),
            "module graph built"
        );
        Ok(graph)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_path()))
    }

    pub fn module(&self, path: &Path) -> Option<&Module> {
        self.modules.get(path)
    }

    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Bare specifiers that did not resolve inside the project.
    pub fn externals(&self) -> &[String] {
        &self.externals
    }

    /// Position of a module in discovery order.
    pub fn index_of(&self, path: &Path) -> Option<usize> {
        self.modules.get_index_of(path)
    }

    /// Modules reachable from `root` without crossing a dynamic import, in
    /// depth-first pre-order, plus the targets of the dynamic imports met on
    /// the way.
    pub fn static_closure(&self, root: &Path) -> (Vec<PathBuf>, Vec<PathBuf>) {
        let mut reached = Vec::new();
        let mut dynamic = Vec::new();
        let mut seen = FxHashSet::default();
        let mut stack = vec![root.to_path_buf()];

        while let Some(path) = stack.pop() {
            if !seen.insert(path.clone()) {
                continue;
            }
            let Some(module) = self.modules.get(&path) else {
                continue;
            };
            reached.push(path);
            for target in module
                .dependencies
                .iter()
                .filter(|d| !d.kind.is_static())
                .filter_map(Dependency::target)
            {
                if !dynamic.iter().any(|d: &PathBuf| d == target) {
                    dynamic.push(target.to_path_buf());
                }
            }
            for target in module
                .dependencies
                .iter()
                .rev()
                .filter(|d| d.kind.is_static())
                .filter_map(Dependency::target)
            {
                stack.push(target.to_path_buf());
            }
        }

        (reached, dynamic)
    }
}

fn load_module(path: &Path, source: &dyn SourceGraph, diagnostics: &mut Diagnostics) -> Module {
    let kind = ModuleKind::from_path(path);
    let size = source.size(path).unwrap_or(0);

    let mut dependencies = Vec::new();
    if let Some(lang) = kind.lang() {
        match source.read(path) {
            Some(content) => {
                for import in scan(&content, lang) {
                    let resolution = resolve(&import.specifier, import.kind, path, source);
                    match &resolution {
                        Resolution::Missing => diagnostics.push(
                            Diagnostic::error(
                                DiagnosticCode::ModuleNotFound,
                                format!("cannot resolve '{}'", import.specifier),
                            )
                            .at(path),
                        ),
                        Resolution::External(name) => diagnostics.push(
                            Diagnostic::info(
                                DiagnosticCode::ExternalModule,
                                format!("'{name}' is not installed, left external"),
                            )
                            .at(path),
                        ),
                        Resolution::Module(target) => {
                            tracing::debug!(from = %path.display(), to = %target.display(), "resolved");
                        }
                    }
                    dependencies.push(Dependency {
                        specifier: import.specifier,
                        kind: import.kind,
                        resolution,
                    });
                }
            }
            None => diagnostics.push(
                Diagnostic::warning(DiagnosticCode::UnreadableSource, "source is not valid UTF-8")
                    .at(path),
            ),
        }
    }

    Module {
        path: path.to_path_buf(),
        kind,
        size,
        dependencies,
    }
}

/// Resolve `specifier` referenced from `from`.
fn resolve(specifier: &str, kind: ImportKind, from: &Path, source: &dyn SourceGraph) -> Resolution {
    let dir = from.parent().unwrap_or(Path::new(""));
    let style = matches!(kind, ImportKind::StyleImport | ImportKind::Url);

    // Stylesheets resolve plain names relative to the file; `~` marks a package
    if let Some(package) = specifier.strip_prefix('~').filter(|_| style) {
        return resolve_package(package, source);
    }

    if specifier.starts_with('/') {
        // Served from the public path, not part of the build
        return Resolution::External(specifier.to_string());
    }

    if is_relative(specifier) || style {
        let candidate = dir.join(specifier).clean();
        let found = if kind == ImportKind::StyleImport {
            probe_style(&candidate, source).or_else(|| probe(&candidate, source))
        } else {
            probe(&candidate, source)
        };
        if let Some(found) = found {
            return Resolution::Module(found);
        }
        // Sass also looks up plain names in node_modules
        if kind == ImportKind::StyleImport && !is_relative(specifier) {
            let package = Path::new("node_modules").join(specifier);
            if let Some(found) = probe_style(&package, source) {
                return Resolution::Module(found);
            }
        }
        return Resolution::Missing;
    }

    resolve_package(specifier, source)
}

fn resolve_package(specifier: &str, source: &dyn SourceGraph) -> Resolution {
    let base = Path::new("node_modules").join(specifier);
    if let Some(found) = probe(&base, source) {
        return Resolution::Module(found);
    }

    // `main` field of the package manifest
    let manifest = base.join("package.json");
    if let Some(main) = source
        .read(&manifest)
        .and_then(|content| serde_json::from_str::<serde_json::Value>(&content).ok())
        .and_then(|value| value.get("main").and_then(|m| m.as_str()).map(str::to_string))
    {
        if let Some(found) = probe(&base.join(main).clean(), source) {
            return Resolution::Module(found);
        }
    }

    Resolution::External(package_name(specifier).to_string())
}

fn is_relative(specifier: &str) -> bool {
    specifier == "." || specifier == ".." || specifier.starts_with("./") || specifier.starts_with("../")
}

/// `@scope/pkg/sub` → `@scope/pkg`, `pkg/sub` → `pkg`.
fn package_name(specifier: &str) -> &str {
    let mut parts = specifier.splitn(3, '/');
    let first = parts.next().unwrap_or(specifier);
    if first.starts_with('@') {
        match parts.next() {
            Some(second) => &specifier[..first.len() + 1 + second.len()],
            None => specifier,
        }
    } else {
        first
    }
}

/// Exact file, then known extensions, then `index.js` inside a directory.
fn probe(candidate: &Path, source: &dyn SourceGraph) -> Option<PathBuf> {
    if source.exists(candidate) {
        return Some(candidate.to_path_buf());
    }
    for ext in RESOLVE_EXTENSIONS {
        let with_ext = with_extra_extension(candidate, ext);
        if source.exists(&with_ext) {
            return Some(with_ext);
        }
    }
    let index = candidate.join("index.js");
    source.exists(&index).then_some(index)
}

/// Sass lookup: `name.scss`, `_name.scss`, and so on for each style extension.
fn probe_style(candidate: &Path, source: &dyn SourceGraph) -> Option<PathBuf> {
    if candidate.extension().is_some() && source.exists(candidate) {
        return Some(candidate.to_path_buf());
    }
    let file_name = candidate.file_name()?.to_str()?;
    let dir = candidate.parent().unwrap_or(Path::new(""));
    for ext in STYLE_EXTENSIONS {
        for name in [format!("{file_name}.{ext}"), format!("_{file_name}.{ext}")] {
            let path = dir.join(name);
            if source.exists(&path) {
                return Some(path);
            }
        }
    }
    None
}

fn with_extra_extension(path: &Path, ext: &str) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".");
    os.push(ext);
    PathBuf::from(os)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySourceGraph;
    use weft_config::EntryMap;

    fn config(entry: &str) -> WeftConfig {
        WeftConfig {
            entry: EntryMap::new().with("main", entry),
            ..WeftConfig::default()
        }
    }

    fn build(source: &MemorySourceGraph) -> (ModuleGraph, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let graph = ModuleGraph::build(&config("./src/index.js"), source, &mut diagnostics).unwrap();
        (graph, diagnostics)
    }

    #[test]
    fn probes_extensions_and_index() {
        let source = MemorySourceGraph::new("/p")
            .with_file("src/index.js", "import './util';\nimport './widgets';")
            .with_file("src/util.ts", "")
            .with_file("src/widgets/index.js", "");

        let (graph, diagnostics) = build(&source);
        let paths: Vec<_> = graph.modules().map(|m| m.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("src/index.js"),
                PathBuf::from("src/util.ts"),
                PathBuf::from("src/widgets/index.js"),
            ]
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn missing_relative_import_is_an_error() {
        let source = MemorySourceGraph::new("/p").with_file("src/index.js", "import './nope';");
        let (_, diagnostics) = build(&source);
        assert!(diagnostics.has_errors());
        assert_eq!(
            diagnostics.iter().next().unwrap().path.as_deref(),
            Some(Path::new("src/index.js"))
        );
    }

    #[test]
    fn bare_imports_resolve_into_node_modules() {
        let source = MemorySourceGraph::new("/p")
            .with_file("src/index.js", "import 'lodash';\nimport React from 'react';")
            .with_file("node_modules/lodash/package.json", r#"{ "main": "lodash.js" }"#)
            .with_file("node_modules/lodash/lodash.js", "");

        let (graph, diagnostics) = build(&source);
        assert!(graph.module(Path::new("node_modules/lodash/lodash.js")).is_some());
        assert_eq!(graph.externals(), ["react".to_string()]);
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn sass_partials_resolve() {
        let source = MemorySourceGraph::new("/p")
            .with_file("src/index.js", "import '../scss/main.scss';")
            .with_file("scss/main.scss", "@import 'variables';\nbody { background: url(../img/bg.png); }")
            .with_file("scss/_variables.scss", "$c: red;")
            .with_file("img/bg.png", "png");

        let (graph, diagnostics) = build(&source);
        assert!(graph.module(Path::new("scss/_variables.scss")).is_some());
        assert_eq!(graph.module(Path::new("img/bg.png")).unwrap().kind, ModuleKind::Asset);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn missing_entry_is_fatal() {
        let source = MemorySourceGraph::new("/p");
        let mut diagnostics = Diagnostics::new();
        let err = ModuleGraph::build(&config("./src/index.js"), &source, &mut diagnostics).unwrap_err();
        assert!(matches!(err, PipelineError::EntryNotFound { name, .. } if name == "main"));
    }

    #[test]
    fn static_closure_stops_at_dynamic_imports() {
        let source = MemorySourceGraph::new("/p")
            .with_file("src/index.js", "import './a';\nimport('./lazy');")
            .with_file("src/a.js", "import './b';")
            .with_file("src/b.js", "")
            .with_file("src/lazy.js", "import './b';");

        let (graph, _) = build(&source);
        let (reached, dynamic) = graph.static_closure(Path::new("src/index.js"));
        assert_eq!(
            reached,
            vec![
                PathBuf::from("src/index.js"),
                PathBuf::from("src/a.js"),
                PathBuf::from("src/b.js"),
            ]
        );
        assert_eq!(dynamic, vec![PathBuf::from("src/lazy.js")]);
    }

    #[test]
    fn scoped_package_names() {
        assert_eq!(package_name("@babel/runtime/helpers"), "@babel/runtime");
        assert_eq!(package_name("lodash/fp"), "lodash");
        assert_eq!(package_name("@scope"), "@scope");
    }
}
