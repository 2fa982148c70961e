//! Lightweight import scanner.
//!
//! Finds module references in scripts and stylesheets without parsing them.
//! References are returned in source order, each specifier once per kind.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// How a module refers to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportKind {
    /// `import x from '...'`, `import '...'`, `export ... from '...'`
    Static,
    /// `import('...')`, splits a new chunk
    Dynamic,
    /// `require('...')`
    Require,
    /// `@import` / `@use` / `@forward` in stylesheets
    StyleImport,
    /// `url(...)` in stylesheets
    Url,
}

impl ImportKind {
    /// References that load the target together with the importer.
    pub fn is_static(self) -> bool {
        !matches!(self, ImportKind::Dynamic)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRef {
    pub specifier: String,
    pub kind: ImportKind,
}

/// Source language, decides which reference forms are recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLang {
    Script,
    Style,
}

static STATIC_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*(?:import|export)\s+(?:type\s+)?(?:[\w*${}\s,]+?\s+from\s+)?['"]([^'"\n]+)['"]"#)
        .expect("static import pattern is valid")
});

static DYNAMIC_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bimport\s*\(\s*(?:/\*.*?\*/\s*)?['"`]([^'"`\n]+)['"`]\s*\)"#)
        .expect("dynamic import pattern is valid")
});

static REQUIRE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\brequire\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#).expect("require pattern is valid")
});

static STYLE_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"@(?:import|use|forward)\s+(?:url\(\s*)?['"]([^'"\n]+)['"]"#)
        .expect("style import pattern is valid")
});

static STYLE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\burl\(\s*(?:'([^'\n]+)'|"([^"\n]+)"|([^'")\s]+))\s*\)"#)
        .expect("url pattern is valid")
});

/// Find the module references in `source`.
pub fn scan(source: &str, lang: SourceLang) -> Vec<ImportRef> {
    let mut found: Vec<(usize, ImportRef)> = Vec::new();
    let mut push = |offset: usize, specifier: &str, kind: ImportKind| {
        found.push((
            offset,
            ImportRef {
                specifier: specifier.trim().to_string(),
                kind,
            },
        ));
    };

    match lang {
        SourceLang::Script => {
            for (re, kind) in [
                (&*STATIC_IMPORT, ImportKind::Static),
                (&*DYNAMIC_IMPORT, ImportKind::Dynamic),
                (&*REQUIRE, ImportKind::Require),
            ] {
                for caps in re.captures_iter(source) {
                    if let Some(m) = caps.get(1) {
                        push(m.start(), m.as_str(), kind);
                    }
                }
            }
        }
        SourceLang::Style => {
            let mut import_spans = Vec::new();
            for caps in STYLE_IMPORT.captures_iter(source) {
                if let (Some(whole), Some(m)) = (caps.get(0), caps.get(1)) {
                    import_spans.push(whole.start()..m.end() + 1);
                    push(m.start(), m.as_str(), ImportKind::StyleImport);
                }
            }
            for caps in STYLE_URL.captures_iter(source) {
                let Some(m) = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)) else {
                    continue;
                };
                // `@import url('x')` is already recorded as an import
                if import_spans.iter().any(|span| span.contains(&m.start())) {
                    continue;
                }
                if is_inline_or_remote(m.as_str()) {
                    continue;
                }
                push(m.start(), m.as_str(), ImportKind::Url);
            }
        }
    }

    found.sort_by_key(|(offset, _)| *offset);

    let mut refs: Vec<ImportRef> = Vec::with_capacity(found.len());
    for (_, import) in found {
        if !refs.contains(&import) {
            refs.push(import);
        }
    }
    refs
}

/// `url()` targets that are not files: data URIs, absolute URLs, fragments.
fn is_inline_or_remote(specifier: &str) -> bool {
    let specifier = specifier.trim();
    specifier.starts_with("data:")
        || specifier.starts_with('#')
        || specifier.starts_with("//")
        || specifier.contains("://")
}
