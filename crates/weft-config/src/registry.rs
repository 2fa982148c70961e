//! Registries of processor (loader) and plugin identities.
//!
//! A configuration may only reference identities that are registered. The
//! built-in registries know the processors and plugins the external engine
//! ships with; callers can register more before validating.

use indexmap::IndexMap;

/// Well-known processor identities.
pub mod processors {
    pub const BABEL: &str = "babel-loader";
    pub const TYPESCRIPT: &str = "ts-loader";
    pub const CSS_EXTRACT: &str = "mini-css-extract-plugin/loader";
    pub const STYLE: &str = "style-loader";
    pub const CSS: &str = "css-loader";
    pub const POSTCSS: &str = "postcss-loader";
    pub const SASS: &str = "sass-loader";
    pub const FILE: &str = "file-loader";
    pub const URL: &str = "url-loader";
    pub const RAW: &str = "raw-loader";
}

/// Well-known plugin identities.
pub mod plugins {
    pub const CSS_EXTRACT: &str = "mini-css-extract-plugin";
    pub const CSS_MINIMIZER: &str = "optimize-css-assets-webpack-plugin";
    pub const FRIENDLY_ERRORS: &str = "friendly-errors-webpack-plugin";
    pub const DEV_PROXY: &str = "browser-sync-webpack-plugin";
    pub const SOURCE_MAP: &str = "source-map-dev-tool-plugin";
}

/// What a processor contributes to the module it transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorKind {
    /// Transpiles script source
    Script,
    /// Compiles a stylesheet language (Sass, Less) to CSS
    StylesheetCompiler,
    /// Resolves CSS imports and turns CSS into a module
    Css,
    /// Delivers CSS by extracting it into a stylesheet file
    StyleExtract,
    /// Delivers CSS by injecting it into the DOM at runtime
    StyleInject,
    /// Emits the source file as a separate asset
    AssetFile,
    /// Inlines the file as a data URL below a size limit, emits it above
    AssetInline,
    /// Exports the file content as a string
    AssetSource,
    /// Registered by a caller without a known role
    Custom,
}

impl ProcessorKind {
    /// Processors that decide how compiled CSS reaches the page.
    pub fn is_style_delivery(self) -> bool {
        matches!(self, ProcessorKind::StyleExtract | ProcessorKind::StyleInject)
    }
}

#[derive(Debug, Clone)]
pub struct ProcessorRegistry {
    entries: IndexMap<String, ProcessorKind>,
}

impl ProcessorRegistry {
    pub fn empty() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Registry with the processors the engine ships with.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(processors::BABEL, ProcessorKind::Script);
        registry.register(processors::TYPESCRIPT, ProcessorKind::Script);
        registry.register(processors::CSS_EXTRACT, ProcessorKind::StyleExtract);
        registry.register(processors::STYLE, ProcessorKind::StyleInject);
        registry.register(processors::CSS, ProcessorKind::Css);
        registry.register(processors::POSTCSS, ProcessorKind::Css);
        registry.register(processors::SASS, ProcessorKind::StylesheetCompiler);
        registry.register(processors::FILE, ProcessorKind::AssetFile);
        registry.register(processors::URL, ProcessorKind::AssetInline);
        registry.register(processors::RAW, ProcessorKind::AssetSource);
        registry
    }

    pub fn register(&mut self, identity: impl Into<String>, kind: ProcessorKind) {
        self.entries.insert(identity.into(), kind);
    }

    pub fn resolve(&self, identity: &str) -> Option<ProcessorKind> {
        self.entries.get(identity).copied()
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.entries.contains_key(identity)
    }

    pub fn identities(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Role of a plugin in post-processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginKind {
    CssExtract,
    CssMinimizer,
    SourceMap,
    FriendlyErrors,
    DevProxy,
    Custom,
}

#[derive(Debug, Clone)]
pub struct PluginRegistry {
    entries: IndexMap<String, PluginKind>,
}

impl PluginRegistry {
    pub fn empty() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(plugins::CSS_EXTRACT, PluginKind::CssExtract);
        registry.register(plugins::CSS_MINIMIZER, PluginKind::CssMinimizer);
        registry.register(plugins::FRIENDLY_ERRORS, PluginKind::FriendlyErrors);
        registry.register(plugins::DEV_PROXY, PluginKind::DevProxy);
        registry.register(plugins::SOURCE_MAP, PluginKind::SourceMap);
        registry
    }

    pub fn register(&mut self, identity: impl Into<String>, kind: PluginKind) {
        self.entries.insert(identity.into(), kind);
    }

    pub fn resolve(&self, identity: &str) -> Option<PluginKind> {
        self.entries.get(identity).copied()
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.entries.contains_key(identity)
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
