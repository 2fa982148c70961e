use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::pattern::Pattern;

/// `module` section: how source files are transformed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleSpec {
    /// Ordered rules; the first rule that matches a module supplies its chain
    #[serde(default)]
    pub rules: Vec<TransformRule>,
}

/// One `(pattern, exclusions, processor chain)` rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformRule {
    /// Pattern the module's resource path must match
    pub test: Pattern,

    /// Restrict the rule to these files or directories (relative to the context)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<PathBuf>,

    /// Resource paths matching this pattern are skipped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Pattern>,

    /// Processors, outermost first. Execution runs right-to-left: the last
    /// processor receives the source file.
    #[serde(rename = "use")]
    pub chain: Vec<ProcessorRef>,
}

impl TransformRule {
    pub fn new(test: Pattern, chain: impl IntoIterator<Item = ProcessorRef>) -> Self {
        Self {
            test,
            include: Vec::new(),
            exclude: None,
            chain: chain.into_iter().collect(),
        }
    }

    pub fn include(mut self, path: impl Into<PathBuf>) -> Self {
        self.include.push(path.into());
        self
    }

    pub fn exclude(mut self, pattern: Pattern) -> Self {
        self.exclude = Some(pattern);
        self
    }

    /// Processors in the order they run against a source file.
    pub fn execution_order(&self) -> impl Iterator<Item = &ProcessorRef> {
        self.chain.iter().rev()
    }
}

/// Reference to a processor (loader) by identity, with optional options.
///
/// Serialized as a bare string when there are no options, mirroring the
/// two forms accepted in `use` arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ProcessorRefRepr", into = "ProcessorRefRepr")]
pub struct ProcessorRef {
    pub loader: String,
    pub options: Value,
}

impl ProcessorRef {
    pub fn new(loader: impl Into<String>) -> Self {
        Self {
            loader: loader.into(),
            options: Value::Null,
        }
    }

    pub fn with_options(mut self, options: Value) -> Self {
        self.options = options;
        self
    }
}

impl From<&str> for ProcessorRef {
    fn from(loader: &str) -> Self {
        ProcessorRef::new(loader)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ProcessorRefRepr {
    Bare(String),
    Full {
        loader: String,
        #[serde(default, skip_serializing_if = "Value::is_null")]
        options: Value,
    },
}

impl From<ProcessorRefRepr> for ProcessorRef {
    fn from(repr: ProcessorRefRepr) -> Self {
        match repr {
            ProcessorRefRepr::Bare(loader) => ProcessorRef::new(loader),
            ProcessorRefRepr::Full { loader, options } => ProcessorRef { loader, options },
        }
    }
}

impl From<ProcessorRef> for ProcessorRefRepr {
    fn from(processor: ProcessorRef) -> Self {
        if processor.options.is_null() {
            ProcessorRefRepr::Bare(processor.loader)
        } else {
            ProcessorRefRepr::Full {
                loader: processor.loader,
                options: processor.options,
            }
        }
    }
}
