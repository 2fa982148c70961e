//! Rule matching.
//!
//! Rules are tried in declaration order and the first one that matches a
//! module supplies its processor chain. Patterns are matched against the
//! module's full resource path (source root joined with the module path), so
//! patterns such as `[\\/]node_modules[\\/]` behave as they do in the engine.

use std::path::{Path, PathBuf};

use path_clean::PathClean;
use serde::{Deserialize, Serialize};
use weft_config::{ProcessorKind, ProcessorRef, ProcessorRegistry, TransformRule};

/// How a stylesheet reaches the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleDelivery {
    /// Extracted into a stylesheet file
    Extract,
    /// Injected into the DOM at runtime by the script bundle
    Inject,
}

/// Outcome of matching one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleMatch {
    /// Index of the matching rule in `module.rules`
    pub rule: usize,
    /// Processor identities as declared (outermost first)
    pub chain: Vec<String>,
    /// Processor identities in the order they run against the source
    pub execution: Vec<String>,
}

pub struct RuleMatcher<'a> {
    rules: &'a [TransformRule],
    root: &'a Path,
    context: PathBuf,
}

impl<'a> RuleMatcher<'a> {
    /// `root` is the source root, `context` the directory `include` paths
    /// are relative to (itself relative to `root`).
    pub fn new(rules: &'a [TransformRule], root: &'a Path, context: Option<&Path>) -> Self {
        Self {
            rules,
            root,
            context: context.map(Path::to_path_buf).unwrap_or_default(),
        }
    }

    /// Find the first rule that applies to the module at `path`.
    pub fn match_module(&self, path: &Path) -> Option<RuleMatch> {
        let resource = self.root.join(path);
        let resource = resource.to_string_lossy();

        let (index, rule) = self
            .rules
            .iter()
            .enumerate()
            .find(|(_, rule)| self.applies(rule, path, &resource))?;

        tracing::debug!(module = %path.display(), rule = index, "matched rule");
        Some(RuleMatch {
            rule: index,
            chain: rule.chain.iter().map(|p| p.loader.clone()).collect(),
            execution: rule.execution_order().map(|p| p.loader.clone()).collect(),
        })
    }

    /// The processor entry of the matching rule, for option lookups.
    pub fn processor(&self, matched: &RuleMatch, loader: &str) -> Option<&'a ProcessorRef> {
        self.rules
            .get(matched.rule)?
            .chain
            .iter()
            .find(|p| p.loader == loader)
    }

    fn applies(&self, rule: &TransformRule, path: &Path, resource: &str) -> bool {
        if !rule.test.is_match(resource) {
            return false;
        }
        if rule.exclude.as_ref().is_some_and(|ex| ex.is_match(resource)) {
            return false;
        }
        rule.include.is_empty()
            || rule
                .include
                .iter()
                .any(|inc| path.starts_with(self.context.join(inc).clean()))
    }
}

/// Delivery chosen by the processors of a chain, if any.
pub fn style_delivery(chain: &[String], registry: &ProcessorRegistry) -> Option<StyleDelivery> {
    chain.iter().find_map(|loader| match registry.resolve(loader) {
        Some(ProcessorKind::StyleExtract) => Some(StyleDelivery::Extract),
        Some(ProcessorKind::StyleInject) => Some(StyleDelivery::Inject),
        _ => None,
    })
}
