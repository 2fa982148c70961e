//! Pluggable config validation strategies
//!
//! Separates filesystem validation (for CLI use) from schema validation (for library use).
//! Validation is fail-fast: the first violation is returned.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::build::{FileNameTemplate, Placeholder, PluginOptions, RenderContext};
use crate::config::WeftConfig;
use crate::error::{ConfigError, Result};
use crate::registry::{PluginKind, PluginRegistry, ProcessorKind, ProcessorRegistry};

/// Trait for pluggable config validation strategies
pub trait ConfigValidator {
    /// Validate a configuration
    fn validate(&self, config: &WeftConfig) -> Result<()>;
}

/// Schema-only validation (no filesystem checks)
///
/// Checks everything that can be decided from the configuration alone:
/// entries, rule chains against the processor registry, plugin identities
/// and options, output templates and cache-group tie-breaking.
///
/// # Example
///
/// ```
/// use weft_config::{ConfigValidator, SchemaValidator, WeftConfig, EntryMap};
///
/// let mut config = WeftConfig::default();
/// config.entry = EntryMap::new().with("main", "./src/index.js");
///
/// SchemaValidator::default().validate(&config).unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaValidator {
    processors: ProcessorRegistry,
    plugins: PluginRegistry,
}

impl SchemaValidator {
    pub fn with_registries(processors: ProcessorRegistry, plugins: PluginRegistry) -> Self {
        Self {
            processors,
            plugins,
        }
    }

    pub fn processors(&self) -> &ProcessorRegistry {
        &self.processors
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    fn validate_entries(&self, config: &WeftConfig) -> Result<()> {
        if config.entry.is_empty() {
            return Err(ConfigError::NoEntries);
        }

        for (name, path) in config.entry.iter() {
            if name.trim().is_empty() {
                return Err(ConfigError::schema(
                    "entry names cannot be empty",
                    "Give every entry a bundle name, e.g. entry.main",
                ));
            }
            if path.as_os_str().is_empty() {
                return Err(ConfigError::schema(
                    format!("entry '{name}' has an empty path"),
                    "Point the entry at a source file",
                ));
            }
        }
        Ok(())
    }

    fn validate_rules(&self, config: &WeftConfig) -> Result<()> {
        let extraction_enabled = config
            .plugins
            .iter()
            .any(|p| self.plugins.resolve(&p.plugin) == Some(PluginKind::CssExtract));

        for (index, rule) in config.module.rules.iter().enumerate() {
            if rule.chain.is_empty() {
                return Err(ConfigError::EmptyProcessorChain { rule: index });
            }

            let mut delivery = None;
            for processor in &rule.chain {
                let kind = self.processors.resolve(&processor.loader).ok_or_else(|| {
                    ConfigError::UnknownProcessor {
                        rule: index,
                        loader: processor.loader.clone(),
                    }
                })?;

                if kind.is_style_delivery() {
                    if let Some(previous) = delivery.replace(processor.loader.as_str()) {
                        return Err(ConfigError::schema(
                            format!(
                                "rule #{index} delivers styles twice ('{previous}' and '{}')",
                                processor.loader
                            ),
                            "Use either the extract loader or style-loader, not both",
                        ));
                    }
                }

                if kind == ProcessorKind::StyleExtract && !extraction_enabled {
                    return Err(ConfigError::schema(
                        format!(
                            "rule #{index} uses '{}' but the extraction plugin is not configured",
                            processor.loader
                        ),
                        "Add mini-css-extract-plugin to plugins",
                    ));
                }
            }
        }
        Ok(())
    }

    fn validate_plugins(&self, config: &WeftConfig) -> Result<()> {
        for (index, spec) in config.plugins.iter().enumerate() {
            if !self.plugins.contains(&spec.plugin) {
                return Err(ConfigError::UnknownPlugin {
                    index,
                    plugin: spec.plugin.clone(),
                });
            }

            match spec.typed_options()? {
                Some(PluginOptions::SourceMap(options)) => {
                    if let Some(filename) = &options.filename {
                        check_placeholders(
                            "source map plugin filename",
                            filename,
                            &[Placeholder::File, Placeholder::Name, Placeholder::Id],
                        )?;
                    }
                }
                Some(PluginOptions::CssExtract(options)) => {
                    let allowed = [Placeholder::Name, Placeholder::Id];
                    check_placeholders("css filename", &options.filename, &allowed)?;
                    check_placeholders("css chunkFilename", &options.chunk_filename, &allowed)?;
                }
                Some(PluginOptions::DevProxy(options)) if options.port == 0 => {
                    return Err(ConfigError::schema(
                        "dev proxy port cannot be 0",
                        "Pick a fixed port such as 3000",
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn validate_output(&self, config: &WeftConfig) -> Result<()> {
        let output = &config.output;
        let chunk_allowed = [Placeholder::Name, Placeholder::Id];
        check_placeholders("output.filename", &output.filename, &chunk_allowed)?;
        check_placeholders(
            "output.chunkFilename",
            &output.chunk_filename(),
            &chunk_allowed,
        )?;
        check_placeholders(
            "output.sourceMapFilename",
            &output.source_map_filename,
            &[Placeholder::File, Placeholder::Name, Placeholder::Id],
        )?;

        if !output.chunk_filename().contains(Placeholder::Name)
            && !output.chunk_filename().contains(Placeholder::Id)
        {
            return Err(ConfigError::schema(
                format!("output.chunkFilename '{}' is static", output.chunk_filename()),
                "Every chunk would be written to the same file; add [id] or [name]",
            ));
        }

        // Two entries rendering to one path would overwrite each other.
        let mut seen: HashMap<String, &str> = HashMap::new();
        for (id, name) in config.entry.names().enumerate() {
            let ctx = RenderContext {
                name: Some(name),
                id: Some(id),
                ..Default::default()
            };
            let path = output.filename.render(&ctx);
            if let Some(first) = seen.insert(path.clone(), name) {
                return Err(ConfigError::OutputCollision {
                    path,
                    first: first.to_string(),
                    second: name.to_string(),
                });
            }
        }
        Ok(())
    }

    fn validate_cache_groups(&self, config: &WeftConfig) -> Result<()> {
        let groups: Vec<_> = config.optimization.split_chunks.cache_groups.iter().collect();
        for (i, (first, a)) in groups.iter().enumerate() {
            if a.min_chunks == 0 {
                return Err(ConfigError::schema(
                    format!("cache group '{first}' has minChunks 0"),
                    "minChunks must be at least 1",
                ));
            }
            for (second, b) in &groups[i + 1..] {
                if a.priority == b.priority && a.test == b.test && a.chunks == b.chunks {
                    return Err(ConfigError::AmbiguousCacheGroups {
                        first: first.to_string(),
                        second: second.to_string(),
                        priority: a.priority,
                    });
                }
            }
        }
        Ok(())
    }
}

impl ConfigValidator for SchemaValidator {
    fn validate(&self, config: &WeftConfig) -> Result<()> {
        self.validate_entries(config)?;
        self.validate_rules(config)?;
        self.validate_plugins(config)?;
        self.validate_output(config)?;
        self.validate_cache_groups(config)?;
        Ok(())
    }
}

fn check_placeholders(
    field: &str,
    template: &FileNameTemplate,
    allowed: &[Placeholder],
) -> Result<()> {
    for placeholder in template.placeholders() {
        match placeholder {
            Ok(p) if allowed.contains(&p) => {}
            Ok(p) => {
                return Err(ConfigError::schema(
                    format!("{field} '{template}' uses {} which is not available here", p.token()),
                    format!(
                        "Allowed placeholders: {}",
                        allowed.iter().map(|p| p.token()).collect::<Vec<_>>().join(", ")
                    ),
                ));
            }
            Err(token) => {
                return Err(ConfigError::schema(
                    format!("{field} '{template}' uses unsupported placeholder {token}"),
                    "Supported placeholders are [name], [id], [file] and [ext]",
                ));
            }
        }
    }
    Ok(())
}

/// Filesystem validator (for CLI use)
///
/// Runs schema validation, then checks that every entry exists on disk.
///
/// # Example
///
/// ```no_run
/// use weft_config::{ConfigValidator, EntryMap, FsValidator, WeftConfig};
///
/// let mut config = WeftConfig::default();
/// config.entry = EntryMap::new().with("main", "./src/js/index.js");
///
/// FsValidator::new(".").validate(&config).unwrap();
/// ```
pub struct FsValidator {
    root: PathBuf,
    schema: SchemaValidator,
}

impl FsValidator {
    /// Create a new filesystem validator with a root directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            schema: SchemaValidator::default(),
        }
    }

    pub fn with_schema(mut self, schema: SchemaValidator) -> Self {
        self.schema = schema;
        self
    }
}

impl ConfigValidator for FsValidator {
    fn validate(&self, config: &WeftConfig) -> Result<()> {
        // First run schema validation
        self.schema.validate(config)?;

        // Then validate filesystem references
        let context = config.context_dir(&self.root);
        for (name, entry) in config.entry.iter() {
            let path = context.join(entry);
            if !path.is_file() {
                return Err(ConfigError::EntryNotFound {
                    name: name.to_string(),
                    path,
                });
            }
        }

        Ok(())
    }
}

/// Convenience function for schema-only validation
pub fn validate_schema(config: &WeftConfig) -> Result<()> {
    SchemaValidator::default().validate(config)
}

/// Convenience function for filesystem validation
pub fn validate_fs(config: &WeftConfig, root: impl AsRef<Path>) -> Result<()> {
    FsValidator::new(root).validate(config)
}
