use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::build::helpers::{
    default_filename, default_output_path, default_public_path, default_source_map_filename,
};

/// Output naming and location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSpec {
    /// Directory every artifact is emitted into
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    /// Template for entry bundles
    #[serde(default = "default_filename")]
    pub filename: FileNameTemplate,

    /// Template for non-entry chunks (defaults to `[id].js`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_filename: Option<FileNameTemplate>,

    /// Template for source maps emitted through `devtool`
    #[serde(default = "default_source_map_filename")]
    pub source_map_filename: FileNameTemplate,

    /// Base URL artifacts are served from
    #[serde(default = "default_public_path")]
    pub public_path: String,
}

impl OutputSpec {
    pub fn chunk_filename(&self) -> FileNameTemplate {
        self.chunk_filename
            .clone()
            .unwrap_or_else(|| FileNameTemplate::from("[id].js"))
    }
}

impl Default for OutputSpec {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            filename: default_filename(),
            chunk_filename: None,
            source_map_filename: default_source_map_filename(),
            public_path: default_public_path(),
        }
    }
}

/// Placeholders understood in file name templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// Chunk or entry name (falls back to the id for unnamed chunks)
    Name,
    /// Numeric chunk id
    Id,
    /// Path of the artifact a source map belongs to
    File,
    /// Extension of a static asset, without the dot
    Ext,
}

impl Placeholder {
    pub fn token(self) -> &'static str {
        match self {
            Placeholder::Name => "[name]",
            Placeholder::Id => "[id]",
            Placeholder::File => "[file]",
            Placeholder::Ext => "[ext]",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "[name]" => Some(Placeholder::Name),
            "[id]" => Some(Placeholder::Id),
            "[file]" => Some(Placeholder::File),
            "[ext]" => Some(Placeholder::Ext),
            _ => None,
        }
    }
}

/// Values substituted into a [`FileNameTemplate`].
#[derive(Debug, Default, Clone, Copy)]
pub struct RenderContext<'a> {
    pub name: Option<&'a str>,
    pub id: Option<usize>,
    pub file: Option<&'a str>,
    pub ext: Option<&'a str>,
}

/// A file name with `[placeholder]` tokens, e.g. `[name].js` or `[file].map`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileNameTemplate(String);

impl FileNameTemplate {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Every `[token]` in the template, in order of appearance.
    ///
    /// Tokens that are not known placeholders are returned as `Err(token)`.
    pub fn placeholders(&self) -> Vec<Result<Placeholder, String>> {
        let mut found = Vec::new();
        let mut rest = self.0.as_str();
        while let Some(start) = rest.find('[') {
            let Some(len) = rest[start..].find(']') else {
                break;
            };
            let token = &rest[start..start + len + 1];
            found.push(Placeholder::from_token(token).ok_or_else(|| token.to_string()));
            rest = &rest[start + len + 1..];
        }
        found
    }

    pub fn contains(&self, placeholder: Placeholder) -> bool {
        self.0.contains(placeholder.token())
    }

    /// Substitute the placeholders that have a value in `ctx`.
    ///
    /// `[name]` falls back to the id when no name is given.
    ///
    /// ```
    /// use weft_config::{FileNameTemplate, RenderContext};
    ///
    /// let template = FileNameTemplate::from("[name].js");
    /// let ctx = RenderContext { name: Some("main"), id: Some(0), ..Default::default() };
    /// assert_eq!(template.render(&ctx), "main.js");
    ///
    /// let unnamed = RenderContext { id: Some(3), ..Default::default() };
    /// assert_eq!(template.render(&unnamed), "3.js");
    /// ```
    pub fn render(&self, ctx: &RenderContext<'_>) -> String {
        let id = ctx.id.map(|id| id.to_string());
        let mut out = self.0.clone();
        if let Some(name) = ctx.name.or(id.as_deref()) {
            out = out.replace(Placeholder::Name.token(), name);
        }
        if let Some(id) = &id {
            out = out.replace(Placeholder::Id.token(), id);
        }
        if let Some(file) = ctx.file {
            out = out.replace(Placeholder::File.token(), file);
        }
        if let Some(ext) = ctx.ext {
            out = out.replace(Placeholder::Ext.token(), ext);
        }
        out
    }
}

impl From<&str> for FileNameTemplate {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for FileNameTemplate {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for FileNameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
