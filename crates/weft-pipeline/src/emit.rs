//! Artifact naming and emission.
//!
//! Entry chunks are named through `output.filename`, every other chunk
//! through `output.chunkFilename`. Files handled by file-loader (or by
//! url-loader above its limit) are named through the processor's `name`
//! option, `[name].[ext]` by default.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use weft_config::{Devtool, FileNameTemplate, OutputSpec, RenderContext};

use crate::chunks::{Chunk, ChunkKind};
use crate::error::{PipelineError, Result};
use crate::plan::PlannedModule;

/// Template used for emitted files when the processor sets no `name`.
pub const DEFAULT_ASSET_NAME: &str = "[name].[ext]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    Script,
    Stylesheet,
    Asset,
    SourceMap,
}

/// Where the source map of an artifact lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "path", rename_all = "lowercase")]
pub enum SourceMapRef {
    /// Separate `.map` artifact
    File(String),
    /// Embedded in the artifact as a data URL
    Inline,
}

/// One file the engine writes into the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Path relative to the output directory
    pub path: String,
    pub kind: ArtifactKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modules: Vec<PathBuf>,
    /// Size estimated from source bytes
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_map: Option<SourceMapRef>,
    /// Artifact a source map describes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_of: Option<String>,
    /// External processor that minifies this artifact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minified_by: Option<String>,
}

impl Artifact {
    pub fn new(path: impl Into<String>, kind: ArtifactKind) -> Self {
        Self {
            path: path.into(),
            kind,
            chunk: None,
            modules: Vec::new(),
            size: 0,
            source_map: None,
            map_of: None,
            minified_by: None,
        }
    }

    /// Label used when reporting collisions.
    pub fn owner(&self) -> String {
        match (&self.kind, self.chunk, &self.map_of) {
            (ArtifactKind::SourceMap, _, Some(of)) => format!("source map of {of}"),
            (_, Some(chunk), _) => format!("{:?} of chunk {chunk}", self.kind).to_lowercase(),
            _ => match self.modules.first() {
                Some(module) => format!("asset {}", module.display()),
                None => self.path.clone(),
            },
        }
    }
}

pub struct Emitter<'a> {
    output: &'a OutputSpec,
    devtool: &'a Devtool,
}

impl<'a> Emitter<'a> {
    pub fn new(output: &'a OutputSpec, devtool: &'a Devtool) -> Self {
        Self { output, devtool }
    }

    /// File name of a chunk's script bundle.
    pub fn chunk_file(&self, chunk: &Chunk) -> String {
        let name = chunk.display_name();
        let ctx = RenderContext {
            name: Some(&name),
            id: Some(chunk.id),
            ..Default::default()
        };
        match chunk.kind {
            ChunkKind::Entry => self.output.filename.render(&ctx),
            ChunkKind::Async | ChunkKind::Shared => self.output.chunk_filename().render(&ctx),
        }
    }

    /// One script artifact per chunk, sized from the modules it bundles.
    pub fn emit_chunks(&self, chunks: &[Chunk], modules: &[PlannedModule]) -> Vec<Artifact> {
        let sizes: FxHashMap<&Path, u64> = modules
            .iter()
            .map(|m| (m.path.as_path(), if m.delivery.in_script() { m.size } else { 0 }))
            .collect();

        chunks
            .iter()
            .map(|chunk| {
                let mut artifact = Artifact::new(self.chunk_file(chunk), ArtifactKind::Script);
                artifact.chunk = Some(chunk.id);
                artifact.modules = chunk.modules.clone();
                artifact.size = chunk
                    .modules
                    .iter()
                    .map(|m| sizes.get(m.as_path()).copied().unwrap_or(0))
                    .sum();
                artifact
            })
            .collect()
    }

    /// Emitted file for a module delivered as a separate file.
    pub fn emit_asset(&self, module: &PlannedModule, name: Option<&str>) -> Artifact {
        let template = FileNameTemplate::from(name.unwrap_or(DEFAULT_ASSET_NAME));
        let mut artifact = Artifact::new(render_asset_name(&template, &module.path), ArtifactKind::Asset);
        artifact.modules = vec![module.path.clone()];
        artifact.size = module.size;
        artifact
    }

    /// Source maps requested through `devtool`, for script artifacts.
    pub fn emit_devtool_maps(&self, artifacts: &mut Vec<Artifact>) {
        if self.devtool.is_disabled() {
            return;
        }
        let inline = !self.devtool.emits_map_files();
        let mut maps = Vec::new();
        for artifact in artifacts.iter_mut().filter(|a| a.kind == ArtifactKind::Script) {
            if inline {
                artifact.source_map = Some(SourceMapRef::Inline);
                continue;
            }
            let ctx = RenderContext {
                file: Some(&artifact.path),
                id: artifact.chunk,
                ..Default::default()
            };
            let path = self.output.source_map_filename.render(&ctx);
            artifact.source_map = Some(SourceMapRef::File(path.clone()));
            let mut map = Artifact::new(path, ArtifactKind::SourceMap);
            map.map_of = Some(artifact.path.clone());
            map.chunk = artifact.chunk;
            maps.push(map);
        }
        artifacts.extend(maps);
    }
}

/// Render an asset template for `path`: `[name]` is the file stem, `[ext]`
/// the extension without the dot.
pub fn render_asset_name(template: &FileNameTemplate, path: &Path) -> String {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    template.render(&RenderContext {
        name: Some(stem),
        ext: Some(ext),
        ..Default::default()
    })
}

/// Fail when two artifacts would be written to the same path.
pub fn check_collisions(artifacts: &[Artifact]) -> Result<()> {
    let mut seen: FxHashMap<&str, &Artifact> = FxHashMap::default();
    for artifact in artifacts {
        if let Some(first) = seen.insert(artifact.path.as_str(), artifact) {
            return Err(PipelineError::OutputCollision {
                path: artifact.path.clone(),
                first: first.owner(),
                second: artifact.owner(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ModuleKind;
    use crate::plan::Delivery;

    fn chunk(id: usize, name: Option<&str>, kind: ChunkKind, modules: &[&str]) -> Chunk {
        Chunk {
            id,
            name: name.map(str::to_string),
            kind,
            initial: kind == ChunkKind::Entry,
            modules: modules.iter().map(PathBuf::from).collect(),
            parents: Vec::new(),
            cache_group: None,
        }
    }

    fn module(path: &str, size: u64, delivery: Delivery) -> PlannedModule {
        PlannedModule {
            path: PathBuf::from(path),
            kind: ModuleKind::from_path(Path::new(path)),
            size,
            transform: None,
            style: None,
            delivery,
            chunks: vec![0],
            dependencies: Vec::new(),
        }
    }

    #[test]
    fn entry_and_async_chunks_use_their_templates() {
        let output = OutputSpec::default();
        let devtool = Devtool::Disabled;
        let emitter = Emitter::new(&output, &devtool);

        assert_eq!(emitter.chunk_file(&chunk(0, Some("main"), ChunkKind::Entry, &[])), "main.js");
        assert_eq!(emitter.chunk_file(&chunk(3, None, ChunkKind::Async, &[])), "3.js");
        assert_eq!(
            emitter.chunk_file(&chunk(4, Some("vendors~1"), ChunkKind::Shared, &[])),
            "4.js"
        );
    }

    #[test]
    fn script_size_counts_bundled_modules_only() {
        let output = OutputSpec::default();
        let devtool = Devtool::Disabled;
        let modules = vec![
            module("src/index.js", 100, Delivery::Bundled),
            module("src/logo.png", 5000, Delivery::Emitted),
            module("src/main.scss", 40, Delivery::Extracted),
        ];
        let chunks = vec![chunk(
            0,
            Some("main"),
            ChunkKind::Entry,
            &["src/index.js", "src/logo.png", "src/main.scss"],
        )];

        let artifacts = Emitter::new(&output, &devtool).emit_chunks(&chunks, &modules);
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].size, 100);
    }

    #[test]
    fn assets_default_to_name_and_extension() {
        let output = OutputSpec::default();
        let devtool = Devtool::Disabled;
        let emitter = Emitter::new(&output, &devtool);

        let logo = module("src/img/logo.png", 10, Delivery::Emitted);
        assert_eq!(emitter.emit_asset(&logo, None).path, "logo.png");
        assert_eq!(
            emitter.emit_asset(&logo, Some("images/[name].[ext]")).path,
            "images/logo.png"
        );
    }

    #[test]
    fn devtool_source_map_adds_map_files() {
        let output = OutputSpec::default();
        let devtool = Devtool::Named("source-map".into());
        let mut artifacts = vec![Artifact {
            chunk: Some(0),
            ..Artifact::new("main.js", ArtifactKind::Script)
        }];

        Emitter::new(&output, &devtool).emit_devtool_maps(&mut artifacts);
        assert_eq!(artifacts.len(), 2);
        assert_eq!(artifacts[1].path, "main.js.map");
        assert_eq!(artifacts[0].source_map, Some(SourceMapRef::File("main.js.map".into())));
    }

    #[test]
    fn inline_devtool_adds_no_files() {
        let output = OutputSpec::default();
        let devtool = Devtool::Named("inline-source-map".into());
        let mut artifacts = vec![Artifact::new("main.js", ArtifactKind::Script)];

        Emitter::new(&output, &devtool).emit_devtool_maps(&mut artifacts);
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].source_map, Some(SourceMapRef::Inline));
    }

    #[test]
    fn collisions_name_both_owners() {
        let mut first = Artifact::new("logo.png", ArtifactKind::Asset);
        first.modules = vec![PathBuf::from("src/a/logo.png")];
        let mut second = Artifact::new("logo.png", ArtifactKind::Asset);
        second.modules = vec![PathBuf::from("src/b/logo.png")];

        match check_collisions(&[first, second]).unwrap_err() {
            PipelineError::OutputCollision { path, first, second } => {
                assert_eq!(path, "logo.png");
                assert_eq!(first, "asset src/a/logo.png");
                assert_eq!(second, "asset src/b/logo.png");
            }
            other => panic!("expected OutputCollision, got {other:?}"),
        }
    }
}
