use std::path::PathBuf;

use crate::build::output::FileNameTemplate;

// Helper defaults
pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_output_path() -> PathBuf {
    PathBuf::from("dist")
}

pub(crate) fn default_filename() -> FileNameTemplate {
    FileNameTemplate::from("[name].js")
}

pub(crate) fn default_source_map_filename() -> FileNameTemplate {
    FileNameTemplate::from("[file].map")
}

pub(crate) fn default_public_path() -> String {
    "/".to_string()
}

pub(crate) fn default_max_asset_size() -> u64 {
    250_000
}

pub(crate) fn default_min_chunks() -> usize {
    1
}

pub(crate) fn default_css_filename() -> FileNameTemplate {
    FileNameTemplate::from("[name].css")
}

pub(crate) fn default_css_chunk_filename() -> FileNameTemplate {
    FileNameTemplate::from("[id].css")
}

pub(crate) fn default_css_asset_pattern() -> crate::Pattern {
    crate::Pattern::new(r"\.css$").expect("static pattern is valid")
}

pub(crate) fn default_css_processor() -> String {
    "cssnano".to_string()
}
