use clap::ValueEnum;

/// Serialization format of `weft print`
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, ValueEnum)]
pub enum PrintFormat {
    /// Pretty-printed JSON, as in `weft.json`
    #[default]
    #[value(name = "json")]
    Json,

    /// TOML, as in `weft.toml`
    #[value(name = "toml")]
    Toml,
}
