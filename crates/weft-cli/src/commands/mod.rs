//! Command implementations for the weft CLI.
//!
//! - [`check`] - Configuration validation
//! - [`plan`] - Build planning
//! - [`print`] - Normalized configuration output
//! - [`init`] - Preset scaffolding
//!
//! Each command provides an `execute` function taking its parsed arguments.

pub mod check;
pub mod init;
pub mod plan;
pub mod print;
pub(crate) mod utils;

pub use check::execute as check_execute;
pub use init::execute as init_execute;
pub use plan::execute as plan_execute;
pub use print::execute as print_execute;
