pub mod commands;
pub mod context;
pub mod feedback;
pub mod logging;
pub mod repl;
pub mod view;

pub use context::{CliContext, SessionPaths};
pub use repl::readline;
