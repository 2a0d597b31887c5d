//! CLI domain: parse, route, output, and presentation only.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{CheckFormat, Cli, Commands};
pub use presentation::{format_check_result, format_replay_result};
pub use route::RunContext;
