pub mod completions;
pub mod config;
pub mod context;
pub mod place;
pub mod score;
pub mod simulate;
pub mod watch;
