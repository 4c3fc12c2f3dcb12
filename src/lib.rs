pub mod catalog;
pub mod cli;
pub mod pipeline;
pub mod schema;
pub mod store;

pub use cli::{Cli, Commands};
