//! CLI command implementations.

pub mod locations;
pub mod search;

pub use locations::LocationsCommand;
pub use search::{SearchCommand, SearchOptions, SearchOutcome};
