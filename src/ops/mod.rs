//! the user-facing operations

mod fetch;
mod generate;

pub use fetch::{fetch, fetch_from, FetchFailure, FetchOptions, FetchReport};
pub use generate::{generate, generate_with_filter, GenerateOptions, GenerateReport};
