pub mod completions;
pub mod portfolio;
pub mod serve;
