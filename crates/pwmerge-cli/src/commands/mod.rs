pub mod completions;
pub mod export;
pub mod merge;
