pub mod action;
pub mod completions;
pub mod man;
