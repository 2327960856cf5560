//! Command implementations

pub mod info;

pub mod validate;
