//! Core resolution logic.

pub mod catalog;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod reference;
pub mod types;
