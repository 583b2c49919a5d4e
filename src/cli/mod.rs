//! CLI infrastructure for the tilemind trainer
//!
//! Training, greedy evaluation and value-table inspection.

pub mod commands;
pub mod config;
pub mod output;
