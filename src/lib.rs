//! # GH Archive Day Documents
//!
//! Reads an hourly GH Archive partition, flattens each event into a normalized
//! row, and re-nests the rows into per-day documents for display or storage.

pub mod aggregation;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod normalization;
pub mod pipeline;
pub mod repositories;
pub mod sink;
pub mod source;
pub mod telemetry;
pub use migration;
