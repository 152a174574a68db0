// src/lib.rs

pub mod analyze;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod normalize;
pub mod render;
pub mod task;

pub use error::{Error, Result};
