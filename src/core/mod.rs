//! Core types shared by the translation pipeline

pub mod config;
pub mod endpoint_cache;
pub mod errors;
pub mod models;
