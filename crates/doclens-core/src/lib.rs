//! Core doclens library (config, logging, Gemini provider, session controller).

pub mod config;
pub mod files;
pub mod logging;
pub mod providers;
pub mod service;
pub mod session;
