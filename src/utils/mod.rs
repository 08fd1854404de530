//! # Utility Modules
//!
//! This module contains constants, env-derived settings and small helpers used
//! throughout the Flinkly service.
//!
//! ## Available Utilities
//!
//! - **Constants** (`constant`) - Fixed limits, token sizes and lifetimes
//! - **Secrets** (`secret`) - Reading secrets from files or environment variables
//! - **Static objects** (`static_object`) - Lazily loaded, env-configurable settings

pub mod constant;
pub mod secret;
pub mod static_object;
