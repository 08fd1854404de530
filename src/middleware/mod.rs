//! # Middleware Components
//!
//! This module contains middleware functions that handle cross-cutting concerns
//! such as request forgery protection.

pub mod csrf;

pub use csrf::csrf_middleware;
