//! # HTTP Request Handlers
//!
//! This module contains all HTTP request handlers for the Flinkly service.
//! Each handler is responsible for processing specific HTTP requests and returning
//! appropriate responses.
//!
//! ## Available Handlers
//!
//! - **Gigs** (`gigs`) - Catalog lookups, publishing, similar and trending gigs
//! - **Health Check** (`health_check`) - Application health monitoring

mod gigs;
mod health_check;

pub use gigs::*;
pub use health_check::*;
