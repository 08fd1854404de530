//! # Business Logic Services
//!
//! This module contains the core business logic services for the Flinkly service.
//! Services encapsulate domain-specific functionality and provide clean interfaces
//! for use by HTTP handlers and middleware.
//!
//! ## Available Services
//!
//! - **Catalog** (`catalog`) - Gig storage with in-memory and PostgreSQL backends
//! - **CSRF** (`csrf`) - Stateless anti-forgery token minting and verification
//! - **Recommendation** (`recommendation`) - Similar and trending gig ranking

pub mod catalog;
pub mod csrf;
pub mod recommendation;
