//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the library use-case API.
//! - Keep callers decoupled from storage details.

pub mod library_service;
