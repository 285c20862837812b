//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate identity, ownership, composition and execution per request.
//! - Keep hosting layers decoupled from storage details.

pub mod location_service;
