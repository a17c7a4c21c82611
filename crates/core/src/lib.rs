//! Pharmanet Core - Shared types library.
//!
//! This crate provides common types used across all Pharmanet components:
//! - `portal` - Server-rendered site for employers, pharmacists, and admins
//! - `cli` - Command-line tools for migrations and deploy checks
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and emails, plus the
//!   role/user-type vocabulary the access rules are written in

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
