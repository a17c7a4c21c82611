//! Pharmanet Portal library.
//!
//! This crate provides the portal functionality as a library,
//! allowing it to be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod guard;
pub mod middleware;
pub mod models;
pub mod platform;
pub mod routes;
pub mod state;
