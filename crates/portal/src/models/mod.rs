//! Session-stored state for the portal.
//!
//! Deliberately small: the platform owns users, entities, and business data,
//! so the portal's only persistent state is the session rows that
//! tower-sessions manages.

pub mod session;

pub use session::keys as session_keys;
