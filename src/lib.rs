//! In-memory kanban board library
//!
//! This module exports the board model, the controller that owns it, and the
//! progressive reveal machinery, for the driver binary and for tests.

pub mod board;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod format;
pub mod intent;
pub mod loader;
pub mod logging;
pub mod replay;
pub mod scheduler;
pub mod transfer;
pub mod types;
pub mod viewport;
