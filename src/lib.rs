//! # Daily Poll Bot
//!
//! A Telegram bot that keeps track of the group chats it belongs to and sends
//! each one a scheduled daily poll.
//!
//! ## Features
//! - Tracks group membership from chat-member updates (join, leave, migration)
//! - Sends a fixed availability poll to every tracked group once a day
//! - Survives per-group delivery failures without skipping the rest of a run
//! - Persistent storage in a flat, diffable JSON file

/// Membership handlers, delivery layer, and dispatch wiring
pub mod bot;
/// Configuration management and environment variables
pub mod config;
/// Background services: the scheduled poll broadcast
pub mod services;
/// File-backed group store
pub mod storage;
/// Utility functions for message formatting
pub mod utils;
