//! API module
//!
//! Contains the HTTP request handlers for the gateway endpoints

pub mod chat;
pub mod generate;
