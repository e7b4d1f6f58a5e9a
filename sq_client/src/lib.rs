//! Internal modules for the Study Quest client.
//!
//! This library provides the API client, credential storage, session
//! state, command parsing and the views used by the sq_client binary.

pub mod api_client;
pub mod cli;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod logging;
pub mod render;
pub mod session;
pub mod tui_app;
