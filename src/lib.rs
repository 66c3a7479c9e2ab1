//! clusterconf: Cluster Agent Configuration Rendering
//!
//! Resolves a cluster agent's configuration by deep-merging user overrides over
//! defaults, derives networking fields (RPC port and address) from the result and
//! host facts, renders it to a JSON config file, and notifies the agent's service
//! when the file changes.

pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod facts;
pub mod logging;
pub mod provision;
pub mod render;
pub mod resolver;
pub mod service;
pub mod value;
