//! Settings merge: built-in defaults and source precedence.

pub mod agent_maps;
pub mod merge_policy;
