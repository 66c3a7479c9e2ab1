//! Configuration resolution: deep merge of defaults and overrides, then derivation of
//! networking fields from the merged map and host facts.
//!
//! Both steps are pure. Host introspection happens before resolution (see
//! [`crate::facts`]) so a missing loopback address fails the run up front.

mod deep_merge;
mod derived;

pub use deep_merge::{deep_merge, resolve, ResolvedConfig};
pub use derived::{derive_fields, DerivedFields, DEFAULT_RPC_PORT};
