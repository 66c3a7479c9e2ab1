//! Derived fields: values computed from the resolved config plus host facts.

use crate::facts::HostFacts;
use crate::resolver::ResolvedConfig;
use crate::value::lookup;
use serde::{Deserialize, Serialize};

/// RPC port used when `ports.rpc` is not set.
pub const DEFAULT_RPC_PORT: u16 = 8400;

/// Settings computed from the resolved config; never written to the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedFields {
    pub data_dir: Option<String>,
    pub rpc_port: u16,
    pub rpc_addr: String,
}

/// Derive `data_dir`, `rpc_port` and `rpc_addr`.
///
/// Each field is an independent lookup chain; the first present value wins. A key
/// holding a value of the wrong kind counts as absent.
pub fn derive_fields(resolved: &ResolvedConfig, facts: &HostFacts) -> DerivedFields {
    let map = resolved.as_map();

    let data_dir = lookup(map, &["data_dir"])
        .and_then(|v| v.as_str())
        .map(str::to_string);

    let rpc_port = lookup(map, &["ports", "rpc"])
        .and_then(|v| v.as_int())
        .and_then(|port| u16::try_from(port).ok())
        .filter(|port| *port != 0)
        .unwrap_or(DEFAULT_RPC_PORT);

    let rpc_addr = lookup(map, &["addresses", "rpc"])
        .and_then(|v| v.as_str())
        .or_else(|| lookup(map, &["client_addr"]).and_then(|v| v.as_str()))
        .map(str::to_string)
        .unwrap_or_else(|| facts.loopback_address.to_string());

    DerivedFields {
        data_dir,
        rpc_port,
        rpc_addr,
    }
}
