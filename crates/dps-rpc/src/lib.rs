// Path: crates/dps-rpc/src/lib.rs
//! gRPC transport for the Index Reader contract (`spec.md` §4.5/§4.6):
//! [`server::RpcServer`] exposes an `Arc<dyn IndexReader>` over the wire,
//! [`client::RpcClientIndex`] implements `IndexReader` against a remote one.

pub mod client;
pub mod server;

/// Generated protobuf/tonic types for `dps.index.v1`.
pub mod pb {
    tonic::include_proto!("dps.index.v1");
}

pub use client::RpcClientIndex;
pub use server::{run_server, RpcServer, RpcServerConfig};
