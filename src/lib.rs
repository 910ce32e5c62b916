//! # Cassandra Rust Client
//!
//! An async Rust client for Cassandra-style column stores over gRPC.
//!
//! ## Overview
//!
//! This crate provides a typed API over the column store's RPC service:
//! - Session setup (login, keyspace selection)
//! - Single column and super column reads and writes
//! - Slice, range and secondary-index reads
//! - Schema management (keyspaces and column families)
//! - Cluster metadata (name, version, token ring)
//! - Batch mutations, merging columns bound for the same super column
//!
//! ## Example
//!
//! ```rust,no_run
//! use cassandra_client::{CassandraClient, ClientConfig, ColumnInsert, SuperColumnInsert};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new("localhost", 9160).with_keyspace("app");
//!     let client = CassandraClient::connect(config).await?;
//!
//!     client
//!         .batch_insert(
//!             vec![ColumnInsert::new("users", "u1", "email", "a@x.com")],
//!             vec![
//!                 SuperColumnInsert::new("logs", "u1", "2024", "msg", "login"),
//!                 SuperColumnInsert::new("logs", "u1", "2024", "ip", "1.2.3.4"),
//!             ],
//!             None, // QUORUM
//!         )
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod proto {
    #![allow(clippy::all)] // Suppress warnings in generated code
    tonic::include_proto!("cassandra");
}

pub mod mutation;
pub mod timestamp;
mod client;
mod config;
mod error;
mod query;
mod schema;
mod types;

pub use client::*;
pub use config::*;
pub use error::*;
pub use mutation::{
    build_mutations, ColumnInsert, Mutation, MutationBatch, MutationBatchBuilder, MutationSubmitter, MutationsMap,
    SuperColumnInsert,
};
pub use query::*;
pub use schema::*;
pub use types::*;
