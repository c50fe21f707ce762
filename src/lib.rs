#![deny(missing_docs, unsafe_code)]
#![cfg_attr(feature = "doc", feature(doc_cfg))]
//! A Rust crate for talking to ABCI applications.
//!
//! ## ABCI Overview
//!
//! ABCI is the interface between Tendermint (a state-machine replication engine) and your application (the actual state
//! machine). It consists of a set of methods, where each method has a corresponding `Request` and `Response` message type.
//! Tendermint calls the ABCI methods on the ABCI application by sending the `Request` messages and receiving the `Response`
//! messages in return.
//!
//! This crate implements the calling side of that interface: an ABCI [`Client`] which sends requests to an ABCI
//! application (server) and hands back its responses.
//!
//! ## Usage
//!
//! Add `abci-client` in your `Cargo.toml`'s `dependencies` section:
//!
//! ```toml
//! [dependencies]
//! abci-client = "0.1"
//! ```
//!
//! Create a client with [`new_client`] (or [`ClientConfig`]) and call ABCI methods on it. Every method comes in two
//! flavours:
//!
//! - `*_async` methods (e.g., [`Client::check_tx_async`]) dispatch the request and immediately return a [`ReqRes`]. The
//!   response can be awaited with [`ReqRes::wait`] or observed with a callback ([`ReqRes::set_callback`] for one
//!   request, [`Client::set_response_callback`] for all of them).
//! - `*_sync` methods (e.g., [`Client::commit_sync`]) dispatch the request and wait for its response, until the given
//!   [`Context`] is cancelled or its deadline passes.
//!
//! ```no_run
//! use abci_client::{new_client, Context};
//!
//! # async fn run() -> abci_client::Result<()> {
//! let client = new_client("tcp://127.0.0.1:26658", "socket", true).await?;
//!
//! let echo = client.echo_sync(&Context::background(), "hello").await?;
//! assert_eq!(echo.message, "hello");
//! # Ok(())
//! # }
//! ```
//!
//! Responses are always delivered in the order in which requests were dispatched. Errors returned by the client are
//! transport errors; once [`Client::error`] returns an error, the client is stopped and has to be recreated.
//! Application errors are reported inside responses through ABCI error codes and logs.
//!
//! [`ReqRes::wait`] does not return if the client stops first; [`Client::wait`] does.
//!
//! Client tasks are spawned on the ambient `tokio` runtime.
//!
//! ### Features
//!
//! - `grpc`: Enables the gRPC transport (using `tonic`)
//!   - **Enabled** by default.
//!
//! ## Supported Versions
//!
//! - Tendermint v0.34
mod address;
mod context;
mod error;
mod req_res;
mod stream_split;
mod utils;

pub mod client;
pub mod types;


/// Utility macro for implementing [`Client`] trait for custom transports.
pub use async_trait::async_trait;

pub use self::address::Address;
pub use self::client::{new_client, Client, ClientConfig, ResponseCallback, Transport};
pub use self::context::Context;
pub use self::error::{Error, Result};
pub use self::req_res::{ReqRes, ReqResCallback};
