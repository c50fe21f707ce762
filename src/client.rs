//! ABCI client API
mod config;
#[cfg(feature = "grpc")]
mod grpc;
mod socket;
mod state;

use std::sync::Arc;

use async_trait::async_trait;

pub use self::config::{new_client, ClientConfig, Transport};
#[cfg(feature = "grpc")]
#[cfg_attr(feature = "doc", doc(cfg(feature = "grpc")))]
pub use self::grpc::{GrpcClient, ECHO_RETRY_INTERVAL};
pub use self::socket::{SocketClient, DIAL_RETRY_INTERVAL};
use crate::{
    context::Context,
    error::{Error, Result},
    req_res::ReqRes,
    types::*,
};

/// Callback invoked with every completed request and its response
pub type ResponseCallback = Arc<dyn Fn(&Request, &Response) + Send + Sync>;

macro_rules! response_value {
    ($response: expr, $variant: ident) => {
        match $response.value {
            Some(ResponseValue::$variant(response)) => Ok(response),
            other => Err(unexpected_response(Method::$variant, other)),
        }
    };
}

/// ABCI client
///
/// Every ABCI method is available in two flavours:
///
/// - `*_async` methods queue the request and return a [`ReqRes`] right away, without waiting for the
///   response. They only fail when the request cannot be dispatched (e.g., the client is stopped).
/// - `*_sync` methods call their `*_async` counterpart and then [`wait`](Client::wait) for the
///   response, until the given [`Context`] is cancelled.
///
/// Errors returned by these methods are client errors (connectivity issues, protocol violations).
/// Application errors are reported inside responses through ABCI error codes and logs.
///
/// Responses are delivered in the order in which requests were dispatched.
#[async_trait]
pub trait Client: Send + Sync {
    /// Queues `request` and returns its [`ReqRes`]
    fn send_async(&self, request: Request) -> Result<Arc<ReqRes>>;

    /// Waits for `req_res` to complete
    ///
    /// Returns the cancellation error of `ctx` if it is done first, or the client's error if the
    /// client stops first. In both cases the request stays in flight.
    async fn wait(&self, ctx: &Context, req_res: &ReqRes) -> Result<Response>;

    /// Replaces the callback invoked for every completed request
    fn set_response_callback(&self, callback: ResponseCallback);

    /// Returns the sticky transport error, if any
    ///
    /// Once an error is returned the client is unusable and has to be recreated.
    fn error(&self) -> Option<Error>;

    /// Returns `false` once the client is stopped
    fn is_running(&self) -> bool;

    /// Stops the client
    fn stop(&self);

    /// Signals that queued requests should be handed to the transport.
    fn flush_async(&self) -> Result<Arc<ReqRes>> {
        self.send_async(request(RequestValue::Flush(RequestFlush {})))
    }

    /// Echo a string to test an abci client/server implementation.
    fn echo_async(&self, message: &str) -> Result<Arc<ReqRes>> {
        self.send_async(request(RequestValue::Echo(RequestEcho {
            message: message.to_owned(),
        })))
    }

    /// Requests information about the application state.
    fn info_async(&self, info_request: RequestInfo) -> Result<Arc<ReqRes>> {
        self.send_async(request(RequestValue::Info(info_request)))
    }

    /// Delivers a transaction for execution in full.
    fn deliver_tx_async(&self, deliver_tx_request: RequestDeliverTx) -> Result<Arc<ReqRes>> {
        self.send_async(request(RequestValue::DeliverTx(deliver_tx_request)))
    }

    /// Checks a transaction before admitting it to the mempool.
    fn check_tx_async(&self, check_tx_request: RequestCheckTx) -> Result<Arc<ReqRes>> {
        self.send_async(request(RequestValue::CheckTx(check_tx_request)))
    }

    /// Queries the application for data at current or past height.
    fn query_async(&self, query_request: RequestQuery) -> Result<Arc<ReqRes>> {
        self.send_async(request(RequestValue::Query(query_request)))
    }

    /// Asks the application to persist its state.
    fn commit_async(&self) -> Result<Arc<ReqRes>> {
        self.send_async(request(RequestValue::Commit(RequestCommit {})))
    }

    /// Called once upon genesis.
    fn init_chain_async(&self, init_chain_request: RequestInitChain) -> Result<Arc<ReqRes>> {
        self.send_async(request(RequestValue::InitChain(init_chain_request)))
    }

    /// Signals the beginning of a new block.
    fn begin_block_async(&self, begin_block_request: RequestBeginBlock) -> Result<Arc<ReqRes>> {
        self.send_async(request(RequestValue::BeginBlock(begin_block_request)))
    }

    /// Signals the end of a block.
    fn end_block_async(&self, end_block_request: RequestEndBlock) -> Result<Arc<ReqRes>> {
        self.send_async(request(RequestValue::EndBlock(end_block_request)))
    }

    /// Lists available snapshots.
    fn list_snapshots_async(
        &self,
        list_snapshots_request: RequestListSnapshots,
    ) -> Result<Arc<ReqRes>> {
        self.send_async(request(RequestValue::ListSnapshots(list_snapshots_request)))
    }

    /// Offers a snapshot to the application.
    fn offer_snapshot_async(
        &self,
        offer_snapshot_request: RequestOfferSnapshot,
    ) -> Result<Arc<ReqRes>> {
        self.send_async(request(RequestValue::OfferSnapshot(offer_snapshot_request)))
    }

    /// Loads a snapshot chunk.
    fn load_snapshot_chunk_async(
        &self,
        load_snapshot_chunk_request: RequestLoadSnapshotChunk,
    ) -> Result<Arc<ReqRes>> {
        self.send_async(request(RequestValue::LoadSnapshotChunk(
            load_snapshot_chunk_request,
        )))
    }

    /// Applies a snapshot chunk.
    fn apply_snapshot_chunk_async(
        &self,
        apply_snapshot_chunk_request: RequestApplySnapshotChunk,
    ) -> Result<Arc<ReqRes>> {
        self.send_async(request(RequestValue::ApplySnapshotChunk(
            apply_snapshot_chunk_request,
        )))
    }

    /// Waits until every previously dispatched request has been handed to the transport.
    async fn flush_sync(&self, ctx: &Context) -> Result<()> {
        let req_res = self.flush_async()?;
        let response = self.wait(ctx, &req_res).await?;
        response_value!(response, Flush).map(|_| ())
    }

    /// Echo a string to test an abci client/server implementation.
    async fn echo_sync(&self, ctx: &Context, message: &str) -> Result<ResponseEcho> {
        let req_res = self.echo_async(message)?;
        let response = self.wait(ctx, &req_res).await?;
        response_value!(response, Echo)
    }

    /// Returns information about the application state.
    async fn info_sync(&self, ctx: &Context, info_request: RequestInfo) -> Result<ResponseInfo> {
        let req_res = self.info_async(info_request)?;
        let response = self.wait(ctx, &req_res).await?;
        response_value!(response, Info)
    }

    /// Executes a transaction in full.
    async fn deliver_tx_sync(
        &self,
        ctx: &Context,
        deliver_tx_request: RequestDeliverTx,
    ) -> Result<ResponseDeliverTx> {
        let req_res = self.deliver_tx_async(deliver_tx_request)?;
        let response = self.wait(ctx, &req_res).await?;
        response_value!(response, DeliverTx)
    }

    /// Checks a transaction before admitting it to the mempool.
    async fn check_tx_sync(
        &self,
        ctx: &Context,
        check_tx_request: RequestCheckTx,
    ) -> Result<ResponseCheckTx> {
        let req_res = self.check_tx_async(check_tx_request)?;
        let response = self.wait(ctx, &req_res).await?;
        response_value!(response, CheckTx)
    }

    /// Queries the application for data at current or past height.
    async fn query_sync(&self, ctx: &Context, query_request: RequestQuery) -> Result<ResponseQuery> {
        let req_res = self.query_async(query_request)?;
        let response = self.wait(ctx, &req_res).await?;
        response_value!(response, Query)
    }

    /// Persists the application state.
    async fn commit_sync(&self, ctx: &Context) -> Result<ResponseCommit> {
        let req_res = self.commit_async()?;
        let response = self.wait(ctx, &req_res).await?;
        response_value!(response, Commit)
    }

    /// Called once upon genesis.
    async fn init_chain_sync(
        &self,
        ctx: &Context,
        init_chain_request: RequestInitChain,
    ) -> Result<ResponseInitChain> {
        let req_res = self.init_chain_async(init_chain_request)?;
        let response = self.wait(ctx, &req_res).await?;
        response_value!(response, InitChain)
    }

    /// Signals the beginning of a new block.
    async fn begin_block_sync(
        &self,
        ctx: &Context,
        begin_block_request: RequestBeginBlock,
    ) -> Result<ResponseBeginBlock> {
        let req_res = self.begin_block_async(begin_block_request)?;
        let response = self.wait(ctx, &req_res).await?;
        response_value!(response, BeginBlock)
    }

    /// Signals the end of a block.
    async fn end_block_sync(
        &self,
        ctx: &Context,
        end_block_request: RequestEndBlock,
    ) -> Result<ResponseEndBlock> {
        let req_res = self.end_block_async(end_block_request)?;
        let response = self.wait(ctx, &req_res).await?;
        response_value!(response, EndBlock)
    }

    /// Lists available snapshots.
    async fn list_snapshots_sync(
        &self,
        ctx: &Context,
        list_snapshots_request: RequestListSnapshots,
    ) -> Result<ResponseListSnapshots> {
        let req_res = self.list_snapshots_async(list_snapshots_request)?;
        let response = self.wait(ctx, &req_res).await?;
        response_value!(response, ListSnapshots)
    }

    /// Offers a snapshot to the application.
    async fn offer_snapshot_sync(
        &self,
        ctx: &Context,
        offer_snapshot_request: RequestOfferSnapshot,
    ) -> Result<ResponseOfferSnapshot> {
        let req_res = self.offer_snapshot_async(offer_snapshot_request)?;
        let response = self.wait(ctx, &req_res).await?;
        response_value!(response, OfferSnapshot)
    }

    /// Loads a snapshot chunk.
    async fn load_snapshot_chunk_sync(
        &self,
        ctx: &Context,
        load_snapshot_chunk_request: RequestLoadSnapshotChunk,
    ) -> Result<ResponseLoadSnapshotChunk> {
        let req_res = self.load_snapshot_chunk_async(load_snapshot_chunk_request)?;
        let response = self.wait(ctx, &req_res).await?;
        response_value!(response, LoadSnapshotChunk)
    }

    /// Applies a snapshot chunk.
    async fn apply_snapshot_chunk_sync(
        &self,
        ctx: &Context,
        apply_snapshot_chunk_request: RequestApplySnapshotChunk,
    ) -> Result<ResponseApplySnapshotChunk> {
        let req_res = self.apply_snapshot_chunk_async(apply_snapshot_chunk_request)?;
        let response = self.wait(ctx, &req_res).await?;
        response_value!(response, ApplySnapshotChunk)
    }
}

fn unexpected_response(expected: Method, response_value: Option<ResponseValue>) -> Error {
    match response_value {
        None => Error::EmptyResponse,
        Some(ResponseValue::Exception(exception)) => Error::Exception(exception.error),
        Some(response_value) => match Method::of_response(&response_value) {
            Some(received) => Error::UnexpectedResponse { expected, received },
            None => Error::EmptyResponse,
        },
    }
}
