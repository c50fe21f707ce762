use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use prost::Message;
use tokio::{spawn, time::sleep};
use tonic::{
    client::Grpc,
    codec::ProstCodec,
    codegen::http::uri::PathAndQuery,
    transport::{Channel, Endpoint},
    Code,
};
use tracing::{debug, info, instrument, warn};

use crate::{
    address::Address,
    client::{
        socket::DIAL_RETRY_INTERVAL,
        state::{ClientState, RequestQueue},
        Client, ResponseCallback,
    },
    context::Context,
    error::{Error, Result},
    req_res::ReqRes,
    types::*,
};

/// Interval between two health check `Echo` calls until ABCI server answers
pub const ECHO_RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// ABCI client calling `tendermint.abci.ABCIApplication` gRPC service
///
/// A single worker task issues the calls one after another, so responses complete in the order in
/// which requests were dispatched.
pub struct GrpcClient {
    state: Arc<ClientState>,
}

impl GrpcClient {
    /// Connects to ABCI gRPC server at `address`
    ///
    /// When `must_connect` is `false`, connection failures are retried every
    /// [`DIAL_RETRY_INTERVAL`] in background and requests are queued until the client connects.
    #[instrument]
    pub async fn connect(address: Address, must_connect: bool) -> Result<Self> {
        let endpoint = endpoint(&address)?;
        let (state, queue) = ClientState::new();

        let channel = if must_connect {
            let channel = endpoint.connect().await.map_err(|err| Error::Connect {
                address: address.to_string(),
                reason: err.to_string(),
            })?;

            Some(channel)
        } else {
            None
        };

        spawn(run(endpoint, channel, queue, state.clone()));

        Ok(Self { state })
    }
}

#[async_trait]
impl Client for GrpcClient {
    fn send_async(&self, request: Request) -> Result<Arc<ReqRes>> {
        self.state.queue_request(request)
    }

    async fn wait(&self, ctx: &Context, req_res: &ReqRes) -> Result<Response> {
        self.state.wait(ctx, req_res).await
    }

    fn set_response_callback(&self, callback: ResponseCallback) {
        self.state.set_callback(callback)
    }

    fn error(&self) -> Option<Error> {
        self.state.error()
    }

    fn is_running(&self) -> bool {
        self.state.is_running()
    }

    fn stop(&self) {
        self.state.stop()
    }
}

impl Drop for GrpcClient {
    fn drop(&mut self) {
        self.state.stop();
    }
}

fn endpoint(address: &Address) -> Result<Endpoint> {
    match address {
        Address::Tcp(host_port) => Endpoint::from_shared(format!("http://{}", host_port))
            .map_err(|_| Error::InvalidAddress(address.to_string())),
        #[cfg(unix)]
        Address::Uds(_) => Err(Error::InvalidAddress(address.to_string())),
    }
}

async fn run(
    endpoint: Endpoint,
    channel: Option<Channel>,
    mut queue: RequestQueue,
    state: Arc<ClientState>,
) {
    let channel = match channel {
        Some(channel) => channel,
        None => match dial_with_retry(&endpoint, &state).await {
            Some(channel) => channel,
            None => return,
        },
    };

    let mut grpc = Grpc::new(channel);

    if !wait_for_echo(&mut grpc, &state).await {
        return;
    }

    info!(message = "Connected to ABCI gRPC server");

    loop {
        let req_res = tokio::select! {
            _ = state.stopped() => break,
            req_res = queue.recv() => match req_res {
                Some(req_res) => req_res,
                None => break,
            },
        };

        let response_value = tokio::select! {
            _ = state.stopped() => break,
            response_value = call(&mut grpc, req_res.request()) => response_value,
        };

        let result = response_value
            .and_then(|value| state.complete(&req_res, Response { value: Some(value) }));

        if let Err(err) = result {
            state.stop_for_error(err);
            break;
        }
    }

    debug!(message = "gRPC worker stopped");
}

async fn dial_with_retry(endpoint: &Endpoint, state: &ClientState) -> Option<Channel> {
    loop {
        match endpoint.connect().await {
            Ok(channel) => return Some(channel),
            Err(err) => {
                warn!(
                    message = "ABCI gRPC server is not available, retrying",
                    uri = %endpoint.uri(),
                    %err,
                    retry_in = ?DIAL_RETRY_INTERVAL,
                );
            }
        }

        tokio::select! {
            _ = state.stopped() => return None,
            _ = sleep(DIAL_RETRY_INTERVAL) => {}
        }
    }
}

/// Calls `Echo` until the server answers; returns `false` if the client is stopped first
async fn wait_for_echo(grpc: &mut Grpc<Channel>, state: &ClientState) -> bool {
    loop {
        let echo_request = RequestEcho {
            message: "hello".to_owned(),
        };

        match unary::<_, ResponseEcho>(grpc, Method::Echo, echo_request).await {
            Ok(_) => return true,
            Err(err) => {
                warn!(
                    message = "ABCI gRPC server is not responding to echo, retrying",
                    %err,
                    retry_in = ?ECHO_RETRY_INTERVAL,
                );
            }
        }

        tokio::select! {
            _ = state.stopped() => return false,
            _ = sleep(ECHO_RETRY_INTERVAL) => {}
        }
    }
}

async fn call(grpc: &mut Grpc<Channel>, request: &Request) -> Result<ResponseValue> {
    let request_value = request.value.clone().ok_or(Error::EmptyRequest)?;
    let method = Method::from(&request_value);

    match request_value {
        RequestValue::Echo(request) => unary(grpc, method, request).await.map(ResponseValue::Echo),
        RequestValue::Flush(request) => {
            unary(grpc, method, request).await.map(ResponseValue::Flush)
        }
        RequestValue::Info(request) => unary(grpc, method, request).await.map(ResponseValue::Info),
        RequestValue::SetOption(request) => unary(grpc, method, request)
            .await
            .map(ResponseValue::SetOption),
        RequestValue::InitChain(request) => unary(grpc, method, request)
            .await
            .map(ResponseValue::InitChain),
        RequestValue::Query(request) => {
            unary(grpc, method, request).await.map(ResponseValue::Query)
        }
        RequestValue::BeginBlock(request) => unary(grpc, method, request)
            .await
            .map(ResponseValue::BeginBlock),
        RequestValue::CheckTx(request) => unary(grpc, method, request)
            .await
            .map(ResponseValue::CheckTx),
        RequestValue::DeliverTx(request) => unary(grpc, method, request)
            .await
            .map(ResponseValue::DeliverTx),
        RequestValue::EndBlock(request) => unary(grpc, method, request)
            .await
            .map(ResponseValue::EndBlock),
        RequestValue::Commit(request) => {
            unary(grpc, method, request).await.map(ResponseValue::Commit)
        }
        RequestValue::ListSnapshots(request) => unary(grpc, method, request)
            .await
            .map(ResponseValue::ListSnapshots),
        RequestValue::OfferSnapshot(request) => unary(grpc, method, request)
            .await
            .map(ResponseValue::OfferSnapshot),
        RequestValue::LoadSnapshotChunk(request) => unary(grpc, method, request)
            .await
            .map(ResponseValue::LoadSnapshotChunk),
        RequestValue::ApplySnapshotChunk(request) => unary(grpc, method, request)
            .await
            .map(ResponseValue::ApplySnapshotChunk),
    }
}

async fn unary<Req, Res>(grpc: &mut Grpc<Channel>, method: Method, request: Req) -> Result<Res>
where
    Req: Message + Send + Sync + 'static,
    Res: Message + Default + Send + Sync + 'static,
{
    grpc.ready().await.map_err(|err| Error::Grpc {
        code: Code::Unavailable,
        message: err.to_string(),
    })?;

    let path = PathAndQuery::from_static(method.grpc_path());
    let codec = ProstCodec::default();

    let response = grpc
        .unary(tonic::Request::new(request), path, codec)
        .await?;

    Ok(response.into_inner())
}
