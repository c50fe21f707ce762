use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
#[cfg(unix)]
use tokio::net::UnixStream;
use tokio::{
    io::{AsyncRead as Read, AsyncWrite as Write},
    net::TcpStream,
    spawn,
    time::sleep,
};
use tracing::{debug, info, instrument, warn};

use crate::{
    address::Address,
    client::{
        state::{ClientState, RequestQueue},
        Client, ResponseCallback,
    },
    context::Context,
    error::{Error, Result},
    req_res::ReqRes,
    stream_split::StreamSplit,
    types::{Method, Request, Response, ResponseValue},
    utils::{get_stream_pair, lock, StreamReader, StreamWriter},
};

/// Interval between two connection attempts when initial connection is not mandatory
pub const DIAL_RETRY_INTERVAL: Duration = Duration::from_secs(3);

/// Requests written to the connection whose responses have not arrived yet, oldest first
type PendingRequests = Arc<Mutex<VecDeque<Arc<ReqRes>>>>;

/// ABCI client sending length delimited protobuf messages over a TCP or Unix socket
///
/// Requests are written in the order in which they are dispatched and ABCI servers answer them in
/// that same order, so every response completes the oldest pending request.
pub struct SocketClient {
    state: Arc<ClientState>,
}

enum SocketStream {
    Tcp(TcpStream),
    #[cfg(unix)]
    Uds(UnixStream),
}

impl SocketClient {
    /// Connects to ABCI server at `address`
    ///
    /// When `must_connect` is `false`, connection failures are retried every
    /// [`DIAL_RETRY_INTERVAL`] in background and requests are queued until the client connects.
    #[instrument]
    pub async fn connect(address: Address, must_connect: bool) -> Result<Self> {
        let (state, queue) = ClientState::new();

        if must_connect {
            let stream = dial(&address).await.map_err(|err| Error::Connect {
                address: address.to_string(),
                reason: err.to_string(),
            })?;

            spawn_connection(stream, queue, state.clone());
        } else {
            let state = state.clone();

            spawn(async move {
                if let Some(stream) = dial_with_retry(&address, &state).await {
                    spawn_connection(stream, queue, state);
                }
            });
        }

        Ok(Self { state })
    }

    #[cfg(test)]
    pub(crate) fn from_stream<S: StreamSplit>(stream: S) -> Self {
        let (state, queue) = ClientState::new();
        run_connection(stream, queue, state.clone());
        Self { state }
    }
}

#[async_trait]
impl Client for SocketClient {
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

impl Drop for SocketClient {
    fn drop(&mut self) {
        self.state.stop();
    }
}

async fn dial(address: &Address) -> std::io::Result<SocketStream> {
    match address {
        Address::Tcp(host_port) => Ok(SocketStream::Tcp(TcpStream::connect(host_port).await?)),
        #[cfg(unix)]
        Address::Uds(path) => Ok(SocketStream::Uds(UnixStream::connect(path).await?)),
    }
}

async fn dial_with_retry(address: &Address, state: &ClientState) -> Option<SocketStream> {
    loop {
        match dial(address).await {
            Ok(stream) => return Some(stream),
            Err(err) => {
                warn!(
                    message = "ABCI server is not available, retrying",
                    %address,
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

fn spawn_connection(stream: SocketStream, queue: RequestQueue, state: Arc<ClientState>) {
    match stream {
        SocketStream::Tcp(stream) => run_connection(stream, queue, state),
        #[cfg(unix)]
        SocketStream::Uds(stream) => run_connection(stream, queue, state),
    }
}

fn run_connection<S: StreamSplit>(stream: S, queue: RequestQueue, state: Arc<ClientState>) {
    info!(message = "Connected to ABCI server");

    let (stream_reader, stream_writer) = get_stream_pair(stream);
    let pending = PendingRequests::default();

    spawn(send_requests(
        stream_writer,
        queue,
        pending.clone(),
        state.clone(),
    ));
    spawn(receive_responses(stream_reader, pending, state));
}

async fn send_requests<W>(
    mut stream_writer: StreamWriter<W>,
    mut queue: RequestQueue,
    pending: PendingRequests,
    state: Arc<ClientState>,
) where
    W: Write + Unpin + Send + 'static,
{
    loop {
        let req_res = tokio::select! {
            _ = state.stopped() => break,
            req_res = queue.recv() => match req_res {
                Some(req_res) => req_res,
                None => break,
            },
        };

        // Write everything that is already queued, then flush once
        let mut next = Some(req_res);

        while let Some(req_res) = next {
            lock(&pending).push_back(req_res.clone());

            if let Err(err) = stream_writer.write(req_res.request()).await {
                state.stop_for_error(err.into());
                return;
            }

            next = queue.try_recv().ok();
        }

        if let Err(err) = stream_writer.flush().await {
            state.stop_for_error(err.into());
            return;
        }
    }

    debug!(message = "Request sender stopped");
}

async fn receive_responses<R>(
    mut stream_reader: StreamReader<R>,
    pending: PendingRequests,
    state: Arc<ClientState>,
) where
    R: Read + Unpin + Send + 'static,
{
    loop {
        let response = tokio::select! {
            _ = state.stopped() => break,
            response = stream_reader.read::<Response>() => response,
        };

        let result = match response {
            Ok(response) => handle_response(&pending, &state, response),
            Err(err) => Err(err.into()),
        };

        if let Err(err) = result {
            state.stop_for_error(err);
            break;
        }
    }

    debug!(message = "Response receiver stopped");
}

fn handle_response(pending: &PendingRequests, state: &ClientState, response: Response) -> Result<()> {
    let received = match &response.value {
        None => return Err(Error::EmptyResponse),
        Some(ResponseValue::Exception(exception)) => {
            return Err(Error::Exception(exception.error.clone()))
        }
        Some(response_value) => Method::of_response(response_value).ok_or(Error::EmptyResponse)?,
    };

    let req_res = lock(pending)
        .pop_front()
        .ok_or(Error::UnsolicitedResponse)?;

    match req_res.method() {
        Some(expected) if expected == received => {}
        Some(expected) => return Err(Error::UnexpectedResponse { expected, received }),
        None => return Err(Error::EmptyRequest),
    }

    debug!(message = "Received response", method = %received);

    state.complete(&req_res, response)
}
