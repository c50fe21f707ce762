use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::{
    client::ResponseCallback,
    context::Context,
    error::{Error, Result},
    req_res::ReqRes,
    types::{Request, Response},
    utils::lock,
};

pub type RequestQueue = UnboundedReceiver<Arc<ReqRes>>;

/// State shared between a client handle and its driver tasks
pub struct ClientState {
    queue: UnboundedSender<Arc<ReqRes>>,
    callback: Mutex<Option<ResponseCallback>>,
    error: Mutex<Option<Error>>,
    shutdown: CancellationToken,
}

impl ClientState {
    pub fn new() -> (Arc<Self>, RequestQueue) {
        let (queue, receiver) = unbounded_channel();

        let state = Self {
            queue,
            callback: Default::default(),
            error: Default::default(),
            shutdown: CancellationToken::new(),
        };

        (Arc::new(state), receiver)
    }

    /// Wraps `request` in a [`ReqRes`] and puts it at the back of the request queue
    pub fn queue_request(&self, request: Request) -> Result<Arc<ReqRes>> {
        if request.value.is_none() {
            return Err(Error::EmptyRequest);
        }

        if !self.is_running() {
            return Err(self.error().unwrap_or(Error::NotRunning));
        }

        let req_res = Arc::new(ReqRes::new(request));

        self.queue
            .send(req_res.clone())
            .map_err(|_| self.error().unwrap_or(Error::NotRunning))?;

        Ok(req_res)
    }

    /// Completes `req_res` and then invokes the global response callback
    pub fn complete(&self, req_res: &ReqRes, response: Response) -> Result<()> {
        req_res.complete(response)?;

        let callback = lock(&self.callback).clone();

        if let (Some(callback), Some(response)) = (callback, req_res.response()) {
            callback(req_res.request(), response);
        }

        Ok(())
    }

    pub fn set_callback(&self, callback: ResponseCallback) {
        *lock(&self.callback) = Some(callback);
    }

    pub fn error(&self) -> Option<Error> {
        lock(&self.error).clone()
    }

    pub fn is_running(&self) -> bool {
        !self.shutdown.is_cancelled()
    }

    /// Completes when the client is stopped
    pub async fn stopped(&self) {
        self.shutdown.cancelled().await
    }

    pub fn stop(&self) {
        debug!(message = "Stopping ABCI client");
        self.shutdown.cancel();
    }

    /// Records `err` as the sticky error (unless one is already set) and stops the client
    pub fn stop_for_error(&self, err: Error) {
        error!(message = "Stopping ABCI client due to error", %err);

        {
            let mut error = lock(&self.error);

            if error.is_none() {
                *error = Some(err);
            }
        }

        self.stop();
    }

    /// Waits for `req_res` to complete, for `ctx` to be done or for the client to stop
    pub async fn wait(&self, ctx: &Context, req_res: &ReqRes) -> Result<Response> {
        if let Some(err) = ctx.err() {
            return Err(err);
        }

        tokio::select! {
            biased;
            err = ctx.done() => Err(err),
            response = req_res.wait() => Ok(response.clone()),
            _ = self.stopped() => Err(self.error().unwrap_or(Error::NotRunning)),
        }
    }
}
