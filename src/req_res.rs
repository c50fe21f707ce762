use std::{
    fmt,
    sync::{Mutex, OnceLock},
};

use tokio::sync::watch;

use crate::{
    error::{Error, Result},
    types::{Method, Request, Response},
    utils::lock,
};

/// Callback invoked once with the response of a single request
pub type ReqResCallback = Box<dyn FnOnce(&Response) + Send>;

/// A dispatched request together with its (eventual) response
///
/// A `ReqRes` goes from pending to done exactly once, when the transport hands it the matching
/// response. Any number of tasks may [`wait`](ReqRes::wait) for that moment, and a single callback
/// can be attached with [`set_callback`](ReqRes::set_callback).
pub struct ReqRes {
    request: Request,
    /// Written once, before `completed` is signalled
    response: OnceLock<Response>,
    completed: watch::Sender<bool>,
    state: Mutex<CallbackState>,
}

#[derive(Default)]
struct CallbackState {
    /// Set after `completed` is signalled
    done: bool,
    callback: Option<ReqResCallback>,
}

impl ReqRes {
    /// Creates a new pending `ReqRes` for `request`
    pub fn new(request: Request) -> Self {
        let (completed, _) = watch::channel(false);

        Self {
            request,
            response: OnceLock::new(),
            completed,
            state: Default::default(),
        }
    }

    /// Returns the request
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Returns the response if the request is completed
    pub fn response(&self) -> Option<&Response> {
        self.response.get()
    }

    /// Returns the method of the request
    pub fn method(&self) -> Option<Method> {
        self.request.value.as_ref().map(Method::from)
    }

    /// Returns `true` once the request is completed and its callback has been taken
    pub fn is_done(&self) -> bool {
        lock(&self.state).done
    }

    /// Sets the callback for this request
    ///
    /// If the request is already done, `callback` is invoked immediately on the calling task.
    /// Otherwise it replaces any previously set callback and is invoked by the task that completes
    /// the request.
    pub fn set_callback<F>(&self, callback: F)
    where
        F: FnOnce(&Response) + Send + 'static,
    {
        let mut state = lock(&self.state);

        if state.done {
            drop(state);

            if let Some(response) = self.response.get() {
                callback(response);
            }

            return;
        }

        state.callback = Some(Box::new(callback));
    }

    /// Completes the request with `response`, wakes up all waiters and invokes the callback
    ///
    /// Returns [`Error::AlreadyCompleted`] without touching any state if called more than once.
    pub fn complete(&self, response: Response) -> Result<()> {
        self.response
            .set(response)
            .map_err(|_| Error::AlreadyCompleted)?;

        self.completed.send_replace(true);

        let callback = {
            let mut state = lock(&self.state);
            state.done = true;
            state.callback.take()
        };

        if let (Some(callback), Some(response)) = (callback, self.response.get()) {
            callback(response);
        }

        Ok(())
    }

    /// Waits until the request is completed and returns its response
    ///
    /// This never resolves if the client stops before the response arrives. Use
    /// [`Client::wait`](crate::Client::wait) to also return when the client stops.
    pub async fn wait(&self) -> &Response {
        let mut completed = self.completed.subscribe();

        loop {
            if let Some(response) = self.response.get() {
                return response;
            }

            // `self` owns the sender, so the channel cannot close while we wait
            let _ = completed.changed().await;
        }
    }
}

impl fmt::Debug for ReqRes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqRes")
            .field("request", &self.request)
            .field("response", &self.response.get())
            .finish()
    }
}
