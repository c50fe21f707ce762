use std::{io, sync::Arc};

use thiserror::Error;

use crate::types::Method;

/// ABCI client error
///
/// Errors are cloneable so that the first transport failure can be kept as the client's sticky
/// error and handed out to every subsequent caller.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Transport kind is neither `socket` nor `grpc`
    #[error("unknown ABCI transport `{0}`, expected `socket` or `grpc`")]
    UnsupportedTransport(String),
    /// Address cannot be used to reach an ABCI server
    #[error("invalid ABCI address `{0}`")]
    InvalidAddress(String),
    /// Initial connection to ABCI server failed
    #[error("unable to connect to ABCI server at {address}: {reason}")]
    Connect {
        /// Address of ABCI server
        address: String,
        /// Reason of failure
        reason: String,
    },
    /// Client is stopped and no longer accepts requests
    #[error("ABCI client is not running")]
    NotRunning,
    /// Request does not contain any value
    #[error("ABCI request has no value")]
    EmptyRequest,
    /// I/O error on the underlying connection
    #[error("I/O error on ABCI connection: {0}")]
    Io(#[source] Arc<io::Error>),
    /// gRPC call failed
    #[cfg(feature = "grpc")]
    #[cfg_attr(feature = "doc", doc(cfg(feature = "grpc")))]
    #[error("gRPC call failed with {code:?}: {message}")]
    Grpc {
        /// gRPC status code
        code: tonic::Code,
        /// Status message
        message: String,
    },
    /// ABCI server responded with an exception
    #[error("ABCI server returned an exception: {0}")]
    Exception(String),
    /// Response does not contain any value
    #[error("ABCI response has no value")]
    EmptyResponse,
    /// Response received while no request was pending
    #[error("received an ABCI response without a pending request")]
    UnsolicitedResponse,
    /// Response kind does not match request kind
    #[error("unexpected `{received}` response, expected `{expected}`")]
    UnexpectedResponse {
        /// Method of request
        expected: Method,
        /// Method of received response
        received: Method,
    },
    /// Request/response pair is already completed
    #[error("ABCI request is already completed")]
    AlreadyCompleted,
    /// Context was cancelled while waiting for a response
    #[error("context cancelled")]
    Cancelled,
    /// Context deadline passed while waiting for a response
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

impl Error {
    /// Returns `true` if the error was produced by a cancelled or expired [`Context`](crate::Context)
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}

#[cfg(feature = "grpc")]
impl From<tonic::Status> for Error {
    fn from(status: tonic::Status) -> Self {
        Self::Grpc {
            code: status.code(),
            message: status.message().to_owned(),
        }
    }
}

/// ABCI client result
pub type Result<T> = std::result::Result<T, Error>;
