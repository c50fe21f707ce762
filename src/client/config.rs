use std::{fmt, str::FromStr, sync::Arc};

use tracing::{info, instrument};

use crate::{
    address::Address,
    client::{Client, SocketClient},
    error::{Error, Result},
};

/// Transport used to talk to an ABCI server
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Transport {
    /// Length delimited protobuf messages over a TCP or Unix socket
    Socket,
    /// gRPC
    Grpc,
}

impl FromStr for Transport {
    type Err = Error;

    fn from_str(transport: &str) -> Result<Self> {
        match transport {
            "socket" => Ok(Self::Socket),
            "grpc" => Ok(Self::Grpc),
            _ => Err(Error::UnsupportedTransport(transport.to_owned())),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Socket => f.write_str("socket"),
            Self::Grpc => f.write_str("grpc"),
        }
    }
}

/// Configuration of an ABCI client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Address of ABCI server
    pub address: Address,
    /// Transport used to reach ABCI server
    pub transport: Transport,
    /// When `true`, failure of initial connection is returned to the caller. Otherwise, the client
    /// keeps retrying in background and queues requests until it connects.
    pub must_connect: bool,
}

impl ClientConfig {
    /// Creates a new configuration which retries initial connection in background
    pub fn new(address: Address, transport: Transport) -> Self {
        Self {
            address,
            transport,
            must_connect: false,
        }
    }

    /// Sets whether failure of initial connection is fatal
    pub fn must_connect(mut self, must_connect: bool) -> Self {
        self.must_connect = must_connect;
        self
    }

    /// Creates a client for this configuration
    ///
    /// # Note
    ///
    /// Client tasks are spawned on the current `tokio` runtime.
    #[instrument(skip(self), fields(address = %self.address, transport = %self.transport))]
    pub async fn connect(self) -> Result<Arc<dyn Client>> {
        info!(message = "Creating ABCI client", must_connect = self.must_connect);

        match self.transport {
            Transport::Socket => {
                let client = SocketClient::connect(self.address, self.must_connect).await?;
                Ok(Arc::new(client))
            }
            Transport::Grpc => {
                cfg_if::cfg_if! {
                    if #[cfg(feature = "grpc")] {
                        let client =
                            super::GrpcClient::connect(self.address, self.must_connect).await?;
                        Ok(Arc::new(client))
                    } else {
                        Err(Error::UnsupportedTransport(self.transport.to_string()))
                    }
                }
            }
        }
    }
}

/// Creates a new ABCI client for `transport` (`"socket"` or `"grpc"`) connected to `address`
///
/// Returns [`Error::UnsupportedTransport`] for any other transport.
pub async fn new_client(
    address: &str,
    transport: &str,
    must_connect: bool,
) -> Result<Arc<dyn Client>> {
    let transport = transport.parse()?;
    let address = address.parse()?;

    ClientConfig::new(address, transport)
        .must_connect(must_connect)
        .connect()
        .await
}
