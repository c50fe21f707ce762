use std::{fmt, net::SocketAddr, str::FromStr};
#[cfg(unix)]
use std::path::PathBuf;

use crate::error::Error;

/// Address of ABCI Server
///
/// Parsed from `tcp://host:port`, `unix:///path/to/socket` or a bare `host:port`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    /// TCP Address (`host:port`)
    Tcp(String),
    /// UDS Address
    #[cfg(unix)]
    #[cfg_attr(feature = "doc", doc(cfg(unix)))]
    Uds(PathBuf),
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(address: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidAddress(address.to_owned());

        if let Some(path) = address.strip_prefix("unix://") {
            #[cfg(unix)]
            if !path.is_empty() {
                return Ok(Self::Uds(PathBuf::from(path)));
            }

            return Err(invalid());
        }

        let host_port = address.strip_prefix("tcp://").unwrap_or(address);

        match host_port.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => {
                Ok(Self::Tcp(host_port.to_owned()))
            }
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp(host_port) => write!(f, "tcp://{}", host_port),
            #[cfg(unix)]
            Self::Uds(path) => write!(f, "unix://{}", path.display()),
        }
    }
}

impl From<SocketAddr> for Address {
    fn from(addr: SocketAddr) -> Self {
        Self::Tcp(addr.to_string())
    }
}

#[cfg(unix)]
impl From<PathBuf> for Address {
    fn from(path: PathBuf) -> Self {
        Self::Uds(path)
    }
}
