use std::fmt;

use super::{RequestValue, ResponseValue};

/// ABCI methods
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Method {
    Echo,
    Flush,
    Info,
    SetOption,
    InitChain,
    Query,
    BeginBlock,
    CheckTx,
    DeliverTx,
    EndBlock,
    Commit,
    ListSnapshots,
    OfferSnapshot,
    LoadSnapshotChunk,
    ApplySnapshotChunk,
}

impl Method {
    /// Returns the method a response answers, or `None` for an exception
    pub fn of_response(response_value: &ResponseValue) -> Option<Self> {
        let method = match response_value {
            ResponseValue::Exception(_) => return None,
            ResponseValue::Echo(_) => Self::Echo,
            ResponseValue::Flush(_) => Self::Flush,
            ResponseValue::Info(_) => Self::Info,
            ResponseValue::SetOption(_) => Self::SetOption,
            ResponseValue::InitChain(_) => Self::InitChain,
            ResponseValue::Query(_) => Self::Query,
            ResponseValue::BeginBlock(_) => Self::BeginBlock,
            ResponseValue::CheckTx(_) => Self::CheckTx,
            ResponseValue::DeliverTx(_) => Self::DeliverTx,
            ResponseValue::EndBlock(_) => Self::EndBlock,
            ResponseValue::Commit(_) => Self::Commit,
            ResponseValue::ListSnapshots(_) => Self::ListSnapshots,
            ResponseValue::OfferSnapshot(_) => Self::OfferSnapshot,
            ResponseValue::LoadSnapshotChunk(_) => Self::LoadSnapshotChunk,
            ResponseValue::ApplySnapshotChunk(_) => Self::ApplySnapshotChunk,
        };

        Some(method)
    }

    /// Name of the method as used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Echo => "Echo",
            Self::Flush => "Flush",
            Self::Info => "Info",
            Self::SetOption => "SetOption",
            Self::InitChain => "InitChain",
            Self::Query => "Query",
            Self::BeginBlock => "BeginBlock",
            Self::CheckTx => "CheckTx",
            Self::DeliverTx => "DeliverTx",
            Self::EndBlock => "EndBlock",
            Self::Commit => "Commit",
            Self::ListSnapshots => "ListSnapshots",
            Self::OfferSnapshot => "OfferSnapshot",
            Self::LoadSnapshotChunk => "LoadSnapshotChunk",
            Self::ApplySnapshotChunk => "ApplySnapshotChunk",
        }
    }

    /// Path of the method on `tendermint.abci.ABCIApplication` gRPC service
    #[cfg(feature = "grpc")]
    pub(crate) fn grpc_path(&self) -> &'static str {
        match self {
            Self::Echo => "/tendermint.abci.ABCIApplication/Echo",
            Self::Flush => "/tendermint.abci.ABCIApplication/Flush",
            Self::Info => "/tendermint.abci.ABCIApplication/Info",
            Self::SetOption => "/tendermint.abci.ABCIApplication/SetOption",
            Self::InitChain => "/tendermint.abci.ABCIApplication/InitChain",
            Self::Query => "/tendermint.abci.ABCIApplication/Query",
            Self::BeginBlock => "/tendermint.abci.ABCIApplication/BeginBlock",
            Self::CheckTx => "/tendermint.abci.ABCIApplication/CheckTx",
            Self::DeliverTx => "/tendermint.abci.ABCIApplication/DeliverTx",
            Self::EndBlock => "/tendermint.abci.ABCIApplication/EndBlock",
            Self::Commit => "/tendermint.abci.ABCIApplication/Commit",
            Self::ListSnapshots => "/tendermint.abci.ABCIApplication/ListSnapshots",
            Self::OfferSnapshot => "/tendermint.abci.ABCIApplication/OfferSnapshot",
            Self::LoadSnapshotChunk => "/tendermint.abci.ABCIApplication/LoadSnapshotChunk",
            Self::ApplySnapshotChunk => "/tendermint.abci.ABCIApplication/ApplySnapshotChunk",
        }
    }
}

impl From<&RequestValue> for Method {
    fn from(request_value: &RequestValue) -> Self {
        match request_value {
            RequestValue::Echo(_) => Self::Echo,
            RequestValue::Flush(_) => Self::Flush,
            RequestValue::Info(_) => Self::Info,
            RequestValue::SetOption(_) => Self::SetOption,
            RequestValue::InitChain(_) => Self::InitChain,
            RequestValue::Query(_) => Self::Query,
            RequestValue::BeginBlock(_) => Self::BeginBlock,
            RequestValue::CheckTx(_) => Self::CheckTx,
            RequestValue::DeliverTx(_) => Self::DeliverTx,
            RequestValue::EndBlock(_) => Self::EndBlock,
            RequestValue::Commit(_) => Self::Commit,
            RequestValue::ListSnapshots(_) => Self::ListSnapshots,
            RequestValue::OfferSnapshot(_) => Self::OfferSnapshot,
            RequestValue::LoadSnapshotChunk(_) => Self::LoadSnapshotChunk,
            RequestValue::ApplySnapshotChunk(_) => Self::ApplySnapshotChunk,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
