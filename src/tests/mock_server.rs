use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::{stream_split::StreamSplit, types::*, utils::get_stream_pair};

/// Query path for which mock server responds with an exception
pub const EXCEPTION_PATH: &str = "/exception";
/// Query path for which mock server responds with an `Echo` instead of a `Query` response
pub const MISMATCH_PATH: &str = "/mismatch";

/// Runs a mock ABCI server on `stream`
///
/// When `gate` is given, every response waits for one permit before it is written.
pub async fn run<S: StreamSplit>(stream: S, gate: Option<Arc<Semaphore>>) {
    let (mut stream_reader, mut stream_writer) = get_stream_pair(stream);

    while let Ok(request) = stream_reader.read::<Request>().await {
        let response = respond(request);

        if let Some(ref gate) = gate {
            match gate.acquire().await {
                Ok(permit) => permit.forget(),
                Err(_) => break,
            }
        }

        if stream_writer.write(&response).await.is_err() || stream_writer.flush().await.is_err() {
            break;
        }
    }
}

fn respond(request: Request) -> Response {
    let response_value = match request.value {
        None => ResponseValue::Exception(ResponseException {
            error: "empty request".to_owned(),
        }),
        Some(RequestValue::Echo(request)) => ResponseValue::Echo(ResponseEcho {
            message: request.message,
        }),
        Some(RequestValue::Flush(_)) => ResponseValue::Flush(Default::default()),
        Some(RequestValue::Info(_)) => ResponseValue::Info(ResponseInfo {
            data: "mock".to_owned(),
            last_block_height: 7,
            ..Default::default()
        }),
        Some(RequestValue::SetOption(_)) => ResponseValue::SetOption(Default::default()),
        Some(RequestValue::InitChain(_)) => ResponseValue::InitChain(Default::default()),
        Some(RequestValue::Query(request)) => match request.path.as_str() {
            EXCEPTION_PATH => ResponseValue::Exception(ResponseException {
                error: "boom".to_owned(),
            }),
            MISMATCH_PATH => ResponseValue::Echo(Default::default()),
            _ => ResponseValue::Query(ResponseQuery {
                key: request.data,
                value: b"value".to_vec(),
                height: request.height,
                ..Default::default()
            }),
        },
        Some(RequestValue::BeginBlock(_)) => ResponseValue::BeginBlock(Default::default()),
        Some(RequestValue::CheckTx(request)) => ResponseValue::CheckTx(ResponseCheckTx {
            code: if request.tx.is_empty() { 1 } else { 0 },
            log: if request.tx.is_empty() {
                "empty transaction".to_owned()
            } else {
                Default::default()
            },
            data: request.tx,
            ..Default::default()
        }),
        Some(RequestValue::DeliverTx(request)) => ResponseValue::DeliverTx(ResponseDeliverTx {
            data: request.tx,
            ..Default::default()
        }),
        Some(RequestValue::EndBlock(_)) => ResponseValue::EndBlock(Default::default()),
        Some(RequestValue::Commit(_)) => ResponseValue::Commit(ResponseCommit {
            data: b"app_hash".to_vec(),
            ..Default::default()
        }),
        Some(RequestValue::ListSnapshots(_)) => ResponseValue::ListSnapshots(Default::default()),
        Some(RequestValue::OfferSnapshot(_)) => ResponseValue::OfferSnapshot(Default::default()),
        Some(RequestValue::LoadSnapshotChunk(request)) => {
            ResponseValue::LoadSnapshotChunk(ResponseLoadSnapshotChunk {
                chunk: request.chunk.to_be_bytes().to_vec(),
            })
        }
        Some(RequestValue::ApplySnapshotChunk(_)) => {
            ResponseValue::ApplySnapshotChunk(Default::default())
        }
    };

    Response {
        value: Some(response_value),
    }
}
