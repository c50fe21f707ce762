use crate::types::*;

pub fn info() -> RequestInfo {
    RequestInfo {
        version: "0.34.21".to_owned(),
        ..Default::default()
    }
}

pub fn check_tx(counter: u64) -> RequestCheckTx {
    RequestCheckTx {
        tx: counter.to_be_bytes().to_vec(),
        ..Default::default()
    }
}

pub fn deliver_tx(counter: u64) -> RequestDeliverTx {
    RequestDeliverTx {
        tx: counter.to_be_bytes().to_vec(),
    }
}

pub fn query(path: &str) -> RequestQuery {
    RequestQuery {
        data: b"key".to_vec(),
        path: path.to_owned(),
        height: 3,
        prove: false,
    }
}

pub fn end_block(block_height: i64) -> RequestEndBlock {
    RequestEndBlock {
        height: block_height,
    }
}

pub fn load_snapshot_chunk(chunk: u32) -> RequestLoadSnapshotChunk {
    RequestLoadSnapshotChunk {
        height: 1,
        format: 1,
        chunk,
    }
}
