#![allow(missing_docs)]
//! Types used in ABCI
mod method;

use std::io::{Error, ErrorKind, Result};

use bytes::{Buf, BufMut, BytesMut};
use prost::{encoding::decode_varint, Message};
pub use tendermint_proto::abci::*;
pub use tendermint_proto::abci::{request::Value as RequestValue, response::Value as ResponseValue};
pub use tendermint_proto::types::Header;

pub use self::method::Method;

/// Maximum number of bytes in a varint encoded `u64`
const MAX_VARINT_LENGTH: usize = 10;

/// Maximum length of a single ABCI message (100 MB)
pub const MAX_MESSAGE_LENGTH: usize = 104_857_600;

/// Decodes a length delimited protobuf message from the front of `buf`
///
/// Returns `None` (leaving `buf` untouched) when `buf` does not yet contain a complete message, and
/// fails with `InvalidData` when the length prefix exceeds [`MAX_MESSAGE_LENGTH`].
pub fn decode<M>(buf: &mut BytesMut) -> Result<Option<M>>
where
    M: Message + Default,
{
    let mut peek = &buf[..];

    let length = match decode_varint(&mut peek) {
        Ok(length) => length,
        Err(_) if buf.len() < MAX_VARINT_LENGTH => return Ok(None),
        Err(err) => return Err(Error::new(ErrorKind::InvalidData, err)),
    };

    let length = match usize::try_from(length) {
        Ok(length) if length <= MAX_MESSAGE_LENGTH => length,
        _ => {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!("ABCI message of {} bytes exceeds the maximum length", length),
            ))
        }
    };

    if peek.len() < length {
        return Ok(None);
    }

    let prefix_length = buf.len() - peek.len();
    buf.advance(prefix_length);

    M::decode(buf.split_to(length))
        .map(Some)
        .map_err(|err| Error::new(ErrorKind::InvalidData, err))
}

/// Encodes a protobuf message, prefixed with its varint encoded length, into `buf`
pub fn encode<M, B>(message: &M, buf: &mut B) -> Result<()>
where
    M: Message,
    B: BufMut,
{
    message
        .encode_length_delimited(buf)
        .map_err(|err| Error::new(ErrorKind::Other, err))
}

pub(crate) fn request(value: RequestValue) -> Request {
    Request { value: Some(value) }
}
