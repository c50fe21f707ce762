use std::io::{Error, ErrorKind, Result};

use bytes::BytesMut;
use prost::Message;
use tokio::io::{AsyncRead as Read, AsyncReadExt, AsyncWrite as Write, AsyncWriteExt, BufWriter};

use crate::{
    stream_split::StreamSplit,
    types::{decode, encode},
};

const DEFAULT_BUFFER_SIZE: usize = 4096;

pub struct StreamReader<S>
where
    S: Read + Unpin,
{
    stream: S,
    read_buf: [u8; DEFAULT_BUFFER_SIZE],
    buf: BytesMut,
}

impl<S> StreamReader<S>
where
    S: Read + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            read_buf: [0; DEFAULT_BUFFER_SIZE],
            buf: BytesMut::new(),
        }
    }

    /// Reads the next message, failing with `UnexpectedEof` if the stream closes first
    pub async fn read<M: Message + Default>(&mut self) -> Result<M> {
        loop {
            if let Some(value) = decode::<M>(&mut self.buf)? {
                return Ok(value);
            }

            if self.fill_buf().await? == 0 {
                return Err(Error::new(
                    ErrorKind::UnexpectedEof,
                    "ABCI connection closed by peer",
                ));
            }
        }
    }

    async fn fill_buf(&mut self) -> Result<usize> {
        let bytes_read = self.stream.read(&mut self.read_buf).await?;

        if bytes_read == 0 {
            return Ok(0);
        }

        self.buf.extend_from_slice(&self.read_buf[0..bytes_read]);
        Ok(bytes_read)
    }
}

pub struct StreamWriter<S>
where
    S: Write + Unpin,
{
    stream: BufWriter<S>,
}

impl<S> StreamWriter<S>
where
    S: Write + Unpin,
{
    fn new(stream: S) -> Self {
        Self {
            stream: BufWriter::new(stream),
        }
    }

    /// Buffers a message; call [`flush`](StreamWriter::flush) to hand it to the transport
    pub async fn write<M: Message>(&mut self, message: &M) -> Result<()> {
        let mut buf = BytesMut::new();
        encode(message, &mut buf)?;

        self.stream.write_all(&buf).await
    }

    pub async fn flush(&mut self) -> Result<()> {
        self.stream.flush().await
    }
}

pub fn get_stream_pair<S: StreamSplit>(
    stream: S,
) -> (StreamReader<S::Reader>, StreamWriter<S::Writer>) {
    let (reader, writer) = stream.split_stream();
    (StreamReader::new(reader), StreamWriter::new(writer))
}
