#[cfg(test)]
use tokio::io::{split, DuplexStream, ReadHalf, WriteHalf};
#[cfg(unix)]
use tokio::net::{
    unix::{OwnedReadHalf as UnixReadHalf, OwnedWriteHalf as UnixWriteHalf},
    UnixStream,
};
use tokio::{
    io::{AsyncRead as Read, AsyncWrite as Write},
    net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpStream,
    },
};

pub trait StreamSplit {
    type Reader: Read + Send + Unpin + 'static;
    type Writer: Write + Send + Unpin + 'static;

    /// Splits the stream into reader and writer halves
    fn split_stream(self) -> (Self::Reader, Self::Writer);
}

impl StreamSplit for TcpStream {
    type Reader = OwnedReadHalf;
    type Writer = OwnedWriteHalf;

    fn split_stream(self) -> (Self::Reader, Self::Writer) {
        self.into_split()
    }
}

#[cfg(unix)]
impl StreamSplit for UnixStream {
    type Reader = UnixReadHalf;
    type Writer = UnixWriteHalf;

    fn split_stream(self) -> (Self::Reader, Self::Writer) {
        self.into_split()
    }
}

#[cfg(test)]
impl StreamSplit for DuplexStream {
    type Reader = ReadHalf<DuplexStream>;
    type Writer = WriteHalf<DuplexStream>;

    fn split_stream(self) -> (Self::Reader, Self::Writer) {
        split(self)
    }
}
