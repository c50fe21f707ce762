use std::{
    convert::Infallible,
    future::{ready, Ready},
    net::SocketAddr,
    task::{Context, Poll},
};

use prost::Message;
use tokio::{net::TcpListener, spawn};
use tonic::{
    body::BoxBody,
    codec::ProstCodec,
    codegen::{http, BoxFuture, Service},
    server::{Grpc, NamedService, UnaryService},
    transport::{server::TcpIncoming, Body, Server},
    Status,
};

use crate::types::*;

/// Message of the status returned for every `Commit` call
pub const COMMIT_FAILURE: &str = "commit failed";

/// Starts a mock `tendermint.abci.ABCIApplication` gRPC server on a free local port
///
/// `Echo` and `CheckTx` are answered, `Commit` fails with an internal error and every other method is
/// unimplemented.
pub async fn start() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let incoming = TcpIncoming::from_listener(listener, true, None).unwrap();

    spawn(
        Server::builder()
            .add_service(MockAbciService)
            .serve_with_incoming(incoming),
    );

    address
}

#[derive(Debug, Clone, Copy)]
struct MockAbciService;

impl NamedService for MockAbciService {
    const NAME: &'static str = "tendermint.abci.ABCIApplication";
}

impl Service<http::Request<Body>> for MockAbciService {
    type Response = http::Response<BoxBody>;
    type Error = Infallible;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: http::Request<Body>) -> Self::Future {
        match request.uri().path() {
            "/tendermint.abci.ABCIApplication/Echo" => {
                Box::pin(unary(request, |echo: RequestEcho| {
                    Ok(ResponseEcho {
                        message: echo.message,
                    })
                }))
            }
            "/tendermint.abci.ABCIApplication/CheckTx" => {
                Box::pin(unary(request, |check_tx: RequestCheckTx| {
                    Ok(ResponseCheckTx {
                        data: check_tx.tx,
                        ..Default::default()
                    })
                }))
            }
            "/tendermint.abci.ABCIApplication/Commit" => {
                Box::pin(unary(request, |_: RequestCommit| {
                    Err::<ResponseCommit, _>(Status::internal(COMMIT_FAILURE))
                }))
            }
            path => {
                let response = Status::unimplemented(path.to_owned()).to_http();
                Box::pin(async move { Ok(response) })
            }
        }
    }
}

async fn unary<Req, Res, F>(
    request: http::Request<Body>,
    handler: F,
) -> Result<http::Response<BoxBody>, Infallible>
where
    Req: Message + Default + Send + 'static,
    Res: Message + Send + 'static,
    F: FnMut(Req) -> Result<Res, Status> + Send + 'static,
{
    let mut grpc = Grpc::new(ProstCodec::<Res, Req>::default());
    Ok(grpc.unary(Handler(handler), request).await)
}

struct Handler<F>(F);

impl<Req, Res, F> UnaryService<Req> for Handler<F>
where
    F: FnMut(Req) -> Result<Res, Status>,
{
    type Response = Res;
    type Future = Ready<Result<tonic::Response<Res>, Status>>;

    fn call(&mut self, request: tonic::Request<Req>) -> Self::Future {
        ready((self.0)(request.into_inner()).map(tonic::Response::new))
    }
}
