//! Minimal apikit example: one JSON endpoint behind the standard stack.
//!
//! Run with:
//!   cargo run --example basic
//!
//! Try:
//!   curl -i -X POST http://localhost:3000/messages \
//!        -H 'content-type: application/json' \
//!        -d '{"public_key":"k1","text":"hello"}'
//!   curl -i -X POST http://localhost:3000/messages -d '{"public_key":"","text":"x"}'
//!   curl -i -X POST http://localhost:3000/messages -d 'not json'
//!   curl -i http://localhost:3000/slow       # hits the 2 s deadline
//!   curl -i http://localhost:3000/panic      # recovered, 500

use std::time::Duration;

use apikit::classify::{verify_error, VerifyError};
use apikit::middleware::Stack;
use apikit::{errorf, reply, Request, Response};
use http::{Method, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{error, info};

#[derive(Deserialize)]
struct NewMessage {
    public_key: String,
    text: String,
}

#[derive(Serialize)]
struct Stored {
    id: u64,
    length: usize,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let app = Stack::new()
        .timeout(Duration::from_secs(2))
        .body_limit(4 * 1024)
        .wrap(dispatch);
    let service = apikit::into_service(app);

    let listener = TcpListener::bind("0.0.0.0:3000").await?;
    info!(addr = "0.0.0.0:3000", "listening");

    loop {
        let (stream, peer) = listener.accept().await?;
        let service = service.clone();
        tokio::spawn(async move {
            if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                error!(peer = %peer, "connection error: {e}");
            }
        });
    }
}

// Routing is the host's business; a match is enough for a demo.
async fn dispatch(req: Request) -> Response {
    let path = req.path().to_owned();
    match (req.method().clone(), path.as_str()) {
        (Method::POST, "/messages") => create_message(req).await,
        (Method::GET, "/slow") => slow(req).await,
        (Method::GET, "/panic") => panic!("demo panic"),
        (_, path) => errorf!(StatusCode::NOT_FOUND, "no route for {path}"),
    }
}

// POST /messages → 201 {"id":..,"length":..}
async fn create_message(mut req: Request) -> Response {
    let msg: NewMessage = match req.json().await {
        Ok(msg) => msg,
        Err(err) => return verify_error(req.context(), &err),
    };
    if msg.public_key.is_empty() {
        return verify_error(req.context(), &VerifyError::InvalidPublicKey);
    }

    req.context().logger().in_scope(|| info!(length = msg.text.len(), "message stored"));
    reply::ok(StatusCode::CREATED, &Stored { id: 1, length: msg.text.len() })
}

// GET /slow → gives up when the context deadline passes.
async fn slow(req: Request) -> Response {
    let ctx = req.context().clone();
    tokio::select! {
        () = ctx.done() => reply::error(StatusCode::GATEWAY_TIMEOUT, "took too long"),
        () = tokio::time::sleep(Duration::from_secs(10)) => Response::text("done"),
    }
}
