//! Hyper binding for the routing shim.

use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use super::{route, HttpRequest, HttpResponse, RESPONSE_HEADERS};
use crate::config::ServerConfig;
use crate::inventory::InventoryService;

/// Serve the inventory API until the process is stopped.
pub async fn serve(
    config: &ServerConfig,
    service: Arc<InventoryService>,
) -> std::io::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Inventory API listening");

    loop {
        let (stream, peer) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let service = Arc::clone(&service);

        tokio::spawn(async move {
            let handler = service_fn(move |request: Request<Incoming>| {
                let service = Arc::clone(&service);
                async move { handle(&service, request).await }
            });

            if let Err(e) = http1::Builder::new().serve_connection(io, handler).await {
                debug!(peer = %peer, error = %e, "Connection error");
            }
        });
    }
}

async fn handle(
    service: &InventoryService,
    request: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);

    let body = match request.into_body().collect().await {
        Ok(collected) => {
            let bytes = collected.to_bytes();
            if bytes.is_empty() {
                None
            } else {
                Some(String::from_utf8_lossy(&bytes).into_owned())
            }
        }
        Err(e) => {
            error!(error = %e, "Failed to read request body");
            None
        }
    };

    let response = route(
        service,
        &HttpRequest {
            method: method.clone(),
            path: path.clone(),
            query,
            body,
        },
    )
    .await;

    debug!(method = %method, path = %path, status = response.status, "Handled request");
    Ok(to_hyper_response(response))
}

fn to_hyper_response(response: HttpResponse) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR));

    for (name, value) in RESPONSE_HEADERS {
        builder = builder.header(name, value);
    }

    let body = response.body.to_string();
    builder
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}
