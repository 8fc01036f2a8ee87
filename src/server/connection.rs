use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncWriteExt, BufStream};
use tokio::net::TcpStream;
use tracing::{debug, error, info, warn};

use crate::clock::LamportClock;
use crate::protocol::{read_request, Request, RequestError, Response, Status};
use crate::store::WeatherStore;

/// Per-connection actor: reads one request, touches the clock, hits
/// the store, writes one response, closes. Dropping the handler
/// releases the connection on every path, including failures.
pub struct ConnectionHandler {
    stream: BufStream<TcpStream>,
    store: Arc<WeatherStore>,
    clock: Arc<LamportClock>,
    peer: String,
    read_timeout: Duration,
}

impl ConnectionHandler {
    pub fn new(
        stream: TcpStream,
        store: Arc<WeatherStore>,
        clock: Arc<LamportClock>,
        peer: String,
        read_timeout: Duration,
    ) -> Self {
        ConnectionHandler {
            stream: BufStream::new(stream),
            store,
            clock,
            peer,
            read_timeout,
        }
    }

    pub async fn run(mut self) {
        debug!(peer = %self.peer, "client connected");

        let read = tokio::time::timeout(self.read_timeout, read_request(&mut self.stream));
        let request = match read.await {
            Ok(Ok(request)) => request,
            Ok(Err(RequestError::Io(e))) => {
                error!(peer = %self.peer, error = %e, "transport error while reading request");
                return;
            }
            Ok(Err(e)) => {
                warn!(peer = %self.peer, error = %e, "rejected request");
                self.respond(Response::empty(Status::BadRequest, self.clock.value()))
                    .await;
                return;
            }
            Err(_) => {
                warn!(peer = %self.peer, "timed out waiting for request");
                return;
            }
        };

        let response = match request {
            Request::Put { lamport, body, .. } => self.handle_put(lamport, &body),
            Request::Get { .. } => self.handle_get(),
        };
        self.respond(response).await;
    }

    /// A write: fold the producer's clock in (plain tick when it sent
    /// none), then store the reading last-writer-wins. A body that
    /// fails to parse leaves the store untouched.
    fn handle_put(&self, remote: Option<u64>, body: &[u8]) -> Response {
        let lamport = match remote {
            Some(remote) => self.clock.merge(remote),
            None => self.clock.tick(),
        };

        let payload: Value = match serde_json::from_slice(body) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(peer = %self.peer, error = %e, "PUT body is not valid JSON");
                return Response::empty(Status::ServerError, lamport);
            }
        };
        let id = match payload.get("id").and_then(Value::as_str) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                warn!(peer = %self.peer, "PUT body has no usable id field");
                return Response::empty(Status::ServerError, lamport);
            }
        };

        self.store.put(id.clone(), payload);
        info!(peer = %self.peer, %id, lamport, "stored reading");
        Response::empty(Status::Created, lamport)
    }

    /// A read is itself an event in the causal order, so it ticks the
    /// clock before snapshotting.
    fn handle_get(&self) -> Response {
        let lamport = self.clock.tick();
        let snapshot = self.store.snapshot();
        debug!(peer = %self.peer, records = snapshot.len(), lamport, "serving snapshot");
        Response::snapshot(lamport, snapshot)
    }

    async fn respond(&mut self, response: Response) {
        if let Err(e) = self.write_response(&response).await {
            error!(peer = %self.peer, error = %e, "failed to write response");
        }
    }

    async fn write_response(&mut self, response: &Response) -> std::io::Result<()> {
        self.stream.write_all(&response.encode()).await?;
        self.stream.flush().await
    }
}
