//! Transport for the RPC clients.
//!
//! [`RpcTransport`] is the seam between the typed clients and the network. The
//! production implementation, [`RpcChannel`], wraps one multiplexed tonic channel per
//! backend; it is cheap to clone and safe to share across concurrent requests.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::Stream;
use prost::Message;
use thiserror::Error;
use tonic::client::Grpc;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};
use tonic::{Request, Response, Status};

/// A server-streamed sequence of wire messages.
pub type RpcStream<T> = Pin<Box<dyn Stream<Item = Result<T, Status>> + Send>>;

/// Dialing a backend failed.
#[derive(Debug, Error)]
#[error("failed to connect to {addr}: {source}")]
pub struct ConnectError {
    /// The address that was dialled.
    pub addr: String,
    /// The underlying transport error.
    #[source]
    pub source: tonic::transport::Error,
}

/// Invokes gRPC methods by path.
///
/// This trait abstracts the network so the typed clients can be exercised against
/// recording doubles in tests.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Invoke a unary method.
    async fn unary<Req, Resp>(
        &self,
        path: &'static str,
        request: Request<Req>,
    ) -> Result<Response<Resp>, Status>
    where
        Req: Message + Send + Sync + 'static,
        Resp: Message + Default + Send + Sync + 'static;

    /// Invoke a server-streaming method.
    async fn server_streaming<Req, Resp>(
        &self,
        path: &'static str,
        request: Request<Req>,
    ) -> Result<Response<RpcStream<Resp>>, Status>
    where
        Req: Message + Send + Sync + 'static,
        Resp: Message + Default + Send + Sync + 'static;
}

/// A connection to one backend service.
#[derive(Debug, Clone)]
pub struct RpcChannel {
    grpc: Grpc<Channel>,
    addr: String,
}

impl RpcChannel {
    /// Dial `addr` (`host:port`, plaintext HTTP/2) and wait for the connection.
    ///
    /// # Errors
    ///
    /// Returns `ConnectError` if the address is malformed, the dial times out, or
    /// the backend refuses the connection.
    pub async fn connect(addr: &str, connect_timeout: Duration) -> Result<Self, ConnectError> {
        let to_error = |source| ConnectError {
            addr: addr.to_string(),
            source,
        };

        let endpoint = Endpoint::from_shared(format!("http://{addr}"))
            .map_err(to_error)?
            .connect_timeout(connect_timeout);
        let channel = endpoint.connect().await.map_err(to_error)?;

        tracing::info!(addr = %addr, "Connected to backend");
        Ok(Self::new(channel, addr))
    }

    /// Wrap an existing channel.
    #[must_use]
    pub fn new(channel: Channel, addr: impl Into<String>) -> Self {
        Self {
            grpc: Grpc::new(channel),
            addr: addr.into(),
        }
    }

    /// The address this channel was dialled with.
    #[must_use]
    pub fn addr(&self) -> &str {
        &self.addr
    }

    async fn ready(&self) -> Result<Grpc<Channel>, Status> {
        let mut grpc = self.grpc.clone();
        grpc.ready()
            .await
            .map_err(|e| Status::unavailable(format!("{} is not ready: {e}", self.addr)))?;
        Ok(grpc)
    }
}

#[async_trait]
impl RpcTransport for RpcChannel {
    async fn unary<Req, Resp>(
        &self,
        path: &'static str,
        request: Request<Req>,
    ) -> Result<Response<Resp>, Status>
    where
        Req: Message + Send + Sync + 'static,
        Resp: Message + Default + Send + Sync + 'static,
    {
        let mut grpc = self.ready().await?;
        grpc.unary(
            request,
            PathAndQuery::from_static(path),
            ProstCodec::<Req, Resp>::default(),
        )
        .await
    }

    async fn server_streaming<Req, Resp>(
        &self,
        path: &'static str,
        request: Request<Req>,
    ) -> Result<Response<RpcStream<Resp>>, Status>
    where
        Req: Message + Send + Sync + 'static,
        Resp: Message + Default + Send + Sync + 'static,
    {
        let mut grpc = self.ready().await?;
        let response = grpc
            .server_streaming(
                request,
                PathAndQuery::from_static(path),
                ProstCodec::<Req, Resp>::default(),
            )
            .await?;
        Ok(response.map(|stream| Box::pin(stream) as RpcStream<Resp>))
    }
}

/// A transport double that records every request and answers with default messages.
#[cfg(test)]
pub(crate) mod recording {
    use std::time::Duration;

    use async_trait::async_trait;
    use futures::stream;
    use parking_lot::Mutex;
    use prost::Message;
    use tonic::{Request, Response, Status};

    use super::{RpcStream, RpcTransport};
    use crate::call::REQUEST_ID_METADATA;

    /// One observed invocation.
    #[derive(Debug, Clone)]
    pub struct RecordedCall {
        pub path: &'static str,
        pub timeout: Option<Duration>,
        pub request_id: Option<String>,
        pub body: Vec<u8>,
    }

    impl RecordedCall {
        /// Decode the request message.
        pub fn decode<M: Message + Default>(&self) -> M {
            M::decode(self.body.as_slice()).unwrap()
        }
    }

    #[derive(Debug, Default)]
    pub struct RecordingTransport {
        calls: Mutex<Vec<RecordedCall>>,
        failure: Mutex<Option<Status>>,
        stream_items: usize,
    }

    impl RecordingTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Streams yield `items` default messages before EOF.
        pub fn with_stream_items(items: usize) -> Self {
            Self {
                stream_items: items,
                ..Self::default()
            }
        }

        /// Answer every subsequent call with `status`.
        pub fn fail_with(&self, status: Status) {
            *self.failure.lock() = Some(status);
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().clone()
        }

        pub fn last(&self) -> RecordedCall {
            self.calls.lock().last().cloned().unwrap()
        }

        fn record<Req: Message>(&self, path: &'static str, request: &Request<Req>) -> Result<(), Status> {
            let metadata = request.metadata();
            self.calls.lock().push(RecordedCall {
                path,
                timeout: metadata
                    .get("grpc-timeout")
                    .and_then(|v| v.to_str().ok())
                    .and_then(parse_grpc_timeout),
                request_id: metadata
                    .get(REQUEST_ID_METADATA)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string),
                body: request.get_ref().encode_to_vec(),
            });
            match self.failure.lock().clone() {
                Some(status) => Err(status),
                None => Ok(()),
            }
        }
    }

    /// Parse a `grpc-timeout` header value such as `5000000u`.
    pub fn parse_grpc_timeout(value: &str) -> Option<Duration> {
        let (digits, unit) = value.split_at(value.len().checked_sub(1)?);
        let amount: u64 = digits.parse().ok()?;
        Some(match unit {
            "H" => Duration::from_secs(amount * 3600),
            "M" => Duration::from_secs(amount * 60),
            "S" => Duration::from_secs(amount),
            "m" => Duration::from_millis(amount),
            "u" => Duration::from_micros(amount),
            "n" => Duration::from_nanos(amount),
            _ => return None,
        })
    }

    #[async_trait]
    impl RpcTransport for RecordingTransport {
        async fn unary<Req, Resp>(
            &self,
            path: &'static str,
            request: Request<Req>,
        ) -> Result<Response<Resp>, Status>
        where
            Req: Message + Send + Sync + 'static,
            Resp: Message + Default + Send + Sync + 'static,
        {
            self.record(path, &request)?;
            Ok(Response::new(Resp::default()))
        }

        async fn server_streaming<Req, Resp>(
            &self,
            path: &'static str,
            request: Request<Req>,
        ) -> Result<Response<RpcStream<Resp>>, Status>
        where
            Req: Message + Send + Sync + 'static,
            Resp: Message + Default + Send + Sync + 'static,
        {
            self.record(path, &request)?;
            let items: Vec<Result<Resp, Status>> =
                (0..self.stream_items).map(|_| Ok(Resp::default())).collect();
            Ok(Response::new(Box::pin(stream::iter(items)) as RpcStream<Resp>))
        }
    }
}
