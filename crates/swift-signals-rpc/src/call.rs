//! Per-call plumbing shared by the typed clients: request metadata, deadlines and
//! error mapping.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use futures::{Stream, StreamExt};
use prost::Message;
use swift_signals_core::{RequestScope, Result, ServiceError};
use tonic::metadata::AsciiMetadataValue;
use tonic::{Request, Response, Status};

use crate::channel::{RpcStream, RpcTransport};
use crate::status::from_status;

/// Deadline for ordinary unary calls.
pub const UNARY_TIMEOUT: Duration = Duration::from_secs(5);

/// Deadline for a full optimisation run. Hardware dependent; override via configuration.
pub const OPTIMISATION_TIMEOUT: Duration = Duration::from_secs(5 * 60 * 60);

/// Metadata key carrying the gateway's request ID to the backends.
pub const REQUEST_ID_METADATA: &str = "x-request-id";

/// A server-streamed sequence whose failures are already taxonomy errors.
pub type ServiceStream<T> = Pin<Box<dyn Stream<Item = Result<T>> + Send>>;

/// Build a request carrying the request ID and, if given, a `grpc-timeout`.
pub(crate) fn request<T>(scope: &RequestScope, message: T, timeout: Option<Duration>) -> Request<T> {
    let mut request = Request::new(message);
    if let Some(timeout) = timeout {
        request.set_timeout(timeout);
    }
    if let Ok(value) = scope.request_id().parse::<AsciiMetadataValue>() {
        request.metadata_mut().insert(REQUEST_ID_METADATA, value);
    }
    request
}

/// Await a unary call, bounded by `timeout`, and map any failure into the taxonomy.
pub(crate) async fn unary<T, F>(method: &'static str, timeout: Duration, call: F) -> Result<T>
where
    F: Future<Output = std::result::Result<Response<T>, Status>>,
{
    let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
    tracing::debug!(method, timeout_ms, "rpc call");

    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(response)) => Ok(response.into_inner()),
        Ok(Err(status)) => Err(failed(method, status)),
        Err(_) => Err(failed(
            method,
            Status::deadline_exceeded(format!("{method} did not answer within {timeout:?}")),
        )),
    }
}

/// Open a server stream. Only the caller's own deadline, if any, bounds the call.
pub(crate) async fn server_streaming<T, F>(
    scope: &RequestScope,
    method: &'static str,
    call: F,
) -> Result<ServiceStream<T>>
where
    T: Send + 'static,
    F: Future<Output = std::result::Result<Response<RpcStream<T>>, Status>>,
{
    tracing::debug!(method, "rpc stream");

    let opened = match scope.remaining() {
        Some(remaining) => tokio::time::timeout(remaining, call)
            .await
            .unwrap_or_else(|_| Err(Status::deadline_exceeded("caller deadline elapsed"))),
        None => call.await,
    };

    let stream = opened.map_err(|status| failed(method, status))?.into_inner();
    Ok(Box::pin(stream.map(move |item| item.map_err(|status| failed(method, status)))))
}

/// Issue a unary call through `transport` under `min(caller deadline, limit)`.
pub(crate) async fn invoke<T, Req, Resp>(
    transport: &T,
    scope: &RequestScope,
    method: &'static str,
    message: Req,
    limit: Duration,
) -> Result<Resp>
where
    T: RpcTransport,
    Req: Message + Send + Sync + 'static,
    Resp: Message + Default + Send + Sync + 'static,
{
    let timeout = scope.bounded(limit);
    let request = request(scope, message, Some(timeout));
    unary(method, timeout, transport.unary(method, request)).await
}

/// Open a server stream through `transport`.
pub(crate) async fn open_stream<T, Req, Resp>(
    transport: &T,
    scope: &RequestScope,
    method: &'static str,
    message: Req,
) -> Result<ServiceStream<Resp>>
where
    T: RpcTransport,
    Req: Message + Send + Sync + 'static,
    Resp: Message + Default + Send + Sync + 'static,
{
    let request = request(scope, message, scope.remaining());
    server_streaming(scope, method, transport.server_streaming(method, request)).await
}

fn failed(method: &'static str, status: Status) -> ServiceError {
    let err = from_status(status).with_context("method", method);
    tracing::debug!(method, kind = %err.kind(), error = %err, "rpc failed");
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use swift_signals_core::ErrorKind;

    #[test]
    fn request_carries_metadata() {
        let scope = RequestScope::new("req-123");
        let request = request(&scope, (), Some(Duration::from_secs(5)));

        assert_eq!(
            request.metadata().get(REQUEST_ID_METADATA).unwrap(),
            "req-123"
        );
        assert!(request.metadata().get("grpc-timeout").is_some());
    }

    #[test]
    fn request_without_timeout() {
        let scope = RequestScope::new("req-123");
        let request = request(&scope, (), None);
        assert!(request.metadata().get("grpc-timeout").is_none());
    }

    #[tokio::test]
    async fn unary_maps_status() {
        let result: Result<()> = unary("/x.Y/Z", UNARY_TIMEOUT, async {
            Err(Status::already_exists("email taken"))
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(err.message(), "email taken");
    }

    #[tokio::test(start_paused = true)]
    async fn unary_times_out() {
        let result: Result<()> = unary("/x.Y/Z", Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Response::new(()))
        })
        .await;

        assert_eq!(result.unwrap_err().kind(), ErrorKind::Internal);
    }

    #[tokio::test]
    async fn stream_items_are_mapped() {
        let scope = RequestScope::new("req-1");
        let items: Vec<std::result::Result<u32, Status>> =
            vec![Ok(1), Err(Status::unavailable("gone"))];
        let opened = async move {
            Ok(Response::new(Box::pin(stream::iter(items)) as RpcStream<u32>))
        };

        let collected: Vec<Result<u32>> = server_streaming(&scope, "/x.Y/List", opened)
            .await
            .unwrap()
            .collect()
            .await;

        assert_eq!(collected.len(), 2);
        assert_eq!(*collected[0].as_ref().unwrap(), 1);
        assert_eq!(
            collected[1].as_ref().unwrap_err().kind(),
            ErrorKind::Unavailable
        );
    }
}
