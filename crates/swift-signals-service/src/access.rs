//! Stream draining and the intersection authorisation predicate.

use std::collections::HashSet;

use futures::StreamExt;
use swift_signals_core::{RequestScope, Result, ServiceError};
use swift_signals_rpc::{ServiceStream, UserClient};

/// Collect a server stream into a `Vec`.
///
/// # Errors
///
/// Any mid-stream failure becomes `internal`; the items received before it are
/// discarded.
pub async fn drain<T>(mut stream: ServiceStream<T>, what: &'static str) -> Result<Vec<T>> {
    let mut items = Vec::new();
    while let Some(item) = stream.next().await {
        match item {
            Ok(item) => items.push(item),
            Err(err) => {
                tracing::warn!(what, received = items.len(), error = %err, "stream failed");
                return Err(ServiceError::internal(format!("failed to receive {what}"))
                    .with_context("received", items.len())
                    .with_cause(err));
            }
        }
    }
    Ok(items)
}

/// The set of intersection IDs on a user's record.
///
/// # Errors
///
/// Failure to open the stream is returned unchanged; a mid-stream failure is `internal`.
pub async fn intersection_ids(
    users: &dyn UserClient,
    scope: &RequestScope,
    user_id: &str,
) -> Result<HashSet<String>> {
    tracing::debug!(user_id, "calling user service to retrieve user's intersection IDs");
    let stream = users.get_user_intersection_ids(scope, user_id).await?;
    let ids = drain(stream, "intersection IDs").await?;
    Ok(ids.into_iter().map(|r| r.intersection_id).collect())
}

/// Succeed only if `intersection_id` is on the caller's record.
///
/// # Errors
///
/// `forbidden` if it is not, plus anything [`intersection_ids`] returns.
pub async fn ensure_intersection_access(
    users: &dyn UserClient,
    scope: &RequestScope,
    user_id: &str,
    intersection_id: &str,
) -> Result<()> {
    if intersection_ids(users, scope, user_id)
        .await?
        .contains(intersection_id)
    {
        return Ok(());
    }
    Err(
        ServiceError::forbidden("intersection not in user's intersection list")
            .with_context("intersection_id", intersection_id)
            .with_context("user_id", user_id),
    )
}

#[cfg(test)]
mod tests {
    use futures::stream;
    use swift_signals_core::ErrorKind;
    use swift_signals_rpc::proto::user::methods;
    use swift_signals_rpc::testing::FakeUserClient;

    use super::*;

    fn items(values: Vec<Result<u32>>) -> ServiceStream<u32> {
        Box::pin(stream::iter(values))
    }

    #[tokio::test]
    async fn drains_until_eof() {
        let drained = drain(items(vec![Ok(1), Ok(2), Ok(3)]), "numbers").await.unwrap();
        assert_eq!(drained, vec![1, 2, 3]);

        let drained = drain(items(vec![]), "numbers").await.unwrap();
        assert!(drained.is_empty());
    }

    #[tokio::test]
    async fn mid_stream_error_is_internal_without_partial_result() {
        let stream = items(vec![
            Ok(1),
            Ok(2),
            Err(ServiceError::unavailable("connection reset")),
            Ok(3),
        ]);

        let err = drain(stream, "numbers").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.context().get("received").map(String::as_str), Some("2"));
    }

    #[tokio::test]
    async fn predicate_checks_membership() {
        let users = FakeUserClient::new();
        users.insert_member("u-1", &["int-7", "int-42"]);
        let scope = RequestScope::new("req");

        ensure_intersection_access(&users, &scope, "u-1", "int-42")
            .await
            .unwrap();

        let err = ensure_intersection_access(&users, &scope, "u-1", "int-9")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert_eq!(err.message(), "intersection not in user's intersection list");
    }

    #[tokio::test]
    async fn predicate_stream_failure_is_internal() {
        let users = FakeUserClient::new();
        users.insert_member("u-1", &["int-7", "int-42"]);
        users.break_stream_after(methods::GET_USER_INTERSECTION_IDS, 1);

        let err = ensure_intersection_access(&users, &RequestScope::new("req"), "u-1", "int-7")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
