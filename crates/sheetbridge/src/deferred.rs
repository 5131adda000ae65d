//! Future handed back for every request crossing a context boundary.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use serde_json::Value;
use tokio::sync::oneshot;

use crate::error::{Error, Result};

/// Settles exactly once with the reply value or an [`Error`].
///
/// A `Deferred` is either backed by a pending request in the correlation
/// table or created already settled (validation failures, local results).
#[derive(Debug)]
pub struct Deferred {
    state: State,
}

#[derive(Debug)]
enum State {
    Pending(oneshot::Receiver<Result<Value>>),
    Settled(Option<Result<Value>>),
}

impl Deferred {
    pub(crate) fn pending(rx: oneshot::Receiver<Result<Value>>) -> Self {
        Self {
            state: State::Pending(rx),
        }
    }

    pub fn resolved(value: Value) -> Self {
        Self {
            state: State::Settled(Some(Ok(value))),
        }
    }

    pub fn rejected(error: Error) -> Self {
        Self {
            state: State::Settled(Some(Err(error))),
        }
    }
}

impl Future for Deferred {
    type Output = Result<Value>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.state {
            State::Pending(rx) => match Pin::new(rx).poll(cx) {
                Poll::Ready(Ok(result)) => {
                    self.state = State::Settled(None);
                    Poll::Ready(result)
                }
                Poll::Ready(Err(_)) => {
                    self.state = State::Settled(None);
                    Poll::Ready(Err(Error::Closed))
                }
                Poll::Pending => Poll::Pending,
            },
            State::Settled(result) => Poll::Ready(result.take().unwrap_or(Err(Error::Closed))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_pending_resolves_from_sender() {
        let (tx, rx) = oneshot::channel();
        let deferred = Deferred::pending(rx);
        tx.send(Ok(json!(42))).unwrap();
        assert_eq!(deferred.await.unwrap(), json!(42));
    }

    #[tokio::test]
    async fn test_dropped_sender_is_closed() {
        let (tx, rx) = oneshot::channel::<Result<Value>>();
        drop(tx);
        assert!(matches!(Deferred::pending(rx).await, Err(Error::Closed)));
    }

    #[tokio::test]
    async fn test_pre_settled() {
        assert_eq!(Deferred::resolved(json!("x")).await.unwrap(), json!("x"));
        let err = Deferred::rejected(Error::InvalidRequest("empty".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }
}
