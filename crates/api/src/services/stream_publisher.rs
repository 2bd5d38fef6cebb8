//! Streams an encoded artifact into an HTTP response.
//!
//! The response, headers included, is built before any body byte exists.
//! Bytes are then pushed through an in-memory pipe by a spawned writer task,
//! and the pipe's read half is the response body. Completion is decided on
//! the body side: the publish succeeds once the server has pulled every byte
//! out of the body, and fails if the body is dropped before that. The outcome
//! is reported exactly once through a `PendingPublish`.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::{
    body::{Body, Bytes},
    http::{header, StatusCode},
    response::Response,
};
use domain::models::EncodedArtifact;
use futures_util::Stream;
use thiserror::Error;
use tokio::io::{AsyncWriteExt, DuplexStream};
use tokio::sync::oneshot;
use tokio_util::io::ReaderStream;

/// Size of the in-memory pipe between the writer task and the body.
pub const PIPE_CAPACITY: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum PublishError {
    /// The reading side went away (client disconnect, dropped response).
    #[error("Response sink closed before the artifact was fully written")]
    SinkClosed,

    #[error("Failed to build response: {0}")]
    Response(String),
}

type Outcome = Result<u64, PublishError>;

/// Completion handle of one publish. Resolves to the number of bytes delivered.
#[derive(Debug)]
pub struct PendingPublish {
    rx: oneshot::Receiver<Outcome>,
}

impl Future for PendingPublish {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|outcome| outcome.unwrap_or(Err(PublishError::SinkClosed)))
    }
}

/// Response body over the pipe's read half that reports how far it got.
///
/// Resolves the completion channel on end of stream, on a read error, or when
/// dropped. Only a body that handed out every expected byte counts as
/// delivered.
struct DeliveryStream {
    inner: ReaderStream<DuplexStream>,
    expected: u64,
    delivered: u64,
    done: Option<oneshot::Sender<Outcome>>,
}

impl DeliveryStream {
    fn new(reader: DuplexStream, expected: u64, done: oneshot::Sender<Outcome>) -> Self {
        Self {
            inner: ReaderStream::new(reader),
            expected,
            delivered: 0,
            done: Some(done),
        }
    }

    fn outcome(&self) -> Outcome {
        if self.delivered == self.expected {
            Ok(self.delivered)
        } else {
            Err(PublishError::SinkClosed)
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        if let Some(done) = self.done.take() {
            // Nobody waiting for the outcome is fine.
            let _ = done.send(outcome);
        }
    }
}

impl Stream for DeliveryStream {
    type Item = std::io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.delivered += chunk.len() as u64;
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                this.finish(Err(PublishError::SinkClosed));
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                let outcome = this.outcome();
                this.finish(outcome);
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for DeliveryStream {
    fn drop(&mut self) {
        // With a Content-Length the server may drop the body right after the
        // last byte instead of polling it to the end.
        let outcome = self.outcome();
        if outcome.is_err() {
            tracing::debug!(
                delivered = self.delivered,
                expected = self.expected,
                "Response body dropped before the artifact was delivered"
            );
        }
        self.finish(outcome);
    }
}

/// Build the download response for `artifact` and start streaming it.
pub fn publish(artifact: EncodedArtifact) -> Result<(Response, PendingPublish), PublishError> {
    let (reader, writer) = tokio::io::duplex(PIPE_CAPACITY);
    let (tx, rx) = oneshot::channel();
    let body = DeliveryStream::new(reader, artifact.len() as u64, tx);

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, artifact.content_type())
        .header(header::CONTENT_DISPOSITION, artifact.content_disposition())
        .header(header::CONTENT_LENGTH, artifact.len())
        .body(Body::from_stream(body))
        .map_err(|e| PublishError::Response(e.to_string()))?;

    tokio::spawn(write_artifact(writer, artifact.into_bytes()));

    Ok((response, PendingPublish { rx }))
}

async fn write_artifact(mut writer: DuplexStream, bytes: Vec<u8>) {
    let result = async {
        writer.write_all(&bytes).await?;
        writer.shutdown().await
    }
    .await;

    // The body side reports the outcome; a failed write means it is gone.
    if let Err(e) = result {
        tracing::debug!(error = %e, "Response sink closed during write");
    }
}
