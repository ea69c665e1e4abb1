//! Response relay.
//!
//! # Responsibilities
//! - Hand the upstream response back to the caller unmodified
//!
//! # Design Decisions
//! - Status, headers and extensions are moved across as-is; hyper keeps a
//!   non-canonical reason phrase in the extensions, so status text survives
//! - The body is the live upstream stream. Each frame is written to the
//!   caller as it arrives, and upstream reads pause while the caller is
//!   slow to drain
//! - Dropping the relayed body (caller gone) drops the upstream connection.
//!   [`RelayBody`] logs that at debug level when it happens mid-stream

use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::response::Response;
use hyper::body::{Bytes, Frame, Incoming, SizeHint};

/// Relay an upstream response to the caller without touching it.
pub fn relay_response(upstream: Response<Incoming>) -> Response {
    let (parts, body) = upstream.into_parts();
    Response::from_parts(parts, Body::new(RelayBody::new(body)))
}

/// Pass-through body that notices when it is dropped before the upstream
/// finished sending.
pub struct RelayBody<B> {
    inner: B,
    finished: bool,
}

impl<B: hyper::body::Body> RelayBody<B> {
    pub fn new(inner: B) -> Self {
        // Empty bodies (204, HEAD) are never polled.
        let finished = inner.is_end_stream();
        Self { inner, finished }
    }
}

impl<B> hyper::body::Body for RelayBody<B>
where
    B: hyper::body::Body<Data = Bytes> + Unpin,
{
    type Data = Bytes;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, B::Error>>> {
        let this = self.get_mut();
        let poll = Pin::new(&mut this.inner).poll_frame(cx);
        let done = matches!(poll, Poll::Ready(None) | Poll::Ready(Some(Err(_))));
        if done || this.inner.is_end_stream() {
            this.finished = true;
        }
        poll
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl<B> Drop for RelayBody<B> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!(
                "Caller disconnected before the upstream response ended; releasing upstream connection"
            );
        }
    }
}

/// True for `text/event-stream` responses. Only used for logging.
pub fn is_event_stream<B>(response: &Response<B>) -> bool {
    response
        .headers()
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.trim_start().starts_with("text/event-stream"))
}
