//! Byte-counting wrapper for upload bodies.
//!
//! Reports fractional progress (0-100) through a caller-supplied callback as
//! chunks leave the client. Progress is derived from bytes sent over total
//! bytes and only ever moves forward; when the total is unknown the callback
//! is simply never invoked before completion.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::Stream;

/// Progress observer. Receives whole percentages, non-decreasing.
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

pub(crate) struct ProgressStream<S> {
    inner: S,
    total: u64,
    sent: u64,
    last_reported: Option<u8>,
    report: ProgressFn,
}

impl<S> ProgressStream<S> {
    pub(crate) fn new(inner: S, total: u64, report: ProgressFn) -> Self {
        Self {
            inner,
            total,
            sent: 0,
            last_reported: None,
            report,
        }
    }
}

impl<S> Stream for ProgressStream<S>
where
    S: Stream<Item = std::io::Result<Bytes>> + Unpin,
{
    type Item = std::io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let polled = Pin::new(&mut this.inner).poll_next(cx);
        if let Poll::Ready(Some(Ok(chunk))) = &polled {
            this.sent += chunk.len() as u64;
            if this.total > 0 {
                let pct = (this.sent.min(this.total) * 100 / this.total) as u8;
                if this.last_reported.is_none_or(|prev| pct > prev) {
                    this.last_reported = Some(pct);
                    (this.report)(pct);
                }
            }
        }
        polled
    }
}
