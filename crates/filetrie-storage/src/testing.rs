//! Test readers.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};

/// Reader that hands out at most `step` bytes per read and optionally fails
/// once `fail_at` bytes have been delivered.
pub(crate) struct Trickle {
    data: Vec<u8>,
    pos: usize,
    step: usize,
    fail_at: Option<usize>,
}

impl Trickle {
    pub(crate) fn new(data: Vec<u8>, step: usize) -> Self {
        Self {
            data,
            pos: 0,
            step,
            fail_at: None,
        }
    }

    pub(crate) fn failing_at(mut self, at: usize) -> Self {
        self.fail_at = Some(at);
        self
    }
}

impl AsyncRead for Trickle {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = &mut *self;
        let mut end = (this.pos + this.step)
            .min(this.data.len())
            .min(this.pos + buf.remaining());
        if let Some(at) = this.fail_at {
            if this.pos >= at {
                return Poll::Ready(Err(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "stream aborted",
                )));
            }
            end = end.min(at);
        }
        buf.put_slice(&this.data[this.pos..end]);
        this.pos = end;
        Poll::Ready(Ok(()))
    }
}

/// Deterministic pseudo-random content.
pub(crate) fn content(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed) ^ ((i >> 8) as u8))
        .collect()
}
