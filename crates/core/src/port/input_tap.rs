// Input Tap Port
// Composable pass-through decoration of the bytes written to a command's stdin

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::AsyncWrite;

/// A command's input channel, possibly already wrapped by other taps
pub type BoxedInput = Box<dyn AsyncWrite + Send + Unpin>;

/// Given the next stage's input sink, return a sink that forwards to it
///
/// Implementations must forward every byte unmodified and pass shutdown
/// (end of input) through to `next`.
pub trait InputTap: Send + Sync {
    fn wrap(&self, next: BoxedInput) -> BoxedInput;
}

/// Sees the bytes that an `ObservedInput` forwards
pub trait InputObserver: Send + Unpin {
    /// Called with each chunk after `next` accepted it
    fn on_bytes(&mut self, chunk: &[u8]);

    /// Called once, after end of input was forwarded
    fn on_close(&mut self) {}
}

/// Pass-through writer that reports forwarded bytes to an observer
pub struct ObservedInput<O> {
    next: BoxedInput,
    observer: O,
    closed: bool,
}

impl<O: InputObserver> ObservedInput<O> {
    pub fn new(next: BoxedInput, observer: O) -> Self {
        Self {
            next,
            observer,
            closed: false,
        }
    }
}

impl<O: InputObserver> AsyncWrite for ObservedInput<O> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        match Pin::new(&mut this.next).poll_write(cx, buf) {
            Poll::Ready(Ok(written)) => {
                this.observer.on_bytes(&buf[..written]);
                Poll::Ready(Ok(written))
            }
            other => other,
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().next).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let polled = Pin::new(&mut this.next).poll_shutdown(cx);
        if let Poll::Ready(Ok(())) = polled {
            if !this.closed {
                this.closed = true;
                this.observer.on_close();
            }
        }
        polled
    }
}
