use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::{ready, StreamExt};
use http_body::{Body, Frame, SizeHint};

use crate::{BodyMode, Chunks, Error};

enum State {
    Streaming(Chunks),
    Buffered { chunks: Chunks, buf: String },
    Done,
}

pub struct HtmlBody {
    state: State,
    mode: BodyMode,
    started: bool,
    sent: usize,
}

impl HtmlBody {
    pub fn new(chunks: Chunks, mode: BodyMode) -> Self {
        let state = match mode {
            BodyMode::Streaming => State::Streaming(chunks),
            BodyMode::Buffered => State::Buffered {
                chunks,
                buf: String::new(),
            },
        };
        HtmlBody {
            state,
            mode,
            started: false,
            sent: 0,
        }
    }

    pub fn streaming(chunks: Chunks) -> Self {
        Self::new(chunks, BodyMode::Streaming)
    }

    pub fn buffered(chunks: Chunks) -> Self {
        Self::new(chunks, BodyMode::Buffered)
    }

    pub fn mode(&self) -> BodyMode {
        self.mode
    }

    fn data(&mut self, text: String) -> Poll<Option<Result<Frame<Bytes>, Error>>> {
        self.sent += text.len();
        tracing::trace!(len = text.len(), "html body frame");
        Poll::Ready(Some(Ok(Frame::data(Bytes::from(text)))))
    }

    fn fail(&mut self, error: Error) -> Poll<Option<Result<Frame<Bytes>, Error>>> {
        self.state = State::Done;
        tracing::warn!(%error, sent = self.sent, mode = ?self.mode, "html body aborted");
        Poll::Ready(Some(Err(error)))
    }

    fn finish(&mut self) {
        self.state = State::Done;
        tracing::debug!(sent = self.sent, mode = ?self.mode, "html body complete");
    }
}

impl Body for HtmlBody {
    type Data = Bytes;
    type Error = Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        if !this.started {
            this.started = true;
            tracing::debug!(mode = ?this.mode, "html body started");
        }
        loop {
            match &mut this.state {
                State::Streaming(chunks) => match ready!(chunks.poll_next_unpin(cx)) {
                    Some(Ok(text)) if text.is_empty() => continue,
                    Some(Ok(text)) => return this.data(text),
                    Some(Err(error)) => return this.fail(error),
                    None => {
                        this.finish();
                        return Poll::Ready(None);
                    }
                },
                State::Buffered { chunks, buf } => match ready!(chunks.poll_next_unpin(cx)) {
                    Some(Ok(text)) => buf.push_str(&text),
                    Some(Err(error)) => return this.fail(error),
                    None => {
                        let text = mem::take(buf);
                        this.finish();
                        if text.is_empty() {
                            return Poll::Ready(None);
                        }
                        return this.data(text);
                    }
                },
                State::Done => return Poll::Ready(None),
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        matches!(self.state, State::Done)
    }

    fn size_hint(&self) -> SizeHint {
        match self.state {
            State::Done => SizeHint::with_exact(0),
            _ => SizeHint::default(),
        }
    }
}

impl Drop for HtmlBody {
    fn drop(&mut self) {
        if self.started && !matches!(self.state, State::Done) {
            tracing::debug!(sent = self.sent, "html body dropped before completion");
        }
    }
}

impl std::fmt::Debug for HtmlBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlBody")
            .field("mode", &self.mode)
            .field("started", &self.started)
            .field("sent", &self.sent)
            .finish()
    }
}
