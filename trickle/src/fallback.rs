use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::unpack::{unpack, ChunkStream};
use crate::{Config, Content, Error, Html};

/// What a [`Fallback`] renders instead of its failed content.
pub enum Replacement {
    Template(Html),
    With(Box<dyn FnOnce(Error) -> Html + Send>),
}

impl Replacement {
    fn resolve(self, error: Error) -> Html {
        match self {
            Replacement::Template(html) => html,
            Replacement::With(f) => f(error),
        }
    }
}

/// Content with a replacement for when producing it fails.
///
/// Chunks of the content that were produced before the failure have already
/// been handed to the consumer and stay there; the replacement continues from
/// that point. Failures inside the replacement are not caught again.
pub struct Fallback {
    content: Content,
    replacement: Replacement,
}

enum State {
    Primary {
        chunks: ChunkStream,
        replacement: Replacement,
        config: Arc<Config>,
    },
    Replacement(ChunkStream),
}

impl Fallback {
    pub fn new(content: impl Into<Content>, replacement: Replacement) -> Self {
        Fallback {
            content: content.into(),
            replacement,
        }
    }

    pub(crate) fn chunks(self, config: &Arc<Config>) -> ChunkStream {
        let state = State::Primary {
            chunks: unpack(self.content, config),
            replacement: self.replacement,
            config: config.clone(),
        };
        stream::unfold(state, |state| async move {
            match state {
                State::Primary {
                    mut chunks,
                    replacement,
                    config,
                } => match chunks.next().await? {
                    Ok(chunk) => Some((
                        Ok(chunk),
                        State::Primary {
                            chunks,
                            replacement,
                            config,
                        },
                    )),
                    Err(error) => {
                        drop(chunks);
                        tracing::debug!(%error, "content failed, rendering fallback");
                        let mut chunks = replacement.resolve(error).chunks(&config);
                        let item = chunks.next().await?;
                        Some((item, State::Replacement(chunks)))
                    }
                },
                State::Replacement(mut chunks) => {
                    let item = chunks.next().await?;
                    Some((item, State::Replacement(chunks)))
                }
            }
        })
        .boxed()
    }
}

/// Renders `content`, switching to `replacement` if it fails.
pub fn fallback(content: impl Into<Content>, replacement: Html) -> Fallback {
    Fallback::new(content, Replacement::Template(replacement))
}

/// Like [`fallback`], but builds the replacement from the error.
pub fn fallback_with<F>(content: impl Into<Content>, replacement: F) -> Fallback
where
    F: FnOnce(Error) -> Html + Send + 'static,
{
    Fallback::new(content, Replacement::With(Box::new(replacement)))
}
