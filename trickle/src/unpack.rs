use std::sync::Arc;

use futures::future;
use futures::stream::{self, BoxStream, Stream, StreamExt};

use crate::escape::Escape;
use crate::{Config, Content, Error, Result};

pub(crate) type ChunkStream = BoxStream<'static, Result<String>>;

pub(crate) fn unpack(content: Content, config: &Arc<Config>) -> ChunkStream {
    match content {
        Content::Empty => empty(config),
        Content::Primitive(value) if value.is_empty() => empty(config),
        Content::Primitive(value) => {
            let mut out = String::new();
            config.escape.write(&mut out, &value.as_text());
            chunk(out)
        }
        Content::Template(html) => html.chunks(config),
        Content::Raw(raw) => chunk(raw.into_string()),
        Content::Fallback(fallback) => (*fallback).chunks(config),
        Content::Iter(items) => {
            let config = config.clone();
            until_error(stream::iter(items).flat_map(move |item| unpack(item, &config)))
        }
        Content::Stream(items) => {
            let config = config.clone();
            until_error(items.flat_map(move |item| resolved(item, &config)))
        }
        Content::Deferred(future) => {
            let config = config.clone();
            until_error(stream::once(future).flat_map(move |item| resolved(item, &config)))
        }
        Content::Producer(produce) => {
            let config = config.clone();
            let produced = stream::once(future::lazy(move |_| produce()));
            until_error(produced.flat_map(move |item| resolved(item, &config)))
        }
    }
}

fn resolved(item: Result<Content>, config: &Arc<Config>) -> ChunkStream {
    match item {
        Ok(content) => unpack(content, config),
        Err(error) => failure(error),
    }
}

pub(crate) fn chunk(text: String) -> ChunkStream {
    stream::once(future::ready(Ok(text))).boxed()
}

fn empty(config: &Arc<Config>) -> ChunkStream {
    match config.empty_slot.text() {
        Some(text) => chunk(text.to_string()),
        None => stream::empty().boxed(),
    }
}

fn failure(error: Error) -> ChunkStream {
    stream::once(future::ready(Err(error))).boxed()
}

/// Ends `chunks` after the first `Err` it yields, dropping it unpolled.
pub(crate) fn until_error<S>(chunks: S) -> ChunkStream
where
    S: Stream<Item = Result<String>> + Send + 'static,
{
    stream::unfold(Some(chunks.boxed()), |upstream| async move {
        let mut upstream = upstream?;
        let item = upstream.next().await?;
        let upstream = item.is_ok().then_some(upstream);
        Some((item, upstream))
    })
    .boxed()
}
