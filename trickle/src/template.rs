use std::borrow::Cow;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::stream::{self, Stream, StreamExt, TryStreamExt};

use crate::unpack::{chunk, unpack, until_error, ChunkStream};
use crate::{Config, Content, Result};

/// Literal segments and slot values captured by [`html!`](crate::html).
///
/// Nothing is rendered until the chunks are pulled. Literal segments come from
/// the template source and are written verbatim; slot values go through the
/// escaper.
pub struct Html {
    strings: Vec<Cow<'static, str>>,
    args: Vec<Content>,
}

impl Html {
    /// Normally called by the macros, which guarantee one more segment than
    /// there are slots.
    pub fn new(strings: Vec<Cow<'static, str>>, args: Vec<Content>) -> Self {
        debug_assert_eq!(strings.len(), args.len() + 1, "segments must outnumber slots by one");
        Html { strings, args }
    }

    pub fn strings(&self) -> &[Cow<'static, str>] {
        &self.strings
    }

    pub fn args(&self) -> &[Content] {
        &self.args
    }

    pub fn into_chunks(self) -> Chunks {
        self.into_chunks_with(Config::default())
    }

    pub fn into_chunks_with(self, config: impl Into<Arc<Config>>) -> Chunks {
        Chunks {
            inner: self.chunks(&config.into()),
        }
    }

    /// Produces the whole document as one string.
    pub async fn render(self) -> Result<String> {
        self.into_chunks().try_collect().await
    }

    pub async fn render_with(self, config: impl Into<Arc<Config>>) -> Result<String> {
        self.into_chunks_with(config).try_collect().await
    }

    pub(crate) fn chunks(self, config: &Arc<Config>) -> ChunkStream {
        let config = config.clone();
        let pieces = Interleave::new(self.strings.into_iter(), self.args.into_iter());
        until_error(stream::iter(pieces).flat_map(move |piece| match piece {
            Piece::Literal(text) => chunk(text.into_owned()),
            Piece::Slot(content) => unpack(content, &config),
        }))
    }
}

impl fmt::Debug for Html {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Html")
            .field("strings", &self.strings)
            .field("args", &self.args)
            .finish()
    }
}

enum Piece {
    Literal(Cow<'static, str>),
    Slot(Content),
}

/// Alternates segments and slots until either runs out.
struct Interleave<S, A> {
    strings: S,
    args: A,
    slot_next: bool,
}

impl<S, A> Interleave<S, A> {
    fn new(strings: S, args: A) -> Self {
        Interleave {
            strings,
            args,
            slot_next: false,
        }
    }
}

impl<S, A> Iterator for Interleave<S, A>
where
    S: Iterator<Item = Cow<'static, str>>,
    A: Iterator<Item = Content>,
{
    type Item = Piece;

    fn next(&mut self) -> Option<Self::Item> {
        let piece = if self.slot_next {
            self.args.next().map(Piece::Slot)
        } else {
            self.strings.next().map(Piece::Literal)
        };
        if piece.is_some() {
            self.slot_next = !self.slot_next;
        }
        piece
    }
}

/// The lazily produced text of a template.
///
/// Yields at most one `Err`, after which it ends.
pub struct Chunks {
    inner: ChunkStream,
}

impl Stream for Chunks {
    type Item = Result<String>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl fmt::Debug for Chunks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Chunks(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fallback, fallback_with, html, unsafe_html, Error};
    use futures::executor::block_on;
    use futures::stream;
    use proptest::prelude::*;
    use std::time::Duration;
    use tokio::time::sleep;

    async fn timeout(ms: u64) {
        sleep(Duration::from_millis(ms)).await;
    }

    async fn render(html: Html) -> String {
        html.render().await.expect("render")
    }

    #[tokio::test]
    async fn test_static() {
        assert_eq!(render(html!("<div></div>")).await, "<div></div>");
    }

    #[tokio::test]
    async fn test_escaping() {
        assert_eq!(
            render(html!("<div>{}</div>", "<div></div>")).await,
            "<div>&lt;div&gt;&lt;/div&gt;</div>"
        );
    }

    #[tokio::test]
    async fn test_literal_segments_are_not_escaped() {
        let name = "<b>";
        assert_eq!(
            render(html!("<p class=\"x\">&nbsp;{name}</p>")).await,
            "<p class=\"x\">&nbsp;&lt;b&gt;</p>"
        );
    }

    #[tokio::test]
    async fn test_deferred_template() {
        let inner = Content::deferred(async {
            timeout(10).await;
            Ok::<_, Error>(html!("<div></div>"))
        });
        assert_eq!(render(html!("<div>{}</div>", inner)).await, "<div><div></div></div>");
    }

    #[tokio::test]
    async fn test_async_producer() {
        let inner = Content::async_producer(|| async {
            timeout(10).await;
            Ok::<_, Error>(html!("<div></div>"))
        });
        assert_eq!(render(html!("<div>{}</div>", inner)).await, "<div><div></div></div>");
    }

    fn items() -> Content {
        Content::stream(stream::unfold(0, |i| async move {
            if i == 2 {
                return None;
            }
            timeout(10).await;
            let item = match i {
                0 => html!("<li>1</li>"),
                _ => html!("<li>2</li>"),
            };
            Some((Ok::<_, Error>(item), i + 1))
        }))
    }

    #[tokio::test]
    async fn test_async_stream() {
        assert_eq!(render(html!("<ul>{}</ul>", items())).await, "<ul><li>1</li><li>2</li></ul>");
    }

    #[tokio::test]
    async fn test_producer_of_stream() {
        let list = Content::producer(|| Ok::<_, Error>(items()));
        assert_eq!(render(html!("<ul>{}</ul>", list)).await, "<ul><li>1</li><li>2</li></ul>");
    }

    #[tokio::test]
    async fn test_deferred_list() {
        let list = Content::deferred(async {
            timeout(10).await;
            Ok::<_, Error>(vec![html!("<li>1</li>"), html!("<li>2</li>")])
        });
        assert_eq!(render(html!("<ul>{}</ul>", list)).await, "<ul><li>1</li><li>2</li></ul>");
    }

    #[tokio::test]
    async fn test_deferred_stream() {
        let list = Content::deferred(async {
            timeout(10).await;
            Ok::<_, Error>(items())
        });
        assert_eq!(render(html!("<ul>{}</ul>", list)).await, "<ul><li>1</li><li>2</li></ul>");
    }

    #[tokio::test]
    async fn test_unsafe_html() {
        assert_eq!(
            render(html!("<div>{}</div>", unsafe_html("<div></div>"))).await,
            "<div><div></div></div>"
        );
    }

    #[tokio::test]
    async fn test_multiple_interleaved_values() {
        assert_eq!(
            render(html!("<div>{}<br>{}</div>", html!("<span></span>"), html!("<span></span>"))).await,
            "<div><span></span><br><span></span></div>"
        );
    }

    #[tokio::test]
    async fn test_slots_drain_in_order() {
        // the first slot is slower, but must still come out first
        let slow = Content::stream(stream::iter(0..3).then(|i| async move {
            timeout(15).await;
            Ok::<_, Error>(format!("a{i}"))
        }));
        let fast = Content::stream(stream::iter(0..3).then(|i| async move {
            timeout(1).await;
            Ok::<_, Error>(format!("b{i}"))
        }));
        let chunks: Vec<String> = html!("[{}|{}]", slow, fast)
            .into_chunks()
            .try_collect()
            .await
            .expect("chunks");
        assert_eq!(chunks, ["[", "a0", "a1", "a2", "|", "b0", "b1", "b2", "]"]);
    }

    #[tokio::test]
    async fn test_composition_is_associative() {
        let nested = html!("<a>{}</a>", html!("<b>{}</b>", "&"));
        let flat = html!("<a><b>{}</b></a>", "&");
        assert_eq!(render(nested).await, render(flat).await);
    }

    fn segments(parts: [&str; 2]) -> Vec<Cow<'static, str>> {
        parts.iter().map(|s| Cow::Owned(s.to_string())).collect()
    }

    proptest! {
        #[test]
        fn test_nesting_matches_flat_template(
            a in ".*", b in ".*", c in ".*", d in ".*", slot in "[<>&\"' a-z]*",
        ) {
            let inner = Html::new(segments([b.as_str(), c.as_str()]), vec![Content::from(slot.clone())]);
            let nested = Html::new(segments([a.as_str(), d.as_str()]), vec![Content::from(inner)]);
            let (ab, cd) = (format!("{a}{b}"), format!("{c}{d}"));
            let flat = Html::new(
                segments([ab.as_str(), cd.as_str()]),
                vec![Content::from(slot)],
            );
            let nested = block_on(nested.render()).expect("render");
            let flat = block_on(flat.render()).expect("render");
            prop_assert_eq!(nested, flat);
        }

        #[test]
        fn test_unsafe_html_is_verbatim(val in ".+") {
            let out = block_on(html!("{}", unsafe_html(val.clone())).render()).expect("render");
            prop_assert_eq!(out, val);
        }
    }

    #[tokio::test]
    async fn test_fallback_value() {
        let main = html!(
            "<main>{}</main>",
            Content::producer(|| Err::<Content, _>(Error::msg("failed")))
        );
        assert_eq!(
            render(html!(
                "<div>{}</div>",
                fallback(main, html!("<span>An error occurred</span>"))
            ))
            .await,
            "<div><main><span>An error occurred</span></div>"
        );
    }

    #[tokio::test]
    async fn test_fallback_function() {
        let main = html!(
            "<main>{}</main>",
            Content::producer(|| Err::<Content, _>(Error::msg("foo")))
        );
        let content = fallback_with(main, |e| html!("<span>An error occurred: {}</span>", e.to_string()));
        assert_eq!(
            render(html!("<div>{}</div>", content)).await,
            "<div><main><span>An error occurred: foo</span></div>"
        );
    }

    #[tokio::test]
    async fn test_unhandled_failure_truncates() {
        let failing = Content::producer(|| Err::<Content, _>(Error::msg("down")));
        let chunks: Vec<Result<String>> = html!("<p>{}</p>{}", failing, "never")
            .into_chunks()
            .collect()
            .await;
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].as_deref().expect("chunk"), "<p>");
        assert_eq!(chunks[1].as_ref().expect_err("error").to_string(), "down");
    }

    #[test]
    fn test_mismatched_counts_stop_early() {
        let pieces: Vec<_> = Interleave::new(
            vec![Cow::Borrowed("a"), Cow::Borrowed("b"), Cow::Borrowed("c")].into_iter(),
            vec![Content::from(1)].into_iter(),
        )
        .collect();
        assert_eq!(pieces.len(), 3);
        assert!(matches!(&pieces[2], Piece::Literal(s) if s == "b"));
    }

    #[tokio::test]
    async fn test_render_with_config() {
        let config = Config {
            empty_slot: crate::EmptySlot::Nothing,
            ..Config::default()
        };
        let out = html!("<i>{}</i>", None::<&str>).render_with(config).await.expect("render");
        assert_eq!(out, "<i></i>");
    }
}
