//! Everything a template slot can hold.

use std::borrow::Cow;
use std::fmt;
use std::future::Future;

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{BoxStream, Stream, StreamExt};

use crate::{Error, Fallback, Html, Result};

/// A value written through the escaper.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Str(Cow<'static, str>),
    Char(char),
    Int(i128),
    Uint(u128),
    Float(f64),
    Float32(f32),
    Bool(bool),
}

impl Primitive {
    pub(crate) fn is_empty(&self) -> bool {
        matches!(self, Primitive::Str(s) if s.is_empty()) || *self == Primitive::Bool(false)
    }

    pub(crate) fn as_text(&self) -> Cow<'_, str> {
        match self {
            Primitive::Str(s) => Cow::Borrowed(s.as_ref()),
            other => Cow::Owned(other.to_string()),
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Str(s) => f.write_str(s),
            Primitive::Char(c) => write!(f, "{c}"),
            Primitive::Int(i) => write!(f, "{i}"),
            Primitive::Uint(u) => write!(f, "{u}"),
            Primitive::Float(x) => write_float(f, *x),
            Primitive::Float32(x) => write_float(f, *x),
            Primitive::Bool(b) => write!(f, "{b}"),
        }
    }
}

// formatted at the value's own width: `0.1f32` prints as `0.1`
fn write_float<F>(f: &mut fmt::Formatter<'_>, x: F) -> fmt::Result
where
    F: fmt::Display + Into<f64> + Copy,
{
    let wide: f64 = x.into();
    if wide.is_nan() {
        f.write_str("NaN")
    } else if wide.is_infinite() {
        f.write_str(if wide > 0.0 { "Infinity" } else { "-Infinity" })
    } else {
        write!(f, "{x}")
    }
}

/// A string that is written out verbatim, bypassing the escaper.
///
/// Only construct this from markup you trust.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsafeHtml(String);

impl UnsafeHtml {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            UnsafeHtml(" ".to_string())
        } else {
            UnsafeHtml(value)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for UnsafeHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Marks `value` as trusted markup.
pub fn unsafe_html(value: impl Into<String>) -> UnsafeHtml {
    UnsafeHtml::new(value)
}

/// The value of a template slot.
///
/// Most values convert with [`From`]; sequences, futures, streams and lazily
/// evaluated closures have dedicated constructors. Content is consumed when it
/// is rendered.
pub enum Content {
    Empty,
    Primitive(Primitive),
    Template(Html),
    Raw(UnsafeHtml),
    Fallback(Box<Fallback>),
    Iter(Box<dyn Iterator<Item = Content> + Send>),
    Stream(BoxStream<'static, Result<Content>>),
    Deferred(BoxFuture<'static, Result<Content>>),
    Producer(Box<dyn FnOnce() -> Result<Content> + Send>),
}

impl Content {
    /// A synchronous sequence, rendered item by item.
    pub fn iter<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Content>,
        I::IntoIter: Send + 'static,
    {
        Content::Iter(Box::new(items.into_iter().map(|item| -> Content { item.into() })))
    }

    /// An asynchronous sequence. An `Err` item aborts the slot.
    pub fn stream<S, C, E>(items: S) -> Self
    where
        S: Stream<Item = std::result::Result<C, E>> + Send + 'static,
        C: Into<Content>,
        E: Into<anyhow::Error>,
    {
        Content::Stream(
            items
                .map(|item| -> Result<Content> { Ok(item.map_err(Error::new)?.into()) })
                .boxed(),
        )
    }

    /// A value that is awaited when the slot is reached.
    pub fn deferred<F, C, E>(future: F) -> Self
    where
        F: Future<Output = std::result::Result<C, E>> + Send + 'static,
        C: Into<Content>,
        E: Into<anyhow::Error>,
    {
        Content::Deferred(
            future
                .map(|result| -> Result<Content> { Ok(result.map_err(Error::new)?.into()) })
                .boxed(),
        )
    }

    /// A closure invoked when the slot is reached, not before.
    pub fn producer<F, C, E>(f: F) -> Self
    where
        F: FnOnce() -> std::result::Result<C, E> + Send + 'static,
        C: Into<Content>,
        E: Into<anyhow::Error>,
    {
        Content::Producer(Box::new(move || -> Result<Content> {
            Ok(f().map_err(Error::new)?.into())
        }))
    }

    /// A closure returning a future, both deferred until the slot is reached.
    pub fn async_producer<F, Fut, C, E>(f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = std::result::Result<C, E>> + Send + 'static,
        C: Into<Content>,
        E: Into<anyhow::Error>,
    {
        Content::Producer(Box::new(move || -> Result<Content> {
            Ok(Content::deferred(f()))
        }))
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Content::Empty => f.write_str("Empty"),
            Content::Primitive(p) => f.debug_tuple("Primitive").field(p).finish(),
            Content::Template(html) => f.debug_tuple("Template").field(html).finish(),
            Content::Raw(raw) => f.debug_tuple("Raw").field(raw).finish(),
            Content::Fallback(_) => f.write_str("Fallback(..)"),
            Content::Iter(_) => f.write_str("Iter(..)"),
            Content::Stream(_) => f.write_str("Stream(..)"),
            Content::Deferred(_) => f.write_str("Deferred(..)"),
            Content::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

impl From<()> for Content {
    fn from(_: ()) -> Self {
        Content::Empty
    }
}

impl<T: Into<Content>> From<Option<T>> for Content {
    fn from(value: Option<T>) -> Self {
        value.map_or(Content::Empty, Into::into)
    }
}

impl From<&str> for Content {
    fn from(value: &str) -> Self {
        Content::Primitive(Primitive::Str(Cow::Owned(value.to_string())))
    }
}

impl From<&String> for Content {
    fn from(value: &String) -> Self {
        value.as_str().into()
    }
}

impl From<String> for Content {
    fn from(value: String) -> Self {
        Content::Primitive(Primitive::Str(Cow::Owned(value)))
    }
}

impl From<Cow<'static, str>> for Content {
    fn from(value: Cow<'static, str>) -> Self {
        Content::Primitive(Primitive::Str(value))
    }
}

impl From<char> for Content {
    fn from(value: char) -> Self {
        Content::Primitive(Primitive::Char(value))
    }
}

impl From<bool> for Content {
    fn from(value: bool) -> Self {
        if value {
            Content::Primitive(Primitive::Bool(true))
        } else {
            Content::Empty
        }
    }
}

macro_rules! from_number {
    ($variant:ident as $wide:ty: $($t:ty),*) => {
        $(
            impl From<$t> for Content {
                fn from(value: $t) -> Self {
                    Content::Primitive(Primitive::$variant(value as $wide))
                }
            }
        )*
    };
}

from_number!(Int as i128: i8, i16, i32, i64, i128, isize);
from_number!(Uint as u128: u8, u16, u32, u64, u128, usize);
from_number!(Float as f64: f64);
from_number!(Float32 as f32: f32);

impl From<Primitive> for Content {
    fn from(value: Primitive) -> Self {
        Content::Primitive(value)
    }
}

impl From<Html> for Content {
    fn from(value: Html) -> Self {
        Content::Template(value)
    }
}

impl From<UnsafeHtml> for Content {
    fn from(value: UnsafeHtml) -> Self {
        Content::Raw(value)
    }
}

impl From<Fallback> for Content {
    fn from(value: Fallback) -> Self {
        Content::Fallback(Box::new(value))
    }
}

impl<T> From<Vec<T>> for Content
where
    T: Into<Content> + Send + 'static,
{
    fn from(value: Vec<T>) -> Self {
        Content::iter(value)
    }
}
