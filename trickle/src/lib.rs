extern crate self as trickle;

pub mod body;
pub mod config;
pub mod content;
pub mod error;
pub mod escape;
pub mod fallback;
pub mod response;
pub mod template;
mod unpack;

pub use body::HtmlBody;
pub use config::{BodyMode, Config, EmptySlot};
pub use content::{unsafe_html, Content, Primitive, UnsafeHtml};
pub use error::{Error, Result};
pub use fallback::{fallback, fallback_with, Fallback, Replacement};
pub use response::{HtmlResponse, HTML_CONTENT_TYPE};
pub use template::{Chunks, Html};
pub use trickle_macros::{css, html, js};
