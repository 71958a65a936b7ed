use serde::Deserialize;

/// Writes a value into the output in a form that is safe to place in HTML.
pub trait Escape {
    fn write(&self, to: &mut String, val: &str);
}

/// Replaces the five HTML-significant characters with entities.
pub struct Entities;

fn entity(b: u8) -> Option<&'static str> {
    match b {
        b'&' => Some("&amp;"),
        b'<' => Some("&lt;"),
        b'>' => Some("&gt;"),
        b'"' => Some("&quot;"),
        b'\'' => Some("&#39;"),
        _ => None,
    }
}

impl Escape for Entities {
    fn write(&self, to: &mut String, val: &str) {
        let mut rem = val;
        while let Some((idx, replacement)) = rem
            .bytes()
            .enumerate()
            .find_map(|(i, b)| entity(b).map(|e| (i, e)))
        {
            to.push_str(&rem[..idx]);
            to.push_str(replacement);
            rem = &rem[idx + 1..];
        }
        to.push_str(rem);
    }
}

/// Lets attribute-free tags from a fixed list through and escapes
/// everything else.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AllowList {
    pub tags: Vec<String>,
}

const DEFAULT_TAGS: &[&str] = &[
    "b", "i", "u", "s", "em", "strong", "small", "mark", "code", "pre", "kbd", "br", "p",
    "blockquote", "ul", "ol", "li", "span",
];

impl Default for AllowList {
    fn default() -> Self {
        AllowList {
            tags: DEFAULT_TAGS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl AllowList {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AllowList {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Length of the allowed tag at the start of `tail`, which begins with `<`.
    fn allowed_tag(&self, tail: &str) -> Option<usize> {
        let end = tail.find('>')?;
        let inner = &tail[1..end];
        let inner = inner.strip_prefix('/').unwrap_or(inner);
        let inner = inner.strip_suffix('/').unwrap_or(inner).trim_end();
        let known = !inner.is_empty()
            && inner.bytes().all(|b| b.is_ascii_alphanumeric())
            && self.tags.iter().any(|t| t.eq_ignore_ascii_case(inner));
        known.then_some(end + 1)
    }
}

impl Escape for AllowList {
    fn write(&self, to: &mut String, val: &str) {
        let mut rem = val;
        while let Some(idx) = rem.find('<') {
            Entities.write(to, &rem[..idx]);
            let tail = &rem[idx..];
            match self.allowed_tag(tail) {
                Some(len) => {
                    to.push_str(&tail[..len]);
                    rem = &tail[len..];
                }
                None => {
                    to.push_str("&lt;");
                    rem = &tail[1..];
                }
            }
        }
        Entities.write(to, rem);
    }
}

/// The escaper selected by configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Escaper {
    #[default]
    Entities,
    AllowList(AllowList),
}

impl Escape for Escaper {
    fn write(&self, to: &mut String, val: &str) {
        match self {
            Escaper::Entities => Entities.write(to, val),
            Escaper::AllowList(list) => list.write(to, val),
        }
    }
}

/// Escapes `val` with the default escaper.
pub fn escape(val: &str) -> String {
    let mut out = String::with_capacity(val.len());
    Entities.write(&mut out, val);
    out
}
