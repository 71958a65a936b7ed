use serde::Deserialize;

use crate::escape::Escaper;

/// What an empty slot (`()`, `None`, `false`, `""`) renders as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptySlot {
    /// A single space, so the slot never silently vanishes.
    #[default]
    Space,
    Nothing,
}

impl EmptySlot {
    pub(crate) fn text(self) -> Option<&'static str> {
        match self {
            EmptySlot::Space => Some(" "),
            EmptySlot::Nothing => None,
        }
    }
}

/// How the response body is encoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyMode {
    /// Every chunk is sent as soon as it is produced.
    #[default]
    Streaming,
    /// The whole document is produced first and sent as one frame.
    Buffered,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub empty_slot: EmptySlot,
    pub escape: Escaper,
    pub body: BodyMode,
}
