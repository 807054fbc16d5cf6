use serde::{Deserialize, Serialize};

/// Shape assigned to one edge of a piece.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Insert {
    Tab,
    Slot,
    #[default]
    None,
}

impl Insert {
    /// Only a tab and a slot fit together, in either order.
    pub fn matches(self, other: Insert) -> bool {
        matches!(
            (self, other),
            (Insert::Tab, Insert::Slot) | (Insert::Slot, Insert::Tab)
        )
    }

    pub fn complement(self) -> Insert {
        match self {
            Insert::Tab => Insert::Slot,
            Insert::Slot => Insert::Tab,
            Insert::None => Insert::None,
        }
    }

    pub fn is_tab(self) -> bool {
        self == Insert::Tab
    }

    pub fn is_slot(self) -> bool {
        self == Insert::Slot
    }

    pub fn is_none(self) -> bool {
        self == Insert::None
    }

    /// Pick one of three values depending on the variant.
    pub fn select<T>(self, tab: T, slot: T, none: T) -> T {
        match self {
            Insert::Tab => tab,
            Insert::Slot => slot,
            Insert::None => none,
        }
    }

    pub fn to_char(self) -> char {
        self.select('T', 'S', '-')
    }

    /// Unknown characters decode to `None`.
    pub fn from_char(c: char) -> Insert {
        match c {
            'T' => Insert::Tab,
            'S' => Insert::Slot,
            _ => Insert::None,
        }
    }
}
