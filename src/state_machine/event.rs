//! Events that drive a search

/// The user's reply to a probe (or to the "play again?" question)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Yes,
    No,
}

impl Choice {
    /// Callback payload carried by the choice button
    pub fn data(self) -> &'static str {
        match self {
            Choice::Yes => "1",
            Choice::No => "0",
        }
    }

    /// Parse a callback payload; `None` for anything but `"0"` / `"1"`
    pub fn from_data(data: &str) -> Option<Self> {
        match data {
            "1" => Some(Choice::Yes),
            "0" => Some(Choice::No),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Choice::Yes => "Yes",
            Choice::No => "No",
        }
    }

    pub fn is_yes(self) -> bool {
        self == Choice::Yes
    }
}

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A fresh search was requested
    Start,
    /// The frame count is known; set the bounds
    Begin { frame_count: u64 },
    /// The user pressed a choice button
    Answer(Choice),
}
