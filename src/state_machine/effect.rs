//! Effects produced by state transitions

/// Effects to be executed after a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Resolve the frame count; yields a `Begin` event
    ResolveFrameCount,

    /// Send a new probe message with yes/no buttons
    SendProbe { index: u64, step: u32 },

    /// Send a new result message (search was over before any answer)
    SendResult { index: u64 },

    /// Edit the probe message to show another frame
    ShowProbe { index: u64, step: u32 },

    /// Edit the probe message into the result.
    /// `refresh_frame` is set when the displayed frame is not the result.
    ShowResult { index: u64, refresh_frame: bool },

    /// Close the result message and acknowledge a restart
    AnnounceRestart { index: u64 },

    /// Edit the message into a closing remark
    Farewell,

    /// Forget the session
    DiscardSession,
}
