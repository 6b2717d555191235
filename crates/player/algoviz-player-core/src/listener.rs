//! The single extension point between a player and whatever renders it.

use crate::frame::Frame;

/// Receives the frame a player has just moved to.
///
/// Called synchronously while the player's state lock is held: an
/// implementation must not call back into the same player.
pub trait FrameListener<S>: Send {
    fn on_frame(&mut self, index: usize, frame: &Frame<S>);

    /// The player has no frame to show (cleared, or reset while empty).
    fn on_clear(&mut self) {}
}

/// Any `FnMut(&S)` closure is a listener that only looks at snapshots.
impl<S, F> FrameListener<S> for F
where
    F: FnMut(&S) + Send,
{
    fn on_frame(&mut self, _index: usize, frame: &Frame<S>) {
        self(&frame.snapshot)
    }
}

/// Listener that ignores everything; for players read purely through getters.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl<S> FrameListener<S> for NoopListener {
    fn on_frame(&mut self, _index: usize, _frame: &Frame<S>) {}
}
