//! Transport: the timer-free playback state machine.
//!
//! Methods:
//! - load_frames, play, pause, step_forward, step_backward, go_to_frame, reset, clear, set_speed
//! - tick: one automatic advance, called by the player's ticker (or a host frame loop)
//!
//! Every operation is total. Requests that do not apply in the current state
//! are ignored, and seeks are clamped.

use log::{debug, trace, warn};

use crate::config::PlayerConfig;
use crate::events::{EventQueue, PlayerEvent};
use crate::frame::{Frame, FrameSequence};
use crate::ids::PlayerId;
use crate::listener::FrameListener;
use crate::state::PlaybackState;

pub struct Transport<S> {
    id: PlayerId,
    config: PlayerConfig,
    frames: FrameSequence<S>,
    index: Option<usize>,
    state: PlaybackState,
    speed_ms: u64,
    listener: Box<dyn FrameListener<S>>,
    events: EventQueue,
}

impl<S> std::fmt::Debug for Transport<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("id", &self.id)
            .field("frames", &self.frames.len())
            .field("index", &self.index)
            .field("state", &self.state)
            .field("speed_ms", &self.speed_ms)
            .finish()
    }
}

impl<S> Transport<S> {
    /// Create an empty transport. The config's speed is clamped into its own bounds.
    pub fn new(config: PlayerConfig, listener: impl FrameListener<S> + 'static) -> Self {
        let speed_ms = config.clamp_speed(config.speed_ms);
        let events = EventQueue::new(config.max_queued_events);
        Self {
            id: PlayerId::new(),
            config,
            frames: FrameSequence::new(),
            index: None,
            state: PlaybackState::Empty,
            speed_ms,
            listener: Box::new(listener),
            events,
        }
    }

    #[inline]
    pub fn id(&self) -> PlayerId {
        self.id
    }

    #[inline]
    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    #[inline]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Current position; `None` when no frames are loaded.
    #[inline]
    pub fn current_index(&self) -> Option<usize> {
        self.index
    }

    #[inline]
    pub fn total_frames(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.state.is_paused()
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.state.is_complete()
    }

    #[inline]
    pub fn speed_ms(&self) -> u64 {
        self.speed_ms
    }

    pub fn frames(&self) -> &FrameSequence<S> {
        &self.frames
    }

    pub fn current_frame(&self) -> Option<&Frame<S>> {
        self.index.and_then(|i| self.frames.get(i))
    }

    pub fn current_description(&self) -> Option<&str> {
        self.current_frame().map(|f| f.description.as_str())
    }

    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        self.events.drain()
    }

    /// Replace the loaded sequence and rewind to frame 0.
    pub fn load_frames(&mut self, frames: FrameSequence<S>) {
        let count = frames.len();
        self.frames = frames;
        self.events.push(PlayerEvent::Loaded { frames: count });
        if count == 0 {
            self.index = None;
            self.set_state(PlaybackState::Empty);
            self.listener.on_clear();
            return;
        }
        self.index = Some(0);
        self.set_state(PlaybackState::Stopped);
        if self.config.emit_on_load {
            self.listener.on_frame(0, &self.frames[0]);
        }
    }

    /// Start or resume automatic advance. Returns true when the state changed
    /// to playing; false for a no-op (empty, already playing, complete, or
    /// sitting on the last frame).
    pub fn play(&mut self) -> bool {
        if !self.state.can_play() || self.at_last() {
            return false;
        }
        let event = if self.state.is_paused() {
            PlayerEvent::Resumed
        } else {
            PlayerEvent::Started
        };
        self.events.push(event);
        self.set_state(PlaybackState::Playing);
        true
    }

    /// Stop automatic advance, keeping the position. Returns true if playback was running.
    pub fn pause(&mut self) -> bool {
        if !self.state.can_pause() {
            return false;
        }
        self.events.push(PlayerEvent::Paused);
        self.set_state(PlaybackState::Paused);
        true
    }

    pub fn step_forward(&mut self) {
        let (Some(i), Some(last)) = (self.index, self.frames.last_index()) else {
            return;
        };
        if i < last {
            self.move_to(i + 1);
        }
        if self.at_last() {
            self.complete();
        }
    }

    pub fn step_backward(&mut self) {
        let Some(i) = self.index else {
            return;
        };
        if i == 0 {
            return;
        }
        self.move_to(i - 1);
        if self.state.is_complete() {
            self.set_state(PlaybackState::Stopped);
        }
    }

    /// Seek, clamping `index` into `[0, len - 1]`.
    pub fn go_to_frame(&mut self, index: i64) {
        let Some(last) = self.frames.last_index() else {
            return;
        };
        let target = index.clamp(0, last as i64) as usize;
        self.move_to(target);
        if target == last {
            self.complete();
        } else if self.state.is_complete() {
            self.set_state(PlaybackState::Stopped);
        }
    }

    /// Rewind to frame 0 and stop.
    pub fn reset(&mut self) {
        self.events.push(PlayerEvent::Reset);
        if self.frames.is_empty() {
            self.listener.on_clear();
            return;
        }
        self.set_state(PlaybackState::Stopped);
        self.move_to(0);
    }

    /// Drop the loaded frames and return to the empty state.
    pub fn clear(&mut self) {
        self.frames = FrameSequence::new();
        self.index = None;
        self.events.push(PlayerEvent::Cleared);
        self.set_state(PlaybackState::Empty);
        self.listener.on_clear();
    }

    /// Change the advance interval; out-of-range requests are clamped.
    pub fn set_speed(&mut self, ms: u64) {
        let clamped = self.config.clamp_speed(ms);
        if clamped != ms {
            warn!(
                "player {}: speed {}ms clamped to {}ms",
                self.id, ms, clamped
            );
        }
        if clamped != self.speed_ms {
            self.events.push(PlayerEvent::SpeedChanged {
                from: self.speed_ms,
                to: clamped,
            });
            self.speed_ms = clamped;
        }
    }

    /// One automatic advance. On the last frame this completes playback
    /// instead of moving. Returns true if the position moved.
    pub fn tick(&mut self) -> bool {
        if !self.state.is_playing() {
            return false;
        }
        match self.index {
            Some(i) if !self.at_last() => {
                trace!("player {}: tick {} -> {}", self.id, i, i + 1);
                self.move_to(i + 1);
                true
            }
            _ => {
                self.complete();
                false
            }
        }
    }

    #[inline]
    fn at_last(&self) -> bool {
        matches!((self.index, self.frames.last_index()), (Some(i), Some(last)) if i >= last)
    }

    fn move_to(&mut self, to: usize) {
        let from = self.index.unwrap_or(0);
        self.index = Some(to);
        self.events.push(PlayerEvent::FrameChanged { from, to });
        self.listener.on_frame(to, &self.frames[to]);
    }

    fn complete(&mut self) {
        if !self.state.is_complete() {
            self.events.push(PlayerEvent::Completed);
            self.set_state(PlaybackState::Complete);
        }
    }

    fn set_state(&mut self, next: PlaybackState) {
        if self.state != next {
            debug!(
                "player {}: {} -> {}",
                self.id,
                self.state.name(),
                next.name()
            );
            self.state = next;
        }
    }
}

impl<S: Clone> Transport<S> {
    /// Independent copy of the snapshot at the current position.
    pub fn current_snapshot(&self) -> Option<S> {
        self.current_frame().map(|f| f.snapshot.clone())
    }
}
