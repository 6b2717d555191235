//! Player: a [`Transport`] driven by a background ticker thread.
//!
//! At most one ticker runs per player. Each play session gets a generation
//! number; the ticker checks it under the state lock before every advance, so
//! once `pause`, `reset`, `clear` or drop returns, no further timer-driven
//! listener call can happen.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::config::PlayerConfig;
use crate::events::PlayerEvent;
use crate::frame::{Frame, FrameSequence};
use crate::ids::PlayerId;
use crate::listener::FrameListener;
use crate::state::PlaybackState;
use crate::transport::Transport;

struct Shared<S> {
    transport: Transport<S>,
    /// Bumped whenever a ticker must exit.
    generation: u64,
}

struct Inner<S> {
    shared: Mutex<Shared<S>>,
    /// Wakes the ticker (speed change, cancellation) and completion waiters.
    signal: Condvar,
}

impl<S> Inner<S> {
    fn lock(&self) -> MutexGuard<'_, Shared<S>> {
        // A panicking listener poisons the lock; the transport itself is still consistent.
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Thread-backed player. All methods take `&self`; the player can be shared
/// behind an `Arc` between a UI thread and other controllers.
pub struct Player<S: Send + 'static> {
    id: PlayerId,
    inner: Arc<Inner<S>>,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl<S: Send + 'static> std::fmt::Debug for Player<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shared = self.inner.lock();
        f.debug_struct("Player")
            .field("transport", &shared.transport)
            .finish()
    }
}

impl<S: Send + 'static> Player<S> {
    /// Create an empty player. The listener is fixed for the player's lifetime.
    pub fn new(config: PlayerConfig, listener: impl FrameListener<S> + 'static) -> Self {
        let transport = Transport::new(config, listener);
        let id = transport.id();
        Self {
            id,
            inner: Arc::new(Inner {
                shared: Mutex::new(Shared {
                    transport,
                    generation: 0,
                }),
                signal: Condvar::new(),
            }),
            ticker: Mutex::new(None),
        }
    }

    #[inline]
    pub fn id(&self) -> PlayerId {
        self.id
    }

    /// Replace the loaded sequence; any running playback is cancelled first.
    pub fn load_frames(&self, frames: FrameSequence<S>) {
        self.with_cancel(|t| t.load_frames(frames));
    }

    /// Start or resume playback. Calling while already playing is a no-op.
    pub fn play(&self) {
        let mut slot = self.ticker.lock().unwrap_or_else(PoisonError::into_inner);
        let generation = {
            let mut shared = self.inner.lock();
            if !shared.transport.play() {
                return;
            }
            shared.generation = shared.generation.wrapping_add(1);
            shared.generation
        };
        // A ticker from an earlier session may still be winding down.
        if let Some(stale) = slot.take() {
            self.inner.signal.notify_all();
            join_ticker(stale);
        }

        let inner = Arc::clone(&self.inner);
        let spawned = thread::Builder::new()
            .name(format!("algoviz-ticker-{}", self.id))
            .spawn(move || run_ticker(inner, generation));
        match spawned {
            Ok(handle) => {
                debug!("player {}: ticker started (generation {generation})", self.id);
                *slot = Some(handle);
            }
            Err(err) => {
                warn!("player {}: failed to spawn ticker: {err}", self.id);
                self.inner.lock().transport.pause();
            }
        }
    }

    pub fn pause(&self) {
        self.with_cancel(|t| {
            t.pause();
        });
    }

    pub fn step_forward(&self) {
        self.with_transport(Transport::step_forward);
    }

    pub fn step_backward(&self) {
        self.with_transport(Transport::step_backward);
    }

    pub fn go_to_frame(&self, index: i64) {
        self.with_transport(|t| t.go_to_frame(index));
    }

    pub fn reset(&self) {
        self.with_cancel(Transport::reset);
    }

    pub fn clear(&self) {
        self.with_cancel(Transport::clear);
    }

    /// Takes effect on the running ticker's very next deadline.
    pub fn set_speed(&self, ms: u64) {
        self.with_transport(|t| t.set_speed(ms));
    }

    pub fn state(&self) -> PlaybackState {
        self.inner.lock().transport.state()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.inner.lock().transport.current_index()
    }

    pub fn total_frames(&self) -> usize {
        self.inner.lock().transport.total_frames()
    }

    pub fn is_playing(&self) -> bool {
        self.state().is_playing()
    }

    pub fn is_paused(&self) -> bool {
        self.state().is_paused()
    }

    pub fn is_complete(&self) -> bool {
        self.state().is_complete()
    }

    pub fn speed(&self) -> u64 {
        self.inner.lock().transport.speed_ms()
    }

    pub fn current_description(&self) -> Option<String> {
        self.inner
            .lock()
            .transport
            .current_description()
            .map(str::to_owned)
    }

    pub fn drain_events(&self) -> Vec<PlayerEvent> {
        self.inner.lock().transport.drain_events()
    }

    /// Block until playback completes. Returns false on timeout, or as soon
    /// as playback stops without completing (paused, reset, cleared).
    pub fn wait_for_completion(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut shared = self.inner.lock();
        loop {
            if shared.transport.is_complete() {
                return true;
            }
            if !shared.transport.is_playing() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, _) = self
                .inner
                .signal
                .wait_timeout(shared, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            shared = guard;
        }
    }

    fn with_transport<R>(&self, f: impl FnOnce(&mut Transport<S>) -> R) -> R {
        let out = {
            let mut shared = self.inner.lock();
            f(&mut shared.transport)
        };
        self.inner.signal.notify_all();
        out
    }

    /// Apply `f` and retire the current ticker, joining it outside the state lock.
    fn with_cancel<R>(&self, f: impl FnOnce(&mut Transport<S>) -> R) -> R {
        let out = {
            let mut shared = self.inner.lock();
            shared.generation = shared.generation.wrapping_add(1);
            f(&mut shared.transport)
        };
        self.inner.signal.notify_all();
        self.join_ticker();
        out
    }

    fn join_ticker(&self) {
        let stale = self
            .ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = stale {
            join_ticker(handle);
        }
    }
}

impl<S: Send + Clone + 'static> Player<S> {
    /// Independent copy of the current snapshot; mutating it never touches stored frames.
    pub fn current_snapshot(&self) -> Option<S> {
        self.inner.lock().transport.current_snapshot()
    }

    pub fn current_frame(&self) -> Option<Frame<S>> {
        self.inner.lock().transport.current_frame().cloned()
    }
}

impl<S: Send + 'static> Drop for Player<S> {
    fn drop(&mut self) {
        {
            let mut shared = self.inner.lock();
            shared.generation = shared.generation.wrapping_add(1);
        }
        self.inner.signal.notify_all();
        self.join_ticker();
    }
}

fn join_ticker(handle: JoinHandle<()>) {
    // Joining ourselves would deadlock; only possible if a listener drops its own player.
    if handle.thread().id() == thread::current().id() {
        return;
    }
    if handle.join().is_err() {
        warn!("ticker thread panicked");
    }
}

fn run_ticker<S>(inner: Arc<Inner<S>>, generation: u64) {
    let mut shared = inner.lock();
    let mut last_tick = Instant::now();
    loop {
        if shared.generation != generation || !shared.transport.is_playing() {
            break;
        }
        // Re-read every pass so a speed change applies to the pending tick.
        let interval = Duration::from_millis(shared.transport.speed_ms());
        let deadline = last_tick + interval;
        let now = Instant::now();
        if now >= deadline {
            shared.transport.tick();
            last_tick = now;
            if !shared.transport.is_playing() {
                break;
            }
            continue;
        }
        let (guard, _) = inner
            .signal
            .wait_timeout(shared, deadline - now)
            .unwrap_or_else(PoisonError::into_inner);
        shared = guard;
    }
    drop(shared);
    inner.signal.notify_all();
}
