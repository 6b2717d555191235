//! Transport events.
//!
//! The listener only sees snapshots; hosts that care about *why* the position
//! moved (status bars, analytics, tests) drain these instead.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Discrete signals emitted by transport operations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum PlayerEvent {
    Loaded { frames: usize },
    Started,
    Resumed,
    Paused,
    FrameChanged { from: usize, to: usize },
    Completed,
    Reset,
    Cleared,
    SpeedChanged { from: u64, to: u64 },
}

/// Bounded FIFO of events; drops the oldest entry once full.
#[derive(Clone, Debug)]
pub struct EventQueue {
    events: VecDeque<PlayerEvent>,
    capacity: usize,
}

impl EventQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::new(),
            capacity,
        }
    }

    pub fn push(&mut self, event: PlayerEvent) {
        if self.capacity == 0 {
            return;
        }
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn drain(&mut self) -> Vec<PlayerEvent> {
        self.events.drain(..).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_oldest_when_full() {
        let mut q = EventQueue::new(2);
        q.push(PlayerEvent::Started);
        q.push(PlayerEvent::Paused);
        q.push(PlayerEvent::Reset);
        assert_eq!(q.drain(), vec![PlayerEvent::Paused, PlayerEvent::Reset]);
        assert!(q.is_empty());
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut q = EventQueue::new(0);
        q.push(PlayerEvent::Started);
        assert_eq!(q.len(), 0);
    }
}
