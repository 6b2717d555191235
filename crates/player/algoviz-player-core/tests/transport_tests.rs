use std::sync::{Arc, Mutex};

use algoviz_player_core::{
    Frame, FrameListener, FrameSequence, PlaybackState, PlayerConfig, PlayerEvent, Transport,
};

fn seq(n: usize) -> FrameSequence<usize> {
    (0..n).map(|i| Frame::new(i, format!("frame {i}"))).collect()
}

/// Listener that records every index it is shown, and `None` on clear.
#[derive(Clone, Default)]
struct Seen(Arc<Mutex<Vec<Option<usize>>>>);

impl Seen {
    fn take(&self) -> Vec<Option<usize>> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

impl FrameListener<usize> for Seen {
    fn on_frame(&mut self, index: usize, frame: &Frame<usize>) {
        assert_eq!(index, frame.snapshot, "listener must get frames[index]");
        self.0.lock().unwrap().push(Some(index));
    }

    fn on_clear(&mut self) {
        self.0.lock().unwrap().push(None);
    }
}

fn loaded(n: usize) -> (Transport<usize>, Seen) {
    let seen = Seen::default();
    let mut t = Transport::new(PlayerConfig::default(), seen.clone());
    t.load_frames(seq(n));
    seen.take();
    (t, seen)
}

/// it should expose frame 0 right after load, with and without the load callback
#[test]
fn load_shows_first_frame() {
    let seen = Seen::default();
    let mut t = Transport::new(PlayerConfig::default(), seen.clone());
    t.load_frames(seq(3));
    assert_eq!(seen.take(), vec![Some(0)]);
    assert_eq!(t.current_index(), Some(0));
    assert_eq!(t.current_snapshot(), Some(0));
    assert_eq!(t.current_description(), Some("frame 0"));
    assert_eq!(t.state(), PlaybackState::Stopped);

    let quiet = Seen::default();
    let mut t = Transport::new(
        PlayerConfig::default().with_emit_on_load(false),
        quiet.clone(),
    );
    t.load_frames(seq(3));
    assert!(quiet.take().is_empty());
    assert_eq!(t.current_snapshot(), Some(0));
}

/// it should visit every index in order once and then complete
#[test]
fn ticks_visit_all_frames_then_complete() {
    let (mut t, seen) = loaded(5);
    assert!(t.play());
    while t.is_playing() {
        t.tick();
    }
    assert_eq!(seen.take(), vec![Some(1), Some(2), Some(3), Some(4)]);
    assert_eq!(t.current_index(), Some(4));
    assert!(t.is_complete());
    assert!(!t.is_playing());
    // Further ticks do nothing.
    assert!(!t.tick());
    assert!(seen.take().is_empty());
}

/// it should treat play while playing as a no-op
#[test]
fn play_is_idempotent() {
    let (mut t, _) = loaded(3);
    assert!(t.play());
    assert!(!t.play());
    assert!(t.is_playing());
    let started = t
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, PlayerEvent::Started))
        .count();
    assert_eq!(started, 1);
}

#[test]
fn play_is_noop_on_last_frame_and_when_complete() {
    let (mut t, _) = loaded(1);
    assert!(!t.play());
    assert_eq!(t.state(), PlaybackState::Stopped);

    let (mut t, _) = loaded(3);
    t.go_to_frame(2);
    assert!(t.is_complete());
    assert!(!t.play());
    assert!(t.is_complete());
}

/// it should keep the position when paused, and resume from it
#[test]
fn pause_preserves_position() {
    let (mut t, _) = loaded(5);
    t.play();
    t.tick();
    t.tick();
    assert!(t.pause());
    assert!(t.is_paused());
    assert!(!t.tick());
    assert_eq!(t.current_index(), Some(2));
    assert!(!t.pause(), "second pause is a no-op");
    t.drain_events();
    assert!(t.play());
    assert_eq!(t.drain_events(), vec![PlayerEvent::Resumed]);
}

/// it should clamp seeks to the loaded range
#[test]
fn go_to_frame_clamps() {
    let (mut t, seen) = loaded(5);
    t.go_to_frame(-5);
    assert_eq!(t.current_index(), Some(0));
    t.go_to_frame(10_000);
    assert_eq!(t.current_index(), Some(4));
    assert!(t.is_complete());
    t.go_to_frame(2);
    assert!(!t.is_complete());
    t.go_to_frame(-1);
    assert_eq!(t.current_index(), Some(0));
    assert_eq!(seen.take(), vec![Some(0), Some(4), Some(2), Some(0)]);
}

/// it should ignore steps past either end
#[test]
fn step_boundaries() {
    let (mut t, seen) = loaded(3);
    t.step_backward();
    assert_eq!(t.current_index(), Some(0));
    assert!(seen.take().is_empty());

    t.go_to_frame(2);
    seen.take();
    t.step_forward();
    assert_eq!(t.current_index(), Some(2));
    assert!(t.is_complete());
    assert!(seen.take().is_empty());
}

#[test]
fn stepping_forward_to_the_end_completes() {
    let (mut t, _) = loaded(5);
    t.step_forward();
    t.step_forward();
    t.step_forward();
    assert_eq!(t.current_index(), Some(3));
    assert!(!t.is_complete());
    t.step_forward();
    assert_eq!(t.current_index(), Some(4));
    assert!(t.is_complete());
}

#[test]
fn stepping_back_from_the_end_uncompletes() {
    let (mut t, seen) = loaded(3);
    t.go_to_frame(2);
    t.step_backward();
    assert_eq!(t.current_index(), Some(1));
    assert_eq!(t.state(), PlaybackState::Stopped);
    assert_eq!(seen.take(), vec![Some(2), Some(1)]);
}

/// it should let manual steps move the position while the timer keeps running
#[test]
fn manual_steps_while_playing() {
    let (mut t, seen) = loaded(6);
    t.play();
    t.tick();
    t.step_forward();
    assert!(t.is_playing());
    assert_eq!(t.current_index(), Some(2));
    t.step_backward();
    assert!(t.is_playing());
    t.tick();
    assert_eq!(t.current_index(), Some(2));
    t.go_to_frame(5);
    assert!(t.is_complete());
    assert!(!t.is_playing());
    assert_eq!(
        seen.take(),
        vec![Some(1), Some(2), Some(1), Some(2), Some(5)]
    );
}

#[test]
fn steps_while_paused_stay_paused() {
    let (mut t, _) = loaded(4);
    t.play();
    t.pause();
    t.step_forward();
    assert!(t.is_paused());
    assert_eq!(t.current_index(), Some(1));
}

/// it should rewind to frame 0, clear completion and notify the listener
#[test]
fn reset_rewinds() {
    let (mut t, seen) = loaded(4);
    t.go_to_frame(3);
    assert!(t.is_complete());
    seen.take();
    t.reset();
    assert_eq!(t.current_index(), Some(0));
    assert!(!t.is_complete());
    assert!(!t.is_playing());
    assert!(!t.is_paused());
    assert_eq!(seen.take(), vec![Some(0)]);
}

#[test]
fn clear_empties_the_player() {
    let (mut t, seen) = loaded(4);
    t.play();
    t.clear();
    assert_eq!(t.total_frames(), 0);
    assert_eq!(t.current_index(), None);
    assert_eq!(t.state(), PlaybackState::Empty);
    assert!(!t.tick());
    assert_eq!(seen.take(), vec![None]);
}

/// it should make every transport call a safe no-op on an empty player
#[test]
fn empty_player_noops() {
    let seen = Seen::default();
    let mut t: Transport<usize> = Transport::new(PlayerConfig::default(), seen.clone());
    assert!(!t.play());
    t.step_forward();
    t.step_backward();
    t.go_to_frame(2);
    t.pause();
    assert!(!t.tick());
    assert_eq!(t.total_frames(), 0);
    assert_eq!(t.current_index(), None);
    assert_eq!(t.current_snapshot(), None);
    t.reset();
    assert_eq!(seen.take(), vec![None]);
}

#[test]
fn loading_replaces_frames_and_rewinds() {
    let (mut t, seen) = loaded(3);
    t.play();
    t.tick();
    t.load_frames(seq(7));
    assert_eq!(t.total_frames(), 7);
    assert_eq!(t.current_index(), Some(0));
    assert_eq!(t.state(), PlaybackState::Stopped);
    assert_eq!(seen.take(), vec![Some(1), Some(0)]);

    t.load_frames(FrameSequence::new());
    assert_eq!(t.state(), PlaybackState::Empty);
    assert_eq!(t.current_index(), None);
}

#[test]
fn speed_is_clamped_and_reported() {
    let (mut t, _) = loaded(2);
    t.drain_events();
    t.set_speed(0);
    assert_eq!(t.speed_ms(), 1);
    t.set_speed(120);
    assert_eq!(t.speed_ms(), 120);
    t.set_speed(120);
    assert_eq!(
        t.drain_events(),
        vec![
            PlayerEvent::SpeedChanged { from: 500, to: 1 },
            PlayerEvent::SpeedChanged { from: 1, to: 120 },
        ]
    );
}

/// it should hand out snapshots that cannot alter stored frames
#[test]
fn snapshots_are_independent_copies() {
    let frames: FrameSequence<Vec<i32>> = vec![
        Frame::new(vec![3, 1, 2], "start"),
        Frame::new(vec![1, 3, 2], "swap"),
        Frame::new(vec![1, 2, 3], "done"),
    ]
    .into();
    let mut t = Transport::new(PlayerConfig::default(), |_: &Vec<i32>| {});
    t.load_frames(frames);
    t.go_to_frame(1);
    let mut snap = t.current_snapshot().unwrap();
    snap.clear();
    snap.push(99);
    t.go_to_frame(0);
    assert_eq!(t.current_snapshot(), Some(vec![3, 1, 2]));
    t.go_to_frame(2);
    assert_eq!(t.current_snapshot(), Some(vec![1, 2, 3]));
    t.go_to_frame(1);
    assert_eq!(t.current_snapshot(), Some(vec![1, 3, 2]));
}

#[test]
fn event_trail_for_a_full_run() {
    let (mut t, _) = loaded(3);
    t.drain_events();
    t.play();
    while t.is_playing() {
        t.tick();
    }
    assert_eq!(
        t.drain_events(),
        vec![
            PlayerEvent::Started,
            PlayerEvent::FrameChanged { from: 0, to: 1 },
            PlayerEvent::FrameChanged { from: 1, to: 2 },
            PlayerEvent::Completed,
        ]
    );
}
