//! Generators feeding the player end to end.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use algoviz_generators::sorting::bubble_sort;
use algoviz_generators::{ArraySnapshot, SortAction};
use algoviz_player_core::{
    Frame, FrameListener, PlaybackState, Player, PlayerConfig, Transport,
};

#[derive(Clone, Default)]
struct Shown(Arc<Mutex<Vec<(usize, Vec<i64>)>>>);

impl FrameListener<ArraySnapshot> for Shown {
    fn on_frame(&mut self, index: usize, frame: &Frame<ArraySnapshot>) {
        self.0
            .lock()
            .unwrap()
            .push((index, frame.snapshot.values()));
    }
}

/// it should play a bubble sort of [3, 1, 2] through to the sorted array
#[test]
fn player_runs_a_generated_sort() {
    let frames = bubble_sort(&[3, 1, 2]).expect("generate");
    let total = frames.len();
    let shown = Shown::default();
    let player = Player::new(PlayerConfig::default().with_speed_ms(5), shown.clone());
    player.load_frames(frames);
    player.play();
    assert!(player.wait_for_completion(Duration::from_secs(5)));

    let seen = shown.0.lock().unwrap().clone();
    let indices: Vec<usize> = seen.iter().map(|(i, _)| *i).collect();
    assert_eq!(indices, (0..total).collect::<Vec<_>>());
    assert_eq!(seen.last().map(|(_, v)| v.clone()), Some(vec![1, 2, 3]));

    let last = player.current_snapshot().expect("snapshot");
    assert_eq!(last.action, SortAction::Done);
    assert_eq!(last.swaps, 2);
}

/// stepping backwards through a sort shows the earlier arrays again
#[test]
fn transport_scrubs_a_generated_sort() {
    let frames = bubble_sort(&[3, 1, 2]).expect("generate");
    let first_swap = frames
        .iter()
        .position(|f| f.snapshot.action == SortAction::Swap)
        .expect("a swap frame");
    let shown = Shown::default();
    let mut t = Transport::new(PlayerConfig::default(), shown.clone());
    t.load_frames(frames);

    t.go_to_frame(first_swap as i64);
    assert_eq!(
        t.current_snapshot().map(|s| s.values()),
        Some(vec![1, 3, 2])
    );
    t.step_backward();
    assert_eq!(
        t.current_snapshot().map(|s| s.values()),
        Some(vec![3, 1, 2])
    );

    t.go_to_frame(i64::MAX);
    assert_eq!(t.state(), PlaybackState::Complete);
    assert!(!t.play());
    assert_eq!(
        t.current_snapshot().map(|s| s.values()),
        Some(vec![1, 2, 3])
    );
}

/// frames survive a JSON round trip for hosts that ship them elsewhere
#[test]
fn generated_frames_serialize() -> anyhow::Result<()> {
    let frames = bubble_sort(&[2, 1])?;
    let json = serde_json::to_string(&frames)?;
    let back: algoviz_player_core::FrameSequence<ArraySnapshot> = serde_json::from_str(&json)?;
    assert_eq!(back, frames);
    Ok(())
}
