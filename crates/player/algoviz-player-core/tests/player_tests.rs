use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use algoviz_player_core::{Frame, FrameSequence, PlaybackState, Player, PlayerConfig};

fn seq(n: usize) -> FrameSequence<usize> {
    (0..n).map(|i| Frame::new(i, format!("frame {i}"))).collect()
}

fn recording_player(speed_ms: u64) -> (Player<usize>, Arc<Mutex<Vec<usize>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let player = Player::new(
        PlayerConfig::default().with_speed_ms(speed_ms),
        move |s: &usize| sink.lock().unwrap().push(*s),
    );
    (player, seen)
}

fn counting_player(speed_ms: u64) -> (Player<usize>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&calls);
    let player = Player::new(
        PlayerConfig::default().with_speed_ms(speed_ms),
        move |_: &usize| {
            sink.fetch_add(1, Ordering::SeqCst);
        },
    );
    (player, calls)
}

/// it should play a 5-frame sequence at 100ms through to completion
#[test]
fn plays_to_completion() {
    let (player, seen) = recording_player(100);
    player.load_frames(seq(5));
    let started = Instant::now();
    player.play();
    assert!(player.is_playing());
    // four ticks at 100 ms each
    assert!(player.wait_for_completion(Duration::from_millis(700)));
    assert!(started.elapsed() >= Duration::from_millis(350));
    assert_eq!(player.current_index(), Some(4));
    assert!(!player.is_playing());
    assert!(player.is_complete());
    assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3, 4]);
}

/// it should never run two tickers for one player
#[test]
fn double_play_advances_once_per_interval() {
    let (player, seen) = recording_player(15);
    player.load_frames(seq(8));
    player.play();
    player.play();
    assert!(player.wait_for_completion(Duration::from_secs(5)));
    assert_eq!(*seen.lock().unwrap(), (0..8).collect::<Vec<_>>());
}

/// it should not advance after an immediate pause
#[test]
fn pause_before_first_tick_freezes_position() {
    let (player, calls) = counting_player(200);
    player.load_frames(seq(3));
    player.play();
    player.pause();
    let after_pause = calls.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(600));
    assert_eq!(player.current_index(), Some(0));
    assert!(player.is_paused());
    assert_eq!(calls.load(Ordering::SeqCst), after_pause);
    assert!(!player.wait_for_completion(Duration::from_millis(10)));
}

#[test]
fn pause_and_resume_mid_run() {
    let (player, seen) = recording_player(10);
    player.load_frames(seq(30));
    player.play();
    thread::sleep(Duration::from_millis(50));
    player.pause();
    let frozen = player.current_index();
    thread::sleep(Duration::from_millis(60));
    assert_eq!(player.current_index(), frozen);
    player.play();
    assert!(player.wait_for_completion(Duration::from_secs(5)));
    assert_eq!(*seen.lock().unwrap(), (0..30).collect::<Vec<_>>());
}

/// it should stop all timer callbacks once cleared
#[test]
fn clear_cancels_pending_ticks() {
    let (player, calls) = counting_player(10);
    player.load_frames(seq(200));
    player.play();
    thread::sleep(Duration::from_millis(40));
    player.clear();
    let at_clear = calls.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(100));
    assert_eq!(calls.load(Ordering::SeqCst), at_clear);
    assert_eq!(player.total_frames(), 0);
    assert_eq!(player.state(), PlaybackState::Empty);
}

#[test]
fn dropping_a_playing_player_stops_callbacks() {
    let (player, calls) = counting_player(10);
    player.load_frames(seq(200));
    player.play();
    thread::sleep(Duration::from_millis(30));
    drop(player);
    let at_drop = calls.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(80));
    assert_eq!(calls.load(Ordering::SeqCst), at_drop);
}

/// it should pick up a speed change on the running timer
#[test]
fn speed_change_applies_mid_playback() {
    let (player, _) = counting_player(60_000);
    player.load_frames(seq(5));
    player.play();
    thread::sleep(Duration::from_millis(20));
    assert_eq!(player.current_index(), Some(0));
    let started = Instant::now();
    player.set_speed(5);
    assert!(player.wait_for_completion(Duration::from_secs(5)));
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(player.speed(), 5);
}

#[test]
fn reset_stops_and_rewinds() {
    let (player, seen) = recording_player(10);
    player.load_frames(seq(50));
    player.play();
    thread::sleep(Duration::from_millis(40));
    player.reset();
    assert_eq!(player.current_index(), Some(0));
    assert!(!player.is_playing());
    assert!(!player.is_complete());
    let len = seen.lock().unwrap().len();
    assert_eq!(seen.lock().unwrap().last(), Some(&0));
    thread::sleep(Duration::from_millis(50));
    assert_eq!(seen.lock().unwrap().len(), len);
}

#[test]
fn empty_player_is_inert() {
    let (player, calls) = counting_player(10);
    player.play();
    player.step_forward();
    player.go_to_frame(2);
    assert_eq!(player.total_frames(), 0);
    assert_eq!(player.current_index(), None);
    assert!(!player.is_playing());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn seek_and_steps_through_the_player() {
    let (player, _) = recording_player(500);
    player.load_frames(seq(5));
    player.go_to_frame(2);
    player.go_to_frame(-1);
    assert_eq!(player.current_index(), Some(0));
    for _ in 0..4 {
        player.step_forward();
    }
    assert!(player.is_complete());
    assert_eq!(player.current_snapshot(), Some(4));
    assert_eq!(player.current_description().as_deref(), Some("frame 4"));
}

/// it should run independent players side by side
#[test]
fn independent_players_do_not_interfere() {
    let (fast, fast_seen) = recording_player(5);
    let (slow, slow_seen) = recording_player(20);
    assert_ne!(fast.id(), slow.id());
    fast.load_frames(seq(10));
    slow.load_frames(seq(4));
    fast.play();
    slow.play();
    assert!(fast.wait_for_completion(Duration::from_secs(5)));
    assert!(slow.wait_for_completion(Duration::from_secs(5)));
    assert_eq!(*fast_seen.lock().unwrap(), (0..10).collect::<Vec<_>>());
    assert_eq!(*slow_seen.lock().unwrap(), (0..4).collect::<Vec<_>>());
}

#[test]
fn shared_across_threads() {
    let (player, _) = counting_player(5);
    let player = Arc::new(player);
    player.load_frames(seq(10));
    let remote = Arc::clone(&player);
    thread::spawn(move || remote.play()).join().unwrap();
    assert!(player.wait_for_completion(Duration::from_secs(5)));
    assert_eq!(player.current_index(), Some(9));
}
