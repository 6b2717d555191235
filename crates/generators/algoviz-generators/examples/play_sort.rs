//! Plays a generated sort in the terminal.
//!
//! `RUST_LOG=debug cargo run --example play_sort -- quick 12 42`
//! (algorithm, array length, seed; all optional).

use std::time::Duration;

use algoviz_generators::sorting::{generate_sort, random_array, BarState};
use algoviz_generators::{ArraySnapshot, SortAlgorithm};
use algoviz_player_core::{Frame, FrameListener, Player, PlayerConfig};
use anyhow::Context;

struct Terminal;

impl FrameListener<ArraySnapshot> for Terminal {
    fn on_frame(&mut self, index: usize, frame: &Frame<ArraySnapshot>) {
        let bars: Vec<String> = frame
            .snapshot
            .bars
            .iter()
            .map(|b| match b.state {
                BarState::Comparing => format!("<{}>", b.value),
                BarState::Swapping => format!("*{}*", b.value),
                BarState::Pivot => format!("[{}]", b.value),
                BarState::Sorted => format!("{}.", b.value),
                BarState::Idle => b.value.to_string(),
            })
            .collect();
        println!("{index:>4}  {:<48} {}", bars.join(" "), frame.description);
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let mut args = std::env::args().skip(1);
    let algorithm: SortAlgorithm = args
        .next()
        .as_deref()
        .unwrap_or("bubble")
        .parse()
        .context("first argument must be a sort algorithm")?;
    let len: usize = args
        .next()
        .map(|s| s.parse())
        .transpose()
        .context("length must be a number")?
        .unwrap_or(10);
    let seed: u64 = args
        .next()
        .map(|s| s.parse())
        .transpose()
        .context("seed must be a number")?
        .unwrap_or(1);

    let input = random_array(len, 99, seed)?;
    let frames = generate_sort(algorithm, &input)?;
    println!("{} sort of {input:?}: {} frames", algorithm.name(), frames.len());

    let player = Player::new(PlayerConfig::default().with_speed_ms(80), Terminal);
    player.load_frames(frames);
    player.play();
    if !player.wait_for_completion(Duration::from_secs(120)) {
        anyhow::bail!("playback did not finish");
    }
    Ok(())
}
