//! Claw Machine entry point
//!
//! Native builds run a headless session driven by the demo player. The
//! browser build is started from the library (`platform::web`).

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use clap::Parser;

    use claw_machine::consts::SIM_DT_MS;
    use claw_machine::sim::{AutoPlayer, GameEvent, GameState, GrabPhase, tick};
    use claw_machine::{ClawError, Settings};

    /// Simulated time allowed per grab cycle before the runner gives up
    const CYCLE_BUDGET_MS: u64 = 60_000;

    #[derive(Parser)]
    #[command(version, about = "Headless claw machine: the demo player works the claw")]
    struct Cli {
        /// Settings JSON file (defaults to the standard cabinet)
        #[arg(long, value_name = "PATH")]
        settings: Option<PathBuf>,

        /// RNG seed for toy placement (defaults to the current time)
        #[arg(long)]
        seed: Option<u64>,

        /// Grab cycles to play before stopping
        #[arg(long, default_value_t = 20)]
        cycles: u32,

        /// Print every game event as a JSON line
        #[arg(long)]
        events: bool,
    }

    fn time_seed() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    }

    pub fn run() -> Result<(), ClawError> {
        let cli = Cli::parse();
        let settings = match &cli.settings {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        let seed = cli.seed.unwrap_or_else(time_seed);
        let mut state = GameState::with_settings(settings, seed)?;
        let mut player = AutoPlayer::new();

        let deadline = (cli.cycles as u64 + 1) * CYCLE_BUDGET_MS;
        let mut idle_entries = 0u32;
        let mut won = false;

        while state.now_ms() < deadline {
            let input = player.next_input(&state);
            tick(&mut state, &input, SIM_DT_MS);

            for event in state.drain_events() {
                match event {
                    GameEvent::PhaseChanged {
                        phase: GrabPhase::Idle,
                    } => idle_entries += 1,
                    GameEvent::Victory => won = true,
                    _ => {}
                }
                if cli.events {
                    println!("{}", serde_json::to_string(&event)?);
                }
            }

            // The first Idle follows homing
            let cycles = idle_entries.saturating_sub(1);
            let settled = !state.toys.any_ready() && !state.overlay;
            if won || player.finished() || (cycles >= cli.cycles && settled) {
                break;
            }
        }

        if state.now_ms() >= deadline {
            log::warn!("Stopped at the {} ms time cap", deadline);
        }
        println!(
            "seed {}: {} cycles, {}/{} toys collected in {:.1}s{}",
            seed,
            idle_entries.saturating_sub(1),
            state.collection.count(),
            state.collection.total(),
            state.now_ms() as f64 / 1000.0,
            if won { ", victory!" } else { "" }
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Claw Machine (native) starting...");

    if let Err(err) = native::run() {
        log::error!("{}", err);
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::start, this is just to satisfy the compiler
}
