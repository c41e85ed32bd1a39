//! Roid Rush headless driver
//!
//! Plays the part of the platform layer without a window: an autopilot
//! produces input, a fixed-step accumulator drives the world, audio commands
//! are drained every frame and the HUD is logged.
//!
//! Run with `--help` for options.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use roid_rush::audio::{AudioCommand, AudioQueue};
use roid_rush::consts::{MAX_FRAME_TIME, MAX_SUBSTEPS, SIM_DT};
use roid_rush::sim::{TickInput, World};
use roid_rush::{Tuning, vec_to_angle};

#[derive(Parser, Debug)]
#[command(name = "roid-rush")]
#[command(about = "Headless wrap-around asteroids run driven by an autopilot")]
struct Args {
    /// World RNG seed
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Rendered frames to simulate
    #[arg(long, default_value_t = 3_600)]
    frames: u32,
    /// JSON tuning file; keys it omits keep their defaults
    #[arg(long)]
    tuning: Option<PathBuf>,
    /// Print the final world snapshot as JSON on stdout
    #[arg(long)]
    snapshot: bool,
}

/// Turns toward the nearest rock, thrusts when the path is long, taps fire
/// and jumps away from anything about to ram the ship
#[derive(Default)]
struct Autopilot {
    fire_held: bool,
}

impl Autopilot {
    fn input(&mut self, world: &World) -> TickInput {
        let ship = world.ship();
        let mut input = TickInput::default();

        let nearest = world
            .asteroids()
            .iter()
            .map(|a| (a.pos - ship.pos, a.radius))
            .min_by(|(a, _), (b, _)| a.length().total_cmp(&b.length()));

        if let Some((offset, radius)) = nearest {
            let diff = (vec_to_angle(offset) - ship.angle + 540.0).rem_euclid(360.0) - 180.0;
            input.turn_right = diff > 4.0;
            input.turn_left = diff < -4.0;
            input.thrust = offset.length() > 250.0;

            // Edge-triggered: alternate press and release
            let aimed = diff.abs() < 10.0;
            input.fire = aimed && !self.fire_held;
            self.fire_held = input.fire;

            input.hyperspace = ship.invuln <= 0.0 && offset.length() < radius + ship.radius + 8.0;
        }
        input
    }
}

fn main() -> ExitCode {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let args = Args::parse();

    let tuning = match &args.tuning {
        Some(path) => match Tuning::load(path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("Failed to load tuning from {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => Tuning::default(),
    };

    let mut world = match World::new(tuning, args.seed, AudioQueue::new()) {
        Ok(world) => world,
        Err(e) => {
            log::error!("Rejected tuning: {e}");
            return ExitCode::FAILURE;
        }
    };
    log::info!(
        "Roid Rush (headless) starting: seed {}, {} frames",
        world.seed(),
        args.frames
    );
    let mut pilot = Autopilot::default();
    let mut accumulator = 0.0f32;
    let mut sounds = 0usize;
    let mut last_hud = world.hud();

    for frame in 0..args.frames {
        // Uneven frame pacing with an occasional hitch
        let frame_time: f32 = match frame % 240 {
            239 => 0.25,
            n if n % 2 == 0 => 0.016,
            _ => 0.017,
        };
        accumulator += frame_time.min(MAX_FRAME_TIME);

        let mut input = pilot.input(&world);
        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            world.update(SIM_DT, &input);
            accumulator -= SIM_DT;
            substeps += 1;

            // Requests only apply to the first substep
            input.fire = false;
            input.hyperspace = false;
        }

        for cmd in world.audio_mut().drain() {
            match cmd {
                AudioCommand::Play { effect, volume } => {
                    log::trace!("play {:?} at {:.2}", effect, volume);
                }
                AudioCommand::StartLoop { handle, hum, .. } => {
                    log::debug!("loop {} start ({:?})", handle.id(), hum);
                }
                AudioCommand::StopLoop { handle } => {
                    log::debug!("loop {} stop", handle.id());
                }
            }
            sounds += 1;
        }

        let hud = world.hud();
        if hud != last_hud {
            log::info!("SCORE {}   LIVES {}   WAVE {}", hud.score, hud.lives, hud.wave);
            last_hud = hud;
        }
    }

    if let Err(e) = world.validate_invariants() {
        log::error!("World invariant broken: {e}");
        return ExitCode::FAILURE;
    }

    for (handle, hum) in world.audio().active_loops() {
        log::debug!("loop {} ({:?}) still running at exit", handle.id(), hum);
    }

    log::info!(
        "Finished after {} sim frames: score {}, lives {}, wave {}, {} audio commands",
        world.frame(),
        world.score(),
        world.lives(),
        world.wave(),
        sounds
    );

    if args.snapshot {
        match serde_json::to_string_pretty(&world.snapshot()) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                log::error!("Failed to serialize snapshot: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
