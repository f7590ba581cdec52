use clap::Parser;
use ninenine::{
    init_logging, Game, GameConfig, Outcome, Phase, PlayerId, Skill,
};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use std::collections::HashMap;
use std::time::Instant;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
enum Commands {
    /// Play one random self-playing game, logging each turn.
    Demo {
        #[arg(long, help = "Fix RNG seed for a reproducible game (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
    /// Run many random games and print a JSON summary.
    Sim {
        #[arg(long, default_value_t = 100)]
        games: u32,
        #[arg(long, help = "Fix RNG seed for reproducible results")]
        seed: Option<u64>,
    },
}

/// Safety valve for the random driver; real games end far sooner.
const MAX_PLIES: u32 = 2000;

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Demo { seed } => {
            let (engine_rng, mut driver_rng) = rngs(seed);
            let (result, plies) = play_random_game(engine_rng, &mut driver_rng)?;
            let report = json!({
                "winner": result.map(|o| o.winner.number()),
                "reason": result.map(|o| format!("{}", o.reason)),
                "plies": plies,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Sim { games, seed } => {
            let mut wins: HashMap<u8, u32> = HashMap::new();
            let mut reasons: HashMap<String, u32> = HashMap::new();
            let mut unfinished = 0u32;
            let mut total_plies = 0u64;

            for i in 0..games {
                let game_seed = seed.map(|s| s.wrapping_add(u64::from(i)));
                let (engine_rng, mut driver_rng) = rngs(game_seed);
                let (result, plies) = play_random_game(engine_rng, &mut driver_rng)?;
                total_plies += u64::from(plies);
                match result {
                    Some(outcome) => {
                        *wins.entry(outcome.winner.number()).or_default() += 1;
                        *reasons.entry(format!("{}", outcome.reason)).or_default() += 1;
                    }
                    None => unfinished += 1,
                }
            }

            let report = json!({
                "games": games,
                "wins": wins,
                "reasons": reasons,
                "unfinished": unfinished,
                "avg_plies": total_plies as f64 / f64::from(games.max(1)),
            });
            println!("{}", serde_json::to_string(&report)?);
        }
    }
    Ok(())
}

fn rngs(seed: Option<u64>) -> (SmallRng, SmallRng) {
    match seed {
        Some(s) => (
            SmallRng::seed_from_u64(s),
            SmallRng::seed_from_u64(s.wrapping_add(1)),
        ),
        None => {
            let mut seed_rng = rand::rng();
            (
                SmallRng::from_rng(&mut seed_rng),
                SmallRng::from_rng(&mut seed_rng),
            )
        }
    }
}

/// Drive one full match with uniformly random choices from the legal sets
/// the engine exposes. Returns the outcome (None if the ply cap was hit)
/// and the number of plies played.
fn play_random_game(
    engine_rng: SmallRng,
    driver: &mut SmallRng,
) -> anyhow::Result<(Option<Outcome>, u32)> {
    let mut game = Game::new(GameConfig::default(), engine_rng);
    game.start_game()?;

    let p1_skill = Skill::ALL[driver.random_range(0..Skill::ALL.len())];
    let p2_skill = Skill::ALL[driver.random_range(0..Skill::ALL.len())];
    game.select_skill(PlayerId::P1, p1_skill)?;
    game.select_skill(PlayerId::P2, p2_skill)?;

    let mut plies = 0;
    while game.phase() != Phase::GameOver && plies < MAX_PLIES {
        plies += 1;
        match game.phase() {
            Phase::Roll => game.roll_dice()?,
            Phase::Move => {
                if game.movable_tiles().is_empty() && game.fall_tiles().is_empty() {
                    // only the diagonal mode has options and it may be
                    // unaffordable; abandon the game in that case
                    if game.toggle_move_mode().is_err() {
                        break;
                    }
                }
                let pos = if game.movable_tiles().is_empty() {
                    // Cornered: every option walks off the board.
                    game.fall_tiles()[driver.random_range(0..game.fall_tiles().len())].pos
                } else {
                    game.movable_tiles()[driver.random_range(0..game.movable_tiles().len())].pos
                };
                game.move_to(pos)?;
            }
            Phase::Place => {
                let pos = game.placeable_tiles()[driver.random_range(0..game.placeable_tiles().len())];
                game.place_at(pos)?;
            }
            Phase::DrillTarget => {
                let pos = game.drill_targets()[driver.random_range(0..game.drill_targets().len())];
                game.drill_at(pos)?;
            }
            _ => break,
        }
        game.tick(Instant::now());
    }

    Ok((game.outcome(), plies))
}
