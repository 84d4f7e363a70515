use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use draughts_core::engine::config::EngineConfig;
use draughts_core::engine::player::ComputerPlayer;
use draughts_core::engine::Difficulty;
use draughts_core::logic::board::Color;
use draughts_core::logic::game::GameState;
use draughts_core::logic::history::GameHistory;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Level {
    Easy,
    Medium,
    Hard,
}

impl From<Level> for Difficulty {
    fn from(level: Level) -> Self {
        match level {
            Level::Easy => Self::Easy,
            Level::Medium => Self::Medium,
            Level::Hard => Self::Hard,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Side {
    White,
    Black,
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::White => Self::White,
            Side::Black => Self::Black,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "draughts", about = "Computer-vs-computer English draughts")]
struct Args {
    /// Strength of the White player
    #[arg(long, value_enum, default_value_t = Level::Medium)]
    white: Level,

    /// Strength of the Black player
    #[arg(long, value_enum, default_value_t = Level::Hard)]
    black: Level,

    /// Side that opens a new game (ignored with --resume)
    #[arg(long, value_enum, default_value_t = Side::White)]
    first: Side,

    /// Seed for both players (Black uses seed + 1)
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many turns even if nobody has won
    #[arg(long, default_value_t = 200)]
    max_moves: u32,

    /// Pause before each computer move; defaults to the config's thinking delay
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Deadline for the hard player's search; 0 disables it
    #[arg(long)]
    time_limit_ms: Option<u64>,

    /// Engine config JSON (weights are multipliers of the defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Continue from a saved snapshot JSON instead of a new game
    #[arg(long)]
    resume: Option<PathBuf>,

    /// Transcript format written to stdout
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

fn load_config(args: &Args) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            EngineConfig::load_from_json(&json)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(delay) = args.delay_ms {
        config.thinking_delay_ms = delay;
    }
    if let Some(ms) = args.time_limit_ms {
        config.time_limit_ms = (ms > 0).then_some(ms);
    }
    Ok(config)
}

fn load_game(args: &Args) -> Result<GameState> {
    let Some(path) = &args.resume else {
        return Ok(GameState::with_first_turn(args.first.into()));
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    let mut game = GameState::new();
    game.load_json(&json)
        .with_context(|| format!("restoring snapshot {}", path.display()))?;
    info!(
        "resumed at move {} with {} to play",
        game.move_count(),
        game.turn()
    );
    Ok(game)
}

struct Players {
    white: (ComputerPlayer, Difficulty),
    black: (ComputerPlayer, Difficulty),
}

impl Players {
    fn new(config: &EngineConfig, args: &Args) -> Self {
        let black_config = EngineConfig {
            seed: config.seed.map(|seed| seed.wrapping_add(1)),
            ..config.clone()
        };
        Self {
            white: (ComputerPlayer::new(config.clone()), args.white.into()),
            black: (ComputerPlayer::new(black_config), args.black.into()),
        }
    }

    fn get(&mut self, color: Color) -> (&mut ComputerPlayer, Difficulty) {
        let (player, difficulty) = match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        };
        (player, *difficulty)
    }
}

fn play(
    game: &mut GameState,
    history: &mut GameHistory,
    players: &mut Players,
    args: &Args,
    delay_ms: u64,
) -> Result<()> {
    let mut turns = 0;
    while !game.is_over() && turns < args.max_moves {
        turns += 1;
        let color = game.turn();
        let (player, difficulty) = players.get(color);

        if delay_ms > 0 {
            std::thread::sleep(Duration::from_millis(delay_ms));
        }

        let before = game.get_board_state();
        let (mv, stats) = player.select_move_with_stats(game, difficulty);
        let Some(mv) = mv else {
            if stats.timed_out {
                warn!("{color} ran out of time, handing the turn over");
                game.force_turn(color.opposite());
                continue;
            }
            info!("{color} has no move");
            break;
        };

        let result = game
            .play(&mv)
            .with_context(|| format!("{color} chose illegal move {mv}"))?;
        if !result.can_continue_capture && !game.is_over() {
            game.switch_turn();
        }
        let record = history.record(&result, before, game);
        debug!(
            nodes = stats.nodes,
            time_ms = stats.time_ms,
            "{}. {}: {}",
            record.number,
            record.color,
            record.notation
        );
    }

    if !game.is_over() && turns >= args.max_moves {
        warn!("stopped after {turns} turns without a winner");
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let delay_ms = config.thinking_delay_ms;
    let mut game = load_game(&args)?;
    let mut history = GameHistory::new();
    let mut players = Players::new(&config, &args);

    play(&mut game, &mut history, &mut players, &args, delay_ms)?;

    match game.winner().or_else(|| game.check_win_condition()) {
        Some(winner) => info!(
            "{winner} wins {}-{}",
            game.score(winner),
            game.score(winner.opposite())
        ),
        None => info!("no winner"),
    }

    match args.format {
        Format::Text => {
            println!("{}", history.export_as_text());
            println!();
            println!("{}", game.board().to_diagram());
        }
        Format::Json => println!("{}", history.export_as_json()?),
    }
    Ok(())
}
