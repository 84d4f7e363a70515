use draughts_core::engine::config::EngineConfig;
use draughts_core::engine::player::ComputerPlayer;
use draughts_core::engine::search::AlphaBetaEngine;
use draughts_core::engine::{Difficulty, SearchLimit};
use draughts_core::logic::board::{Color, PIECES_PER_SIDE};
use draughts_core::logic::game::GameState;
use draughts_core::logic::history::GameHistory;
use std::ops::ControlFlow;
use std::sync::Arc;

fn seeded(seed: u64) -> EngineConfig {
    EngineConfig {
        seed: Some(seed),
        time_limit_ms: None,
        ..EngineConfig::default()
    }
}

/// Plays up to `max_turns` steps, recording each one. Returns the number of
/// steps actually played.
fn play_out(
    game: &mut GameState,
    history: &mut GameHistory,
    white: (&mut ComputerPlayer, Difficulty),
    black: (&mut ComputerPlayer, Difficulty),
    max_turns: usize,
) -> usize {
    let (white_player, white_level) = white;
    let (black_player, black_level) = black;
    let mut played = 0;
    while !game.is_over() && played < max_turns {
        let mv = match game.turn() {
            Color::White => white_player.select_move(game, white_level),
            Color::Black => black_player.select_move(game, black_level),
        };
        let Some(mv) = mv else { break };
        let before = game.get_board_state();
        let result = game.play(&mv).expect("players only return legal moves");
        if !result.can_continue_capture && !game.is_over() {
            game.switch_turn();
        }
        history.record(&result, before, game);
        played += 1;
    }
    played
}

#[test]
fn pruned_and_full_search_agree_along_a_game() {
    let mut game = GameState::new();
    let mut history = GameHistory::new();
    let mut white = ComputerPlayer::new(seeded(17));
    let mut black = ComputerPlayer::new(seeded(18));

    let mut pruned = AlphaBetaEngine::new(Arc::new(seeded(0)));
    let mut full = AlphaBetaEngine::new(Arc::new(EngineConfig {
        alpha_beta: false,
        ..seeded(0)
    }));

    for _ in 0..12 {
        if game.is_over() {
            break;
        }
        let limit = SearchLimit::depth(3);
        let (a, _) = pruned.search_with_stats(&game, limit);
        let (b, _) = full.search_with_stats(&game, limit);
        assert_eq!(a, b, "diverged at move {}", game.move_count());

        play_out(
            &mut game,
            &mut history,
            (&mut white, Difficulty::Easy),
            (&mut black, Difficulty::Medium),
            1,
        );
    }
}

#[test]
fn self_play_keeps_invariants() {
    let mut game = GameState::new();
    let mut history = GameHistory::new();
    let mut white = ComputerPlayer::new(seeded(3));
    let mut black = ComputerPlayer::new(seeded(4));

    let played = play_out(
        &mut game,
        &mut history,
        (&mut white, Difficulty::Medium),
        (&mut black, Difficulty::Easy),
        150,
    );
    assert_eq!(history.len(), played);
    assert_eq!(history.states().len(), played + 1);
    assert_eq!(game.move_count() as usize, played);

    // Every captured piece is gone from the board and credited to its captor.
    for color in [Color::White, Color::Black] {
        let lost = PIECES_PER_SIDE - game.get_all_pieces(color).len();
        assert_eq!(game.score(color.opposite()) as usize, lost);
    }

    let captures = history.moves().iter().filter(|m| m.is_capture).count();
    let total_score = game.score(Color::White) + game.score(Color::Black);
    assert_eq!(captures, total_score as usize);

    if let Some(winner) = game.winner() {
        assert_eq!(game.check_win_condition(), Some(winner));
    }
}

#[test]
fn replay_can_pause_and_resume() {
    let mut game = GameState::new();
    let mut history = GameHistory::new();
    let mut white = ComputerPlayer::new(seeded(9));
    let mut black = ComputerPlayer::new(seeded(10));
    let played = play_out(
        &mut game,
        &mut history,
        (&mut white, Difficulty::Medium),
        (&mut black, Difficulty::Medium),
        6,
    );
    assert_eq!(played, 6);
    let final_position = game.clone();

    // Callback-driven walk, broken after three positions and resumed.
    let mut seen = Vec::new();
    let resume_at = history.replay(0, |index, _| {
        seen.push(index);
        if seen.len() == 3 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });
    assert_eq!(resume_at, Some(3));
    let done = history.replay(3, |index, _| {
        seen.push(index);
        ControlFlow::Continue(())
    });
    assert_eq!(done, None);
    assert_eq!(seen, (0..=6).collect::<Vec<_>>());

    // Timer-driven cursor.
    assert!(history.start_replay(&mut game));
    assert_eq!(game.move_count(), 0);
    assert_eq!(history.step_replay(&mut game), Some(1));
    history.pause_replay();
    assert_eq!(history.step_replay(&mut game), None);
    assert_eq!(game.move_count(), 1);
    history.resume_replay();
    assert_eq!(history.step_replay(&mut game), Some(2));
    history.stop_replay(&mut game);
    assert!(!history.is_replaying());
    assert_eq!(game, final_position);
    assert_eq!(history.len(), 6);
}

#[test]
fn transcript_exports_match_log() {
    let mut game = GameState::new();
    let mut history = GameHistory::new();
    let mut white = ComputerPlayer::new(seeded(5));
    let mut black = ComputerPlayer::new(seeded(6));
    play_out(
        &mut game,
        &mut history,
        (&mut white, Difficulty::Hard),
        (&mut black, Difficulty::Medium),
        8,
    );

    let text = history.export_as_text();
    assert!(text.starts_with("DRAUGHTS/CHECKERS GAME"));
    assert!(text.contains(&format!("Total Moves: {}", history.len())));
    for record in history.moves() {
        assert!(text.contains(&format!(
            "{}. {}: {}",
            record.number, record.color, record.notation
        )));
    }

    let json: serde_json::Value = serde_json::from_str(&history.export_as_json().unwrap()).unwrap();
    assert_eq!(json["game"]["totalMoves"], history.len());
    assert_eq!(
        json["game"]["finalScore"]["white"],
        game.score(Color::White)
    );
    assert_eq!(json["moves"].as_array().map(Vec::len), Some(history.len()));
}
