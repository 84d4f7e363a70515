use serde::{Deserialize, Deserializer, Serialize};

/// Tunables for the computer player. Leaf evaluation works in quarter points,
/// the quiet-move heuristic in half points, so both stay integral.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // Leaf evaluation (quarter points)
    pub val_man: i32,
    pub val_king: i32,
    pub advance_weight: i32,
    pub center_weight: i32,
    pub edge_penalty: i32,
    pub mobility_weight: i32,
    pub capture_bonus: i32,
    pub win_score: i32,

    // Quiet-move heuristic (half points)
    pub heuristic_advance: i32,
    pub heuristic_center: i32,
    pub heuristic_edge_penalty: i32,
    pub heuristic_danger_penalty: i32,
    pub heuristic_support_bonus: i32,
    pub support_radius: u8,

    // Move selection
    pub search_depth: u8,
    pub alpha_beta: bool,
    pub easy_miss_capture_chance: f64,
    pub medium_top_fraction: f64,

    // Pacing
    pub thinking_delay_ms: u64,
    pub time_limit_ms: Option<u64>,
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            val_man: 40,
            val_king: 120,
            advance_weight: 8,
            center_weight: 1,
            edge_penalty: 8,
            mobility_weight: 2,
            capture_bonus: 60,
            win_score: 10_000,

            heuristic_advance: 4,
            heuristic_center: 1,
            heuristic_edge_penalty: 6,
            heuristic_danger_penalty: 20,
            heuristic_support_bonus: 10,
            support_radius: 2,

            search_depth: 3,
            alpha_beta: true,
            easy_miss_capture_chance: 0.4,
            medium_top_fraction: 0.3,

            thinking_delay_ms: 800,
            time_limit_ms: Some(10_000),
            seed: None,
        }
    }
}

/// Override file shape: weights are multipliers of the defaults, everything
/// else is taken as an absolute value.
#[derive(Deserialize)]
struct EngineConfigJson {
    val_man: Option<f32>,
    val_king: Option<f32>,
    advance_weight: Option<f32>,
    center_weight: Option<f32>,
    edge_penalty: Option<f32>,
    mobility_weight: Option<f32>,
    capture_bonus: Option<f32>,

    heuristic_advance: Option<f32>,
    heuristic_center: Option<f32>,
    heuristic_edge_penalty: Option<f32>,
    heuristic_danger_penalty: Option<f32>,
    heuristic_support_bonus: Option<f32>,

    search_depth: Option<u8>,
    alpha_beta: Option<bool>,
    easy_miss_capture_chance: Option<f64>,
    medium_top_fraction: Option<f64>,
    thinking_delay_ms: Option<u64>,
    /// Absent keeps the default deadline, `null` removes it.
    #[serde(default, deserialize_with = "present")]
    time_limit_ms: Option<Option<u64>>,
    seed: Option<u64>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<u64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<u64>::deserialize(deserializer).map(Some)
}

impl EngineConfig {
    pub fn load_from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        let json_config: EngineConfigJson = serde_json::from_str(json_str)?;
        let default = Self::default();

        Ok(Self {
            val_man: apply_scale(default.val_man, json_config.val_man),
            val_king: apply_scale(default.val_king, json_config.val_king),
            advance_weight: apply_scale(default.advance_weight, json_config.advance_weight),
            center_weight: apply_scale(default.center_weight, json_config.center_weight),
            edge_penalty: apply_scale(default.edge_penalty, json_config.edge_penalty),
            mobility_weight: apply_scale(default.mobility_weight, json_config.mobility_weight),
            capture_bonus: apply_scale(default.capture_bonus, json_config.capture_bonus),
            win_score: default.win_score,

            heuristic_advance: apply_scale(
                default.heuristic_advance,
                json_config.heuristic_advance,
            ),
            heuristic_center: apply_scale(default.heuristic_center, json_config.heuristic_center),
            heuristic_edge_penalty: apply_scale(
                default.heuristic_edge_penalty,
                json_config.heuristic_edge_penalty,
            ),
            heuristic_danger_penalty: apply_scale(
                default.heuristic_danger_penalty,
                json_config.heuristic_danger_penalty,
            ),
            heuristic_support_bonus: apply_scale(
                default.heuristic_support_bonus,
                json_config.heuristic_support_bonus,
            ),
            support_radius: default.support_radius,

            search_depth: json_config.search_depth.unwrap_or(default.search_depth),
            alpha_beta: json_config.alpha_beta.unwrap_or(default.alpha_beta),
            easy_miss_capture_chance: json_config
                .easy_miss_capture_chance
                .unwrap_or(default.easy_miss_capture_chance)
                .clamp(0.0, 1.0),
            medium_top_fraction: json_config
                .medium_top_fraction
                .unwrap_or(default.medium_top_fraction)
                .clamp(0.0, 1.0),
            thinking_delay_ms: json_config
                .thinking_delay_ms
                .unwrap_or(default.thinking_delay_ms),
            time_limit_ms: json_config
                .time_limit_ms
                .unwrap_or(default.time_limit_ms),
            seed: json_config.seed.or(default.seed),
        })
    }
}

/// Bound on any scaled weight, small enough that a full-board evaluation
/// cannot overflow `i32`.
pub const MAX_WEIGHT: i32 = 1_000_000;

/// Scales a default weight; a non-finite multiplier keeps the default.
#[allow(clippy::cast_possible_truncation)]
fn apply_scale(default_val: i32, scale: Option<f32>) -> i32 {
    match scale {
        Some(s) if s.is_finite() => {
            ((default_val as f32 * s) as i32).clamp(-MAX_WEIGHT, MAX_WEIGHT)
        }
        _ => default_val,
    }
}
