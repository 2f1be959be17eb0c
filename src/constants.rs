use crate::types::Vec2;

pub const TICK_MS: u64 = 16;

pub const TILE: f32 = 24.0;
pub const COLS: i32 = 21;
pub const ROWS: i32 = 21;
pub const CANVAS_W: f32 = COLS as f32 * TILE;

/// Speeds are expressed in pixels per 1/60 s.
pub const REFERENCE_FPS: f32 = 60.0;
pub const MAX_FRAME_STEP_SEC: f32 = 0.05;
pub const CENTER_TOLERANCE: f32 = 2.0;

pub const PLAYER_BASE_SPEED: f32 = 2.2;
pub const GHOST_BASE_SPEED: f32 = 2.1;
pub const MUSHROOM_BASE_SPEED: f32 = 2.0;
pub const GHOST_EXIT_SPEED_MULTIPLIER: f32 = 1.5;
pub const GHOST_FRIGHTENED_SPEED_MULTIPLIER: f32 = 0.6;
pub const GHOST_EATEN_SPEED_MULTIPLIER: f32 = 3.0;
pub const SPEED_BOOST_MULTIPLIER: f32 = 1.5;
pub const MUSHROOM_SPEED_MULTIPLIER: f32 = 1.7;

pub const SCORE_DOT: u32 = 10;
pub const SCORE_POWER: u32 = 50;
pub const SCORE_GHOST: u32 = 200;
pub const SCORE_MUSHROOM: u32 = 100;
pub const LEVEL_BONUS: u32 = 500;

pub const FRIGHTENED_DURATION_MS: f32 = 7_000.0;
pub const SPEED_BOOST_DURATION_MS: f32 = 5_000.0;
pub const MUSHROOM_DURATION_MS: f32 = 12_000.0;
pub const MUSHROOM_SPAWN_INTERVAL_MIN_MS: u32 = 15_000;
pub const MUSHROOM_SPAWN_INTERVAL_MAX_MS: u32 = 30_000;
pub const MUSHROOM_LIFETIME_MS: f32 = 8_000.0;
pub const MUSHROOM_TURN_CHANCE: f32 = 0.03;

pub const GHOST_EXIT_DELAYS_MS: [f32; 4] = [0.0, 4_000.0, 8_000.0, 12_000.0];
pub const GHOST_REENTRY_DELAY_MS: f32 = 3_000.0;
pub const GHOST_HOME_TOLERANCE: f32 = 4.0;
pub const GHOST_BOB_AMPLITUDE: f32 = 3.0;
pub const GHOST_BOB_PERIOD_MS: f32 = 300.0;
pub const GHOST_COLORS: [&str; 4] = ["#ff3030", "#ff4da6", "#00ffea", "#ff8c00"];
pub const GHOST_NAMES: [&str; 4] = ["Blinky", "Pinky", "Inky", "Clyde"];
pub const FRIGHTENED_COLOR: &str = "#2020ff";

pub const CAPTURE_RADIUS: f32 = TILE * 0.7;
pub const MOUTH_STEP: f32 = 0.15;

pub const START_LIVES: u32 = 3;
pub const TOTAL_LEVELS: usize = 6;

pub const LEVEL_BANNER_MS: f32 = 1_500.0;
pub const LIFE_LOST_MESSAGE_MS: f32 = 1_000.0;
pub const LIFE_LOST_RESPAWN_MS: f32 = 1_200.0;
pub const LEVEL_CLEAR_MESSAGE_MS: f32 = 2_000.0;
pub const LEVEL_ADVANCE_MS: f32 = 2_500.0;
pub const PRIZE_DELAY_MS: f32 = 1_500.0;

pub const PLAYER_START: Vec2 = Vec2 { x: 10, y: 15 };
pub const GHOST_HOMES: [Vec2; 4] = [
    Vec2 { x: 9, y: 9 },
    Vec2 { x: 10, y: 9 },
    Vec2 { x: 11, y: 9 },
    Vec2 { x: 10, y: 10 },
];
pub const GHOST_DOOR_COL: i32 = 10;
pub const GHOST_DOOR_ROW: i32 = 8;
pub const GHOST_EXIT_ROW: i32 = 7;

pub const RANKING_DEFAULT_LIMIT: usize = 10;
pub const RANKING_MAX_LIMIT: usize = 100;

pub fn level_bonus(level_index: usize) -> u32 {
    LEVEL_BONUS * (level_index as u32 + 1)
}

pub fn prize_title(score: u32) -> &'static str {
    if score >= 15_000 {
        return "PAC-MAN LEGEND";
    }
    if score >= 10_000 {
        return "GRAND CHAMPION";
    }
    if score >= 5_000 {
        return "PAC-MAN MASTER";
    }
    "PAC-MAN WARRIOR"
}

/// Pixel distance covered this frame at `speed`.
pub fn frame_distance(speed: f32, dt_sec: f32) -> f32 {
    speed * dt_sec * REFERENCE_FPS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_bonus_scales_with_level_number() {
        assert_eq!(level_bonus(0), 500);
        assert_eq!(level_bonus(5), 3_000);
    }

    #[test]
    fn prize_title_uses_score_thresholds() {
        assert_eq!(prize_title(0), "PAC-MAN WARRIOR");
        assert_eq!(prize_title(5_000), "PAC-MAN MASTER");
        assert_eq!(prize_title(12_000), "GRAND CHAMPION");
        assert_eq!(prize_title(15_000), "PAC-MAN LEGEND");
    }

    #[test]
    fn ghost_house_sits_below_the_door() {
        for home in GHOST_HOMES {
            assert!(home.y > GHOST_DOOR_ROW);
        }
        assert_eq!(GHOST_EXIT_ROW, GHOST_DOOR_ROW - 1);
    }
}
