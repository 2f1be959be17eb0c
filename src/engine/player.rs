use crate::constants::{
    frame_distance, MAX_FRAME_STEP_SEC, MOUTH_STEP, MUSHROOM_DURATION_MS,
    MUSHROOM_SPEED_MULTIPLIER, SCORE_DOT, SCORE_POWER, SPEED_BOOST_DURATION_MS,
    SPEED_BOOST_MULTIPLIER, TILE,
};
use crate::error::EngineError;
use crate::types::{ActorKind, Cell, Direction, PlayerView, Vec2};
use crate::world::Grid;

use super::motion::Motion;
use super::utils::tick_down;

/// What one frame of movement picked up. The engine applies the side effects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    pub score_delta: u32,
    pub dots_eaten: u32,
    pub power_triggered: bool,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub motion: Motion,
    pub next_dir: Direction,
    base_speed: f32,
    mouth_open: f32,
    mouth_opening: bool,
    speed_boost_ms: f32,
    mushroom_power_ms: f32,
}

impl Player {
    pub fn new(start: Vec2, base_speed: f32) -> Result<Self, EngineError> {
        if !base_speed.is_finite() || base_speed <= 0.0 {
            return Err(EngineError::InvalidSpeed(base_speed));
        }
        // Centre crossings are detected per frame, so the fastest mode must stay under half a tile.
        let fastest = base_speed * SPEED_BOOST_MULTIPLIER.max(MUSHROOM_SPEED_MULTIPLIER);
        if frame_distance(fastest, MAX_FRAME_STEP_SEC) >= TILE / 2.0 {
            return Err(EngineError::SpeedTooHigh(base_speed));
        }
        Ok(Self {
            motion: Motion::at_tile(start, Direction::None),
            next_dir: Direction::None,
            base_speed,
            mouth_open: 0.0,
            mouth_opening: true,
            speed_boost_ms: 0.0,
            mushroom_power_ms: 0.0,
        })
    }

    /// Back to `start`, stopped, with no queued turn and no power mode.
    pub fn reset(&mut self, start: Vec2) {
        self.motion = Motion::at_tile(start, Direction::None);
        self.next_dir = Direction::None;
        self.mouth_open = 0.0;
        self.mouth_opening = true;
        self.clear_power();
    }

    pub fn tile(&self) -> Vec2 {
        self.motion.tile()
    }

    pub fn has_speed_boost(&self) -> bool {
        self.speed_boost_ms > 0.0
    }

    pub fn has_mushroom_power(&self) -> bool {
        self.mushroom_power_ms > 0.0
    }

    pub fn has_any_power(&self) -> bool {
        self.has_speed_boost() || self.has_mushroom_power()
    }

    pub fn speed_boost_ms(&self) -> f32 {
        self.speed_boost_ms
    }

    pub fn mushroom_power_ms(&self) -> f32 {
        self.mushroom_power_ms
    }

    /// The strongest active mode wins; multipliers never stack.
    pub fn speed_multiplier(&self) -> f32 {
        if self.has_mushroom_power() {
            MUSHROOM_SPEED_MULTIPLIER
        } else if self.has_speed_boost() {
            SPEED_BOOST_MULTIPLIER
        } else {
            1.0
        }
    }

    pub fn speed(&self) -> f32 {
        self.base_speed * self.speed_multiplier()
    }

    /// Returns false when the stronger mushroom mode is running.
    pub fn activate_speed_boost(&mut self) -> bool {
        if self.has_mushroom_power() {
            return false;
        }
        self.speed_boost_ms = SPEED_BOOST_DURATION_MS;
        true
    }

    pub fn activate_mushroom_power(&mut self) {
        self.mushroom_power_ms = MUSHROOM_DURATION_MS;
    }

    pub fn clear_power(&mut self) {
        self.speed_boost_ms = 0.0;
        self.mushroom_power_ms = 0.0;
    }

    pub fn tick_power_timers(&mut self, dt_ms: f32) {
        self.speed_boost_ms = tick_down(self.speed_boost_ms, dt_ms);
        self.mushroom_power_ms = tick_down(self.mushroom_power_ms, dt_ms);
    }

    fn blocked(&self, tile: Vec2, dir: Direction, grid: &Grid) -> bool {
        if dir == Direction::None {
            return true;
        }
        let next = tile.offset(dir);
        !grid.is_walkable(next.x, next.y, ActorKind::Player)
    }

    pub fn move_step(&mut self, dt_sec: f32, grid: &mut Grid) -> MoveOutcome {
        if self.motion.dir == Direction::None && self.next_dir == Direction::None {
            return MoveOutcome::default();
        }
        if dt_sec <= 0.0 {
            return MoveOutcome::default();
        }

        let distance = frame_distance(self.speed(), dt_sec);
        let mut remaining = distance;
        let tile = self.motion.tile();

        if !self.motion.is_off_grid(grid.width()) {
            let crosses = self.motion.crosses_center(distance);
            let decide = crosses
                || (self.motion.is_at_tile_center()
                    && (self.next_dir != Direction::None
                        || self.blocked(tile, self.motion.dir, grid)));

            if decide {
                if crosses {
                    remaining = (distance - self.motion.distance_to_center_ahead()).max(0.0);
                }
                self.motion.snap_to_center();
                if self.next_dir != Direction::None && !self.blocked(tile, self.next_dir, grid) {
                    self.motion.dir = self.next_dir;
                    self.next_dir = Direction::None;
                } else if self.blocked(tile, self.motion.dir, grid) {
                    self.motion.dir = Direction::None;
                    remaining = 0.0;
                }
            }
        }

        self.motion.advance(remaining);
        self.motion.tunnel_wrap(grid.pixel_width());
        self.animate_mouth();
        self.pick_up(grid)
    }

    fn animate_mouth(&mut self) {
        if self.mouth_opening {
            self.mouth_open += MOUTH_STEP;
            if self.mouth_open >= 1.0 {
                self.mouth_open = 1.0;
                self.mouth_opening = false;
            }
        } else {
            self.mouth_open -= MOUTH_STEP;
            if self.mouth_open <= 0.0 {
                self.mouth_open = 0.0;
                self.mouth_opening = true;
            }
        }
    }

    fn pick_up(&mut self, grid: &mut Grid) -> MoveOutcome {
        let tile = self.motion.tile();
        let mut outcome = MoveOutcome::default();
        match grid.cell(tile.x, tile.y) {
            Some(Cell::Dot) => {
                grid.consume(tile.x, tile.y);
                outcome.score_delta = if self.has_mushroom_power() {
                    SCORE_DOT * 2
                } else {
                    SCORE_DOT
                };
                outcome.dots_eaten = 1;
            }
            // A pellet under an active power mode stays on the map for later.
            Some(Cell::PowerPellet) if !self.has_any_power() => {
                grid.consume(tile.x, tile.y);
                outcome.score_delta = SCORE_POWER;
                outcome.power_triggered = true;
            }
            _ => {}
        }
        outcome
    }

    pub fn view(&self) -> PlayerView {
        PlayerView {
            x: self.motion.x,
            y: self.motion.y,
            dir: self.motion.dir,
            next_dir: self.next_dir,
            mouth_open: self.mouth_open,
            speed_boost: self.has_speed_boost(),
            mushroom_power: self.has_mushroom_power(),
        }
    }
}
