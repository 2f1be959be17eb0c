use tracing::{debug, warn};

use crate::constants::{
    level_bonus, prize_title, CAPTURE_RADIUS, COLS, FRIGHTENED_DURATION_MS, LEVEL_ADVANCE_MS,
    LEVEL_BANNER_MS, LEVEL_CLEAR_MESSAGE_MS, LIFE_LOST_MESSAGE_MS, LIFE_LOST_RESPAWN_MS,
    MAX_FRAME_STEP_SEC, MUSHROOM_DURATION_MS, MUSHROOM_SPAWN_INTERVAL_MAX_MS,
    MUSHROOM_SPAWN_INTERVAL_MIN_MS, PLAYER_BASE_SPEED, PLAYER_START, PRIZE_DELAY_MS, ROWS,
    SCORE_GHOST, SCORE_MUSHROOM, START_LIVES, TICK_MS, TILE, TOTAL_LEVELS,
};
use crate::error::EngineError;
use crate::levels::{self, level_count};
use crate::rng::Rng;
use crate::types::{
    Cell, Direction, GameConfig, RunPhase, RunSummary, RuntimeEvent, ScoreSubmission, Snapshot,
};
use crate::world::Grid;

mod ghost;
mod motion;
mod mushroom;
mod player;
mod utils;

pub use self::ghost::{choose_direction, flee_target, Ghost};
pub use self::motion::{tile_center, Motion};
pub use self::mushroom::Mushroom;
pub use self::player::{MoveOutcome, Player};

use self::utils::tick_down;

const GHOST_COUNT: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Transition {
    StartLevel,
    Respawn,
    AdvanceLevel,
    ShowPrize,
}

/// The one delayed step the run is waiting on. Arming a new one replaces it.
#[derive(Clone, Copy, Debug)]
struct PendingTransition {
    kind: Transition,
    remaining_ms: f32,
}

#[derive(Clone, Debug)]
struct TimedMessage {
    text: String,
    remaining_ms: f32,
}

#[derive(Clone, Debug, Default)]
struct RunStats {
    frames: u64,
    ghosts_eaten: u32,
    lives_lost: u32,
}

#[derive(Clone, Debug)]
pub struct GameEngineOptions {
    pub seed: u32,
    pub player_speed: f32,
    pub start_level: usize,
}

impl Default for GameEngineOptions {
    fn default() -> Self {
        Self {
            seed: 1,
            player_speed: PLAYER_BASE_SPEED,
            start_level: 0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GameEngine {
    pub config: GameConfig,

    rng: Rng,
    seed: u32,
    phase: RunPhase,
    player_name: String,
    start_level: usize,

    grid: Grid,
    player: Player,
    ghosts: Vec<Ghost>,
    mushroom: Mushroom,
    mushroom_spawn_ms: f32,

    score: u32,
    lives: u32,
    level: usize,
    dots_remaining: u32,
    frightened_ms: f32,
    level_cleared: bool,

    pending: Option<PendingTransition>,
    message: Option<TimedMessage>,
    events: Vec<RuntimeEvent>,
    submission: Option<ScoreSubmission>,
    tick_counter: u64,
    stats: RunStats,
}

impl GameEngine {
    pub fn new(options: GameEngineOptions) -> Result<Self, EngineError> {
        if options.start_level >= level_count() {
            return Err(EngineError::UnknownLevel(options.start_level));
        }
        let grid = levels::load_level(options.start_level)?;
        let player = Player::new(PLAYER_START, options.player_speed)?;
        let mut rng = Rng::new(options.seed);
        let mushroom_spawn_ms = next_spawn_interval(&mut rng);
        let dots_remaining = grid.count(Cell::Dot);

        Ok(Self {
            config: GameConfig {
                tile: TILE,
                cols: COLS,
                rows: ROWS,
                total_levels: TOTAL_LEVELS.min(level_count()),
                start_lives: START_LIVES,
                tick_ms: TICK_MS,
                frightened_duration_ms: FRIGHTENED_DURATION_MS,
                mushroom_duration_ms: MUSHROOM_DURATION_MS,
            },
            rng,
            seed: options.seed,
            phase: RunPhase::Idle,
            player_name: String::new(),
            start_level: options.start_level,
            grid,
            player,
            ghosts: (0..GHOST_COUNT).map(Ghost::new).collect(),
            mushroom: Mushroom::default(),
            mushroom_spawn_ms,
            score: 0,
            lives: START_LIVES,
            level: options.start_level,
            dots_remaining,
            frightened_ms: 0.0,
            level_cleared: false,
            pending: None,
            message: None,
            events: Vec::new(),
            submission: None,
            tick_counter: 0,
            stats: RunStats::default(),
        })
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// 1-based level number.
    pub fn level(&self) -> usize {
        self.level + 1
    }

    pub fn dots_remaining(&self) -> u32 {
        self.dots_remaining
    }

    pub fn frightened_ms(&self) -> f32 {
        self.frightened_ms
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    pub fn mushroom(&self) -> &Mushroom {
        &self.mushroom
    }

    /// The host keeps its frame loop armed only while this is true.
    pub fn wants_frames(&self) -> bool {
        !matches!(
            self.phase,
            RunPhase::Idle | RunPhase::GameOver | RunPhase::Prize
        )
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.phase, RunPhase::GameOver | RunPhase::Prize)
    }

    pub fn start_run(&mut self, name: &str) -> Result<(), EngineError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::EmptyPlayerName);
        }
        self.pending = None;
        self.message = None;
        self.submission = None;
        self.player_name = name.to_string();
        self.score = 0;
        self.lives = START_LIVES;
        self.stats = RunStats::default();
        self.events.push(RuntimeEvent::RunStarted {
            name: self.player_name.clone(),
        });
        debug!(name = %self.player_name, seed = self.seed, "run started");
        self.load_level(self.start_level)
    }

    pub fn restart(&mut self) -> Result<(), EngineError> {
        let name = self.player_name.clone();
        self.start_run(&name)
    }

    /// Latest requested direction; the player consumes it at the next legal turn.
    pub fn receive_input(&mut self, dir: Direction) {
        self.player.next_dir = dir;
    }

    pub fn set_paused(&mut self, paused: bool) -> bool {
        let next = match (self.phase, paused) {
            (RunPhase::Running, true) => RunPhase::Paused,
            (RunPhase::Paused, false) => RunPhase::Running,
            _ => return false,
        };
        self.phase = next;
        self.events.push(RuntimeEvent::Paused { paused });
        true
    }

    pub fn take_submission(&mut self) -> Option<ScoreSubmission> {
        self.submission.take()
    }

    pub fn step(&mut self, dt_ms: u64) {
        self.tick_counter += 1;
        let raw_ms = dt_ms as f32;

        if let Some(message) = self.message.as_mut() {
            message.remaining_ms -= raw_ms;
            if message.remaining_ms <= 0.0 {
                self.message = None;
            }
        }

        if self.phase == RunPhase::Running {
            let dt_sec = (raw_ms / 1_000.0).min(MAX_FRAME_STEP_SEC);
            self.stats.frames += 1;
            self.update_running(dt_sec);
        }

        self.tick_pending(raw_ms);
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let snapshot = Snapshot {
            tick: self.tick_counter,
            phase: self.phase,
            score: self.score,
            lives: self.lives,
            level: self.level(),
            dots_remaining: self.dots_remaining,
            frightened_ms: self.frightened_ms,
            tiles: self.grid.tiles(),
            player: self.player.view(),
            ghosts: self.ghosts.iter().map(Ghost::view).collect(),
            mushroom: self.mushroom.view(),
            message: self.message.as_ref().map(|message| message.text.clone()),
            events: if include_events {
                self.events.clone()
            } else {
                Vec::new()
            },
        };
        if include_events {
            self.events.clear();
        }
        snapshot
    }

    pub fn build_summary(&self) -> RunSummary {
        RunSummary {
            phase: self.phase,
            score: self.score,
            level_reached: self.level(),
            lives: self.lives,
            frames: self.stats.frames,
            ghosts_eaten: self.stats.ghosts_eaten,
            lives_lost: self.stats.lives_lost,
        }
    }

    fn load_level(&mut self, index: usize) -> Result<(), EngineError> {
        self.pending = None;
        self.grid = levels::load_level(index)?;
        self.level = index;
        self.dots_remaining = self.grid.count(Cell::Dot);
        self.level_cleared = false;
        self.reset_actors();
        self.mushroom.deactivate();
        self.mushroom_spawn_ms = next_spawn_interval(&mut self.rng);
        self.phase = RunPhase::LevelBanner;
        self.show_message(format!("LEVEL {}", index + 1), LEVEL_BANNER_MS);
        self.arm(Transition::StartLevel, LEVEL_BANNER_MS);
        self.events.push(RuntimeEvent::LevelBanner { level: index + 1 });
        debug!(level = index + 1, dots = self.dots_remaining, "level loaded");
        Ok(())
    }

    fn reset_actors(&mut self) {
        self.player.reset(PLAYER_START);
        self.ghosts = (0..GHOST_COUNT).map(Ghost::new).collect();
        self.frightened_ms = 0.0;
    }

    fn arm(&mut self, kind: Transition, delay_ms: f32) {
        self.pending = Some(PendingTransition {
            kind,
            remaining_ms: delay_ms,
        });
    }

    fn show_message(&mut self, text: String, duration_ms: f32) {
        self.message = Some(TimedMessage {
            text,
            remaining_ms: duration_ms,
        });
    }

    fn tick_pending(&mut self, dt_ms: f32) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        pending.remaining_ms -= dt_ms;
        if pending.remaining_ms > 0.0 {
            return;
        }
        let kind = pending.kind;
        self.pending = None;
        self.fire(kind);
    }

    fn fire(&mut self, kind: Transition) {
        match kind {
            Transition::StartLevel => {
                self.phase = RunPhase::Running;
                self.message = None;
                self.frightened_ms = 0.0;
                self.events.push(RuntimeEvent::LevelStarted {
                    level: self.level(),
                });
            }
            Transition::Respawn => {
                self.reset_actors();
                self.phase = RunPhase::Running;
            }
            Transition::AdvanceLevel => {
                if let Err(err) = self.load_level(self.level + 1) {
                    warn!(error = %err, "failed to load next level; ending run");
                    self.end_run(RunPhase::GameOver);
                }
            }
            Transition::ShowPrize => self.end_run(RunPhase::Prize),
        }
    }

    fn update_running(&mut self, dt_sec: f32) {
        let dt_ms = dt_sec * 1_000.0;

        let outcome = self.player.move_step(dt_sec, &mut self.grid);
        self.score += outcome.score_delta;
        self.dots_remaining = self.dots_remaining.saturating_sub(outcome.dots_eaten);
        if outcome.power_triggered {
            let tile = self.player.tile();
            self.events.push(RuntimeEvent::PowerPellet {
                x: tile.x,
                y: tile.y,
            });
            self.activate_frightened();
        }
        self.player.tick_power_timers(dt_ms);

        let player_tile = self.player.tile();
        for ghost in &mut self.ghosts {
            ghost.update(dt_sec, player_tile, &self.grid);
        }

        self.update_mushroom(dt_sec);

        if self.resolve_collisions() {
            return;
        }
        self.check_level_complete();
        self.tick_frightened(dt_ms);
    }

    /// Power-pellet side effects. Declined while the stronger mushroom mode runs.
    fn activate_frightened(&mut self) -> bool {
        if self.player.has_mushroom_power() {
            return false;
        }
        self.frightened_ms = FRIGHTENED_DURATION_MS;
        self.player.activate_speed_boost();
        for ghost in &mut self.ghosts {
            ghost.startle();
        }
        true
    }

    fn update_mushroom(&mut self, dt_sec: f32) {
        if self.mushroom.is_active() {
            if self.mushroom.update(dt_sec, &self.grid, &mut self.rng) {
                self.events.push(RuntimeEvent::MushroomExpired);
                return;
            }
            let (px, py) = (self.player.motion.x, self.player.motion.y);
            if self.mushroom.motion.distance_to(px, py) < CAPTURE_RADIUS {
                self.collect_mushroom();
            }
            return;
        }

        if self.player.has_mushroom_power() {
            return;
        }
        self.mushroom_spawn_ms -= dt_sec * 1_000.0;
        if self.mushroom_spawn_ms > 0.0 {
            return;
        }
        self.mushroom_spawn_ms = next_spawn_interval(&mut self.rng);
        if let Some(tile) = self.mushroom.spawn(&self.grid, PLAYER_START, &mut self.rng) {
            self.events.push(RuntimeEvent::MushroomSpawned {
                x: tile.x,
                y: tile.y,
            });
        }
    }

    fn collect_mushroom(&mut self) {
        self.mushroom.deactivate();
        self.score += SCORE_MUSHROOM;
        self.player.activate_mushroom_power();
        self.frightened_ms = self.frightened_ms.max(MUSHROOM_DURATION_MS);
        for ghost in &mut self.ghosts {
            ghost.startle();
        }
        self.events.push(RuntimeEvent::MushroomCollected {
            points: SCORE_MUSHROOM,
        });
    }

    /// Returns true when the player was caught and the frame must stop here.
    fn resolve_collisions(&mut self) -> bool {
        let (px, py) = (self.player.motion.x, self.player.motion.y);
        let points = if self.player.has_mushroom_power() {
            SCORE_GHOST * 2
        } else {
            SCORE_GHOST
        };

        let mut caught = false;
        for ghost in &mut self.ghosts {
            if !ghost.is_collidable() || ghost.motion.distance_to(px, py) >= CAPTURE_RADIUS {
                continue;
            }
            if ghost.frightened {
                ghost.mark_eaten();
                self.score += points;
                self.stats.ghosts_eaten += 1;
                self.events.push(RuntimeEvent::GhostEaten {
                    index: ghost.index,
                    points,
                });
            } else {
                caught = true;
                break;
            }
        }

        if caught {
            self.lose_life();
        }
        caught
    }

    fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        self.stats.lives_lost += 1;
        self.events.push(RuntimeEvent::LifeLost { lives: self.lives });
        debug!(lives = self.lives, score = self.score, "life lost");

        if self.lives == 0 {
            self.end_run(RunPhase::GameOver);
            return;
        }
        self.phase = RunPhase::LifeLost;
        self.show_message("OOPS!".to_string(), LIFE_LOST_MESSAGE_MS);
        self.arm(Transition::Respawn, LIFE_LOST_RESPAWN_MS);
    }

    fn check_level_complete(&mut self) {
        if self.level_cleared || self.dots_remaining > 0 {
            return;
        }
        self.level_cleared = true;
        let bonus = level_bonus(self.level);
        self.score += bonus;
        self.phase = RunPhase::LevelComplete;
        self.events.push(RuntimeEvent::LevelCleared {
            level: self.level(),
            bonus,
        });
        debug!(level = self.level(), bonus, score = self.score, "level cleared");

        if self.level + 1 >= level_count() {
            self.arm(Transition::ShowPrize, PRIZE_DELAY_MS);
        } else {
            self.show_message(
                format!("LEVEL {} CLEAR! +{bonus} BONUS", self.level()),
                LEVEL_CLEAR_MESSAGE_MS,
            );
            self.arm(Transition::AdvanceLevel, LEVEL_ADVANCE_MS);
        }
    }

    fn tick_frightened(&mut self, dt_ms: f32) {
        if self.frightened_ms <= 0.0 {
            return;
        }
        self.frightened_ms = tick_down(self.frightened_ms, dt_ms);
        if self.frightened_ms == 0.0 {
            for ghost in &mut self.ghosts {
                ghost.calm();
            }
        } else {
            for ghost in &mut self.ghosts {
                ghost.assert_frightened();
            }
        }
    }

    fn end_run(&mut self, phase: RunPhase) {
        self.pending = None;
        self.phase = phase;
        let level = self.level();
        match phase {
            RunPhase::Prize => {
                let title = prize_title(self.score).to_string();
                self.show_message(title.clone(), f32::MAX);
                self.events.push(RuntimeEvent::Prize {
                    score: self.score,
                    title,
                });
            }
            _ => {
                self.show_message("GAME OVER".to_string(), f32::MAX);
                self.events.push(RuntimeEvent::GameOver {
                    score: self.score,
                    level,
                });
            }
        }
        self.submission = Some(ScoreSubmission {
            name: self.player_name.clone(),
            score: u64::from(self.score),
            level: level as u32,
        });
        debug!(?phase, score = self.score, level, "run ended");
    }
}

fn next_spawn_interval(rng: &mut Rng) -> f32 {
    rng.range_u32(MUSHROOM_SPAWN_INTERVAL_MIN_MS, MUSHROOM_SPAWN_INTERVAL_MAX_MS) as f32
}
