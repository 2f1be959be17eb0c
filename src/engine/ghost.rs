use crate::constants::{
    frame_distance, FRIGHTENED_COLOR, GHOST_BASE_SPEED, GHOST_BOB_AMPLITUDE, GHOST_BOB_PERIOD_MS,
    GHOST_COLORS, GHOST_DOOR_COL, GHOST_EATEN_SPEED_MULTIPLIER, GHOST_EXIT_DELAYS_MS,
    GHOST_EXIT_ROW, GHOST_EXIT_SPEED_MULTIPLIER, GHOST_FRIGHTENED_SPEED_MULTIPLIER,
    GHOST_HOMES, GHOST_HOME_TOLERANCE, GHOST_NAMES, GHOST_REENTRY_DELAY_MS,
};
use crate::types::{ActorKind, Direction, GhostPhase, GhostView, Vec2};
use crate::world::Grid;

use super::motion::{tile_center, Motion};

/// Picks the legal direction whose next tile is closest to `target`.
///
/// Reversal is only considered when nothing else is open. Ties go to the
/// earliest entry of [`Direction::CARDINALS`]. `None` means the ghost is boxed in.
pub fn choose_direction(
    grid: &Grid,
    tile: Vec2,
    heading: Direction,
    target: Vec2,
    kind: ActorKind,
) -> Option<Direction> {
    let reverse = heading.opposite();
    let open = |dir: Direction| {
        let next = tile.offset(dir);
        grid.is_walkable(next.x, next.y, kind)
    };

    let mut best: Option<(i32, Direction)> = None;
    for dir in Direction::CARDINALS {
        if dir == reverse || !open(dir) {
            continue;
        }
        let dist = tile.offset(dir).dist_sq(target);
        if best.is_none_or(|(best_dist, _)| dist < best_dist) {
            best = Some((dist, dir));
        }
    }

    best.map(|(_, dir)| dir)
        .or_else(|| Direction::CARDINALS.into_iter().find(|dir| open(*dir)))
}

/// Corner farthest from the player; first corner wins a tie.
pub fn flee_target(grid: &Grid, player_tile: Vec2) -> Vec2 {
    let corners = grid.corners();
    let mut best = corners[0];
    let mut best_dist = -1;
    for corner in corners {
        let dist = corner.dist_sq(player_tile);
        if dist > best_dist {
            best_dist = dist;
            best = corner;
        }
    }
    best
}

#[derive(Clone, Debug)]
pub struct Ghost {
    pub index: usize,
    pub motion: Motion,
    pub phase: GhostPhase,
    pub frightened: bool,
    home: Vec2,
    exit_timer_ms: f32,
    bob_clock_ms: f32,
    last_decision: Option<Vec2>,
}

impl Ghost {
    pub fn new(index: usize) -> Self {
        let slot = index % GHOST_HOMES.len();
        let home = GHOST_HOMES[slot];
        Self {
            index,
            motion: Motion::at_tile(home, Direction::Up),
            phase: GhostPhase::WaitingInHouse,
            frightened: false,
            home,
            exit_timer_ms: GHOST_EXIT_DELAYS_MS[slot],
            bob_clock_ms: 0.0,
            last_decision: None,
        }
    }

    pub fn home(&self) -> Vec2 {
        self.home
    }

    pub fn exit_timer_ms(&self) -> f32 {
        self.exit_timer_ms
    }

    pub fn has_exited(&self) -> bool {
        matches!(self.phase, GhostPhase::Roaming | GhostPhase::Eaten)
    }

    /// True for a roaming ghost that can currently hurt the player or be eaten.
    pub fn is_collidable(&self) -> bool {
        self.phase == GhostPhase::Roaming
    }

    fn walk_kind(&self) -> ActorKind {
        ActorKind::Ghost {
            exited: self.has_exited(),
        }
    }

    pub fn update(&mut self, dt_sec: f32, player_tile: Vec2, grid: &Grid) {
        match self.phase {
            GhostPhase::WaitingInHouse => self.wait_in_house(dt_sec * 1_000.0),
            GhostPhase::Exiting => self.walk_out(dt_sec, player_tile, grid),
            GhostPhase::Roaming => self.roam(dt_sec, player_tile, grid),
            GhostPhase::Eaten => self.return_home(dt_sec),
        }
    }

    fn wait_in_house(&mut self, dt_ms: f32) {
        self.exit_timer_ms -= dt_ms;
        self.bob_clock_ms += dt_ms;
        let (hx, hy) = tile_center(self.home);
        let bob = (self.bob_clock_ms / GHOST_BOB_PERIOD_MS + self.index as f32).sin();
        self.motion.x = hx;
        self.motion.y = hy + bob * GHOST_BOB_AMPLITUDE;

        if self.exit_timer_ms <= 0.0 {
            self.exit_timer_ms = 0.0;
            self.phase = GhostPhase::Exiting;
            self.motion.x = tile_center(Vec2::new(GHOST_DOOR_COL, 0)).0;
            self.motion.dir = Direction::Up;
            self.motion.y -= 1.0;
        }
    }

    fn walk_out(&mut self, dt_sec: f32, player_tile: Vec2, grid: &Grid) {
        let exit_y = tile_center(Vec2::new(GHOST_DOOR_COL, GHOST_EXIT_ROW)).1;
        self.motion.dir = Direction::Up;
        self.motion.x = tile_center(Vec2::new(GHOST_DOOR_COL, 0)).0;
        self.motion.y -= frame_distance(GHOST_BASE_SPEED * GHOST_EXIT_SPEED_MULTIPLIER, dt_sec);

        if self.motion.y <= exit_y {
            self.motion.y = exit_y;
            self.phase = GhostPhase::Roaming;
            self.last_decision = None;
            self.roam(0.0, player_tile, grid);
        }
    }

    fn roam(&mut self, dt_sec: f32, player_tile: Vec2, grid: &Grid) {
        let multiplier = if self.frightened {
            GHOST_FRIGHTENED_SPEED_MULTIPLIER
        } else {
            1.0
        };
        let distance = frame_distance(GHOST_BASE_SPEED * multiplier, dt_sec.max(0.0));
        let mut remaining = distance;

        if !self.motion.is_off_grid(grid.width()) {
            let tile = self.motion.tile();
            let crosses = self.motion.crosses_center(distance);
            let fresh_center =
                self.motion.is_at_tile_center() && self.last_decision != Some(tile);

            if crosses || fresh_center {
                if crosses {
                    remaining = (distance - self.motion.distance_to_center_ahead()).max(0.0);
                }
                self.motion.snap_to_center();

                let target = if self.frightened {
                    flee_target(grid, player_tile)
                } else {
                    player_tile
                };
                match choose_direction(grid, tile, self.motion.dir, target, self.walk_kind()) {
                    Some(dir) => {
                        self.motion.dir = dir;
                        self.last_decision = Some(tile);
                    }
                    // Boxed in: hold position this frame.
                    None => return,
                }
            }
        }

        self.motion.advance(remaining);
        self.motion.tunnel_wrap(grid.pixel_width());
    }

    fn return_home(&mut self, dt_sec: f32) {
        let (hx, hy) = tile_center(self.home);
        let dx = hx - self.motion.x;
        let dy = hy - self.motion.y;

        if dx.abs() < GHOST_HOME_TOLERANCE && dy.abs() < GHOST_HOME_TOLERANCE {
            self.phase = GhostPhase::WaitingInHouse;
            self.frightened = false;
            self.exit_timer_ms = GHOST_REENTRY_DELAY_MS;
            self.motion = Motion::at_tile(self.home, Direction::Up);
            self.last_decision = None;
            return;
        }

        let step = frame_distance(GHOST_BASE_SPEED * GHOST_EATEN_SPEED_MULTIPLIER, dt_sec);
        if dx.abs() > dy.abs() {
            self.motion.x += dx.signum() * step.min(dx.abs());
        } else {
            self.motion.y += dy.signum() * step.min(dy.abs());
            if dx.abs() > 1.0 {
                self.motion.x += dx.signum() * (step * 0.5).min(dx.abs());
            }
        }
    }

    /// Power-mode onset. Only roaming ghosts react, with an immediate reversal.
    pub fn startle(&mut self) -> bool {
        if self.phase != GhostPhase::Roaming || self.frightened {
            return false;
        }
        self.frightened = true;
        self.motion.reverse();
        self.last_decision = None;
        true
    }

    /// Flags a ghost that left the house mid-countdown, without reversing it.
    pub fn assert_frightened(&mut self) {
        if self.phase == GhostPhase::Roaming {
            self.frightened = true;
        }
    }

    pub fn calm(&mut self) {
        self.frightened = false;
    }

    pub fn mark_eaten(&mut self) {
        self.phase = GhostPhase::Eaten;
        self.frightened = false;
    }

    pub fn view(&self) -> GhostView {
        let slot = self.index % GHOST_COLORS.len();
        GhostView {
            index: self.index,
            name: GHOST_NAMES[slot],
            x: self.motion.x,
            y: self.motion.y,
            dir: self.motion.dir,
            color: if self.frightened {
                FRIGHTENED_COLOR
            } else {
                GHOST_COLORS[slot]
            },
            phase: self.phase,
            frightened: self.frightened,
            eaten: self.phase == GhostPhase::Eaten,
        }
    }
}
