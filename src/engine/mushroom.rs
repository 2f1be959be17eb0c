use crate::constants::{
    frame_distance, MUSHROOM_BASE_SPEED, MUSHROOM_LIFETIME_MS, MUSHROOM_TURN_CHANCE,
};
use crate::rng::Rng;
use crate::types::{ActorKind, Cell, Direction, MushroomView, Vec2};
use crate::world::Grid;

use super::motion::Motion;
use super::utils::random_direction;

/// Wandering pickup. Inactive until spawned; never uses the tunnel or the door.
#[derive(Clone, Debug)]
pub struct Mushroom {
    pub motion: Motion,
    active: bool,
    lifetime_ms: f32,
    last_decision: Option<Vec2>,
}

impl Default for Mushroom {
    fn default() -> Self {
        Self {
            motion: Motion::at_tile(Vec2::new(0, 0), Direction::None),
            active: false,
            lifetime_ms: 0.0,
            last_decision: None,
        }
    }
}

impl Mushroom {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn lifetime_ms(&self) -> f32 {
        self.lifetime_ms
    }

    /// Places the mushroom on a random interior `Empty`/`Dot` cell reachable from `anchor`.
    pub fn spawn(&mut self, grid: &Grid, anchor: Vec2, rng: &mut Rng) -> Option<Vec2> {
        let reachable = grid.reachable_from(anchor, ActorKind::Player);
        let (width, height) = (grid.width(), grid.height());
        let mut candidates: Vec<Vec2> = grid
            .cells_matching(|cell| matches!(cell, Cell::Empty | Cell::Dot))
            .into_iter()
            .filter(|tile| tile.x > 0 && tile.y > 0 && tile.x < width - 1 && tile.y < height - 1)
            .filter(|tile| reachable.contains(tile))
            .collect();
        candidates.sort();
        let tile = *rng.pick(&candidates)?;

        self.motion = Motion::at_tile(tile, Direction::None);
        self.motion.dir = random_direction(rng, grid, tile, ActorKind::Mushroom);
        self.active = true;
        self.lifetime_ms = MUSHROOM_LIFETIME_MS;
        self.last_decision = Some(tile);
        Some(tile)
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.motion.dir = Direction::None;
        self.lifetime_ms = 0.0;
    }

    /// Advances one frame. Returns true when the lifetime ran out this frame.
    pub fn update(&mut self, dt_sec: f32, grid: &Grid, rng: &mut Rng) -> bool {
        if !self.active {
            return false;
        }
        self.lifetime_ms -= dt_sec * 1_000.0;
        if self.lifetime_ms <= 0.0 {
            self.deactivate();
            return true;
        }

        let tile = self.motion.tile();
        if self.motion.dir == Direction::None {
            self.motion.dir = random_direction(rng, grid, tile, ActorKind::Mushroom);
            return false;
        }

        let distance = frame_distance(MUSHROOM_BASE_SPEED, dt_sec);
        let mut remaining = distance;
        let crosses = self.motion.crosses_center(distance);
        let fresh_center = self.motion.is_at_tile_center() && self.last_decision != Some(tile);

        if crosses || fresh_center {
            if crosses {
                remaining = (distance - self.motion.distance_to_center_ahead()).max(0.0);
            }
            self.motion.snap_to_center();
            self.last_decision = Some(tile);

            let ahead = tile.offset(self.motion.dir);
            if !grid.is_walkable(ahead.x, ahead.y, ActorKind::Mushroom)
                || rng.chance(MUSHROOM_TURN_CHANCE)
            {
                self.motion.dir = random_direction(rng, grid, tile, ActorKind::Mushroom);
            }
            if self.motion.dir == Direction::None {
                return false;
            }
        }

        self.motion.advance(remaining);
        false
    }

    pub fn view(&self) -> Option<MushroomView> {
        if !self.active {
            return None;
        }
        Some(MushroomView {
            x: self.motion.x,
            y: self.motion.y,
            dir: self.motion.dir,
            lifetime_ms: self.lifetime_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PLAYER_START;
    use crate::levels::load_level;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn spawns_on_a_reachable_interior_cell() {
        let grid = load_level(0).expect("level");
        let reachable = grid.reachable_from(PLAYER_START, ActorKind::Player);
        let mut rng = Rng::new(11);
        for _ in 0..50 {
            let mut mushroom = Mushroom::default();
            let tile = mushroom.spawn(&grid, PLAYER_START, &mut rng).expect("spawn");
            assert!(reachable.contains(&tile));
            assert!(matches!(grid.cell(tile.x, tile.y), Some(Cell::Empty | Cell::Dot)));
            assert!(tile.x > 0 && tile.x < grid.width() - 1);
            assert!(mushroom.is_active());
            assert_eq!(mushroom.lifetime_ms(), MUSHROOM_LIFETIME_MS);
        }
    }

    #[test]
    fn wanders_without_entering_walls_tunnel_or_door() {
        let grid = load_level(2).expect("level");
        let mut rng = Rng::new(3);
        let mut mushroom = Mushroom::default();
        mushroom.spawn(&grid, PLAYER_START, &mut rng).expect("spawn");
        for _ in 0..460 {
            mushroom.update(DT, &grid, &mut rng);
            if !mushroom.is_active() {
                break;
            }
            let tile = mushroom.motion.tile();
            assert!(grid.is_walkable(tile.x, tile.y, ActorKind::Mushroom), "{tile:?}");
        }
    }

    #[test]
    fn expires_after_its_lifetime() {
        let grid = load_level(0).expect("level");
        let mut rng = Rng::new(8);
        let mut mushroom = Mushroom::default();
        mushroom.spawn(&grid, PLAYER_START, &mut rng).expect("spawn");
        let mut expired_at = None;
        for frame in 0..600 {
            if mushroom.update(DT, &grid, &mut rng) {
                expired_at = Some(frame);
                break;
            }
        }
        let frame = expired_at.expect("expired");
        assert!((479..=481).contains(&frame), "expired on frame {frame}");
        assert!(mushroom.view().is_none());
        assert!(!mushroom.update(DT, &grid, &mut rng));
    }

    #[test]
    fn no_candidates_means_no_spawn() {
        let grid = Grid::parse(&["###", "#o#", "###"]).expect("valid grid");
        let mut rng = Rng::new(1);
        let mut mushroom = Mushroom::default();
        assert_eq!(mushroom.spawn(&grid, Vec2::new(1, 1), &mut rng), None);
        assert!(!mushroom.is_active());
    }
}
