use crate::constants::{CENTER_TOLERANCE, TILE};
use crate::types::{Direction, Vec2};

/// Pixel centre of a tile.
pub fn tile_center(tile: Vec2) -> (f32, f32) {
    (
        tile.x as f32 * TILE + TILE / 2.0,
        tile.y as f32 * TILE + TILE / 2.0,
    )
}

/// Position and heading shared by every moving actor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motion {
    pub x: f32,
    pub y: f32,
    pub dir: Direction,
}

impl Motion {
    pub fn at_tile(tile: Vec2, dir: Direction) -> Self {
        let (x, y) = tile_center(tile);
        Self { x, y, dir }
    }

    pub fn tile(&self) -> Vec2 {
        Vec2::new(
            (self.x / TILE).floor() as i32,
            (self.y / TILE).floor() as i32,
        )
    }

    pub fn center(&self) -> (f32, f32) {
        tile_center(self.tile())
    }

    pub fn is_at_tile_center(&self) -> bool {
        let (cx, cy) = self.center();
        (self.x - cx).abs() < CENTER_TOLERANCE && (self.y - cy).abs() < CENTER_TOLERANCE
    }

    pub fn snap_to_center(&mut self) {
        let (cx, cy) = self.center();
        self.x = cx;
        self.y = cy;
    }

    /// Signed distance from the position to the tile centre along the heading.
    /// Negative once the centre is behind.
    pub fn distance_to_center_ahead(&self) -> f32 {
        let (cx, cy) = self.center();
        match self.dir {
            Direction::Right => cx - self.x,
            Direction::Left => self.x - cx,
            Direction::Down => cy - self.y,
            Direction::Up => self.y - cy,
            Direction::None => 0.0,
        }
    }

    /// True when moving `distance` this frame reaches or crosses the tile centre.
    pub fn crosses_center(&self, distance: f32) -> bool {
        if self.dir == Direction::None {
            return false;
        }
        let ahead = self.distance_to_center_ahead();
        ahead > 0.0 && ahead <= distance
    }

    pub fn advance(&mut self, distance: f32) {
        let (dx, dy) = self.dir.vector();
        self.x += dx as f32 * distance;
        self.y += dy as f32 * distance;
    }

    /// Teleports across the horizontal edges once half a tile past them.
    pub fn tunnel_wrap(&mut self, width_px: f32) {
        if self.x < -TILE / 2.0 {
            self.x = width_px + TILE / 2.0;
        } else if self.x > width_px + TILE / 2.0 {
            self.x = -TILE / 2.0;
        }
    }

    pub fn reverse(&mut self) {
        self.dir = self.dir.opposite();
    }

    pub fn distance_to(&self, x: f32, y: f32) -> f32 {
        let dx = self.x - x;
        let dy = self.y - y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_off_grid(&self, width: i32) -> bool {
        let col = self.tile().x;
        col < 0 || col >= width
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{CANVAS_W, COLS, ROWS};

    #[test]
    fn aligned_positions_round_trip_through_tile() {
        for row in 0..ROWS {
            for col in 0..COLS {
                let tile = Vec2::new(col, row);
                let motion = Motion::at_tile(tile, Direction::None);
                assert!(motion.is_at_tile_center());
                assert_eq!(motion.tile(), tile);
            }
        }
    }

    #[test]
    fn negative_positions_floor_into_negative_tiles() {
        let motion = Motion {
            x: -5.0,
            y: 30.0,
            dir: Direction::Left,
        };
        assert_eq!(motion.tile(), Vec2::new(-1, 1));
    }

    #[test]
    fn center_tolerance_is_strict() {
        let mut motion = Motion::at_tile(Vec2::new(3, 3), Direction::Right);
        motion.x += 1.9;
        assert!(motion.is_at_tile_center());
        motion.x += 0.2;
        assert!(!motion.is_at_tile_center());
        motion.snap_to_center();
        assert_eq!(motion, Motion::at_tile(Vec2::new(3, 3), Direction::Right));
    }

    #[test]
    fn crossing_detection_follows_the_heading() {
        let mut motion = Motion::at_tile(Vec2::new(3, 3), Direction::Right);
        motion.x -= 3.0;
        assert!(!motion.crosses_center(2.0));
        assert!(motion.crosses_center(3.0));
        motion.dir = Direction::Left;
        assert!(!motion.crosses_center(10.0));
        motion.dir = Direction::None;
        assert!(!motion.crosses_center(10.0));
    }

    #[test]
    fn tunnel_wrap_teleports_past_half_tile_margin() {
        let mut motion = Motion {
            x: -TILE / 2.0 - 0.5,
            y: 0.0,
            dir: Direction::Left,
        };
        motion.tunnel_wrap(CANVAS_W);
        assert_eq!(motion.x, CANVAS_W + TILE / 2.0);

        motion.x = CANVAS_W + TILE / 2.0 + 0.5;
        motion.tunnel_wrap(CANVAS_W);
        assert_eq!(motion.x, -TILE / 2.0);

        motion.x = -TILE / 2.0;
        motion.tunnel_wrap(CANVAS_W);
        assert_eq!(motion.x, -TILE / 2.0);
    }
}
