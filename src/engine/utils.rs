use crate::rng::Rng;
use crate::types::{ActorKind, Direction, Vec2};
use crate::world::Grid;

pub(super) fn tick_down(remaining_ms: f32, dt_ms: f32) -> f32 {
    (remaining_ms - dt_ms).max(0.0)
}

pub(super) fn walkable_directions(grid: &Grid, tile: Vec2, kind: ActorKind) -> Vec<Direction> {
    Direction::CARDINALS
        .into_iter()
        .filter(|dir| {
            let next = tile.offset(*dir);
            grid.is_walkable(next.x, next.y, kind)
        })
        .collect()
}

pub(super) fn random_direction(
    rng: &mut Rng,
    grid: &Grid,
    tile: Vec2,
    kind: ActorKind,
) -> Direction {
    let options = walkable_directions(grid, tile, kind);
    rng.pick(&options).copied().unwrap_or(Direction::None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_down_saturates_at_zero() {
        assert_eq!(tick_down(100.0, 16.0), 84.0);
        assert_eq!(tick_down(10.0, 16.0), 0.0);
        assert_eq!(tick_down(0.0, 16.0), 0.0);
    }

    #[test]
    fn random_direction_only_returns_open_neighbours() {
        let grid = Grid::parse(&["#####", "#. ##", "###.#", "#####"]).expect("valid grid");
        let mut rng = Rng::new(5);
        for _ in 0..50 {
            assert_eq!(
                random_direction(&mut rng, &grid, Vec2::new(1, 1), ActorKind::Mushroom),
                Direction::Right
            );
        }
        assert_eq!(
            random_direction(&mut rng, &grid, Vec2::new(3, 2), ActorKind::Mushroom),
            Direction::None
        );
    }
}
