//! Deterministic input source for headless runs.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::engine::GameEngine;
use crate::types::{ActorKind, Cell, Direction, Vec2};
use crate::world::Grid;

const DANGER_RADIUS: i32 = 1;

/// Next direction for the player of `engine`.
pub fn choose_direction(engine: &GameEngine) -> Direction {
    let player = engine.player();
    if player.motion.is_off_grid(engine.grid().width()) {
        return player.motion.dir;
    }

    let mut threats = Vec::new();
    let mut prey = Vec::new();
    for ghost in engine.ghosts().iter().filter(|ghost| ghost.is_collidable()) {
        if ghost.frightened {
            prey.push(ghost.motion.tile());
        } else {
            threats.push(ghost.motion.tile());
        }
    }

    plan(
        engine.grid(),
        player.tile(),
        &threats,
        &prey,
        !player.has_any_power(),
    )
}

/// First step of the shortest path to the nearest goal tile.
///
/// Goals are dots, power pellets when `take_pellets` is set, and `prey` tiles.
/// Tiles next to a threat are avoided whenever a route around them exists.
pub fn plan(
    grid: &Grid,
    start: Vec2,
    threats: &[Vec2],
    prey: &[Vec2],
    take_pellets: bool,
) -> Direction {
    if !grid.in_bounds(start.x, start.y) {
        return Direction::None;
    }

    let is_goal = |tile: Vec2| {
        prey.contains(&tile)
            || match grid.cell(tile.x, tile.y) {
                Some(Cell::Dot) => true,
                Some(Cell::PowerPellet) => take_pellets,
                _ => false,
            }
    };
    let danger: HashSet<Vec2> = threats
        .iter()
        .flat_map(|threat| danger_zone(grid, *threat))
        .collect();

    first_step(grid, start, is_goal, |tile| danger.contains(&tile))
        .or_else(|| first_step(grid, start, is_goal, |_| false))
        .unwrap_or_else(|| escape(grid, start, threats))
}

fn danger_zone(grid: &Grid, threat: Vec2) -> Vec<Vec2> {
    let mut out = Vec::new();
    for dy in -DANGER_RADIUS..=DANGER_RADIUS {
        for dx in -DANGER_RADIUS..=DANGER_RADIUS {
            if dx.abs() + dy.abs() <= DANGER_RADIUS {
                out.push(grid.wrapped_neighbor(threat, dx, dy));
            }
        }
    }
    out
}

fn first_step(
    grid: &Grid,
    start: Vec2,
    is_goal: impl Fn(Vec2) -> bool,
    blocked: impl Fn(Vec2) -> bool,
) -> Option<Direction> {
    let mut first: HashMap<Vec2, Direction> = HashMap::new();
    let mut queue = VecDeque::new();
    let mut seen = HashSet::from([start]);
    queue.push_back(start);

    while let Some(tile) = queue.pop_front() {
        if tile != start && is_goal(tile) {
            return first.get(&tile).copied();
        }
        for dir in Direction::CARDINALS {
            let (dx, dy) = dir.vector();
            let next = grid.wrapped_neighbor(tile, dx, dy);
            if !grid.in_bounds(next.x, next.y)
                || !grid.is_walkable(next.x, next.y, ActorKind::Player)
                || blocked(next)
                || !seen.insert(next)
            {
                continue;
            }
            let step = first.get(&tile).copied().unwrap_or(dir);
            first.insert(next, step);
            queue.push_back(next);
        }
    }
    None
}

fn escape(grid: &Grid, start: Vec2, threats: &[Vec2]) -> Direction {
    let mut best = Direction::None;
    let mut best_dist = i32::MIN;
    for dir in Direction::CARDINALS {
        let (dx, dy) = dir.vector();
        let next = grid.wrapped_neighbor(start, dx, dy);
        if !grid.in_bounds(next.x, next.y) || !grid.is_walkable(next.x, next.y, ActorKind::Player)
        {
            continue;
        }
        let dist = threats
            .iter()
            .map(|threat| (threat.x - next.x).abs() + (threat.y - next.y).abs())
            .min()
            .unwrap_or(i32::MAX);
        if dist > best_dist {
            best_dist = dist;
            best = dir;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::GameEngineOptions;

    fn loop_grid(row1: &str, row3: &str) -> Grid {
        Grid::parse(&["#######", row1, "# ### #", row3, "#######"]).expect("valid grid")
    }

    #[test]
    fn heads_for_the_nearest_dot() {
        let grid = loop_grid("#.    #", "#     #");
        assert_eq!(plan(&grid, Vec2::new(5, 1), &[], &[], true), Direction::Left);
    }

    #[test]
    fn detours_around_a_threat() {
        let grid = loop_grid("#.    #", "#     #");
        let threats = [Vec2::new(3, 1)];
        assert_eq!(
            plan(&grid, Vec2::new(5, 1), &threats, &[], true),
            Direction::Down
        );
    }

    #[test]
    fn chases_frightened_ghosts() {
        let grid = loop_grid("#.    #", "#     #");
        let prey = [Vec2::new(5, 3)];
        assert_eq!(plan(&grid, Vec2::new(5, 1), &[], &prey, true), Direction::Down);
    }

    #[test]
    fn ignores_pellets_while_powered() {
        let grid = loop_grid("#o    #", "# .   #");
        assert_eq!(plan(&grid, Vec2::new(5, 1), &[], &[], true), Direction::Left);
        assert_eq!(plan(&grid, Vec2::new(5, 1), &[], &[], false), Direction::Down);
    }

    #[test]
    fn escapes_when_nothing_is_left() {
        let grid = loop_grid("#     #", "#     #");
        assert_eq!(plan(&grid, Vec2::new(5, 1), &[], &[], true), Direction::Down);
        let threats = [Vec2::new(5, 3)];
        assert_eq!(
            plan(&grid, Vec2::new(5, 1), &threats, &[], true),
            Direction::Left
        );
    }

    #[test]
    fn engine_start_position_has_a_move() {
        let mut engine = GameEngine::new(GameEngineOptions::default()).expect("engine");
        engine.start_run("BOT").expect("start");
        assert_ne!(choose_direction(&engine), Direction::None);
    }
}
