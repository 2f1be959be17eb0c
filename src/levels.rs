//! Built-in level templates.
//!
//! `#` wall, `.` dot, `o` power pellet, `-` ghost door, space empty.
//! Row 9 is the tunnel; the ghost house occupies columns 8..=12, rows 8..=11.

use crate::error::EngineError;
use crate::world::Grid;

const LEVEL_1: [&str; 21] = [
    "#####################",
    "#o........#........o#",
    "#.##.####.#.####.##.#",
    "#...................#",
    "#.##.#.#######.#.##.#",
    "#....#....#....#....#",
    "####.####.#.####.####",
    "####.#.........#.####",
    "####.## ##-## ##.####",
    "    .   #   #   .    ",
    "####.## #   # ##.####",
    "####.## ##### ##.####",
    "####.#         #.####",
    "####.#.#######.#.####",
    "#.........#.........#",
    "#.##.###.. ..###.##.#",
    "#o.#.............#.o#",
    "##.#.#.#######.#.#.##",
    "#....#....#....#....#",
    "#.######.....######.#",
    "#####################",
];

const LEVEL_2: [&str; 21] = [
    "#####################",
    "#....#.........#....#",
    "#o##.#.###.###.#.##o#",
    "#...................#",
    "#.####.##.#.##.####.#",
    "#......#..#..#......#",
    "####.#.#.###.#.#.####",
    "####.#.........#.####",
    "####.## ##-## ##.####",
    "    .   #   #   .    ",
    "####.## #   # ##.####",
    "####.## ##### ##.####",
    "####.#         #.####",
    "####.#.#######.#.####",
    "#....#....#....#....#",
    "#.##...#.. ..#...##.#",
    "#o.#.#.#.....#.#.#.o#",
    "##.#.#.###.###.#.#.##",
    "#....#.........#....#",
    "#.####.###.###.####.#",
    "#####################",
];

const LEVEL_3: [&str; 21] = [
    "#####################",
    "#.........#.........#",
    "#.#.#.###.#.###.#.#.#",
    "#o#.#.....#.....#.#o#",
    "#.#.#.#.#####.#.#.#.#",
    "#.....#.......#.....#",
    "####.##.#.#.#.##.####",
    "####.............####",
    "####.## ##-## ##.####",
    "    .   #   #   .    ",
    "####.## #   # ##.####",
    "####.## ##### ##.####",
    "####.#         #.####",
    "####.#.###.###.#.####",
    "#.........#.........#",
    "#.###.#.#. .#.#.###.#",
    "#o..#.#.#...#.#.#..o#",
    "###.#.#.#.#.#.#.#.###",
    "#.....#...#...#.....#",
    "#.###...#...#...###.#",
    "#####################",
];

const LEVEL_4: [&str; 21] = [
    "#####################",
    "#.........#.........#",
    "#.##.####.#.####.##.#",
    "#...................#",
    "#.##.#.#######.#.##.#",
    "#....#....#....#....#",
    "####.####.#.####.####",
    "####.#.........#.####",
    "####.## ##-## ##.####",
    "    .   #   #   .    ",
    "####.## #   # ##.####",
    "####.## ##### ##.####",
    "####.#         #.####",
    "####.#.#######.#.####",
    "#.........#.........#",
    "#.##.###.. ..###.##.#",
    "#o.#.............#.o#",
    "##.#.#.#######.#.#.##",
    "#....#....#....#....#",
    "#.######.....######.#",
    "#####################",
];

const LEVEL_5: [&str; 21] = [
    "#####################",
    "#....#.........#....#",
    "#.##.#.###.###.#.##.#",
    "#...................#",
    "#.####.##.#.##.####.#",
    "#......#..#..#......#",
    "####.#.#.###.#.#.####",
    "####.#.........#.####",
    "####.## ##-## ##.####",
    "    .   #   #   .    ",
    "####.## #   # ##.####",
    "####.## ##### ##.####",
    "####.#         #.####",
    "####.#.#######.#.####",
    "#....#....#....#....#",
    "#.##...#.. ..#...##.#",
    "#o.#.#.#.....#.#.#.o#",
    "##.#.#.###.###.#.#.##",
    "#....#.........#....#",
    "#.####.###.###.####.#",
    "#####################",
];

const LEVEL_6: [&str; 21] = [
    "#####################",
    "#.........#.........#",
    "#.#.#.###.#.###.#.#.#",
    "#.#.#.....#.....#.#.#",
    "#.#.#.#.#####.#.#.#.#",
    "#.....#.......#.....#",
    "####.##.#.#.#.##.####",
    "####.............####",
    "####.## ##-## ##.####",
    "    .   #   #   .    ",
    "####.## #   # ##.####",
    "####.## ##### ##.####",
    "####.#         #.####",
    "####.#.###.###.#.####",
    "#.........#.........#",
    "#.###.#.#. .#.#.###.#",
    "#o..#.#.#...#.#.#..o#",
    "###.#.#.#.#.#.#.#.###",
    "#.....#...#...#.....#",
    "#.###...#...#...###.#",
    "#####################",
];

const TEMPLATES: [&[&str; 21]; 6] = [&LEVEL_1, &LEVEL_2, &LEVEL_3, &LEVEL_4, &LEVEL_5, &LEVEL_6];

pub fn level_count() -> usize {
    TEMPLATES.len()
}

/// Fresh copy of the template for `index`; each level load gets its own grid.
pub fn load_level(index: usize) -> Result<Grid, EngineError> {
    let template = TEMPLATES
        .get(index)
        .ok_or(EngineError::UnknownLevel(index))?;
    Grid::parse(&template[..])
}

pub fn load_all() -> Result<Vec<Grid>, EngineError> {
    (0..level_count()).map(load_level).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{
        COLS, GHOST_DOOR_COL, GHOST_DOOR_ROW, GHOST_EXIT_ROW, GHOST_HOMES, PLAYER_START, ROWS,
        TOTAL_LEVELS,
    };
    use crate::types::{ActorKind, Cell};

    #[test]
    fn every_template_parses_at_full_size() {
        assert_eq!(level_count(), TOTAL_LEVELS);
        for grid in load_all().expect("templates parse") {
            assert_eq!(grid.width(), COLS);
            assert_eq!(grid.height(), ROWS);
        }
        assert!(matches!(load_level(99), Err(EngineError::UnknownLevel(99))));
    }

    #[test]
    fn dot_counts_match_the_layouts() {
        let counts: Vec<u32> = load_all()
            .expect("templates parse")
            .iter()
            .map(|grid| grid.count(Cell::Dot))
            .collect();
        assert_eq!(counts, vec![162, 162, 169, 164, 164, 171]);
    }

    #[test]
    fn pickups_are_reachable_from_the_player_start() {
        for (index, grid) in load_all().expect("templates parse").iter().enumerate() {
            let reachable = grid.reachable_from(PLAYER_START, ActorKind::Player);
            for tile in grid.cells_matching(|cell| matches!(cell, Cell::Dot | Cell::PowerPellet)) {
                assert!(
                    reachable.contains(&tile),
                    "level {index}: pickup at ({},{}) is unreachable",
                    tile.x,
                    tile.y
                );
            }
        }
    }

    #[test]
    fn ghost_house_geometry_is_consistent() {
        for grid in load_all().expect("templates parse") {
            assert_eq!(grid.cell(GHOST_DOOR_COL, GHOST_DOOR_ROW), Some(Cell::GhostDoor));
            assert!(grid.is_walkable(GHOST_DOOR_COL, GHOST_EXIT_ROW, ActorKind::Player));
            for home in GHOST_HOMES {
                assert_eq!(grid.cell(home.x, home.y), Some(Cell::Empty));
            }
            assert!(grid.is_tunnel_row(9));
            assert_eq!(grid.cell(PLAYER_START.x, PLAYER_START.y), Some(Cell::Empty));
        }
    }

    #[test]
    fn each_load_is_an_independent_copy() {
        let mut first = load_level(0).expect("level 0");
        first.consume(1, 1);
        let second = load_level(0).expect("level 0");
        assert_eq!(second.cell(1, 1), Some(Cell::PowerPellet));
    }
}
