use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    None,
}

impl Direction {
    /// Evaluation order for every direction scan; ties resolve to the earliest entry.
    pub const CARDINALS: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn parse_move(value: &str) -> Option<Self> {
        match value {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    pub fn vector(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::None => (0, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::None => Self::None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

impl Vec2 {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dir: Direction) -> Self {
        let (dx, dy) = dir.vector();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn dist_sq(self, other: Vec2) -> i32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    Empty,
    Wall,
    Dot,
    PowerPellet,
    GhostDoor,
}

impl Cell {
    pub fn from_char(value: char) -> Option<Self> {
        match value {
            ' ' => Some(Self::Empty),
            '#' => Some(Self::Wall),
            '.' => Some(Self::Dot),
            'o' => Some(Self::PowerPellet),
            '-' => Some(Self::GhostDoor),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Self::Empty => ' ',
            Self::Wall => '#',
            Self::Dot => '.',
            Self::PowerPellet => 'o',
            Self::GhostDoor => '-',
        }
    }
}

/// Walkability rules differ per actor; see [`crate::world::Grid::is_walkable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActorKind {
    Player,
    Ghost { exited: bool },
    Mushroom,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostPhase {
    WaitingInHouse,
    Exiting,
    Roaming,
    Eaten,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Idle,
    LevelBanner,
    Running,
    Paused,
    LifeLost,
    LevelComplete,
    GameOver,
    Prize,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameConfig {
    pub tile: f32,
    pub cols: i32,
    pub rows: i32,
    #[serde(rename = "totalLevels")]
    pub total_levels: usize,
    #[serde(rename = "startLives")]
    pub start_lives: u32,
    #[serde(rename = "tickMs")]
    pub tick_ms: u64,
    #[serde(rename = "frightenedDurationMs")]
    pub frightened_duration_ms: f32,
    #[serde(rename = "mushroomDurationMs")]
    pub mushroom_duration_ms: f32,
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub x: f32,
    pub y: f32,
    pub dir: Direction,
    #[serde(rename = "nextDir")]
    pub next_dir: Direction,
    #[serde(rename = "mouthOpen")]
    pub mouth_open: f32,
    #[serde(rename = "speedBoost")]
    pub speed_boost: bool,
    #[serde(rename = "mushroomPower")]
    pub mushroom_power: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct GhostView {
    pub index: usize,
    pub name: &'static str,
    pub x: f32,
    pub y: f32,
    pub dir: Direction,
    pub color: &'static str,
    pub phase: GhostPhase,
    pub frightened: bool,
    pub eaten: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct MushroomView {
    pub x: f32,
    pub y: f32,
    pub dir: Direction,
    #[serde(rename = "lifetimeMs")]
    pub lifetime_ms: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    RunStarted {
        name: String,
    },
    LevelBanner {
        level: usize,
    },
    LevelStarted {
        level: usize,
    },
    PowerPellet {
        x: i32,
        y: i32,
    },
    GhostEaten {
        index: usize,
        points: u32,
    },
    LifeLost {
        lives: u32,
    },
    LevelCleared {
        level: usize,
        bonus: u32,
    },
    MushroomSpawned {
        x: i32,
        y: i32,
    },
    MushroomCollected {
        points: u32,
    },
    MushroomExpired,
    GameOver {
        score: u32,
        level: usize,
    },
    Prize {
        score: u32,
        title: String,
    },
    Paused {
        paused: bool,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub phase: RunPhase,
    pub score: u32,
    pub lives: u32,
    pub level: usize,
    #[serde(rename = "dotsRemaining")]
    pub dots_remaining: u32,
    #[serde(rename = "frightenedMs")]
    pub frightened_ms: f32,
    pub tiles: Vec<String>,
    pub player: PlayerView,
    pub ghosts: Vec<GhostView>,
    pub mushroom: Option<MushroomView>,
    pub message: Option<String>,
    pub events: Vec<RuntimeEvent>,
}

#[derive(Clone, Debug, Serialize)]
pub struct RunSummary {
    pub phase: RunPhase,
    pub score: u32,
    #[serde(rename = "levelReached")]
    pub level_reached: usize,
    pub lives: u32,
    pub frames: u64,
    #[serde(rename = "ghostsEaten")]
    pub ghosts_eaten: u32,
    #[serde(rename = "livesLost")]
    pub lives_lost: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScoreSubmission {
    pub name: String,
    pub score: u64,
    pub level: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RankingEntry {
    pub name: String,
    pub score: u64,
    pub level: u32,
    pub date: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct RankingDiagnostics {
    pub status: &'static str,
    pub backend: &'static str,
    pub entries: usize,
    #[serde(rename = "latencyMs")]
    pub latency_ms: u64,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_an_involution() {
        for dir in Direction::CARDINALS {
            assert_eq!(dir.opposite().opposite(), dir);
            let (dx, dy) = dir.vector();
            let (ox, oy) = dir.opposite().vector();
            assert_eq!((dx + ox, dy + oy), (0, 0));
        }
        assert_eq!(Direction::None.opposite(), Direction::None);
    }

    #[test]
    fn cell_chars_round_trip_through_the_template_alphabet() {
        for ch in [' ', '#', '.', 'o', '-'] {
            let cell = Cell::from_char(ch).expect("known char");
            assert_eq!(cell.to_char(), ch);
        }
        assert_eq!(Cell::from_char('x'), None);
    }

    #[test]
    fn parse_move_rejects_unknown_values() {
        assert_eq!(Direction::parse_move("up"), Some(Direction::Up));
        assert_eq!(Direction::parse_move("none"), Some(Direction::None));
        assert_eq!(Direction::parse_move("UP"), None);
    }

    #[test]
    fn runtime_event_serializes_with_type_tag() {
        let value = serde_json::to_value(RuntimeEvent::GhostEaten {
            index: 2,
            points: 400,
        })
        .expect("serialize");
        assert_eq!(value["type"], "ghost_eaten");
        assert_eq!(value["points"], 400);
    }
}
