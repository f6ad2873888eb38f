use serde::Serialize;

use crate::direction::Direction;
use crate::map::MazeMap;
use crate::navigation::Command;
use crate::player::Player;
use crate::sensors::SensorReading;

/// Nombre de lignes de journal exposées dans un snapshot.
pub const SNAPSHOT_LOG_TAIL: usize = 20;

/// Vue de l'état du contrôleur pour les couches de présentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MazeSnapshot {
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<Vec<CellSnapshot>>,
    pub goal_cells: Vec<GoalSnapshot>,
    pub robot: RobotSnapshot,
    pub last_cmd: Option<Command>,
    pub last_sensors: SensorsSnapshot,
    pub logs: Vec<String>,
    pub at_goal: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellSnapshot {
    /// `None` (null) quand la cellule n'est pas atteinte
    pub dist: Option<u32>,
    pub walls: WallsSnapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(non_snake_case)]
pub struct WallsSnapshot {
    pub N: bool,
    pub E: bool,
    pub S: bool,
    pub W: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GoalSnapshot {
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RobotSnapshot {
    pub row: i32,
    pub col: i32,
    /// 0=N, 1=E, 2=S, 3=W
    pub dir: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SensorsSnapshot {
    pub front: Option<bool>,
    pub left: Option<bool>,
    pub right: Option<bool>,
}

impl From<Option<SensorReading>> for SensorsSnapshot {
    fn from(reading: Option<SensorReading>) -> Self {
        match reading {
            Some(r) => Self {
                front: Some(r.front),
                left: Some(r.left),
                right: Some(r.right),
            },
            None => Self::default(),
        }
    }
}

impl MazeSnapshot {
    pub fn capture(
        map: &MazeMap,
        goals: &[(usize, usize)],
        player: &Player,
        last_cmd: Option<Command>,
        last_sensors: Option<SensorReading>,
        logs: &[String],
    ) -> Self {
        let cells = (0..map.rows())
            .map(|r| {
                (0..map.cols())
                    .filter_map(|c| map.get_cell(r, c))
                    .map(|cell| CellSnapshot {
                        dist: cell.distance(),
                        walls: WallsSnapshot {
                            N: cell.walls.has(Direction::North),
                            E: cell.walls.has(Direction::East),
                            S: cell.walls.has(Direction::South),
                            W: cell.walls.has(Direction::West),
                        },
                    })
                    .collect()
            })
            .collect();

        let tail_start = logs.len().saturating_sub(SNAPSHOT_LOG_TAIL);
        let at_goal = player
            .coord()
            .map(|here| goals.contains(&here))
            .unwrap_or(false);

        Self {
            rows: map.rows(),
            cols: map.cols(),
            cells,
            goal_cells: goals
                .iter()
                .map(|&(row, col)| GoalSnapshot { row, col })
                .collect(),
            robot: RobotSnapshot {
                row: player.row,
                col: player.col,
                dir: player.direction.index(),
            },
            last_cmd,
            last_sensors: last_sensors.into(),
            logs: logs[tail_start..].to_vec(),
            at_goal,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
