use serde::Serialize;

use crate::map::MazeMap;
use crate::player::Player;

/// Lecture des trois capteurs, relative au cap du robot.
///
/// `true` = obstacle détecté.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SensorReading {
    pub front: bool,
    pub left: bool,
    pub right: bool,
}

impl SensorReading {
    pub fn new(front: bool, left: bool, right: bool) -> Self {
        Self { front, left, right }
    }

    /// Construit une lecture depuis les entiers du protocole : `0` = libre,
    /// `1` = obstacle. Toute autre valeur rend `None`.
    pub fn from_flags(front: i64, left: i64, right: i64) -> Option<Self> {
        let flag = |v: i64| match v {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        };
        Some(Self::new(flag(front)?, flag(left)?, flag(right)?))
    }
}

/// Fusionne une lecture capteurs dans la carte, à la pose donnée.
///
/// Les murs détectés sont posés sur la cellule courante et, par symétrie, sur la
/// voisine. Une absence d'obstacle n'efface jamais un mur déjà connu.
///
/// Retourne le nombre de drapeaux nouvellement posés.
pub fn fuse_walls(map: &mut MazeMap, player: &Player, reading: SensorReading) -> usize {
    let Some(here) = player.cell_in(map) else {
        log::warn!("wall fusion skipped, pose {:?} is outside the grid", player);
        return 0;
    };

    let heading = player.direction;
    let detected = [
        (reading.front, heading),
        (reading.left, heading.turn_left()),
        (reading.right, heading.turn_right()),
    ];

    let mut added = 0;
    for (wall_detected, direction) in detected {
        if wall_detected && map.set_wall(here, direction) {
            added += 1;
        }
    }
    if added > 0 {
        log::debug!("{} new wall flag(s) around {:?}", added, here);
    }
    added
}
