use serde::{Serialize, Serializer};

use crate::cell::UNREACHED;
use crate::direction::Direction;
use crate::map::MazeMap;
use crate::player::Player;

/// Commande relative envoyée au robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Forward,
    TurnLeft,
    TurnRight,
    TurnAround,
    Halt,
}

impl Command {
    /// Caractère du protocole série (`X` pour Halt, jamais envoyé par défaut).
    pub fn as_char(self) -> char {
        match self {
            Command::Forward => 'F',
            Command::TurnLeft => 'L',
            Command::TurnRight => 'R',
            Command::TurnAround => 'B',
            Command::Halt => 'X',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'F' => Some(Command::Forward),
            'L' => Some(Command::TurnLeft),
            'R' => Some(Command::TurnRight),
            'B' => Some(Command::TurnAround),
            'X' => Some(Command::Halt),
            _ => None,
        }
    }

    /// Commande correspondant à un écart de cap `(nd - d) mod 4`.
    pub fn from_heading_delta(delta: usize) -> Self {
        match delta % 4 {
            0 => Command::Forward,
            1 => Command::TurnRight,
            2 => Command::TurnAround,
            _ => Command::TurnLeft,
        }
    }

    /// Coût de rotation : Forward < TurnLeft < TurnRight < TurnAround.
    pub fn turn_cost(self) -> u8 {
        match self {
            Command::Forward => 0,
            Command::TurnLeft => 1,
            Command::TurnRight => 2,
            Command::TurnAround => 3,
            Command::Halt => u8::MAX,
        }
    }
}

impl Serialize for Command {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(self.as_char())
    }
}

/// Pourquoi le moteur de décision s'arrête.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// La cellule courante est un but (distance 0).
    GoalReached,
    /// Aucun voisin accessible ne rapproche du but (enfermé ou but inaccessible).
    NoViableMove,
}

/// Choisit la prochaine commande à partir des distances et de la pose.
///
/// Les distances doivent avoir été recalculées juste avant. Fonction pure :
/// ne modifie ni la carte ni la pose.
///
/// Parmi les voisins sans mur, dans la grille et atteints par le flood fill,
/// on garde tous ceux à distance minimale puis on départage par coût de
/// rotation. Chaque direction candidate a un écart de cap distinct, donc le
/// départage est total ; à coût égal on garderait le plus petit index de direction.
///
/// Un voisin non atteint (`UNREACHED`) n'est jamais candidat, même quand aucun
/// autre voisin ne l'est : le robot s'arrête alors avec `NoViableMove` au lieu
/// de s'engager au hasard vers une zone coupée du but.
pub fn choose_next_move(map: &MazeMap, player: &Player) -> Command {
    let Some(here) = player.cell_in(map) else {
        return Command::Halt;
    };
    if map.distance(here) == 0 {
        return Command::Halt;
    }

    let mut best_dirs: Vec<Direction> = Vec::with_capacity(4);
    let mut best_dist = u32::MAX;

    for direction in Direction::ALL {
        if map.has_wall(here, direction) {
            continue;
        }
        let Some(next) = map.neighbor(here, direction) else {
            continue;
        };
        let dist = map.distance(next);
        if dist == UNREACHED {
            continue;
        }
        if dist < best_dist {
            best_dist = dist;
            best_dirs.clear();
            best_dirs.push(direction);
        } else if dist == best_dist {
            best_dirs.push(direction);
        }
    }

    best_dirs
        .into_iter()
        .map(|d| Command::from_heading_delta(player.direction.delta_to(d)))
        .min_by_key(|cmd| cmd.turn_cost())
        .unwrap_or(Command::Halt)
}

/// Distingue l'arrivée au but d'un blocage quand la décision est `Halt`.
pub fn halt_reason(map: &MazeMap, player: &Player) -> HaltReason {
    match player.cell_in(map) {
        Some(here) if map.distance(here) == 0 => HaltReason::GoalReached,
        _ => HaltReason::NoViableMove,
    }
}
