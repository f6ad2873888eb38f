use crate::direction::Direction;
use crate::map::{Coord, MazeMap};
use crate::navigation::Command;

/// Représente la pose du robot (sa position et son orientation).
///
/// Les coordonnées sont signées : un `Forward` n'est jamais refusé ici, c'est
/// au moteur de décision d'avoir vérifié le déplacement avant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Player {
    pub row: i32,
    pub col: i32,
    pub direction: Direction,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            row: 0,
            col: 0,
            direction: Direction::North,
        }
    }
}

impl Player {
    pub fn new(row: i32, col: i32, direction: Direction) -> Self {
        Self {
            row,
            col,
            direction,
        }
    }

    /// Coordonnées non signées, `None` si l'une est négative.
    pub fn coord(&self) -> Option<Coord> {
        if self.row >= 0 && self.col >= 0 {
            Some((self.row as usize, self.col as usize))
        } else {
            None
        }
    }

    /// Cellule courante dans `map`, `None` si la pose est hors de la grille,
    /// quel que soit le bord franchi.
    pub fn cell_in(&self, map: &MazeMap) -> Option<Coord> {
        if map.in_bounds(self.row, self.col) {
            self.coord()
        } else {
            None
        }
    }

    pub fn turn_left(&mut self) {
        self.direction = self.direction.turn_left();
    }

    pub fn turn_right(&mut self) {
        self.direction = self.direction.turn_right();
    }

    pub fn turn_back(&mut self) {
        self.direction = self.direction.turn_back();
    }

    /// Avance d'une cellule dans la direction courante.
    pub fn step_forward(&mut self) {
        let (dr, dc) = self.direction.delta();
        self.row += dr;
        self.col += dc;
    }

    /// Met à jour la pose après une commande exécutée.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::TurnLeft => self.turn_left(),
            Command::TurnRight => self.turn_right(),
            Command::TurnAround => self.turn_back(),
            Command::Forward => self.step_forward(),
            Command::Halt => {}
        }
    }

    /// Version pure de `apply`.
    pub fn after(&self, command: Command) -> Player {
        let mut next = *self;
        next.apply(command);
        next
    }
}
