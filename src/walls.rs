use crate::direction::Direction;

/// Ensemble des 4 murs d'une cellule.
///
/// `true` = un mur a été détecté. Au début d'une époque tout est ouvert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Walls {
    pub north: bool,
    pub east: bool,
    pub south: bool,
    pub west: bool,
}

impl Walls {
    pub fn has(&self, direction: Direction) -> bool {
        match direction {
            Direction::North => self.north,
            Direction::East => self.east,
            Direction::South => self.south,
            Direction::West => self.west,
        }
    }

    /// Pose un mur. Il n'y a volontairement pas d'opération inverse :
    /// seul un reset de la carte efface les murs.
    pub fn set(&mut self, direction: Direction) {
        match direction {
            Direction::North => self.north = true,
            Direction::East => self.east = true,
            Direction::South => self.south = true,
            Direction::West => self.west = true,
        }
    }

    pub fn count(&self) -> usize {
        Direction::ALL.iter().filter(|&&d| self.has(d)).count()
    }
}
