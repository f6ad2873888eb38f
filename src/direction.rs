use serde::{Deserialize, Serialize};

/// Orientation absolue dans le labyrinthe.
///
/// L'encodage numérique (0..=3) est celui du protocole et du snapshot :
/// North=0, East=1, South=2, West=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        }
    }

    /// Index modulo 4, donc toujours une direction valide.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 4]
    }

    /// Tourne à gauche (par ex. North -> West)
    pub fn turn_left(self) -> Self {
        Self::from_index(self.index() + 3)
    }

    /// Tourne à droite (par ex. North -> East)
    pub fn turn_right(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// Fait demi tour (par ex. North -> South )
    pub fn turn_back(self) -> Self {
        Self::from_index(self.index() + 2)
    }

    pub fn opposite(self) -> Self {
        self.turn_back()
    }

    /// Vecteur (ligne, colonne) d'un pas dans cette direction.
    /// La ligne 0 est tout au nord.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (-1, 0),
            Direction::East => (0, 1),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
        }
    }

    /// Écart de cap signé `(target - self) mod 4`.
    ///
    /// 0 = devant, 1 = à droite, 2 = derrière, 3 = à gauche.
    pub fn delta_to(self, target: Direction) -> usize {
        (target.index() + 4 - self.index()) % 4
    }

    /// Lettre utilisée dans les snapshots et le rendu ASCII.
    pub fn label(self) -> &'static str {
        match self {
            Direction::North => "N",
            Direction::East => "E",
            Direction::South => "S",
            Direction::West => "W",
        }
    }
}
