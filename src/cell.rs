use crate::walls::Walls;

/// Distance "pas encore atteinte par le flood fill".
pub const UNREACHED: u32 = u32::MAX;

/// Représente une cellule du labyrinthe.
///
/// Une cellule possède une configuration de murs et sa distance au but le plus proche.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Les murs délimitant la cellule.
    pub walls: Walls,
    /// Nombre de pas jusqu'au but, ou `UNREACHED`.
    pub dist: u32,
}

impl Cell {
    /// Crée une nouvelle instance de `Cell`.
    ///
    /// Initialise les murs à ouvert et la distance à `UNREACHED`.
    pub fn new() -> Self {
        Self {
            walls: Walls::default(),
            dist: UNREACHED,
        }
    }

    pub fn is_reached(&self) -> bool {
        self.dist != UNREACHED
    }

    pub fn distance(&self) -> Option<u32> {
        self.is_reached().then_some(self.dist)
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::new()
    }
}
