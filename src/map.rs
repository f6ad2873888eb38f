use crate::cell::Cell;
use crate::direction::Direction;
use crate::error::{MouseError, Result};

/// Coordonnées (ligne, colonne) d'une cellule dans la grille.
pub type Coord = (usize, usize);

/// Carte du labyrinthe : grille fixe `rows x cols`, stockée ligne par ligne.
///
/// Invariant : les murs sont symétriques. Tout mur posé via `set_wall` l'est aussi
/// du côté de la cellule voisine quand elle existe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MazeMap {
    rows: usize,
    cols: usize,
    grid: Vec<Cell>,
}

impl MazeMap {
    /// Crée une carte vide (aucun mur connu, aucune distance).
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(MouseError::Config(format!(
                "grid must have at least one cell, got {}x{}",
                rows, cols
            )));
        }
        Ok(Self {
            rows,
            cols,
            grid: vec![Cell::new(); rows * cols],
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn in_bounds(&self, row: i32, col: i32) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.rows && (col as usize) < self.cols
    }

    /// Récupère une cellule en lecture seule.
    pub fn get_cell(&self, row: usize, col: usize) -> Option<&Cell> {
        if row < self.rows && col < self.cols {
            self.grid.get(row * self.cols + col)
        } else {
            None
        }
    }

    pub(crate) fn get_cell_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        if row < self.rows && col < self.cols {
            self.grid.get_mut(row * self.cols + col)
        } else {
            None
        }
    }

    /// Voisine dans `direction`, si elle est dans la grille.
    pub fn neighbor(&self, (row, col): Coord, direction: Direction) -> Option<Coord> {
        let (dr, dc) = direction.delta();
        let (nr, nc) = (row as i32 + dr, col as i32 + dc);
        if self.in_bounds(nr, nc) {
            Some((nr as usize, nc as usize))
        } else {
            None
        }
    }

    pub fn has_wall(&self, (row, col): Coord, direction: Direction) -> bool {
        self.get_cell(row, col)
            .map(|cell| cell.walls.has(direction))
            .unwrap_or(false)
    }

    /// Pose un mur sur la cellule et son symétrique sur la voisine.
    ///
    /// Retourne `true` si au moins un drapeau a changé.
    pub fn set_wall(&mut self, coord: Coord, direction: Direction) -> bool {
        let mut changed = false;
        if let Some(cell) = self.get_cell_mut(coord.0, coord.1) {
            changed |= !cell.walls.has(direction);
            cell.walls.set(direction);
        } else {
            return false;
        }
        if let Some((nr, nc)) = self.neighbor(coord, direction) {
            if let Some(other) = self.get_cell_mut(nr, nc) {
                let opposite = direction.opposite();
                changed |= !other.walls.has(opposite);
                other.walls.set(opposite);
            }
        }
        changed
    }

    /// Distance de la cellule, `UNREACHED` hors grille.
    pub fn distance(&self, (row, col): Coord) -> u32 {
        self.get_cell(row, col)
            .map(|cell| cell.dist)
            .unwrap_or(crate::cell::UNREACHED)
    }

    pub(crate) fn set_distance(&mut self, (row, col): Coord, dist: u32) {
        if let Some(cell) = self.get_cell_mut(row, col) {
            cell.dist = dist;
        }
    }

    pub(crate) fn clear_distances(&mut self) {
        for cell in self.grid.iter_mut() {
            cell.dist = crate::cell::UNREACHED;
        }
    }

    /// Remet toutes les cellules à zéro (nouvelle époque).
    pub fn reset(&mut self) {
        for cell in self.grid.iter_mut() {
            *cell = Cell::new();
        }
    }

    /// Parcourt les cellules ligne par ligne.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &Cell)> + '_ {
        let cols = self.cols;
        self.grid
            .iter()
            .enumerate()
            .map(move |(i, cell)| ((i / cols, i % cols), cell))
    }

    /// Vérifie l'invariant de symétrie sur toute la grille.
    pub fn walls_are_symmetric(&self) -> bool {
        self.iter().all(|(coord, cell)| {
            Direction::ALL.iter().all(|&d| match self.neighbor(coord, d) {
                Some(n) => cell.walls.has(d) == self.has_wall(n, d.opposite()),
                None => true,
            })
        })
    }

    pub fn wall_count(&self) -> usize {
        self.grid.iter().map(|cell| cell.walls.count()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty_grid() {
        assert!(MazeMap::new(0, 4).is_err());
        assert!(MazeMap::new(4, 0).is_err());
    }

    #[test]
    fn test_neighbor_respects_bounds() {
        let map = MazeMap::new(6, 12).unwrap();
        assert_eq!(map.neighbor((5, 0), Direction::North), Some((4, 0)));
        assert_eq!(map.neighbor((5, 0), Direction::South), None);
        assert_eq!(map.neighbor((5, 0), Direction::West), None);
        assert_eq!(map.neighbor((0, 11), Direction::East), None);
        assert_eq!(map.neighbor((0, 10), Direction::East), Some((0, 11)));
    }

    #[test]
    fn test_set_wall_is_symmetric() {
        let mut map = MazeMap::new(3, 3).unwrap();
        assert!(map.set_wall((1, 1), Direction::East));
        assert!(map.has_wall((1, 1), Direction::East));
        assert!(map.has_wall((1, 2), Direction::West));
        assert!(!map.set_wall((1, 2), Direction::West));
        assert!(map.walls_are_symmetric());
    }

    #[test]
    fn test_border_wall_has_no_mirror() {
        let mut map = MazeMap::new(2, 2).unwrap();
        map.set_wall((0, 0), Direction::North);
        assert!(map.has_wall((0, 0), Direction::North));
        assert_eq!(map.wall_count(), 1);
        assert!(map.walls_are_symmetric());
    }

    #[test]
    fn test_reset_clears_walls_and_distances() {
        let mut map = MazeMap::new(2, 2).unwrap();
        map.set_wall((0, 0), Direction::East);
        map.set_distance((1, 1), 3);
        map.reset();
        assert_eq!(map.wall_count(), 0);
        assert!(map.iter().all(|(_, cell)| !cell.is_reached()));
    }
}
