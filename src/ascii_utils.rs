/*!
 * # Module de visualisation de la carte
 *
 * Rendu ASCII de la carte connue : murs, distances du flood fill et position
 * du robot. Utilisé pour les logs et l'option `--ascii` du contrôleur.
 *
 * Chaque cellule occupe 4 colonnes. Les distances sont tronquées à 3
 * caractères, `?` marque une cellule non atteinte.
 */

use crate::direction::Direction;
use crate::map::MazeMap;
use crate::player::Player;

/// Flèche représentant le cap du robot.
pub fn heading_glyph(direction: Direction) -> char {
    match direction {
        Direction::North => '^',
        Direction::East => '>',
        Direction::South => 'v',
        Direction::West => '<',
    }
}

/// Génère une représentation ASCII de la carte.
///
/// # Arguments
///
/// * `map` - La carte (murs + distances).
/// * `player` - Le robot, dessiné à la place de la distance de sa cellule.
/// * `goals` - Les cellules but, marquées `*`.
pub fn visualize_maze_ascii(map: &MazeMap, player: &Player, goals: &[(usize, usize)]) -> String {
    let mut out = String::new();

    for r in 0..map.rows() {
        // ligne des murs nord
        for c in 0..map.cols() {
            out.push('+');
            let wall = r == 0 || map.has_wall((r, c), Direction::North);
            out.push_str(if wall { "---" } else { "   " });
        }
        out.push_str("+\n");

        for c in 0..map.cols() {
            let wall = c == 0 || map.has_wall((r, c), Direction::West);
            out.push(if wall { '|' } else { ' ' });

            let label = if player.coord() == Some((r, c)) {
                format!(" {} ", heading_glyph(player.direction))
            } else if goals.contains(&(r, c)) {
                " * ".to_string()
            } else {
                match map.get_cell(r, c).and_then(|cell| cell.distance()) {
                    Some(d) if d < 1000 => format!("{:^3}", d),
                    Some(_) => "###".to_string(),
                    None => " ? ".to_string(),
                }
            };
            out.push_str(&label);
        }
        out.push_str("|\n");
    }

    for _ in 0..map.cols() {
        out.push_str("+---");
    }
    out.push_str("+\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flood_fill::recompute_distances;

    #[test]
    fn test_visualize_small_maze() {
        let mut map = MazeMap::new(2, 3).unwrap();
        map.set_wall((0, 0), Direction::East);
        map.set_wall((1, 1), Direction::North);
        recompute_distances(&mut map, &[(0, 2)]);
        let player = Player::new(1, 0, Direction::East);

        let expected = "\
+---+---+---+
| 4 | 1   * |
+   +---+   +
| >   2   1 |
+---+---+---+
";
        assert_eq!(visualize_maze_ascii(&map, &player, &[(0, 2)]), expected);
    }

    #[test]
    fn test_unreached_cells_are_marked() {
        let mut map = MazeMap::new(1, 2).unwrap();
        map.set_wall((0, 0), Direction::East);
        recompute_distances(&mut map, &[(0, 1)]);
        let player = Player::new(0, 1, Direction::North);
        assert_eq!(
            visualize_maze_ascii(&map, &player, &[(0, 1)]),
            "+---+---+\n| ? | ^ |\n+---+---+\n"
        );
    }
}
