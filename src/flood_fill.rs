use std::collections::VecDeque;

use crate::direction::Direction;
use crate::map::{Coord, MazeMap};

/// Recalcule toutes les distances de la carte par un BFS multi-sources.
///
/// Chaque but part à 0 ; une arête est franchissable s'il n'y a pas de mur
/// du côté de la cellule courante. Les cellules séparées de tous les buts
/// gardent `UNREACHED`. Idempotent pour une même configuration de murs.
pub fn recompute_distances(map: &mut MazeMap, goals: &[Coord]) {
    map.clear_distances();

    let mut queue: VecDeque<Coord> = VecDeque::new();
    for &goal in goals {
        if map.get_cell(goal.0, goal.1).is_some() {
            map.set_distance(goal, 0);
            queue.push_back(goal);
        }
    }

    while let Some(current) = queue.pop_front() {
        let cd = map.distance(current);

        for direction in Direction::ALL {
            if map.has_wall(current, direction) {
                continue;
            }
            let Some(next) = map.neighbor(current, direction) else {
                continue;
            };
            if map.distance(next) > cd + 1 {
                map.set_distance(next, cd + 1);
                queue.push_back(next);
            }
        }
    }
}
