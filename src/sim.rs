//! Robot simulé : un vrai labyrinthe (murs connus d'avance) et un firmware
//! qui parle le même protocole que l'ESP32.
//!
//! Le robot simulé mesure ses murs à la pose où il reçoit la commande, répond
//! `S f l r`, puis exécute le mouvement. Un `F` contre un mur ne bouge pas le
//! robot et produit une ligne de télémétrie `BUMP`.

use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::direction::Direction;
use crate::error::Result;
use crate::link::Link;
use crate::map::{Coord, MazeMap};
use crate::navigation::Command;
use crate::player::Player;
use crate::sensors::SensorReading;

pub const BOOT_BANNER: &str = "ESP32 MICROMOUSE READY";

/// Murs réels du labyrinthe. Le bord extérieur est toujours fermé.
#[derive(Debug, Clone)]
pub struct SimMaze {
    walls: MazeMap,
}

impl SimMaze {
    /// Labyrinthe sans murs intérieurs.
    pub fn open(rows: usize, cols: usize) -> Result<Self> {
        Ok(Self {
            walls: MazeMap::new(rows, cols)?,
        })
    }

    pub fn with_walls(rows: usize, cols: usize, walls: &[(Coord, Direction)]) -> Result<Self> {
        let mut maze = Self::open(rows, cols)?;
        for &(coord, direction) in walls {
            maze.walls.set_wall(coord, direction);
        }
        Ok(maze)
    }

    /// Labyrinthe parfait généré par parcours en profondeur aléatoire :
    /// chaque cellule est accessible depuis toutes les autres par un chemin unique.
    pub fn generate(rows: usize, cols: usize, seed: u64) -> Result<Self> {
        let mut walls = MazeMap::new(rows, cols)?;
        let mut rng = StdRng::seed_from_u64(seed);

        let mut passages = vec![[false; 4]; rows * cols];
        let mut visited = vec![false; rows * cols];
        let start = (rng.random_range(0..rows), rng.random_range(0..cols));
        let mut stack = vec![start];
        visited[start.0 * cols + start.1] = true;

        while let Some(&current) = stack.last() {
            let mut directions = Direction::ALL;
            directions.shuffle(&mut rng);
            let next = directions.into_iter().find_map(|d| {
                walls
                    .neighbor(current, d)
                    .filter(|&(r, c)| !visited[r * cols + c])
                    .map(|n| (d, n))
            });
            match next {
                Some((d, (r, c))) => {
                    passages[current.0 * cols + current.1][d.index()] = true;
                    passages[r * cols + c][d.opposite().index()] = true;
                    visited[r * cols + c] = true;
                    stack.push((r, c));
                }
                None => {
                    stack.pop();
                }
            }
        }

        for r in 0..rows {
            for c in 0..cols {
                for d in Direction::ALL {
                    if walls.neighbor((r, c), d).is_some() && !passages[r * cols + c][d.index()] {
                        walls.set_wall((r, c), d);
                    }
                }
            }
        }
        Ok(Self { walls })
    }

    pub fn rows(&self) -> usize {
        self.walls.rows()
    }

    pub fn cols(&self) -> usize {
        self.walls.cols()
    }

    /// Vrai s'il y a un mur (ou le bord) entre la cellule et sa voisine.
    pub fn is_blocked(&self, coord: Coord, direction: Direction) -> bool {
        self.walls.neighbor(coord, direction).is_none() || self.walls.has_wall(coord, direction)
    }

    /// Murs intérieurs, sans le bord.
    pub fn interior(&self) -> &MazeMap {
        &self.walls
    }

    /// Ce que les capteurs voient depuis la pose.
    pub fn sense(&self, pose: &Player) -> SensorReading {
        let Some(here) = pose.cell_in(&self.walls) else {
            return SensorReading::new(true, true, true);
        };
        let heading = pose.direction;
        SensorReading::new(
            self.is_blocked(here, heading),
            self.is_blocked(here, heading.turn_left()),
            self.is_blocked(here, heading.turn_right()),
        )
    }
}

/// Firmware simulé, utilisable directement comme `Link`.
pub struct SimulatedRobot {
    maze: SimMaze,
    pose: Player,
    outbox: VecDeque<String>,
    bumps: usize,
    noise: Option<(f64, StdRng)>,
}

impl SimulatedRobot {
    pub fn new(maze: SimMaze, pose: Player) -> Self {
        let mut outbox = VecDeque::new();
        outbox.push_back(BOOT_BANNER.to_string());
        Self {
            maze,
            pose,
            outbox,
            bumps: 0,
            noise: None,
        }
    }

    /// Ajoute des lignes de télémétrie parasites avec la probabilité `p` avant chaque réponse.
    pub fn with_noise(mut self, p: f64, seed: u64) -> Self {
        self.noise = Some((p.clamp(0.0, 1.0), StdRng::seed_from_u64(seed)));
        self
    }

    pub fn pose(&self) -> &Player {
        &self.pose
    }

    pub fn maze(&self) -> &SimMaze {
        &self.maze
    }

    pub fn bumps(&self) -> usize {
        self.bumps
    }

    /// Lignes en attente d'envoi (bannière au démarrage, réponses...).
    pub fn drain_output(&mut self) -> Vec<String> {
        self.outbox.drain(..).collect()
    }

    /// Traite une ligne reçue, comme la boucle `loop()` du firmware.
    pub fn handle_line(&mut self, line: &str) {
        let line = line.trim();
        let Some(first) = line.chars().next() else {
            return;
        };
        let command = match Command::from_char(first) {
            Some(Command::Halt) => {
                self.outbox.push_back("STOP".to_string());
                return;
            }
            Some(command) => command,
            None => {
                self.outbox.push_back(format!("ERR unknown command {:?}", first));
                return;
            }
        };

        if let Some((p, rng)) = self.noise.as_mut() {
            if rng.random_bool(*p) {
                let ticks: u32 = rng.random_range(0..10_000);
                self.outbox.push_back(format!("ENC {} {}", ticks, ticks + 3));
            }
        }

        let reading = self.maze.sense(&self.pose);
        self.outbox.push_back(format!(
            "S {} {} {}",
            reading.front as u8, reading.left as u8, reading.right as u8
        ));

        match command {
            Command::Forward => {
                let blocked = self
                    .pose
                    .cell_in(&self.maze.walls)
                    .map(|here| self.maze.is_blocked(here, self.pose.direction))
                    .unwrap_or(true);
                if blocked {
                    self.bumps += 1;
                    self.outbox.push_back("BUMP".to_string());
                } else {
                    self.pose.apply(command);
                }
            }
            other => self.pose.apply(other),
        }
    }
}

impl Link for SimulatedRobot {
    fn send_line(&mut self, line: &str) -> Result<()> {
        self.handle_line(line);
        Ok(())
    }

    fn recv_line(&mut self, _timeout: Duration) -> Result<Option<String>> {
        Ok(self.outbox.pop_front())
    }
}

/// Sert le robot simulé sur une connexion TCP jusqu'à sa fermeture.
pub fn serve_connection(robot: &mut SimulatedRobot, stream: TcpStream) -> Result<()> {
    let mut writer = stream.try_clone()?;
    let reader = BufReader::new(stream);

    for line in robot.drain_output() {
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;

    for line in reader.lines() {
        let line = line?;
        log::debug!("sim ← {}", line);
        robot.handle_line(&line);
        for out in robot.drain_output() {
            log::debug!("sim → {}", out);
            writeln!(writer, "{}", out)?;
        }
        writer.flush()?;
    }
    Ok(())
}
