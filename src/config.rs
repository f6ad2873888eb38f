//! Configuration de rusty-mouse
//!
//! Chargée depuis un fichier TOML ; les valeurs par défaut correspondent au
//! déploiement de référence (grille 6x12, but en (0,11), départ en bas à gauche).

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::direction::Direction;
use crate::error::{MouseError, Result};
use crate::map::Coord;
use crate::player::Player;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MouseConfig {
    pub rows: usize,
    pub cols: usize,
    /// Cellules but, sources du flood fill
    pub goals: Vec<Coord>,
    pub start: StartConfig,
    /// Attente maximale d'une réponse `S f l r`
    pub reply_timeout_ms: u64,
    /// Caractère envoyé pour `Halt`, si le firmware en veut un
    pub halt_marker: Option<char>,
    /// Nombre de lignes gardées dans le journal en mémoire
    pub log_capacity: usize,
    pub serial: SerialConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct StartConfig {
    pub row: usize,
    pub col: usize,
    pub heading: Direction,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Chemin du port ; détection automatique si absent
    pub port: Option<String>,
    pub baud_rate: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: 115_200,
        }
    }
}

impl Default for MouseConfig {
    fn default() -> Self {
        Self {
            rows: 6,
            cols: 12,
            goals: vec![(0, 11)],
            start: StartConfig {
                row: 5,
                col: 0,
                heading: Direction::North,
            },
            reply_timeout_ms: 2000,
            halt_marker: None,
            log_capacity: 100,
            serial: SerialConfig::default(),
        }
    }
}

impl MouseConfig {
    /// Charge la configuration depuis un fichier TOML puis la valide.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: MouseConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Grille de `rows` x `cols` avec départ en bas à gauche face au nord.
    pub fn with_dimensions(rows: usize, cols: usize, goals: Vec<Coord>) -> Self {
        Self {
            rows,
            cols,
            goals,
            start: StartConfig {
                row: rows.saturating_sub(1),
                col: 0,
                heading: Direction::North,
            },
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(MouseError::Config(format!(
                "grid must have at least one cell, got {}x{}",
                self.rows, self.cols
            )));
        }
        if self.goals.is_empty() {
            return Err(MouseError::Config("at least one goal cell is required".into()));
        }
        if let Some(goal) = self.goals.iter().find(|g| !self.contains(**g)) {
            return Err(MouseError::Config(format!("goal {:?} is outside the grid", goal)));
        }
        if !self.contains((self.start.row, self.start.col)) {
            return Err(MouseError::Config(format!(
                "start ({}, {}) is outside the grid",
                self.start.row, self.start.col
            )));
        }
        if self.log_capacity == 0 {
            return Err(MouseError::Config("log_capacity must be positive".into()));
        }
        Ok(())
    }

    fn contains(&self, (row, col): Coord) -> bool {
        row < self.rows && col < self.cols
    }

    pub fn reply_timeout(&self) -> Duration {
        Duration::from_millis(self.reply_timeout_ms)
    }

    pub fn start_pose(&self) -> Player {
        Player::new(self.start.row as i32, self.start.col as i32, self.start.heading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_reference_deployment() {
        let config = MouseConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!((config.rows, config.cols), (6, 12));
        assert_eq!(config.goals, vec![(0, 11)]);
        assert_eq!(config.start_pose(), Player::new(5, 0, Direction::North));
        assert_eq!(config.reply_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = MouseConfig::from_toml(
            r#"
            rows = 8
            cols = 8
            goals = [[3, 3], [3, 4], [4, 3], [4, 4]]
            halt_marker = "X"

            [start]
            row = 7
            col = 0
            heading = "East"

            [serial]
            port = "/dev/ttyUSB0"
            "#,
        )
        .unwrap();
        assert_eq!(config.goals.len(), 4);
        assert_eq!(config.start.heading, Direction::East);
        assert_eq!(config.halt_marker, Some('X'));
        assert_eq!(config.serial.port.as_deref(), Some("/dev/ttyUSB0"));
        assert_eq!(config.serial.baud_rate, 115_200);
        assert_eq!(config.reply_timeout_ms, 2000);
    }

    #[test]
    fn test_validation_rejects_bad_layouts() {
        let mut config = MouseConfig::default();
        config.goals = vec![(6, 0)];
        assert!(matches!(config.validate(), Err(MouseError::Config(_))));

        let mut config = MouseConfig::default();
        config.goals.clear();
        assert!(config.validate().is_err());

        let mut config = MouseConfig::default();
        config.start.col = 12;
        assert!(config.validate().is_err());

        assert!(MouseConfig::from_toml("rows = 0").is_err());
        assert!(matches!(
            MouseConfig::from_toml("rows = \"six\""),
            Err(MouseError::ConfigParse(_))
        ));
    }
}
