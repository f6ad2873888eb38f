//! rusty-mouse : cartographie d'un labyrinthe de micromouse par flood fill, et
//! pilotage du robot par lien série.
//!
//! Un cycle de contrôle enchaîne, dans cet ordre et sans chevauchement :
//! flood fill → décision → envoi de la commande et attente des capteurs →
//! fusion des murs → mise à jour de la pose.

pub mod ascii_utils;
pub mod cell;
pub mod config;
pub mod controller;
pub mod direction;
pub mod error;
pub mod flood_fill;
pub mod link;
pub mod map;
pub mod navigation;
pub mod network;
pub mod player;
pub mod protocol;
pub mod sensors;
pub mod sim;
pub mod snapshot;
pub mod walls;

pub use config::MouseConfig;
pub use controller::{CycleOutcome, MouseController, RunSummary};
pub use direction::Direction;
pub use error::{MouseError, Result};
pub use map::{Coord, MazeMap};
pub use navigation::{Command, HaltReason};
pub use player::Player;
pub use sensors::SensorReading;

/// Adresse par défaut du simulateur `mouse-sim`.
pub const SIM_ADDRESS: &str = "localhost:8778";
