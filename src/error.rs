//! Types d'erreur de rusty-mouse.
//!
//! Un timeout du protocole n'est PAS une erreur : il est rendu comme `Ok(None)`
//! par l'échange et le cycle continue sans fusion des murs.

pub type Result<T> = std::result::Result<T, MouseError>;

#[derive(Debug, thiserror::Error)]
pub enum MouseError {
    /// Erreur d'entrée/sortie sur le lien (TCP, fichier...)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Erreur du port série
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Le robot (ou le simulateur) a fermé le lien
    #[error("Link closed by peer")]
    LinkClosed,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration incohérente (grille vide, but hors grille...)
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Config file error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl MouseError {
    /// Vrai pour les pannes du lien (le cycle a été abandonné sans rien modifier).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            MouseError::Io(_) | MouseError::Serial(_) | MouseError::LinkClosed
        )
    }
}
