//! Trames JSON préfixées par leur taille (u32 little-endian), pour pousser les
//! snapshots vers un visualiseur externe.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};
use std::net::TcpStream;

use crate::error::Result;
use crate::snapshot::MazeSnapshot;

/// Envoie un message au visualiseur
pub fn send_message<W: Write>(stream: &mut W, message: &str) -> io::Result<()> {
    let message_bytes = message.as_bytes();
    let size = u32::try_from(message_bytes.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "message too large"))?;
    stream.write_u32::<LittleEndian>(size)?;
    stream.write_all(message_bytes)?;
    stream.flush()
}

/// Reçoit un message
pub fn receive_message<R: Read>(stream: &mut R) -> io::Result<String> {
    let size = stream.read_u32::<LittleEndian>()?;
    let mut buffer = vec![0; size as usize];
    stream.read_exact(&mut buffer)?;
    String::from_utf8(buffer).map_err(|e| {
        io::Error::new(io::ErrorKind::InvalidData, format!("Invalid data: {}", e))
    })
}

/// Connecte le contrôleur au visualiseur
pub fn connect_to_viewer(address: &str) -> io::Result<TcpStream> {
    let stream = TcpStream::connect(address)?;
    log::info!("Publishing snapshots to {}", address);
    Ok(stream)
}

pub fn publish_snapshot<W: Write>(stream: &mut W, snapshot: &MazeSnapshot) -> Result<()> {
    let json = snapshot.to_json()?;
    send_message(stream, &json)?;
    Ok(())
}
