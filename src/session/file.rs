use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::info;

use super::Session;
use crate::ReplayError;

/// Reads a session document, in the same format the replay API serves it.
pub fn load_session_file(source_file: &Path) -> Result<Session, ReplayError> {
    let path = source_file.display().to_string();
    let file = File::open(source_file).map_err(|e| ReplayError::SessionFileIo {
        path: path.clone(),
        source: e,
    })?;

    let session: Session = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| ReplayError::SessionFileFormat { path, source: e })?;

    info!(
        "Loaded {:?}: {} with {} frames",
        source_file,
        session.session_info.event_name,
        session.frames.len()
    );
    Ok(session)
}

pub fn save_session_file(file: &Path, session: &Session) -> Result<(), ReplayError> {
    let path = file.display().to_string();
    let session_file = File::create(file).map_err(|e| ReplayError::SessionFileIo {
        path: path.clone(),
        source: e,
    })?;
    let mut session_file_writer = BufWriter::new(session_file);
    serde_json::to_writer(&mut session_file_writer, session).map_err(|e| {
        ReplayError::SessionFileFormat {
            path: path.clone(),
            source: e,
        }
    })?;
    session_file_writer
        .flush()
        .map_err(|e| ReplayError::SessionFileIo { path, source: e })?;
    info!("Saved session to {:?}", file);
    Ok(())
}
