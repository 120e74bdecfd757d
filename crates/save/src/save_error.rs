// ---------------------------------------------------------------------------
// SaveError: everything that can go wrong between a snapshot and storage
// ---------------------------------------------------------------------------

use std::fmt;

#[derive(Debug)]
pub enum SaveError {
    /// Storage I/O failed (missing directory, permission denied, disk full).
    Io(std::io::Error),
    /// The snapshot could not be serialized.
    Encode(String),
    /// The bytes are not a snapshot this build understands.
    Decode(String),
    /// Snapshot or header written by a newer build.
    VersionMismatch { expected_max: u32, found: u32 },
    /// Header present but the payload is truncated or fails its checksum.
    Corrupt(String),
    /// Storage holds no snapshot yet.
    NoData,
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "I/O error: {e}"),
            SaveError::Encode(msg) => write!(f, "Encoding error: {msg}"),
            SaveError::Decode(msg) => write!(f, "Decoding error: {msg}"),
            SaveError::VersionMismatch {
                expected_max,
                found,
            } => write!(
                f,
                "Version mismatch: snapshot is v{found}, but this build only supports up to v{expected_max}"
            ),
            SaveError::Corrupt(msg) => write!(f, "Corrupt snapshot: {msg}"),
            SaveError::NoData => write!(f, "No snapshot available to load"),
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SaveError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<bitcode::Error> for SaveError {
    fn from(e: bitcode::Error) -> Self {
        SaveError::Decode(e.to_string())
    }
}
