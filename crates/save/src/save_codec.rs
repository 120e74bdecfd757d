// ---------------------------------------------------------------------------
// Snapshot <-> bytes
// ---------------------------------------------------------------------------

use crate::file_header::{read_payload, wrap_with_header_compressed};
use crate::save_error::SaveError;
use crate::save_types::{SaveSnapshot, CURRENT_SAVE_VERSION};

/// Encodes with bitcode, compresses, and prepends the checksummed header.
/// The written version is always `CURRENT_SAVE_VERSION`.
pub fn encode_snapshot(snapshot: &SaveSnapshot) -> Vec<u8> {
    let mut stamped = snapshot.clone();
    stamped.version = CURRENT_SAVE_VERSION;
    wrap_with_header_compressed(&stamped.encode())
}

/// Decodes bytes produced by [`encode_snapshot`], or a headerless JSON
/// snapshot from older builds.
pub fn decode_snapshot(bytes: &[u8]) -> Result<SaveSnapshot, SaveError> {
    if bytes.is_empty() {
        return Err(SaveError::NoData);
    }

    let snapshot = match read_payload(bytes)? {
        Some(payload) => SaveSnapshot::decode(&payload)?,
        None => serde_json::from_slice::<SaveSnapshot>(bytes)
            .map_err(|e| SaveError::Decode(format!("legacy JSON snapshot: {e}")))?,
    };

    if snapshot.version > CURRENT_SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected_max: CURRENT_SAVE_VERSION,
            found: snapshot.version,
        });
    }
    Ok(snapshot)
}

/// Human-readable dump, readable back through [`decode_snapshot`].
pub fn export_json(snapshot: &SaveSnapshot) -> Result<String, SaveError> {
    serde_json::to_string_pretty(snapshot).map_err(|e| SaveError::Encode(e.to_string()))
}
