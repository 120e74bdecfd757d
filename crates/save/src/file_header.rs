// ---------------------------------------------------------------------------
// file_header – Snapshot framing: magic bytes, version, flags, checksum
// ---------------------------------------------------------------------------
//
// Header format (20 bytes, fixed-size, little-endian):
//   [0..4]   Magic bytes: "TRVP"
//   [4..8]   Header format version (u32)
//   [8..12]  Flags (u32: bit 0 = payload is LZ4-compressed)
//   [12..16] Uncompressed payload size (u32)
//   [16..20] xxHash32 of the payload as stored (after compression)
//
// Anything that does not start with the magic is handed back as `Legacy` so
// the codec can try the older headerless formats.

use xxhash_rust::xxh32::xxh32;

use crate::save_error::SaveError;

pub const MAGIC: [u8; 4] = *b"TRVP";

pub const HEADER_SIZE: usize = 20;

/// Layout version of the header itself, independent of the snapshot schema.
pub const HEADER_FORMAT_VERSION: u32 = 1;

pub const FLAG_COMPRESSED: u32 = 1;

const XXHASH_SEED: u32 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub format_version: u32,
    pub flags: u32,
    pub uncompressed_size: u32,
    pub checksum: u32,
}

impl FileHeader {
    pub fn is_compressed(&self) -> bool {
        self.flags & FLAG_COMPRESSED != 0
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&self.format_version.to_le_bytes());
        out.extend_from_slice(&self.flags.to_le_bytes());
        out.extend_from_slice(&self.uncompressed_size.to_le_bytes());
        out.extend_from_slice(&self.checksum.to_le_bytes());
    }
}

fn frame(stored: &[u8], flags: u32, uncompressed_size: usize) -> Vec<u8> {
    let header = FileHeader {
        format_version: HEADER_FORMAT_VERSION,
        flags,
        uncompressed_size: uncompressed_size as u32,
        checksum: xxh32(stored, XXHASH_SEED),
    };
    let mut out = Vec::with_capacity(HEADER_SIZE + stored.len());
    header.write_to(&mut out);
    out.extend_from_slice(stored);
    out
}

/// `[header] ++ data`, uncompressed.
pub fn wrap_with_header(data: &[u8]) -> Vec<u8> {
    frame(data, 0, data.len())
}

/// `[header] ++ lz4(data)`. The checksum covers the compressed bytes.
pub fn wrap_with_header_compressed(data: &[u8]) -> Vec<u8> {
    let compressed = lz4_flex::compress_prepend_size(data);
    frame(&compressed, FLAG_COMPRESSED, data.len())
}

pub enum UnwrapResult<'a> {
    WithHeader {
        header: FileHeader,
        payload: &'a [u8],
    },
    /// No magic bytes: the whole buffer is a headerless payload.
    Legacy(&'a [u8]),
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Parses and validates the header.
///
/// # Errors
///
/// - `Corrupt` when the magic is present but the buffer is shorter than a
///   header, or the payload fails its checksum
/// - `VersionMismatch` when the header layout comes from a newer build
pub fn unwrap_header(bytes: &[u8]) -> Result<UnwrapResult<'_>, SaveError> {
    if bytes.len() < MAGIC.len() || bytes[..MAGIC.len()] != MAGIC {
        return Ok(UnwrapResult::Legacy(bytes));
    }
    if bytes.len() < HEADER_SIZE {
        return Err(SaveError::Corrupt(format!(
            "header truncated ({} bytes, need {HEADER_SIZE})",
            bytes.len()
        )));
    }

    let header = FileHeader {
        format_version: read_u32(bytes, 4),
        flags: read_u32(bytes, 8),
        uncompressed_size: read_u32(bytes, 12),
        checksum: read_u32(bytes, 16),
    };

    if header.format_version > HEADER_FORMAT_VERSION {
        return Err(SaveError::VersionMismatch {
            expected_max: HEADER_FORMAT_VERSION,
            found: header.format_version,
        });
    }

    let payload = &bytes[HEADER_SIZE..];
    let computed = xxh32(payload, XXHASH_SEED);
    if computed != header.checksum {
        return Err(SaveError::Corrupt(format!(
            "checksum mismatch (expected {:#010X}, got {computed:#010X})",
            header.checksum
        )));
    }

    Ok(UnwrapResult::WithHeader { header, payload })
}

pub fn decompress_payload(payload: &[u8]) -> Result<Vec<u8>, SaveError> {
    lz4_flex::decompress_size_prepended(payload)
        .map_err(|e| SaveError::Corrupt(format!("LZ4 decompression failed: {e}")))
}

/// Unwraps the header and undoes compression, yielding the encoded snapshot.
/// `Ok(None)` means there was no header.
pub fn read_payload(bytes: &[u8]) -> Result<Option<Vec<u8>>, SaveError> {
    match unwrap_header(bytes)? {
        UnwrapResult::Legacy(_) => Ok(None),
        UnwrapResult::WithHeader { header, payload } => {
            let data = if header.is_compressed() {
                decompress_payload(payload)?
            } else {
                payload.to_vec()
            };
            if data.len() != header.uncompressed_size as usize {
                return Err(SaveError::Corrupt(format!(
                    "payload is {} bytes, header says {}",
                    data.len(),
                    header.uncompressed_size
                )));
            }
            Ok(Some(data))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_and_unwrap() {
        let data = b"vehicle snapshot bytes";
        let wrapped = wrap_with_header(data);
        assert_eq!(&wrapped[..4], &MAGIC);
        assert_eq!(wrapped.len(), HEADER_SIZE + data.len());

        match unwrap_header(&wrapped).expect("unwrap should succeed") {
            UnwrapResult::WithHeader { header, payload } => {
                assert_eq!(header.format_version, HEADER_FORMAT_VERSION);
                assert!(!header.is_compressed());
                assert_eq!(header.uncompressed_size, data.len() as u32);
                assert_eq!(payload, data);
            }
            UnwrapResult::Legacy(_) => panic!("expected WithHeader, got Legacy"),
        }
    }

    #[test]
    fn test_compressed_payload() {
        let data = vec![7u8; 4096];
        let wrapped = wrap_with_header_compressed(&data);
        assert!(wrapped.len() < data.len());
        match unwrap_header(&wrapped).expect("unwrap should succeed") {
            UnwrapResult::WithHeader { header, payload } => {
                assert!(header.is_compressed());
                assert_eq!(header.flags & FLAG_COMPRESSED, FLAG_COMPRESSED);
                assert_ne!(payload, data.as_slice());
            }
            UnwrapResult::Legacy(_) => panic!("expected WithHeader, got Legacy"),
        }
        assert_eq!(read_payload(&wrapped).unwrap(), Some(data));
    }

    #[test]
    fn test_legacy_detection() {
        let json = br#"{"vehicles":[]}"#;
        assert!(matches!(
            unwrap_header(json).unwrap(),
            UnwrapResult::Legacy(_)
        ));
        assert!(matches!(unwrap_header(b"TR").unwrap(), UnwrapResult::Legacy(_)));
        assert_eq!(read_payload(json).unwrap(), None);
    }

    #[test]
    fn test_truncated_header_is_corrupt() {
        let wrapped = wrap_with_header(b"abc");
        let err = unwrap_header(&wrapped[..10]).err().expect("should fail");
        assert!(matches!(err, SaveError::Corrupt(_)), "got {err:?}");
    }

    #[test]
    fn test_flipped_byte_fails_checksum() {
        let mut wrapped = wrap_with_header(b"some payload here");
        let last = wrapped.len() - 1;
        wrapped[last] ^= 0xFF;
        let err = unwrap_header(&wrapped).err().expect("should fail");
        assert!(format!("{err}").contains("checksum"), "got {err}");
    }

    #[test]
    fn test_newer_header_version_rejected() {
        let mut wrapped = wrap_with_header(b"x");
        wrapped[4..8].copy_from_slice(&(HEADER_FORMAT_VERSION + 1).to_le_bytes());
        let err = unwrap_header(&wrapped).err().expect("should fail");
        assert!(matches!(
            err,
            SaveError::VersionMismatch {
                expected_max: HEADER_FORMAT_VERSION,
                ..
            }
        ));
    }

    #[test]
    fn test_size_mismatch_is_corrupt() {
        let mut wrapped = wrap_with_header(b"four");
        wrapped[12..16].copy_from_slice(&99u32.to_le_bytes());
        assert!(matches!(
            read_payload(&wrapped),
            Err(SaveError::Corrupt(_))
        ));
    }
}
