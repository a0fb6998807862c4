// ---------------------------------------------------------------------------
// file_header – Session file header with magic bytes, version, and checksum
// ---------------------------------------------------------------------------
//
// Header format (28 bytes, fixed-size, little-endian):
//   [0..4]   Magic bytes: "HVN1" (0x48564E31)
//   [4..8]   Header format version (u32)
//   [8..12]  Flags (u32: bit 0 = LZ4-compressed payload)
//   [12..20] Timestamp (Unix epoch, u64)
//   [20..24] Uncompressed data size (u32)
//   [24..28] xxHash32 checksum of the payload (everything after the header)
//
// On save: encode SaveData -> compress -> prepend header (checksum over the
// stored payload). On load: check magic -> validate checksum -> strip header
// -> decompress if flagged -> decode. A buffer without the magic bytes is
// treated as a raw headerless bitcode payload.

use xxhash_rust::xxh32::xxh32;

use crate::save_error::SaveError;

/// Magic bytes identifying a Haven session file.
pub const MAGIC: [u8; 4] = [0x48, 0x56, 0x4E, 0x31]; // "HVN1"

/// Size of the file header in bytes.
pub const HEADER_SIZE: usize = 28;

/// Current header layout version. Distinct from the SaveData version,
/// which tracks schema changes; this one tracks the header itself.
pub const HEADER_FORMAT_VERSION: u32 = 1;

/// Payload is LZ4 block-compressed.
pub const FLAG_COMPRESSED: u32 = 1 << 0;

/// Seed for the xxHash32 checksum.
const XXHASH_SEED: u32 = 0;

/// Parsed file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub format_version: u32,
    pub flags: u32,
    pub timestamp: u64,
    pub uncompressed_size: u32,
    pub checksum: u32,
}

impl FileHeader {
    /// Header for a stored payload whose pre-compression length was
    /// `uncompressed_size`.
    pub fn new(payload: &[u8], flags: u32, uncompressed_size: u32) -> Self {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            format_version: HEADER_FORMAT_VERSION,
            flags,
            timestamp,
            uncompressed_size,
            checksum: xxh32(payload, XXHASH_SEED),
        }
    }

    pub fn is_compressed(&self) -> bool {
        self.flags & FLAG_COMPRESSED != 0
    }
}

/// Prepend a header to a stored payload.
///
/// Returns bytes: [header (28 bytes)] ++ [payload].
pub fn wrap_with_header(payload: &[u8], flags: u32, uncompressed_size: u32) -> Vec<u8> {
    let header = FileHeader::new(payload, flags, uncompressed_size);
    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());

    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&header.format_version.to_le_bytes());
    out.extend_from_slice(&header.flags.to_le_bytes());
    out.extend_from_slice(&header.timestamp.to_le_bytes());
    out.extend_from_slice(&header.uncompressed_size.to_le_bytes());
    out.extend_from_slice(&header.checksum.to_le_bytes());

    out.extend_from_slice(payload);
    out
}

/// Result of unwrapping a session file's bytes.
#[derive(Debug)]
pub enum UnwrapResult<'a> {
    /// File has a valid header; the stored payload follows.
    WithHeader {
        header: FileHeader,
        payload: &'a [u8],
    },
    /// File has no header; the entire buffer is a raw bitcode payload.
    Headerless(&'a [u8]),
}

/// Parse and validate the file header from raw bytes.
///
/// # Errors
///
/// Returns an error if the magic bytes are present but the file is too
/// short, the header version is from a newer build, or the checksum does
/// not match the stored payload.
pub fn unwrap_header(bytes: &[u8]) -> Result<UnwrapResult<'_>, SaveError> {
    if bytes.len() < 4 || bytes[..4] != MAGIC {
        return Ok(UnwrapResult::Headerless(bytes));
    }

    if bytes.len() < HEADER_SIZE {
        return Err(SaveError::Header(format!(
            "file has HVN1 magic bytes but is too short ({} bytes, need at least {} for a header)",
            bytes.len(),
            HEADER_SIZE
        )));
    }

    let format_version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    let flags = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
    let timestamp = u64::from_le_bytes([
        bytes[12], bytes[13], bytes[14], bytes[15], bytes[16], bytes[17], bytes[18], bytes[19],
    ]);
    let uncompressed_size = u32::from_le_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
    let checksum = u32::from_le_bytes([bytes[24], bytes[25], bytes[26], bytes[27]]);

    if format_version > HEADER_FORMAT_VERSION {
        return Err(SaveError::Header(format!(
            "file uses header format version {format_version}, but this build only supports up \
             to version {HEADER_FORMAT_VERSION}"
        )));
    }

    let payload = &bytes[HEADER_SIZE..];

    let computed = xxh32(payload, XXHASH_SEED);
    if computed != checksum {
        return Err(SaveError::Header(format!(
            "checksum mismatch (expected {checksum:#010X}, got {computed:#010X}); the file may \
             have been modified or damaged"
        )));
    }

    Ok(UnwrapResult::WithHeader {
        header: FileHeader {
            format_version,
            flags,
            timestamp,
            uncompressed_size,
            checksum,
        },
        payload,
    })
}
