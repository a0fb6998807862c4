// ---------------------------------------------------------------------------
// SaveData and the encode/decode pipeline
// ---------------------------------------------------------------------------

use std::collections::BTreeMap;

use bitcode::{Decode, Encode};
use simulation::snapshot::SessionSnapshot;

use crate::file_header::{self, UnwrapResult, FLAG_COMPRESSED};
use crate::save_error::SaveError;

/// Current save payload version.
/// v1 = snapshot (placed objects, committed totals, goal index) + extension map
pub const CURRENT_SAVE_VERSION: u32 = 1;

/// Everything that goes into a session file.
///
/// The snapshot is the structural core; the extension map carries one
/// bitcode blob per registered [`simulation::Saveable`] resource, so new
/// features persist without touching this struct.
#[derive(Debug, Encode, Decode)]
pub struct SaveData {
    pub version: u32,
    pub snapshot: SessionSnapshot,
    pub extensions: BTreeMap<String, Vec<u8>>,
}

/// Encode to file bytes: bitcode, LZ4 block compression, then the header.
pub fn encode_bytes(data: &SaveData) -> Vec<u8> {
    let encoded = bitcode::encode(data);
    let compressed = lz4_flex::block::compress(&encoded);
    file_header::wrap_with_header(&compressed, FLAG_COMPRESSED, encoded.len() as u32)
}

/// Decode file bytes produced by [`encode_bytes`]. Headerless buffers are
/// treated as raw uncompressed bitcode.
pub fn decode_bytes(bytes: &[u8]) -> Result<SaveData, SaveError> {
    let payload = match file_header::unwrap_header(bytes)? {
        UnwrapResult::WithHeader { header, payload } => {
            if header.is_compressed() {
                lz4_flex::block::decompress(payload, header.uncompressed_size as usize)
                    .map_err(|e| SaveError::Decompress(e.to_string()))?
            } else {
                payload.to_vec()
            }
        }
        UnwrapResult::Headerless(payload) => payload.to_vec(),
    };

    let data: SaveData = bitcode::decode(&payload)?;
    if data.version > CURRENT_SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected_max: CURRENT_SAVE_VERSION,
            found: data.version,
        });
    }
    Ok(data)
}
