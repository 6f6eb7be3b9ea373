//! rkyv-based binary encoding of the vector file.

use rkyv::rancor::Error as RkyvError;
use rkyv::util::AlignedVec;
use rkyv::{from_bytes, to_bytes};

use crate::error::{RagError, Result};

/// On-disk layout of the vector file.
#[derive(Debug, PartialEq, rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)]
#[rkyv(derive(Debug))]
pub(crate) struct VectorFile {
    pub(crate) dimension: u64,
    pub(crate) data: Vec<f32>,
}

pub(crate) fn encode(file: &VectorFile) -> Result<Vec<u8>> {
    let bytes = to_bytes::<RkyvError>(file).map_err(|e| RagError::Serialization(e.to_string()))?;
    Ok(bytes.to_vec())
}

/// Validates and decodes the vector file. Any malformed input is reported as corruption.
pub(crate) fn decode(bytes: &[u8]) -> Result<VectorFile> {
    // Archived data must be aligned; a plain `Vec<u8>` from disk gives no such guarantee.
    let mut aligned = AlignedVec::<16>::with_capacity(bytes.len());
    aligned.extend_from_slice(bytes);
    from_bytes::<VectorFile, RkyvError>(&aligned)
        .map_err(|e| RagError::Corrupted(format!("vector file: {e}")))
}
