//! # Export Module
//!
//! Offline dumps of captured content.
//!
//! - `MLExportRecord`: one flat record per stored item, for downstream
//!   consumers (serde, so the app can write JSON)
//! - Canonical export: header + sorted, bit-exact `postcard` stream, so two
//!   exports of the same content compare equal byte for byte
//!
//! The canonical stream is a verification artifact, not a persistence
//! format: the engine never reads it back into a live store.

use crate::primitives::{MAX_IMPORT_PAYLOAD_SIZE, MAX_IMPORT_RECORD_COUNT};
use crate::{KitbridgeError, Metadata, StoredContent};
use serde::{Deserialize, Serialize};

// =============================================================================
// ML EXPORT RECORD
// =============================================================================

/// Flat export of one stored item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MLExportRecord {
    pub id: u64,
    pub kit_id: String,
    pub output_type: String,
    /// Stable data type name (`markdown`, `search_result`, ...).
    pub data_type: String,
    pub content: String,
    pub metadata: Metadata,
    pub project_path: String,
    pub project_name: String,
    pub timestamp: u64,
}

impl From<&StoredContent> for MLExportRecord {
    fn from(stored: &StoredContent) -> Self {
        Self {
            id: stored.id.0,
            kit_id: stored.output.kit_id.as_str().to_string(),
            output_type: stored.output.output_type.clone(),
            data_type: stored.output.data_type.name().to_string(),
            content: stored.output.content.clone(),
            metadata: stored.output.metadata.clone(),
            project_path: stored.project_path.clone(),
            project_name: stored.project_name.clone(),
            timestamp: stored.output.timestamp,
        }
    }
}

// =============================================================================
// CANONICAL FORMAT
// =============================================================================

/// Magic bytes for canonical export format.
pub const CANONICAL_MAGIC: [u8; 4] = *b"KBEX"; // KitBridge Export

/// Current canonical format version.
pub const CANONICAL_VERSION: u8 = 1;

/// Header for canonical export streams.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanonicalHeader {
    /// Magic bytes to identify the format.
    pub magic: [u8; 4],

    /// Format version for compatibility.
    pub version: u8,

    /// Number of records in the export.
    pub record_count: u64,

    /// Checksum of the record section.
    pub checksum: u64,
}

impl CanonicalHeader {
    /// Create a new header.
    #[must_use]
    pub fn new(record_count: u64, checksum: u64) -> Self {
        Self {
            magic: CANONICAL_MAGIC,
            version: CANONICAL_VERSION,
            record_count,
            checksum,
        }
    }

    /// Validate the header.
    ///
    /// Error messages are generic; they do not describe the expected format.
    pub fn validate(&self) -> Result<(), KitbridgeError> {
        if self.magic != CANONICAL_MAGIC {
            return Err(KitbridgeError::DeserializationError(
                "Invalid file format".to_string(),
            ));
        }
        if self.version != CANONICAL_VERSION {
            return Err(KitbridgeError::DeserializationError(
                "Unsupported file version".to_string(),
            ));
        }
        if self.record_count > MAX_IMPORT_RECORD_COUNT {
            return Err(KitbridgeError::DeserializationError(
                "Record count exceeds limit".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CanonicalExport {
    header: CanonicalHeader,
    records: Vec<MLExportRecord>,
}

// =============================================================================
// CHECKSUM
// =============================================================================

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv_fold(mut hash: u64, bytes: &[u8]) -> u64 {
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    // Field separator so ("ab","c") and ("a","bc") differ
    hash ^= 0xff;
    hash.wrapping_mul(FNV_PRIME)
}

/// Deterministic checksum over records (FNV-1a over every field).
pub fn canonical_checksum(records: &[MLExportRecord]) -> u64 {
    records.iter().fold(FNV_OFFSET, |mut hash, r| {
        hash = fnv_fold(hash, &r.id.to_le_bytes());
        hash = fnv_fold(hash, r.kit_id.as_bytes());
        hash = fnv_fold(hash, r.output_type.as_bytes());
        hash = fnv_fold(hash, r.data_type.as_bytes());
        hash = fnv_fold(hash, r.content.as_bytes());
        for (key, value) in &r.metadata {
            hash = fnv_fold(hash, key.as_bytes());
            hash = fnv_fold(hash, value.as_bytes());
        }
        hash = fnv_fold(hash, r.project_path.as_bytes());
        hash = fnv_fold(hash, r.project_name.as_bytes());
        fnv_fold(hash, &r.timestamp.to_le_bytes())
    })
}

// =============================================================================
// EXPORT / IMPORT
// =============================================================================

/// Serialize records into the canonical stream (sorted by id).
pub fn export_canonical(records: &[MLExportRecord]) -> Result<Vec<u8>, KitbridgeError> {
    let mut sorted = records.to_vec();
    sorted.sort_by_key(|r| r.id);

    let header = CanonicalHeader::new(sorted.len() as u64, canonical_checksum(&sorted));
    let export = CanonicalExport {
        header,
        records: sorted,
    };

    postcard::to_stdvec(&export).map_err(|e| KitbridgeError::SerializationError(e.to_string()))
}

/// Read records back from a canonical stream, verifying header and checksum.
pub fn import_canonical(bytes: &[u8]) -> Result<Vec<MLExportRecord>, KitbridgeError> {
    if bytes.len() > MAX_IMPORT_PAYLOAD_SIZE {
        return Err(KitbridgeError::DeserializationError(
            "Payload exceeds size limit".to_string(),
        ));
    }

    let export: CanonicalExport = postcard::from_bytes(bytes)
        .map_err(|e| KitbridgeError::DeserializationError(e.to_string()))?;

    export.header.validate()?;

    if export.header.record_count != export.records.len() as u64 {
        return Err(KitbridgeError::DeserializationError(
            "Record count mismatch".to_string(),
        ));
    }
    if export.header.checksum != canonical_checksum(&export.records) {
        return Err(KitbridgeError::DeserializationError(
            "Checksum mismatch".to_string(),
        ));
    }

    Ok(export.records)
}

/// Check that a canonical stream is intact.
pub fn verify_canonical(bytes: &[u8]) -> bool {
    import_canonical(bytes).is_ok()
}

/// BLAKE3 hash (hex) of a canonical stream.
#[cfg(feature = "crypto-hash")]
pub fn canonical_hash(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

// =============================================================================
// TESTS
// =============================================================================
