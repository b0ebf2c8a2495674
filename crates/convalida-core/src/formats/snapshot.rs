//! # Snapshot Format
//!
//! JSON transport record for the full editable state:
//!
//! ```json
//! {
//!   "planOrigen":  { "id": "...", "nombre": "...", "malla": [ ... ] },
//!   "planDestino": { "id": "...", "nombre": "...", "malla": [ ... ] },
//!   "reglas":      [ { "id": "R1", "tipo": "1:1", "origen": [...], "destino": [...] } ],
//!   "aprobados":   [ "CAL-103" ]
//! }
//! ```
//!
//! Export always writes all four fields. On import each field is optional
//! and an absent (or `null`) field leaves the current value untouched.
//!
//! Import performs no validation beyond the syntactic parse. The top-level
//! value must be a JSON object; arrays are not decoded positionally. Every
//! parse failure maps to the single [`ConvalidaError::InvalidSnapshotFormat`].
//! The payload size is checked before parsing.

use crate::primitives::MAX_SNAPSHOT_SIZE;
use crate::{ConvalidaError, CourseCode, Curriculum, CurriculumStore, Rule};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Built-in ICOC 2016 → ICOC 2026 sample data.
const SAMPLE_SNAPSHOT: &str = include_str!("../../data/icoc_sample.json");

// =============================================================================
// FULL SNAPSHOT (export side)
// =============================================================================

/// The complete editable state at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Origin curriculum.
    pub plan_origen: Curriculum,
    /// Destination curriculum.
    pub plan_destino: Curriculum,
    /// Rule set in declaration order.
    pub reglas: Vec<Rule>,
    /// Completed origin codes, sorted.
    pub aprobados: Vec<CourseCode>,
}

impl Snapshot {
    /// Capture a store and completion set.
    #[must_use]
    pub fn capture(store: &CurriculumStore, completed: &BTreeSet<CourseCode>) -> Self {
        Self {
            plan_origen: store.origin().clone(),
            plan_destino: store.destination().clone(),
            reglas: store.rules().to_vec(),
            aprobados: completed.iter().cloned().collect(),
        }
    }

    /// Split into a store and a completion set.
    #[must_use]
    pub fn into_parts(self) -> (CurriculumStore, BTreeSet<CourseCode>) {
        let store = CurriculumStore::new(self.plan_origen, self.plan_destino, self.reglas);
        (store, self.aprobados.into_iter().collect())
    }

    /// The built-in ICOC sample (two curricula, 30 rules, nothing completed).
    pub fn sample() -> Result<Self, ConvalidaError> {
        serde_json::from_str(SAMPLE_SNAPSHOT).map_err(|_| ConvalidaError::InvalidSnapshotFormat)
    }

    /// Serialize to pretty-printed JSON bytes.
    ///
    /// This is a pure transformation - no file I/O.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, ConvalidaError> {
        serde_json::to_vec_pretty(self).map_err(|e| ConvalidaError::SerializationError(e.to_string()))
    }

    /// Parse a complete snapshot (all four fields required).
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, ConvalidaError> {
        decode_object(bytes)
    }
}

// =============================================================================
// SNAPSHOT PATCH (import side)
// =============================================================================

/// A possibly-partial snapshot read from an import payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotPatch {
    /// Replacement origin curriculum, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_origen: Option<Curriculum>,
    /// Replacement destination curriculum, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_destino: Option<Curriculum>,
    /// Replacement rule set, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reglas: Option<Vec<Rule>>,
    /// Replacement completion set, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aprobados: Option<Vec<CourseCode>>,
}

impl SnapshotPatch {
    /// Parse an import payload.
    ///
    /// Fails with `SnapshotTooLarge` before parsing oversized payloads and with
    /// `InvalidSnapshotFormat` on any syntax or shape error.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, ConvalidaError> {
        decode_object(bytes)
    }

    /// Check whether the patch carries no field at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plan_origen.is_none()
            && self.plan_destino.is_none()
            && self.reglas.is_none()
            && self.aprobados.is_none()
    }
}

impl From<Snapshot> for SnapshotPatch {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            plan_origen: Some(snapshot.plan_origen),
            plan_destino: Some(snapshot.plan_destino),
            reglas: Some(snapshot.reglas),
            aprobados: Some(snapshot.aprobados),
        }
    }
}

/// Size-check, then decode a payload whose top level must be a JSON object.
fn decode_object<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ConvalidaError> {
    check_size(bytes)?;
    let object: Map<String, Value> =
        serde_json::from_slice(bytes).map_err(|_| ConvalidaError::InvalidSnapshotFormat)?;
    serde_json::from_value(Value::Object(object))
        .map_err(|_| ConvalidaError::InvalidSnapshotFormat)
}

fn check_size(bytes: &[u8]) -> Result<(), ConvalidaError> {
    if bytes.len() > MAX_SNAPSHOT_SIZE {
        return Err(ConvalidaError::SnapshotTooLarge {
            size: bytes.len(),
            max: MAX_SNAPSHOT_SIZE,
        });
    }
    Ok(())
}

// =============================================================================
// CHECKSUM
// =============================================================================

/// BLAKE3 hex digest of a snapshot's exported bytes.
///
/// Two snapshots hash equal iff they export to identical bytes.
#[cfg(feature = "crypto-hash")]
pub fn snapshot_checksum(snapshot: &Snapshot) -> Result<String, ConvalidaError> {
    let bytes = snapshot.to_json_bytes()?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

// =============================================================================
// TESTS
// =============================================================================
