//! Golden test vectors for deterministic verification.
//!
//! History paths must match byte for byte across implementations, or
//! histories written by one cannot be traversed by another.

use serde::Serialize;

use actkit_access::history_key;

/// A golden history-key vector.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryKeyVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub timestamp: i64,
    /// Expected manifest path.
    pub expected_key: &'static str,
}

/// Get all golden history-key vectors.
pub fn all_vectors() -> Vec<HistoryKeyVector> {
    vec![
        HistoryKeyVector {
            name: "smallest valid timestamp",
            timestamp: 1,
            expected_key: "9223372036854775806",
        },
        HistoryKeyVector {
            name: "one thousand seconds",
            timestamp: 1_000,
            expected_key: "9223372036854774807",
        },
        HistoryKeyVector {
            name: "2023-11-14T22:13:20Z",
            timestamp: 1_700_000_000,
            expected_key: "9223372035154775807",
        },
        HistoryKeyVector {
            name: "2100-01-01T00:00:00Z",
            timestamp: 4_102_444_800,
            expected_key: "9223372032752331007",
        },
        HistoryKeyVector {
            name: "largest timestamp pads to 19 zeros",
            timestamp: i64::MAX,
            expected_key: "0000000000000000000",
        },
    ]
}

/// Check every vector. Returns the names of failing vectors.
pub fn verify_all_vectors() -> Vec<&'static str> {
    all_vectors()
        .into_iter()
        .filter(|v| history_key(v.timestamp) != v.expected_key)
        .map(|v| v.name)
        .collect()
}

/// All vectors as pretty JSON, for other implementations to consume.
pub fn vectors_json() -> serde_json::Result<String> {
    serde_json::to_string_pretty(&all_vectors())
}
