//! Elasticsearch node topology fragments
//!
//! Fragments are JSON objects given on the command line:
//!
//! ```text
//! {"node_type": "data", "size": "8g", "zone_count": 2}
//! ```
//!
//! `size` is required. It may be a human size string or an integer that is
//! already in megabytes, so normalized output is accepted as input again.

use crate::error::{DeploymentError, Result};
use crate::size;
use serde::{Deserialize, Serialize};

/// One elasticsearch node tier requested by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeTopology {
    pub node_type: String,

    /// Memory in megabytes
    pub size: u32,

    /// Zero means "use the template's zone count"
    #[serde(default, skip_serializing_if = "is_zero")]
    pub zone_count: u32,
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

#[derive(Debug, Deserialize)]
struct RawNodeTopology {
    #[serde(default)]
    node_type: String,
    #[serde(default)]
    size: Option<RawSize>,
    #[serde(default)]
    zone_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawSize {
    Megabytes(u32),
    Human(String),
}

impl NodeTopology {
    /// Decode a single raw fragment
    pub fn parse(fragment: &str) -> Result<Self> {
        let raw: RawNodeTopology =
            serde_json::from_str(fragment).map_err(|source| DeploymentError::TopologyDecode {
                fragment: fragment.to_string(),
                source,
            })?;

        let megabytes = match raw.size {
            Some(RawSize::Megabytes(mb)) => mb,
            Some(RawSize::Human(human)) => size::parse(&human)?,
            None => 0,
        };
        if megabytes == 0 {
            return Err(DeploymentError::EmptyTopologySize {
                fragment: fragment.to_string(),
            });
        }

        Ok(Self {
            node_type: raw.node_type,
            size: megabytes,
            zone_count: raw.zone_count,
        })
    }
}

/// Decode every fragment, in order. The first failure aborts the whole call.
pub fn parse_all<S: AsRef<str>>(raw: &[S]) -> Result<Vec<NodeTopology>> {
    raw.iter().map(|f| NodeTopology::parse(f.as_ref())).collect()
}

/// Decode every fragment and re-encode it with its size in megabytes
pub fn normalize<S: AsRef<str>>(raw: &[S]) -> Result<Vec<String>> {
    parse_all(raw)?
        .iter()
        .map(|element| serde_json::to_string(element).map_err(DeploymentError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_converts_sizes() {
        let raw = [
            r#"{"node_type":"data","size":"8g","zone_count":2}"#,
            r#"{"node_type":"master","size":"1g"}"#,
        ];

        let normalized = normalize(&raw).unwrap();
        assert_eq!(
            normalized,
            vec![
                r#"{"node_type":"data","size":8192,"zone_count":2}"#.to_string(),
                r#"{"node_type":"master","size":1024}"#.to_string(),
            ]
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let raw = [
            r#"{"node_type":"data","size":"0.5g","zone_count":3}"#,
            r#"{"node_type":"ml","size":"700m"}"#,
        ];

        let once = normalize(&raw).unwrap();
        let twice = normalize(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_missing_size_is_rejected() {
        let err = NodeTopology::parse(r#"{"node_type":"data"}"#).unwrap_err();
        assert!(matches!(err, DeploymentError::EmptyTopologySize { .. }));
        assert!(err.to_string().contains("memory size cannot be empty"));

        let err = NodeTopology::parse(r#"{"node_type":"data","size":""}"#).unwrap_err();
        assert!(matches!(err, DeploymentError::EmptyTopologySize { .. }));
    }

    #[test]
    fn test_malformed_fragment_keeps_context() {
        let err = NodeTopology::parse("{node_type: data}").unwrap_err();
        assert!(matches!(err, DeploymentError::TopologyDecode { .. }));
        assert!(err.to_string().contains("{node_type: data}"));
    }

    #[test]
    fn test_invalid_size_is_surfaced() {
        let err = NodeTopology::parse(r#"{"node_type":"data","size":"8x"}"#).unwrap_err();
        assert!(matches!(err, DeploymentError::InvalidSize { .. }));
    }

    #[test]
    fn test_one_bad_element_fails_the_call() {
        let raw = [
            r#"{"node_type":"data","size":"8g"}"#,
            r#"{"node_type":"master"}"#,
        ];
        assert!(normalize(&raw).is_err());
    }

    #[test]
    fn test_empty_input() {
        let raw: [&str; 0] = [];
        assert!(normalize(&raw).unwrap().is_empty());
    }
}
