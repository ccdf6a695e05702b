//! Problem files.
//!
//! A problem file describes a [`RequestState`] in YAML or JSON:
//!
//! ```yaml
//! metric: euclidean
//! state:
//!   num_qubits: 4
//!   index: 3
//! distances: ["1/2", "inf"]
//! with_nan: true
//! ancilla_mode: clean
//! qasm_version: "2.0"
//! ```
//!
//! `distances`, `range` and `with_nan` are loosely typed on disk and
//! validated when the file is applied.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::{CoreError, CoreResult};
use crate::exact::NumberInput;
use crate::state::RequestState;

/// Target state as written in a problem file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateSpec {
    /// Bit string form; wins over the index form when both are given.
    #[serde(default)]
    pub bin: Option<String>,
    /// Register width.
    #[serde(default)]
    pub num_qubits: Option<u32>,
    /// Basis state index; registers wider than 64 qubits use `bin`.
    #[serde(default)]
    pub index: Option<u64>,
}

/// Problem description loaded from disk.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProblemFile {
    /// Metric name.
    #[serde(default)]
    pub metric: Option<String>,
    /// Target state.
    #[serde(default)]
    pub state: Option<StateSpec>,
    /// Explicit distance list.
    #[serde(default)]
    pub distances: Option<Value>,
    /// `[min, max]` distance range.
    #[serde(default)]
    pub range: Option<Value>,
    /// Whether undefined distances may occur.
    #[serde(default)]
    pub with_nan: Option<Value>,
    /// Ancilla mode name.
    #[serde(default)]
    pub ancilla_mode: Option<String>,
    /// QASM version.
    #[serde(default)]
    pub qasm_version: Option<String>,
}

impl ProblemFile {
    /// Parse a YAML document.
    pub fn from_yaml_str(source: &str) -> CoreResult<Self> {
        serde_yaml_ng::from_str(source)
            .map_err(|e| CoreError::invalid(format!("invalid problem file: {e}")))
    }

    /// Parse a JSON document.
    pub fn from_json_str(source: &str) -> CoreResult<Self> {
        serde_json::from_str(source)
            .map_err(|e| CoreError::invalid(format!("invalid problem file: {e}")))
    }

    /// Load from `path`; `.json` files are JSON, anything else YAML.
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| {
            CoreError::invalid(format!("cannot read problem file {}: {e}", path.display()))
        })?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&source)
        } else {
            Self::from_yaml_str(&source)
        }
    }

    /// Apply every field present in the file to `state`.
    ///
    /// Fields are applied one setter at a time; the first failing setter
    /// stops the process and its own field is left untouched.
    pub fn apply(&self, state: &mut RequestState) -> CoreResult<()> {
        if let Some(metric) = &self.metric {
            state.set_metric(metric)?;
        }
        if let Some(spec) = &self.state {
            apply_state(spec, state)?;
        }
        if let Some(range) = &self.range {
            let (min, max) = range_bounds(range)?;
            state.set_distance_range(min, max)?;
        }
        if let Some(distances) = &self.distances {
            state.set_distances(distance_list(distances)?)?;
        }
        if let Some(with_nan) = &self.with_nan {
            let flag = with_nan
                .as_bool()
                .ok_or_else(|| CoreError::invalid("expected a boolean value"))?;
            state.set_allow_nan(flag);
        }
        if let Some(mode) = &self.ancilla_mode {
            state.set_ancilla_mode(mode)?;
        }
        if let Some(version) = &self.qasm_version {
            state.set_qasm_version(version)?;
        }
        Ok(())
    }
}

fn apply_state(spec: &StateSpec, state: &mut RequestState) -> CoreResult<()> {
    match (&spec.bin, spec.num_qubits, spec.index) {
        (Some(bits), n, i) => {
            if n.is_some() || i.is_some() {
                warn!("num_qubits and index ignored since bin has been specified");
            }
            state.set_state_by_binary(bits)
        }
        (None, Some(n), Some(i)) => state.set_state_by_index(n, i),
        (None, _, _) => Err(CoreError::invalid(
            "either bin or num_qubits and index have to be specified",
        )),
    }
}

/// Distances must be a sequence; a bare string is rejected.
fn distance_list(value: &Value) -> CoreResult<Vec<NumberInput>> {
    let items = value
        .as_array()
        .ok_or_else(|| CoreError::invalid("expected a list"))?;
    items.iter().map(NumberInput::from_json).collect()
}

fn range_bounds(value: &Value) -> CoreResult<(NumberInput, NumberInput)> {
    match value.as_array().map(Vec::as_slice) {
        Some([min, max]) => Ok((NumberInput::from_json(min)?, NumberInput::from_json(max)?)),
        _ => Err(CoreError::invalid("range has to be a [min, max] pair")),
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigUint;

    use super::*;
    use crate::exact::ExactNumber;
    use crate::state::{AncillaMode, DistanceDomain, QasmVersion, StateEncoding};

    fn fresh() -> RequestState {
        RequestState::new("abc").unwrap()
    }

    #[test]
    fn test_yaml_problem() {
        let file = ProblemFile::from_yaml_str(
            r#"
metric: euclidean
state:
  num_qubits: 4
  index: 3
distances: ["1/2", "inf", 2]
with_nan: true
ancilla_mode: borrowed
qasm_version: "3.0"
"#,
        )
        .unwrap();
        let mut s = fresh();
        file.apply(&mut s).unwrap();
        assert_eq!(s.metric(), Some("euclidean"));
        assert_eq!(
            s.state(),
            Some(&StateEncoding::Index {
                num_qubits: 4,
                index: BigUint::from(3u32)
            })
        );
        assert_eq!(
            s.distance_domain(),
            Some(&DistanceDomain::List(vec![
                ExactNumber::from_ratio(1, 2).unwrap(),
                ExactNumber::PositiveInfinity,
                ExactNumber::from(2i64),
            ]))
        );
        assert_eq!(s.with_nan(), Some(true));
        assert_eq!(s.ancilla_mode(), AncillaMode::Borrowed);
        assert_eq!(s.qasm_version(), QasmVersion::V3);
    }

    #[test]
    fn test_json_problem_with_range_and_bin() {
        let file = ProblemFile::from_json_str(
            r#"{"metric": "hamming", "state": {"bin": "101", "num_qubits": 9}, "range": ["0/0", 3]}"#,
        )
        .unwrap();
        let mut s = fresh();
        file.apply(&mut s).unwrap();
        assert_eq!(s.state(), Some(&StateEncoding::Binary("101".into())));
        assert_eq!(
            s.distance_domain(),
            Some(&DistanceDomain::Range {
                min: ExactNumber::Undefined,
                max: ExactNumber::from(3i64),
            })
        );
    }

    #[test]
    fn test_string_distances_rejected() {
        let file = ProblemFile::from_yaml_str("distances: \"1,2,3\"").unwrap();
        let err = file.apply(&mut fresh()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(ref m) if m == "expected a list"));
    }

    #[test]
    fn test_non_boolean_with_nan_rejected() {
        let file = ProblemFile::from_yaml_str("with_nan: 1").unwrap();
        let mut s = fresh();
        let err = file.apply(&mut s).unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));
        assert_eq!(s.with_nan(), None);
    }

    #[test]
    fn test_incomplete_state_rejected() {
        let file = ProblemFile::from_yaml_str("state:\n  num_qubits: 3\n").unwrap();
        assert!(file.apply(&mut fresh()).is_err());
    }

    #[test]
    fn test_bad_range_shape() {
        let file = ProblemFile::from_yaml_str("range: [1, 2, 3]").unwrap();
        assert!(file.apply(&mut fresh()).is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(ProblemFile::from_yaml_str("metrik: euclidean").is_err());
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("problem.json");
        std::fs::write(&json_path, r#"{"metric": "euclidean"}"#).unwrap();
        let yaml_path = dir.path().join("problem.yaml");
        std::fs::write(&yaml_path, "metric: cosine\n").unwrap();

        assert_eq!(
            ProblemFile::load(&json_path).unwrap().metric.as_deref(),
            Some("euclidean")
        );
        assert_eq!(
            ProblemFile::load(&yaml_path).unwrap().metric.as_deref(),
            Some("cosine")
        );
        assert!(ProblemFile::load(dir.path().join("missing.yaml")).is_err());
    }
}
