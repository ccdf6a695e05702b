//! Mutable problem description.
//!
//! A [`RequestState`] is created with a token and then configured through
//! setters. Each setter validates its input completely before touching the
//! state, so a failed call leaves the previous configuration intact.
//!
//! The two state encodings and the two distance domains are mutually
//! exclusive. Setting one form replaces the other; the replaced form is
//! reported with an informational log line, not an error.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{CoreError, CoreResult};
use crate::exact::{ExactNumber, NumberInput};

/// Policy for helper qubits in generated circuits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AncillaMode {
    /// Ancillas start and end in |0⟩.
    #[default]
    Clean,
    /// No ancillas may be used.
    NoAncilla,
    /// Ancillas may be left in an arbitrary state.
    Garbage,
    /// Ancillas are borrowed in an unknown state and must be restored.
    Borrowed,
    /// Ancillas start in |0⟩ and may be discarded dirty.
    Burnable,
}

impl AncillaMode {
    /// All recognised modes.
    pub const ALL: [AncillaMode; 5] = [
        Self::Clean,
        Self::NoAncilla,
        Self::Garbage,
        Self::Borrowed,
        Self::Burnable,
    ];

    /// Wire name of the mode.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::NoAncilla => "noancilla",
            Self::Garbage => "garbage",
            Self::Borrowed => "borrowed",
            Self::Burnable => "burnable",
        }
    }
}

impl fmt::Display for AncillaMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AncillaMode {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| CoreError::invalid(format!("invalid ancilla mode: '{s}'")))
    }
}

/// OpenQASM version of generated circuits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QasmVersion {
    /// OpenQASM 2.0.
    #[default]
    #[serde(rename = "2.0")]
    V2,
    /// OpenQASM 3.0.
    #[serde(rename = "3.0")]
    V3,
}

impl QasmVersion {
    /// Wire name of the version.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V2 => "2.0",
            Self::V3 => "3.0",
        }
    }
}

impl fmt::Display for QasmVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QasmVersion {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "2.0" => Ok(Self::V2),
            "3.0" => Ok(Self::V3),
            other => Err(CoreError::invalid(format!("invalid QASM version: '{other}'"))),
        }
    }
}

/// The target basis state, in exactly one of its two encodings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateEncoding {
    /// Register width and the integer index of the basis state.
    Index {
        /// Number of qubits.
        num_qubits: u32,
        /// Basis state index in `[0, 2^num_qubits)`.
        index: BigUint,
    },
    /// Bit string, most significant qubit first.
    Binary(String),
}

impl StateEncoding {
    /// Resolve to `(num_qubits, index, binary)` whichever form is active.
    pub fn resolve(&self) -> (u32, BigUint, String) {
        match self {
            Self::Index { num_qubits, index } => {
                let binary = if *num_qubits == 0 {
                    String::new()
                } else {
                    let width = *num_qubits as usize;
                    format!("{:0>width$}", index.to_str_radix(2))
                };
                (*num_qubits, index.clone(), binary)
            }
            Self::Binary(bits) => {
                // Validated on construction: non-empty, only 0/1, width fits u32.
                let index = BigUint::parse_bytes(bits.as_bytes(), 2).unwrap_or_default();
                (bits.len() as u32, index, bits.clone())
            }
        }
    }
}

/// The permissible distances, as an explicit list or as a closed range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DistanceDomain {
    /// Ordered, non-empty list of distances.
    List(Vec<ExactNumber>),
    /// Range bounds; `min <= max` whenever both are finite.
    Range {
        /// Lower bound.
        min: ExactNumber,
        /// Upper bound.
        max: ExactNumber,
    },
}

/// In-progress problem description.
#[derive(Clone)]
pub struct RequestState {
    token: String,
    metric: Option<String>,
    state: Option<StateEncoding>,
    domain: Option<DistanceDomain>,
    with_nan: Option<bool>,
    ancilla_mode: AncillaMode,
    qasm_version: QasmVersion,
}

impl fmt::Debug for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestState")
            .field("token", &"[REDACTED]")
            .field("metric", &self.metric)
            .field("state", &self.state)
            .field("domain", &self.domain)
            .field("with_nan", &self.with_nan)
            .field("ancilla_mode", &self.ancilla_mode)
            .field("qasm_version", &self.qasm_version)
            .finish()
    }
}

impl RequestState {
    /// Create an empty problem description bound to an access token.
    pub fn new(token: impl Into<String>) -> CoreResult<Self> {
        let token = token.into();
        if token.is_empty() {
            return Err(CoreError::invalid("token has to be a non-empty string"));
        }
        Ok(Self {
            token,
            metric: None,
            state: None,
            domain: None,
            with_nan: None,
            ancilla_mode: AncillaMode::default(),
            qasm_version: QasmVersion::default(),
        })
    }

    /// Set the distance metric name.
    pub fn set_metric(&mut self, metric: &str) -> CoreResult<()> {
        if metric.is_empty() {
            return Err(CoreError::invalid("metric has to be a non-empty string"));
        }
        self.metric = Some(metric.to_string());
        Ok(())
    }

    /// Set the ancilla mode by its wire name.
    pub fn set_ancilla_mode(&mut self, mode: &str) -> CoreResult<()> {
        self.ancilla_mode = mode.parse()?;
        Ok(())
    }

    /// Set the QASM version (`"2.0"` or `"3.0"`).
    pub fn set_qasm_version(&mut self, version: &str) -> CoreResult<()> {
        self.qasm_version = version.parse()?;
        Ok(())
    }

    /// Select the target state by register width and index.
    ///
    /// Registers of any width are accepted; `index` must lie in
    /// `[0, 2^num_qubits)`.
    pub fn set_state_by_index(
        &mut self,
        num_qubits: u32,
        index: impl Into<BigUint>,
    ) -> CoreResult<()> {
        let index = index.into();
        if index.bits() > u64::from(num_qubits) {
            return Err(CoreError::invalid(format!(
                "the state {index} is out of range for {num_qubits} qubits"
            )));
        }
        if matches!(self.state, Some(StateEncoding::Binary(_))) {
            info!("state binary form discarded");
        }
        self.state = Some(StateEncoding::Index { num_qubits, index });
        Ok(())
    }

    /// Select the target state by bit string.
    pub fn set_state_by_binary(&mut self, bits: &str) -> CoreResult<()> {
        if bits.is_empty() || !bits.bytes().all(|b| b == b'0' || b == b'1') {
            return Err(CoreError::invalid(
                "bin is not a string of bits (0s and 1s)",
            ));
        }
        if u32::try_from(bits.len()).is_err() {
            return Err(CoreError::invalid("bit string is too long"));
        }
        if matches!(self.state, Some(StateEncoding::Index { .. })) {
            info!("state index and number of qubits discarded");
        }
        self.state = Some(StateEncoding::Binary(bits.to_string()));
        Ok(())
    }

    /// Restrict distances to a range.
    ///
    /// Bounds are only ordered when both are finite; infinity and the
    /// undefined marker never violate `min <= max`.
    pub fn set_distance_range(
        &mut self,
        min: impl Into<NumberInput>,
        max: impl Into<NumberInput>,
    ) -> CoreResult<()> {
        let min = min.into().to_exact()?;
        let max = max.into().to_exact()?;
        if min.finite_cmp(&max) == Some(std::cmp::Ordering::Greater) {
            return Err(CoreError::invalid(format!(
                "min range {min} is greater than max range {max}"
            )));
        }
        if matches!(self.domain, Some(DistanceDomain::List(_))) {
            info!("distance list discarded");
        }
        self.domain = Some(DistanceDomain::Range { min, max });
        Ok(())
    }

    /// Use an explicit, ordered list of distances.
    pub fn set_distances<I>(&mut self, values: I) -> CoreResult<()>
    where
        I: IntoIterator,
        I::Item: Into<NumberInput>,
    {
        let distances = values
            .into_iter()
            .map(|v| v.into().to_exact())
            .collect::<CoreResult<Vec<_>>>()?;
        if distances.is_empty() {
            return Err(CoreError::invalid("distances list is empty"));
        }
        if matches!(self.domain, Some(DistanceDomain::Range { .. })) {
            info!("distance range discarded");
        }
        self.domain = Some(DistanceDomain::List(distances));
        Ok(())
    }

    /// Declare whether undefined distances may occur.
    pub fn set_allow_nan(&mut self, allow: bool) {
        self.with_nan = Some(allow);
    }

    /// Access token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Metric name, if set.
    pub fn metric(&self) -> Option<&str> {
        self.metric.as_deref()
    }

    /// Active state encoding, if any.
    pub fn state(&self) -> Option<&StateEncoding> {
        self.state.as_ref()
    }

    /// Active distance domain, if any.
    pub fn distance_domain(&self) -> Option<&DistanceDomain> {
        self.domain.as_ref()
    }

    /// Whether undefined distances are allowed, if declared.
    pub fn with_nan(&self) -> Option<bool> {
        self.with_nan
    }

    /// Ancilla mode.
    pub fn ancilla_mode(&self) -> AncillaMode {
        self.ancilla_mode
    }

    /// QASM version.
    pub fn qasm_version(&self) -> QasmVersion {
        self.qasm_version
    }

    /// `(num_qubits, index, binary)` of the configured state.
    pub fn resolved_state(&self) -> Option<(u32, BigUint, String)> {
        self.state.as_ref().map(StateEncoding::resolve)
    }
}
