//! Request bodies.
//!
//! [`Payload::build`] checks the preconditions of an operation against the
//! current [`RequestState`] and produces exactly the fields that operation
//! needs. Exact numbers are rendered as their wire tokens.

use std::fmt;

use num_bigint::BigUint;
use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use serde_json::value::RawValue;

use crate::error::{CoreError, CoreResult};
use crate::state::{AncillaMode, DistanceDomain, QasmVersion, RequestState, StateEncoding};

/// Remote operation to invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OperationKind {
    /// Number of extra qubits the circuit needs.
    #[serde(rename = "extra_qubits_service")]
    ExtraQubits,
    /// Bounds of the distances reachable from the state.
    #[serde(rename = "distances_range_service")]
    DistanceRange,
    /// Full superposition circuit.
    #[serde(rename = "circuit_service")]
    Circuit,
    /// Number of basis states in the superposition.
    #[serde(rename = "total_states_superposed_service")]
    TotalSuperposed,
}

impl OperationKind {
    /// All operations.
    pub const ALL: [OperationKind; 4] = [
        Self::ExtraQubits,
        Self::DistanceRange,
        Self::Circuit,
        Self::TotalSuperposed,
    ];

    /// Service identifier sent on the wire.
    pub fn service_name(self) -> &'static str {
        match self {
            Self::ExtraQubits => "extra_qubits_service",
            Self::DistanceRange => "distances_range_service",
            Self::Circuit => "circuit_service",
            Self::TotalSuperposed => "total_states_superposed_service",
        }
    }

    /// Whether the operation needs `with_nan` and a distance domain.
    pub fn needs_distance_info(self) -> bool {
        !matches!(self, Self::DistanceRange)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.service_name())
    }
}

/// State fields: the binary form or the index form, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StateFields {
    /// `state_bin`.
    Binary {
        /// Bit string.
        state_bin: String,
    },
    /// `n_qubits` and `state`.
    Index {
        /// Register width.
        n_qubits: u32,
        /// Basis state index, sent as a bare JSON integer of any width.
        #[serde(serialize_with = "json_integer")]
        state: BigUint,
    },
}

/// Write `value` as a JSON integer literal, however many digits it has.
pub(crate) fn json_integer<S: Serializer>(
    value: &BigUint,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match u64::try_from(value) {
        Ok(n) => serializer.serialize_u64(n),
        Err(_) => RawValue::from_string(value.to_string())
            .map_err(S::Error::custom)?
            .serialize(serializer),
    }
}

/// Distance fields: an explicit list or range bounds, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DomainFields {
    /// `distances`.
    List {
        /// Distance tokens, in order.
        distances: Vec<String>,
    },
    /// `min_range` and `max_range`.
    Range {
        /// Lower bound token.
        min_range: String,
        /// Upper bound token.
        max_range: String,
    },
}

/// Fields only sent to operations that need distance information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistanceFields {
    /// Whether undefined distances may occur.
    pub with_nan: bool,
    /// Ancilla policy.
    pub ancilla_mode: AncillaMode,
    /// QASM version.
    pub qasm_version: QasmVersion,
    /// Distance domain.
    #[serde(flatten)]
    pub domain: DomainFields,
}

/// JSON request body for one operation.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Payload {
    /// Access token.
    pub token: String,
    /// Metric name.
    pub metric: String,
    /// Operation identifier.
    pub service: OperationKind,
    /// Target state.
    #[serde(flatten)]
    pub state: StateFields,
    /// Distance information, absent for [`OperationKind::DistanceRange`].
    #[serde(flatten)]
    pub distance: Option<DistanceFields>,
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload")
            .field("token", &"[REDACTED]")
            .field("metric", &self.metric)
            .field("service", &self.service)
            .field("state", &self.state)
            .field("distance", &self.distance)
            .finish()
    }
}

impl Payload {
    /// Build the request body for `operation` from the current state.
    ///
    /// Preconditions are checked in order: metric, state, then (for every
    /// operation but [`OperationKind::DistanceRange`]) `with_nan` and a
    /// distance domain.
    pub fn build(state: &RequestState, operation: OperationKind) -> CoreResult<Self> {
        let metric = state
            .metric()
            .ok_or_else(|| CoreError::precondition("metric required"))?;
        let encoding = state
            .state()
            .ok_or_else(|| CoreError::precondition("state required"))?;

        let distance = if operation.needs_distance_info() {
            match (state.with_nan(), state.distance_domain()) {
                (Some(with_nan), Some(domain)) => Some(DistanceFields {
                    with_nan,
                    ancilla_mode: state.ancilla_mode(),
                    qasm_version: state.qasm_version(),
                    domain: domain_fields(domain),
                }),
                _ => return Err(CoreError::precondition("distance info required")),
            }
        } else {
            None
        };

        Ok(Self {
            token: state.token().to_string(),
            metric: metric.to_string(),
            service: operation,
            state: state_fields(encoding),
            distance,
        })
    }

    /// The JSON text sent on the wire.
    ///
    /// Indices wider than 64 bits are written as exact integer literals,
    /// which `serde_json::Value` cannot hold; go through this text rather
    /// than `serde_json::to_value`.
    pub fn to_json(&self) -> CoreResult<String> {
        serde_json::to_string(self)
            .map_err(|e| CoreError::decode(format!("cannot encode payload: {e}")))
    }
}

fn state_fields(encoding: &StateEncoding) -> StateFields {
    match encoding {
        StateEncoding::Binary(bits) => StateFields::Binary {
            state_bin: bits.clone(),
        },
        StateEncoding::Index { num_qubits, index } => StateFields::Index {
            n_qubits: *num_qubits,
            state: index.clone(),
        },
    }
}

fn domain_fields(domain: &DistanceDomain) -> DomainFields {
    match domain {
        DistanceDomain::List(values) => DomainFields::List {
            distances: values.iter().map(ToString::to_string).collect(),
        },
        DistanceDomain::Range { min, max } => DomainFields::Range {
            min_range: min.to_string(),
            max_range: max.to_string(),
        },
    }
}
