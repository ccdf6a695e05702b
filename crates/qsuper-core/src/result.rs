//! Response decoding.
//!
//! The service answers with `{"response": {...}}`. Behind the API gateway
//! the same object arrives as a JSON string in a `body` field; both shapes
//! are accepted by [`extract_response`].

use num_bigint::BigUint;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::exact::ExactNumber;
use crate::payload::{OperationKind, json_integer};
use crate::state::{AncillaMode, DistanceDomain, QasmVersion, RequestState};

/// Unwrap the operation-specific object from a response body.
pub fn extract_response(body: Value) -> CoreResult<Value> {
    let mut object = match body {
        Value::Object(map) => map,
        other => {
            return Err(CoreError::decode(format!(
                "expected a JSON object, got {other}"
            )));
        }
    };

    if let Some(response) = object.remove("response") {
        return Ok(response);
    }
    match object.remove("body") {
        Some(Value::String(text)) => {
            let inner: Value = serde_json::from_str(&text)?;
            extract_response(inner)
        }
        Some(inner @ Value::Object(_)) => extract_response(inner),
        _ => Err(CoreError::decode("missing field `response`")),
    }
}

#[derive(Deserialize)]
struct ExtraQubitsResponse {
    extra_qubits: u64,
}

#[derive(Deserialize)]
struct DistanceRangeResponse {
    distances_range_min: ExactNumber,
    distances_range_max: ExactNumber,
}

#[derive(Deserialize)]
struct TotalSuperposedResponse {
    #[serde(deserialize_with = "state_count")]
    total_states_superposed: u128,
}

#[derive(Deserialize)]
struct CircuitResponse {
    qasm_circuit: String,
    extra_qubits: u64,
    #[serde(deserialize_with = "state_count")]
    total_states_superposed: u128,
}

/// Counts may exceed `u64`; large ones arrive as decimal strings.
fn state_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u64),
        Text(String),
    }

    match Count::deserialize(deserializer)? {
        Count::Number(n) => Ok(n.into()),
        Count::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn parse_fields<T: DeserializeOwned>(body: Value, operation: OperationKind) -> CoreResult<T> {
    let response = extract_response(body)?;
    serde_json::from_value(response)
        .map_err(|e| CoreError::decode(format!("{operation} response: {e}")))
}

/// Decoded output of one operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// Extra qubits needed.
    ExtraQubits(u64),
    /// `(min, max)` of the reachable distances.
    DistanceRange(ExactNumber, ExactNumber),
    /// Number of superposed basis states.
    TotalSuperposed(u128),
    /// Generated circuit and its problem description.
    Circuit(Box<ProblemResult>),
}

/// Decode the response of `operation` issued with `state`.
pub fn decode(state: &RequestState, operation: OperationKind, body: Value) -> CoreResult<Decoded> {
    Ok(match operation {
        OperationKind::ExtraQubits => Decoded::ExtraQubits(decode_extra_qubits(body)?),
        OperationKind::DistanceRange => {
            let (min, max) = decode_distance_range(body)?;
            Decoded::DistanceRange(min, max)
        }
        OperationKind::TotalSuperposed => Decoded::TotalSuperposed(decode_total_superposed(body)?),
        OperationKind::Circuit => Decoded::Circuit(Box::new(decode_circuit(state, body)?)),
    })
}

/// Decode an `extra_qubits_service` response.
pub fn decode_extra_qubits(body: Value) -> CoreResult<u64> {
    let r: ExtraQubitsResponse = parse_fields(body, OperationKind::ExtraQubits)?;
    Ok(r.extra_qubits)
}

/// Decode a `distances_range_service` response.
pub fn decode_distance_range(body: Value) -> CoreResult<(ExactNumber, ExactNumber)> {
    let r: DistanceRangeResponse = parse_fields(body, OperationKind::DistanceRange)?;
    Ok((r.distances_range_min, r.distances_range_max))
}

/// Decode a `total_states_superposed_service` response.
pub fn decode_total_superposed(body: Value) -> CoreResult<u128> {
    let r: TotalSuperposedResponse = parse_fields(body, OperationKind::TotalSuperposed)?;
    Ok(r.total_states_superposed)
}

/// Decode a `circuit_service` response into a full [`ProblemResult`].
pub fn decode_circuit(state: &RequestState, body: Value) -> CoreResult<ProblemResult> {
    let r: CircuitResponse = parse_fields(body, OperationKind::Circuit)?;
    let metric = state
        .metric()
        .ok_or_else(|| CoreError::precondition("metric required"))?;
    let (num_qubits, state_index, state_binary) = state
        .resolved_state()
        .ok_or_else(|| CoreError::precondition("state required"))?;
    let (distances, range) = match state.distance_domain() {
        Some(DistanceDomain::List(values)) => (Some(values.clone()), None),
        Some(DistanceDomain::Range { min, max }) => (None, Some((min.clone(), max.clone()))),
        None => (None, None),
    };

    Ok(ProblemResult {
        metric: metric.to_string(),
        num_qubits,
        state_index,
        state_binary,
        distances,
        range,
        with_nan: state.with_nan().unwrap_or_default(),
        qasm_version: state.qasm_version(),
        ancilla_mode: state.ancilla_mode(),
        qasm: r.qasm_circuit,
        extra_qubits: r.extra_qubits,
        total_states_superposed: r.total_states_superposed,
    })
}

/// Generated superposition circuit with the problem that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProblemResult {
    metric: String,
    num_qubits: u32,
    #[serde(serialize_with = "json_integer")]
    state_index: BigUint,
    state_binary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    distances: Option<Vec<ExactNumber>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    range: Option<(ExactNumber, ExactNumber)>,
    with_nan: bool,
    qasm_version: QasmVersion,
    ancilla_mode: AncillaMode,
    qasm: String,
    extra_qubits: u64,
    total_states_superposed: u128,
}

impl ProblemResult {
    /// Metric name.
    pub fn metric(&self) -> &str {
        &self.metric
    }

    /// `(num_qubits, state_index)`.
    pub fn state(&self) -> (u32, &BigUint) {
        (self.num_qubits, &self.state_index)
    }

    /// State as a bit string of `num_qubits` characters.
    pub fn state_binary(&self) -> &str {
        &self.state_binary
    }

    /// Explicit distance list, when one was configured.
    pub fn distances(&self) -> Option<&[ExactNumber]> {
        self.distances.as_deref()
    }

    /// Distance range, when one was configured.
    pub fn range(&self) -> Option<(&ExactNumber, &ExactNumber)> {
        self.range.as_ref().map(|(min, max)| (min, max))
    }

    /// Whether undefined distances were allowed.
    pub fn is_nan_allowed(&self) -> bool {
        self.with_nan
    }

    /// Extra qubits used by the circuit.
    pub fn extra_qubits(&self) -> u64 {
        self.extra_qubits
    }

    /// Number of basis states in the superposition.
    pub fn num_superposed(&self) -> u128 {
        self.total_states_superposed
    }

    /// Circuit source.
    pub fn qasm_code(&self) -> &str {
        &self.qasm
    }

    /// QASM version of [`qasm_code`](Self::qasm_code).
    pub fn qasm_version(&self) -> QasmVersion {
        self.qasm_version
    }

    /// Ancilla mode the circuit was generated with.
    pub fn ancilla_mode(&self) -> AncillaMode {
        self.ancilla_mode
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn configured() -> RequestState {
        let mut s = RequestState::new("abc").unwrap();
        s.set_metric("euclidean").unwrap();
        s.set_state_by_index(4, 3u32).unwrap();
        s.set_distances(["1/2", "inf"]).unwrap();
        s.set_allow_nan(true);
        s
    }

    #[test]
    fn test_extract_plain_response() {
        let v = extract_response(json!({"response": {"extra_qubits": 2}})).unwrap();
        assert_eq!(v, json!({"extra_qubits": 2}));
    }

    #[test]
    fn test_extract_gateway_body() {
        let body = json!({"body": "{\"response\": {\"extra_qubits\": 7}}"});
        assert_eq!(decode_extra_qubits(body).unwrap(), 7);
    }

    #[test]
    fn test_extract_missing_response() {
        assert!(matches!(
            extract_response(json!({"status": "ok"})),
            Err(CoreError::Decode(_))
        ));
        assert!(matches!(
            extract_response(json!([1, 2])),
            Err(CoreError::Decode(_))
        ));
    }

    #[test]
    fn test_extra_qubits_wrong_type() {
        let body = json!({"response": {"extra_qubits": "two"}});
        assert!(matches!(decode_extra_qubits(body), Err(CoreError::Decode(_))));
    }

    #[test]
    fn test_distance_range_numbers_and_tokens() {
        let body = json!({"response": {"distances_range_min": 0, "distances_range_max": "3/2"}});
        let (min, max) = decode_distance_range(body).unwrap();
        assert_eq!(min, ExactNumber::from(0i64));
        assert_eq!(max, ExactNumber::from_ratio(3, 2).unwrap());
    }

    #[test]
    fn test_total_superposed_large_string() {
        let body = json!({"response": {"total_states_superposed": "340282366920938463463374607431768211455"}});
        assert_eq!(decode_total_superposed(body).unwrap(), u128::MAX);
        let body = json!({"response": {"total_states_superposed": 16}});
        assert_eq!(decode_total_superposed(body).unwrap(), 16);
    }

    #[test]
    fn test_circuit_from_index_state() {
        let body = json!({"response": {
            "qasm_circuit": "OPENQASM 2.0;",
            "extra_qubits": 2,
            "total_states_superposed": 16,
        }});
        let result = decode_circuit(&configured(), body).unwrap();
        assert_eq!(result.metric(), "euclidean");
        assert_eq!(result.state(), (4, &BigUint::from(3u32)));
        assert_eq!(result.state_binary(), "0011");
        assert_eq!(
            result.distances().unwrap(),
            &[
                ExactNumber::from_ratio(1, 2).unwrap(),
                ExactNumber::PositiveInfinity
            ]
        );
        assert!(result.range().is_none());
        assert!(result.is_nan_allowed());
        assert_eq!(result.qasm_code(), "OPENQASM 2.0;");
        assert_eq!(result.extra_qubits(), 2);
        assert_eq!(result.num_superposed(), 16);
        assert_eq!(result.qasm_version(), QasmVersion::V2);
        assert_eq!(result.ancilla_mode(), AncillaMode::Clean);
    }

    #[test]
    fn test_circuit_from_binary_state_with_range() {
        let mut s = configured();
        s.set_state_by_binary("00101").unwrap();
        s.set_distance_range("1", "inf").unwrap();
        let body = json!({"response": {
            "qasm_circuit": "",
            "extra_qubits": 0,
            "total_states_superposed": 1,
        }});
        let result = decode_circuit(&s, body).unwrap();
        assert_eq!(result.state(), (5, &BigUint::from(5u32)));
        assert_eq!(result.state_binary(), "00101");
        assert!(result.distances().is_none());
        let (min, max) = result.range().unwrap();
        assert_eq!(min, &ExactNumber::from(1i64));
        assert_eq!(max, &ExactNumber::PositiveInfinity);
    }

    #[test]
    fn test_circuit_missing_field() {
        let body = json!({"response": {"qasm_circuit": "x", "extra_qubits": 1}});
        let err = decode_circuit(&configured(), body).unwrap_err();
        assert!(matches!(err, CoreError::Decode(ref msg) if msg.contains("total_states_superposed")));
    }

    #[test]
    fn test_decode_dispatch() {
        let s = configured();
        assert_eq!(
            decode(&s, OperationKind::ExtraQubits, json!({"response": {"extra_qubits": 3}})).unwrap(),
            Decoded::ExtraQubits(3)
        );
        assert_eq!(
            decode(
                &s,
                OperationKind::TotalSuperposed,
                json!({"response": {"total_states_superposed": 8}})
            )
            .unwrap(),
            Decoded::TotalSuperposed(8)
        );
    }

    #[test]
    fn test_problem_result_serializes() {
        let body = json!({"response": {
            "qasm_circuit": "q",
            "extra_qubits": 1,
            "total_states_superposed": 2,
        }});
        let value = serde_json::to_value(decode_circuit(&configured(), body).unwrap()).unwrap();
        assert_eq!(value["state_binary"], "0011");
        assert_eq!(value["state_index"], 3);
        assert_eq!(value["distances"], json!(["1/2", "inf"]));
        assert!(value.get("range").is_none());
    }
}
