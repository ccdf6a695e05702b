//! Operation invokers.
//!
//! # Lifecycle
//!
//! ```text
//!   state_mut().set_*() ──→ Payload::build() ──→ Transport::submit() ──→ decode
//!      (validate)            (preconditions)        (retries inside)     (result)
//! ```
//!
//! Preconditions are checked before any network activity. The transport
//! owns retries and timeouts; a payload is built once per call and never
//! rebuilt on retry.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::error::CoreResult;
use crate::exact::ExactNumber;
use crate::payload::{OperationKind, Payload};
use crate::result::{self, ProblemResult};
use crate::state::RequestState;

/// Carries a payload to the service and returns the raw response body.
///
/// Implementations retry transient failures themselves and surface
/// everything else as [`CoreError::Transport`](crate::CoreError::Transport).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Transport name, for logs.
    fn name(&self) -> &str;

    /// Submit one payload and return the JSON response body.
    async fn submit(&self, payload: &Payload) -> CoreResult<Value>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn submit(&self, payload: &Payload) -> CoreResult<Value> {
        (**self).submit(payload).await
    }
}

/// A problem description bound to a transport.
pub struct SuperposeClient<T> {
    state: RequestState,
    transport: T,
}

impl<T: Transport> SuperposeClient<T> {
    /// Bind `state` to `transport`.
    pub fn new(state: RequestState, transport: T) -> Self {
        Self { state, transport }
    }

    /// Create a client with an empty problem description.
    pub fn with_token(token: impl Into<String>, transport: T) -> CoreResult<Self> {
        Ok(Self::new(RequestState::new(token)?, transport))
    }

    /// Current problem description.
    pub fn state(&self) -> &RequestState {
        &self.state
    }

    /// Mutable access for the setters.
    pub fn state_mut(&mut self) -> &mut RequestState {
        &mut self.state
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Release the state and the transport.
    pub fn into_parts(self) -> (RequestState, T) {
        (self.state, self.transport)
    }

    async fn call(&self, operation: OperationKind) -> CoreResult<Value> {
        let payload = Payload::build(&self.state, operation)?;
        debug!(
            service = %operation,
            transport = self.transport.name(),
            "Submitting request"
        );
        self.transport.submit(&payload).await
    }

    /// Number of extra qubits the circuit needs.
    #[instrument(skip(self))]
    pub async fn calculate_extra_qubits(&self) -> CoreResult<u64> {
        let body = self.call(OperationKind::ExtraQubits).await?;
        let extra = result::decode_extra_qubits(body)?;
        info!(extra_qubits = extra, "Extra qubits calculated");
        Ok(extra)
    }

    /// `(min, max)` of the distances reachable from the configured state.
    #[instrument(skip(self))]
    pub async fn calculate_distance_range(&self) -> CoreResult<(ExactNumber, ExactNumber)> {
        let body = self.call(OperationKind::DistanceRange).await?;
        let (min, max) = result::decode_distance_range(body)?;
        info!(%min, %max, "Distance range calculated");
        Ok((min, max))
    }

    /// Generate the superposition circuit.
    #[instrument(skip(self))]
    pub async fn generate_circuit(&self) -> CoreResult<ProblemResult> {
        let body = self.call(OperationKind::Circuit).await?;
        let circuit = result::decode_circuit(&self.state, body)?;
        info!(
            extra_qubits = circuit.extra_qubits(),
            qasm_len = circuit.qasm_code().len(),
            "Circuit generated"
        );
        Ok(circuit)
    }

    /// Number of basis states in the superposition.
    #[instrument(skip(self))]
    pub async fn calculate_num_superposed(&self) -> CoreResult<u128> {
        let body = self.call(OperationKind::TotalSuperposed).await?;
        let total = result::decode_total_superposed(body)?;
        info!(total = %total, "Superposed states counted");
        Ok(total)
    }
}

impl<T> std::fmt::Debug for SuperposeClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuperposeClient")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
