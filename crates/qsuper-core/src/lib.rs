//! qsuper core
//!
//! Client-side model of a remote quantum-state superposition service. A
//! caller describes a problem (target basis state, metric, distance domain,
//! ancilla and QASM options) on a [`RequestState`], invokes one of four
//! operations, and gets back either a scalar or an immutable
//! [`ProblemResult`].
//!
//! # Overview
//!
//! - [`ExactNumber`] keeps distances exact across the text wire format:
//!   finite rationals, `inf` and `nan` are one closed type.
//! - [`RequestState`] owns the mutually exclusive state encodings and
//!   distance domains.
//! - [`Payload::build`] shapes the request body per [`OperationKind`].
//! - [`result`] decodes response bodies.
//! - [`SuperposeClient`] ties the above to a [`Transport`].
//!
//! # Operations
//!
//! | Operation | Needs `with_nan` + distances | Returns |
//! |-----------|------------------------------|---------|
//! | `extra_qubits_service` | yes | `u64` |
//! | `distances_range_service` | no | `(ExactNumber, ExactNumber)` |
//! | `circuit_service` | yes | [`ProblemResult`] |
//! | `total_states_superposed_service` | yes | `u128` |
//!
//! # Example
//!
//! ```ignore
//! use qsuper_adapter_http::HttpTransport;
//! use qsuper_core::SuperposeClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut client = SuperposeClient::with_token("my-token", HttpTransport::new()?)?;
//!     let state = client.state_mut();
//!     state.set_metric("euclidean")?;
//!     state.set_state_by_index(4, 3u32)?;
//!     state.set_distances(["1/2", "inf"])?;
//!     state.set_allow_nan(true);
//!
//!     let circuit = client.generate_circuit().await?;
//!     println!("{}", circuit.qasm_code());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod exact;
pub mod payload;
pub mod problem;
pub mod result;
pub mod state;

pub use client::{SuperposeClient, Transport};
pub use error::{CoreError, CoreResult};
pub use exact::{ExactNumber, NumberInput};
pub use payload::{OperationKind, Payload};
pub use problem::ProblemFile;
pub use result::{Decoded, ProblemResult};
pub use state::{AncillaMode, DistanceDomain, QasmVersion, RequestState, StateEncoding};
