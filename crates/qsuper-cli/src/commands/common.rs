//! Shared helpers for CLI commands.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use num_bigint::BigUint;
use tracing::debug;

use qsuper_adapter_http::{HttpTransport, TransportConfig, WireEnvelope};
use qsuper_core::{ProblemFile, RequestState, SuperposeClient};

/// Service connection options, shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Service access token
    #[arg(long, env = "QSUPER_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Service endpoint URL
    #[arg(long, env = "QSUPER_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// Send the payload as the request body instead of the gateway envelope
    #[arg(long, global = true)]
    pub plain: bool,
}

/// Problem description options. Flags override the problem file.
#[derive(Args, Debug, Clone, Default)]
pub struct ProblemArgs {
    /// Problem file (YAML, or JSON with a .json extension)
    #[arg(short, long)]
    pub problem: Option<PathBuf>,

    /// Distance metric
    #[arg(short, long)]
    pub metric: Option<String>,

    /// Target state as a bit string
    #[arg(long, conflicts_with_all = ["qubits", "index"])]
    pub bin: Option<String>,

    /// Number of qubits of the target state
    #[arg(long, requires = "index")]
    pub qubits: Option<u32>,

    /// Index of the target basis state (any width)
    #[arg(long, requires = "qubits")]
    pub index: Option<BigUint>,

    /// Comma-separated distances (e.g. 1/2,inf,3)
    #[arg(long, value_delimiter = ',', conflicts_with = "range")]
    pub distances: Option<Vec<String>>,

    /// Distance range bounds
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"], allow_hyphen_values = true)]
    pub range: Option<Vec<String>>,

    /// Whether undefined distances may occur (true/false)
    #[arg(long)]
    pub with_nan: Option<bool>,

    /// Ancilla mode (clean, noancilla, garbage, borrowed, burnable)
    #[arg(long)]
    pub ancilla_mode: Option<String>,

    /// QASM version of the generated circuit (2.0, 3.0)
    #[arg(long)]
    pub qasm_version: Option<String>,
}

impl ProblemArgs {
    /// Build the request state from the problem file and the flags.
    pub fn build_state(&self, token: &str) -> Result<RequestState> {
        let mut state = RequestState::new(token)?;

        if let Some(path) = &self.problem {
            let file = ProblemFile::load(path)
                .with_context(|| format!("Failed to load problem file: {}", path.display()))?;
            file.apply(&mut state)?;
        }

        if let Some(metric) = &self.metric {
            state.set_metric(metric)?;
        }
        if let Some(bits) = &self.bin {
            state.set_state_by_binary(bits)?;
        }
        if let (Some(qubits), Some(index)) = (self.qubits, &self.index) {
            state.set_state_by_index(qubits, index.clone())?;
        }
        if let Some(distances) = &self.distances {
            state.set_distances(distances.iter().map(String::as_str))?;
        }
        if let Some([min, max]) = self.range.as_deref() {
            state.set_distance_range(min.as_str(), max.as_str())?;
        }
        if let Some(with_nan) = self.with_nan {
            state.set_allow_nan(with_nan);
        }
        if let Some(mode) = &self.ancilla_mode {
            state.set_ancilla_mode(mode)?;
        }
        if let Some(version) = &self.qasm_version {
            state.set_qasm_version(version)?;
        }

        Ok(state)
    }
}

impl ConnectionArgs {
    /// Transport configuration: environment defaults, then flags.
    pub fn transport_config(&self) -> Result<TransportConfig> {
        let mut config = TransportConfig::from_env()?;
        if let Some(endpoint) = &self.endpoint {
            config = config.with_endpoint(endpoint);
        }
        if self.plain {
            config = config.with_envelope(WireEnvelope::Plain);
        }
        Ok(config)
    }

    /// The token, or an error explaining how to provide one.
    pub fn require_token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| anyhow::anyhow!("Missing token: pass --token or set QSUPER_TOKEN"))
    }
}

/// Create a client for `problem` over HTTP.
pub fn connect(
    conn: &ConnectionArgs,
    problem: &ProblemArgs,
) -> Result<SuperposeClient<HttpTransport>> {
    let state = problem.build_state(conn.require_token()?)?;
    let config = conn.transport_config()?;
    debug!(endpoint = %config.endpoint, envelope = ?config.envelope, "Connecting");
    let transport = HttpTransport::with_config(config)?;
    Ok(SuperposeClient::new(state, transport))
}

/// Spinner shown while a request is in flight.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
