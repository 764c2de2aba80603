//! Fixture loading shared by the end-to-end tests.
//!
//! Flight models live in `fixtures/models/*.json`, requests in
//! `fixtures/requests/*.toml`. Loaders panic with the offending path, which
//! is what a failing test wants to report.

use std::{fs, path::PathBuf};

use powercurve_engines::{FlightModel, Request};
use tracing_subscriber::EnvFilter;

fn fixture(dir: &str, name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(dir)
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|err| panic!("reading {}: {err}", path.display()))
}

/// Parses `fixtures/models/{name}.json`.
#[must_use]
pub fn flight_model(name: &str) -> FlightModel {
    let text = fixture("models", &format!("{name}.json"));
    FlightModel::from_json_str(&text).unwrap_or_else(|err| panic!("model {name}: {err}"))
}

/// The raw JSON of `fixtures/models/{name}.json`.
#[must_use]
pub fn flight_model_json(name: &str) -> serde_json::Value {
    let text = fixture("models", &format!("{name}.json"));
    serde_json::from_str(&text).unwrap_or_else(|err| panic!("model {name}: {err}"))
}

/// Parses `fixtures/requests/{name}.toml`.
#[must_use]
pub fn request(name: &str) -> Request {
    let text = fixture("requests", &format!("{name}.toml"));
    toml::from_str(&text).unwrap_or_else(|err| panic!("request {name}: {err}"))
}

/// Routes library logs to the test output, filtered by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
