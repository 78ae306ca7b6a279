//! Simulation configuration adapter
//!
//! The image reader never parses simulation input files itself. It asks a
//! [`SimulationConfig`] for named point lists (sources, receivers) and for the
//! quantity kind implied by the source time function.

use crate::error::{FormatError, Result};
use crate::mode::QuantityKind;
use crate::types::Point3;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Lookup interface over a parsed simulation configuration
pub trait SimulationConfig: Send + Sync {
    /// All points stored under `key` (e.g. `"source"`, `"rec"`)
    fn coordinates(&self, key: &str) -> Vec<Point3>;

    /// Quantity kind implied by the configured source time function
    fn source_time_function_type(&self) -> Option<QuantityKind>;
}

/// Quantity kind produced by a named source time function
pub fn time_function_kind(name: &str) -> Option<QuantityKind> {
    match name {
        "GaussianInt" | "RickerInt" | "Brune" | "BruneSmoothed" | "Liu" | "Ramp" => {
            Some(QuantityKind::Displacement)
        }
        "Gaussian" | "Ricker" | "Triangle" | "Sawtooth" | "Smoothwave" | "VerySmoothBump"
        | "GaussianWindow" | "C6SmoothBump" | "Dirac" | "DBrune" => {
            Some(QuantityKind::Velocity)
        }
        _ => None,
    }
}

/// Pick the quantity kind for an image
///
/// A kind declared by the configuration takes precedence over an explicit
/// argument; a disagreement is logged, not returned as an error.
pub fn resolve_quantity_kind(
    explicit: Option<QuantityKind>,
    config: Option<&dyn SimulationConfig>,
) -> Result<QuantityKind> {
    let declared = config.and_then(|c| c.source_time_function_type());
    match (explicit, declared) {
        (Some(requested), Some(found)) if requested != found => {
            warn!(
                "Overriding requested source time function type ({}) with the one found in the configuration ({})",
                requested, found
            );
            Ok(found)
        }
        (_, Some(found)) => Ok(found),
        (Some(requested), None) => Ok(requested),
        (None, None) => Err(FormatError::UnknownQuantityKind(
            "no source time function type given or configured".to_string(),
        )),
    }
}

/// One configured point, optionally tagged with a source time function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub time_function: Option<String>,
}

impl ConfigEntry {
    pub fn point(&self) -> Point3 {
        Point3::new(self.x, self.y, self.z)
    }
}

impl From<Point3> for ConfigEntry {
    fn from(p: Point3) -> Self {
        Self {
            x: p.x,
            y: p.y,
            z: p.z,
            time_function: None,
        }
    }
}

/// In-memory configuration, loadable from JSON
///
/// ```json
/// {
///   "source": [{"x": 1000.0, "y": 2000.0, "z": 500.0, "type": "Gaussian"}],
///   "rec": [{"x": 0.0, "y": 0.0, "z": 0.0}]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticConfig {
    entries: HashMap<String, Vec<ConfigEntry>>,
}

impl StaticConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON configuration file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        Self::from_json_str(&text)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Append untagged points under `key`
    pub fn insert(&mut self, key: impl Into<String>, points: Vec<Point3>) {
        self.entries
            .entry(key.into())
            .or_default()
            .extend(points.into_iter().map(ConfigEntry::from));
    }

    /// Append a source with its time function name
    pub fn add_source(&mut self, point: Point3, time_function: impl Into<String>) {
        let mut entry = ConfigEntry::from(point);
        entry.time_function = Some(time_function.into());
        self.entries.entry("source".to_string()).or_default().push(entry);
    }

    pub fn entries(&self, key: &str) -> &[ConfigEntry] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl SimulationConfig for StaticConfig {
    fn coordinates(&self, key: &str) -> Vec<Point3> {
        self.entries(key).iter().map(ConfigEntry::point).collect()
    }

    fn source_time_function_type(&self) -> Option<QuantityKind> {
        self.entries("source")
            .first()
            .and_then(|source| source.time_function.as_deref())
            .and_then(time_function_kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::io::Write;
    use std::sync::{Arc, OnceLock};

    struct CaptureLog(Arc<Mutex<Vec<u8>>>);

    impl Write for CaptureLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Warnings logged so far by this test binary
    fn captured_warnings() -> String {
        static LOG: OnceLock<Arc<Mutex<Vec<u8>>>> = OnceLock::new();
        let buf = LOG.get_or_init(|| {
            let buf = Arc::new(Mutex::new(Vec::new()));
            let _ = env_logger::builder()
                .is_test(true)
                .filter_level(log::LevelFilter::Warn)
                .target(env_logger::Target::Pipe(Box::new(CaptureLog(buf.clone()))))
                .try_init();
            buf
        });
        String::from_utf8_lossy(&buf.lock()).into_owned()
    }

    #[test]
    fn test_time_function_kinds() {
        assert_eq!(time_function_kind("GaussianInt"), Some(QuantityKind::Displacement));
        assert_eq!(time_function_kind("Ricker"), Some(QuantityKind::Velocity));
        assert_eq!(time_function_kind("DBrune"), Some(QuantityKind::Velocity));
        assert_eq!(time_function_kind("Unknown"), None);
    }

    #[test]
    fn test_parse_json() {
        let config = StaticConfig::from_json_str(
            r#"{
                "source": [{"x": 1.0, "y": 2.0, "z": 3.0, "type": "RickerInt"}],
                "rec": [{"x": 4.0, "y": 5.0, "z": 6.0}, {"x": 7.0, "y": 8.0, "z": 9.0}]
            }"#,
        )
        .unwrap();

        assert_eq!(config.coordinates("rec").len(), 2);
        assert_eq!(config.coordinates("source"), vec![Point3::new(1.0, 2.0, 3.0)]);
        assert!(config.coordinates("missing").is_empty());
        assert_eq!(
            config.source_time_function_type(),
            Some(QuantityKind::Displacement)
        );

        let again = StaticConfig::from_json_str(&config.to_json().unwrap()).unwrap();
        assert_eq!(again, config);
    }

    #[test]
    fn test_bad_json_is_configuration_error() {
        let err = StaticConfig::from_json_str("{\"source\": 3}").unwrap_err();
        assert!(matches!(err, FormatError::Configuration(_)));
    }

    #[test]
    fn test_override_is_logged() {
        captured_warnings();

        let mut config = StaticConfig::new();
        config.add_source(Point3::new(0.0, 0.0, 0.0), "Ricker");
        let kind = resolve_quantity_kind(Some(QuantityKind::Displacement), Some(&config)).unwrap();
        assert_eq!(kind, QuantityKind::Velocity);

        let log = captured_warnings();
        let line = log
            .lines()
            .find(|line| line.contains("Overriding requested source time function type"))
            .expect("override warning");
        assert!(line.contains("WARN"));
        assert!(line.contains("(displacement)"));
        assert!(line.contains("(velocity)"));
    }

    #[test]
    fn test_resolution_precedence() {
        let mut config = StaticConfig::new();
        config.add_source(Point3::new(0.0, 0.0, 0.0), "Gaussian");

        // configuration wins over a disagreeing argument
        assert_eq!(
            resolve_quantity_kind(Some(QuantityKind::Displacement), Some(&config)).unwrap(),
            QuantityKind::Velocity
        );
        assert_eq!(
            resolve_quantity_kind(None, Some(&config)).unwrap(),
            QuantityKind::Velocity
        );
        assert_eq!(
            resolve_quantity_kind(Some(QuantityKind::Displacement), None).unwrap(),
            QuantityKind::Displacement
        );

        // a configuration without a usable source defers to the argument
        let empty = StaticConfig::new();
        assert_eq!(
            resolve_quantity_kind(Some(QuantityKind::Velocity), Some(&empty)).unwrap(),
            QuantityKind::Velocity
        );
        assert!(matches!(
            resolve_quantity_kind(None, Some(&empty)),
            Err(FormatError::UnknownQuantityKind(_))
        ));
    }
}
