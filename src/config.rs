use std::env;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;

use log::{info, warn};

use crate::optimizer::SolverOptions;
use crate::store::StaticStore;

/// Complete application configuration, loaded from environment variables or default values.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub solver: SolverConfig,
    pub store: StoreConfig,
}

impl AppConfig {
    /// Creates a configuration from the currently available environment variables.
    pub fn from_env() -> Self {
        Self {
            api: ApiConfig::from_env(),
            solver: SolverConfig::from_env(),
            store: StoreConfig::from_env(),
        }
    }
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    bind_ip: IpAddr,
    display_host: String,
    port: u16,
}

impl ApiConfig {
    const DEFAULT_HOST: &'static str = "0.0.0.0";
    const DEFAULT_PORT: u16 = 8080;

    fn from_env() -> Self {
        let host_value =
            env_string("BOXFIT_API_HOST").unwrap_or_else(|| Self::DEFAULT_HOST.to_string());
        let (bind_ip, effective_host) = match host_value.parse::<IpAddr>() {
            Ok(ip) => (ip, host_value),
            Err(err) => {
                warn!(
                    "Could not parse BOXFIT_API_HOST ('{}'): {}. Using {}.",
                    host_value,
                    err,
                    Self::DEFAULT_HOST
                );
                (
                    IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                    Self::DEFAULT_HOST.to_string(),
                )
            }
        };

        let port = match env_string("BOXFIT_API_PORT") {
            Some(raw) => match raw.parse::<u16>() {
                Ok(value) if value != 0 => value,
                Ok(_) => {
                    warn!(
                        "BOXFIT_API_PORT must not be 0. Using {}.",
                        Self::DEFAULT_PORT
                    );
                    Self::DEFAULT_PORT
                }
                Err(err) => {
                    warn!(
                        "Could not parse BOXFIT_API_PORT ('{}'): {}. Using {}.",
                        raw,
                        err,
                        Self::DEFAULT_PORT
                    );
                    Self::DEFAULT_PORT
                }
            },
            None => Self::DEFAULT_PORT,
        };

        Self {
            bind_ip,
            display_host: effective_host,
            port,
        }
    }

    /// Socket address to bind the server to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_ip, self.port)
    }

    /// Visible hostname for logging and hints.
    pub fn display_host(&self) -> &str {
        &self.display_host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Indicates whether binding to all interfaces.
    pub fn binds_to_all_interfaces(&self) -> bool {
        match self.bind_ip {
            IpAddr::V4(addr) => addr == Ipv4Addr::UNSPECIFIED,
            IpAddr::V6(addr) => addr == Ipv6Addr::UNSPECIFIED,
        }
    }

    /// Checks whether the hostname matches the default value.
    pub fn uses_default_host(&self) -> bool {
        self.display_host == Self::DEFAULT_HOST
    }
}

/// Default settings for recommendation runs. Requests may override each of them.
#[derive(Clone, Debug, Default)]
pub struct SolverConfig {
    options: SolverOptions,
}

impl SolverConfig {
    const MAX_ALTERNATES_VAR: &'static str = "BOXFIT_MAX_ALTERNATES";
    const ALLOW_CUT_DOWN_VAR: &'static str = "BOXFIT_ALLOW_CUT_DOWN";
    const ALLOW_TELESCOPING_VAR: &'static str = "BOXFIT_ALLOW_TELESCOPING";
    const MIN_OVERLAP_VAR: &'static str = "BOXFIT_TELESCOPING_MIN_OVERLAP";
    const FLAP_TOLERANCE_VAR: &'static str = "BOXFIT_FLAP_TOLERANCE";
    const MIN_CUT_EXCESS_VAR: &'static str = "BOXFIT_MIN_CUT_EXCESS";

    fn from_env() -> Self {
        let max_alternates = match env_string(Self::MAX_ALTERNATES_VAR) {
            Some(raw) => match raw.parse::<usize>() {
                Ok(value) => value,
                Err(err) => {
                    warn!(
                        "Could not parse {} ('{}') as count: {}. Using {}.",
                        Self::MAX_ALTERNATES_VAR,
                        raw,
                        err,
                        SolverOptions::DEFAULT_MAX_ALTERNATES
                    );
                    SolverOptions::DEFAULT_MAX_ALTERNATES
                }
            },
            None => SolverOptions::DEFAULT_MAX_ALTERNATES,
        };

        let allow_cut_down = env_string(Self::ALLOW_CUT_DOWN_VAR)
            .and_then(|raw| parse_bool(&raw, Self::ALLOW_CUT_DOWN_VAR))
            .unwrap_or(SolverOptions::DEFAULT_ALLOW_CUT_DOWN);

        let allow_telescoping = env_string(Self::ALLOW_TELESCOPING_VAR)
            .and_then(|raw| parse_bool(&raw, Self::ALLOW_TELESCOPING_VAR))
            .unwrap_or(SolverOptions::DEFAULT_ALLOW_TELESCOPING);

        let min_overlap = load_f64_with_warning(
            Self::MIN_OVERLAP_VAR,
            SolverOptions::DEFAULT_TELESCOPING_MIN_OVERLAP,
            |value| value > 0.0,
            "must be greater than 0",
            "Adjusted telescoping overlap changes seam strength",
        );

        let flap_tolerance = load_f64_with_warning(
            Self::FLAP_TOLERANCE_VAR,
            SolverOptions::DEFAULT_FLAP_TOLERANCE,
            |value| value >= 0.0,
            "must not be negative",
            "Adjusted flap tolerance changes cut-down heights",
        );

        let min_cut_excess = load_f64_with_warning(
            Self::MIN_CUT_EXCESS_VAR,
            SolverOptions::DEFAULT_MIN_CUT_EXCESS,
            |value| value > 0.0,
            "must be greater than 0",
            "Adjusted minimum cut may suggest impractically small cut-downs",
        );

        let options = SolverOptions::builder()
            .max_alternates(max_alternates)
            .allow_cut_down(allow_cut_down)
            .allow_telescoping(allow_telescoping)
            .telescoping_min_overlap(min_overlap)
            .flap_tolerance(flap_tolerance)
            .min_cut_excess(min_cut_excess)
            .build();

        Self { options }
    }

    /// Returns the configured SolverOptions.
    pub fn solver_options(&self) -> SolverOptions {
        self.options
    }
}

/// Where the inventory snapshot comes from.
#[derive(Clone, Debug, Default)]
pub struct StoreConfig {
    inventory_path: Option<PathBuf>,
}

impl StoreConfig {
    fn from_env() -> Self {
        Self {
            inventory_path: env_string("BOXFIT_INVENTORY_PATH").map(PathBuf::from),
        }
    }

    pub fn inventory_path(&self) -> Option<&PathBuf> {
        self.inventory_path.as_ref()
    }

    /// Loads the configured snapshot. A missing or broken file leaves the store empty
    /// so the service still answers requests that bring their own boxes.
    pub fn load_store(&self) -> StaticStore {
        let Some(path) = self.inventory_path() else {
            info!("No BOXFIT_INVENTORY_PATH set, starting with an empty inventory.");
            return StaticStore::default();
        };

        match StaticStore::load(path) {
            Ok(store) => {
                info!(
                    "Loaded {} boxes and {} guidelines from {}",
                    store.boxes.len(),
                    store.guidelines.len(),
                    path.display()
                );
                store
            }
            Err(err) => {
                warn!("{err}. Starting with an empty inventory.");
                StaticStore::default()
            }
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!("Access to {} failed: {}. Using default value.", name, err);
            None
        }
    }
}

fn parse_bool(raw: &str, var_name: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        other => {
            warn!(
                "Could not interpret {} ('{}') as boolean value. Using default value.",
                var_name, other
            );
            None
        }
    }
}

fn load_f64_with_warning(
    var_name: &str,
    default: f64,
    validator: impl Fn(f64) -> bool,
    invalid_hint: &str,
    notice: &str,
) -> f64 {
    match env_string(var_name) {
        Some(raw) => match raw.parse::<f64>() {
            Ok(value) => {
                if !value.is_finite() || !validator(value) {
                    warn!(
                        "{} contains invalid value '{}': {}. Using {}.",
                        var_name, raw, invalid_hint, default
                    );
                    default
                } else {
                    let tolerance = (default.abs().max(1.0)) * 1e-9;
                    if (value - default).abs() > tolerance {
                        warn!("{} ({} = {}).", notice, var_name, value);
                    }
                    value
                }
            }
            Err(err) => {
                warn!(
                    "Could not parse {} ('{}') as number: {}. Using {}.",
                    var_name, raw, err, default
                );
                default
            }
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_true_values() {
        for raw in ["1", "true", "yes", "y", "on", "TRUE", "Yes", " true ", "  1  "] {
            assert_eq!(parse_bool(raw, "TEST_VAR"), Some(true), "input {raw:?}");
        }
    }

    #[test]
    fn test_parse_bool_false_values() {
        for raw in ["0", "false", "no", "n", "off", "FALSE", "Off", " false "] {
            assert_eq!(parse_bool(raw, "TEST_VAR"), Some(false), "input {raw:?}");
        }
    }

    #[test]
    fn test_parse_bool_invalid_values() {
        assert_eq!(parse_bool("invalid", "TEST_VAR"), None);
        assert_eq!(parse_bool("2", "TEST_VAR"), None);
        assert_eq!(parse_bool("", "TEST_VAR"), None);
    }

    #[test]
    fn test_unset_float_uses_default() {
        let value = load_f64_with_warning(
            "BOXFIT_TEST_UNSET_FLOAT_VARIABLE",
            6.0,
            |v| v > 0.0,
            "must be greater than 0",
            "changed",
        );
        assert_eq!(value, 6.0);
    }

    #[test]
    fn test_default_solver_config_matches_solver_defaults() {
        assert_eq!(
            SolverConfig::default().solver_options(),
            SolverOptions::default()
        );
    }

    #[test]
    fn test_store_without_path_is_empty() {
        let store = StoreConfig::default().load_store();
        assert!(store.boxes.is_empty());
    }
}
