use std::{path::PathBuf, str::FromStr, time::Duration};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8765;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Invalid value {value:?} for {var}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    /// `None` disables websocket pings and the idle timeout.
    pub heartbeat: Option<HeartbeatSettings>,
}

#[derive(Debug, Clone)]
pub struct ApplicationSettings {
    pub port: u16,
    pub host: String,
    /// Client assets served at `/`.
    pub static_dir: Option<PathBuf>,
}

/// Transport keep-alive for websocket sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatSettings {
    /// How often heartbeat pings are sent
    pub interval: Duration,
    /// How long before lack of client response causes a timeout
    pub client_timeout: Duration,
}

impl Default for HeartbeatSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            client_timeout: Duration::from_secs(10),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            application: ApplicationSettings {
                port: DEFAULT_PORT,
                host: DEFAULT_HOST.to_string(),
                static_dir: None,
            },
            heartbeat: Some(HeartbeatSettings::default()),
        }
    }
}

impl Settings {
    /// Reads `RELAY_*` variables from the environment, after loading `.env`
    /// if there is one.
    pub fn from_env() -> Result<Self, SettingsError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();
        let heartbeat = HeartbeatSettings::default();

        let host = lookup("RELAY_HOST").unwrap_or(defaults.application.host);
        let port = parse(&lookup, "RELAY_PORT")?.unwrap_or(DEFAULT_PORT);
        let static_dir = lookup("RELAY_STATIC_DIR")
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from);

        let interval = parse(&lookup, "RELAY_HEARTBEAT_INTERVAL_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(heartbeat.interval);
        let client_timeout = parse(&lookup, "RELAY_CLIENT_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(heartbeat.client_timeout);
        let heartbeat = if interval.is_zero() {
            None
        } else {
            // a peer must get at least one ping before it can time out
            if client_timeout <= interval {
                return Err(SettingsError::Invalid {
                    var: "RELAY_CLIENT_TIMEOUT_SECS",
                    value: client_timeout.as_secs().to_string(),
                });
            }
            Some(HeartbeatSettings {
                interval,
                client_timeout,
            })
        };

        Ok(Self {
            application: ApplicationSettings {
                port,
                host,
                static_dir,
            },
            heartbeat,
        })
    }
}

fn parse<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, SettingsError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| SettingsError::Invalid { var, value }),
    }
}
