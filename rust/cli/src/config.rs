use serde::{Deserialize, Serialize};
use std::fs;
use std::str::FromStr;

use tablelog_engine::errors::HandError;
use tablelog_engine::seats::{Position, TableSize};
use tablelog_engine::session::SessionConfig;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub table_size: u8,
    pub small_blind: u32,
    pub big_blind: u32,
    pub starting_stack: u32,
    pub hero: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigSources {
    pub table_size: ValueSource,
    pub small_blind: ValueSource,
    pub big_blind: ValueSource,
    pub starting_stack: ValueSource,
    pub hero: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            table_size: ValueSource::Default,
            small_blind: ValueSource::Default,
            big_blind: ValueSource::Default,
            starting_stack: ValueSource::Default,
            hero: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: Config,
    pub sources: ConfigSources,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            table_size: 6,
            small_blind: 5,
            big_blind: 10,
            starting_stack: 1_000,
            hero: None,
        }
    }
}

impl Config {
    pub fn table(&self) -> Result<TableSize, ConfigError> {
        TableSize::from_seats(self.table_size).map_err(invalid)
    }

    pub fn hero_seat(&self) -> Result<Option<Position>, ConfigError> {
        self.hero
            .as_deref()
            .map(|h| h.parse::<Position>())
            .transpose()
            .map_err(invalid)
    }

    /// Every seat of the table with `starting_stack` chips.
    pub fn session_config(&self) -> Result<SessionConfig, ConfigError> {
        let mut session = SessionConfig::new(self.table()?, self.small_blind, self.big_blind)
            .with_uniform_stacks(self.starting_stack);
        session.hero = self.hero_seat()?;
        Ok(session)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "cannot parse config file: {}", e),
            ConfigError::Invalid(msg) => f.write_str(msg),
        }
    }
}

/// Defaults, then the TOML file named by `TABLELOG_CONFIG`, then `TABLELOG_*`
/// variables. The merged result is validated before it is returned.
pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    let mut cfg = Config::default();
    let mut sources = ConfigSources::default();

    if let Ok(path) = std::env::var("TABLELOG_CONFIG")
        && !path.is_empty()
    {
        let s = fs::read_to_string(path)?;
        let f: FileConfig = toml::from_str(&s)?;
        file_value(f.table_size, &mut cfg.table_size, &mut sources.table_size);
        file_value(f.small_blind, &mut cfg.small_blind, &mut sources.small_blind);
        file_value(f.big_blind, &mut cfg.big_blind, &mut sources.big_blind);
        file_value(f.starting_stack, &mut cfg.starting_stack, &mut sources.starting_stack);
        file_value(f.hero.map(Some), &mut cfg.hero, &mut sources.hero);
    }

    env_override("TABLELOG_TABLE_SIZE", "table size", &mut cfg.table_size, &mut sources.table_size)?;
    env_override("TABLELOG_SMALL_BLIND", "small blind", &mut cfg.small_blind, &mut sources.small_blind)?;
    env_override("TABLELOG_BIG_BLIND", "big blind", &mut cfg.big_blind, &mut sources.big_blind)?;
    env_override(
        "TABLELOG_STARTING_STACK",
        "starting stack",
        &mut cfg.starting_stack,
        &mut sources.starting_stack,
    )?;
    if let Ok(hero) = std::env::var("TABLELOG_HERO")
        && !hero.is_empty()
    {
        cfg.hero = Some(hero);
        sources.hero = ValueSource::Env;
    }

    validate(&cfg)?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

fn file_value<T>(value: Option<T>, slot: &mut T, source: &mut ValueSource) {
    if let Some(v) = value {
        *slot = v;
        *source = ValueSource::File;
    }
}

/// Replaces `slot` when `key` is set and non-empty.
fn env_override<T: FromStr>(
    key: &str,
    what: &str,
    slot: &mut T,
    source: &mut ValueSource,
) -> Result<(), ConfigError> {
    if let Ok(raw) = std::env::var(key)
        && !raw.is_empty()
    {
        *slot = raw
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("Invalid {} in {}: {}", what, key, raw)))?;
        *source = ValueSource::Env;
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct FileConfig {
    #[serde(default)]
    table_size: Option<u8>,
    #[serde(default)]
    small_blind: Option<u32>,
    #[serde(default)]
    big_blind: Option<u32>,
    #[serde(default)]
    starting_stack: Option<u32>,
    #[serde(default)]
    hero: Option<String>,
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.starting_stack == 0 {
        return Err(ConfigError::Invalid("starting_stack must be >0".into()));
    }
    cfg.session_config()?.validate().map_err(invalid)
}

fn invalid(e: HandError) -> ConfigError {
    match e {
        HandError::InvalidConfig(msg) => ConfigError::Invalid(msg),
        other => ConfigError::Invalid(other.to_string()),
    }
}
