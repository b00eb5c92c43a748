//! Check configuration and layered harness settings.
//!
//! [`BaseConfiguration`] is the part shared by profile preparation and every
//! page check. [`CheckConfiguration`] adds the per-fixture URL and host
//! override and is what the engine receives. [`HarnessConfig`] is loaded with
//! figment from defaults, an optional TOML file and the environment.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format as _, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, Result};

/// Environment variable selecting the browser executable.
pub const BROWSER_ENV: &str = "BRAVE_BINARY";

/// Browser executable used when [`BROWSER_ENV`] is unset.
pub const DEFAULT_BROWSER_PATH: &str = "/usr/bin/brave";

/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "consent-fixtures.toml";

/// Prefix for environment overrides (`CONSENT_FIXTURES_SECONDS`, ...).
pub const ENV_PREFIX: &str = "CONSENT_FIXTURES_";

/// Identifiers of the filter lists the engine can toggle.
pub const ADBLOCK_LIST_IDS: [&str; 4] = [
    "eaokkjgnlhceblfhbhpeoebmfldocmnc",
    "adcocjohghhfpidemphmcmlmhnfgikei",
    "cdbbhgbmjhfnhnmgeddbliobbofkgdhe",
    "bfpgedeaaibpoidldhjcknekahbikncb",
];

const DEFAULT_CHECK_TIMEOUT_SECS: u64 = 120;

/// Enable map over the fixed set of adblock lists.
///
/// Always holds exactly the identifiers in [`ADBLOCK_LIST_IDS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, bool>", into = "BTreeMap<String, bool>")]
pub struct AdblockLists(BTreeMap<String, bool>);

impl AdblockLists {
    /// All lists disabled.
    #[must_use]
    pub fn all_disabled() -> Self {
        Self(
            ADBLOCK_LIST_IDS
                .iter()
                .map(|id| ((*id).to_string(), false))
                .collect(),
        )
    }

    /// Returns a copy with one list toggled.
    ///
    /// # Errors
    ///
    /// Returns `Config` if `id` is not one of [`ADBLOCK_LIST_IDS`].
    pub fn with(mut self, id: &str, enabled: bool) -> Result<Self> {
        if !ADBLOCK_LIST_IDS.contains(&id) {
            return Err(HarnessError::Config(format!("unknown adblock list '{id}'")));
        }
        self.0.insert(id.to_string(), enabled);
        Ok(self)
    }

    /// Whether the given list is enabled. Unknown ids are never enabled.
    #[must_use]
    pub fn is_enabled(&self, id: &str) -> bool {
        self.0.get(id).copied().unwrap_or(false)
    }

    /// Iterates `(id, enabled)` in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(id, enabled)| (id.as_str(), *enabled))
    }
}

impl Default for AdblockLists {
    fn default() -> Self {
        Self::all_disabled()
    }
}

impl TryFrom<BTreeMap<String, bool>> for AdblockLists {
    type Error = HarnessError;

    fn try_from(map: BTreeMap<String, bool>) -> Result<Self> {
        map.into_iter()
            .try_fold(Self::all_disabled(), |lists, (id, enabled)| {
                lists.with(&id, enabled)
            })
    }
}

impl From<AdblockLists> for BTreeMap<String, bool> {
    fn from(lists: AdblockLists) -> Self {
        lists.0
    }
}

/// Settings shared by profile preparation and every check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseConfiguration {
    /// Browser binary the engine launches.
    pub executable_path: PathBuf,
    /// Filter lists to enable in the shared profile.
    pub adblock_lists: AdblockLists,
    /// Engine time budget; 0 injects no artificial delay.
    pub seconds: u64,
    /// Block requests to non-HTTP(S) schemes.
    pub block_non_http_requests: bool,
}

impl BaseConfiguration {
    /// Merges in the per-fixture fields.
    #[must_use]
    pub fn for_page(
        &self,
        url: impl Into<String>,
        host_override: impl Into<String>,
    ) -> CheckConfiguration {
        CheckConfiguration {
            url: url.into(),
            host_override: host_override.into(),
            base: self.clone(),
        }
    }
}

impl Default for BaseConfiguration {
    fn default() -> Self {
        Self {
            executable_path: PathBuf::from(DEFAULT_BROWSER_PATH),
            adblock_lists: AdblockLists::default(),
            seconds: 0,
            block_non_http_requests: false,
        }
    }
}

/// Fully resolved input for one page check.
///
/// Serializes flat, with the field names the engine expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckConfiguration {
    /// Page to load.
    pub url: String,
    /// Host the engine should pretend the page was served from.
    pub host_override: String,
    /// Shared settings.
    #[serde(flatten)]
    pub base: BaseConfiguration,
}

/// How to launch the engine bridge process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineCommandConfig {
    /// Executable, e.g. `node`.
    pub program: String,
    /// Arguments placed before the `prepare` / `check` operation.
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for EngineCommandConfig {
    fn default() -> Self {
        Self {
            program: "node".to_string(),
            args: vec!["scripts/engine-bridge.mjs".to_string()],
        }
    }
}

/// Everything a run needs, loaded from layered sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Browser binary handed to the engine.
    pub executable_path: PathBuf,
    /// Engine time budget in seconds.
    pub seconds: u64,
    /// Block requests to non-HTTP(S) schemes.
    pub block_non_http_requests: bool,
    /// Filter lists to enable.
    pub adblock_lists: AdblockLists,
    /// Directory holding one sub-directory per fixture.
    pub fixtures_root: PathBuf,
    /// Worker budget override; the host-derived budget when unset.
    pub jobs: Option<usize>,
    /// Per-check deadline in seconds; 0 disables it.
    pub check_timeout_secs: u64,
    /// Engine bridge command.
    pub engine: EngineCommandConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            executable_path: PathBuf::from(DEFAULT_BROWSER_PATH),
            seconds: 0,
            block_non_http_requests: false,
            adblock_lists: AdblockLists::default(),
            fixtures_root: PathBuf::from("tests/data"),
            jobs: None,
            check_timeout_secs: DEFAULT_CHECK_TIMEOUT_SECS,
            engine: EngineCommandConfig::default(),
        }
    }
}

impl HarnessConfig {
    /// Loads configuration from multiple sources.
    /// Priority: `BRAVE_BINARY` > `CONSENT_FIXTURES_*` > config file > defaults
    ///
    /// Without an explicit `config_path`, `consent-fixtures.toml` in the
    /// working directory is used if it exists.
    ///
    /// # Errors
    ///
    /// Returns `Config` if a source cannot be parsed or validation fails.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = config_path.filter(|p| !p.exists()) {
            return Err(HarnessError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }

        let config: Self = Self::figment(config_path).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// The layered figment behind [`HarnessConfig::load`].
    #[must_use]
    pub fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        let config_file = config_path.map(Path::to_path_buf).or_else(|| {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            default_path.exists().then(|| default_path.to_path_buf())
        });

        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let browser = std::env::var(BROWSER_ENV).ok().filter(|b| !b.is_empty());
        if let Some(browser) = browser {
            figment = figment.merge(Serialized::default("executable_path", browser));
        }

        figment
    }

    /// Rejects values no run can use.
    ///
    /// # Errors
    ///
    /// Returns `Config` describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.jobs == Some(0) {
            return Err(HarnessError::Config("jobs must be at least 1".to_string()));
        }
        if self.engine.program.trim().is_empty() {
            return Err(HarnessError::Config("engine program is empty".to_string()));
        }
        Ok(())
    }

    /// The shared part of every check configuration.
    #[must_use]
    pub fn base(&self) -> BaseConfiguration {
        BaseConfiguration {
            executable_path: self.executable_path.clone(),
            adblock_lists: self.adblock_lists.clone(),
            seconds: self.seconds,
            block_non_http_requests: self.block_non_http_requests,
        }
    }

    /// Per-check deadline, `None` when disabled.
    #[must_use]
    pub fn check_timeout(&self) -> Option<Duration> {
        (self.check_timeout_secs > 0).then(|| Duration::from_secs(self.check_timeout_secs))
    }

    /// The fixtures root made absolute against the working directory.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the working directory cannot be read.
    pub fn absolute_fixtures_root(&self) -> Result<PathBuf> {
        Ok(std::path::absolute(&self.fixtures_root)?)
    }
}
