use crate::config::{GeneratorConfig, RetryPolicy};
use crate::error::{GenError, Result};
use crate::manifest::Icon;
use crate::svg_normalizer::{has_root_element, Normalizer};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Source of remote bytes
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Blocking HTTP downloads
///
/// Error statuses are not treated as failures: the body is returned as is and
/// the caller's validation rejects it.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("svg2elm/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| GenError::Http {
                url: String::new(),
                source,
            })?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let http_err = |source: reqwest::Error| GenError::Http {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().map_err(http_err)?;
        if !response.status().is_success() {
            warn!(%url, status = %response.status(), "non-success response");
        }

        Ok(response.bytes().map_err(http_err)?.to_vec())
    }
}

/// Blocking pause between repair attempts
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// On-disk cache of raw SVG assets keyed by family, version and name
pub struct IconCache<'a> {
    config: &'a GeneratorConfig,
    fetcher: &'a dyn Fetcher,
    sleeper: &'a dyn Sleeper,
}

impl<'a> IconCache<'a> {
    pub fn new(
        config: &'a GeneratorConfig,
        fetcher: &'a dyn Fetcher,
        sleeper: &'a dyn Sleeper,
    ) -> Self {
        Self {
            config,
            fetcher,
            sleeper,
        }
    }

    /// Where the asset for this identity is stored
    pub fn path_for(&self, family: &str, icon: &Icon) -> PathBuf {
        self.config
            .paths
            .icons_dir()
            .join(family)
            .join(format!("v{}-{}.svg", icon.version, icon.name))
    }

    /// Make sure the asset is on disk, downloading it when missing or forced
    pub fn fetch(&self, family: &str, icon: &Icon, force: bool) -> Result<PathBuf> {
        let path = self.path_for(family, icon);

        if force || !path.exists() {
            let url = self.config.asset_url(family, &icon.name, icon.version);
            debug!(%url, force, "downloading icon");

            let bytes = self.fetcher.fetch(&url)?;
            write_file(&path, &bytes)?;
        }

        Ok(path)
    }

    /// Fetch, validate and normalize an icon, repairing corrupt downloads
    pub fn confirm(&self, family: &str, icon: &Icon, normalizer: &Normalizer) -> Result<String> {
        let RetryPolicy {
            max_attempts,
            delay,
        } = self.config.retry;

        let mut path = self.fetch(family, icon, false)?;
        let mut attempts = 0u32;

        loop {
            let svg = normalizer.normalize(&read_lossy(&path)?);
            if has_root_element(&svg) {
                return Ok(svg);
            }

            if max_attempts.is_some_and(|max| attempts >= max) {
                return Err(GenError::RetriesExhausted {
                    name: icon.name.clone(),
                    attempts,
                });
            }

            warn!(
                icon = %icon.name,
                family,
                "download failed, waiting {}s before fetching again",
                delay.as_secs()
            );
            self.sleeper.sleep(delay);

            attempts += 1;
            path = self.fetch(family, icon, true)?;
        }
    }
}

fn read_lossy(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| GenError::io(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| GenError::io(parent, e))?;
    }
    std::fs::write(path, bytes).map_err(|e| GenError::io(path, e))
}
