use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use busnav_core::loading::{NetworkSources, create_city_graph};
use busnav_core::persistence::{load_city_graph, save_city_graph};
use busnav_core::{CityGraph, CityGraphConfig, Error, RoutePlanner, RoutingConfig};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::ServerConfig;

#[derive(Debug, Clone)]
pub struct AppState {
    pub planner: RoutePlanner,
}

impl AppState {
    pub fn new(city: CityGraph, routing: RoutingConfig) -> Self {
        Self {
            planner: RoutePlanner::new(city, routing),
        }
    }

    /// Reads the cached city graph when it was built from the current inputs
    /// and `[city]` settings, otherwise builds it from the CSV files and
    /// rewrites the cache. Blocking.
    pub fn load(config: &ServerConfig) -> Result<Self, Error> {
        let routing = RoutingConfig::from(&config.city);
        let stamp = CacheStamp::new(&config.data.sources, config.city);

        if let Some(cache) = &config.data.cache
            && cache.exists()
        {
            match &stamp {
                Ok(stamp) if stamp.matches(cache) => match load_city_graph(cache) {
                    Ok(city) => {
                        info!(path = %cache.display(), "using cached city graph");
                        return Ok(Self::new(city, routing));
                    }
                    Err(e) => {
                        warn!(path = %cache.display(), error = %e, "ignoring unreadable cache");
                    }
                },
                Ok(_) => info!(path = %cache.display(), "city graph cache is stale, rebuilding"),
                Err(e) => warn!(error = %e, "cannot fingerprint network inputs"),
            }
        }

        let city = create_city_graph(&config.data.sources, &config.city)?;
        if let Some(cache) = &config.data.cache {
            if let Err(e) = save_city_graph(&city, cache) {
                warn!(path = %cache.display(), error = %e, "could not write city graph cache");
            } else if let Ok(stamp) = &stamp
                && let Err(e) = stamp.write(cache)
            {
                warn!(path = %cache.display(), error = %e, "could not write cache stamp");
            }
        }

        Ok(Self::new(city, routing))
    }
}

/// Build settings and input file fingerprints a cached graph was made from,
/// kept in a sidecar file next to the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CacheStamp {
    city: CityGraphConfig,
    sources: Vec<SourceStamp>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SourceStamp {
    path: PathBuf,
    len: u64,
    modified_secs: u64,
    modified_nanos: u32,
}

impl SourceStamp {
    fn of(path: &Path) -> Result<Self, Error> {
        let metadata = fs::metadata(path)?;
        let modified = metadata
            .modified()?
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Ok(Self {
            path: path.to_path_buf(),
            len: metadata.len(),
            modified_secs: modified.as_secs(),
            modified_nanos: modified.subsec_nanos(),
        })
    }
}

impl CacheStamp {
    fn new(sources: &NetworkSources, city: CityGraphConfig) -> Result<Self, Error> {
        let sources = [
            &sources.street_nodes,
            &sources.street_edges,
            &sources.stops,
            &sources.line_stops,
        ]
        .into_iter()
        .map(|path| SourceStamp::of(path.as_path()))
        .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { city, sources })
    }

    fn path_for(cache: &Path) -> PathBuf {
        let mut name = cache.as_os_str().to_owned();
        name.push(".stamp");
        PathBuf::from(name)
    }

    /// True when the sidecar of `cache` records exactly this stamp
    fn matches(&self, cache: &Path) -> bool {
        fs::read(Self::path_for(cache))
            .ok()
            .and_then(|bytes| serde_json::from_slice::<Self>(&bytes).ok())
            .is_some_and(|recorded| recorded == *self)
    }

    fn write(&self, cache: &Path) -> Result<(), Error> {
        let bytes = serde_json::to_vec_pretty(self).map_err(|e| Error::SerializationType {
            expected: "cache stamp",
            reason: e.to_string(),
        })?;
        fs::write(Self::path_for(cache), bytes)?;
        Ok(())
    }
}
