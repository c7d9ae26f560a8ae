//! Test utilities & fixtures.
//! Builds deterministic contexts over the seed data shipped in `data/seeds`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tickforge::config::Config;
use tickforge::world::{Catalog, GameContext};

/// Return the path to the default seed directory.
pub fn seeds_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join("seeds")
}

/// Default configuration with a fixed RNG seed.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.engine.rng_seed = Some(42);
    config
}

pub fn catalog() -> Arc<Catalog> {
    Arc::new(Catalog::embedded().expect("embedded catalog"))
}

#[allow(dead_code)] // not every test binary builds a bare context
pub fn test_context(config: &Config) -> GameContext {
    GameContext::new(config, catalog())
}

/// Return a writable copy (temp dir) of the seed files.
#[allow(dead_code)]
pub fn writable_seeds() -> tempfile::TempDir {
    let tmp = tempfile::tempdir().expect("tempdir");
    for file in ["items.json", "recipes.json", "gathers.json"] {
        std::fs::copy(seeds_root().join(file), tmp.path().join(file)).unwrap();
    }
    tmp
}
