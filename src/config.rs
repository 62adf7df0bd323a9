//! Numinterp global configuration options.

use std::sync::{OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Global configuration options for the numinterp crate.
///
/// Retrieve the global [`Config`] with [`global_config`] and modify it with [`global_config_mut`].
///
/// ## Parallel Conversion Threshold
/// > default: `65536`
///
/// The number of elements above which a single [`fill`](crate::interpretation::TypedView::fill) converts elements on the rayon thread pool.
/// Chunks are always filled sequentially; this only splits the element conversion within one fill.
/// Parallel conversion is disabled if set to zero.
///
/// ## Strict Ranges
/// > default: [`true`]
///
/// If enabled, entry and group ranges that extend beyond the available groups (in `read_chunk`, `clip_destination`, and [`slice_groups`](crate::array::TypedArray::slice_groups)) are an error.
/// Otherwise, such ranges are clamped to the available groups, like sequence slicing.
#[derive(Debug)]
pub struct Config {
    parallel_conversion_threshold: usize,
    strict_ranges: bool,
}

#[allow(clippy::derivable_impls)]
impl Default for Config {
    fn default() -> Self {
        Config {
            parallel_conversion_threshold: 65536,
            strict_ranges: true,
        }
    }
}

impl Config {
    /// Get the [parallel conversion threshold](#parallel-conversion-threshold) configuration.
    #[must_use]
    pub fn parallel_conversion_threshold(&self) -> usize {
        self.parallel_conversion_threshold
    }

    /// Set the [parallel conversion threshold](#parallel-conversion-threshold) configuration.
    pub fn set_parallel_conversion_threshold(&mut self, threshold: usize) {
        self.parallel_conversion_threshold = threshold;
    }

    /// Get the [strict ranges](#strict-ranges) configuration.
    #[must_use]
    pub fn strict_ranges(&self) -> bool {
        self.strict_ranges
    }

    /// Set the [strict ranges](#strict-ranges) configuration.
    pub fn set_strict_ranges(&mut self, strict_ranges: bool) {
        self.strict_ranges = strict_ranges;
    }
}

static CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();

/// Returns a reference to the global numinterp configuration.
///
/// # Panics
/// This function panics if the underlying lock has been poisoned and might panic if the global config is already held by the current thread.
pub fn global_config() -> RwLockReadGuard<'static, Config> {
    CONFIG
        .get_or_init(|| RwLock::new(Config::default()))
        .read()
        .unwrap()
}

/// Returns a mutable reference to the global numinterp configuration.
///
/// # Panics
/// This function panics if the underlying lock has been poisoned and might panic if the global config is already held by the current thread.
pub fn global_config_mut() -> RwLockWriteGuard<'static, Config> {
    CONFIG
        .get_or_init(|| RwLock::new(Config::default()))
        .write()
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_parallel_conversion_threshold() {
        let threshold = global_config().parallel_conversion_threshold();
        global_config_mut().set_parallel_conversion_threshold(123);
        assert_eq!(global_config().parallel_conversion_threshold(), 123);
        global_config_mut().set_parallel_conversion_threshold(threshold);
    }

    #[test]
    fn config_default() {
        let config = Config::default();
        assert!(config.strict_ranges());
        assert_eq!(config.parallel_conversion_threshold(), 65536);
    }
}
