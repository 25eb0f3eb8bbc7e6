use std::sync::Arc;

use lacuna_core::{
    CoveragePolicy, LacunaConfig, LacunaError, LoadStrategy, TimeframeLoader,
    TimeframeSynchronizer,
};

/// Loads one symbol at several timeframes and hands the aligned result back.
///
/// The coordinator owns no data; it drives an injected [`TimeframeLoader`] and
/// [`TimeframeSynchronizer`] and enforces the coverage floors in between.
pub struct MultiTimeframeCoordinator {
    pub(crate) loader: Arc<dyn TimeframeLoader>,
    pub(crate) synchronizer: Arc<dyn TimeframeSynchronizer>,
    pub(crate) coverage: CoveragePolicy,
    pub(crate) strategy: LoadStrategy,
}

/// Builder for a [`MultiTimeframeCoordinator`].
pub struct MultiTimeframeCoordinatorBuilder {
    loader: Option<Arc<dyn TimeframeLoader>>,
    synchronizer: Option<Arc<dyn TimeframeSynchronizer>>,
    coverage: CoveragePolicy,
    strategy: LoadStrategy,
}

impl Default for MultiTimeframeCoordinatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiTimeframeCoordinatorBuilder {
    /// Create a builder with default coverage floors and sequential loading.
    ///
    /// A loader and a synchronizer must be supplied before [`Self::build`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            loader: None,
            synchronizer: None,
            coverage: CoveragePolicy::default(),
            strategy: LoadStrategy::default(),
        }
    }

    /// Source of per-timeframe series.
    #[must_use]
    pub fn loader(mut self, loader: Arc<dyn TimeframeLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Aligner applied once all loads finish.
    #[must_use]
    pub fn synchronizer(mut self, synchronizer: Arc<dyn TimeframeSynchronizer>) -> Self {
        self.synchronizer = Some(synchronizer);
        self
    }

    /// Minimum bars and days the common window must span.
    #[must_use]
    pub const fn coverage_policy(mut self, policy: CoveragePolicy) -> Self {
        self.coverage = policy;
        self
    }

    /// Whether loads run one after another or all at once.
    ///
    /// Behavior and trade-offs:
    /// - `Sequential` stops issuing loads as soon as the token is cancelled and
    ///   advances progress as each load finishes.
    /// - `Concurrent` lowers wall-clock latency but checks cancellation only once
    ///   before fanning out; loaders must honor the token themselves.
    #[must_use]
    pub const fn load_strategy(mut self, strategy: LoadStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Apply the coordinator-relevant parts of a workspace config.
    #[must_use]
    pub const fn config(mut self, cfg: &LacunaConfig) -> Self {
        self.coverage = cfg.coverage;
        self.strategy = cfg.load_strategy;
        self
    }

    /// Build the coordinator.
    ///
    /// # Errors
    /// Returns `InvalidArg` if the loader or the synchronizer is missing.
    pub fn build(self) -> Result<MultiTimeframeCoordinator, LacunaError> {
        let loader = self.loader.ok_or_else(|| {
            LacunaError::invalid_arg("no loader configured; add one via loader(...)")
        })?;
        let synchronizer = self.synchronizer.ok_or_else(|| {
            LacunaError::invalid_arg("no synchronizer configured; add one via synchronizer(...)")
        })?;
        Ok(MultiTimeframeCoordinator {
            loader,
            synchronizer,
            coverage: self.coverage,
            strategy: self.strategy,
        })
    }
}

impl MultiTimeframeCoordinator {
    /// Start building a new coordinator.
    #[must_use]
    pub fn builder() -> MultiTimeframeCoordinatorBuilder {
        MultiTimeframeCoordinatorBuilder::new()
    }

    /// Coverage floors in effect.
    #[must_use]
    pub const fn coverage_policy(&self) -> CoveragePolicy {
        self.coverage
    }

    /// Load strategy in effect.
    #[must_use]
    pub const fn load_strategy(&self) -> LoadStrategy {
        self.strategy
    }
}
