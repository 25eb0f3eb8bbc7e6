//! Learned duration estimates for repeated operations.
//!
//! Each completed operation is recorded under a key derived from its type and,
//! when the context carries a numeric `data_points`, a size bucket. Estimates are
//! a weighted mean of the last few samples in which newer and fresher samples
//! count more. History survives restarts through a small JSON cache file.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use lacuna_core::EstimationPolicy;

const CACHE_VERSION: u32 = 1;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// One completed operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationHistoryRecord {
    /// Wall-clock duration in seconds.
    pub duration_seconds: f64,
    /// When the operation completed.
    pub timestamp: DateTime<Utc>,
    /// Context the operation was recorded with.
    #[serde(default)]
    pub context: Value,
}

type History = BTreeMap<String, VecDeque<OperationHistoryRecord>>;
type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Serialize, Deserialize)]
struct CacheDocument {
    version: u32,
    history: History,
}

/// Records operation durations and predicts future ones.
///
/// All methods take `&self`; an internal mutex serializes the
/// load-mutate-save cycle so one engine can be shared across tasks.
pub struct TimeEstimationEngine {
    cache_path: Option<PathBuf>,
    policy: EstimationPolicy,
    clock: Clock,
    history: Mutex<History>,
}

impl fmt::Debug for TimeEstimationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeEstimationEngine")
            .field("cache_path", &self.cache_path)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl TimeEstimationEngine {
    /// Engine with default policy, loading history from `cache_path` if given.
    ///
    /// A missing, unreadable or incompatible cache file yields empty history.
    #[must_use]
    pub fn new(cache_path: Option<PathBuf>) -> Self {
        Self::with_policy(cache_path, EstimationPolicy::default())
    }

    /// Engine with an explicit policy.
    #[must_use]
    pub fn with_policy(cache_path: Option<PathBuf>, policy: EstimationPolicy) -> Self {
        let history = cache_path
            .as_deref()
            .map(|path| load_cache(path, policy.max_history))
            .unwrap_or_default();
        Self {
            cache_path,
            policy,
            clock: Arc::new(Utc::now),
            history: Mutex::new(history),
        }
    }

    /// Replace the wall clock used for timestamps and record ages.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Cache file backing this engine, if any.
    #[must_use]
    pub fn cache_path(&self) -> Option<&Path> {
        self.cache_path.as_deref()
    }

    fn lock(&self) -> MutexGuard<'_, History> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn history_key(&self, operation_type: &str, context: &Value) -> String {
        let Some(points) = context.get("data_points").and_then(Value::as_f64) else {
            return operation_type.to_string();
        };
        let bucket = if points < self.policy.small_max_points as f64 {
            "small"
        } else if points < self.policy.medium_max_points as f64 {
            "medium"
        } else {
            "large"
        };
        format!("{operation_type}_{bucket}")
    }

    /// Record a completed operation and persist the history.
    ///
    /// Non-positive or non-finite durations are ignored. Only the most recent
    /// `max_history` records per key are kept.
    pub fn record_operation_completion(
        &self,
        operation_type: &str,
        context: &Value,
        duration_seconds: f64,
    ) {
        if !duration_seconds.is_finite() || duration_seconds <= 0.0 {
            return;
        }
        let key = self.history_key(operation_type, context);
        let record = OperationHistoryRecord {
            duration_seconds,
            timestamp: (self.clock)(),
            context: context.clone(),
        };

        let mut history = self.lock();
        let entries = history.entry(key).or_default();
        entries.push_back(record);
        while entries.len() > self.policy.max_history {
            entries.pop_front();
        }
        self.persist(&history);
    }

    /// Weighted estimate for the next run, or `None` with fewer than
    /// `min_samples` records.
    #[must_use]
    pub fn estimate_duration(&self, operation_type: &str, context: &Value) -> Option<f64> {
        let key = self.history_key(operation_type, context);
        let history = self.lock();
        let entries = history.get(&key)?;
        if entries.len() < self.policy.min_samples.max(1) {
            return None;
        }
        let now = (self.clock)();
        let (weighted, total) = entries.iter().enumerate().fold(
            (0.0f64, 0.0f64),
            |(weighted, total), (idx, record)| {
                let rank = (idx + 1) as f64;
                let weight = rank * self.decay(now, record.timestamp);
                (
                    weighted + weight * record.duration_seconds,
                    total + weight,
                )
            },
        );
        (total > 0.0).then(|| weighted / total)
    }

    /// [`Self::estimate_duration`] falling back to `default`.
    #[must_use]
    pub fn estimate_duration_or(&self, operation_type: &str, context: &Value, default: f64) -> f64 {
        self.estimate_duration(operation_type, context)
            .unwrap_or(default)
    }

    /// Number of records kept under the key `operation_type` and `context` map to.
    #[must_use]
    pub fn history_len(&self, operation_type: &str, context: &Value) -> usize {
        let key = self.history_key(operation_type, context);
        self.lock().get(&key).map_or(0, VecDeque::len)
    }

    /// Records kept under the key `operation_type` and `context` map to, oldest first.
    #[must_use]
    pub fn history_for(&self, operation_type: &str, context: &Value) -> Vec<OperationHistoryRecord> {
        let key = self.history_key(operation_type, context);
        self.lock()
            .get(&key)
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Forget every record and persist the empty history.
    pub fn clear_history(&self) {
        let mut history = self.lock();
        history.clear();
        self.persist(&history);
    }

    fn decay(&self, now: DateTime<Utc>, at: DateTime<Utc>) -> f64 {
        let age_days = (now - at).num_seconds() as f64 / SECONDS_PER_DAY;
        if age_days <= self.policy.recent_days as f64 {
            self.policy.recent_weight
        } else if age_days <= self.policy.stale_days as f64 {
            self.policy.aging_weight
        } else {
            self.policy.stale_weight
        }
    }

    fn persist(&self, history: &History) {
        let Some(path) = self.cache_path.as_deref() else {
            return;
        };
        if let Err(_err) = write_cache(path, history) {
            #[cfg(feature = "tracing")]
            tracing::warn!(path = %path.display(), error = %_err, "failed to save estimation cache");
        }
    }
}

/// Read the cache at `path`, keeping at most `max_history` newest records per key.
fn load_cache(path: &Path, max_history: usize) -> History {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_err) => {
            #[cfg(feature = "tracing")]
            tracing::debug!(path = %path.display(), error = %_err, "no estimation cache loaded");
            return History::new();
        }
    };
    match serde_json::from_str::<CacheDocument>(&raw) {
        Ok(doc) if doc.version == CACHE_VERSION => {
            let mut history = doc.history;
            for entries in history.values_mut() {
                while entries.len() > max_history {
                    entries.pop_front();
                }
            }
            history.retain(|_, entries| !entries.is_empty());
            history
        }
        Ok(_doc) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(path = %path.display(), version = _doc.version, "ignoring estimation cache with unknown version");
            History::new()
        }
        Err(_err) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(path = %path.display(), error = %_err, "ignoring corrupt estimation cache");
            History::new()
        }
    }
}

fn write_cache(path: &Path, history: &History) -> std::io::Result<()> {
    let doc = CacheDocument {
        version: CACHE_VERSION,
        history: history.clone(),
    };
    let json = serde_json::to_vec_pretty(&doc)?;
    let tmp = temp_path(path);
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)
}

/// `path` with `.tmp` appended, so `est.json` stages through `est.json.tmp`.
fn temp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}
