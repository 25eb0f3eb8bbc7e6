//! Turns a held series and a requested window into intervals worth fetching.

use chrono::{DateTime, Utc};
use paft::market::responses::history::Candle;

use lacuna_types::{
    FetchMode, GapAnalysisReport, GapClassification, SkipReason, SkippedGap, TimeRange, Timeframe,
};

use crate::gaps::classifier::GapClassifier;
use crate::timeseries::coverage::sorted_timestamps;

/// Decides which missing intervals a fetcher should request.
///
/// Candidate intervals depend on the [`FetchMode`]; each candidate is then
/// filtered through the classifier so that weekends, holidays and off-session
/// hours are not fetched.
#[derive(Debug)]
pub struct GapAnalyzer {
    classifier: GapClassifier,
    threshold: GapClassification,
}

impl GapAnalyzer {
    /// Analyzer filtering at the classifier policy's default threshold.
    #[must_use]
    pub fn new(classifier: GapClassifier) -> Self {
        let threshold = classifier.policy().default_priority_threshold;
        Self {
            classifier,
            threshold,
        }
    }

    /// Override the minimum classification a gap needs to be fetched.
    #[must_use]
    pub const fn with_priority_threshold(mut self, threshold: GapClassification) -> Self {
        self.threshold = threshold;
        self
    }

    /// The underlying classifier.
    #[must_use]
    pub const fn classifier(&self) -> &GapClassifier {
        &self.classifier
    }

    /// Intervals to fetch, ascending and non-overlapping.
    #[must_use]
    pub fn analyze_gaps(
        &self,
        existing: Option<&[Candle]>,
        requested_start: DateTime<Utc>,
        requested_end: DateTime<Utc>,
        timeframe: Timeframe,
        symbol: &str,
        mode: FetchMode,
    ) -> Vec<TimeRange> {
        self.analyze_gaps_detailed(
            existing,
            requested_start,
            requested_end,
            timeframe,
            symbol,
            mode,
        )
        .fetch
    }

    /// Like [`Self::analyze_gaps`], also reporting the candidates that were dropped and why.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "lacuna::gaps::analyze_gaps",
            skip(self, existing),
            fields(held = existing.map_or(0, <[Candle]>::len)),
        )
    )]
    #[must_use]
    pub fn analyze_gaps_detailed(
        &self,
        existing: Option<&[Candle]>,
        requested_start: DateTime<Utc>,
        requested_end: DateTime<Utc>,
        timeframe: Timeframe,
        symbol: &str,
        mode: FetchMode,
    ) -> GapAnalysisReport {
        let requested = TimeRange::new(requested_start, requested_end);
        if mode == FetchMode::Local || requested.is_empty() {
            return GapAnalysisReport::default();
        }

        let timestamps = existing.map(sorted_timestamps).unwrap_or_default();
        let candidates = merge_touching(
            candidate_ranges(&timestamps, requested, timeframe, mode)
                .into_iter()
                .filter_map(|c| {
                    c.range.intersect(&requested).map(|range| Candidate {
                        range,
                        bracketed: c.bracketed,
                    })
                })
                .collect(),
        );

        let policy = self.classifier.policy();
        let has_calendar = self.classifier.has_calendar(symbol);
        let mut report = GapAnalysisReport::default();
        for Candidate { range, bracketed } in candidates {
            let duration = range.duration();
            if duration > policy.large_gap_override() {
                report.fetch.push(range);
                continue;
            }
            if !has_calendar && duration < policy.unknown_symbol_min_gap() {
                report.skipped.push(SkippedGap {
                    range,
                    reason: SkipReason::NoCalendarShortGap,
                });
                continue;
            }
            let info = self.classifier.assess(range, symbol, timeframe, bracketed);
            if self.classifier.is_gap_worth_filling(&info, self.threshold) {
                report.fetch.push(range);
            } else {
                report.skipped.push(SkippedGap {
                    range,
                    reason: SkipReason::Classified(info.classification),
                });
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            fetch = report.fetch.len(),
            skipped = report.skipped.len(),
            "gap analysis finished"
        );
        report
    }
}

/// A missing interval and whether held bars sit on both sides of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Candidate {
    range: TimeRange,
    bracketed: bool,
}

impl Candidate {
    const fn edge(range: TimeRange) -> Self {
        Self {
            range,
            bracketed: false,
        }
    }
}

fn candidate_ranges(
    timestamps: &[DateTime<Utc>],
    requested: TimeRange,
    timeframe: Timeframe,
    mode: FetchMode,
) -> Vec<Candidate> {
    let (Some(&first), Some(&last)) = (timestamps.first(), timestamps.last()) else {
        return vec![Candidate::edge(requested)];
    };
    let bar = timeframe.bar_interval();
    let mut out = Vec::new();

    if mode.scans_leading() && first - requested.start >= bar {
        out.push(Candidate::edge(TimeRange::new(requested.start, first)));
    }
    if mode.scans_internal() {
        // A bar end past the representable range cannot open a gap.
        out.extend(timestamps.windows(2).filter_map(|w| {
            let after = w[0].checked_add_signed(bar)?;
            (w[1] > after).then_some(Candidate {
                range: TimeRange::new(after, w[1]),
                bracketed: true,
            })
        }));
    }
    if mode.scans_trailing()
        && let Some(after) = last.checked_add_signed(bar)
    {
        let tail = TimeRange::new(after, requested.end);
        if !tail.is_empty() {
            out.push(Candidate::edge(tail));
        }
    }
    out
}

/// Sort and join touching candidates; a joined run is bracketed only if every part was.
fn merge_touching(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort();
    let mut out: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for next in candidates {
        match out.last_mut() {
            Some(prev) if prev.range.touches(&next.range) => {
                prev.range.end = prev.range.end.max(next.range.end);
                prev.bracketed &= next.bracketed;
            }
            _ => out.push(next),
        }
    }
    out
}
