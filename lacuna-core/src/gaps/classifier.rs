//! Calendar-aware classification of a single gap.

use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};

use lacuna_types::{
    GapClassification, GapInfo, GapPolicy, LacunaError, TimeRange, Timeframe, TradingHours,
};

use crate::calendar::session::SessionCalendar;
use crate::connector::CalendarRegistry;
use crate::gaps::bound::{GapBound, resolve_bounds};

const DAY_MILLIS: u64 = 86_400_000;

/// Day-level view of a symbol used by the rules.
enum DayModel {
    /// Registry metadata compiled into sessions.
    Sessions(SessionCalendar),
    /// No usable metadata: Monday to Friday on UTC dates.
    Weekdays,
}

impl DayModel {
    /// Intraday bars are dated in the exchange timezone; daily bars carry UTC midnight stamps.
    fn date_of(&self, ts: DateTime<Utc>, timeframe: Timeframe) -> NaiveDate {
        match self {
            Self::Sessions(cal) if timeframe.is_intraday() => cal.local_date(ts),
            _ => ts.date_naive(),
        }
    }

    fn is_trading_day(&self, date: NaiveDate) -> bool {
        match self {
            Self::Sessions(cal) => cal.is_trading_day(date),
            Self::Weekdays => !matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
        }
    }

    fn adjacent_to_closure(&self, date: NaiveDate) -> bool {
        [date.pred_opt(), date.succ_opt()]
            .into_iter()
            .flatten()
            .any(|d| !self.is_trading_day(d))
    }
}

/// Dates between `first` and `last`, plus `first` itself when it is a missing bar slot.
fn gap_dates(
    first: NaiveDate,
    last: NaiveDate,
    include_first: bool,
) -> impl Iterator<Item = NaiveDate> {
    include_first
        .then_some(first)
        .into_iter()
        .chain(first.iter_days().skip(1).take_while(move |d| *d < last))
}

/// Daily-or-coarser bars are stamped at UTC midnight, so a gap opening there
/// is missing that day's bar rather than following it.
fn opens_on_bar_slot(range: TimeRange, timeframe: Timeframe) -> bool {
    !timeframe.is_intraday() && !range.is_empty() && range.start.time() == NaiveTime::MIN
}

const fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

const fn edge_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Fri => "Friday (pre-weekend)",
        other => weekday_name(other),
    }
}

fn day_context(start: NaiveDate, end: NaiveDate) -> String {
    if start == end {
        return edge_label(start.weekday()).to_string();
    }
    let first = start.succ_opt().filter(|d| *d < end);
    let last = end.pred_opt().filter(|d| *d > start);
    match (first, last) {
        (Some(first), Some(last)) if first == last => weekday_name(first.weekday()).to_string(),
        (Some(first), Some(last)) => format!(
            "{}-{}",
            weekday_name(first.weekday()),
            weekday_name(last.weekday())
        ),
        _ => format!(
            "{}-{}",
            edge_label(start.weekday()),
            edge_label(end.weekday())
        ),
    }
}

fn bars_missing(range: TimeRange, timeframe: Timeframe, interior_trading_days: usize) -> u64 {
    let millis = u64::try_from(range.duration().num_milliseconds()).unwrap_or(0);
    if millis == 0 {
        return 0;
    }
    let bar = u64::try_from(timeframe.seconds()).unwrap_or(1).max(1) * 1_000;
    if timeframe.is_intraday() {
        millis.div_ceil(bar)
    } else {
        (interior_trading_days as u64 * DAY_MILLIS).div_ceil(bar).max(1)
    }
}

/// Assigns a [`GapClassification`] to intervals with no data.
///
/// Classification is a pure function of the interval, the symbol's registry
/// metadata and the configured [`GapPolicy`]. Symbols missing from the
/// registry, or whose metadata does not parse, are judged with a
/// Monday-to-Friday UTC weekend heuristic and only ever come out as
/// `ExpectedWeekend` or `Unexpected`.
pub struct GapClassifier {
    registry: Arc<dyn CalendarRegistry>,
    policy: GapPolicy,
}

impl GapClassifier {
    /// Classifier with default thresholds.
    pub fn new(registry: Arc<dyn CalendarRegistry>) -> Self {
        Self::with_policy(registry, GapPolicy::default())
    }

    /// Classifier with explicit thresholds.
    pub fn with_policy(registry: Arc<dyn CalendarRegistry>, policy: GapPolicy) -> Self {
        Self { registry, policy }
    }

    /// Thresholds in effect.
    #[must_use]
    pub const fn policy(&self) -> &GapPolicy {
        &self.policy
    }

    /// Raw trading-hours metadata for `symbol`, if registered.
    #[must_use]
    pub fn get_symbol_trading_hours(&self, symbol: &str) -> Option<TradingHours> {
        self.registry.get(symbol).map(|c| c.trading_hours)
    }

    /// True when `symbol` has registry metadata that compiles into sessions.
    #[must_use]
    pub fn has_calendar(&self, symbol: &str) -> bool {
        self.session_calendar(symbol).is_some()
    }

    fn session_calendar(&self, symbol: &str) -> Option<SessionCalendar> {
        let hours = self.get_symbol_trading_hours(symbol)?;
        match SessionCalendar::from_hours(&hours) {
            Ok(cal) => Some(cal),
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(symbol, error = %_err, "ignoring unusable calendar metadata");
                None
            }
        }
    }

    /// Classify `[start, end)` for `symbol` at `timeframe`.
    ///
    /// # Errors
    /// Returns `InvalidArg` when one bound is timezone-aware and the other naive.
    pub fn classify_gap(
        &self,
        start: impl Into<GapBound>,
        end: impl Into<GapBound>,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<GapClassification, LacunaError> {
        self.analyze_gap(start, end, symbol, timeframe)
            .map(|gap| gap.classification)
    }

    /// Classify `[start, end)` and describe it.
    ///
    /// A zero-length interval is valid. An inverted interval is evaluated as
    /// the zero-length interval at `start`.
    ///
    /// # Errors
    /// Returns `InvalidArg` when one bound is timezone-aware and the other naive.
    pub fn analyze_gap(
        &self,
        start: impl Into<GapBound>,
        end: impl Into<GapBound>,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<GapInfo, LacunaError> {
        let (start, end) = resolve_bounds(start.into(), end.into())?;
        Ok(self.assess(
            TimeRange::new(start, end.max(start)),
            symbol,
            timeframe,
            true,
        ))
    }

    /// True iff the gap ranks at or above `threshold`.
    #[must_use]
    pub fn is_gap_worth_filling(&self, gap: &GapInfo, threshold: GapClassification) -> bool {
        gap.classification >= threshold
    }

    /// [`Self::is_gap_worth_filling`] with the policy's default threshold.
    #[must_use]
    pub fn is_gap_worth_filling_default(&self, gap: &GapInfo) -> bool {
        self.is_gap_worth_filling(gap, self.policy.default_priority_threshold)
    }

    /// Classify `range`.
    ///
    /// `bracketed` is true when held data exists on both sides of the range.
    /// Holidays and market closures are only inferred for bracketed gaps; at
    /// the edge of held data a missing trading day is simply not loaded yet.
    pub(crate) fn assess(
        &self,
        range: TimeRange,
        symbol: &str,
        timeframe: Timeframe,
        bracketed: bool,
    ) -> GapInfo {
        let model = self
            .session_calendar(symbol)
            .map_or(DayModel::Weekdays, DayModel::Sessions);
        let start_date = model.date_of(range.start, timeframe);
        let end_date = model.date_of(range.end, timeframe);
        let interior_trading: Vec<NaiveDate> =
            gap_dates(start_date, end_date, opens_on_bar_slot(range, timeframe))
                .filter(|d| model.is_trading_day(*d))
                .collect();
        let (classification, note) = self.decide(
            &model,
            range,
            start_date,
            end_date,
            &interior_trading,
            timeframe,
            bracketed,
        );

        #[cfg(feature = "tracing")]
        tracing::debug!(
            symbol,
            timeframe = %timeframe,
            range = %range,
            classification = %classification,
            "classified gap"
        );

        GapInfo {
            start_time: range.start,
            end_time: range.end,
            classification,
            bars_missing: bars_missing(range, timeframe, interior_trading.len()),
            duration_hours: range.duration().num_milliseconds() as f64 / 3_600_000.0,
            day_context: day_context(start_date, end_date),
            symbol: symbol.to_string(),
            timeframe,
            note: note.to_string(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn decide(
        &self,
        model: &DayModel,
        range: TimeRange,
        start_date: NaiveDate,
        end_date: NaiveDate,
        interior_trading: &[NaiveDate],
        timeframe: Timeframe,
        bracketed: bool,
    ) -> (GapClassification, &'static str) {
        let touches_closure = start_date
            .iter_days()
            .take_while(|d| *d <= end_date)
            .any(|d| !model.is_trading_day(d));
        let only_closed_between = touches_closure && interior_trading.is_empty();

        let DayModel::Sessions(cal) = model else {
            return if only_closed_between {
                (
                    GapClassification::ExpectedWeekend,
                    "spans a weekend (no calendar, Monday-Friday assumed)",
                )
            } else {
                (
                    GapClassification::Unexpected,
                    "no calendar metadata and not a weekend",
                )
            };
        };

        let bar = timeframe.bar_interval();
        let below_one_bar = |include_extended: bool| {
            if range.is_empty() {
                !cal.in_session(range.start, include_extended)
            } else {
                cal.session_overlap(range.start, range.end, include_extended) < bar
            }
        };

        if timeframe.is_intraday() && !touches_closure && below_one_bar(true) {
            return (
                GapClassification::ExpectedTradingHours,
                "outside regular and extended sessions",
            );
        }
        if only_closed_between && (!timeframe.is_intraday() || below_one_bar(false)) {
            return (
                GapClassification::ExpectedWeekend,
                "spans non-trading days only",
            );
        }
        if !bracketed {
            return (
                GapClassification::Unexpected,
                "trading days missing at the edge of held data",
            );
        }
        let holiday_limit = self.policy.holiday_max_trading_days as usize;
        if (1..=holiday_limit).contains(&interior_trading.len())
            && range.duration() <= self.policy.holiday_max()
            && interior_trading
                .iter()
                .all(|d| model.adjacent_to_closure(*d))
        {
            return (
                GapClassification::ExpectedHoliday,
                "missing trading day next to a closure",
            );
        }
        if range.duration() > self.policy.market_closure_threshold() {
            return (
                GapClassification::MarketClosure,
                "multi-day gap without a calendar explanation",
            );
        }
        (
            GapClassification::Unexpected,
            "data expected inside trading sessions",
        )
    }
}

impl std::fmt::Debug for GapClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GapClassifier")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
