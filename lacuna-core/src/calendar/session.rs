//! Trading hours compiled into a timezone-aware session calendar.

use chrono::offset::LocalResult;
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

use lacuna_types::{LacunaError, TradingHours, TradingSession};

/// One daily session window in local time.
///
/// A window whose close is not after its open wraps past midnight and belongs
/// to the trading day on which it closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SessionWindow {
    open: NaiveTime,
    close: NaiveTime,
}

impl SessionWindow {
    fn parse(session: &TradingSession) -> Result<Self, LacunaError> {
        Ok(Self {
            open: parse_hhmm(&session.start)?,
            close: parse_hhmm(&session.end)?,
        })
    }

    fn wraps(self) -> bool {
        self.close <= self.open
    }

    /// UTC bounds of this window on the trading day `date`.
    fn bounds_on(self, tz: Tz, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let open_date = if self.wraps() {
            date.pred_opt().unwrap_or(date)
        } else {
            date
        };
        (
            localize(tz, open_date, self.open),
            localize(tz, date, self.close),
        )
    }
}

fn parse_hhmm(raw: &str) -> Result<NaiveTime, LacunaError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|e| LacunaError::invalid_arg(format!("session time '{raw}': {e}")))
}

/// Map a local wall-clock instant to UTC.
///
/// Ambiguous instants take the earlier mapping; instants skipped by a DST jump
/// move forward by one hour.
fn localize(tz: Tz, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    let naive = date.and_time(time);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(dt1, _) => dt1.with_timezone(&Utc),
        LocalResult::None => tz
            .from_local_datetime(&(naive + TimeDelta::hours(1)))
            .earliest()
            .map_or_else(|| naive.and_utc(), |dt| dt.with_timezone(&Utc)),
    }
}

/// Trading hours with the timezone and session times parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCalendar {
    tz: Tz,
    regular: SessionWindow,
    extended: Vec<SessionWindow>,
    trading_days: [bool; 7],
}

impl SessionCalendar {
    /// Compile registry metadata.
    ///
    /// # Errors
    /// Returns `InvalidArg` for an unknown timezone, an unparseable `"HH:MM"`
    /// time, a weekday index above 6, or an empty trading-day list.
    pub fn from_hours(hours: &TradingHours) -> Result<Self, LacunaError> {
        let tz: Tz = hours
            .timezone
            .parse()
            .map_err(|e| LacunaError::invalid_arg(format!("timezone '{}': {e}", hours.timezone)))?;
        let regular = SessionWindow::parse(&hours.regular_hours)?;
        let extended = hours
            .extended_hours
            .iter()
            .map(SessionWindow::parse)
            .collect::<Result<Vec<_>, _>>()?;
        let mut trading_days = [false; 7];
        for &day in &hours.trading_days {
            let slot = trading_days.get_mut(usize::from(day)).ok_or_else(|| {
                LacunaError::invalid_arg(format!("trading day index {day} out of range 0..=6"))
            })?;
            *slot = true;
        }
        if !trading_days.contains(&true) {
            return Err(LacunaError::invalid_arg("trading_days is empty"));
        }
        Ok(Self {
            tz,
            regular,
            extended,
            trading_days,
        })
    }

    /// Timezone the sessions are expressed in.
    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.tz
    }

    /// Whether the market opens on `weekday`.
    #[must_use]
    pub fn is_trading_weekday(&self, weekday: Weekday) -> bool {
        self.trading_days[weekday.num_days_from_monday() as usize]
    }

    /// Whether the market opens on the local calendar date `date`.
    #[must_use]
    pub fn is_trading_day(&self, date: NaiveDate) -> bool {
        self.is_trading_weekday(date.weekday())
    }

    /// Local calendar date of `ts`.
    #[must_use]
    pub fn local_date(&self, ts: DateTime<Utc>) -> NaiveDate {
        ts.with_timezone(&self.tz).date_naive()
    }

    fn windows(&self, include_extended: bool) -> impl Iterator<Item = SessionWindow> + '_ {
        std::iter::once(self.regular).chain(
            self.extended
                .iter()
                .copied()
                .filter(move |_| include_extended),
        )
    }

    /// Total time `[start, end)` spends inside sessions on trading days.
    #[must_use]
    pub fn session_overlap(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        include_extended: bool,
    ) -> TimeDelta {
        if end <= start {
            return TimeDelta::zero();
        }
        let first = self.local_date(start);
        // A wrapping window that opens on the last local date closes the day after.
        let last = self.local_date(end).succ_opt().unwrap_or(first);
        let mut total = TimeDelta::zero();
        for date in first.iter_days().take_while(|d| *d <= last) {
            if !self.is_trading_day(date) {
                continue;
            }
            for window in self.windows(include_extended) {
                let (open, close) = window.bounds_on(self.tz, date);
                let lo = open.max(start);
                let hi = close.min(end);
                if hi > lo {
                    total += hi - lo;
                }
            }
        }
        total
    }

    /// Whether the instant `ts` falls inside a session of a trading day.
    #[must_use]
    pub fn in_session(&self, ts: DateTime<Utc>, include_extended: bool) -> bool {
        let date = self.local_date(ts);
        [Some(date), date.succ_opt()]
            .into_iter()
            .flatten()
            .filter(|d| self.is_trading_day(*d))
            .any(|d| {
                self.windows(include_extended).any(|w| {
                    let (open, close) = w.bounds_on(self.tz, d);
                    open <= ts && ts < close
                })
            })
    }
}
