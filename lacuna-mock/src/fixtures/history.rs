use chrono::{DateTime, Utc};
use lacuna_core::{
    Candle, Currency, HistoryResponse, IsoCurrency, Money, SessionCalendar, Timeframe,
};

fn usd(s: &str) -> Money {
    Money::from_canonical_str(s, Currency::Iso(IsoCurrency::USD)).unwrap()
}

/// Flat bar at `ts` with every price equal to `close`.
pub fn bar(ts: DateTime<Utc>, close: &str) -> Candle {
    Candle {
        ts,
        open: usd(close).into(),
        high: usd(close).into(),
        low: usd(close).into(),
        close: usd(close).into(),
        close_unadj: None,
        volume: Some(1_000),
        provider: (),
    }
}

/// Wrap bars into an unadjusted response.
pub fn history(candles: Vec<Candle>) -> HistoryResponse {
    HistoryResponse {
        candles,
        actions: vec![],
        adjusted: false,
        meta: None,
        provider: (),
    }
}

/// `n` consecutive bars from `start`, closing at 100, 101, ...
///
/// Stops early if the grid runs past the last representable instant.
pub fn uniform(start: DateTime<Utc>, timeframe: Timeframe, n: usize) -> HistoryResponse {
    let step = timeframe.bar_interval();
    let candles = std::iter::successors(Some(start), |ts| ts.checked_add_signed(step))
        .take(n)
        .enumerate()
        .map(|(i, ts)| bar(ts, &(100 + i).to_string()))
        .collect();
    history(candles)
}

/// Bars on the `timeframe` grid in `[start, end)` that a venue following
/// `calendar` would actually print: intraday bars inside the regular session,
/// daily-or-coarser bars on trading days.
pub fn session_bars(
    calendar: &SessionCalendar,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    timeframe: Timeframe,
) -> HistoryResponse {
    let step = timeframe.bar_interval();
    let mut candles = Vec::new();
    let mut ts = start;
    while ts < end {
        let open = if timeframe.is_intraday() {
            calendar.in_session(ts, false)
        } else {
            calendar.is_trading_day(ts.date_naive())
        };
        if open {
            candles.push(bar(ts, &(100 + candles.len()).to_string()));
        }
        let Some(next) = ts.checked_add_signed(step) else {
            break;
        };
        ts = next;
    }
    history(candles)
}
