use lacuna_core::{StaticCalendarRegistry, SymbolCalendar, TradingHours, TradingSession};

/// NASDAQ equity: 09:30-16:00 New York with pre and post market, Monday to Friday.
pub fn nasdaq_equity() -> SymbolCalendar {
    SymbolCalendar {
        asset_type: "stock".into(),
        exchange: "NASDAQ".into(),
        trading_hours: TradingHours {
            timezone: "America/New_York".into(),
            regular_hours: TradingSession::new("09:30", "16:00", "regular"),
            extended_hours: vec![
                TradingSession::new("04:00", "09:30", "pre-market"),
                TradingSession::new("16:00", "20:00", "post-market"),
            ],
            trading_days: vec![0, 1, 2, 3, 4],
        },
    }
}

/// Spot FX: opens Sunday 17:00 New York, closes Friday 17:00.
pub fn forex_24x5() -> SymbolCalendar {
    SymbolCalendar {
        asset_type: "forex".into(),
        exchange: "OTC".into(),
        trading_hours: TradingHours {
            timezone: "America/New_York".into(),
            regular_hours: TradingSession::new("17:00", "17:00", "continuous"),
            extended_hours: vec![],
            trading_days: vec![0, 1, 2, 3, 4],
        },
    }
}

/// Crypto: every day around the clock.
pub fn crypto_24x7() -> SymbolCalendar {
    SymbolCalendar {
        asset_type: "crypto".into(),
        exchange: "CCC".into(),
        trading_hours: TradingHours {
            timezone: "UTC".into(),
            regular_hours: TradingSession::new("00:00", "00:00", "continuous"),
            extended_hours: vec![],
            trading_days: vec![0, 1, 2, 3, 4, 5, 6],
        },
    }
}

/// CME equity index future: 17:00-16:00 Chicago overnight session.
pub fn cme_index_future() -> SymbolCalendar {
    SymbolCalendar {
        asset_type: "future".into(),
        exchange: "CME".into(),
        trading_hours: TradingHours {
            timezone: "America/Chicago".into(),
            regular_hours: TradingSession::new("17:00", "16:00", "globex"),
            extended_hours: vec![],
            trading_days: vec![0, 1, 2, 3, 4],
        },
    }
}

/// Registry with AAPL, MSFT, EURUSD, BTC-USD and ES.
pub fn registry() -> StaticCalendarRegistry {
    StaticCalendarRegistry::new()
        .with("AAPL", nasdaq_equity())
        .with("MSFT", nasdaq_equity())
        .with("EURUSD", forex_24x5())
        .with("BTC-USD", crypto_24x7())
        .with("ES", cme_index_future())
}
