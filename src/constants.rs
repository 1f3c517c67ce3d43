pub const DEFAULT_HISTORY_DAYS: i64 = 20 * 365;
pub const YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const HTTP_TIMEOUT_SECS: u64 = 30;
pub const HTTP_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) market-dashboard/0.1";
pub const CHART_WIDTH: u32 = 120;
pub const CHART_HEIGHT: u32 = 30;
pub const NORMALIZE_BASE: f64 = 100.0;

/// Display name and ticker pairs seeded into every new symbol book.
pub const DEFAULT_SYMBOLS: [(&str, &str); 5] = [
    ("Apple", "AAPL"),
    ("Google", "GOOGL"),
    ("Tesla", "TSLA"),
    ("Microsoft", "MSFT"),
    ("S&P 500", "^GSPC"),
];

/// Line colours cycled across plotted symbols, paired with the name shown in the legend.
pub const LINE_COLORS: [(&str, [u8; 3]); 6] = [
    ("red", [230, 57, 70]),
    ("green", [42, 157, 143]),
    ("yellow", [233, 196, 106]),
    ("blue", [69, 123, 230]),
    ("magenta", [200, 80, 192]),
    ("cyan", [72, 202, 228]),
];
