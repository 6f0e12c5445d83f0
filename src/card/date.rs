use chrono::{DateTime, NaiveDate, Utc};

/// How a card's publication date is shown to the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateStyle {
    /// `Apr 17, 2025`
    #[default]
    MonthDayYear,
    /// `17 Apr 2025`
    DayMonthYear,
    /// `2025-04-17`
    Iso,
}

impl DateStyle {
    /// Pick the style a locale name conventionally uses.
    ///
    /// `en_US`-style and unset locales read month-first; `C`/`POSIX` get
    /// ISO dates; every other locale reads day-first.
    pub fn from_locale(locale: &str) -> Self {
        let name = locale.split(&['.', '@'][..]).next().unwrap_or("").trim();
        match name {
            "" | "en" | "en_US" | "en-US" => Self::MonthDayYear,
            "C" | "POSIX" => Self::Iso,
            _ => Self::DayMonthYear,
        }
    }

    /// Resolve from `LC_ALL`, `LC_TIME`, then `LANG` (first non-empty wins).
    pub fn from_env() -> Self {
        let locale = ["LC_ALL", "LC_TIME", "LANG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.is_empty())
            .unwrap_or_default();
        Self::from_locale(&locale)
    }

    /// Parse a config value: `auto`, `mdy`, `dmy` or `iso`.
    pub fn from_setting(setting: &str) -> Option<Self> {
        match setting.to_ascii_lowercase().as_str() {
            "auto" => Some(Self::from_env()),
            "mdy" => Some(Self::MonthDayYear),
            "dmy" => Some(Self::DayMonthYear),
            "iso" => Some(Self::Iso),
            _ => None,
        }
    }

    fn pattern(self) -> &'static str {
        match self {
            Self::MonthDayYear => "%b %-d, %Y",
            Self::DayMonthYear => "%-d %b %Y",
            Self::Iso => "%Y-%m-%d",
        }
    }
}

/// Strictly parse a `YYYY-MM-DD` date as UTC midnight.
///
/// Exactly four, two and two ASCII digits separated by `-`; anything else,
/// or a date that does not exist on the calendar, yields `None`.
pub fn parse_written(raw: &str) -> Option<DateTime<Utc>> {
    let bytes = raw.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    let digits_ok = bytes
        .iter()
        .enumerate()
        .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !digits_ok {
        return None;
    }

    let year: i32 = raw[0..4].parse().ok()?;
    let month: u32 = raw[5..7].parse().ok()?;
    let day: u32 = raw[8..10].parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)?
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
}

/// Format a record's `written` value for display.
///
/// Falls back to the raw string when it does not parse; the failure is
/// logged and never propagated, so one bad record cannot break a batch.
pub fn format_written(raw: &str, style: DateStyle) -> String {
    match parse_written(raw) {
        Some(date) => date.format(style.pattern()).to_string(),
        None => {
            tracing::warn!(written = %raw, "Could not parse article date, showing raw value");
            raw.to_string()
        }
    }
}
