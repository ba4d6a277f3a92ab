//! Two-locale string table with date and number formatting
//!
//! Catalogs are JSON files compiled into the binary. Arabic is the default
//! locale and renders right-to-left with Arabic-Indic digits.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_embed::Embed;
use thiserror::Error;

use crate::core::alerts::Urgency;
use crate::entities::{HealthStatus, PhaseStatus, ProjectStatus, Severity};

#[derive(Embed)]
#[folder = "locales/"]
struct Catalogs;

const EN_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const AR_MONTHS: [&str; 12] = [
    "يناير", "فبراير", "مارس", "أبريل", "مايو", "يونيو", "يوليو", "أغسطس", "سبتمبر", "أكتوبر",
    "نوفمبر", "ديسمبر",
];

#[derive(Debug, Error)]
pub enum I18nError {
    #[error("unknown locale '{0}' (valid: ar, en)")]
    UnknownLocale(String),

    #[error("no catalog is embedded for locale '{0}'")]
    MissingCatalog(Locale),

    #[error("catalog for '{locale}' is not a JSON string map: {source}")]
    InvalidCatalog {
        locale: Locale,
        source: serde_json::Error,
    },
}

/// Text direction of a locale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ltr,
    Rtl,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Ltr => write!(f, "ltr"),
            Direction::Rtl => write!(f, "rtl"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    #[default]
    Ar,
    En,
}

impl Locale {
    pub fn all() -> &'static [Locale] {
        &[Locale::Ar, Locale::En]
    }

    pub fn code(&self) -> &'static str {
        match self {
            Locale::Ar => "ar",
            Locale::En => "en",
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            Locale::Ar => Direction::Rtl,
            Locale::En => Direction::Ltr,
        }
    }

    pub fn is_rtl(&self) -> bool {
        self.direction() == Direction::Rtl
    }

    /// Pick the active locale
    ///
    /// Sources in priority order: command-line flag, `MPT_LOCALE`, the stored
    /// preference, the config file. Unknown codes are skipped.
    pub fn resolve(
        flag: Option<Locale>,
        env: Option<&str>,
        stored: Option<&str>,
        configured: Option<&str>,
    ) -> Locale {
        flag.or_else(|| {
            [env, stored, configured]
                .into_iter()
                .flatten()
                .find_map(|code| code.parse().ok())
        })
        .unwrap_or_default()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Locale {
    type Err = I18nError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_lowercase();
        Locale::all()
            .iter()
            .copied()
            .find(|locale| locale.code() == code)
            .ok_or_else(|| I18nError::UnknownLocale(s.to_string()))
    }
}

/// Swap ASCII digits for Arabic-Indic ones
fn arabic_digits(s: &str) -> String {
    s.chars()
        .map(|c| match c.to_digit(10) {
            Some(d) => char::from_u32(0x0660 + d).unwrap_or(c),
            None => c,
        })
        .collect()
}

fn group_thousands(digits: &str, separator: char) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}

/// Translated strings and formatting for one locale
#[derive(Debug, Clone)]
pub struct Translator {
    locale: Locale,
    strings: HashMap<String, String>,
}

impl Translator {
    pub fn new(locale: Locale) -> Result<Self, I18nError> {
        let file = Catalogs::get(&format!("{}.json", locale.code()))
            .ok_or(I18nError::MissingCatalog(locale))?;
        let strings = serde_json::from_slice(&file.data)
            .map_err(|source| I18nError::InvalidCatalog { locale, source })?;
        Ok(Self { locale, strings })
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Look up a key; an unknown key comes back unchanged
    pub fn t<'a>(&'a self, key: &'a str) -> &'a str {
        self.strings.get(key).map(String::as_str).unwrap_or(key)
    }

    /// Localize the digits of an already formatted string
    pub fn digits(&self, s: &str) -> String {
        match self.locale {
            Locale::Ar => arabic_digits(s),
            Locale::En => s.to_string(),
        }
    }

    /// `12 Mar 2025` / `١٢ مارس ٢٠٢٥`
    pub fn format_date(&self, date: NaiveDate) -> String {
        format!("{} {}", self.format_date_short(date), self.digits(&date.year().to_string()))
    }

    /// `12 Mar` / `١٢ مارس`
    pub fn format_date_short(&self, date: NaiveDate) -> String {
        let month = date.month0() as usize;
        let name = match self.locale {
            Locale::Ar => AR_MONTHS[month],
            Locale::En => EN_MONTHS[month],
        };
        format!("{} {}", self.digits(&date.day().to_string()), name)
    }

    /// Thousands-grouped number with at most two decimals
    pub fn format_number(&self, value: f64) -> String {
        let (group, decimal) = match self.locale {
            Locale::Ar => ('٬', '٫'),
            Locale::En => (',', '.'),
        };

        if !value.is_finite() {
            return "-".to_string();
        }

        // Integer hundredths as decimal digits; `{:.0}` never saturates like an integer cast
        let scaled = (value.abs() * 100.0).round();
        let hundredths = if scaled.is_finite() {
            format!("{:03.0}", scaled)
        } else {
            format!("{:.0}00", value.abs().round())
        };
        let (whole, fraction) = hundredths.split_at(hundredths.len() - 2);

        let mut out = String::new();
        if value < 0.0 && hundredths.bytes().any(|b| b != b'0') {
            out.push('-');
        }
        out.push_str(&group_thousands(whole, group));
        let fraction = fraction.trim_end_matches('0');
        if !fraction.is_empty() {
            out.push(decimal);
            out.push_str(fraction);
        }
        self.digits(&out)
    }

    pub fn format_percent(&self, value: impl fmt::Display) -> String {
        let digits = self.digits(&value.to_string());
        match self.locale {
            Locale::Ar => format!("{}٪", digits),
            Locale::En => format!("{}%", digits),
        }
    }

    pub fn project_status(&self, status: ProjectStatus) -> &str {
        self.t(match status {
            ProjectStatus::Planned => "status_planned",
            ProjectStatus::Active => "status_active",
            ProjectStatus::OnHold => "status_on_hold",
            ProjectStatus::Completed => "status_completed",
        })
    }

    pub fn phase_status(&self, status: PhaseStatus) -> &str {
        self.t(match status {
            PhaseStatus::OnTrack => "phase_status_on_track",
            PhaseStatus::AtRisk => "phase_status_at_risk",
            PhaseStatus::Delayed => "phase_status_delayed",
        })
    }

    pub fn health(&self, health: HealthStatus) -> &str {
        self.t(match health {
            HealthStatus::Stable => "health_stable",
            HealthStatus::Warning => "health_warning",
            HealthStatus::Critical => "health_critical",
        })
    }

    pub fn severity(&self, severity: Severity) -> &str {
        self.t(match severity {
            Severity::Info => "severity_info",
            Severity::Warning => "severity_warning",
            Severity::Danger => "severity_danger",
        })
    }

    pub fn urgency(&self, urgency: Urgency) -> &str {
        self.severity(urgency.severity())
    }

    /// Display name of a locale in its own language
    pub fn locale_name(&self, locale: Locale) -> &str {
        self.t(match locale {
            Locale::Ar => "arabic",
            Locale::En => "english",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_locale_parse_and_direction() {
        assert_eq!("AR".parse::<Locale>().unwrap(), Locale::Ar);
        assert_eq!("en".parse::<Locale>().unwrap(), Locale::En);
        assert!("fr".parse::<Locale>().is_err());
        assert!(Locale::Ar.is_rtl());
        assert_eq!(Locale::En.direction(), Direction::Ltr);
        assert_eq!(Locale::default(), Locale::Ar);
    }

    #[test]
    fn test_resolve_precedence() {
        assert_eq!(
            Locale::resolve(Some(Locale::En), Some("ar"), Some("ar"), Some("ar")),
            Locale::En
        );
        assert_eq!(Locale::resolve(None, Some("en"), Some("ar"), None), Locale::En);
        assert_eq!(Locale::resolve(None, None, Some("en"), Some("ar")), Locale::En);
        assert_eq!(Locale::resolve(None, None, None, Some("en")), Locale::En);
        assert_eq!(Locale::resolve(None, None, Some("xx"), Some("en")), Locale::En);
        assert_eq!(Locale::resolve(None, None, Some("xx"), None), Locale::Ar);
    }

    #[test]
    fn test_catalogs_have_same_keys() {
        let ar = Translator::new(Locale::Ar).unwrap();
        let en = Translator::new(Locale::En).unwrap();
        let mut ar_keys: Vec<_> = ar.strings.keys().collect();
        let mut en_keys: Vec<_> = en.strings.keys().collect();
        ar_keys.sort();
        en_keys.sort();
        assert_eq!(ar_keys, en_keys);
    }

    #[test]
    fn test_t_falls_back_to_key() {
        let en = Translator::new(Locale::En).unwrap();
        assert_eq!(en.t("dashboard"), "Dashboard");
        assert_eq!(en.t("no_such_key"), "no_such_key");

        let ar = Translator::new(Locale::Ar).unwrap();
        assert_eq!(ar.t("dashboard"), "لوحة التحكم");
    }

    #[test]
    fn test_format_date() {
        let en = Translator::new(Locale::En).unwrap();
        assert_eq!(en.format_date(date("2025-03-12")), "12 Mar 2025");
        assert_eq!(en.format_date_short(date("2025-12-01")), "1 Dec");

        let ar = Translator::new(Locale::Ar).unwrap();
        assert_eq!(ar.format_date(date("2025-03-12")), "١٢ مارس ٢٠٢٥");
    }

    #[test]
    fn test_format_number() {
        let en = Translator::new(Locale::En).unwrap();
        assert_eq!(en.format_number(0.0), "0");
        assert_eq!(en.format_number(999.0), "999");
        assert_eq!(en.format_number(4_500_000.0), "4,500,000");
        assert_eq!(en.format_number(1234.5), "1,234.5");
        assert_eq!(en.format_number(-2500.0), "-2,500");
        assert_eq!(en.format_number(0.05), "0.05");
        assert_eq!(en.format_number(-0.001), "0");
        assert_eq!(en.format_number(1e20), "100,000,000,000,000,000,000");
        assert_eq!(en.format_number(f64::INFINITY), "-");
        assert_eq!(en.format_number(f64::NAN), "-");

        let ar = Translator::new(Locale::Ar).unwrap();
        assert_eq!(ar.format_number(1_050_000.0), "١٬٠٥٠٬٠٠٠");
        assert_eq!(ar.format_percent(85), "٨٥٪");
    }

    #[test]
    fn test_labels() {
        let en = Translator::new(Locale::En).unwrap();
        assert_eq!(en.project_status(ProjectStatus::OnHold), "On hold");
        assert_eq!(en.phase_status(PhaseStatus::AtRisk), "At risk");
        assert_eq!(en.health(HealthStatus::Critical), "Critical");
        assert_eq!(en.urgency(Urgency::Danger), "Urgent");
        assert_eq!(en.locale_name(Locale::Ar), "العربية");
    }
}
