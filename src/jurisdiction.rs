// src/jurisdiction.rs
//
// Privacy jurisdiction classification. Everything in here is table-driven
// and pure; network lookups live in geo_handler.

use std::env;
use std::fs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JurisdictionCode {
    In,
    Eu,
    Uk,
    Ca,
    Au,
    UsCa,
    Other,
}

impl JurisdictionCode {
    pub const ALL: [JurisdictionCode; 7] = [
        JurisdictionCode::In,
        JurisdictionCode::Eu,
        JurisdictionCode::Uk,
        JurisdictionCode::Ca,
        JurisdictionCode::Au,
        JurisdictionCode::UsCa,
        JurisdictionCode::Other,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            JurisdictionCode::In => "in",
            JurisdictionCode::Eu => "eu",
            JurisdictionCode::Uk => "uk",
            JurisdictionCode::Ca => "ca",
            JurisdictionCode::Au => "au",
            JurisdictionCode::UsCa => "us-ca",
            JurisdictionCode::Other => "other",
        }
    }
}

/// A privacy regime shown to the user. Immutable; selecting a new one fully
/// replaces the current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jurisdiction {
    pub code: JurisdictionCode,
    pub name: &'static str,
    pub description: &'static str,
    pub region: &'static str,
}

const INDIA: Jurisdiction = Jurisdiction {
    code: JurisdictionCode::In,
    name: "India",
    description: "the Digital Personal Data Protection Act 2023 applies to you.",
    region: "IN",
};

const EUROPEAN_UNION: Jurisdiction = Jurisdiction {
    code: JurisdictionCode::Eu,
    name: "European Union",
    description: "the General Data Protection Regulation (GDPR) applies to you.",
    region: "EU",
};

const UNITED_KINGDOM: Jurisdiction = Jurisdiction {
    code: JurisdictionCode::Uk,
    name: "United Kingdom",
    description: "UK GDPR and Data Protection Act 2018 apply to you.",
    region: "UK",
};

const CANADA: Jurisdiction = Jurisdiction {
    code: JurisdictionCode::Ca,
    name: "Canada",
    description: "PIPEDA and provincial privacy laws apply to you.",
    region: "CA",
};

const AUSTRALIA: Jurisdiction = Jurisdiction {
    code: JurisdictionCode::Au,
    name: "Australia",
    description: "the Privacy Act 1988 and Australian Privacy Principles apply to you.",
    region: "AU",
};

const UNITED_STATES: Jurisdiction = Jurisdiction {
    code: JurisdictionCode::UsCa,
    name: "United States",
    description: "US privacy laws including CCPA apply to you.",
    region: "US",
};

// CCPA wording when the lookup places the user in California itself. Same
// code as UNITED_STATES: CCPA-style protections are the default for all US
// traffic, intentionally over-inclusive.
const CALIFORNIA: Jurisdiction = Jurisdiction {
    code: JurisdictionCode::UsCa,
    name: "California, United States",
    description: "the California Consumer Privacy Act (CCPA/CPRA) applies to you.",
    region: "US-CA",
};

const INTERNATIONAL: Jurisdiction = Jurisdiction {
    code: JurisdictionCode::Other,
    name: "International",
    description: "international privacy standards and human rights principles apply to you.",
    region: "INTL",
};

const EU_COUNTRIES: [&str; 27] = [
    "AT", "BE", "BG", "HR", "CY", "CZ", "DK", "EE", "FI", "FR", "DE", "GR", "HU", "IE", "IT",
    "LV", "LT", "LU", "MT", "NL", "PL", "PT", "RO", "SK", "SI", "ES", "SE",
];

const US_TIMEZONES: [&str; 4] = [
    "America/Los_Angeles",
    "America/New_York",
    "America/Chicago",
    "America/Denver",
];

impl Jurisdiction {
    /// Canonical entry for a code, as used by the manual override buttons.
    pub fn for_code(code: JurisdictionCode) -> Jurisdiction {
        match code {
            JurisdictionCode::In => INDIA,
            JurisdictionCode::Eu => EUROPEAN_UNION,
            JurisdictionCode::Uk => UNITED_KINGDOM,
            JurisdictionCode::Ca => CANADA,
            JurisdictionCode::Au => AUSTRALIA,
            JurisdictionCode::UsCa => UNITED_STATES,
            JurisdictionCode::Other => INTERNATIONAL,
        }
    }

    /// Best-effort guess from locale and timezone alone, no network.
    /// Ordered because the signals overlap: English alone says nothing, so
    /// the more specific regions are ruled out first.
    pub fn from_signals(signals: &LocaleSignals) -> Jurisdiction {
        let language = signals.language.as_str();
        let timezone = signals.timezone.as_str();

        let india_language = |lang: &str| lang.starts_with("hi") || lang.starts_with("en-IN");
        if timezone.contains("Asia/Kolkata")
            || timezone.contains("Asia/Calcutta")
            || india_language(language)
            || signals.languages.iter().any(|lang| india_language(lang))
            || language.contains("IN")
        {
            return INDIA;
        }

        if timezone.starts_with("Europe/") && !timezone.contains("Europe/London") {
            return EUROPEAN_UNION;
        }

        if language.starts_with("en-GB") || timezone.contains("Europe/London") {
            return UNITED_KINGDOM;
        }

        if language.starts_with("en-CA")
            || language.starts_with("fr-CA")
            || timezone.contains("America/Toronto")
            || timezone.contains("America/Vancouver")
            || timezone.contains("America/Montreal")
        {
            return CANADA;
        }

        if timezone.starts_with("Australia/")
            || language.starts_with("en-AU")
            || timezone.contains("Pacific/Auckland")
        {
            return AUSTRALIA;
        }

        if language.starts_with("en-US") || US_TIMEZONES.iter().any(|tz| timezone.contains(tz)) {
            return UNITED_STATES;
        }

        INTERNATIONAL
    }

    /// Maps an ISO country code (plus optional sub-region) from an IP lookup.
    pub fn from_country(country_code: &str, region: &str) -> Jurisdiction {
        let country = country_code.to_uppercase();

        if EU_COUNTRIES.contains(&country.as_str()) {
            return EUROPEAN_UNION;
        }

        match country.as_str() {
            "US" => {
                if region == "CA" || region == "California" {
                    CALIFORNIA
                } else {
                    UNITED_STATES
                }
            }
            "CA" => CANADA,
            "GB" | "UK" => UNITED_KINGDOM,
            "IN" => INDIA,
            "AU" => AUSTRALIA,
            _ => INTERNATIONAL,
        }
    }
}

/// Locally available location hints, the desktop analog of a browser's
/// language list and resolved timezone.
#[derive(Debug, Clone, Default)]
pub struct LocaleSignals {
    pub language: String,
    pub languages: Vec<String>,
    pub timezone: String,
}

impl LocaleSignals {
    pub fn from_env() -> Self {
        let language = ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|var| env::var(var).ok())
            .find_map(|raw| normalize_locale(&raw))
            .unwrap_or_default();

        let mut languages: Vec<String> = env::var("LANGUAGE")
            .map(|list| list.split(':').filter_map(normalize_locale).collect())
            .unwrap_or_default();
        if languages.is_empty() && !language.is_empty() {
            languages.push(language.clone());
        }

        LocaleSignals {
            language,
            languages,
            timezone: detect_timezone(),
        }
    }
}

/// "en_US.UTF-8" -> "en-US". The POSIX placeholders carry no location.
fn normalize_locale(raw: &str) -> Option<String> {
    let tag = raw
        .split(|c| c == '.' || c == '@')
        .next()
        .unwrap_or_default()
        .trim()
        .replace('_', "-");
    if tag.is_empty() || tag == "C" || tag == "POSIX" {
        None
    } else {
        Some(tag)
    }
}

fn detect_timezone() -> String {
    if let Ok(tz) = env::var("TZ") {
        let tz = tz.trim_start_matches(':').trim();
        if !tz.is_empty() {
            return tz.to_string();
        }
    }

    if let Ok(zone) = fs::read_to_string("/etc/timezone") {
        let zone = zone.trim();
        if !zone.is_empty() {
            return zone.to_string();
        }
    }

    if let Ok(target) = fs::read_link("/etc/localtime") {
        let target = target.to_string_lossy().into_owned();
        if let Some(idx) = target.find("/zoneinfo/") {
            return target[idx + "/zoneinfo/".len()..].to_string();
        }
    }

    String::new()
}
