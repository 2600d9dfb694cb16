//! Forecast text classification and icon selection.
//!
//! api.weather.gov short forecasts are free text ("Slight Chance Rain
//! Showers then Partly Cloudy"). One priority-ordered keyword table drives
//! both the abbreviated labels under the icon and the icon choice itself,
//! so the two can never disagree about what the forecast "is".
//!
//! Ordering matters: specific phrases ("Partly Sunny") come before the
//! generic words they contain ("Sunny"), and storm terms come first so a
//! stormy forecast is never summarised as its secondary condition.

/// Weather category behind an icon slot. Day/night rendering is resolved
/// separately by [`icon_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconKind {
    Clear,
    PartlyCloudy,
    Cloudy,
    Rain,
    Snow,
    Thunderstorm,
    Fog,
}

/// Concrete 32x32 bitmap selector handed to the display port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    ClearDay,
    ClearNight,
    PartlyCloudyDay,
    PartlyCloudyNight,
    Cloudy,
    Rain,
    Snow,
    Thunderstorm,
    Fog,
}

struct Rule {
    keyword: &'static str,
    label: &'static str,
    icon: Option<IconKind>,
}

const fn rule(keyword: &'static str, label: &'static str, icon: Option<IconKind>) -> Rule {
    Rule {
        keyword,
        label,
        icon,
    }
}

/// The canonical priority table. Keywords are lowercase; matching is
/// case-insensitive substring.
const RULES: &[Rule] = &[
    rule("thunderstorms", "Tstorms", Some(IconKind::Thunderstorm)),
    rule("t-storms", "Tstorms", Some(IconKind::Thunderstorm)),
    rule("tstorms", "Tstorms", Some(IconKind::Thunderstorm)),
    rule("partly sunny", "P Sunny", Some(IconKind::PartlyCloudy)),
    rule("mostly sunny", "M Sunny", Some(IconKind::Clear)),
    rule("partly cloudy", "P Cloudy", Some(IconKind::PartlyCloudy)),
    rule("mostly cloudy", "M Cloudy", Some(IconKind::Cloudy)),
    rule("sunny", "Sunny", Some(IconKind::Clear)),
    rule("clear", "Clear", Some(IconKind::Clear)),
    rule("overcast", "Overcast", Some(IconKind::Cloudy)),
    rule("cloudy", "Cloudy", Some(IconKind::Cloudy)),
    rule("showers", "Showers", Some(IconKind::Rain)),
    rule("rain", "Rain", Some(IconKind::Rain)),
    rule("drizzle", "Drizzle", Some(IconKind::Rain)),
    rule("sleet", "Sleet", Some(IconKind::Snow)),
    rule("snow", "Snow", Some(IconKind::Snow)),
    rule("flurries", "Flurries", Some(IconKind::Snow)),
    rule("fog", "Fog", Some(IconKind::Fog)),
    rule("haze", "Haze", Some(IconKind::Fog)),
    rule("storm", "Tstorms", Some(IconKind::Thunderstorm)),
    rule("wind", "Windy", None),
    rule("slight chance", "Chc", None),
    rule("chance", "Chc", None),
];

/// Maximum labels rendered under the icon.
pub const MAX_LABELS: usize = 2;

/// Reduce a short forecast to at most two abbreviated labels in table
/// priority order, deduplicated. Text matching nothing falls back to its
/// first eight characters so the display always shows something.
pub fn classify(forecast: &str) -> Vec<String> {
    let haystack = forecast.to_ascii_lowercase();
    let mut labels: Vec<String> = Vec::new();

    for r in RULES {
        if labels.len() == MAX_LABELS {
            break;
        }
        if haystack.contains(r.keyword) && !labels.iter().any(|l| l == r.label) {
            labels.push(r.label.to_string());
        }
    }

    if labels.is_empty() && !forecast.is_empty() {
        labels.push(forecast.chars().take(8).collect());
    }
    labels
}

/// Pick the display icon for a forecast. The first table entry that both
/// matches and carries an icon wins; an unmatched forecast shows the clear
/// sky icon for the current part of day.
pub fn icon_for(forecast: &str, daytime: bool) -> Icon {
    let haystack = forecast.to_ascii_lowercase();
    let kind = RULES
        .iter()
        .filter(|r| r.icon.is_some())
        .find(|r| haystack.contains(r.keyword))
        .and_then(|r| r.icon)
        .unwrap_or(IconKind::Clear);
    variant(kind, daytime)
}

fn variant(kind: IconKind, daytime: bool) -> Icon {
    match (kind, daytime) {
        (IconKind::Clear, true) => Icon::ClearDay,
        (IconKind::Clear, false) => Icon::ClearNight,
        (IconKind::PartlyCloudy, true) => Icon::PartlyCloudyDay,
        (IconKind::PartlyCloudy, false) => Icon::PartlyCloudyNight,
        (IconKind::Cloudy, _) => Icon::Cloudy,
        (IconKind::Rain, _) => Icon::Rain,
        (IconKind::Snow, _) => Icon::Snow,
        (IconKind::Thunderstorm, _) => Icon::Thunderstorm,
        (IconKind::Fog, _) => Icon::Fog,
    }
}
