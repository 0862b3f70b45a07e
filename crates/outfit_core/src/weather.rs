//! Sky condition and season vocabularies
//!
//! The classifier is trained on a fixed five-value sky vocabulary. Weather
//! providers report a wider set of categories; [`ProviderCategory`] lists
//! them and [`ProviderCategory::sky_condition`] is the single mapping table.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::errors::{OutfitError, Result};
use crate::pipeline::Observation;

/// Sky condition vocabulary used by the training data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkyCondition {
    Sunny,
    Cloudy,
    Rainy,
    Snowy,
    Windy,
}

impl SkyCondition {
    pub const ALL: [SkyCondition; 5] = [
        SkyCondition::Sunny,
        SkyCondition::Cloudy,
        SkyCondition::Rainy,
        SkyCondition::Snowy,
        SkyCondition::Windy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SkyCondition::Sunny => "sunny",
            SkyCondition::Cloudy => "cloudy",
            SkyCondition::Rainy => "rainy",
            SkyCondition::Snowy => "snowy",
            SkyCondition::Windy => "windy",
        }
    }
}

impl fmt::Display for SkyCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkyCondition {
    type Err = OutfitError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|sky| sky.as_str() == s)
            .ok_or_else(|| OutfitError::unknown_category("weather", s))
    }
}

/// Season vocabulary used by the training data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Winter, Season::Spring, Season::Summer, Season::Autumn];

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
        }
    }

    /// Meteorological season for a calendar month (1 = January)
    pub fn from_month(month: u32) -> Result<Self> {
        match month {
            12 | 1 | 2 => Ok(Season::Winter),
            3..=5 => Ok(Season::Spring),
            6..=8 => Ok(Season::Summer),
            9..=11 => Ok(Season::Autumn),
            _ => Err(OutfitError::InvalidInput(format!(
                "month {} is outside 1..=12",
                month
            ))),
        }
    }

    /// Season of the given date
    pub fn for_date<D: Datelike>(date: &D) -> Self {
        // chrono months are always within 1..=12
        Self::from_month(date.month()).unwrap_or(Season::Winter)
    }

    /// Season of today's local date
    pub fn current() -> Self {
        Self::for_date(&chrono::Local::now().date_naive())
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = OutfitError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|season| season.as_str() == s)
            .ok_or_else(|| OutfitError::unknown_category("season", s))
    }
}

/// Weather groups reported by the upstream weather provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderCategory {
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Thunderstorm,
    Snow,
    Mist,
    Fog,
    Wind,
    Haze,
    Smoke,
    Dust,
    Sand,
    Ash,
    Squall,
    Tornado,
}

impl ProviderCategory {
    pub const ALL: [ProviderCategory; 16] = [
        ProviderCategory::Clear,
        ProviderCategory::Clouds,
        ProviderCategory::Rain,
        ProviderCategory::Drizzle,
        ProviderCategory::Thunderstorm,
        ProviderCategory::Snow,
        ProviderCategory::Mist,
        ProviderCategory::Fog,
        ProviderCategory::Wind,
        ProviderCategory::Haze,
        ProviderCategory::Smoke,
        ProviderCategory::Dust,
        ProviderCategory::Sand,
        ProviderCategory::Ash,
        ProviderCategory::Squall,
        ProviderCategory::Tornado,
    ];

    /// Name as reported by the provider; parsing requires this exact spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderCategory::Clear => "Clear",
            ProviderCategory::Clouds => "Clouds",
            ProviderCategory::Rain => "Rain",
            ProviderCategory::Drizzle => "Drizzle",
            ProviderCategory::Thunderstorm => "Thunderstorm",
            ProviderCategory::Snow => "Snow",
            ProviderCategory::Mist => "Mist",
            ProviderCategory::Fog => "Fog",
            ProviderCategory::Wind => "Wind",
            ProviderCategory::Haze => "Haze",
            ProviderCategory::Smoke => "Smoke",
            ProviderCategory::Dust => "Dust",
            ProviderCategory::Sand => "Sand",
            ProviderCategory::Ash => "Ash",
            ProviderCategory::Squall => "Squall",
            ProviderCategory::Tornado => "Tornado",
        }
    }

    /// Sky condition the category maps to, `None` when it has no counterpart
    pub fn sky_condition(&self) -> Option<SkyCondition> {
        match self {
            ProviderCategory::Clear => Some(SkyCondition::Sunny),
            ProviderCategory::Clouds | ProviderCategory::Mist | ProviderCategory::Fog => {
                Some(SkyCondition::Cloudy)
            }
            ProviderCategory::Rain | ProviderCategory::Drizzle | ProviderCategory::Thunderstorm => {
                Some(SkyCondition::Rainy)
            }
            ProviderCategory::Snow => Some(SkyCondition::Snowy),
            ProviderCategory::Wind => Some(SkyCondition::Windy),
            ProviderCategory::Haze
            | ProviderCategory::Smoke
            | ProviderCategory::Dust
            | ProviderCategory::Sand
            | ProviderCategory::Ash
            | ProviderCategory::Squall
            | ProviderCategory::Tornado => None,
        }
    }
}

impl FromStr for ProviderCategory {
    type Err = OutfitError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| OutfitError::unknown_category("provider category", s))
    }
}

/// Policy for provider categories without a sky condition counterpart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkyFallback {
    /// Reject with `UnknownCategory`
    #[default]
    Strict,
    /// Treat as sunny
    Sunny,
}

/// Map a raw provider category name onto the sky vocabulary
pub fn map_provider_category(raw: &str, fallback: SkyFallback) -> Result<SkyCondition> {
    let mapped = raw
        .parse::<ProviderCategory>()
        .ok()
        .and_then(|category| category.sky_condition());

    match (mapped, fallback) {
        (Some(sky), _) => Ok(sky),
        (None, SkyFallback::Sunny) => {
            warn!(category = raw, "unmapped provider category, falling back to sunny");
            Ok(SkyCondition::Sunny)
        }
        (None, SkyFallback::Strict) => Err(OutfitError::unknown_category("provider category", raw)),
    }
}

/// Current conditions as returned by the weather provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderReport {
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub category: String,
}

impl ProviderReport {
    /// Convert into a model observation for the given season
    pub fn into_observation(self, season: Season, fallback: SkyFallback) -> Result<Observation> {
        let sky = map_provider_category(&self.category, fallback)?;
        Ok(Observation::new(
            self.temperature,
            self.humidity,
            self.wind_speed,
            sky.as_str(),
            season.as_str(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_provider_table() {
        let cases = [
            ("Clear", SkyCondition::Sunny),
            ("Clouds", SkyCondition::Cloudy),
            ("Rain", SkyCondition::Rainy),
            ("Snow", SkyCondition::Snowy),
            ("Wind", SkyCondition::Windy),
            ("Drizzle", SkyCondition::Rainy),
            ("Thunderstorm", SkyCondition::Rainy),
            ("Mist", SkyCondition::Cloudy),
            ("Fog", SkyCondition::Cloudy),
        ];
        for (raw, expected) in cases {
            assert_eq!(
                map_provider_category(raw, SkyFallback::Strict).unwrap(),
                expected,
                "{}",
                raw
            );
        }
    }

    #[test]
    fn test_unmapped_category_strict() {
        let err = map_provider_category("Tornado", SkyFallback::Strict).unwrap_err();
        assert!(matches!(err, OutfitError::UnknownCategory { .. }));

        let err = map_provider_category("Volcano", SkyFallback::Strict).unwrap_err();
        assert!(matches!(err, OutfitError::UnknownCategory { .. }));
    }

    #[test]
    fn test_unmapped_category_sunny_fallback() {
        assert_eq!(
            map_provider_category("Smoke", SkyFallback::Sunny).unwrap(),
            SkyCondition::Sunny
        );
        assert_eq!(
            map_provider_category("Volcano", SkyFallback::Sunny).unwrap(),
            SkyCondition::Sunny
        );
    }

    #[test]
    fn test_provider_category_names_are_exact() {
        for category in ProviderCategory::ALL {
            assert_eq!(category.as_str().parse::<ProviderCategory>().unwrap(), category);
        }
        for raw in ["clouds", "CLEAR", " Rain", "Snow "] {
            assert!(matches!(
                map_provider_category(raw, SkyFallback::Strict),
                Err(OutfitError::UnknownCategory { .. })
            ));
        }
        // Misspelled names are unmapped, so the lenient policy applies
        assert_eq!(
            map_provider_category("rain", SkyFallback::Sunny).unwrap(),
            SkyCondition::Sunny
        );
    }

    #[test]
    fn test_season_from_month() {
        let expected = [
            (1, Season::Winter),
            (2, Season::Winter),
            (3, Season::Spring),
            (5, Season::Spring),
            (6, Season::Summer),
            (8, Season::Summer),
            (9, Season::Autumn),
            (11, Season::Autumn),
            (12, Season::Winter),
        ];
        for (month, season) in expected {
            assert_eq!(Season::from_month(month).unwrap(), season);
        }
        assert!(Season::from_month(0).is_err());
        assert!(Season::from_month(13).is_err());
    }

    #[test]
    fn test_season_for_date() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 14).unwrap();
        assert_eq!(Season::for_date(&date), Season::Summer);
    }

    #[test]
    fn test_vocabulary_strings_round_trip() {
        for sky in SkyCondition::ALL {
            assert_eq!(sky.as_str().parse::<SkyCondition>().unwrap(), sky);
        }
        for season in Season::ALL {
            assert_eq!(season.to_string().parse::<Season>().unwrap(), season);
        }
    }

    #[test]
    fn test_report_into_observation() {
        let report = ProviderReport {
            temperature: 12.5,
            humidity: 81.0,
            wind_speed: 14.0,
            category: "Drizzle".to_string(),
        };
        let obs = report
            .into_observation(Season::Autumn, SkyFallback::Strict)
            .unwrap();
        assert_eq!(obs.sky_condition, "rainy");
        assert_eq!(obs.season, "autumn");
        assert_eq!(obs.temperature, 12.5);
    }
}
