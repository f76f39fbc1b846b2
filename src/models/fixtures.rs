//! Literal probe inputs
//!
//! Addresses, coordinates and phone numbers the probes send. The defaults
//! match the preview deployment's seeded data.

use serde::{Deserialize, Serialize};

use super::api::{Characteristics, ComparablesQuery, EstimateRequest};

pub const DEFAULT_BYPASS_PHONE: &str = "0698793430";
pub const DEFAULT_ADMIN_USERNAME: &str = "Micael";
pub const DEFAULT_ADMIN_PASSWORD: &str = "Micael123";

/// Property probed by the core, auth, estimate and lead suites
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Property {
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(rename = "type")]
    pub property_type: String,
    pub surface: f64,
}

impl Default for Property {
    fn default() -> Self {
        Self {
            address: "2 rue des italiens, 75009 Paris".to_string(),
            lat: 48.8712,
            lng: 2.3378,
            property_type: "appartement".to_string(),
            surface: 85.0,
        }
    }
}

impl Property {
    pub fn estimate(&self) -> EstimateRequest {
        EstimateRequest::new(
            &self.address,
            self.lat,
            self.lng,
            &self.property_type,
            self.surface,
        )
    }

    pub fn comparables(&self) -> ComparablesQuery {
        ComparablesQuery::new(self.lat, self.lng, &self.property_type, self.surface)
    }
}

/// One surveyed location
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub property: Property,
}

impl Location {
    fn new(name: &str, address: &str, lat: f64, lng: f64, surface: f64) -> Self {
        Self::with_type(name, address, lat, lng, "appartement", surface)
    }

    fn with_type(
        name: &str,
        address: &str,
        lat: f64,
        lng: f64,
        property_type: &str,
        surface: f64,
    ) -> Self {
        Self {
            name: name.to_string(),
            property: Property {
                address: address.to_string(),
                lat,
                lng,
                property_type: property_type.to_string(),
                surface,
            },
        }
    }

    pub fn estimate(&self) -> EstimateRequest {
        self.property
            .estimate()
            .with_characteristics(Characteristics::default())
    }
}

const CHAMPS_ELYSEES: &str = "15 Avenue des Champs-Élysées, 75008 Paris";

/// Locations across France used by the survey suite
pub fn survey_locations() -> Vec<Location> {
    vec![
        Location::new(
            "Champs-Élysées Paris",
            CHAMPS_ELYSEES,
            48.8698,
            2.3085,
            80.0,
        ),
        Location::new("Marais Paris", "Place des Vosges, 75004 Paris", 48.8555, 2.3665, 75.0),
        Location::new(
            "Montparnasse Paris",
            "Tour Montparnasse, 75015 Paris",
            48.8420,
            2.3219,
            85.0,
        ),
        Location::new("Lyon Presqu'île", "Place Bellecour, 69002 Lyon", 45.7578, 4.8320, 70.0),
        Location::new(
            "Marseille Vieux-Port",
            "Vieux-Port, 13001 Marseille",
            43.2951,
            5.3781,
            65.0,
        ),
        Location::new(
            "Nice Promenade",
            "Promenade des Anglais, 06000 Nice",
            43.6947,
            7.2659,
            60.0,
        ),
    ]
}

/// Parameter extremes around the Champs-Élysées case
pub fn edge_cases() -> Vec<Location> {
    vec![
        Location::new("Very small surface", CHAMPS_ELYSEES, 48.8698, 2.3085, 15.0),
        Location::new("Very large surface", CHAMPS_ELYSEES, 48.8698, 2.3085, 300.0),
        Location::with_type(
            "House instead of apartment",
            CHAMPS_ELYSEES,
            48.8698,
            2.3085,
            "maison",
            80.0,
        ),
        Location::new("Remote location", "Rural France", 46.0, 2.0, 80.0),
    ]
}

/// Reference case for the DVF date diagnostics
pub fn date_probe_location() -> Location {
    Location::new("Champs-Élysées Paris", CHAMPS_ELYSEES, 48.8698, 2.3085, 80.0)
}

/// Lookback windows (months) swept by the date diagnostics
pub const MONTH_SWEEP: [u32; 6] = [6, 12, 18, 24, 30, 36];
pub const WIDE_LOOKBACK_MONTHS: u32 = 60;
pub const DATE_PROBE_RADIUS: u32 = 500;

/// Phone numbers used by the OTP suite
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PhoneFixtures {
    pub bypass: String,
    /// Valid numbers that trigger a real SMS
    pub deliverable: String,
    pub resend: String,
    /// Valid but never sent a code
    pub unknown: String,
    pub invalid: String,
    pub any_code: String,
}

impl PhoneFixtures {
    pub fn new(bypass: impl Into<String>) -> Self {
        Self {
            bypass: bypass.into(),
            deliverable: "06 12 34 56 78".to_string(),
            resend: "06 33 22 11 00".to_string(),
            unknown: "06 99 88 77 66".to_string(),
            invalid: "12345".to_string(),
            any_code: "123456".to_string(),
        }
    }

    /// Spellings of one number the API must normalise identically
    pub fn normalization_inputs() -> Vec<(&'static str, &'static str)> {
        vec![
            ("0612345678", "Should normalize 06... to +336..."),
            ("+33612345678", "Should accept +33... format"),
            ("06 12 34 56 78", "Should handle spaces"),
        ]
    }
}

impl Default for PhoneFixtures {
    fn default() -> Self {
        Self::new(DEFAULT_BYPASS_PHONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_property() {
        let property = Property::default();
        assert_eq!(property.lat, 48.8712);
        assert_eq!(property.property_type, "appartement");
        assert_eq!(property.comparables().to_params().len(), 4);
    }

    #[test]
    fn test_survey_fixtures() {
        assert_eq!(survey_locations().len(), 6);
        let edges = edge_cases();
        assert_eq!(edges.len(), 4);
        assert_eq!(
            edges[2].property.property_type, "maison",
            "third edge case probes a house"
        );
    }

    #[test]
    fn test_location_estimate_has_characteristics() {
        let request = date_probe_location().estimate();
        assert_eq!(request.characteristics, Some(Characteristics::default()));
    }
}
