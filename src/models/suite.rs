//! Probe suites
//!
//! Defines the seven suites a run can select.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Probe suites against the estimation API
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Suite {
    Core,
    Auth,
    Estimate,
    Leads,
    Otp,
    Locations,
    DvfDates,
}

impl Suite {
    /// Suite number (1-7)
    pub fn number(&self) -> u8 {
        match self {
            Suite::Core => 1,
            Suite::Auth => 2,
            Suite::Estimate => 3,
            Suite::Leads => 4,
            Suite::Otp => 5,
            Suite::Locations => 6,
            Suite::DvfDates => 7,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Suite::Core => "Core API",
            Suite::Auth => "Authentication",
            Suite::Estimate => "Estimation",
            Suite::Leads => "Lead Management",
            Suite::Otp => "SMS OTP",
            Suite::Locations => "Location Survey",
            Suite::DvfDates => "DVF Date Ranges",
        }
    }

    /// Identifier accepted on the command line
    pub fn slug(&self) -> &'static str {
        match self {
            Suite::Core => "core",
            Suite::Auth => "auth",
            Suite::Estimate => "estimate",
            Suite::Leads => "leads",
            Suite::Otp => "otp",
            Suite::Locations => "locations",
            Suite::DvfDates => "dvf-dates",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Suite::Core => "Health, geocoding, DVF comparables, market listings, 404 handling",
            Suite::Auth => "Admin login, JWT-protected lead listing and DVF status",
            Suite::Estimate => "Full estimation (DVF + market) and parameter validation",
            Suite::Leads => "Lead submission, update, comment and deletion lifecycle",
            Suite::Otp => "SMS OTP send/verify/resend, bypass number, validation",
            Suite::Locations => "Estimation across French cities and surface/type edge cases",
            Suite::DvfDates => "DVF comparables across lookback windows vs /estimate",
        }
    }

    /// Diagnostic suites are only run when selected explicitly
    pub fn is_diagnostic(&self) -> bool {
        matches!(self, Suite::Locations | Suite::DvfDates)
    }

    pub fn all() -> Vec<Suite> {
        vec![
            Suite::Core,
            Suite::Auth,
            Suite::Estimate,
            Suite::Leads,
            Suite::Otp,
            Suite::Locations,
            Suite::DvfDates,
        ]
    }

    /// Suites run when none are selected
    pub fn defaults() -> Vec<Suite> {
        Self::all()
            .into_iter()
            .filter(|s| !s.is_diagnostic())
            .collect()
    }

    pub fn from_str(s: &str) -> Option<Suite> {
        match s.to_lowercase().as_str() {
            "core" | "1" => Some(Suite::Core),
            "auth" | "2" => Some(Suite::Auth),
            "estimate" | "estimation" | "3" => Some(Suite::Estimate),
            "leads" | "lead" | "4" => Some(Suite::Leads),
            "otp" | "sms" | "5" => Some(Suite::Otp),
            "locations" | "location" | "6" => Some(Suite::Locations),
            "dvf-dates" | "dvf_dates" | "dates" | "7" => Some(Suite::DvfDates),
            _ => None,
        }
    }
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Suite {}: {}", self.number(), self.name())
    }
}
