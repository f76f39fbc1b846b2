//! Request payloads sent to the estimation API
//!
//! Field names follow the API's camelCase JSON. Optional fields are left out
//! of the body entirely so validation probes can omit them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Admin login body
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Property characteristics forwarded to the estimation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Characteristics {
    pub floor: String,
    pub standing: u8,
}

impl Default for Characteristics {
    fn default() -> Self {
        Self {
            floor: "1-3".to_string(),
            standing: 4,
        }
    }
}

/// Body of `POST /api/estimate`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surface: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub characteristics: Option<Characteristics>,
}

impl EstimateRequest {
    pub fn new(
        address: impl Into<String>,
        lat: f64,
        lng: f64,
        property_type: impl Into<String>,
        surface: f64,
    ) -> Self {
        Self {
            address: Some(address.into()),
            lat: Some(lat),
            lng: Some(lng),
            property_type: Some(property_type.into()),
            surface: Some(surface),
            characteristics: None,
        }
    }

    /// Only an address, which the API must reject
    pub fn address_only(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            ..Default::default()
        }
    }

    pub fn with_characteristics(mut self, characteristics: Characteristics) -> Self {
        self.characteristics = Some(characteristics);
        self
    }
}

/// Query of `GET /api/dvf/comparables`
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ComparablesQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub property_type: Option<String>,
    pub surface: Option<f64>,
    pub radius_meters: Option<u32>,
    pub months: Option<u32>,
}

impl ComparablesQuery {
    pub fn new(lat: f64, lng: f64, property_type: impl Into<String>, surface: f64) -> Self {
        Self {
            lat: Some(lat),
            lng: Some(lng),
            property_type: Some(property_type.into()),
            surface: Some(surface),
            radius_meters: None,
            months: None,
        }
    }

    pub fn radius(mut self, meters: u32) -> Self {
        self.radius_meters = Some(meters);
        self
    }

    pub fn months(mut self, months: u32) -> Self {
        self.months = Some(months);
        self
    }

    /// Query parameters in the order the API documents them
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        push_param(&mut params, "lat", self.lat);
        push_param(&mut params, "lng", self.lng);
        push_param(&mut params, "type", self.property_type.as_ref());
        push_param(&mut params, "surface", self.surface);
        push_param(&mut params, "radiusMeters", self.radius_meters);
        push_param(&mut params, "months", self.months);
        params
    }
}

/// Query of `GET /api/market/listings`
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MarketQuery {
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub property_type: Option<String>,
    pub surface: Option<f64>,
}

impl MarketQuery {
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        push_param(&mut params, "address", self.address.as_ref());
        push_param(&mut params, "lat", self.lat);
        push_param(&mut params, "lng", self.lng);
        push_param(&mut params, "type", self.property_type.as_ref());
        push_param(&mut params, "surface", self.surface);
        params
    }
}

fn push_param<T: ToString>(params: &mut Vec<(String, String)>, key: &str, value: Option<T>) {
    if let Some(v) = value {
        params.push((key.to_string(), v.to_string()));
    }
}

/// Body of `POST /api/leads`
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub estimated_value: u64,
    pub message: String,
}

/// Body of `POST /api/admin/leads/update`
///
/// The admin console sends either a status change or a map of field updates.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadUpdate {
    pub lead_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updates: Option<serde_json::Map<String, serde_json::Value>>,
}

impl LeadUpdate {
    pub fn status(lead_id: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            lead_id: lead_id.into(),
            status: Some(status.into()),
            updates: None,
        }
    }

    pub fn field(
        lead_id: impl Into<String>,
        field: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        let mut updates = serde_json::Map::new();
        updates.insert(field.into(), value);
        Self {
            lead_id: lead_id.into(),
            status: None,
            updates: Some(updates),
        }
    }
}

/// Body of `POST /api/admin/leads/comment`
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadComment {
    pub lead_id: String,
    pub comment: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
}

/// Body of the `/api/verification/*` endpoints
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OtpRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl OtpRequest {
    pub fn phone(phone: impl Into<String>) -> Self {
        Self {
            phone: Some(phone.into()),
            code: None,
        }
    }

    pub fn code(code: impl Into<String>) -> Self {
        Self {
            phone: None,
            code: Some(code.into()),
        }
    }

    pub fn verify(phone: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            phone: Some(phone.into()),
            code: Some(code.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_estimate_request_wire_names() {
        let req = EstimateRequest::new("2 rue des italiens", 48.8712, 2.3378, "appartement", 85.0)
            .with_characteristics(Characteristics::default());
        let value = serde_json::to_value(&req).unwrap();

        assert_eq!(value["type"], "appartement");
        assert_eq!(value["surface"], 85.0);
        assert_eq!(value["characteristics"]["floor"], "1-3");
        assert_eq!(value["characteristics"]["standing"], 4);
    }

    #[test]
    fn test_address_only_omits_fields() {
        let value = serde_json::to_value(EstimateRequest::address_only("Paris")).unwrap();
        assert_eq!(value, json!({ "address": "Paris" }));
    }

    #[test]
    fn test_comparables_params() {
        let params = ComparablesQuery::new(48.8712, 2.3378, "appartement", 85.0)
            .radius(1000)
            .months(24)
            .to_params();
        let keys: Vec<_> = params.iter().map(|(k, _)| k.as_str()).collect();

        assert_eq!(
            keys,
            ["lat", "lng", "type", "surface", "radiusMeters", "months"]
        );
        assert_eq!(params[0].1, "48.8712");
        assert_eq!(params[4].1, "1000");
    }

    #[test]
    fn test_partial_comparables_params() {
        let query = ComparablesQuery {
            lat: Some(48.8712),
            ..Default::default()
        };
        assert_eq!(query.to_params().len(), 1);
    }

    #[test]
    fn test_lead_submission_camel_case() {
        let lead = LeadSubmission {
            name: "Jean Dupont".to_string(),
            email: "jean.dupont@example.com".to_string(),
            phone: "+33123456789".to_string(),
            address: "Paris".to_string(),
            estimated_value: 450_000,
            message: "hello".to_string(),
        };
        let value = serde_json::to_value(&lead).unwrap();
        assert_eq!(value["estimatedValue"], 450_000);
    }

    #[test]
    fn test_lead_update_variants() {
        let status = serde_json::to_value(LeadUpdate::status("abc", "contacted")).unwrap();
        assert_eq!(status, json!({ "leadId": "abc", "status": "contacted" }));

        let field = serde_json::to_value(LeadUpdate::field("abc", "phone", json!("+33600000000")))
            .unwrap();
        assert_eq!(field["updates"]["phone"], "+33600000000");
        assert!(field.get("status").is_none());
    }

    #[test]
    fn test_otp_request_omits_missing() {
        assert_eq!(serde_json::to_value(OtpRequest::default()).unwrap(), json!({}));
        assert_eq!(
            serde_json::to_value(OtpRequest::code("123456")).unwrap(),
            json!({ "code": "123456" })
        );
    }
}
