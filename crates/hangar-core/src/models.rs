//! Core data models for the hangar record-keeper.
//!
//! Wire field names are camelCase to match the legacy browser client.
//! Every entity except `User` is scoped to its owning user; the owner id
//! never appears in a projection.

use serde::{Deserialize, Deserializer, Serialize};

/// An authenticated user. The password hash never leaves the database row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub created_at: String,
}

/// One entry of a drone type's default-parts template.
///
/// The legacy client stored template entries both as bare part names and as
/// `{name, manufacturerId}` objects; both forms are accepted on input and
/// objects are emitted on output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultPart {
    Name(String),
    #[serde(rename_all = "camelCase")]
    Spec {
        name: String,
        #[serde(default)]
        manufacturer_id: Option<i64>,
    },
}

impl DefaultPart {
    pub fn name(&self) -> &str {
        match self {
            DefaultPart::Name(name) => name,
            DefaultPart::Spec { name, .. } => name,
        }
    }

    pub fn manufacturer_id(&self) -> Option<i64> {
        match self {
            DefaultPart::Name(_) => None,
            DefaultPart::Spec {
                manufacturer_id, ..
            } => *manufacturer_id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DroneType {
    pub id: i64,
    pub name: String,
    pub default_parts: Vec<DefaultPart>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manufacturer {
    pub id: i64,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Drone {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub type_id: i64,
    pub type_name: String,
    pub start_date: String,
    pub photo: Option<String>,
    pub status: String,
    /// Ids of the parts mounted on this drone.
    pub parts: Vec<i64>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    pub id: i64,
    pub drone_id: i64,
    pub name: String,
    pub start_date: String,
    pub manufacturer_id: Option<i64>,
    /// Denormalized manufacturer display name; null when no manufacturer is
    /// set or the manufacturer row was deleted.
    pub manufacturer_name: Option<String>,
    /// Client-defined replacement log entries, newest last.
    pub replacement_history: Vec<serde_json::Value>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Repair {
    pub id: i64,
    pub drone_id: i64,
    pub part_id: Option<i64>,
    pub date: String,
    pub description: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeDay {
    pub id: i64,
    pub date: String,
    pub note: Option<String>,
    pub created_at: String,
}

// ==================== Request payloads ====================
//
// Required fields are `Option` so that a missing key surfaces as a 400
// validation error rather than a body-rejection; the handlers run the
// trim-and-require checks.

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDroneType {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub default_parts: Vec<DefaultPart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateManufacturer {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDrone {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub type_id: Option<i64>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePart {
    #[serde(default)]
    pub drone_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub manufacturer_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRepair {
    #[serde(default)]
    pub drone_id: Option<i64>,
    #[serde(default)]
    pub part_id: Option<i64>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePracticeDay {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

// ==================== Partial updates ====================
//
// `None` means "do not touch". Nullable columns use a double `Option` so an
// explicit JSON `null` clears the value while an absent key leaves it alone.

/// Deserialize a present-but-possibly-null field into `Some(inner)`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroneTypeUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub default_parts: Option<Vec<DefaultPart>>,
}

impl DroneTypeUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.default_parts.is_none()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManufacturerUpdate {
    #[serde(default)]
    pub name: Option<String>,
}

impl ManufacturerUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroneUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub type_id: Option<i64>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub photo: Option<Option<String>>,
    #[serde(default)]
    pub status: Option<String>,
}

impl DroneUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.type_id.is_none()
            && self.start_date.is_none()
            && self.photo.is_none()
            && self.status.is_none()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub manufacturer_id: Option<Option<i64>>,
    #[serde(default)]
    pub replacement_history: Option<Vec<serde_json::Value>>,
}

impl PartUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.start_date.is_none()
            && self.manufacturer_id.is_none()
            && self.replacement_history.is_none()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairUpdate {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl RepairUpdate {
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.description.is_none()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeDayUpdate {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub note: Option<Option<String>>,
}

impl PracticeDayUpdate {
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.note.is_none()
    }
}

// ==================== Bulk import snapshot ====================
//
// A one-shot export of the legacy client's local storage. Collections are
// keyed by the client's original ids, which may be numbers or strings;
// `client_key` normalizes them for the remap tables.

#[derive(Debug, Default, Deserialize)]
pub struct ImportSnapshot {
    #[serde(default)]
    pub drone_types: Vec<SnapshotDroneType>,
    #[serde(default)]
    pub manufacturers: Vec<SnapshotManufacturer>,
    #[serde(default)]
    pub drones: Vec<SnapshotDrone>,
    #[serde(default)]
    pub parts: Vec<SnapshotPart>,
    #[serde(default)]
    pub repairs: Vec<SnapshotRepair>,
    #[serde(default)]
    pub practice_days: Vec<SnapshotPracticeDay>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotDroneType {
    pub name: String,
    #[serde(default)]
    pub default_parts: Vec<DefaultPart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotManufacturer {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotDrone {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    pub name: String,
    #[serde(default)]
    pub type_name: Option<String>,
    pub start_date: String,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotPart {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub drone_id: Option<serde_json::Value>,
    pub name: String,
    pub start_date: String,
    #[serde(default)]
    pub manufacturer_id: Option<serde_json::Value>,
    #[serde(default)]
    pub replacement_history: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRepair {
    #[serde(default)]
    pub drone_id: Option<serde_json::Value>,
    #[serde(default)]
    pub part_id: Option<serde_json::Value>,
    pub date: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotPracticeDay {
    pub date: String,
    #[serde(default)]
    pub note: Option<String>,
}

/// Normalize a client-assigned id (number or string) into a map key.
pub fn client_key(id: &serde_json::Value) -> String {
    match id {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_part_accepts_bare_name() {
        let part: DefaultPart = serde_json::from_str("\"Propeller\"").unwrap();
        assert_eq!(part.name(), "Propeller");
        assert_eq!(part.manufacturer_id(), None);
    }

    #[test]
    fn default_part_accepts_object_form() {
        let part: DefaultPart =
            serde_json::from_str(r#"{"name": "Motor", "manufacturerId": 7}"#).unwrap();
        assert_eq!(part.name(), "Motor");
        assert_eq!(part.manufacturer_id(), Some(7));
    }

    #[test]
    fn default_part_object_without_manufacturer() {
        let part: DefaultPart = serde_json::from_str(r#"{"name": "Frame"}"#).unwrap();
        assert_eq!(part.name(), "Frame");
        assert_eq!(part.manufacturer_id(), None);
    }

    #[test]
    fn update_distinguishes_null_from_absent() {
        let update: PartUpdate = serde_json::from_str(r#"{"manufacturerId": null}"#).unwrap();
        assert_eq!(update.manufacturer_id, Some(None));
        assert!(!update.is_empty());

        let update: PartUpdate = serde_json::from_str(r#"{"name": "ESC"}"#).unwrap();
        assert_eq!(update.manufacturer_id, None);
        assert_eq!(update.name.as_deref(), Some("ESC"));
    }

    #[test]
    fn empty_update_is_detected() {
        let update: DroneUpdate = serde_json::from_str("{}").unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn client_key_normalizes_numbers_and_strings() {
        assert_eq!(client_key(&serde_json::json!(17)), "17");
        assert_eq!(client_key(&serde_json::json!("local-17")), "local-17");
    }

    #[test]
    fn snapshot_tolerates_missing_collections() {
        let snapshot: ImportSnapshot =
            serde_json::from_str(r#"{"manufacturers": [{"name": "iFlight"}]}"#).unwrap();
        assert_eq!(snapshot.manufacturers.len(), 1);
        assert!(snapshot.drones.is_empty());
    }
}
