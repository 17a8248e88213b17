use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::feed::timefmt::{format_date, parse_wire_timestamp};

/// Envelope for `GET /api/notifications/`.
#[derive(Debug, Deserialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<RawNotification>,
}

/// A notification exactly as the backend sends it. Structural problems are
/// decode errors at the client boundary; merely missing optional data
/// (location, allergies, resolution message) is handled downstream with
/// defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct RawNotification {
    pub notification_id: u64,
    #[serde(rename = "fromUserId")]
    pub from_user_id: u64,
    #[serde(rename = "emergencyTypeId")]
    pub emergency_type_id: u64,
    #[serde(rename = "statusId")]
    pub status_id: u64,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
    pub user: CallerRecord,
    pub status: StatusRecord,
    #[serde(rename = "emergencyType")]
    pub emergency_type: EmergencyTypeRecord,
    #[serde(default)]
    pub location: Option<LocationRecord>,
    #[serde(rename = "resolutionMessage", default)]
    pub resolution_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallerRecord {
    pub id: u64,
    #[serde(rename = "fullName")]
    pub full_name: String,
    #[serde(default)]
    pub allergies: Option<String>,
    #[serde(rename = "emergencyContacts", default)]
    pub emergency_contacts: Vec<EmergencyContactRecord>,
    #[serde(rename = "bloodType", default)]
    pub blood_type: Option<BloodTypeRecord>,
    #[serde(rename = "medicalAid", default)]
    pub medical_aid: Option<MedicalAidRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusRecord {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmergencyTypeRecord {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationRecord {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmergencyContactRecord {
    pub id: u64,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub relation: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BloodTypeRecord {
    pub id: u64,
    #[serde(rename = "type")]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MedicalAidRecord {
    pub id: u64,
    pub name: String,
}

/// Envelope for `GET /api/users`.
#[derive(Debug, Deserialize)]
pub struct UsersResponse {
    pub users: Vec<ApiUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
    pub id: u64,
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub email: String,
    #[serde(rename = "cellNumber", default)]
    pub cell_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub allergies: Option<String>,
    #[serde(default)]
    pub conditions: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "bloodType", default)]
    pub blood_type: Option<BloodTypeRecord>,
    #[serde(rename = "medicalAid", default)]
    pub medical_aid: Option<MedicalAidRecord>,
    #[serde(rename = "userRole", default)]
    pub user_role: Option<UserRoleRecord>,
    #[serde(rename = "emergencyContacts", default)]
    pub emergency_contacts: Vec<EmergencyContactRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserRoleRecord {
    pub id: u64,
    #[serde(rename = "roleName")]
    pub role_name: String,
}

/// Envelope for `GET /api/analytics`. Histogram ordering is preserved as
/// the backend sent it.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsReport {
    #[serde(rename = "totalNotifications")]
    pub total_notifications: u64,
    #[serde(rename = "statusCounts", default)]
    pub status_counts: IndexMap<String, u64>,
    #[serde(rename = "typeCounts", default)]
    pub type_counts: IndexMap<String, u64>,
    #[serde(rename = "userCounts", default)]
    pub user_counts: IndexMap<String, u64>,
    #[serde(rename = "resolutionStats")]
    pub resolution_stats: ResolutionStats,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolutionStats {
    pub resolved: u64,
    pub unresolved: u64,
}

#[derive(Debug, Serialize)]
pub struct StatusUpdateRequest {
    #[serde(rename = "notificationId")]
    pub notification_id: u64,
    #[serde(rename = "statusId")]
    pub status_id: u8,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteUserRequest {
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Pending,
}

impl AccountStatus {
    pub fn label(self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Pending => "pending",
        }
    }
}

/// Registered user projected for display. Role "user" counts as an active
/// account, anything else is still pending; absent medical fields get the
/// conventional placeholders.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub status: AccountStatus,
    pub join_date: String,
    pub allergies: Option<String>,
    pub conditions: Option<String>,
    pub blood_type: String,
    pub medical_aid: String,
    pub role: String,
    pub contacts: Vec<EmergencyContactRecord>,
}

impl UserSummary {
    pub fn from_api(user: &ApiUser) -> Self {
        let role = user
            .user_role
            .as_ref()
            .map(|r| r.role_name.clone())
            .unwrap_or_else(|| "Unknown".to_string());
        let status = if role == "user" {
            AccountStatus::Active
        } else {
            AccountStatus::Pending
        };
        let join_date = parse_wire_timestamp(&user.created_at)
            .map(format_date)
            .unwrap_or_else(|| user.created_at.clone());
        Self {
            id: user.id,
            name: user.full_name.clone(),
            email: user.email.clone(),
            phone: user.cell_number.clone().unwrap_or_default(),
            address: user.address.clone().unwrap_or_default(),
            status,
            join_date,
            allergies: user.allergies.clone(),
            conditions: user.conditions.clone(),
            blood_type: user
                .blood_type
                .as_ref()
                .map(|b| b.name.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            medical_aid: user
                .medical_aid
                .as_ref()
                .map(|m| m.name.clone())
                .unwrap_or_else(|| "None".to_string()),
            role,
            contacts: user.emergency_contacts.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_notification_decodes_full_payload() {
        let payload = json!({
            "notification_id": 41,
            "fromUserId": 7,
            "emergencyTypeId": 2,
            "statusId": 1,
            "createdAt": "2024-03-15T12:00:00Z",
            "updatedAt": "2024-03-15T12:05:00Z",
            "user": {
                "id": 7,
                "fullName": "Thandi Nkosi",
                "allergies": "penicillin",
                "emergencyContacts": [
                    {"id": 1, "name": "Sipho Nkosi", "phone": "+27115550101", "relation": "spouse"}
                ],
                "bloodType": {"id": 3, "type": "O+"},
                "medicalAid": {"id": 2, "name": "Discovery"}
            },
            "status": {"id": 1, "name": "Pending"},
            "emergencyType": {"id": 2, "name": "Fire", "description": "Fire reported at residence"},
            "location": {"id": 9, "city": "Johannesburg", "country": "South Africa",
                          "latitude": -26.2041, "longitude": 28.0473}
        });
        let raw: RawNotification = serde_json::from_value(payload).expect("decodes");
        assert_eq!(raw.notification_id, 41);
        assert_eq!(raw.user.full_name, "Thandi Nkosi");
        assert_eq!(raw.status.name, "Pending");
        assert_eq!(raw.emergency_type.description, "Fire reported at residence");
        assert_eq!(raw.user.emergency_contacts.len(), 1);
        assert!(raw.resolution_message.is_none());
    }

    #[test]
    fn raw_notification_tolerates_missing_location() {
        let payload = json!({
            "notification_id": 8,
            "fromUserId": 3,
            "emergencyTypeId": 1,
            "statusId": 2,
            "createdAt": "2024-03-14T09:30:00Z",
            "updatedAt": "2024-03-14T09:30:00Z",
            "user": {"id": 3, "fullName": "Ayesha Khan"},
            "status": {"id": 2, "name": "Read"},
            "emergencyType": {"id": 1, "name": "Medical", "description": "Medical assistance"}
        });
        let raw: RawNotification = serde_json::from_value(payload).expect("decodes");
        assert!(raw.location.is_none());
        assert!(raw.user.blood_type.is_none());
        assert!(raw.user.emergency_contacts.is_empty());
    }

    #[test]
    fn user_summary_applies_role_and_placeholder_defaults() {
        let payload = json!({
            "id": 12,
            "fullName": "Lerato Mokoena",
            "email": "lerato@example.com",
            "createdAt": "2023-11-02T08:00:00Z",
            "userRole": {"id": 1, "roleName": "user"}
        });
        let api_user: ApiUser = serde_json::from_value(payload).expect("decodes");
        let summary = UserSummary::from_api(&api_user);
        assert_eq!(summary.status, AccountStatus::Active);
        assert_eq!(summary.blood_type, "Unknown");
        assert_eq!(summary.medical_aid, "None");
        assert_eq!(summary.join_date, "2023-11-02");
    }

    #[test]
    fn non_user_roles_map_to_pending_accounts() {
        let payload = json!({
            "id": 2,
            "fullName": "Admin Person",
            "email": "admin@example.com",
            "createdAt": "2023-01-01T00:00:00Z",
            "userRole": {"id": 2, "roleName": "admin"}
        });
        let api_user: ApiUser = serde_json::from_value(payload).expect("decodes");
        assert_eq!(
            UserSummary::from_api(&api_user).status,
            AccountStatus::Pending
        );
    }

    #[test]
    fn analytics_report_keeps_histogram_order() {
        let payload = json!({
            "totalNotifications": 10,
            "statusCounts": {"pending": 4, "resolved": 5, "dismissed": 1},
            "typeCounts": {"Fire": 3, "Medical": 7},
            "userCounts": {"Thandi Nkosi": 6, "Ayesha Khan": 4},
            "resolutionStats": {"resolved": 5, "unresolved": 5}
        });
        let report: AnalyticsReport = serde_json::from_value(payload).expect("decodes");
        let keys: Vec<&String> = report.status_counts.keys().collect();
        assert_eq!(keys, ["pending", "resolved", "dismissed"]);
        assert_eq!(report.resolution_stats.unresolved, 5);
    }
}
