use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    Employee,
    Admin,
}

impl Default for Role {
    fn default() -> Self {
        Role::Employee
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": "dupont.jean",
        "first_name": "Jean",
        "last_name": "Dupont",
        "role": "employee"
    })
)]
pub struct Employee {
    /// Stable login identifier, generated once at provisioning.
    #[schema(example = "dupont.jean")]
    pub id: String,

    #[schema(example = "Jean")]
    pub first_name: String,

    #[schema(example = "Dupont")]
    pub last_name: String,

    #[schema(example = "employee")]
    pub role: Role,
}

/// Login convention: `lastname.firstname`, lowercase, with interior spaces
/// and hyphens stripped from each segment.
pub fn login(last_name: &str, first_name: &str) -> String {
    fn segment(name: &str) -> String {
        name.trim()
            .to_lowercase()
            .chars()
            .filter(|c| *c != ' ' && *c != '-')
            .collect()
    }
    format!("{}.{}", segment(last_name), segment(first_name))
}
