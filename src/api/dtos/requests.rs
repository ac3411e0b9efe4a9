use crate::domain::models::user::UserRole;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct SelectRoleRequest {
    pub role: UserRole,
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<SkillsInput>,
}

/// Skills arrive either as a list or as one comma-separated string.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum SkillsInput {
    List(Vec<String>),
    Csv(String),
}

impl SkillsInput {
    pub fn into_list(self) -> Vec<String> {
        match self {
            SkillsInput::List(list) => list,
            SkillsInput::Csv(raw) => raw.split(',').map(str::to_string).collect(),
        }
    }
}

#[derive(Deserialize, Default)]
pub struct SessionListQuery {
    pub category: Option<String>,
}
