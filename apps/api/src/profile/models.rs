use serde::{Deserialize, Serialize};

/// A profile as returned by the profile service. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExternalProfile {
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub educations: Vec<ExternalEducation>,
    pub positions: Vec<ExternalPosition>,
    pub projects: Vec<ExternalProject>,
    pub skills: Vec<ExternalSkillGroup>,
    pub achievements: Vec<ExternalAchievement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExternalEducation {
    pub institution: String,
    pub location: Option<String>,
    pub degree: String,
    pub field_of_study: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExternalPosition {
    pub title: String,
    pub company: String,
    pub start_date: Option<String>,
    /// `None` means the position is current.
    pub end_date: Option<String>,
    pub highlights: Vec<ExternalHighlight>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExternalProject {
    pub name: String,
    pub url: Option<String>,
    pub technologies: Vec<ExternalSkill>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub highlights: Vec<ExternalHighlight>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalHighlight {
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalSkillGroup {
    pub category: String,
    pub skills: Vec<ExternalSkill>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalSkill {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalAchievement {
    pub title: String,
    pub description: Option<String>,
}
