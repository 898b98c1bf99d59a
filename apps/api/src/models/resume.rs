use serde::{Deserialize, Serialize};

/// The normalized record a template is filled with.
///
/// `ResumeData::default()` is the empty record used whenever profile data is
/// unavailable, so a template always renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeData {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub profile_image: String,
    pub education: Vec<EducationItem>,
    pub experience: Vec<ExperienceItem>,
    pub projects: Vec<ProjectItem>,
    pub skills: Vec<SkillGroup>,
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationItem {
    pub degree: String,
    pub major: String,
    pub school: String,
    pub location: String,
    /// Year-only range, e.g. "2022 - 2025".
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceItem {
    pub position: String,
    pub company: String,
    pub date: String,
    pub responsibilities: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectItem {
    pub name: String,
    /// Comma-separated technology names.
    pub technologies: String,
    pub link: String,
    pub date: String,
    pub details: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillGroup {
    pub category: String,
    pub items: Vec<String>,
}
