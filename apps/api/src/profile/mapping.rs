//! Normalizes an `ExternalProfile` into the `ResumeData` shape templates expect.
//!
//! Dates are reduced to years, nested lists are flattened to plain strings.

use chrono::{Datelike, NaiveDate};

use crate::models::resume::{EducationItem, ExperienceItem, ProjectItem, ResumeData, SkillGroup};
use crate::profile::models::ExternalProfile;

const OPEN_END: &str = "Present";

pub fn map_profile(profile: ExternalProfile) -> ResumeData {
    let name = format!("{} {}", profile.first_name.trim(), profile.last_name.trim())
        .trim()
        .to_string();

    ResumeData {
        name,
        phone: profile.phone.unwrap_or_default(),
        email: profile.email.unwrap_or_default(),
        profile_image: profile.avatar_url.unwrap_or_default(),
        education: profile
            .educations
            .into_iter()
            .map(|e| EducationItem {
                date: year_range(e.start_date.as_deref(), e.end_date.as_deref(), false),
                degree: e.degree,
                major: e.field_of_study.unwrap_or_default(),
                school: e.institution,
                location: e.location.unwrap_or_default(),
            })
            .collect(),
        experience: profile
            .positions
            .into_iter()
            .map(|p| ExperienceItem {
                date: year_range(p.start_date.as_deref(), p.end_date.as_deref(), true),
                position: p.title,
                company: p.company,
                responsibilities: p
                    .highlights
                    .into_iter()
                    .map(|h| h.text)
                    .filter(|t| !t.trim().is_empty())
                    .collect(),
            })
            .collect(),
        projects: profile
            .projects
            .into_iter()
            .map(|p| ProjectItem {
                date: year_range(p.start_date.as_deref(), p.end_date.as_deref(), false),
                technologies: p
                    .technologies
                    .into_iter()
                    .map(|t| t.name)
                    .collect::<Vec<_>>()
                    .join(", "),
                link: p.url.unwrap_or_default(),
                details: p
                    .highlights
                    .into_iter()
                    .map(|h| h.text)
                    .filter(|t| !t.trim().is_empty())
                    .collect(),
                name: p.name,
            })
            .collect(),
        skills: profile
            .skills
            .into_iter()
            .map(|g| SkillGroup {
                category: g.category,
                items: g.skills.into_iter().map(|s| s.name).collect(),
            })
            .filter(|g| !g.items.is_empty())
            .collect(),
        achievements: profile
            .achievements
            .into_iter()
            .map(|a| match a.description {
                Some(d) if !d.trim().is_empty() => format!("{}: {}", a.title, d.trim()),
                _ => a.title,
            })
            .collect(),
    }
}

/// Extracts the year from an ISO date (`2022-08-01`, `2022-08`) or any text with a 4-digit run.
pub fn year_of(date: &str) -> Option<i32> {
    let date = date.trim();
    if let Ok(d) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return Some(d.year());
    }
    let bytes = date.as_bytes();
    bytes
        .windows(4)
        .enumerate()
        .find(|(i, w)| {
            w.iter().all(u8::is_ascii_digit)
                && !bytes.get(i + 4).is_some_and(u8::is_ascii_digit)
                && (*i == 0 || !bytes[i - 1].is_ascii_digit())
        })
        .and_then(|(i, _)| date[i..i + 4].parse().ok())
}

/// Year-only range. With `open_ended`, a missing end year means the item is ongoing.
pub fn year_range(start: Option<&str>, end: Option<&str>, open_ended: bool) -> String {
    let start = start.and_then(year_of);
    let end = end.and_then(year_of);
    match (start, end) {
        (Some(s), Some(e)) if s == e => s.to_string(),
        (Some(s), Some(e)) => format!("{s} - {e}"),
        (Some(s), None) if open_ended => format!("{s} - {OPEN_END}"),
        (Some(s), None) => s.to_string(),
        (None, Some(e)) => e.to_string(),
        (None, None) => String::new(),
    }
}
