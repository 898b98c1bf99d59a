//! Placeholder substitution.
//!
//! Templates are plain markup containing `{{key}}` placeholders from a fixed
//! set. The body is scanned once, left to right, so substituted values are
//! never themselves re-scanned. Unknown keys are left in place.

use std::fmt::Write;

use crate::models::resume::ResumeData;

pub const PLACEHOLDERS: &[&str] = &[
    "name",
    "phone",
    "email",
    "profile_image",
    "education",
    "experience",
    "projects",
    "skills",
    "achievements",
];

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Fills every known placeholder in `body` with markup derived from `data`.
pub fn fill_template(body: &str, data: &ResumeData) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + OPEN.len()..];
        let Some(end) = after_open.find(CLOSE) else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = after_open[..end].trim();
        match expand(key, data) {
            Some(value) => out.push_str(&value),
            None => out.push_str(&rest[start..start + OPEN.len() + end + CLOSE.len()]),
        }
        rest = &after_open[end + CLOSE.len()..];
    }
    out.push_str(rest);
    out
}

fn expand(key: &str, data: &ResumeData) -> Option<String> {
    let value = match key {
        "name" => escape_html(&data.name),
        "phone" => escape_html(&data.phone),
        "email" => escape_html(&data.email),
        "profile_image" => escape_html(&data.profile_image),
        "education" => education(data),
        "experience" => experience(data),
        "projects" => projects(data),
        "skills" => skills(data),
        "achievements" => bullet_list(&data.achievements, "achievements"),
        _ => return None,
    };
    Some(value)
}

fn bullet_list(items: &[String], class: &str) -> String {
    if items.is_empty() {
        return String::new();
    }
    let mut out = format!(r#"<ul class="{class}">"#);
    for item in items {
        let _ = write!(out, "<li>{}</li>", escape_html(item));
    }
    out.push_str("</ul>");
    out
}

fn education(data: &ResumeData) -> String {
    let mut out = String::new();
    for e in &data.education {
        let _ = write!(
            out,
            r#"<div class="education-item"><div class="d-flex justify-content-between"><h5>{}</h5><span>{}</span></div><p>{}</p><p class="school">{}</p></div>"#,
            escape_html(&e.degree),
            escape_html(&e.date),
            escape_html(&e.major),
            escape_html(&join_non_empty(&[&e.school, &e.location])),
        );
    }
    out
}

fn experience(data: &ResumeData) -> String {
    let mut out = String::new();
    for x in &data.experience {
        let _ = write!(
            out,
            r#"<div class="experience-item"><div class="d-flex justify-content-between"><h5 class="job-title">{}</h5><span class="job-period">{}</span></div><p class="company-name">{}</p>{}</div>"#,
            escape_html(&x.position),
            escape_html(&x.date),
            escape_html(&x.company),
            bullet_list(&x.responsibilities, "responsibilities"),
        );
    }
    out
}

fn projects(data: &ResumeData) -> String {
    let mut out = String::new();
    for p in &data.projects {
        let name = if p.link.is_empty() {
            escape_html(&p.name)
        } else {
            format!(
                r#"<a href="{}">{}</a>"#,
                escape_html(&p.link),
                escape_html(&p.name)
            )
        };
        let _ = write!(
            out,
            r#"<div class="project-item"><div class="d-flex justify-content-between"><h5>{name}</h5><span>{}</span></div><p class="technologies">{}</p>{}</div>"#,
            escape_html(&p.date),
            escape_html(&p.technologies),
            bullet_list(&p.details, "details"),
        );
    }
    out
}

fn skills(data: &ResumeData) -> String {
    if data.skills.is_empty() {
        return String::new();
    }
    let mut out = String::from(r#"<ul class="skills">"#);
    for group in &data.skills {
        let _ = write!(
            out,
            "<li><strong>{}:</strong> {}</li>",
            escape_html(&group.category),
            escape_html(&group.items.join(", ")),
        );
    }
    out.push_str("</ul>");
    out
}

fn join_non_empty(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Markup served when a known template's body cannot be read.
pub fn placeholder_document(template_id: &str) -> String {
    format!(
        r#"<div class="resume-template"><div class="resume-inner"><div class="section"><h2 class="section-title">Template {} is unavailable</h2><p>Its content could not be loaded. Try again later.</p></div></div></div>"#,
        escape_html(template_id)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{EducationItem, ExperienceItem, ProjectItem, SkillGroup};

    fn data() -> ResumeData {
        ResumeData {
            name: "Jagriti <Gaba>".to_string(),
            phone: "+91 895009584".to_string(),
            email: "j@example.com".to_string(),
            profile_image: "/profile.jpg".to_string(),
            education: vec![EducationItem {
                degree: "BCA".to_string(),
                major: "Computer Applications".to_string(),
                school: "Kurukshetra University".to_string(),
                location: "Haryana".to_string(),
                date: "2022 - 2025".to_string(),
            }],
            experience: vec![ExperienceItem {
                position: "Engineer".to_string(),
                company: "NextGo".to_string(),
                date: "2024 - Present".to_string(),
                responsibilities: vec!["Built R&D tools".to_string()],
            }],
            projects: vec![ProjectItem {
                name: "ResScope".to_string(),
                technologies: "Next.js, Tailwind".to_string(),
                link: "https://example.com/?a=1&b=2".to_string(),
                date: "2025".to_string(),
                details: vec![],
            }],
            skills: vec![SkillGroup {
                category: "Languages".to_string(),
                items: vec!["Rust".to_string(), "C++".to_string()],
            }],
            achievements: vec!["Roll of Honour".to_string()],
        }
    }

    #[test]
    fn test_scalars_are_escaped() {
        let out = fill_template("<h1>{{name}}</h1><img src=\"{{ profile_image }}\">", &data());
        assert_eq!(out, "<h1>Jagriti &lt;Gaba&gt;</h1><img src=\"/profile.jpg\">");
    }

    #[test]
    fn test_list_placeholders_expand_to_fragments() {
        let out = fill_template(
            "{{education}}|{{experience}}|{{projects}}|{{skills}}|{{achievements}}",
            &data(),
        );
        assert!(out.contains(r#"<div class="education-item">"#));
        assert!(out.contains("<p class=\"school\">Kurukshetra University, Haryana</p>"));
        assert!(out.contains("<li>Built R&amp;D tools</li>"));
        assert!(out.contains(r#"<a href="https://example.com/?a=1&amp;b=2">ResScope</a>"#));
        assert!(out.contains("<li><strong>Languages:</strong> Rust, C++</li>"));
        assert!(out.contains(r#"<ul class="achievements"><li>Roll of Honour</li></ul>"#));
        assert!(!out.contains(r#"class="details""#));
    }

    #[test]
    fn test_unknown_and_unterminated_placeholders_kept() {
        let out = fill_template("{{unknown}} {{name", &ResumeData::default());
        assert_eq!(out, "{{unknown}} {{name");
    }

    #[test]
    fn test_substituted_values_are_not_rescanned() {
        let mut d = ResumeData::default();
        d.name = "{{email}}".to_string();
        d.email = "secret@example.com".to_string();
        assert_eq!(fill_template("{{name}}", &d), "{{email}}");
    }

    #[test]
    fn test_empty_record_fills_blanks() {
        let body = PLACEHOLDERS
            .iter()
            .map(|p| format!("[{{{{{p}}}}}]"))
            .collect::<String>();
        let out = fill_template(&body, &ResumeData::default());
        assert_eq!(out, "[]".repeat(PLACEHOLDERS.len()));
    }

    #[test]
    fn test_placeholder_document_escapes_id() {
        assert!(placeholder_document("<x>").contains("Template &lt;x&gt; is unavailable"));
    }
}
