//! Resume payload as sent by the web editor for direct PDF export.
//!
//! Field names follow the editor's camelCase shape; `From<EditorResume>`
//! maps it onto `OptimizedResume` so export shares the normal renderer.

use serde::Deserialize;

use crate::models::resume::{
    Certification, Education, Experience, OptimizedResume, PersonalInfo, Skills,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorResume {
    #[serde(default)]
    pub personal_info: EditorPersonalInfo,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub experience: Vec<EditorExperience>,
    #[serde(default)]
    pub education: Vec<EditorEducation>,
    #[serde(default)]
    pub skills: EditorSkills,
    #[serde(default)]
    pub certifications: Vec<EditorCertification>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorPersonalInfo {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

/// The editor stores achievements either as a list or as one newline-separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EditorDescription {
    Lines(Vec<String>),
    Text(String),
}

impl EditorDescription {
    fn into_lines(self) -> Vec<String> {
        match self {
            EditorDescription::Lines(lines) => lines,
            EditorDescription::Text(text) if text.is_empty() => Vec::new(),
            EditorDescription::Text(text) => text.split('\n').map(str::to_string).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorExperience {
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub description: Option<EditorDescription>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorEducation {
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub gpa: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditorSkills {
    #[serde(default)]
    pub technical: Vec<String>,
    #[serde(default)]
    pub soft: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditorCertification {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

impl From<EditorResume> for OptimizedResume {
    fn from(editor: EditorResume) -> Self {
        let p = editor.personal_info;
        OptimizedResume {
            personal_info: PersonalInfo {
                name: p.full_name,
                email: p.email,
                phone: p.phone,
                location: p.location,
                linkedin: p.linkedin,
                website: p.website,
            },
            summary: editor.summary,
            experience: editor
                .experience
                .into_iter()
                .map(|exp| Experience {
                    company: exp.company,
                    position: exp.position,
                    location: exp.location,
                    start_date: exp.start_date,
                    end_date: exp.end_date,
                    achievements: exp
                        .description
                        .map(EditorDescription::into_lines)
                        .unwrap_or_default(),
                })
                .collect(),
            education: editor
                .education
                .into_iter()
                .map(|edu| {
                    let graduation = match (edu.start_date.as_deref(), edu.end_date.as_deref()) {
                        (Some(start), Some(end)) if !start.is_empty() && !end.is_empty() => {
                            Some(format!("{start} - {end}"))
                        }
                        _ => None,
                    };
                    Education {
                        institution: edu.institution,
                        degree: edu.degree,
                        location: edu.location,
                        graduation,
                        gpa: edu.gpa,
                    }
                })
                .collect(),
            skills: Skills {
                technical: editor.skills.technical,
                soft: editor.skills.soft,
            },
            certifications: editor
                .certifications
                .into_iter()
                .map(|c| Certification {
                    name: c.name,
                    issuer: c.issuer,
                    date: c.date,
                })
                .collect(),
        }
    }
}
