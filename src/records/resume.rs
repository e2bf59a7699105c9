//! Canonical resume record.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub personal_infos: ResumePersonalInfo,
    pub education: ResumeEducation,
    pub work_experience: ResumeWorkExperience,
    pub languages: Vec<ResumeLanguage>,
    pub skills: Vec<ResumeSkill>,
    pub certifications: Vec<ResumeSkill>,
    pub courses: Vec<ResumeSkill>,
    pub publications: Vec<ResumeSkill>,
    pub interests: Vec<ResumeSkill>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumePersonalInfo {
    pub name: ResumePersonalName,
    pub address: ResumeLocation,
    pub self_summary: Option<String>,
    pub objective: Option<String>,
    pub date_of_birth: Option<String>,
    pub place_of_birth: Option<String>,
    pub phones: Vec<String>,
    pub mails: Vec<String>,
    pub urls: Vec<String>,
    pub fax: Vec<String>,
    pub current_profession: Option<String>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
    pub marital_status: Option<String>,
    pub current_salary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumePersonalName {
    pub raw_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub middle: Option<String>,
    pub title: Option<String>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeLocation {
    pub formatted_location: Option<String>,
    pub postal_code: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub raw_input_location: Option<String>,
    pub street: Option<String>,
    pub street_number: Option<String>,
    pub apartment_number: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeEducation {
    pub total_years_education: Option<u32>,
    pub entries: Vec<ResumeEducationEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeEducationEntry {
    pub title: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub location: ResumeLocation,
    pub establishment: Option<String>,
    pub description: Option<String>,
    pub gpa: Option<String>,
    pub accreditation: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeWorkExperience {
    pub total_years_experience: Option<u32>,
    pub entries: Vec<ResumeWorkEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeWorkEntry {
    pub title: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub company: Option<String>,
    pub location: ResumeLocation,
    pub description: Option<String>,
    pub industry: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeLanguage {
    pub name: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeSkill {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}
