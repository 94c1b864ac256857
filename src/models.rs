use crate::storage::Record;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SUBJECT_REQUIRED_MESSAGE: &str = "Subject ID and Name are required fields.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Sex {
    #[default]
    Male,
    Female,
    Other,
}

impl Sex {
    pub const ALL: [Sex; 3] = [Sex::Male, Sex::Female, Sex::Other];

    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
            Sex::Other => "Other",
        }
    }
}

pub fn default_dob() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub dob: NaiveDate,
    pub sex: Sex,
}

impl Subject {
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("id".into(), Value::from(self.id.as_str()));
        record.insert("name".into(), Value::from(self.name.as_str()));
        record.insert("dob".into(), Value::from(self.dob.to_string()));
        record.insert("sex".into(), Value::from(self.sex.as_str()));
        record
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub subject_id: String,
    pub session_date: NaiveDate,
    pub condition: String,
    pub notes: String,
}

impl Session {
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("subject_id".into(), Value::from(self.subject_id.as_str()));
        record.insert("session_date".into(), Value::from(self.session_date.to_string()));
        record.insert("condition".into(), Value::from(self.condition.as_str()));
        record.insert("notes".into(), Value::from(self.notes.as_str()));
        record
    }
}

/// Add Subject submission, shared by the HTML form and the JSON API.
#[derive(Debug, Deserialize)]
pub struct NewSubject {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_dob")]
    pub dob: NaiveDate,
    #[serde(default)]
    pub sex: Sex,
}

impl NewSubject {
    /// Only the id and name are required. Nothing else is checked.
    pub fn validate(self) -> Result<Subject, &'static str> {
        if self.id.is_empty() || self.name.is_empty() {
            return Err(SUBJECT_REQUIRED_MESSAGE);
        }

        Ok(Subject {
            id: self.id,
            name: self.name,
            dob: self.dob,
            sex: self.sex,
        })
    }
}

/// Add Session form: the subject is picked by its "{id} - {name}" label.
#[derive(Debug, Deserialize)]
pub struct SessionForm {
    #[serde(default)]
    pub subject: String,
    #[serde(default = "today")]
    pub session_date: NaiveDate,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub notes: String,
}

/// JSON API session body. `subject_id` is stored as given.
#[derive(Debug, Deserialize)]
pub struct NewSession {
    pub subject_id: String,
    #[serde(default = "today")]
    pub session_date: NaiveDate,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub notes: String,
}

impl From<NewSession> for Session {
    fn from(value: NewSession) -> Self {
        Self {
            subject_id: value.subject_id,
            session_date: value.session_date,
            condition: value.condition,
            notes: value.notes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectOption {
    pub label: String,
    pub subject_id: String,
}

/// Builds the Add Session choices from stored subject records.
///
/// Subjects sharing an id and name collapse into one choice at the position
/// of the first. Records without an `id` or `name` are skipped.
pub fn subject_options(records: &[Record]) -> Vec<SubjectOption> {
    let mut options: Vec<SubjectOption> = Vec::new();
    for record in records {
        let (Some(id), Some(name)) = (record.get("id"), record.get("name")) else {
            continue;
        };
        let subject_id = field_text(id);
        let label = format!("{subject_id} - {}", field_text(name));

        if resolve_subject(&options, &label).is_none() {
            options.push(SubjectOption { label, subject_id });
        }
    }
    options
}

pub fn resolve_subject<'a>(options: &'a [SubjectOption], label: &str) -> Option<&'a SubjectOption> {
    options.iter().find(|option| option.label == label)
}

/// Display text for a stored value: strings as-is, null as empty.
pub fn field_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
