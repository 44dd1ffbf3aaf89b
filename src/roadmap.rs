//! Roadmap data model and its JSON representation.
//!
//! The JSON shape matches what earlier versions of the application stored, so
//! field names are camelCase and every field tolerates being absent.

use chrono::{DateTime, Local, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::slug;

/// Option labels in display order.
pub const OPTION_LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

/// One titled unit of a learning path.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadmapStep {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
}

/// A multiple-choice practice question.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct McqQuestion {
    #[serde(deserialize_with = "null_as_default")]
    pub question: String,
    /// Parsed questions always carry exactly four options.
    #[serde(deserialize_with = "null_as_default")]
    pub options: Vec<String>,
    /// One of `A`, `B`, `C`, `D`.
    #[serde(deserialize_with = "null_as_default")]
    pub correct_answer: String,
}

impl McqQuestion {
    /// Index into `options` named by `correct_answer`, if it is a valid letter.
    pub fn correct_index(&self) -> Option<usize> {
        let mut chars = self.correct_answer.chars();
        let letter = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        OPTION_LETTERS.iter().position(|&l| l == letter)
    }
}

/// A saved set of learning steps and practice questions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Roadmap {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub steps: Vec<RoadmapStep>,
    #[serde(deserialize_with = "null_as_default")]
    pub questions: Vec<McqQuestion>,
    #[serde(with = "iso_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Roadmap {
    pub fn new(
        title: impl Into<String>,
        steps: Vec<RoadmapStep>,
        questions: Vec<McqQuestion>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            steps,
            questions,
            created_at,
        }
    }

    /// Builds a roadmap stamped with the current time.
    ///
    /// The timestamp is truncated to milliseconds, the precision it is stored with.
    pub fn created_now(
        title: impl Into<String>,
        steps: Vec<RoadmapStep>,
        questions: Vec<McqQuestion>,
    ) -> Self {
        Self::new(title, steps, questions, Utc::now().trunc_subsecs(3))
    }

    pub fn slug(&self) -> String {
        slug::encode(&self.title)
    }

    /// Creation date for display, e.g. `October 16, 2026`.
    pub fn created_date_label(&self) -> String {
        self.created_at
            .with_timezone(&Local)
            .format("%B %-d, %Y")
            .to_string()
    }
}

/// Reads an explicit `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// ISO-8601 timestamps with millisecond precision and a `Z` suffix.
///
/// Missing or unreadable values decode as the Unix epoch so a single bad
/// record does not make the whole collection unreadable.
mod iso_timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(value
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(DateTime::UNIX_EPOCH))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn question(letter: &str) -> McqQuestion {
        McqQuestion {
            question: "Which?".to_string(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_answer: letter.to_string(),
        }
    }

    #[test]
    fn test_correct_index() {
        assert_eq!(question("A").correct_index(), Some(0));
        assert_eq!(question("D").correct_index(), Some(3));
        assert_eq!(question("E").correct_index(), None);
        assert_eq!(question("a").correct_index(), None);
        assert_eq!(question("AB").correct_index(), None);
        assert_eq!(question("").correct_index(), None);
    }

    #[test]
    fn test_serializes_camel_case_with_millis() {
        let roadmap = Roadmap::new(
            "Rust",
            vec![RoadmapStep {
                title: "Basics".into(),
                description: "Ownership".into(),
            }],
            vec![question("B")],
            Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap(),
        );

        let json = serde_json::to_value(&roadmap).unwrap();
        assert_eq!(json["createdAt"], "2026-10-16T09:30:00.000Z");
        assert_eq!(json["questions"][0]["correctAnswer"], "B");
        assert_eq!(json["steps"][0]["description"], "Ownership");
    }

    #[test]
    fn test_reads_browser_written_record() {
        let json = r#"{
            "title": "Machine Learning",
            "steps": [{"title": "Basics", "description": "Learn the fundamentals"}],
            "questions": [{"question": "Q?", "options": ["1","2","3","4"], "correctAnswer": "C"}],
            "createdAt": "2024-11-02T18:04:05.123Z"
        }"#;

        let roadmap: Roadmap = serde_json::from_str(json).unwrap();
        assert_eq!(roadmap.title, "Machine Learning");
        assert_eq!(roadmap.steps[0].title, "Basics");
        assert_eq!(roadmap.questions[0].correct_index(), Some(2));
        assert_eq!(
            roadmap.created_at,
            Utc.with_ymd_and_hms(2024, 11, 2, 18, 4, 5).unwrap()
                + chrono::Duration::milliseconds(123)
        );
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let roadmap: Roadmap = serde_json::from_str(r#"{"title": "Old"}"#).unwrap();
        assert_eq!(roadmap.title, "Old");
        assert!(roadmap.steps.is_empty());
        assert!(roadmap.questions.is_empty());
        assert_eq!(roadmap.created_at, DateTime::UNIX_EPOCH);

        let step: RoadmapStep = serde_json::from_str(r#"{"title": "Only title"}"#).unwrap();
        assert_eq!(step.description, "");
    }

    #[test]
    fn test_null_fields_default_to_empty() {
        let json = r#"{
            "title": null,
            "steps": [{"title": "Basics", "description": null}],
            "questions": null,
            "createdAt": null
        }"#;

        let roadmap: Roadmap = serde_json::from_str(json).unwrap();
        assert_eq!(roadmap.title, "");
        assert_eq!(roadmap.steps[0].title, "Basics");
        assert_eq!(roadmap.steps[0].description, "");
        assert!(roadmap.questions.is_empty());

        let question: McqQuestion =
            serde_json::from_str(r#"{"question": "Q?", "options": null, "correctAnswer": null}"#)
                .unwrap();
        assert!(question.options.is_empty());
        assert_eq!(question.correct_index(), None);
    }

    #[test]
    fn test_bad_timestamp_falls_back_to_epoch() {
        for created in [r#""not a date""#, "12345", "null"] {
            let json = format!(r#"{{"title": "T", "createdAt": {created}}}"#);
            let roadmap: Roadmap = serde_json::from_str(&json).unwrap();
            assert_eq!(roadmap.created_at, DateTime::UNIX_EPOCH);
        }
    }

    #[test]
    fn test_created_now_is_millisecond_precise() {
        let roadmap = Roadmap::created_now("T", Vec::new(), Vec::new());
        assert_eq!(roadmap.created_at.timestamp_subsec_nanos() % 1_000_000, 0);

        let json = serde_json::to_string(&roadmap).unwrap();
        let back: Roadmap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, roadmap);
    }

    #[test]
    fn test_slug() {
        let roadmap = Roadmap::created_now("Machine Learning", Vec::new(), Vec::new());
        assert_eq!(roadmap.slug(), "machine-learning");
    }
}
