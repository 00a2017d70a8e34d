use crate::error::SurveyError;
use crate::models::Question;
use log::info;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Reads the question list from a JSON file: an array of
/// `{"id", "text", "options"}` objects, kept in file order.
pub fn load(path: &Path) -> Result<Vec<Question>, SurveyError> {
    let err = |reason: String| SurveyError::Questions {
        path: path.display().to_string(),
        reason,
    };

    let raw = fs::read_to_string(path).map_err(|e| err(e.to_string()))?;
    let questions = parse(&raw).map_err(err)?;

    info!("Loaded {} questions from {}", questions.len(), path.display());
    Ok(questions)
}

pub fn parse(raw: &str) -> Result<Vec<Question>, String> {
    let questions: Vec<Question> = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    validate_schema(&questions)?;
    Ok(questions)
}

pub fn validate_schema(questions: &[Question]) -> Result<(), String> {
    if questions.is_empty() {
        return Err("no questions defined".to_string());
    }

    let mut ids = HashSet::new();
    for question in questions {
        question.validate()?;
        if !ids.insert(question.id.as_str()) {
            return Err(format!("duplicate question id '{}'", question.id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_file_order() {
        let raw = r#"[
            {"id": "b", "text": "Second letter?", "options": ["yes", "no"]},
            {"id": "a", "text": "First letter?", "options": ["yes", "no", "maybe"]}
        ]"#;

        let questions = parse(raw).unwrap();

        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].id, "b");
        assert_eq!(questions[1].options, vec!["yes", "no", "maybe"]);
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let raw = r#"[
            {"id": "q1", "text": "One", "options": ["A"]},
            {"id": "q1", "text": "Again", "options": ["B"]}
        ]"#;
        assert!(parse(raw).unwrap_err().contains("duplicate question id"));
    }

    #[test]
    fn test_rejects_empty_schema_and_bad_questions() {
        assert!(parse("[]").is_err());
        assert!(parse(r#"[{"id": "q1", "text": "None", "options": []}]"#).is_err());
        assert!(parse(r#"[{"id": "q1", "text": "Missing options"}]"#).is_err());
        assert!(parse("not json").is_err());
    }

    #[test]
    fn test_bundled_questions_are_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/questions.json");
        let questions = load(&path).unwrap();
        assert!(!questions.is_empty());
    }

    #[test]
    fn test_missing_file_names_the_path() {
        let err = load(Path::new("does/not/exist.json")).unwrap_err();
        assert!(err.to_string().contains("does/not/exist.json"));
    }
}
