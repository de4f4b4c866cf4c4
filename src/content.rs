//! Quiz and reward content produced by the content generator.
//!
//! The generator answers in free text that is expected to contain one JSON
//! object. Everything from the first `{` to the last `}` is parsed and then
//! checked for the shape the overlays rely on.

use serde::{Deserialize, Serialize};

pub const ANSWER_COUNT: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("no JSON object found in response")]
    NoJsonObject,
    #[error("malformed content JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("invalid content: {0}")]
    InvalidShape(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizContent {
    pub question: String,
    pub answers: Vec<String>,
    #[serde(default)]
    pub correct_answer_index: usize,
    pub rewards: Vec<Reward>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub title: String,
    pub coins: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardStatus {
    Claim,
    NotEnoughCoins,
}

impl Reward {
    pub fn status(&self, user_coins: u32) -> RewardStatus {
        if self.coins <= user_coins {
            RewardStatus::Claim
        } else {
            RewardStatus::NotEnoughCoins
        }
    }
}

impl QuizContent {
    pub fn correct_answer(&self) -> Option<&str> {
        self.answers.get(self.correct_answer_index).map(String::as_str)
    }

    fn validate(&self) -> Result<(), ContentError> {
        if self.question.trim().is_empty() {
            return Err(ContentError::InvalidShape("question is empty".into()));
        }
        if self.answers.len() != ANSWER_COUNT {
            return Err(ContentError::InvalidShape(format!(
                "expected {ANSWER_COUNT} answers, got {}",
                self.answers.len()
            )));
        }
        if self.correct_answer_index >= ANSWER_COUNT {
            return Err(ContentError::InvalidShape(format!(
                "correct answer index {} out of range",
                self.correct_answer_index
            )));
        }
        Ok(())
    }
}

pub fn parse_quiz_content(text: &str) -> Result<QuizContent, ContentError> {
    let start = text.find('{').ok_or(ContentError::NoJsonObject)?;
    let end = text.rfind('}').ok_or(ContentError::NoJsonObject)?;
    if end < start {
        return Err(ContentError::NoJsonObject);
    }
    let content: QuizContent = serde_json::from_str(&text[start..=end])?;
    content.validate()?;
    log::debug!(
        "parsed quiz content with {} rewards",
        content.rewards.len()
    );
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"Here you go:
{
  "question": "Which planet has the most moons?",
  "answers": ["Saturn", "Jupiter", "Mars"],
  "correctAnswerIndex": 0,
  "rewards": [
    {"title": "Telescope night", "coins": 250, "imageUrl": "https://example.com/a.jpg"},
    {"title": "Planetarium pass", "coins": 999}
  ]
}
Enjoy!"#;

    #[test]
    fn extracts_object_from_surrounding_text() {
        let content = parse_quiz_content(RESPONSE).unwrap();
        assert_eq!(content.answers.len(), 3);
        assert_eq!(content.correct_answer(), Some("Saturn"));
        assert_eq!(content.rewards[1].image_url, None);
        assert_eq!(content.rewards[0].status(300), RewardStatus::Claim);
        assert_eq!(content.rewards[1].status(300), RewardStatus::NotEnoughCoins);
    }

    #[test]
    fn text_without_object_is_rejected() {
        assert!(matches!(parse_quiz_content("sorry"), Err(ContentError::NoJsonObject)));
        assert!(matches!(parse_quiz_content("} then {"), Err(ContentError::NoJsonObject)));
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(matches!(
            parse_quiz_content("{\"question\": }"),
            Err(ContentError::Malformed(_))
        ));
    }

    #[test]
    fn answer_count_must_be_three() {
        let text = r#"{"question":"q","answers":["a","b"],"correctAnswerIndex":0,"rewards":[]}"#;
        assert!(matches!(parse_quiz_content(text), Err(ContentError::InvalidShape(_))));
    }

    #[test]
    fn rewards_must_be_an_array() {
        let text = r#"{"question":"q","answers":["a","b","c"],"rewards":{}}"#;
        assert!(matches!(parse_quiz_content(text), Err(ContentError::Malformed(_))));
    }

    #[test]
    fn serializes_with_original_field_names() {
        let content = parse_quiz_content(RESPONSE).unwrap();
        let json = serde_json::to_string(&content).unwrap();
        assert!(json.contains("\"correctAnswerIndex\":0"));
        assert!(json.contains("\"imageUrl\""));
    }
}
