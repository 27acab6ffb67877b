//! Content Alchemist: turns one long-form piece into per-channel drafts.

use serde::{Deserialize, Serialize};
use sovereign_core::validation::{FieldIssue, Validate, require_non_empty};

use super::structured::structured;
use super::{AiService, GenerationError};

const AGENT_TYPE: &str = "content-alchemist";

/// Room kept free for a call-to-action when summarizing.
const SUMMARY_HEADROOM: usize = 50;

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepurposeRequest {
    pub content: String,
    pub formats: Vec<String>,
}

impl Validate for RepurposeRequest {
    fn validate(&self) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        require_non_empty(&mut issues, "content", &self.content);
        if self.formats.is_empty() {
            issues.push(FieldIssue::new("formats", "formats must list at least one format"));
        }
        for (i, format) in self.formats.iter().enumerate() {
            require_non_empty(&mut issues, &format!("formats[{i}]"), format);
        }
        issues
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentPiece {
    pub format: String,
    pub title: String,
    pub body: String,
}

/// Character budget per channel.
pub fn max_length_for(format: &str) -> usize {
    match format.to_lowercase().as_str() {
        "twitter" | "x" | "tweet" => 280,
        "linkedin" => 1300,
        "newsletter" | "email" => 2000,
        "instagram" => 2200,
        _ => 500,
    }
}

/// Shortens `content` to whole sentences that fit in `max_length - 50`
/// characters. When not even the first sentence fits, hard-truncates to
/// `max_length` and appends `...`. Never returns more than `max_length + 3`
/// characters; content that already fits is returned unchanged.
pub fn summarize_content(content: &str, max_length: usize) -> String {
    if content.chars().count() <= max_length {
        return content.to_string();
    }

    let budget = max_length.saturating_sub(SUMMARY_HEADROOM);
    let mut summary = String::new();
    let mut summary_len = 0;
    for sentence in sentences(content) {
        let sep = usize::from(!summary.is_empty());
        let len = sentence.chars().count();
        if summary_len + sep + len > budget {
            break;
        }
        if sep == 1 {
            summary.push(' ');
        }
        summary.push_str(sentence);
        summary_len += sep + len;
    }

    if summary.is_empty() {
        let mut truncated: String = content.chars().take(max_length).collect();
        truncated.push_str("...");
        truncated
    } else {
        summary
    }
}

/// Sentences with their terminators, trimmed. Trailing text without a
/// terminator counts as a sentence.
fn sentences(content: &str) -> impl Iterator<Item = &str> {
    content
        .split_inclusive(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

pub struct ContentAlchemistAgent<'a> {
    ai: &'a AiService,
}

impl<'a> ContentAlchemistAgent<'a> {
    pub fn new(ai: &'a AiService) -> Self {
        Self { ai }
    }

    pub async fn repurpose(
        &self,
        content: &str,
        formats: &[String],
    ) -> Result<Vec<ContentPiece>, GenerationError> {
        let prompt = format!(
            "Repurpose the following content into these formats: {}. Respond with a JSON array \
             of objects with format, title and body.\n\nContent:\n{content}",
            formats.join(", ")
        );
        let generation = self.ai.complete(&prompt, AGENT_TYPE).await?;
        let pieces = structured::<Vec<ContentPiece>>(&generation)
            .filter(|pieces| !pieces.is_empty())
            .unwrap_or_else(|| fallback(content, formats));
        Ok(pieces)
    }
}

fn fallback(content: &str, formats: &[String]) -> Vec<ContentPiece> {
    let title = sentences(content)
        .next()
        .map(|s| summarize_content(s, 80))
        .unwrap_or_default();
    formats
        .iter()
        .map(|format| ContentPiece {
            format: format.clone(),
            title: title.clone(),
            body: summarize_content(content, max_length_for(format)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_content_is_unchanged() {
        let text = "Automate the boring parts. Keep the judgment calls.";
        assert_eq!(summarize_content(text, 280), text);
        assert_eq!(summarize_content(text, text.chars().count()), text);
    }

    #[test]
    fn keeps_whole_sentences_within_headroom() {
        let sentence = "This sentence is exactly forty chars ok.";
        assert_eq!(sentence.len(), 40);
        let text = [sentence; 10].join(" ");

        let summary = summarize_content(&text, 150);
        // budget 100: two sentences plus a space fit, three do not
        assert_eq!(summary, format!("{sentence} {sentence}"));
        assert!(summary.chars().count() <= 100);
    }

    #[test]
    fn hard_truncates_when_no_sentence_fits() {
        let text = "a".repeat(500);
        let summary = summarize_content(&text, 100);
        assert_eq!(summary.chars().count(), 103);
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn never_exceeds_max_plus_ellipsis() {
        let text = "Short one! Then a considerably longer sentence that goes on for a while? \
                    And finally the end. "
            .repeat(20);
        for max in [0, 10, 49, 50, 51, 120, 280, 1300] {
            let summary = summarize_content(&text, max);
            assert!(summary.chars().count() <= max + 3, "max {max}: {summary:?}");
        }
    }

    #[test]
    fn multibyte_text_is_cut_on_char_boundaries() {
        let text = "é".repeat(300);
        let summary = summarize_content(&text, 20);
        assert_eq!(summary.chars().count(), 23);
    }

    #[tokio::test]
    async fn fallback_produces_one_piece_per_format() {
        let ai = AiService::mock(chrono_tz::UTC);
        let formats = vec!["twitter".to_string(), "linkedin".to_string()];
        let content = "We cut onboarding from two weeks to two days. Here's how. ".repeat(30);
        let pieces = ContentAlchemistAgent::new(&ai)
            .repurpose(&content, &formats)
            .await
            .expect("mock never fails");

        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].format, "twitter");
        assert!(pieces[0].body.chars().count() <= 283);
        assert!(pieces[1].body.chars().count() <= 1303);
    }
}
