//! Pulls typed payloads out of generator output.
//!
//! Generators that return `Generation::Structured` are trusted as-is. For
//! prose, the outermost `{...}` span is tried first, then the outermost
//! `[...]` span; the first one that deserializes into `T` wins. Callers treat
//! `None` as "use the fallback".

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;

use super::generator::Generation;

static OBJECT_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid object span regex"));
static ARRAY_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[.*\]").expect("valid array span regex"));

pub fn structured<T: DeserializeOwned>(generation: &Generation) -> Option<T> {
    match generation {
        Generation::Structured(value) => serde_json::from_value(value.clone()).ok(),
        Generation::Text(text) => from_text(text),
    }
}

fn from_text<T: DeserializeOwned>(text: &str) -> Option<T> {
    [&*OBJECT_SPAN, &*ARRAY_SPAN]
        .into_iter()
        .filter_map(|re| re.find(text))
        .find_map(|span| serde_json::from_str(span.as_str()).ok())
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Score {
        score: i32,
    }

    #[test]
    fn prose_without_json_yields_none() {
        let generation = Generation::Text("I understand. Let me look into that.".into());
        assert_eq!(structured::<Score>(&generation), None);
    }

    #[test]
    fn object_embedded_in_prose_is_extracted() {
        let generation = Generation::Text("Sure! Here you go: {\"score\": 72} Hope that helps.".into());
        assert_eq!(structured::<Score>(&generation), Some(Score { score: 72 }));
    }

    #[test]
    fn array_is_tried_when_the_object_span_does_not_fit() {
        let generation = Generation::Text("Pieces: [{\"score\": 1}, {\"score\": 2}]".into());
        assert_eq!(
            structured::<Vec<Score>>(&generation),
            Some(vec![Score { score: 1 }, Score { score: 2 }])
        );
    }

    #[test]
    fn wrong_shape_falls_through() {
        let generation = Generation::Text("{\"points\": 3}".into());
        assert_eq!(structured::<Score>(&generation), None);
    }

    #[test]
    fn structured_values_skip_extraction() {
        let generation = Generation::Structured(json!({ "score": 9 }));
        assert_eq!(structured::<Score>(&generation), Some(Score { score: 9 }));
    }
}
