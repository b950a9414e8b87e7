//! Heuristic named-entity labeling for concept mentions
//!
//! A lightweight cue-word classifier standing in for a full NER model. A
//! concept only receives a label when it appears as a capitalized mention in
//! the text; the label drives question-template eligibility and the entity
//! allow-list during concept extraction.

use crate::text;

/// Entity categories eligible as extracted concepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityLabel {
    Organization,
    Person,
    Place,
    Product,
    Event,
    WorkOfArt,
    Law,
}

impl EntityLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityLabel::Organization => "organization",
            EntityLabel::Person => "person",
            EntityLabel::Place => "place",
            EntityLabel::Product => "product",
            EntityLabel::Event => "event",
            EntityLabel::WorkOfArt => "work-of-art",
            EntityLabel::Law => "law",
        }
    }
}

const ORG_CUES: &[&str] = &[
    "inc", "corp", "corporation", "ltd", "llc", "company", "university", "institute",
    "association", "agency", "committee", "foundation", "bank", "group", "ministry", "council",
];

const PLACE_CUES: &[&str] = &[
    "city", "river", "mountain", "valley", "island", "republic", "kingdom", "county",
    "province", "ocean", "desert", "lake", "bay", "coast",
];

const EVENT_CUES: &[&str] = &[
    "war", "battle", "conference", "festival", "olympics", "summit", "revolution",
    "election", "prize", "award", "expedition",
];

const LAW_CUES: &[&str] = &[
    "act", "law", "treaty", "amendment", "constitution", "regulation", "directive", "statute",
];

const HONORIFICS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "professor", "president", "sir", "dame", "captain",
    "general", "king", "queen", "saint",
];

/// Classify a concept as it appears in `context`.
///
/// Returns `None` when the concept never occurs as a capitalized mention or
/// matches no category cue.
pub fn label_for(concept: &str, context: &str) -> Option<EntityLabel> {
    let start = text::find_ci(context, concept)?;
    let mention = &context[start..start + concept.len()];
    if !text::is_capitalized(mention) {
        return None;
    }

    let tokens: Vec<String> = text::tokenize(concept)
        .iter()
        .map(|t| t.to_lowercase())
        .collect();
    let last = tokens.last().map(String::as_str)?;

    if LAW_CUES.contains(&last) {
        return Some(EntityLabel::Law);
    }
    if tokens.iter().any(|t| ORG_CUES.contains(&t.as_str())) {
        return Some(EntityLabel::Organization);
    }
    if tokens.iter().any(|t| EVENT_CUES.contains(&t.as_str())) {
        return Some(EntityLabel::Event);
    }
    if PLACE_CUES.contains(&last) {
        return Some(EntityLabel::Place);
    }
    if is_quoted(context, start, mention.len()) {
        return Some(EntityLabel::WorkOfArt);
    }
    if preceding_honorific(context, start) {
        return Some(EntityLabel::Person);
    }
    if tokens.iter().any(|t| t.chars().any(|c| c.is_ascii_digit())) {
        return Some(EntityLabel::Product);
    }
    if tokens.len() >= 2 && text::tokenize(mention).iter().all(|t| text::is_capitalized(t)) {
        return Some(EntityLabel::Person);
    }

    None
}

fn is_quoted(context: &str, start: usize, len: usize) -> bool {
    let before = &context[..start];
    let after = &context[start + len..];
    (before.ends_with('"') && after.starts_with('"'))
        || (before.ends_with('\u{201c}') && after.starts_with('\u{201d}'))
}

fn preceding_honorific(context: &str, start: usize) -> bool {
    let before = context[..start].trim_end();
    let Some(word) = before.split_whitespace().next_back() else {
        return false;
    };
    let word = word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
    HONORIFICS.contains(&word.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_from_capitalized_pair() {
        let text = "The element was discovered by Marie Curie in Paris.";
        assert_eq!(label_for("marie curie", text), Some(EntityLabel::Person));
    }

    #[test]
    fn test_person_from_honorific() {
        let text = "The cure was found by Dr. Salk after years of work.";
        assert_eq!(label_for("salk", text), Some(EntityLabel::Person));
    }

    #[test]
    fn test_organization_cue() {
        let text = "Acme Corporation builds reactors for the grid.";
        assert_eq!(label_for("acme corporation", text), Some(EntityLabel::Organization));
    }

    #[test]
    fn test_event_cue() {
        let text = "She won the Nobel Prize twice.";
        assert_eq!(label_for("nobel prize", text), Some(EntityLabel::Event));
    }

    #[test]
    fn test_law_cue() {
        let text = "Congress passed the Clean Air Act in 1963.";
        assert_eq!(label_for("clean air act", text), Some(EntityLabel::Law));
    }

    #[test]
    fn test_work_of_art_quoted() {
        let text = "Her novel \"Middlemarch\" is widely taught.";
        assert_eq!(label_for("middlemarch", text), Some(EntityLabel::WorkOfArt));
    }

    #[test]
    fn test_product_with_digits() {
        let text = "The rover carries a Spectrometer 9 for soil analysis.";
        assert_eq!(label_for("spectrometer 9", text), Some(EntityLabel::Product));
    }

    #[test]
    fn test_lowercase_mention_is_not_an_entity() {
        let text = "photosynthesis converts light into energy";
        assert_eq!(label_for("photosynthesis", text), None);
    }

    #[test]
    fn test_absent_concept() {
        assert_eq!(label_for("gravity", "Nothing relevant here."), None);
    }
}
