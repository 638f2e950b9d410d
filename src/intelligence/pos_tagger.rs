/// Part-of-speech tagging
///
/// The keyword counter only needs "tag these words". `PosTagger` is that
/// seam; `LexiconTagger` is the built-in implementation, a closed-class
/// lexicon plus word-shape rules. Good enough to drop filler words from
/// search queries, not a linguistic parser.

use crate::error::Result;
use std::collections::HashMap;

/// Penn Treebank word classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PosTag {
    Conjunction,       // CC
    Number,            // CD
    Determiner,        // DT
    Existential,       // EX
    Preposition,       // IN
    Adjective,         // JJ
    Comparative,       // JJR
    Superlative,       // JJS
    Modal,             // MD
    Noun,              // NN
    PluralNoun,        // NNS
    ProperNoun,        // NNP
    PluralProperNoun,  // NNPS
    Pronoun,           // PRP
    PossessivePronoun, // PRP$
    Adverb,            // RB
    To,                // TO
    Verb,              // VB
    VerbPast,          // VBD
    VerbGerund,        // VBG
    VerbParticiple,    // VBN
    VerbPresent,       // VBP
    VerbThirdPerson,   // VBZ
    WhDeterminer,      // WDT
    WhPronoun,         // WP
    WhPossessive,      // WP$
    WhAdverb,          // WRB
    Symbol,            // SYM
}

impl PosTag {
    /// Penn Treebank code
    pub fn penn(&self) -> &'static str {
        match self {
            PosTag::Conjunction => "CC",
            PosTag::Number => "CD",
            PosTag::Determiner => "DT",
            PosTag::Existential => "EX",
            PosTag::Preposition => "IN",
            PosTag::Adjective => "JJ",
            PosTag::Comparative => "JJR",
            PosTag::Superlative => "JJS",
            PosTag::Modal => "MD",
            PosTag::Noun => "NN",
            PosTag::PluralNoun => "NNS",
            PosTag::ProperNoun => "NNP",
            PosTag::PluralProperNoun => "NNPS",
            PosTag::Pronoun => "PRP",
            PosTag::PossessivePronoun => "PRP$",
            PosTag::Adverb => "RB",
            PosTag::To => "TO",
            PosTag::Verb => "VB",
            PosTag::VerbPast => "VBD",
            PosTag::VerbGerund => "VBG",
            PosTag::VerbParticiple => "VBN",
            PosTag::VerbPresent => "VBP",
            PosTag::VerbThirdPerson => "VBZ",
            PosTag::WhDeterminer => "WDT",
            PosTag::WhPronoun => "WP",
            PosTag::WhPossessive => "WP$",
            PosTag::WhAdverb => "WRB",
            PosTag::Symbol => "SYM",
        }
    }

    /// Parse a Penn Treebank code, for taggers that emit strings
    pub fn from_penn(code: &str) -> Option<PosTag> {
        let tag = match code {
            "CC" => PosTag::Conjunction,
            "CD" => PosTag::Number,
            "DT" | "PDT" => PosTag::Determiner,
            "EX" => PosTag::Existential,
            "IN" => PosTag::Preposition,
            "JJ" => PosTag::Adjective,
            "JJR" => PosTag::Comparative,
            "JJS" => PosTag::Superlative,
            "MD" => PosTag::Modal,
            "NN" => PosTag::Noun,
            "NNS" => PosTag::PluralNoun,
            "NNP" => PosTag::ProperNoun,
            "NNPS" => PosTag::PluralProperNoun,
            "PRP" => PosTag::Pronoun,
            "PRP$" => PosTag::PossessivePronoun,
            "RB" | "RBR" | "RBS" | "RP" => PosTag::Adverb,
            "TO" => PosTag::To,
            "VB" => PosTag::Verb,
            "VBD" => PosTag::VerbPast,
            "VBG" => PosTag::VerbGerund,
            "VBN" => PosTag::VerbParticiple,
            "VBP" => PosTag::VerbPresent,
            "VBZ" => PosTag::VerbThirdPerson,
            "WDT" => PosTag::WhDeterminer,
            "WP" => PosTag::WhPronoun,
            "WP$" => PosTag::WhPossessive,
            "WRB" => PosTag::WhAdverb,
            "SYM" | "." | "," | ":" | "(" | ")" | "``" | "''" | "#" | "$" => PosTag::Symbol,
            _ => return None,
        };
        Some(tag)
    }

    /// Nouns (common, plural, proper, plural proper) and base or past verbs
    pub fn is_keyword_class(&self) -> bool {
        matches!(
            self,
            PosTag::Noun
                | PosTag::PluralNoun
                | PosTag::ProperNoun
                | PosTag::PluralProperNoun
                | PosTag::Verb
                | PosTag::VerbPast
        )
    }
}

/// Tags a whole token sequence in one pass
///
/// Must return exactly one tag per token.
pub trait PosTagger: Send + Sync {
    fn tag(&self, tokens: &[String]) -> Result<Vec<PosTag>>;
}

const CLOSED_CLASS: &[(&str, PosTag)] = &[
    ("a", PosTag::Determiner),
    ("an", PosTag::Determiner),
    ("the", PosTag::Determiner),
    ("this", PosTag::Determiner),
    ("that", PosTag::Determiner),
    ("these", PosTag::Determiner),
    ("those", PosTag::Determiner),
    ("each", PosTag::Determiner),
    ("every", PosTag::Determiner),
    ("some", PosTag::Determiner),
    ("any", PosTag::Determiner),
    ("no", PosTag::Determiner),
    ("all", PosTag::Determiner),
    ("both", PosTag::Determiner),
    ("there", PosTag::Existential),
    ("and", PosTag::Conjunction),
    ("or", PosTag::Conjunction),
    ("but", PosTag::Conjunction),
    ("nor", PosTag::Conjunction),
    ("in", PosTag::Preposition),
    ("on", PosTag::Preposition),
    ("at", PosTag::Preposition),
    ("for", PosTag::Preposition),
    ("with", PosTag::Preposition),
    ("without", PosTag::Preposition),
    ("of", PosTag::Preposition),
    ("from", PosTag::Preposition),
    ("by", PosTag::Preposition),
    ("about", PosTag::Preposition),
    ("near", PosTag::Preposition),
    ("into", PosTag::Preposition),
    ("over", PosTag::Preposition),
    ("under", PosTag::Preposition),
    ("between", PosTag::Preposition),
    ("within", PosTag::Preposition),
    ("after", PosTag::Preposition),
    ("before", PosTag::Preposition),
    ("during", PosTag::Preposition),
    ("like", PosTag::Preposition),
    ("if", PosTag::Preposition),
    ("vs", PosTag::Preposition),
    ("versus", PosTag::Preposition),
    ("to", PosTag::To),
    ("i", PosTag::Pronoun),
    ("you", PosTag::Pronoun),
    ("he", PosTag::Pronoun),
    ("she", PosTag::Pronoun),
    ("it", PosTag::Pronoun),
    ("we", PosTag::Pronoun),
    ("they", PosTag::Pronoun),
    ("me", PosTag::Pronoun),
    ("him", PosTag::Pronoun),
    ("us", PosTag::Pronoun),
    ("them", PosTag::Pronoun),
    ("my", PosTag::PossessivePronoun),
    ("your", PosTag::PossessivePronoun),
    ("his", PosTag::PossessivePronoun),
    ("her", PosTag::PossessivePronoun),
    ("its", PosTag::PossessivePronoun),
    ("our", PosTag::PossessivePronoun),
    ("their", PosTag::PossessivePronoun),
    ("can", PosTag::Modal),
    ("could", PosTag::Modal),
    ("will", PosTag::Modal),
    ("would", PosTag::Modal),
    ("should", PosTag::Modal),
    ("may", PosTag::Modal),
    ("might", PosTag::Modal),
    ("must", PosTag::Modal),
    ("shall", PosTag::Modal),
    ("what", PosTag::WhPronoun),
    ("who", PosTag::WhPronoun),
    ("whom", PosTag::WhPronoun),
    ("whose", PosTag::WhPossessive),
    ("which", PosTag::WhDeterminer),
    ("when", PosTag::WhAdverb),
    ("where", PosTag::WhAdverb),
    ("why", PosTag::WhAdverb),
    ("how", PosTag::WhAdverb),
    ("is", PosTag::VerbThirdPerson),
    ("does", PosTag::VerbThirdPerson),
    ("has", PosTag::VerbThirdPerson),
    ("are", PosTag::VerbPresent),
    ("am", PosTag::VerbPresent),
    ("do", PosTag::VerbPresent),
    ("have", PosTag::VerbPresent),
    ("be", PosTag::Verb),
    ("was", PosTag::VerbPast),
    ("were", PosTag::VerbPast),
    ("did", PosTag::VerbPast),
    ("had", PosTag::VerbPast),
    ("been", PosTag::VerbParticiple),
    ("being", PosTag::VerbGerund),
    ("not", PosTag::Adverb),
    ("very", PosTag::Adverb),
    ("too", PosTag::Adverb),
    ("also", PosTag::Adverb),
    ("just", PosTag::Adverb),
    ("now", PosTag::Adverb),
    ("here", PosTag::Adverb),
    ("so", PosTag::Adverb),
    ("up", PosTag::Adverb),
    ("out", PosTag::Adverb),
];

const ADJECTIVES: &[(&str, PosTag)] = &[
    ("cheap", PosTag::Adjective),
    ("free", PosTag::Adjective),
    ("good", PosTag::Adjective),
    ("new", PosTag::Adjective),
    ("old", PosTag::Adjective),
    ("top", PosTag::Adjective),
    ("online", PosTag::Adjective),
    ("local", PosTag::Adjective),
    ("easy", PosTag::Adjective),
    ("small", PosTag::Adjective),
    ("big", PosTag::Adjective),
    ("large", PosTag::Adjective),
    ("high", PosTag::Adjective),
    ("low", PosTag::Adjective),
    ("fast", PosTag::Adjective),
    ("open", PosTag::Adjective),
    ("full", PosTag::Adjective),
    ("ultimate", PosTag::Adjective),
    ("real", PosTag::Adjective),
    ("available", PosTag::Adjective),
    ("better", PosTag::Comparative),
    ("cheaper", PosTag::Comparative),
    ("more", PosTag::Comparative),
    ("best", PosTag::Superlative),
    ("cheapest", PosTag::Superlative),
    ("most", PosTag::Superlative),
    ("latest", PosTag::Superlative),
];

const VERBS: &[(&str, PosTag)] = &[
    ("buy", PosTag::Verb),
    ("get", PosTag::Verb),
    ("make", PosTag::Verb),
    ("find", PosTag::Verb),
    ("learn", PosTag::Verb),
    ("use", PosTag::Verb),
    ("fix", PosTag::Verb),
    ("install", PosTag::Verb),
    ("download", PosTag::Verb),
    ("watch", PosTag::Verb),
    ("play", PosTag::Verb),
    ("cook", PosTag::Verb),
    ("build", PosTag::Verb),
    ("start", PosTag::Verb),
    ("sell", PosTag::Verb),
    ("rent", PosTag::Verb),
    ("hire", PosTag::Verb),
    ("compare", PosTag::Verb),
    ("write", PosTag::Verb),
    ("read", PosTag::Verb),
    ("create", PosTag::Verb),
    ("remove", PosTag::Verb),
    ("cancel", PosTag::Verb),
    ("reset", PosTag::Verb),
    ("improve", PosTag::Verb),
    ("rank", PosTag::Verb),
    ("bought", PosTag::VerbPast),
    ("got", PosTag::VerbPast),
    ("made", PosTag::VerbPast),
    ("found", PosTag::VerbPast),
    ("sold", PosTag::VerbPast),
    ("built", PosTag::VerbPast),
    ("wrote", PosTag::VerbPast),
    ("went", PosTag::VerbPast),
    ("took", PosTag::VerbPast),
    ("came", PosTag::VerbPast),
];

// Suffixes that mark an adjective
const ADJECTIVE_SUFFIXES: &[&str] = &["ful", "ous", "less", "able", "ible"];

/// Built-in lexicon + word-shape tagger
pub struct LexiconTagger {
    lexicon: HashMap<String, PosTag>,
}

impl LexiconTagger {
    pub fn new() -> Self {
        let lexicon = CLOSED_CLASS
            .iter()
            .chain(ADJECTIVES)
            .chain(VERBS)
            .map(|(word, tag)| (word.to_string(), *tag))
            .collect();

        Self { lexicon }
    }

    /// Add or override lexicon entries (lowercase words)
    pub fn with_entries<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (String, PosTag)>,
    {
        for (word, tag) in entries {
            self.lexicon.insert(word.to_lowercase(), tag);
        }
        self
    }

    fn tag_word(&self, token: &str, previous: Option<PosTag>) -> PosTag {
        let core = token.trim_matches(|c: char| !c.is_alphanumeric());
        if core.is_empty() {
            return PosTag::Symbol;
        }

        if core
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == ',')
        {
            return PosTag::Number;
        }

        let lower = core.to_lowercase();
        if let Some(tag) = self.lexicon.get(&lower) {
            return *tag;
        }

        let capitalized = core.chars().next().map(char::is_uppercase).unwrap_or(false);
        if capitalized {
            return if is_plural(&lower) {
                PosTag::PluralProperNoun
            } else {
                PosTag::ProperNoun
            };
        }

        // "to ___" and "can ___" take a base verb
        if matches!(previous, Some(PosTag::To) | Some(PosTag::Modal)) {
            return PosTag::Verb;
        }

        if lower.len() > 4 && lower.ends_with("ing") {
            return PosTag::VerbGerund;
        }
        if lower.len() > 3 && lower.ends_with("ed") {
            return PosTag::VerbPast;
        }
        if lower.len() > 4 && lower.ends_with("ly") {
            return PosTag::Adverb;
        }
        if ADJECTIVE_SUFFIXES
            .iter()
            .any(|suffix| lower.len() > suffix.len() + 2 && lower.ends_with(suffix))
        {
            return PosTag::Adjective;
        }
        if is_plural(&lower) {
            return PosTag::PluralNoun;
        }

        PosTag::Noun
    }
}

impl Default for LexiconTagger {
    fn default() -> Self {
        Self::new()
    }
}

impl PosTagger for LexiconTagger {
    fn tag(&self, tokens: &[String]) -> Result<Vec<PosTag>> {
        let mut tags = Vec::with_capacity(tokens.len());
        let mut previous = None;

        for token in tokens {
            let tag = self.tag_word(token, previous);
            tags.push(tag);
            previous = Some(tag);
        }

        Ok(tags)
    }
}

fn is_plural(lower: &str) -> bool {
    lower.len() > 3
        && lower.ends_with('s')
        && !lower.ends_with("ss")
        && !lower.ends_with("us")
        && !lower.ends_with("is")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(text: &str) -> Vec<PosTag> {
        let tokens: Vec<String> = text.split_whitespace().map(str::to_string).collect();
        LexiconTagger::new().tag(&tokens).unwrap()
    }

    #[test]
    fn test_tags_typical_queries() {
        assert_eq!(
            tags("what is seo"),
            vec![PosTag::WhPronoun, PosTag::VerbThirdPerson, PosTag::Noun]
        );
        assert_eq!(
            tags("buy cheap shoes"),
            vec![PosTag::Verb, PosTag::Adjective, PosTag::PluralNoun]
        );
    }

    #[test]
    fn test_proper_nouns() {
        assert_eq!(tags("Google"), vec![PosTag::ProperNoun]);
        assert_eq!(tags("Nikes"), vec![PosTag::PluralProperNoun]);
    }

    #[test]
    fn test_context_and_shape_rules() {
        assert_eq!(tags("to rank")[1], PosTag::Verb);
        assert_eq!(tags("how to optimize")[2], PosTag::Verb);
        assert_eq!(tags("optimized")[0], PosTag::VerbPast);
        assert_eq!(tags("running")[0], PosTag::VerbGerund);
        assert_eq!(tags("quickly")[0], PosTag::Adverb);
        assert_eq!(tags("affordable")[0], PosTag::Adjective);
        assert_eq!(tags("2024")[0], PosTag::Number);
        assert_eq!(tags("-")[0], PosTag::Symbol);
    }

    #[test]
    fn test_one_tag_per_token() {
        let tokens: Vec<String> = "the best seo tools for small business in 2024"
            .split_whitespace()
            .map(str::to_string)
            .collect();

        let tags = LexiconTagger::new().tag(&tokens).unwrap();
        assert_eq!(tags.len(), tokens.len());
    }

    #[test]
    fn test_with_entries_overrides() {
        let tagger = LexiconTagger::new().with_entries(vec![("seo".to_string(), PosTag::Adjective)]);
        let tags = tagger.tag(&["SEO".to_string()]).unwrap();

        assert_eq!(tags, vec![PosTag::Adjective]);
    }

    #[test]
    fn test_keyword_classes() {
        let keyword: Vec<&str> = [
            PosTag::Noun,
            PosTag::PluralNoun,
            PosTag::ProperNoun,
            PosTag::PluralProperNoun,
            PosTag::Verb,
            PosTag::VerbPast,
        ]
        .iter()
        .map(|t| t.penn())
        .collect();
        assert_eq!(keyword, vec!["NN", "NNS", "NNP", "NNPS", "VB", "VBD"]);

        assert!(!PosTag::VerbThirdPerson.is_keyword_class());
        assert!(!PosTag::Adjective.is_keyword_class());
        assert!(PosTag::from_penn("NNPS").unwrap().is_keyword_class());
        assert_eq!(PosTag::from_penn("XYZ"), None);
    }
}
