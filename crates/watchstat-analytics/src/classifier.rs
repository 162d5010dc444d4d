//! Show-title extraction and movie/series classification

use std::sync::LazyLock;

use regex::Regex;
use watchstat_common::{ClassifierMode, FilmType};

/// Whole-word series keywords in English and Swedish
static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(season|säsong|series|serie|episode|episod|avsnitt)\b")
        .expect("Invalid series keyword regex")
});

/// The older alternation: every alternative keeps its surrounding spaces,
/// so only `season ` matches at the start of a word and `avsnitt` needs a
/// leading space
static LEGACY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)season | säsong | series | serie | episode | episod | avsnitt")
        .expect("Invalid legacy series keyword regex")
});

/// Portion of a title before its first colon, trimmed
pub fn show_title(title: &str) -> &str {
    title.split(':').next().unwrap_or(title).trim()
}

/// Classifies titles as movies or series
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleClassifier {
    mode: ClassifierMode,
}

impl TitleClassifier {
    /// Create a classifier for the given mode
    pub fn new(mode: ClassifierMode) -> Self {
        Self { mode }
    }

    /// The active mode
    pub fn mode(&self) -> ClassifierMode {
        self.mode
    }

    fn pattern(&self) -> &'static Regex {
        match self.mode {
            ClassifierMode::Token => &TOKEN_PATTERN,
            ClassifierMode::Legacy => &LEGACY_PATTERN,
        }
    }

    /// Series when the title, with `(` removed, contains a series keyword
    pub fn classify(&self, title: &str) -> FilmType {
        let cleaned = title.replace('(', "");
        if self.pattern().is_match(&cleaned) {
            FilmType::Series
        } else {
            FilmType::Movie
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_title() {
        assert_eq!(show_title("Dark: Season 1: Secrets"), "Dark");
        assert_eq!(show_title("  Heat  "), "Heat");
        assert_eq!(show_title("Star Wars: Episode IV"), "Star Wars");
        assert_eq!(show_title(""), "");
        assert_eq!(show_title(": Untitled"), "");
    }

    #[test]
    fn test_token_mode() {
        let classifier = TitleClassifier::default();
        assert_eq!(classifier.mode(), ClassifierMode::Token);

        assert_eq!(classifier.classify("Dark: Season 1: Secrets"), FilmType::Series);
        assert_eq!(classifier.classify("Bron: Säsong 2: Avsnitt 4"), FilmType::Series);
        assert_eq!(classifier.classify("Show: Limited Series: Part 1"), FilmType::Series);
        assert_eq!(classifier.classify("Chef's Table: Episode 3"), FilmType::Series);
        assert_eq!(classifier.classify("Heat"), FilmType::Movie);
        // Keywords inside other words do not count
        assert_eq!(classifier.classify("Seasoned Chefs"), FilmType::Movie);
        assert_eq!(classifier.classify("Serienmörder"), FilmType::Movie);
    }

    #[test]
    fn test_chapter_is_not_a_series_keyword() {
        let title = "Stranger Things: Chapter One";
        assert_eq!(show_title(title), "Stranger Things");
        for mode in [ClassifierMode::Token, ClassifierMode::Legacy] {
            assert_eq!(TitleClassifier::new(mode).classify(title), FilmType::Movie, "{mode:?}");
        }
    }

    #[test]
    fn test_parenthesis_is_removed_before_matching() {
        let classifier = TitleClassifier::default();
        assert_eq!(classifier.classify("Arcane (Episode 1)"), FilmType::Series);
    }

    #[test]
    fn test_legacy_mode_pinned() {
        let legacy = TitleClassifier::new(ClassifierMode::Legacy);

        // "season " matches with only a trailing space
        assert_eq!(legacy.classify("Dark: Season 1: Secrets"), FilmType::Series);
        assert_eq!(legacy.classify("Bron: Säsong 2"), FilmType::Series);
        // " episode " needs spaces on both sides
        assert_eq!(legacy.classify("Chef's Table: Episode 3"), FilmType::Series);
        assert_eq!(legacy.classify("Chef's Table: Episode"), FilmType::Movie);
        // " avsnitt" only needs the leading space
        assert_eq!(legacy.classify("Bron: Avsnitt"), FilmType::Series);
        // Matches inside words the token mode rejects
        assert_eq!(legacy.classify("NFL Preseason Games"), FilmType::Series);
        assert_eq!(
            TitleClassifier::default().classify("NFL Preseason Games"),
            FilmType::Movie
        );
        assert_eq!(legacy.classify("Heat"), FilmType::Movie);
    }

    #[test]
    fn test_modes_disagree_on_trailing_keyword() {
        let title = "Breaking Bad: Episode";
        assert_eq!(TitleClassifier::new(ClassifierMode::Token).classify(title), FilmType::Series);
        assert_eq!(TitleClassifier::new(ClassifierMode::Legacy).classify(title), FilmType::Movie);
    }
}
