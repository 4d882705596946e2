use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref WORD_RE: Regex = Regex::new(r"(?u)[\p{L}\p{N}_]+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","ain","all","am","an","and","any","are","aren","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","couldn",
            "d","did","didn","do","does","doesn","doing","don","down","during",
            "each","few","for","from","further",
            "had","hadn","has","hasn","have","haven","having","he","her","here","hers","herself","him","himself","his","how",
            "i","if","in","into","is","isn","it","its","itself",
            "just","ll","m","ma","me","more","most","mustn","my","myself",
            "no","nor","not","now","o","of","off","on","once","only","or","other","our","ours","ourselves","out","over","own",
            "re","s","same","shan","she","should","shouldn","so","some","such",
            "t","than","that","the","their","theirs","them","themselves","then","there","these","they","this","those","through","to","too",
            "under","until","up","ve","very",
            "was","wasn","we","were","weren","what","when","where","which","while","who","whom","why","will","with","won","wouldn",
            "y","you","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

/// Converts raw text into the normalized token stream the index is keyed on.
///
/// The same analyzer must be used at build time and at query time; a query
/// token normalized differently from its indexed form never matches.
pub trait Analyzer: Send + Sync {
    fn analyze(&self, text: &str) -> Vec<String>;
}

impl<A: Analyzer + ?Sized> Analyzer for Box<A> {
    fn analyze(&self, text: &str) -> Vec<String> { (**self).analyze(text) }
}

/// Lower-cases and splits on non-word characters. No stop words, no stemming.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleAnalyzer;

impl Analyzer for SimpleAnalyzer {
    fn analyze(&self, text: &str) -> Vec<String> {
        split_words(&text.to_lowercase()).map(str::to_string).collect()
    }
}

/// NFKC normalization, lower-casing, stop-word removal and English stemming.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardAnalyzer;

impl Analyzer for StandardAnalyzer {
    fn analyze(&self, text: &str) -> Vec<String> { tokenize(text) }
}

fn split_words(text: &str) -> impl Iterator<Item = &str> {
    WORD_RE.find_iter(text).map(|m| m.as_str())
}

fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Tokenize text into stemmed terms using NFKC normalization, lowercase and stopword removal.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    split_words(&normalized)
        .filter(|token| !is_stopword(token))
        .map(|token| STEMMER.stem(token).into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = tokenize("Running, runner's run!");
        assert!(t.iter().any(|w| w == "run"));
    }

    #[test]
    fn simple_analyzer_keeps_every_word() {
        let t = SimpleAnalyzer.analyze("The cat sat on THE mat.");
        assert_eq!(t, vec!["the", "cat", "sat", "on", "the", "mat"]);
    }

    #[test]
    fn contractions_leave_no_fragments() {
        assert_eq!(tokenize("don't"), Vec::<String>::new());
    }
}
