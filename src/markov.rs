//! Word-level Markov chain over a newline-delimited corpus.
//!
//! Each corpus line is one training sentence. Sampling retries until a walk
//! passes the overlap test, which rejects output that reproduces a long
//! enough run of any source line.

use std::collections::HashMap;

use rand::Rng;

const BEGIN: &str = "___BEGIN__";
const END: &str = "___END__";

/// Number of preceding words a transition is keyed on.
const STATE_SIZE: usize = 2;

/// An output may share at most `round(0.7 * len)` consecutive words with the
/// corpus, capped at 15.
const MAX_OVERLAP_RATIO: f64 = 0.7;
const MAX_OVERLAP_TOTAL: usize = 15;

pub struct TextModel {
    transitions: HashMap<Vec<String>, Vec<(String, u32)>>,
    rejoined: String,
}

impl TextModel {
    /// Build a chain from a corpus of newline-delimited sentences.
    /// Blank lines are skipped.
    pub fn new(corpus: &str) -> Self {
        let mut counts: HashMap<Vec<String>, HashMap<String, u32>> = HashMap::new();
        let mut lines: Vec<String> = Vec::new();

        for line in corpus.lines() {
            let words: Vec<&str> = line.split_whitespace().collect();
            if words.is_empty() {
                continue;
            }
            lines.push(words.join(" "));

            let mut state: Vec<String> = vec![BEGIN.to_string(); STATE_SIZE];
            for &word in &words {
                *counts
                    .entry(state.clone())
                    .or_default()
                    .entry(word.to_string())
                    .or_insert(0) += 1;
                state.remove(0);
                state.push(word.to_string());
            }
            *counts
                .entry(state)
                .or_default()
                .entry(END.to_string())
                .or_insert(0) += 1;
        }

        let transitions = counts
            .into_iter()
            .map(|(state, follows)| (state, follows.into_iter().collect()))
            .collect();

        Self {
            transitions,
            rejoined: lines.join("\n"),
        }
    }

    /// Attempt to sample one sentence, retrying up to `tries` times before
    /// giving up. Returns `None` when the budget is exhausted or the corpus
    /// was empty.
    pub fn make_sentence(&self, tries: usize) -> Option<String> {
        if self.transitions.is_empty() {
            return None;
        }
        let mut rng = rand::thread_rng();
        for _ in 0..tries {
            let words = self.walk(&mut rng);
            if self.test_output(&words) {
                return Some(words.join(" "));
            }
        }
        None
    }

    /// One weighted random walk from the begin state to an end token.
    fn walk<R: Rng>(&self, rng: &mut R) -> Vec<String> {
        let mut state: Vec<String> = vec![BEGIN.to_string(); STATE_SIZE];
        let mut words = Vec::new();

        loop {
            let Some(follows) = self.transitions.get(&state) else {
                break;
            };
            let total: u32 = follows.iter().map(|(_, n)| n).sum();
            let mut pick = rng.gen_range(0..total);
            let mut next = END;
            for (word, n) in follows {
                if pick < *n {
                    next = word.as_str();
                    break;
                }
                pick -= *n;
            }
            if next == END {
                break;
            }
            words.push(next.to_string());
            state.remove(0);
            state.push(next.to_string());
        }
        words
    }

    /// Reject walks that overlap the corpus beyond the configured bound.
    fn test_output(&self, words: &[String]) -> bool {
        if words.is_empty() {
            return false;
        }
        let overlap_ratio = (MAX_OVERLAP_RATIO * words.len() as f64).round() as usize;
        let overlap_max = MAX_OVERLAP_TOTAL.min(overlap_ratio);
        let overlap_over = overlap_max + 1;
        let gram_count = words.len().saturating_sub(overlap_max).max(1);

        for i in 0..gram_count {
            let end = (i + overlap_over).min(words.len());
            let gram = words[i..end].join(" ");
            if self.rejoined.contains(&gram) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_empty_corpus_yields_nothing() {
        let model = TextModel::new("");
        assert_eq!(model.make_sentence(10), None);
    }

    #[test]
    fn test_single_line_corpus_only_reproduces_itself() {
        // Every walk replays the one source line, so the overlap test
        // rejects it and the retry budget runs dry.
        let model = TextModel::new("the quick brown fox jumps");
        assert_eq!(model.make_sentence(100), None);
    }

    #[test]
    fn test_braided_corpus_produces_novel_sentence() {
        let corpus = "i like green eggs\n\
                      i like tasty ham\n\
                      you like green ham\n\
                      you like tasty eggs";
        let model = TextModel::new(corpus);

        let sentence = model
            .make_sentence(1000)
            .expect("braided corpus should admit a novel sentence");

        let vocab: HashSet<&str> = corpus.split_whitespace().collect();
        for token in sentence.split_whitespace() {
            assert!(vocab.contains(token), "unknown token {token:?}");
        }
        assert!(!corpus.lines().any(|line| line == sentence));
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let model = TextModel::new("\n\n\n");
        assert_eq!(model.make_sentence(10), None);
    }
}
