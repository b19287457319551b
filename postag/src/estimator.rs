//! Maximum-likelihood estimation of the tag model.
//!
//! All functions are pure: the same collection of sentences, in any order, gives identical
//! tables. Counts are integers and every probability is computed by a single division, so the
//! result does not depend on the order in which sentences are visited.

use hashbrown::HashMap;

use crate::errors::{PosTagError, Result};
use crate::model::{EmissionTable, Model, StartPolicy, TagAlphabet, TransitionTable, START_TAG};
use crate::sentence::TaggedSentence;

fn ensure_not_empty(sentences: &[TaggedSentence]) -> Result<()> {
    if sentences.is_empty() {
        Err(PosTagError::EmptyCorpus)
    } else {
        Ok(())
    }
}

fn count_transitions<'a>(
    sentences: &'a [TaggedSentence],
    start_marker: Option<&'a str>,
) -> Result<TransitionTable> {
    ensure_not_empty(sentences)?;
    let mut pair_counts: HashMap<(&str, &str), usize> = HashMap::new();
    let mut prev_counts: HashMap<&str, usize> = HashMap::new();
    for s in sentences {
        let tags = s.tags().iter().map(String::as_str);
        let mut prev = start_marker;
        for tag in tags {
            if Some(tag) == start_marker {
                return Err(PosTagError::invalid_argument(
                    "sentences",
                    format!("tag {tag:?} collides with the start marker"),
                ));
            }
            if let Some(prev) = prev {
                *pair_counts.entry((prev, tag)).or_insert(0) += 1;
                *prev_counts.entry(prev).or_insert(0) += 1;
            }
            prev = Some(tag);
        }
    }
    log::debug!(
        "{} distinct tag bigrams from {} predecessors",
        pair_counts.len(),
        prev_counts.len()
    );
    Ok(TransitionTable::from_counts(pair_counts, &prev_counts))
}

/// Estimates tag bigram probabilities, `P(t2 | t1) = count(t1, t2) / count(t1 as predecessor)`.
///
/// Only bigrams inside each sentence are counted; no sentence-boundary tag is inserted. Use
/// [`estimate_transitions_with_start()`] to learn which tags start a sentence.
///
/// # Errors
///
/// If `sentences` is empty, [`PosTagError::EmptyCorpus`] will be returned.
///
/// # Examples
///
/// ```
/// use postag::{estimator, TaggedSentence};
///
/// let sents = vec![
///     TaggedSentence::from_tagged("the/DT dog/NN").unwrap(),
///     TaggedSentence::from_tagged("the/DT cat/NN").unwrap(),
/// ];
/// let table = estimator::estimate_transitions(&sents).unwrap();
/// assert_eq!(Some(1.0), table.get("DT", "NN"));
/// assert_eq!(None, table.get("<s>", "DT"));
/// ```
pub fn estimate_transitions(sentences: &[TaggedSentence]) -> Result<TransitionTable> {
    count_transitions(sentences, None)
}

/// Estimates tag bigram probabilities with `start_marker` prepended to every tag sequence.
///
/// # Errors
///
/// This function will return an error variant when:
///
/// * `sentences` is empty.
/// * A sentence contains `start_marker` as a tag.
///
/// # Examples
///
/// ```
/// use postag::{estimator, TaggedSentence};
///
/// let sents = vec![
///     TaggedSentence::from_tagged("the/DT dog/NN").unwrap(),
///     TaggedSentence::from_tagged("dogs/NNS bark/VBP").unwrap(),
/// ];
/// let table = estimator::estimate_transitions_with_start(&sents, "<s>").unwrap();
/// assert_eq!(Some(0.5), table.get("<s>", "DT"));
/// assert_eq!(Some(0.5), table.get("<s>", "NNS"));
/// ```
pub fn estimate_transitions_with_start(
    sentences: &[TaggedSentence],
    start_marker: &str,
) -> Result<TransitionTable> {
    count_transitions(sentences, Some(start_marker))
}

/// Estimates emission probabilities, `P(word | tag) = count(word, tag) / count(tag)`.
///
/// # Errors
///
/// If `sentences` is empty, [`PosTagError::EmptyCorpus`] will be returned.
pub fn estimate_emissions(sentences: &[TaggedSentence]) -> Result<EmissionTable> {
    ensure_not_empty(sentences)?;
    let mut pair_counts: HashMap<(&str, &str), usize> = HashMap::new();
    let mut tag_counts: HashMap<&str, usize> = HashMap::new();
    for s in sentences {
        for (word, tag) in s.iter() {
            *pair_counts.entry((word, tag)).or_insert(0) += 1;
            *tag_counts.entry(tag).or_insert(0) += 1;
        }
    }
    log::debug!(
        "{} distinct word/tag pairs over {} tags",
        pair_counts.len(),
        tag_counts.len()
    );
    Ok(EmissionTable::from_counts(pair_counts, &tag_counts))
}

/// Collects the distinct tags of `sentences`.
///
/// # Errors
///
/// If `sentences` is empty, [`PosTagError::EmptyCorpus`] will be returned.
pub fn tag_alphabet(sentences: &[TaggedSentence]) -> Result<TagAlphabet> {
    ensure_not_empty(sentences)?;
    Ok(TagAlphabet::new(
        sentences
            .iter()
            .flat_map(|s| s.tags().iter().map(String::as_str)),
    ))
}

/// Trainer.
///
/// # Examples
///
/// ```no_run
/// use std::fs::File;
/// use std::io::{BufReader, BufWriter};
///
/// use postag::{corpus, Trainer};
///
/// let f = BufReader::new(File::open("train.pos").unwrap());
/// let mut trainer = Trainer::new();
/// for s in corpus::read_tagged_corpus(f).unwrap() {
///     trainer.push_sentence(s);
/// }
///
/// let model = trainer.train().unwrap();
/// let mut f = BufWriter::new(File::create("model.bin").unwrap());
/// model.write(&mut f).unwrap();
/// ```
#[derive(Default)]
pub struct Trainer {
    sentences: Vec<TaggedSentence>,
    start_policy: StartPolicy,
}

impl Trainer {
    /// Creates a new trainer using [`StartPolicy::Learned`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how the probability of the first tag is obtained.
    ///
    /// # Arguments
    ///
    /// * `policy` - The start policy.
    ///
    /// # Returns
    ///
    /// A trainer with the specified policy.
    pub fn start_policy(mut self, policy: StartPolicy) -> Self {
        self.start_policy = policy;
        self
    }

    /// Adds a training sentence.
    pub fn push_sentence(&mut self, sentence: TaggedSentence) {
        self.sentences.push(sentence);
    }

    /// Number of sentences added.
    pub fn n_sentences(&self) -> usize {
        self.sentences.len()
    }

    /// Number of words added.
    pub fn n_words(&self) -> usize {
        self.sentences.iter().map(TaggedSentence::len).sum()
    }

    /// Estimates a model from the added sentences.
    ///
    /// # Errors
    ///
    /// This function will return an error variant when:
    ///
    /// * No sentence was added.
    /// * A sentence uses [`START_TAG`] as a tag.
    pub fn train(&self) -> Result<Model> {
        let alphabet = tag_alphabet(&self.sentences)?;
        if alphabet.contains(START_TAG) {
            return Err(PosTagError::invalid_argument(
                "sentences",
                format!("tag {START_TAG:?} is reserved for the start marker"),
            ));
        }
        let transitions = match self.start_policy {
            StartPolicy::Learned => estimate_transitions_with_start(&self.sentences, START_TAG)?,
            StartPolicy::Floor => estimate_transitions(&self.sentences)?,
        };
        let emissions = estimate_emissions(&self.sentences)?;
        log::debug!(
            "trained on {} sentences: {} tags, {} transitions, {} emissions",
            self.sentences.len(),
            alphabet.len(),
            transitions.len(),
            emissions.len()
        );
        Ok(Model::new(
            alphabet,
            transitions,
            emissions,
            self.start_policy,
        ))
    }
}
