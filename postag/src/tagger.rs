#[cfg(feature = "multithreading")]
use std::io;
#[cfg(feature = "multithreading")]
use std::sync::Arc;
#[cfg(feature = "multithreading")]
use std::thread;

#[cfg(feature = "multithreading")]
use crossbeam_channel::{Receiver, Sender};
use hashbrown::HashMap;

use crate::errors::{PosTagError, Result};
use crate::model::{Model, TagAlphabet, START_TAG};

/// Probability substituted for transitions and emissions that were never observed.
pub const DEFAULT_FLOOR: f64 = 1e-6;

// Score and backpointer matrices of one decoding call, row-major with one row per word.
//
//        tag1 tag2 tag3 ...
//
// word1    0    1    2
// word2    T  T+1  T+2
// ...
struct Lattice {
    n_tags: usize,
    scores: Vec<f64>,
    backpointers: Vec<usize>,
}

impl Lattice {
    fn new(n_words: usize, n_tags: usize) -> Self {
        Self {
            n_tags,
            scores: vec![f64::NEG_INFINITY; n_words * n_tags],
            backpointers: vec![0; n_words * n_tags],
        }
    }

    fn n_words(&self) -> usize {
        self.scores.len() / self.n_tags
    }

    fn init(&mut self, log_start: &[f64], log_emit: &[f64]) {
        for ((score, &s), &e) in self.scores[..self.n_tags]
            .iter_mut()
            .zip(log_start)
            .zip(log_emit)
        {
            *score = s + e;
        }
    }

    fn extend(&mut self, i: usize, log_trans: &[f64], log_emit: &[f64]) {
        let n_tags = self.n_tags;
        let (done, rest) = self.scores.split_at_mut(i * n_tags);
        let prev_row = &done[(i - 1) * n_tags..];
        let cur_row = &mut rest[..n_tags];
        let bp_row = &mut self.backpointers[i * n_tags..(i + 1) * n_tags];
        for cur in 0..n_tags {
            // Starts below any attainable score so that a predecessor is always chosen. Only a
            // strictly greater score replaces it, so ties go to the smallest tag id.
            let mut best_score = f64::NEG_INFINITY;
            let mut best_prev = 0;
            for (prev, &prev_score) in prev_row.iter().enumerate() {
                let score = prev_score + log_trans[prev * n_tags + cur];
                if score > best_score {
                    best_score = score;
                    best_prev = prev;
                }
            }
            cur_row[cur] = best_score + log_emit[cur];
            bp_row[cur] = best_prev;
        }
    }

    fn best_path(&self) -> (Vec<usize>, f64) {
        let n_words = self.n_words();
        let last_row = &self.scores[(n_words - 1) * self.n_tags..];
        let (mut cur, best_score) = argmax(last_row);
        let mut path = vec![0; n_words];
        path[n_words - 1] = cur;
        for i in (1..n_words).rev() {
            cur = self.backpointers[i * self.n_tags + cur];
            path[i - 1] = cur;
        }
        (path, best_score)
    }
}

/// Returns the index and value of the first maximum. Falls back to index 0 when no value exceeds
/// negative infinity.
fn argmax(scores: &[f64]) -> (usize, f64) {
    let mut best = 0;
    let mut best_score = f64::NEG_INFINITY;
    for (i, &score) in scores.iter().enumerate() {
        if score > best_score {
            best = i;
            best_score = score;
        }
    }
    (best, best_score)
}

/// Viterbi tagger.
///
/// Probabilities are converted to natural logarithms when the tagger is built, so long
/// sentences do not underflow. Tags are visited in the lexicographic order of the
/// [`TagAlphabet`], which makes tie-breaking deterministic.
///
/// # Examples
///
/// ```
/// use postag::{Tagger, TaggedSentence, Trainer};
///
/// let mut trainer = Trainer::new();
/// trainer.push_sentence(TaggedSentence::from_tagged("the/DT dog/NN").unwrap());
/// trainer.push_sentence(TaggedSentence::from_tagged("the/DT cat/NN").unwrap());
/// let model = trainer.train().unwrap();
///
/// let tagger = Tagger::new(&model).unwrap();
/// assert_eq!(vec!["DT", "NN"], tagger.tag(&["the", "dog"]).unwrap());
/// ```
pub struct Tagger {
    alphabet: TagAlphabet,
    floor: f64,

    // ln P(cur | prev), indexed by prev * n_tags + cur.
    log_trans: Vec<f64>,
    // ln P(tag | START_TAG)
    log_start: Vec<f64>,
    // ln P(word | tag) for every tag, for each word seen in training.
    log_emit: HashMap<String, Vec<f64>>,
    // Emission row used for words never seen in training.
    log_unknown: Vec<f64>,
}

impl Tagger {
    /// Creates a new tagger using [`DEFAULT_FLOOR`].
    ///
    /// # Arguments
    ///
    /// * `model` - A model data.
    ///
    /// # Returns
    ///
    /// A new tagger.
    ///
    /// # Errors
    ///
    /// If the tag alphabet is empty or does not cover the tags used in the tables,
    /// [`PosTagError::UnknownTagAlphabet`] will be returned.
    pub fn new(model: &Model) -> Result<Self> {
        Self::with_floor(model, DEFAULT_FLOOR)
    }

    /// Creates a new tagger with a custom floor probability.
    ///
    /// # Arguments
    ///
    /// * `model` - A model data.
    /// * `floor` - Probability used for unobserved transitions and emissions, in `(0, 1]`.
    ///
    /// # Returns
    ///
    /// A new tagger.
    ///
    /// # Errors
    ///
    /// This function will return an error variant when:
    ///
    /// * `floor` is not in `(0, 1]`.
    /// * The tag alphabet is empty or contains [`START_TAG`].
    /// * The transition or emission table refers to a tag missing from the alphabet.
    pub fn with_floor(model: &Model, floor: f64) -> Result<Self> {
        if !(floor > 0.0 && floor <= 1.0) {
            return Err(PosTagError::invalid_argument(
                "floor",
                format!("must be in (0, 1], got {floor}"),
            ));
        }
        let alphabet = model.alphabet();
        Self::check_alphabet(model)?;

        let n_tags = alphabet.len();
        let transitions = model.transitions();
        let emissions = model.emissions();

        let mut log_trans = Vec::with_capacity(n_tags * n_tags);
        for prev in alphabet.iter() {
            for cur in alphabet.iter() {
                log_trans.push(transitions.probability_or(prev, cur, floor).ln());
            }
        }
        let log_start: Vec<f64> = alphabet
            .iter()
            .map(|tag| transitions.probability_or(START_TAG, tag, floor).ln())
            .collect();
        let mut log_emit: HashMap<String, Vec<f64>> = HashMap::new();
        for (word, _, _) in emissions.iter() {
            if log_emit.contains_key(word) {
                continue;
            }
            let row: Vec<f64> = alphabet
                .iter()
                .map(|tag| emissions.probability_or(word, tag, floor).ln())
                .collect();
            log_emit.insert(word.to_string(), row);
        }
        log::debug!(
            "tagger: {} tags, {} known words, floor {}",
            n_tags,
            log_emit.len(),
            floor
        );

        Ok(Self {
            alphabet: alphabet.clone(),
            floor,
            log_trans,
            log_start,
            log_emit,
            log_unknown: vec![floor.ln(); n_tags],
        })
    }

    fn check_alphabet(model: &Model) -> Result<()> {
        let alphabet = model.alphabet();
        if alphabet.is_empty() {
            return Err(PosTagError::unknown_tag_alphabet("tag alphabet is empty"));
        }
        if alphabet.contains(START_TAG) {
            return Err(PosTagError::unknown_tag_alphabet(format!(
                "tag alphabet contains the start marker {START_TAG:?}"
            )));
        }
        for (prev, cur, _) in model.transitions().iter() {
            for tag in [prev, cur] {
                if tag != START_TAG && !alphabet.contains(tag) {
                    return Err(PosTagError::unknown_tag_alphabet(format!(
                        "transition table refers to tag {tag:?} missing from the alphabet"
                    )));
                }
            }
        }
        for tag in model.emissions().tags() {
            if !alphabet.contains(tag) {
                return Err(PosTagError::unknown_tag_alphabet(format!(
                    "emission table refers to tag {tag:?} missing from the alphabet"
                )));
            }
        }
        Ok(())
    }

    fn emission_row(&self, word: &str) -> &[f64] {
        self.log_emit
            .get(word)
            .map_or(self.log_unknown.as_slice(), Vec::as_slice)
    }

    fn best_path<W>(&self, words: &[W]) -> Result<(Vec<usize>, f64)>
    where
        W: AsRef<str>,
    {
        let first = words.first().ok_or(PosTagError::EmptyInputSequence)?;
        let mut lattice = Lattice::new(words.len(), self.alphabet.len());
        lattice.init(&self.log_start, self.emission_row(first.as_ref()));
        for (i, word) in words.iter().enumerate().skip(1) {
            lattice.extend(i, &self.log_trans, self.emission_row(word.as_ref()));
        }
        Ok(lattice.best_path())
    }

    fn tag_names(&self, path: Vec<usize>) -> Vec<&str> {
        let tags = self.alphabet.as_slice();
        path.into_iter().map(|id| tags[id].as_str()).collect()
    }

    /// Finds the most probable tag sequence.
    ///
    /// # Arguments
    ///
    /// * `words` - A sentence.
    ///
    /// # Returns
    ///
    /// One tag per word.
    ///
    /// # Errors
    ///
    /// If `words` is empty, [`PosTagError::EmptyInputSequence`] will be returned.
    pub fn tag<W>(&self, words: &[W]) -> Result<Vec<&str>>
    where
        W: AsRef<str>,
    {
        self.tag_with_score(words).map(|(tags, _)| tags)
    }

    /// Finds the most probable tag sequence. This function also returns the natural logarithm
    /// of the joint probability of the words and the tags.
    ///
    /// # Arguments
    ///
    /// * `words` - A sentence.
    ///
    /// # Returns
    ///
    /// One tag per word and the log-probability of the path.
    ///
    /// # Errors
    ///
    /// If `words` is empty, [`PosTagError::EmptyInputSequence`] will be returned.
    pub fn tag_with_score<W>(&self, words: &[W]) -> Result<(Vec<&str>, f64)>
    where
        W: AsRef<str>,
    {
        let (path, score) = self.best_path(words)?;
        Ok((self.tag_names(path), score))
    }

    /// Gets the tag alphabet.
    pub fn alphabet(&self) -> &TagAlphabet {
        &self.alphabet
    }

    /// Gets the floor probability.
    pub fn floor(&self) -> f64 {
        self.floor
    }

    /// Creates a multithreading tagger. This function is the alias of
    /// [`MultithreadTagger::new()`].
    ///
    /// # Arguments
    ///
    /// * `n_threads` - The number of threads.
    ///
    /// # Returns
    ///
    /// A multithread tagger.
    #[cfg(feature = "multithreading")]
    #[cfg_attr(docsrs, doc(cfg(feature = "multithreading")))]
    pub fn multithreading(self, n_threads: usize) -> MultithreadTagger {
        MultithreadTagger::new(self, n_threads)
    }
}

/// Tagger for multithreading.
///
/// Sentences of a batch are distributed over worker threads. Each worker decodes whole
/// sentences with its own lattice; the shared tables are read-only.
#[cfg(feature = "multithreading")]
#[cfg_attr(docsrs, doc(cfg(feature = "multithreading")))]
pub struct MultithreadTagger {
    tagger: Arc<Tagger>,
    task_tx: Sender<(usize, Vec<String>)>,
    result_rx: Receiver<(usize, Result<Vec<usize>>)>,
}

#[cfg(feature = "multithreading")]
impl MultithreadTagger {
    /// Creates a multithreading tagger.
    ///
    /// # Arguments
    ///
    /// * `tagger` - A normal tagger.
    /// * `n_threads` - The number of threads. At least one thread is spawned.
    ///
    /// # Returns
    ///
    /// A multithread tagger.
    pub fn new(tagger: Tagger, n_threads: usize) -> Self {
        let tagger = Arc::new(tagger);

        let (result_tx, result_rx) = crossbeam_channel::unbounded();
        let (task_tx, task_rx) = crossbeam_channel::unbounded::<(usize, Vec<String>)>();
        for _ in 0..n_threads.max(1) {
            let tagger = Arc::clone(&tagger);
            let result_tx = result_tx.clone();
            let task_rx = task_rx.clone();
            thread::spawn(move || {
                for (idx, words) in task_rx {
                    let result = tagger.best_path(&words).map(|(path, _)| path);
                    if result_tx.send((idx, result)).is_err() {
                        break;
                    }
                }
            });
        }

        Self {
            tagger,
            task_tx,
            result_rx,
        }
    }

    fn worker_gone() -> PosTagError {
        PosTagError::IOError(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "tagging worker stopped",
        ))
    }

    /// Tags a batch of sentences.
    ///
    /// # Arguments
    ///
    /// * `sentences` - Sentences to tag.
    ///
    /// # Returns
    ///
    /// One tag sequence per sentence, in input order.
    ///
    /// # Errors
    ///
    /// If a sentence is empty, [`PosTagError::EmptyInputSequence`] will be returned.
    pub fn tag_batch(&mut self, sentences: Vec<Vec<String>>) -> Result<Vec<Vec<&str>>> {
        let n_sentences = sentences.len();
        for (idx, words) in sentences.into_iter().enumerate() {
            self.task_tx
                .send((idx, words))
                .map_err(|_| Self::worker_gone())?;
        }
        let mut paths: Vec<Option<Result<Vec<usize>>>> =
            (0..n_sentences).map(|_| None).collect();
        for _ in 0..n_sentences {
            let (idx, result) = self.result_rx.recv().map_err(|_| Self::worker_gone())?;
            paths[idx] = Some(result);
        }
        let mut results = Vec::with_capacity(n_sentences);
        for path in paths {
            let path = path.ok_or_else(Self::worker_gone)??;
            results.push(self.tagger.tag_names(path));
        }
        Ok(results)
    }

    /// Gets the underlying tagger.
    pub fn tagger(&self) -> &Tagger {
        &self.tagger
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::estimator::Trainer;
    use crate::model::{EmissionTable, StartPolicy, TransitionTable};
    use crate::sentence::TaggedSentence;

    fn train(data: &[&str], policy: StartPolicy) -> Model {
        let mut trainer = Trainer::new().start_policy(policy);
        for s in data {
            trainer.push_sentence(TaggedSentence::from_tagged(s).unwrap());
        }
        trainer.train().unwrap()
    }

    fn dog_cat_model(policy: StartPolicy) -> Model {
        train(&["the/DT dog/NN", "the/DT cat/NN"], policy)
    }

    fn toy_model() -> Model {
        train(
            &[
                "the/DT dog/NN barks/VBZ ./.",
                "a/DT cat/NN sleeps/VBZ ./.",
                "dogs/NNS bark/VBP ./.",
                "the/DT dog/NN sleeps/VBZ",
                "time/NN flies/VBZ like/IN an/DT arrow/NN ./.",
                "I/PRP like/VBP dogs/NNS ./.",
                "dogs/NNS like/VBP cats/NNS ./.",
            ],
            StartPolicy::Learned,
        )
    }

    #[test]
    fn test_tag_dog_cat() {
        for policy in [StartPolicy::Learned, StartPolicy::Floor] {
            let tagger = Tagger::new(&dog_cat_model(policy)).unwrap();

            assert_eq!(vec!["DT", "NN"], tagger.tag(&["the", "dog"]).unwrap());
            assert_eq!(vec!["DT", "NN"], tagger.tag(&["the", "cat"]).unwrap());
        }
    }

    #[test]
    fn test_tag_single_word() {
        for policy in [StartPolicy::Learned, StartPolicy::Floor] {
            let model = dog_cat_model(policy);
            let tagger = Tagger::new(&model).unwrap();

            // The tag maximizing P(tag | <s>) * P(the | tag).
            let expected = model
                .alphabet()
                .iter()
                .map(|tag| {
                    let p = model.transitions().probability_or(START_TAG, tag, DEFAULT_FLOOR)
                        * model.emissions().probability_or("the", tag, DEFAULT_FLOOR);
                    (tag, p)
                })
                .fold(("", 0.0), |best, x| if x.1 > best.1 { x } else { best })
                .0;
            assert_eq!("DT", expected);
            assert_eq!(vec![expected], tagger.tag(&["the"]).unwrap());
        }
    }

    #[test]
    fn test_tag_empty() {
        let tagger = Tagger::new(&dog_cat_model(StartPolicy::Learned)).unwrap();
        let result = tagger.tag::<&str>(&[]);

        assert!(matches!(result, Err(PosTagError::EmptyInputSequence)));
    }

    #[test]
    fn test_tag_unknown_word() {
        let tagger = Tagger::new(&toy_model()).unwrap();
        let tags = tagger.tag(&["the", "platypus", "sleeps", "."]).unwrap();

        assert_eq!(vec!["DT", "NN", "VBZ", "."], tags);
    }

    #[test]
    fn test_tag_all_unknown_words() {
        let tagger = Tagger::new(&toy_model()).unwrap();
        let words = ["zzz", "yyy", "xxx"];
        let tags = tagger.tag(&words).unwrap();

        assert_eq!(3, tags.len());
        for tag in &tags {
            assert!(tagger.alphabet().contains(tag));
        }
        // Deterministic across calls.
        assert_eq!(tags, tagger.tag(&words).unwrap());
    }

    #[test]
    fn test_tag_output_shape() {
        let tagger = Tagger::new(&toy_model()).unwrap();
        let words: Vec<String> = "the dog likes a cat and time flies like an arrow ."
            .split(' ')
            .map(String::from)
            .collect();
        for n in 1..=words.len() {
            let tags = tagger.tag(&words[..n]).unwrap();
            assert_eq!(n, tags.len());
            assert!(tags.iter().all(|t| tagger.alphabet().contains(t)));
        }
    }

    #[test]
    fn test_tag_ambiguous_word() {
        let tagger = Tagger::new(&toy_model()).unwrap();

        assert_eq!(
            vec!["NNS", "VBP", "NNS", "."],
            tagger.tag(&["dogs", "like", "cats", "."]).unwrap()
        );
        assert_eq!(
            vec!["NN", "VBZ", "IN", "DT", "NN", "."],
            tagger
                .tag(&["time", "flies", "like", "an", "arrow", "."])
                .unwrap()
        );
    }

    #[test]
    fn test_tag_long_sentence_no_underflow() {
        let tagger = Tagger::new(&toy_model()).unwrap();
        let mut words = vec![];
        for _ in 0..500 {
            words.extend(["the", "dog", "barks", "."]);
        }
        let (tags, score) = tagger.tag_with_score(&words).unwrap();

        assert_eq!(2000, tags.len());
        assert!(score.is_finite());
        assert_eq!(vec!["DT", "NN", "VBZ", "."], &tags[..4]);
        assert_eq!(vec!["DT", "NN", "VBZ", "."], &tags[1996..]);
    }

    #[test]
    fn test_tag_with_score() {
        let tagger = Tagger::new(&dog_cat_model(StartPolicy::Learned)).unwrap();
        let (tags, score) = tagger.tag_with_score(&["the", "dog"]).unwrap();

        assert_eq!(vec!["DT", "NN"], tags);
        // P(DT | <s>) * P(the | DT) * P(NN | DT) * P(dog | NN) = 1 * 1 * 1 * 0.5
        assert!((score - 0.5f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_tie_break_lexicographic() {
        // Both tags emit the word with the same probability and nothing else distinguishes
        // them, so the lexicographically smaller tag wins.
        let model = train(&["w/B", "w/A"], StartPolicy::Learned);
        let tagger = Tagger::new(&model).unwrap();

        assert_eq!(vec!["A"], tagger.tag(&["w"]).unwrap());
        assert_eq!(vec!["A", "A", "A"], tagger.tag(&["w", "w", "w"]).unwrap());
        assert_eq!(vec!["A", "A"], tagger.tag(&["unk", "unk"]).unwrap());
    }

    #[test]
    fn test_all_scores_negative_infinity() {
        let mut lattice = Lattice::new(3, 2);
        let neg = [f64::NEG_INFINITY; 2];
        let trans = [f64::NEG_INFINITY; 4];
        lattice.init(&neg, &neg);
        lattice.extend(1, &trans, &neg);
        lattice.extend(2, &trans, &neg);
        let (path, score) = lattice.best_path();

        assert_eq!(vec![0, 0, 0], path);
        assert_eq!(f64::NEG_INFINITY, score);
    }

    #[test]
    fn test_custom_floor() {
        let model = toy_model();
        let tagger = Tagger::with_floor(&model, 1e-3).unwrap();

        assert_eq!(1e-3, tagger.floor());
        assert_eq!(
            vec!["DT", "NN", "VBZ"],
            tagger.tag(&["the", "dog", "sleeps"]).unwrap()
        );
    }

    #[test]
    fn test_invalid_floor() {
        let model = toy_model();
        for floor in [0.0, -1.0, 1.5, f64::NAN, f64::INFINITY] {
            let result = Tagger::with_floor(&model, floor);
            assert!(
                matches!(result, Err(PosTagError::InvalidArgument(_))),
                "{floor}"
            );
        }
    }

    #[test]
    fn test_empty_alphabet() {
        let model = Model::new(
            TagAlphabet::default(),
            TransitionTable::default(),
            EmissionTable::default(),
            StartPolicy::Learned,
        );
        let result = Tagger::new(&model);

        assert!(matches!(result, Err(PosTagError::UnknownTagAlphabet(_))));
        assert_eq!(
            "UnknownTagAlphabet: tag alphabet is empty",
            result.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_mismatched_alphabet() {
        let trained = toy_model();
        let model = Model::new(
            TagAlphabet::new(["DT", "NN"]),
            trained.transitions().clone(),
            trained.emissions().clone(),
            StartPolicy::Learned,
        );
        let result = Tagger::new(&model);

        assert!(matches!(result, Err(PosTagError::UnknownTagAlphabet(_))));
    }

    #[cfg(feature = "multithreading")]
    #[test]
    fn test_multithread_tagger() {
        let tagger = Tagger::new(&toy_model()).unwrap();
        let sentences: Vec<Vec<String>> = [
            "the dog barks .",
            "dogs like cats .",
            "time flies like an arrow .",
            "a platypus sleeps",
            "I like dogs .",
        ]
        .iter()
        .map(|s| s.split(' ').map(String::from).collect())
        .collect();
        let expected: Vec<Vec<String>> = sentences
            .iter()
            .map(|s| {
                tagger
                    .tag(s)
                    .unwrap()
                    .into_iter()
                    .map(String::from)
                    .collect()
            })
            .collect();

        let mut mt = tagger.multithreading(3);
        let results = mt.tag_batch(sentences).unwrap();

        assert_eq!(expected, results);
    }

    #[cfg(feature = "multithreading")]
    #[test]
    fn test_multithread_tagger_empty_sentence() {
        let tagger = Tagger::new(&toy_model()).unwrap();
        let mut mt = tagger.multithreading(2);
        let result = mt.tag_batch(vec![vec!["the".to_string()], vec![]]);

        assert!(matches!(result, Err(PosTagError::EmptyInputSequence)));
    }
}
