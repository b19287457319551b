use std::collections::BTreeSet;
use std::io::{Read, Write};

use bincode::{Decode, Encode};
use hashbrown::HashMap;

use crate::errors::{PosTagError, Result};
use crate::utils::SerializableHashMap;

/// Synthetic tag standing for the position before the first word of a sentence.
pub const START_TAG: &str = "<s>";

type NestedTable = SerializableHashMap<String, SerializableHashMap<String, f64>>;

/// Set of tags observed in training data.
///
/// Tags are kept in lexicographic order. The tagger visits tags in this order, so it also decides
/// which tag wins when scores are tied.
#[derive(Clone, Debug, Default, PartialEq, Eq, Decode, Encode)]
pub struct TagAlphabet {
    tags: Vec<String>,
}

impl TagAlphabet {
    /// Creates a new alphabet. Duplicates are removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use postag::TagAlphabet;
    ///
    /// let alphabet = TagAlphabet::new(["NN", "DT", "NN"]);
    /// assert_eq!(vec!["DT", "NN"], alphabet.iter().collect::<Vec<_>>());
    /// ```
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: BTreeSet<String> = tags.into_iter().map(Into::into).collect();
        Self {
            tags: tags.into_iter().collect(),
        }
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns `true` if the alphabet holds no tag.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Gets the index of a tag.
    pub fn id(&self, tag: &str) -> Option<usize> {
        self.tags.binary_search_by(|t| t.as_str().cmp(tag)).ok()
    }

    /// Gets the tag at an index.
    pub fn get(&self, id: usize) -> Option<&str> {
        self.tags.get(id).map(String::as_str)
    }

    /// Returns `true` if the alphabet holds `tag`.
    pub fn contains(&self, tag: &str) -> bool {
        self.id(tag).is_some()
    }

    /// Returns an iterator over tags in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub(crate) fn as_slice(&self) -> &[String] {
        &self.tags
    }

    fn is_sorted_and_unique(&self) -> bool {
        self.tags.windows(2).all(|w| w[0] < w[1])
    }
}

/// Maximum-likelihood tag bigram probabilities, `P(current | previous)`.
///
/// Pairs never observed are absent. For each previous tag the probabilities of its observed
/// successors sum to one.
#[derive(Clone, Debug, Default, PartialEq, Decode, Encode)]
pub struct TransitionTable {
    // previous -> current -> probability
    probs: NestedTable,
}

impl TransitionTable {
    pub(crate) fn from_counts(
        pair_counts: HashMap<(&str, &str), usize>,
        prev_counts: &HashMap<&str, usize>,
    ) -> Self {
        let mut probs = NestedTable::default();
        for ((prev, cur), count) in pair_counts {
            let total = prev_counts[prev];
            probs
                .entry(prev.to_string())
                .or_insert_with(SerializableHashMap::default)
                .insert(cur.to_string(), count as f64 / total as f64);
        }
        Self { probs }
    }

    /// Gets `P(cur | prev)` if the pair was observed.
    pub fn get(&self, prev: &str, cur: &str) -> Option<f64> {
        self.probs.get(prev).and_then(|row| row.get(cur)).copied()
    }

    /// Gets `P(cur | prev)`, or `floor` if the pair was never observed.
    ///
    /// # Examples
    ///
    /// ```
    /// use postag::{estimator, TaggedSentence};
    ///
    /// let sents = vec![TaggedSentence::from_tagged("the/DT dog/NN").unwrap()];
    /// let table = estimator::estimate_transitions(&sents).unwrap();
    /// assert_eq!(1.0, table.probability_or("DT", "NN", 1e-6));
    /// assert_eq!(1e-6, table.probability_or("NN", "DT", 1e-6));
    /// ```
    pub fn probability_or(&self, prev: &str, cur: &str, floor: f64) -> f64 {
        self.get(prev, cur).unwrap_or(floor)
    }

    /// Returns an iterator over the observed successors of `prev` and their probabilities.
    pub fn successors<'a>(&'a self, prev: &str) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        self.probs
            .get(prev)
            .into_iter()
            .flat_map(|row| row.iter().map(|(cur, &p)| (cur.as_str(), p)))
    }

    /// Returns an iterator over all tags that were observed as a predecessor.
    pub fn predecessors(&self) -> impl Iterator<Item = &str> {
        self.probs.keys().map(String::as_str)
    }

    /// Returns an iterator over `(previous, current, probability)`, in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, f64)> {
        self.probs.iter().flat_map(|(prev, row)| {
            row.iter()
                .map(move |(cur, &p)| (prev.as_str(), cur.as_str(), p))
        })
    }

    /// Number of observed pairs.
    pub fn len(&self) -> usize {
        self.probs.values().map(|row| row.len()).sum()
    }

    /// Returns `true` if no pair was observed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Maximum-likelihood emission probabilities, `P(word | tag)`.
///
/// Pairs never observed are absent. For each tag the probabilities of its observed words sum to
/// one.
#[derive(Clone, Debug, Default, PartialEq, Decode, Encode)]
pub struct EmissionTable {
    // tag -> word -> probability
    probs: NestedTable,
}

impl EmissionTable {
    pub(crate) fn from_counts(
        pair_counts: HashMap<(&str, &str), usize>,
        tag_counts: &HashMap<&str, usize>,
    ) -> Self {
        let mut probs = NestedTable::default();
        for ((word, tag), count) in pair_counts {
            let total = tag_counts[tag];
            probs
                .entry(tag.to_string())
                .or_insert_with(SerializableHashMap::default)
                .insert(word.to_string(), count as f64 / total as f64);
        }
        Self { probs }
    }

    /// Gets `P(word | tag)` if the pair was observed.
    pub fn get(&self, word: &str, tag: &str) -> Option<f64> {
        self.probs.get(tag).and_then(|row| row.get(word)).copied()
    }

    /// Gets `P(word | tag)`, or `floor` if the pair was never observed.
    pub fn probability_or(&self, word: &str, tag: &str, floor: f64) -> f64 {
        self.get(word, tag).unwrap_or(floor)
    }

    /// Returns an iterator over the observed words of `tag` and their probabilities.
    pub fn words_of<'a>(&'a self, tag: &str) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        self.probs
            .get(tag)
            .into_iter()
            .flat_map(|row| row.iter().map(|(word, &p)| (word.as_str(), p)))
    }

    /// Returns an iterator over all tags having at least one word.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.probs.keys().map(String::as_str)
    }

    /// Returns an iterator over `(word, tag, probability)`, in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, f64)> {
        self.probs.iter().flat_map(|(tag, row)| {
            row.iter()
                .map(move |(word, &p)| (word.as_str(), tag.as_str(), p))
        })
    }

    /// Number of observed pairs.
    pub fn len(&self) -> usize {
        self.probs.values().map(|row| row.len()).sum()
    }

    /// Returns `true` if no pair was observed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// How the probability of the first tag of a sentence is obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Decode, Encode)]
pub enum StartPolicy {
    /// Transitions from [`START_TAG`] are counted during estimation.
    Learned,

    /// Transitions from [`START_TAG`] are never counted, so the first tag always receives the
    /// floor probability and is chosen by its emission probability alone.
    Floor,
}

impl Default for StartPolicy {
    fn default() -> Self {
        Self::Learned
    }
}

/// Model data: a tag alphabet with the transition and emission tables from one estimation pass.
#[derive(Clone, Debug, PartialEq, Decode, Encode)]
pub struct Model {
    pub(crate) alphabet: TagAlphabet,
    pub(crate) transitions: TransitionTable,
    pub(crate) emissions: EmissionTable,
    pub(crate) start_policy: StartPolicy,
}

impl Model {
    /// Creates a model from separately estimated parts.
    ///
    /// The caller is responsible for passing parts produced from the same sentences;
    /// [`Tagger::new()`](crate::Tagger::new) only checks that they are not obviously
    /// inconsistent.
    pub fn new(
        alphabet: TagAlphabet,
        transitions: TransitionTable,
        emissions: EmissionTable,
        start_policy: StartPolicy,
    ) -> Self {
        Self {
            alphabet,
            transitions,
            emissions,
            start_policy,
        }
    }

    /// Gets the tag alphabet.
    pub fn alphabet(&self) -> &TagAlphabet {
        &self.alphabet
    }

    /// Gets the transition table.
    pub fn transitions(&self) -> &TransitionTable {
        &self.transitions
    }

    /// Gets the emission table.
    pub fn emissions(&self) -> &EmissionTable {
        &self.emissions
    }

    /// Gets the start policy used when the transitions were estimated.
    pub fn start_policy(&self) -> StartPolicy {
        self.start_policy
    }

    /// Exports the model data.
    ///
    /// # Arguments
    ///
    /// * `wtr` - Byte-oriented sink object.
    ///
    /// # Errors
    ///
    /// When `wtr` generates an error, it will be returned as is.
    pub fn write<W>(&self, wtr: &mut W) -> Result<()>
    where
        W: Write,
    {
        bincode::encode_into_std_write(self, wtr, bincode::config::standard())?;
        Ok(())
    }

    /// Creates a model from a reader.
    ///
    /// # Arguments
    ///
    /// * `rdr` - A data source.
    ///
    /// # Returns
    ///
    /// A model data read from `rdr`.
    ///
    /// # Errors
    ///
    /// When `rdr` generates an error, it will be returned as is. If the decoded data is not a
    /// well-formed model, an error variant will be returned.
    pub fn read<R>(rdr: &mut R) -> Result<Self>
    where
        R: Read,
    {
        let model: Self = bincode::decode_from_std_read(rdr, bincode::config::standard())?;
        if !model.alphabet.is_sorted_and_unique() {
            return Err(PosTagError::invalid_model("tag alphabet is not sorted"));
        }
        let out_of_range = model
            .transitions
            .iter()
            .map(|(_, _, p)| p)
            .chain(model.emissions.iter().map(|(_, _, p)| p))
            .any(|p| !(0.0..=1.0).contains(&p));
        if out_of_range {
            return Err(PosTagError::invalid_model("probability out of range"));
        }
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_tables() -> (TransitionTable, EmissionTable) {
        let mut pair_counts = HashMap::new();
        pair_counts.insert(("DT", "NN"), 2);
        pair_counts.insert(("NN", "VBZ"), 1);
        pair_counts.insert(("NN", "NN"), 1);
        let mut prev_counts = HashMap::new();
        prev_counts.insert("DT", 2);
        prev_counts.insert("NN", 2);
        let transitions = TransitionTable::from_counts(pair_counts, &prev_counts);

        let mut pair_counts = HashMap::new();
        pair_counts.insert(("the", "DT"), 2);
        pair_counts.insert(("dog", "NN"), 3);
        pair_counts.insert(("cat", "NN"), 1);
        let mut tag_counts = HashMap::new();
        tag_counts.insert("DT", 2);
        tag_counts.insert("NN", 4);
        let emissions = EmissionTable::from_counts(pair_counts, &tag_counts);

        (transitions, emissions)
    }

    #[test]
    fn test_tag_alphabet_order() {
        let alphabet = TagAlphabet::new(["VBZ", "NN", "DT", "NN"]);

        assert_eq!(3, alphabet.len());
        assert_eq!(Some(0), alphabet.id("DT"));
        assert_eq!(Some(2), alphabet.id("VBZ"));
        assert_eq!(None, alphabet.id("JJ"));
        assert_eq!(Some("NN"), alphabet.get(1));
        assert!(alphabet.contains("NN"));
    }

    #[test]
    fn test_transition_table() {
        let (transitions, _) = toy_tables();

        assert_eq!(Some(1.0), transitions.get("DT", "NN"));
        assert_eq!(Some(0.5), transitions.get("NN", "VBZ"));
        assert_eq!(None, transitions.get("VBZ", "NN"));
        assert_eq!(0.25, transitions.probability_or("VBZ", "NN", 0.25));
        assert_eq!(3, transitions.len());

        let mut succ: Vec<_> = transitions.successors("NN").collect();
        succ.sort_by(|a, b| a.0.cmp(b.0));
        assert_eq!(vec![("NN", 0.5), ("VBZ", 0.5)], succ);
        assert_eq!(0, transitions.successors("VBZ").count());
    }

    #[test]
    fn test_emission_table() {
        let (_, emissions) = toy_tables();

        assert_eq!(Some(1.0), emissions.get("the", "DT"));
        assert_eq!(Some(0.75), emissions.get("dog", "NN"));
        assert_eq!(Some(0.25), emissions.get("cat", "NN"));
        assert_eq!(None, emissions.get("the", "NN"));
        assert_eq!(1e-6, emissions.probability_or("fish", "NN", 1e-6));
        assert_eq!(3, emissions.len());
    }

    #[test]
    fn test_model_write_read() {
        let (transitions, emissions) = toy_tables();
        let model = Model::new(
            TagAlphabet::new(["DT", "NN", "VBZ"]),
            transitions,
            emissions,
            StartPolicy::Floor,
        );
        let mut buf = vec![];
        model.write(&mut buf).unwrap();
        let restored = Model::read(&mut buf.as_slice()).unwrap();

        assert_eq!(model, restored);
        assert_eq!(StartPolicy::Floor, restored.start_policy());
    }

    #[test]
    fn test_model_read_unsorted_alphabet() {
        let model = Model::new(
            TagAlphabet {
                tags: vec!["NN".to_string(), "DT".to_string()],
            },
            TransitionTable::default(),
            EmissionTable::default(),
            StartPolicy::Learned,
        );
        let mut buf = vec![];
        model.write(&mut buf).unwrap();
        let result = Model::read(&mut buf.as_slice());

        assert!(result.is_err());
        assert_eq!(
            "InvalidModelError: tag alphabet is not sorted",
            result.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_model_read_truncated() {
        let (transitions, emissions) = toy_tables();
        let model = Model::new(
            TagAlphabet::new(["DT", "NN", "VBZ"]),
            transitions,
            emissions,
            StartPolicy::Learned,
        );
        let mut buf = vec![];
        model.write(&mut buf).unwrap();
        buf.truncate(buf.len() / 2);

        assert!(Model::read(&mut buf.as_slice()).is_err());
    }
}
