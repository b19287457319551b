use std::collections::BTreeMap;
use std::fmt;

use crate::errors::{PosTagError, Result};

/// Counts of one tag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TagCounts {
    /// Number of correct predictions.
    pub n_correct: usize,

    /// Number of occurrences in the reference.
    pub n_reference: usize,

    /// Number of predictions.
    pub n_predicted: usize,
}

impl TagCounts {
    /// `n_correct / n_predicted`, or 0 if the tag was never predicted.
    pub fn precision(&self) -> f64 {
        ratio(self.n_correct, self.n_predicted)
    }

    /// `n_correct / n_reference`, or 0 if the tag never occurs in the reference.
    pub fn recall(&self) -> f64 {
        ratio(self.n_correct, self.n_reference)
    }

    /// Harmonic mean of precision and recall.
    pub fn f1(&self) -> f64 {
        let precision = self.precision();
        let recall = self.recall();
        if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Accuracy of predicted tag sequences against reference sequences.
///
/// # Examples
///
/// ```
/// use postag::Evaluation;
///
/// let mut eval = Evaluation::new();
/// eval.accumulate(&["DT", "NN"], &["DT", "NN"]).unwrap();
/// eval.accumulate(&["DT", "NN"], &["DT", "VB"]).unwrap();
///
/// assert_eq!(0.75, eval.item_accuracy());
/// assert_eq!(0.5, eval.sentence_accuracy());
/// assert_eq!(0.5, eval.tag("NN").unwrap().recall());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Evaluation {
    tags: BTreeMap<String, TagCounts>,
    n_items: usize,
    n_correct_items: usize,
    n_sentences: usize,
    n_correct_sentences: usize,
}

impl Evaluation {
    /// Creates an empty evaluation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one sentence.
    ///
    /// # Errors
    ///
    /// If `reference` and `prediction` differ in length, an error variant will be returned.
    pub fn accumulate<R, P>(&mut self, reference: &[R], prediction: &[P]) -> Result<()>
    where
        R: AsRef<str>,
        P: AsRef<str>,
    {
        if reference.len() != prediction.len() {
            return Err(PosTagError::invalid_argument(
                "prediction",
                format!(
                    "{} reference tags but {} predicted tags",
                    reference.len(),
                    prediction.len()
                ),
            ));
        }
        let mut n_correct = 0;
        for (r, p) in reference.iter().zip(prediction) {
            let (r, p) = (r.as_ref(), p.as_ref());
            self.tags.entry(r.to_string()).or_default().n_reference += 1;
            self.tags.entry(p.to_string()).or_default().n_predicted += 1;
            if r == p {
                self.tags.entry(r.to_string()).or_default().n_correct += 1;
                n_correct += 1;
            }
        }
        self.n_items += reference.len();
        self.n_correct_items += n_correct;
        self.n_sentences += 1;
        if n_correct == reference.len() {
            self.n_correct_sentences += 1;
        }
        Ok(())
    }

    /// Ratio of correctly tagged words, or 0 if nothing was accumulated.
    pub fn item_accuracy(&self) -> f64 {
        ratio(self.n_correct_items, self.n_items)
    }

    /// Ratio of sentences whose tags are all correct, or 0 if nothing was accumulated.
    pub fn sentence_accuracy(&self) -> f64 {
        ratio(self.n_correct_sentences, self.n_sentences)
    }

    /// Gets the counts of a tag that appeared in a reference or a prediction.
    pub fn tag(&self, tag: &str) -> Option<&TagCounts> {
        self.tags.get(tag)
    }

    /// Returns an iterator over tags and their counts, in lexicographic order.
    pub fn tags(&self) -> impl Iterator<Item = (&str, &TagCounts)> {
        self.tags.iter().map(|(tag, counts)| (tag.as_str(), counts))
    }

    /// Macro-averaged F1 over tags occurring in the reference.
    pub fn macro_f1(&self) -> f64 {
        let observed: Vec<_> = self.tags.values().filter(|c| c.n_reference != 0).collect();
        if observed.is_empty() {
            return 0.0;
        }
        observed.iter().map(|c| c.f1()).sum::<f64>() / observed.len() as f64
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "Performance by tag (#match, #model, #ref) (precision, recall, F1):"
        )?;
        for (tag, c) in &self.tags {
            if c.n_reference == 0 {
                writeln!(
                    f,
                    "\t{}: ({}, {}, {}) (******, ******, ******)",
                    tag, c.n_correct, c.n_predicted, c.n_reference
                )?;
            } else {
                writeln!(
                    f,
                    "\t{}: ({}, {}, {}) ({:.4}, {:.4}, {:.4})",
                    tag,
                    c.n_correct,
                    c.n_predicted,
                    c.n_reference,
                    c.precision(),
                    c.recall(),
                    c.f1()
                )?;
            }
        }
        writeln!(f, "Macro-average F1: {:.4}", self.macro_f1())?;
        writeln!(
            f,
            "Item accuracy: {}/{} => {:.4}",
            self.n_correct_items,
            self.n_items,
            self.item_accuracy()
        )?;
        write!(
            f,
            "Sentence accuracy: {}/{} => {:.4}",
            self.n_correct_sentences,
            self.n_sentences,
            self.sentence_accuracy()
        )
    }
}
