use crate::errors::{PosTagError, Result};
use crate::utils::is_valid_token;

/// Sentence with part-of-speech annotations.
///
/// A sentence is a non-empty sequence of `(word, tag)` pairs. Words and tags are non-empty and
/// never contain whitespace, so that they survive a round trip through the corpus format.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TaggedSentence {
    pub(crate) words: Vec<String>,
    pub(crate) tags: Vec<String>,
}

impl TaggedSentence {
    /// Creates a new [`TaggedSentence`] from `(word, tag)` pairs.
    ///
    /// # Arguments
    ///
    /// * `pairs` - Pairs of a word and its tag.
    ///
    /// # Returns
    ///
    /// A new [`TaggedSentence`].
    ///
    /// # Errors
    ///
    /// This function will return an error variant when:
    ///
    /// * `pairs` is empty.
    /// * A word or a tag is empty or contains whitespace.
    ///
    /// # Examples
    ///
    /// ```
    /// use postag::TaggedSentence;
    ///
    /// let s = TaggedSentence::new([("the", "DT"), ("dog", "NN")]);
    /// assert!(s.is_ok());
    ///
    /// let s = TaggedSentence::new([("hot dog", "NN")]);
    /// assert!(s.is_err());
    /// ```
    pub fn new<I, W, T>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (W, T)>,
        W: Into<String>,
        T: Into<String>,
    {
        let mut words = vec![];
        let mut tags = vec![];
        for (word, tag) in pairs {
            let word = word.into();
            let tag = tag.into();
            if !is_valid_token(&word) {
                return Err(PosTagError::invalid_argument(
                    "pairs",
                    format!("invalid word: {word:?}"),
                ));
            }
            if !is_valid_token(&tag) {
                return Err(PosTagError::invalid_argument(
                    "pairs",
                    format!("invalid tag: {tag:?}"),
                ));
            }
            words.push(word);
            tags.push(tag);
        }
        if words.is_empty() {
            return Err(PosTagError::invalid_argument("pairs", "sentence is empty"));
        }
        Ok(Self { words, tags })
    }

    /// Creates a new [`TaggedSentence`] from a string of space-separated `word/tag` tokens.
    ///
    /// The tag is the part after the last slash, so words may contain slashes.
    ///
    /// # Errors
    ///
    /// If `tagged_text` is empty or a token has no slash, an error variant will be returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use postag::TaggedSentence;
    ///
    /// let s = TaggedSentence::from_tagged("1/2/CD cup/NN").unwrap();
    /// assert_eq!(&["1/2", "cup"], s.words());
    /// assert_eq!(&["CD", "NN"], s.tags());
    /// ```
    pub fn from_tagged<S>(tagged_text: S) -> Result<Self>
    where
        S: AsRef<str>,
    {
        let mut pairs = vec![];
        for token in tagged_text.as_ref().split_whitespace() {
            let (word, tag) = token.rsplit_once('/').ok_or_else(|| {
                PosTagError::invalid_argument(
                    "tagged_text",
                    format!("token without a tag: {token:?}"),
                )
            })?;
            pairs.push((word, tag));
        }
        Self::new(pairs)
    }

    /// Generates a string of space-separated `word/tag` tokens.
    ///
    /// # Examples
    ///
    /// ```
    /// use postag::TaggedSentence;
    ///
    /// let s = TaggedSentence::new([("the", "DT"), ("dog", "NN")]).unwrap();
    /// assert_eq!("the/DT dog/NN", s.to_tagged_string());
    /// ```
    pub fn to_tagged_string(&self) -> String {
        let mut result = String::new();
        for (i, (word, tag)) in self.iter().enumerate() {
            if i != 0 {
                result.push(' ');
            }
            result.push_str(word);
            result.push('/');
            result.push_str(tag);
        }
        result
    }

    /// Gets the words of the sentence.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Gets the tags of the sentence.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Returns an iterator over `(word, tag)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.words
            .iter()
            .map(String::as_str)
            .zip(self.tags.iter().map(String::as_str))
    }

    /// Number of words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Always `false`; a sentence holds at least one word.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentence_new_empty() {
        let s = TaggedSentence::new(Vec::<(&str, &str)>::new());

        assert!(s.is_err());
        assert_eq!(
            "InvalidArgumentError: pairs: sentence is empty",
            &s.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_sentence_new_empty_tag() {
        let s = TaggedSentence::new([("the", "")]);

        assert!(s.is_err());
        assert_eq!(
            "InvalidArgumentError: pairs: invalid tag: \"\"",
            &s.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_sentence_new() {
        let s = TaggedSentence::new([("The", "DT"), ("cat", "NN"), ("sat", "VBD")]).unwrap();

        let expected = TaggedSentence {
            words: vec!["The".to_string(), "cat".to_string(), "sat".to_string()],
            tags: vec!["DT".to_string(), "NN".to_string(), "VBD".to_string()],
        };
        assert_eq!(expected, s);
        assert_eq!(3, s.len());
    }

    #[test]
    fn test_sentence_from_tagged_missing_slash() {
        let s = TaggedSentence::from_tagged("the/DT dog");

        assert!(s.is_err());
        assert_eq!(
            "InvalidArgumentError: tagged_text: token without a tag: \"dog\"",
            &s.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_sentence_from_tagged_empty_tag() {
        let s = TaggedSentence::from_tagged("the/DT dog/");

        assert!(s.is_err());
    }

    #[test]
    fn test_sentence_to_tagged_string() {
        let s = TaggedSentence::from_tagged("Rust/NNP is/VBZ fun/JJ ./.").unwrap();

        assert_eq!("Rust/NNP is/VBZ fun/JJ ./.", s.to_tagged_string());
    }

    #[test]
    fn test_sentence_iter() {
        let s = TaggedSentence::from_tagged("the/DT dog/NN").unwrap();

        assert_eq!(vec![("the", "DT"), ("dog", "NN")], s.iter().collect::<Vec<_>>());
    }
}
