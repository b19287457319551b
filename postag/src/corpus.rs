//! Line-oriented corpus formats.
//!
//! A tagged corpus holds one `word tag` pair per line, separated by whitespace, and a blank line
//! after each sentence. An untagged corpus holds one word per line with the same sentence
//! separators. [`write_tagged_sentence()`] emits `word<TAB>tag` lines, which the tagged reader
//! accepts again.

use std::io::{self, BufRead, Lines, Read, Write};

use crate::errors::{PosTagError, Result};
use crate::sentence::TaggedSentence;

/// Iterator over the sentences of a tagged corpus.
///
/// # Examples
///
/// ```
/// use postag::corpus::TaggedCorpusReader;
///
/// let data = "The DT\ncat NN\n\nIt PRP\n";
/// let sents: Vec<_> = TaggedCorpusReader::new(data.as_bytes())
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(2, sents.len());
/// assert_eq!("It/PRP", sents[1].to_tagged_string());
/// ```
pub struct TaggedCorpusReader<R> {
    lines: Lines<R>,
    line_no: usize,
}

impl<R> TaggedCorpusReader<R>
where
    R: BufRead,
{
    /// Creates a new reader.
    pub fn new(rdr: R) -> Self {
        Self {
            lines: rdr.lines(),
            line_no: 0,
        }
    }
}

impl<R> Iterator for TaggedCorpusReader<R>
where
    R: BufRead,
{
    type Item = Result<TaggedSentence>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut words = vec![];
        let mut tags = vec![];
        for line in self.lines.by_ref() {
            self.line_no += 1;
            let line = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                if words.is_empty() {
                    continue;
                }
                return Some(Ok(TaggedSentence { words, tags }));
            }
            let mut fields = trimmed.split_whitespace();
            match (fields.next(), fields.next(), fields.next()) {
                (Some(word), Some(tag), None) => {
                    words.push(word.to_string());
                    tags.push(tag.to_string());
                }
                _ => return Some(Err(PosTagError::malformed_line(self.line_no, line.clone()))),
            }
        }
        if words.is_empty() {
            None
        } else {
            Some(Ok(TaggedSentence { words, tags }))
        }
    }
}

/// Iterator over the sentences of an untagged corpus. Each item is the list of words.
pub struct UntaggedCorpusReader<R> {
    lines: Lines<R>,
    line_no: usize,
}

impl<R> UntaggedCorpusReader<R>
where
    R: BufRead,
{
    /// Creates a new reader.
    pub fn new(rdr: R) -> Self {
        Self {
            lines: rdr.lines(),
            line_no: 0,
        }
    }
}

impl<R> Iterator for UntaggedCorpusReader<R>
where
    R: BufRead,
{
    type Item = Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut words = vec![];
        for line in self.lines.by_ref() {
            self.line_no += 1;
            let line = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                if words.is_empty() {
                    continue;
                }
                return Some(Ok(words));
            }
            if trimmed.contains(char::is_whitespace) {
                return Some(Err(PosTagError::malformed_line(self.line_no, line)));
            }
            words.push(trimmed.to_string());
        }
        if words.is_empty() {
            None
        } else {
            Some(Ok(words))
        }
    }
}

/// Reads all sentences of a tagged corpus.
///
/// # Errors
///
/// Returns [`PosTagError::MalformedLine`] for a non-blank line that is not exactly two
/// whitespace-separated tokens, and I/O errors as is.
pub fn read_tagged_corpus<R>(rdr: R) -> Result<Vec<TaggedSentence>>
where
    R: BufRead,
{
    TaggedCorpusReader::new(rdr).collect()
}

/// Reads all sentences of an untagged corpus.
///
/// # Errors
///
/// Returns [`PosTagError::MalformedLine`] for a line containing more than one word, and I/O
/// errors as is.
pub fn read_untagged_corpus<R>(rdr: R) -> Result<Vec<Vec<String>>>
where
    R: BufRead,
{
    UntaggedCorpusReader::new(rdr).collect()
}

/// Writes one sentence as `word<TAB>tag` lines followed by a blank line.
///
/// # Errors
///
/// If `words` and `tags` differ in length, an error variant will be returned.
pub fn write_tagged_sentence<W, S, T>(wtr: &mut W, words: &[S], tags: &[T]) -> Result<()>
where
    W: Write,
    S: AsRef<str>,
    T: AsRef<str>,
{
    if words.len() != tags.len() {
        return Err(PosTagError::invalid_argument(
            "tags",
            format!("{} words but {} tags", words.len(), tags.len()),
        ));
    }
    for (word, tag) in words.iter().zip(tags) {
        writeln!(wtr, "{}\t{}", word.as_ref(), tag.as_ref())?;
    }
    writeln!(wtr)?;
    Ok(())
}

/// Writes sentences in the tagged corpus format.
pub fn write_tagged_corpus<W>(wtr: &mut W, sentences: &[TaggedSentence]) -> Result<()>
where
    W: Write,
{
    for s in sentences {
        write_tagged_sentence(wtr, s.words(), s.tags())?;
    }
    Ok(())
}

/// Concatenates corpora byte-for-byte, in the given order.
///
/// # Returns
///
/// The number of bytes written.
///
/// # Errors
///
/// I/O errors of the readers and the writer are returned as is.
pub fn merge_corpora<I, R, W>(inputs: I, wtr: &mut W) -> Result<u64>
where
    I: IntoIterator<Item = R>,
    R: Read,
    W: Write,
{
    let mut total = 0;
    for mut rdr in inputs {
        total += io::copy(&mut rdr, wtr)?;
    }
    wtr.flush()?;
    Ok(total)
}
