//! Definition of errors.

use std::error::Error;
use std::fmt;

pub type Result<T, E = PosTagError> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum PosTagError {
    EmptyCorpus,
    EmptyInputSequence,
    MalformedLine(MalformedLineError),
    UnknownTagAlphabet(UnknownTagAlphabetError),
    InvalidArgument(InvalidArgumentError),
    InvalidModel(InvalidModelError),
    DecodeError(bincode::error::DecodeError),
    EncodeError(bincode::error::EncodeError),
    IOError(std::io::Error),
}

impl PosTagError {
    pub(crate) fn malformed_line<S>(line_no: usize, line: S) -> Self
    where
        S: Into<String>,
    {
        Self::MalformedLine(MalformedLineError {
            line_no,
            line: line.into(),
        })
    }

    pub(crate) fn unknown_tag_alphabet<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::UnknownTagAlphabet(UnknownTagAlphabetError { msg: msg.into() })
    }

    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }

    pub(crate) fn invalid_model<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidModel(InvalidModelError { msg: msg.into() })
    }
}

impl fmt::Display for PosTagError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::EmptyCorpus => write!(f, "EmptyCorpus: no sentences to estimate from"),
            Self::EmptyInputSequence => write!(f, "EmptyInputSequence: no words to tag"),
            Self::MalformedLine(e) => e.fmt(f),
            Self::UnknownTagAlphabet(e) => e.fmt(f),
            Self::InvalidArgument(e) => e.fmt(f),
            Self::InvalidModel(e) => e.fmt(f),
            Self::DecodeError(e) => e.fmt(f),
            Self::EncodeError(e) => e.fmt(f),
            Self::IOError(e) => e.fmt(f),
        }
    }
}

impl Error for PosTagError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::IOError(e) => Some(e),
            _ => None,
        }
    }
}

/// Error used when a corpus line cannot be parsed.
#[derive(Debug)]
pub struct MalformedLineError {
    /// 1-based line number in the input.
    pub(crate) line_no: usize,

    /// The offending line.
    pub(crate) line: String,
}

impl MalformedLineError {
    /// Line number (1-based) of the offending line.
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    /// The offending line as read.
    pub fn line(&self) -> &str {
        &self.line
    }
}

impl fmt::Display for MalformedLineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "MalformedLine: line {}: {:?}", self.line_no, self.line)
    }
}

impl Error for MalformedLineError {}

/// Error used when the tag alphabet and the probability tables do not match.
#[derive(Debug)]
pub struct UnknownTagAlphabetError {
    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for UnknownTagAlphabetError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "UnknownTagAlphabet: {}", self.msg)
    }
}

impl Error for UnknownTagAlphabetError {}

/// Error used when the argument is invalid.
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// Name of the argument.
    pub(crate) arg: &'static str,

    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}

/// Error used when the model is invalid.
#[derive(Debug)]
pub struct InvalidModelError {
    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidModelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidModelError: {}", self.msg)
    }
}

impl Error for InvalidModelError {}

impl From<bincode::error::DecodeError> for PosTagError {
    fn from(error: bincode::error::DecodeError) -> Self {
        Self::DecodeError(error)
    }
}

impl From<bincode::error::EncodeError> for PosTagError {
    fn from(error: bincode::error::EncodeError) -> Self {
        Self::EncodeError(error)
    }
}

impl From<std::io::Error> for PosTagError {
    fn from(error: std::io::Error) -> Self {
        Self::IOError(error)
    }
}
