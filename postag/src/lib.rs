#![cfg_attr(docsrs, feature(doc_cfg))]

//! # postag
//!
//! postag is a part-of-speech tagger based on a bigram hidden Markov model. Tag transition and
//! word emission probabilities are estimated by relative frequency from a tagged corpus, and
//! the most probable tag sequence of a sentence is found with the Viterbi algorithm.
//!
//! ## Examples
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::{prelude::*, stdin, BufReader};
//!
//! use postag::{Model, Tagger};
//!
//! let mut f = BufReader::new(File::open("model.bin").unwrap());
//! let model = Model::read(&mut f).unwrap();
//! let tagger = Tagger::new(&model).unwrap();
//!
//! for line in stdin().lock().lines() {
//!     let line = line.unwrap();
//!     let words: Vec<&str> = line.split_whitespace().collect();
//!     let tags = tagger.tag(&words).unwrap();
//!     println!("{}", tags.join(" "));
//! }
//! ```
//!
//! Models are built with [`Trainer`], or piece by piece with the functions in [`estimator`].

mod errors;
mod evaluation;
mod model;
mod sentence;
mod tagger;
mod utils;

pub mod corpus;
pub mod estimator;

pub use errors::{
    InvalidArgumentError, InvalidModelError, MalformedLineError, PosTagError, Result,
    UnknownTagAlphabetError,
};
pub use estimator::Trainer;
pub use evaluation::{Evaluation, TagCounts};
pub use model::{EmissionTable, Model, StartPolicy, TagAlphabet, TransitionTable, START_TAG};
pub use sentence::TaggedSentence;
pub use tagger::{Tagger, DEFAULT_FLOOR};

#[cfg(feature = "multithreading")]
pub use tagger::MultithreadTagger;
