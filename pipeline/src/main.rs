use std::fs::File;
use std::io::{prelude::*, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use clap::Parser;
use postag::{corpus, Model, StartPolicy, Tagger, Trainer, DEFAULT_FLOOR};

#[derive(Parser, Debug)]
#[command(
    about = "A program to train on a corpus, retrain on the corpus merged with a development set, and tag a test set."
)]
struct Args {
    /// A tagged training corpus
    #[arg(long)]
    train: PathBuf,

    /// A tagged development corpus
    #[arg(long)]
    dev: PathBuf,

    /// The file to write the merged training and development corpora to
    #[arg(long)]
    combined: PathBuf,

    /// Untagged test input, one word per line
    #[arg(long)]
    test: PathBuf,

    /// The file to write the tagged test set to
    #[arg(long)]
    output: PathBuf,

    /// The file to write the retrained model to
    #[arg(long)]
    model: Option<PathBuf>,

    /// Do not learn which tags start a sentence; every first tag receives the floor probability.
    #[arg(long)]
    legacy_start: bool,

    /// Probability used for unseen transitions and emissions
    #[arg(long, default_value_t = DEFAULT_FLOOR)]
    floor: f64,
}

fn train(path: &Path, policy: StartPolicy) -> Result<Model, Box<dyn std::error::Error>> {
    eprintln!("Training on {path:?} ...");
    let mut trainer = Trainer::new().start_policy(policy);
    for s in corpus::read_tagged_corpus(BufReader::new(File::open(path)?))? {
        trainer.push_sentence(s);
    }
    let model = trainer.train()?;
    eprintln!(
        "# of sentences: {}, # of words: {}, # of tags: {}",
        trainer.n_sentences(),
        trainer.n_words(),
        model.alphabet().len()
    );
    Ok(model)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let policy = if args.legacy_start {
        StartPolicy::Floor
    } else {
        StartPolicy::Learned
    };

    let initial = train(&args.train, policy)?;

    eprintln!("Merging {:?} and {:?} ...", args.train, args.dev);
    let inputs = [
        BufReader::new(File::open(&args.train)?),
        BufReader::new(File::open(&args.dev)?),
    ];
    let mut wtr = BufWriter::new(File::create(&args.combined)?);
    corpus::merge_corpora(inputs, &mut wtr)?;
    drop(wtr);

    let model = train(&args.combined, policy)?;
    let n_new_tags = model
        .alphabet()
        .iter()
        .filter(|t| !initial.alphabet().contains(t))
        .count();
    if n_new_tags != 0 {
        log::info!("development data added {n_new_tags} tags");
    }

    if let Some(path) = &args.model {
        eprintln!("Saving model file...");
        let mut f = zstd::Encoder::new(File::create(path)?, 19)?;
        model.write(&mut f)?;
        f.finish()?;
    }

    eprintln!("Tagging {:?} ...", args.test);
    let tagger = Tagger::with_floor(&model, args.floor)?;
    let rdr = BufReader::new(File::open(&args.test)?);
    let mut wtr = BufWriter::new(File::create(&args.output)?);
    let mut n_sentences = 0;
    for words in corpus::UntaggedCorpusReader::new(rdr) {
        let words = words?;
        let tags = tagger.tag(&words)?;
        corpus::write_tagged_sentence(&mut wtr, &words, &tags)?;
        n_sentences += 1;
    }
    wtr.flush()?;

    eprintln!("Tagged {n_sentences} sentences into {:?}", args.output);

    Ok(())
}
