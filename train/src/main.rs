use std::fs::File;
use std::io::{prelude::*, stderr, BufReader};
use std::path::PathBuf;

use clap::Parser;
use postag::{corpus::TaggedCorpusReader, StartPolicy, Trainer};

#[derive(Parser, Debug)]
#[command(about = "A program to train part-of-speech tagging models.")]
struct Args {
    /// A tagged training corpus. Several corpora are read in the given order.
    #[arg(long, required = true)]
    corpus: Vec<PathBuf>,

    /// The file to write the trained model to
    #[arg(long)]
    model: PathBuf,

    /// Do not learn which tags start a sentence; every first tag receives the floor probability.
    #[arg(long)]
    legacy_start: bool,

    /// The number of workers for zstd (0 means multithreaded will be disabled)
    #[arg(long, default_value = "0")]
    zstd_workers: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let policy = if args.legacy_start {
        StartPolicy::Floor
    } else {
        StartPolicy::Learned
    };
    let mut trainer = Trainer::new().start_policy(policy);

    eprintln!("Loading dataset...");
    for path in args.corpus {
        eprintln!("Loading {path:?} ...");
        let f = BufReader::new(File::open(path)?);
        for s in TaggedCorpusReader::new(f) {
            if trainer.n_sentences() % 10000 == 0 {
                eprint!("# of sentences: {}\r", trainer.n_sentences());
                stderr().flush()?;
            }
            trainer.push_sentence(s?);
        }
        eprintln!("# of sentences: {}", trainer.n_sentences());
    }
    eprintln!("# of words: {}", trainer.n_words());

    eprintln!("Start training...");
    let model = trainer.train()?;
    eprintln!("Finish training.");
    log::info!(
        "{} tags, {} transitions, {} emissions ({policy:?} start)",
        model.alphabet().len(),
        model.transitions().len(),
        model.emissions().len()
    );

    let mut f = zstd::Encoder::new(File::create(args.model)?, 19)?;
    f.multithread(args.zstd_workers)?;
    model.write(&mut f)?;
    f.finish()?;

    Ok(())
}
