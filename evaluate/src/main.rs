use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use clap::Parser;
use postag::{corpus::TaggedCorpusReader, Evaluation, Model, Tagger, DEFAULT_FLOOR};

#[derive(Parser, Debug)]
#[command(about = "A program to evaluate the accuracy of part-of-speech tagging models.")]
struct Args {
    /// The model file to use when tagging text
    #[arg(long)]
    model: PathBuf,

    /// Probability used for unseen transitions and emissions
    #[arg(long, default_value_t = DEFAULT_FLOOR)]
    floor: f64,

    /// Tagged reference corpora
    #[arg(required = true)]
    gold: Vec<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    eprintln!("Loading model file...");
    let mut f = zstd::Decoder::new(File::open(args.model)?)?;
    let model = Model::read(&mut f)?;
    let tagger = Tagger::with_floor(&model, args.floor)?;

    let mut eval = Evaluation::new();
    for path in args.gold {
        eprintln!("Evaluating {path:?} ...");
        let f = BufReader::new(File::open(&path)?);
        let mut n_unknown = 0;
        for s in TaggedCorpusReader::new(f) {
            let s = s?;
            n_unknown += s
                .tags()
                .iter()
                .filter(|t| !tagger.alphabet().contains(t))
                .count();
            let tags = tagger.tag(s.words())?;
            eval.accumulate(s.tags(), &tags)?;
        }
        if n_unknown != 0 {
            log::warn!("{path:?}: {n_unknown} reference tags are not in the model");
        }
    }

    println!("{eval}");

    Ok(())
}
