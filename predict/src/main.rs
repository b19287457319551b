use std::fs::File;
use std::io::{prelude::*, stdin, stdout, BufReader, BufWriter};
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use postag::{corpus, Model, Tagger, DEFAULT_FLOOR};

#[derive(Parser, Debug)]
#[command(about = "A program to perform part-of-speech tagging.")]
struct Args {
    /// The model file to use when tagging text
    #[arg(long)]
    model: PathBuf,

    /// Probability used for unseen transitions and emissions
    #[arg(long, default_value_t = DEFAULT_FLOOR)]
    floor: f64,

    /// Number of threads (0 means tagging on the main thread)
    #[arg(long, default_value = "0")]
    n_threads: usize,

    /// Number of sentences sent to the threads at once
    #[arg(long, default_value = "1000")]
    mt_batch_size: usize,

    /// Untagged input, one word per line. Reads stdin if omitted.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Tagged output. Writes stdout if omitted.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    eprintln!("Loading model file...");
    let mut f = zstd::Decoder::new(File::open(args.model)?)?;
    let model = Model::read(&mut f)?;
    let tagger = Tagger::with_floor(&model, args.floor)?;

    let rdr: Box<dyn BufRead> = match args.input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(stdin().lock()),
    };
    let mut wtr: Box<dyn Write> = match args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(stdout().lock())),
    };
    let sentences = corpus::UntaggedCorpusReader::new(rdr);

    eprintln!("Start tagging");
    let mut n_words = 0;
    let start = Instant::now();
    if args.n_threads == 0 {
        for words in sentences {
            let words = words?;
            let tags = tagger.tag(&words)?;
            corpus::write_tagged_sentence(&mut wtr, &words, &tags)?;
            n_words += words.len();
        }
    } else {
        let mut tagger = tagger.multithreading(args.n_threads);
        let mut sentences = sentences.peekable();
        while sentences.peek().is_some() {
            let batch = sentences
                .by_ref()
                .take(args.mt_batch_size.max(1))
                .collect::<Result<Vec<_>, _>>()?;
            log::debug!("tagging a batch of {} sentences", batch.len());
            let results = tagger.tag_batch(batch.clone())?;
            for (words, tags) in batch.iter().zip(results) {
                corpus::write_tagged_sentence(&mut wtr, words, &tags)?;
                n_words += words.len();
            }
        }
    }
    wtr.flush()?;
    let duration = start.elapsed();
    eprintln!("Elapsed: {} [sec]", duration.as_secs_f64());
    eprintln!(
        "Speed: {} [words/sec]",
        n_words as f64 / duration.as_secs_f64()
    );

    Ok(())
}
