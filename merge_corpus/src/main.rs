use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use clap::Parser;
use postag::corpus;

#[derive(Parser, Debug)]
#[command(about = "A program to concatenate corpus files.")]
struct Args {
    /// The file to write the merged corpus to
    #[arg(long)]
    output: PathBuf,

    /// Corpus files, concatenated in the given order
    #[arg(required = true)]
    input: Vec<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut inputs = vec![];
    for path in &args.input {
        log::debug!("opening {path:?}");
        inputs.push(BufReader::new(File::open(path)?));
    }
    let mut wtr = BufWriter::new(File::create(&args.output)?);
    let n_bytes = corpus::merge_corpora(inputs, &mut wtr)?;
    eprintln!(
        "Wrote {n_bytes} bytes from {} files to {:?}",
        args.input.len(),
        args.output
    );

    Ok(())
}
