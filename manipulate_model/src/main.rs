use std::fs;
use std::io::{prelude::*, BufWriter};
use std::path::PathBuf;

use clap::Parser;
use postag::Model;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(about = "A program to inspect trained models.")]
struct Args {
    /// Input path of the model file
    #[arg(long)]
    model_in: PathBuf,

    /// Output the transition table as CSV.
    #[arg(long)]
    dump_transitions: Option<PathBuf>,

    /// Output the emission table as CSV.
    #[arg(long)]
    dump_emissions: Option<PathBuf>,

    /// Output the tag alphabet, one tag per line.
    #[arg(long)]
    dump_tags: Option<PathBuf>,
}

#[derive(Serialize)]
struct TransitionRecord<'a> {
    prev: &'a str,
    cur: &'a str,
    probability: f64,
}

#[derive(Serialize)]
struct EmissionRecord<'a> {
    word: &'a str,
    tag: &'a str,
    probability: f64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    eprintln!("Loading model file...");
    let mut f = zstd::Decoder::new(fs::File::open(args.model_in)?)?;
    let model = Model::read(&mut f)?;
    log::info!("start policy: {:?}", model.start_policy());

    if let Some(path) = args.dump_transitions {
        eprintln!("Saving transition table...");
        let mut records: Vec<_> = model.transitions().iter().collect();
        records.sort_unstable_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        let mut wtr = csv::Writer::from_writer(fs::File::create(path)?);
        for (prev, cur, probability) in records {
            wtr.serialize(TransitionRecord {
                prev,
                cur,
                probability,
            })?;
        }
        wtr.flush()?;
    }

    if let Some(path) = args.dump_emissions {
        eprintln!("Saving emission table...");
        let mut records: Vec<_> = model.emissions().iter().collect();
        records.sort_unstable_by(|a, b| (a.1, a.0).cmp(&(b.1, b.0)));
        let mut wtr = csv::Writer::from_writer(fs::File::create(path)?);
        for (word, tag, probability) in records {
            wtr.serialize(EmissionRecord {
                word,
                tag,
                probability,
            })?;
        }
        wtr.flush()?;
    }

    if let Some(path) = args.dump_tags {
        eprintln!("Saving tag alphabet...");
        let mut wtr = BufWriter::new(fs::File::create(path)?);
        for tag in model.alphabet().iter() {
            writeln!(wtr, "{tag}")?;
        }
        wtr.flush()?;
    }

    Ok(())
}
