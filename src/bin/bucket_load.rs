//! Inserts random keys into a `ChainedHashMap` and prints how many landed in
//! each bucket.

use std::hash::{Hash, Hasher};

use anyhow::{Result, ensure};
use chainbst::ChainedHashMap;
use chainbst::hasher::BuildPassThroughHasher;
use clap::Parser;
use env_logger::Builder;
use log::{LevelFilter, debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Parser, Debug)]
#[command(author, version, about = "Measure bucket load distribution under random insertion", long_about = None)]
struct Args {
    /// Number of buckets in the table
    #[arg(short, long, default_value_t = 37)]
    buckets: usize,

    /// Number of random keys to insert
    #[arg(short, long, default_value_t = 10_000)]
    keys: usize,

    /// Seed for the key generator; drawn from the OS when omitted
    #[arg(short, long)]
    seed: Option<u64>,
}

/// A key whose hash code folds the high half of its id into the low half.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ProbeKey(i32);

impl Hash for ProbeKey {
    #[allow(clippy::cast_sign_loss)]
    fn hash<H: Hasher>(&self, state: &mut H) {
        let id = self.0 as u32;
        state.write_u32(id ^ (id >> 16));
    }
}

fn initialize_logger() {
    let mut builder = Builder::new();
    builder
        .filter_level(LevelFilter::Info)
        .format_timestamp_millis()
        .parse_default_env();

    // Avoid panicking if the logger was already initialized elsewhere.
    let _ = builder.try_init();
}

fn main() -> Result<()> {
    initialize_logger();
    let args = Args::parse();
    ensure!(args.buckets > 0, "bucket count must be positive, got {}", args.buckets);
    debug!("{args:?}");

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut table = ChainedHashMap::with_buckets_and_hasher(args.buckets, BuildPassThroughHasher::default());
    for value in 0..args.keys {
        table.put(ProbeKey(rng.r#gen()), value);
    }

    let sizes = table.bucket_sizes();
    let shortest = sizes.iter().min().copied().unwrap_or_default();
    let longest = sizes.iter().max().copied().unwrap_or_default();
    info!(
        "{} entries in {} buckets: load factor {:.2}, chains {shortest}..={longest}",
        table.len(),
        table.bucket_count(),
        table.load_factor()
    );

    println!("Bucket load distribution (bucket : count):");
    for (index, count) in sizes.iter().enumerate() {
        println!(" {index:2} : {count:4}");
    }

    Ok(())
}
