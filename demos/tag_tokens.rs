//! Train a tiny part-of-speech tagger, freeze it, and reload it from bytes.
//!
//! Run with `RUST_LOG=debug cargo run --example tag_tokens` to see per-epoch logging.

use rust_perceptron::{
    Dataset, FitConfig, Shuffle, SparseMultinomialAveragedPerceptron, SparseMultinomialPerceptron,
};
use tracing_subscriber::EnvFilter;

fn features(prev_tag: &str, word: &str) -> Vec<String> {
    let start = word.char_indices().rev().nth(1).map_or(0, |(i, _)| i);
    let suffix = &word[start..];
    vec![
        "bias".to_owned(),
        format!("w={word}"),
        format!("suf={suffix}"),
        format!("prev={prev_tag}"),
    ]
}

fn main() -> rust_perceptron::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let corpus: [&[(&str, &str)]; 3] = [
        &[("the", "DET"), ("dog", "NOUN"), ("barks", "VERB")],
        &[("a", "DET"), ("cat", "NOUN"), ("sleeps", "VERB")],
        &[("the", "DET"), ("bird", "NOUN"), ("sings", "VERB")],
    ];

    let mut train = Dataset::new();
    for sentence in corpus {
        let mut prev = "<s>";
        for &(word, tag) in sentence {
            train.push(features(prev, word), tag.to_owned());
            prev = tag;
        }
    }

    let mut learner = SparseMultinomialAveragedPerceptron::new(0, 3);
    let report = learner.fit(
        &train,
        FitConfig {
            epochs: 8,
            shuffle: Shuffle::Seeded(0),
        },
    )?;
    let last = report.epochs.last().map_or(0.0, |e| e.accuracy());
    println!("final epoch accuracy={last}");

    let model = learner.freeze();
    let mut bytes = Vec::new();
    model.write(&mut bytes, "demo tagger, 3 tags")?;
    let (loaded, metadata) = SparseMultinomialPerceptron::read_with_metadata(bytes.as_slice())?;
    println!("reloaded {} bytes ({metadata})", bytes.len());

    let mut prev = "<s>".to_owned();
    for word in ["a", "bird", "barks"] {
        let tag = loaded
            .predict(&features(&prev, word))
            .unwrap_or_else(|| "?".to_owned());
        println!("{word}\t{tag}");
        prev = tag;
    }
    Ok(())
}
