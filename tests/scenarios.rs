use rust_perceptron::{
    Cell, Dataset, DenseMultinomialAveragedPerceptron, DenseMultinomialPerceptron, FitConfig,
    SparseDenseMultinomialPerceptron, SparseMultinomialAveragedPerceptron,
    SparseMultinomialPerceptron,
};

fn feats(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| (*s).to_owned()).collect()
}

#[test]
fn dense_binomial_equivalent_first_update() {
    let mut model = DenseMultinomialAveragedPerceptron::new(3, 2);
    assert_eq!(model.train_one(&[0, 1], &1), Some(0));
    assert_eq!(model.time(), 1);

    for f in [0, 1] {
        assert_eq!(model.weight(&f, &1).unwrap().get(), 1.0);
        assert_eq!(model.weight(&f, &0).unwrap().get(), -1.0);
    }

    let frozen = model.freeze();
    assert_eq!(frozen.score(&[0, 1]), vec![(0, -2.0), (1, 2.0)]);
    assert_eq!(frozen.score(&[2]), vec![(0, 0.0), (1, 0.0)]);
}

#[test]
fn sparse_second_pass_predicts_gold_without_update() {
    let mut model = SparseMultinomialAveragedPerceptron::new(0, 8);
    let x = feats(&["bias", "tok=foo"]);
    let noun = "NOUN".to_owned();

    let first = model.train_one(&x, &noun);
    assert_ne!(first.as_ref(), Some(&noun));
    let after_first = model.clone();

    assert_eq!(model.train_one(&x, &noun), Some(noun.clone()));
    assert_eq!(model.time(), 2);
    for f in &x {
        assert_eq!(
            model.weight(f, &noun).map(|w| w.get()),
            after_first.weight(f, &noun).map(|w| w.get())
        );
    }
}

#[test]
fn fresh_models_predict_and_roundtrip_as_zero() {
    let dense = DenseMultinomialPerceptron::new(5, 3);
    assert_eq!(dense.predict(&[4, 2]), Some(0));
    let mut bytes = Vec::new();
    dense.write(&mut bytes, "").unwrap();
    let loaded = DenseMultinomialPerceptron::read(bytes.as_slice()).unwrap();
    assert!(loaded.score(&[0, 1, 2, 3, 4]).iter().all(|&(_, s)| s == 0.0));

    let sparse_dense = SparseDenseMultinomialPerceptron::new(0, 3);
    assert_eq!(sparse_dense.predict(&feats(&["x"])), Some(0));

    let sparse = SparseMultinomialPerceptron::new(0, 3);
    assert_eq!(sparse.predict(&feats(&["x"])), None);
}

#[test]
fn train_freeze_deploy_workflow() {
    let mut train = Dataset::new();
    let sentences: [(&[&str], &str); 6] = [
        (&["bias", "w=the", "suf=he"], "DET"),
        (&["bias", "w=dog", "suf=og", "prev=DET"], "NOUN"),
        (&["bias", "w=barks", "suf=ks", "prev=NOUN"], "VERB"),
        (&["bias", "w=a", "suf=a"], "DET"),
        (&["bias", "w=cat", "suf=at", "prev=DET"], "NOUN"),
        (&["bias", "w=sleeps", "suf=ps", "prev=NOUN"], "VERB"),
    ];
    for (x, y) in sentences {
        train.push(feats(x), y.to_owned());
    }

    let mut learner = SparseMultinomialAveragedPerceptron::new(0, 3);
    let report = learner.fit(&train, FitConfig::default()).unwrap();
    assert_eq!(report.epochs.len(), 10);
    assert_eq!(report.epochs.last().unwrap().mistakes, 0);

    let model = learner.freeze();
    drop(learner);
    assert_eq!(model.evaluate(&train).unwrap().accuracy(), 1.0);

    let mut bytes = Vec::new();
    model.write(&mut bytes, "toy tagger").unwrap();
    let (loaded, metadata) = SparseMultinomialPerceptron::read_with_metadata(bytes.as_slice())
        .unwrap();
    assert_eq!(metadata, "toy tagger");
    assert_eq!(
        loaded.predict(&feats(&["bias", "w=dog", "prev=DET"])),
        Some("NOUN".to_owned())
    );
}
