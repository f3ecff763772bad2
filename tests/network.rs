use nn_hashtable::encoding::{one_hot, string_norm};
use nn_hashtable::metrics::classification_accuracy;
use nn_hashtable::{DenseNetwork, EpochReport, Error, FitConfig, Matrix};

const WORDS: [&str; 10] = [
    "012",
    "ABC",
    "XwdYZ",
    "a longer key value",
    "gddog",
    "emu",
    "xyz",
    "asd",
    "4fw",
    "sb7",
];

fn xor_batch() -> (Vec<Matrix>, Vec<Matrix>) {
    let xs = [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]]
        .iter()
        .map(|x| Matrix::column(x).unwrap())
        .collect();
    let ys = [0, 1, 1, 0]
        .iter()
        .map(|&class| one_hot(class, 2).unwrap())
        .collect();
    (xs, ys)
}

fn assert_all_classified(net: &DenseNetwork, xs: &[Matrix], ys: &[Matrix]) {
    for (i, (x, y)) in xs.iter().zip(ys).enumerate() {
        let prediction = net.predict(x).unwrap();
        assert_eq!(
            classification_accuracy(&prediction, y).unwrap(),
            1,
            "example {i} misclassified: {prediction}"
        );
    }
}

/// Fits fresh networks seeded `0..seeds` and returns the first that converges.
fn fit_any_seed(
    layers: &[usize],
    xs: &[Matrix],
    ys: &[Matrix],
    cfg: &FitConfig,
    seeds: u64,
) -> DenseNetwork {
    let mut failures = Vec::new();
    for seed in 0..seeds {
        let mut net = DenseNetwork::new_with_seed(layers, seed).unwrap();
        match net.fit(xs, ys, cfg) {
            Ok(report) => {
                assert_eq!(report.final_accuracy, 1.0);
                return net;
            }
            Err(err @ Error::ConvergenceFailure { .. }) => failures.push((seed, err)),
            Err(other) => panic!("unexpected fit error: {other}"),
        }
    }
    panic!("no seed converged: {failures:?}");
}

#[test]
fn learns_xor() {
    let (xs, ys) = xor_batch();
    let cfg = FitConfig {
        max_steps: 1_000,
        buffer_steps: 100,
        ..FitConfig::default()
    };
    let net = fit_any_seed(&[2, 3, 2], &xs, &ys, &cfg, 8);
    assert_all_classified(&net, &xs, &ys);
}

#[test]
fn maps_encoded_keys_to_their_slots() {
    let xs: Vec<Matrix> = WORDS
        .iter()
        .map(|key| string_norm(key, 18, 48, 122).unwrap())
        .collect();
    let ys: Vec<Matrix> = (0..WORDS.len())
        .map(|slot| one_hot(slot, WORDS.len()).unwrap())
        .collect();

    let cfg = FitConfig {
        buffer_steps: 10,
        ..FitConfig::default()
    };
    let net = fit_any_seed(&[18, 20, 10], &xs, &ys, &cfg, 4);
    assert_all_classified(&net, &xs, &ys);
}

#[test]
fn buffered_fit_reports_trailing_on_target_epochs() {
    let (xs, ys) = xor_batch();
    let cfg = FitConfig {
        max_steps: 1_000,
        buffer_steps: 20,
        ..FitConfig::default()
    };

    for seed in 0..8 {
        let mut net = DenseNetwork::new_with_seed(&[2, 3, 2], seed).unwrap();
        let mut epochs: Vec<EpochReport> = Vec::new();
        let Ok(report) = net.fit_with_observer(&xs, &ys, &cfg, &mut |r: &EpochReport| {
            epochs.push(*r)
        }) else {
            continue;
        };

        assert_eq!(epochs.len(), report.steps);
        let tail = &epochs[epochs.len() - 21..];
        assert!(tail.iter().all(|r| r.accuracy == 1.0));
        if epochs.len() > 21 {
            assert!(epochs[epochs.len() - 22].accuracy < 1.0);
        }
        return;
    }
    panic!("no seed converged");
}

#[test]
fn failed_fit_keeps_partially_trained_parameters() {
    // A single-layer network cannot separate XOR.
    let (xs, ys) = xor_batch();
    let mut net = DenseNetwork::new_with_seed(&[2, 2], 3).unwrap();
    let initial = net.clone();

    let err = net
        .fit(
            &xs,
            &ys,
            &FitConfig {
                max_steps: 200,
                ..FitConfig::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, Error::ConvergenceFailure { steps: 200, .. }));
    assert_ne!(net.weights(), initial.weights());
}

#[test]
fn predict_checks_input_shape() {
    let net = DenseNetwork::new_with_seed(&[3, 2], 0).unwrap();
    assert!(matches!(
        net.predict(&Matrix::column(&[1.0, 2.0]).unwrap()),
        Err(Error::ShapeMismatch(_))
    ));
    assert!(matches!(
        net.predict(&Matrix::zeros(3, 2).unwrap()),
        Err(Error::ShapeMismatch(_))
    ));

    let out = net.predict(&Matrix::column(&[1.0, 2.0, 3.0]).unwrap()).unwrap();
    assert_eq!(out.shape(), (2, 1));
    assert!(out.as_slice().iter().all(|&v| v > 0.0 && v < 1.0));
}
