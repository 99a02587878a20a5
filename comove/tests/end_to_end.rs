use chrono::{Datelike, Days, NaiveDate, Weekday};
use comove::{
    config::ComoveConfig,
    matrix::{CorrelationMatrixEngine, MatrixPhase, RowBestMatch},
    series::{Identifier, PricePoint, Series, SeriesStore},
};
use rand::Rng;
use std::sync::Arc;

const RISING: [f64; 5] = [10.0, 11.0, 12.0, 13.0, 14.0];
const FALLING: [f64; 5] = [14.0, 13.0, 12.0, 11.0, 10.0];
const VALLEY: [f64; 5] = [12.0, 11.0, 10.0, 11.0, 12.0];

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn weekdays() -> impl Iterator<Item = NaiveDate> {
    (0..)
        .map(|offset| monday().checked_add_days(Days::new(offset)).unwrap())
        .filter(|date| !matches!(date.weekday(), Weekday::Sat | Weekday::Sun))
}

fn series(closes: impl IntoIterator<Item = f64>) -> Series {
    weekdays()
        .zip(closes)
        .map(|(date, close)| PricePoint::new(date, close))
        .collect()
}

fn weeks(shapes: &[[f64; 5]], scale: f64) -> Series {
    series(shapes.iter().flatten().map(|close| close * scale))
}

fn engine(
    entries: Vec<(&str, Series)>,
    config: ComoveConfig,
) -> Arc<CorrelationMatrixEngine<SeriesStore>> {
    let identifiers = entries.iter().map(|(name, _)| Identifier::from(*name)).collect();
    let store: SeriesStore = entries
        .into_iter()
        .map(|(name, series)| (Identifier::from(name), series))
        .collect();
    Arc::new(CorrelationMatrixEngine::init(identifiers, store, config))
}

#[tokio::test]
async fn test_identical_shapes_co_move_and_uncorrelated_do_not() {
    let config = ComoveConfig::default();
    let engine = engine(
        vec![
            ("A", weeks(&[RISING, FALLING], 1.0)),
            ("B", weeks(&[RISING, FALLING], 2.0)),
            ("C", weeks(&[VALLEY, VALLEY], 1.0)),
        ],
        config,
    );

    let (grid, mut best) = comove::run(Arc::clone(&engine), Vec::<RowBestMatch>::new())
        .await
        .unwrap();

    assert_eq!(grid.at(0, 1), 1.0);
    assert_eq!(grid.at(0, 2), 0.0);
    assert_eq!(grid.at(1, 2), 0.0);
    assert_eq!(engine.matrix().phase(), MatrixPhase::Complete);

    best.sort_by_key(|best| best.row);
    let summary: Vec<_> = best
        .iter()
        .map(|best| (best.identifier.as_str(), best.peer.as_str(), best.frequency))
        .collect();
    assert_eq!(summary, vec![("A", "B", 1.0), ("B", "C", 0.0)]);
}

#[tokio::test]
async fn test_configured_threshold_changes_grid() {
    // Weekly correlation between these shapes is 0.9
    let swapped = [10.0, 11.0, 12.0, 14.0, 13.0];
    let entries = || {
        vec![
            ("A", weeks(&[RISING, RISING], 1.0)),
            ("B", weeks(&[swapped, RISING], 3.0)),
        ]
    };

    let lenient = engine(entries(), ComoveConfig::default());
    let (grid, _) = comove::run(lenient, Vec::<RowBestMatch>::new())
        .await
        .unwrap();
    assert_eq!(grid.at(0, 1), 1.0);

    let strict = engine(
        entries(),
        ComoveConfig {
            threshold: 0.99,
            ..ComoveConfig::default()
        },
    );
    let (grid, best) = comove::run(strict, Vec::<RowBestMatch>::new())
        .await
        .unwrap();
    assert_eq!(grid.at(0, 1), 0.5);
    assert_eq!(best[0].frequency, 0.5);
}

#[tokio::test]
async fn test_short_common_history_is_zero_without_fault() {
    let config = ComoveConfig::default();
    let engine = engine(
        vec![
            ("X", series([1.0, 2.0, 3.0, 4.0])),
            ("Y", series([4.0, 3.0, 2.0, 1.0, 0.5, 0.25])),
        ],
        config,
    );

    let (grid, best) = comove::run(engine, Vec::<RowBestMatch>::new())
        .await
        .unwrap();

    assert_eq!(grid.at(0, 1), 0.0);
    assert_eq!(best.len(), 1);
    assert_eq!(best[0].peer, Identifier::from("Y"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_random_roster_grid_invariants() {
    let mut rng = rand::rng();
    let n = 12;
    let entries: Vec<(String, Series)> = (0..n)
        .map(|i| {
            let days = rng.random_range(0..80);
            let closes: Vec<f64> = (0..days).map(|_| rng.random_range(1.0..100.0)).collect();
            let points: Vec<PricePoint> = weekdays()
                .zip(closes)
                .filter(|_| rng.random_bool(0.9))
                .map(|(date, close)| PricePoint::new(date, close))
                .collect();
            (format!("S{i:02}"), Series::new(points))
        })
        .collect();

    let config = ComoveConfig {
        capacity: 3,
        ..ComoveConfig::default()
    };
    let engine = engine(
        entries
            .iter()
            .map(|(name, series)| (name.as_str(), series.clone()))
            .collect(),
        config,
    );

    let (grid, best) = comove::run(Arc::clone(&engine), Vec::<RowBestMatch>::new())
        .await
        .unwrap();

    for i in 0..n {
        for j in 0..n {
            let value = grid.at(i, j);
            match i.cmp(&j) {
                std::cmp::Ordering::Equal => assert_eq!(value, 1.0),
                std::cmp::Ordering::Greater => assert_eq!(value, 0.0),
                std::cmp::Ordering::Less => assert!((0.0..=1.0).contains(&value)),
            }
        }
    }

    let mut rows: Vec<_> = best.iter().map(|best| best.row).collect();
    rows.sort_unstable();
    assert_eq!(rows, (0..n - 1).collect::<Vec<_>>());
    for best in &best {
        assert!(best.column > best.row);
        assert_eq!(best.frequency, grid.at(best.row, best.column));
    }

    // Recomputing a row over the same series reproduces it exactly
    let before = engine.matrix().snapshot();
    engine.compute_row(0);
    assert_eq!(engine.matrix().snapshot(), before);
}
