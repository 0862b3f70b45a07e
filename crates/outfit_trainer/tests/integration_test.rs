//! End-to-end tests against the bundled weather/outfit dataset

use anyhow::Result;
use outfit_core::{
    ForestParams, Observation, OutfitError, Pipeline, Recommender, ServiceState, MODEL_FILE,
};
use outfit_trainer::{train_pipeline, Dataset, OutfitClassifier};
use std::path::PathBuf;
use tempfile::TempDir;

fn dataset_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/weather_outfits_en.csv")
}

fn load_dataset() -> Result<Dataset> {
    Ok(Dataset::from_csv(dataset_path())?)
}

fn trained_pipeline() -> Result<Pipeline> {
    Ok(train_pipeline(&load_dataset()?, ForestParams::default())?)
}

#[test]
fn test_cold_rain_in_winter() -> Result<()> {
    let dataset = load_dataset()?;
    let pipeline = train_pipeline(&dataset, ForestParams::default())?;

    let outfit = pipeline.recommend(&Observation::new(5.0, 80.0, 20.0, "rainy", "winter"))?;

    assert!(dataset.outfit_labels().contains(outfit.as_str()));
    assert!(
        outfit.contains("raincoat") || outfit.contains("boots"),
        "unexpected outfit for cold rain: {}",
        outfit
    );
    Ok(())
}

#[test]
fn test_hot_sunny_summer() -> Result<()> {
    let dataset = load_dataset()?;
    let pipeline = train_pipeline(&dataset, ForestParams::default())?;

    let recommendation =
        pipeline.recommend_detailed(&Observation::new(30.0, 40.0, 5.0, "sunny", "summer"))?;

    assert!(dataset.outfit_labels().contains(recommendation.outfit.as_str()));
    assert!(recommendation.items.iter().any(|item| item == "shorts"));
    assert!(recommendation.confidence > 0.0 && recommendation.confidence <= 1.0);
    Ok(())
}

#[test]
fn test_unknown_sky_keeps_serving() -> Result<()> {
    let service = Recommender::with_pipeline(trained_pipeline()?)?;

    let err = service
        .recommend(&Observation::new(20.0, 50.0, 10.0, "hurricane", "spring"))
        .unwrap_err();
    assert!(matches!(
        err,
        OutfitError::UnknownCategory { ref column, ref value } if column == "weather" && value == "hurricane"
    ));

    assert!(matches!(service.state(), ServiceState::Serving { .. }));
    let outfit = service.recommend(&Observation::new(20.0, 50.0, 10.0, "sunny", "spring"))?;
    assert!(!outfit.is_empty());
    Ok(())
}

#[test]
fn test_out_of_domain_input_rejected() -> Result<()> {
    let pipeline = trained_pipeline()?;

    let negative_wind = pipeline.recommend_values(10.0, 50.0, -1.0, "cloudy", "autumn");
    assert!(matches!(negative_wind, Err(OutfitError::InvalidInput(_))));

    let humidity = pipeline.recommend_values(10.0, 101.0, 3.0, "cloudy", "autumn");
    assert!(matches!(humidity, Err(OutfitError::InvalidInput(_))));
    Ok(())
}

#[test]
fn test_empty_dataset_never_trains() {
    let csv = "temp,humidity,wind_speed,weather,season,outfit\n";
    let err = Dataset::from_reader(csv.as_bytes()).unwrap_err();
    assert!(matches!(err, OutfitError::DatasetLoad(_)));

    let unfitted = OutfitClassifier::new(ForestParams::default());
    assert!(matches!(
        unfitted.predict(&[5.0, 80.0, 20.0, 1.0, 3.0]),
        Err(OutfitError::NotFitted)
    ));
}

#[test]
fn test_training_is_deterministic() -> Result<()> {
    let dataset = load_dataset()?;
    let first = train_pipeline(&dataset, ForestParams::default())?;
    let second = train_pipeline(&dataset, ForestParams::default())?;

    assert_eq!(first.forest().hash_hex()?, second.forest().hash_hex()?);

    let probes = [
        (5.0, 80.0, 20.0, "rainy", "winter"),
        (-4.0, 85.0, 12.0, "snowy", "winter"),
        (17.0, 60.0, 9.0, "cloudy", "spring"),
        (33.0, 30.0, 2.0, "sunny", "summer"),
        (14.0, 54.0, 31.0, "windy", "autumn"),
    ];
    for (t, h, w, sky, season) in probes {
        let observation = Observation::new(t, h, w, sky, season);
        assert_eq!(first.recommend(&observation)?, second.recommend(&observation)?);
        assert_eq!(first.recommend(&observation)?, first.recommend(&observation)?);
    }
    Ok(())
}

#[test]
fn test_every_category_pair_is_covered() -> Result<()> {
    let dataset = load_dataset()?;
    let pipeline = train_pipeline(&dataset, ForestParams::default())?;
    let labels = dataset.outfit_labels();

    for (sky, season) in dataset.category_pairs() {
        let rows: Vec<_> = dataset
            .examples()
            .iter()
            .filter(|e| e.sky_condition == sky && e.season == season)
            .collect();
        let n = rows.len() as f64;
        let mean = |pick: fn(&&outfit_trainer::TrainingExample) -> f64| {
            rows.iter().map(pick).sum::<f64>() / n
        };

        let observation = Observation::new(
            mean(|e| e.temperature),
            mean(|e| e.humidity),
            mean(|e| e.wind_speed),
            sky.as_str(),
            season.as_str(),
        );
        let outfit = pipeline.recommend(&observation)?;
        assert!(
            labels.contains(outfit.as_str()),
            "{}/{} produced unknown label {}",
            sky,
            season,
            outfit
        );
    }
    Ok(())
}

#[test]
fn test_saved_model_serves_identically() -> Result<()> {
    let pipeline = trained_pipeline()?;
    let dir = TempDir::new()?;

    let path = pipeline.save(dir.path())?;
    assert_eq!(path, dir.path().join(MODEL_FILE));

    let restored = Pipeline::load(&path)?;
    assert_eq!(restored.forest().hash_hex()?, pipeline.forest().hash_hex()?);
    assert_eq!(restored.outfits(), pipeline.outfits());

    let observation = Observation::new(8.0, 88.0, 18.0, "rainy", "autumn");
    assert_eq!(restored.recommend(&observation)?, pipeline.recommend(&observation)?);
    Ok(())
}

#[test]
fn test_hot_swap_to_retrained_model() -> Result<()> {
    let service = Recommender::new();
    assert!(matches!(
        service.recommend(&Observation::new(20.0, 50.0, 10.0, "sunny", "spring")),
        Err(OutfitError::NotFitted)
    ));

    let dataset = load_dataset()?;
    service.install(train_pipeline(&dataset, ForestParams::default())?)?;
    let before = service.pipeline()?;

    let params = ForestParams {
        n_trees: 25,
        seed: 7,
        ..ForestParams::default()
    };
    let previous = service.install(train_pipeline(&dataset, params)?)?;

    assert!(previous.is_some_and(|p| std::sync::Arc::ptr_eq(&p, &before)));
    assert_eq!(service.pipeline()?.forest().num_trees(), 25);
    assert_eq!(before.forest().num_trees(), 200);
    Ok(())
}
