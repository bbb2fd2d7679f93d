use anyhow::Context;
use tracing_subscriber::EnvFilter;

use usertype_predictor::{
    config::ServiceConfig,
    load_classifier, load_sample, model, sample_rows,
    server::{self, AppState},
    FeatureSource, Pipeline,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = ServiceConfig::from_env().context("failed to resolve configuration")?;

    let classifier = load_classifier(&cfg.model_path)?;
    model::warmup(classifier.as_ref()).context("classifier warmup failed")?;
    tracing::info!("warmup forward ok");
    tracing::info!(
        "loaded model {}; feat_list[{}]: {:?}",
        cfg.model_path.display(),
        classifier.feature_names().len(),
        classifier.feature_names()
    );

    if cfg.feature_source == FeatureSource::HourSubstituted {
        tracing::warn!(
            "feature_source=hour_substituted: start_day_of_week and distance slots are filled from start_hour"
        );
    }
    tracing::info!("decision threshold {}", cfg.threshold);

    let rows = load_sample(&cfg.dataset_path)?;
    let sample = sample_rows(&rows, cfg.sample_size, cfg.sample_seed);
    tracing::info!(
        "loaded {} dataset rows from {}; showing {} (seed {})",
        rows.len(),
        cfg.dataset_path.display(),
        sample.len(),
        cfg.sample_seed
    );

    let pipeline = Pipeline::new(classifier, cfg.threshold, cfg.feature_source)?;
    let state = AppState::new(pipeline, sample)
        .with_prediction_logging(std::env::var("LOG_PRED").ok().as_deref() == Some("1"));
    let app = server::router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], cfg.port));
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;
    Ok(())
}
