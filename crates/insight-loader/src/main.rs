//! insight-loader: fetch raw company financials, score them and store the
//! resulting insights.
//!
//! Usage:
//!   cargo run -p insight-loader                         # ids from DATA_FILE
//!   cargo run -p insight-loader -- --ids TCS INFY --dry-run
//!   cargo run -p insight-loader -- --file data/nifty100.csv --concurrency 8

mod args;
mod ids;

use anyhow::{bail, Context};
use args::{LoaderArgs, USAGE};
use company_client::CompanyClient;
use insight_core::{ScoredInsight, ServiceConfig};
use insight_engine::{InsightEngine, ScoringConfig};
use insight_store::{InsightDb, InsightStore};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "insight_loader=info,company_client=warn,insight_store=warn".into()),
        )
        .init();

    let raw_args: Vec<String> = std::env::args().skip(1).collect();
    let args = match LoaderArgs::parse(&raw_args) {
        Ok(args) if !args.help => args,
        Ok(_) => {
            println!("{}", USAGE);
            return Ok(());
        }
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            std::process::exit(1);
        }
    };

    let config = ServiceConfig::from_env()?;

    let scoring = match &args.scoring_config {
        Some(path) => ScoringConfig::from_json_file(path)?,
        None => ScoringConfig::default(),
    };
    if let Err(problems) = scoring.validate() {
        bail!("Invalid scoring config: {}", problems.join("; "));
    }

    let company_ids = if args.ids.is_empty() {
        let path = args.file.clone().unwrap_or_else(|| config.data_file.clone());
        let ids = ids::read_company_ids(&path)?;
        tracing::info!("Loaded {} companies from {}", ids.len(), path.display());
        ids
    } else {
        ids::dedup_ids(args.ids.clone())
    };

    let total = company_ids.len();
    tracing::info!(
        "insight-loader: {} companies, db={}, dry_run={}, concurrency={}",
        total,
        config.database_url,
        args.dry_run,
        args.concurrency
    );

    let store = if args.dry_run {
        None
    } else {
        let db = InsightDb::new(&config.database_url)
            .await
            .with_context(|| format!("Failed to open database {}", config.database_url))?;
        Some(Arc::new(InsightStore::new(db)))
    };

    let client = Arc::new(CompanyClient::from_config(&config));
    let engine = Arc::new(InsightEngine::new(scoring));

    let succeeded = Arc::new(AtomicU64::new(0));
    let completed = Arc::new(AtomicU64::new(0));
    let semaphore = Arc::new(Semaphore::new(args.concurrency));

    let mut handles = Vec::with_capacity(total);

    for company_id in company_ids {
        let client = Arc::clone(&client);
        let engine = Arc::clone(&engine);
        let store = store.clone();
        let succeeded = Arc::clone(&succeeded);
        let completed = Arc::clone(&completed);
        let semaphore = Arc::clone(&semaphore);
        let dry_run = args.dry_run;

        let handle = tokio::spawn(async move {
            let Ok(_permit) = semaphore.acquire().await else {
                return;
            };

            let result = process_company(&client, &engine, store.as_deref(), &company_id).await;
            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;

            match result {
                Ok(insight) => {
                    succeeded.fetch_add(1, Ordering::Relaxed);
                    tracing::info!(
                        "[{}/{}] {} => {} pros, {} cons",
                        done,
                        total,
                        company_id,
                        insight.top_pros.len(),
                        insight.top_cons.len()
                    );
                    if dry_run {
                        match serde_json::to_string_pretty(&insight) {
                            Ok(json) => println!("{}", json),
                            Err(e) => tracing::warn!("Could not render {}: {}", company_id, e),
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("[{}/{}] {} failed: {:#}", done, total, company_id, e);
                }
            }
        });

        handles.push(handle);
    }

    for handle in handles {
        let _ = handle.await;
    }

    let ok = succeeded.load(Ordering::Relaxed);
    tracing::info!("Analysis complete");
    println!("Successfully processed: {}/{}", ok, total);
    Ok(())
}

/// Fetch, score and (unless `store` is `None`) save one company.
async fn process_company(
    client: &CompanyClient,
    engine: &InsightEngine,
    store: Option<&InsightStore>,
    company_id: &str,
) -> anyhow::Result<ScoredInsight> {
    let raw = match client.fetch_company_details(company_id).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!("Skipping {}: no data fetched", company_id);
            return Err(e.into());
        }
    };

    let mut insight = engine.score(&raw);
    if insight.company_id.trim().is_empty() {
        insight.company_id = company_id.to_string();
    }

    if let Some(store) = store {
        store
            .save_analysis(&insight)
            .await
            .with_context(|| format!("Failed to save insight for {}", company_id))?;
    }

    Ok(insight)
}
