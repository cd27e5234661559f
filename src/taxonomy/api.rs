//! Taxonomy from the heydealer car-meta API.
//!
//! Walks the API three levels deep (brands, model groups, models). Only the
//! brand list is required; a brand or model group whose request fails is
//! skipped.

use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio_retry::Retry;

use super::TaxonomyReport;
use crate::config::TAXONOMY_BRAND_PAUSE;
use crate::error_handling::{api_retry_strategy, TaxonomyError};
use crate::export::write_table;
use crate::models::{Row, Timestamps};

/// Default car-meta API root.
pub const HEYDEALER_CAR_META_API: &str =
    "https://api.heydealer.com/v2/customers/web/market/car_meta";

/// Column order of the taxonomy file.
pub const TAXONOMY_COLUMNS: &[&str] = &[
    "brand_id",
    "brand_name",
    "model_group_id",
    "model_group_name",
    "model_id",
    "model_name",
    "model_count",
    "production_period",
    "date_crtr_pnttm",
    "create_dt",
];

#[derive(Debug, Deserialize)]
struct Brand {
    #[serde(default)]
    hash_id: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct BrandDetail {
    #[serde(default)]
    model_groups: Vec<ModelGroup>,
}

#[derive(Debug, Deserialize)]
struct ModelGroup {
    #[serde(default)]
    hash_id: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct ModelGroupDetail {
    #[serde(default)]
    models: Vec<Model>,
}

#[derive(Debug, Deserialize)]
struct Model {
    #[serde(default)]
    hash_id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    count: Option<u64>,
    #[serde(default)]
    period: Option<String>,
}

/// GETs `url` as JSON. Transport errors are retried; a non-success status is
/// returned as `TaxonomyError::Status` without retrying.
async fn fetch_json<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T, TaxonomyError> {
    let response = Retry::spawn(api_retry_strategy(), || {
        client.get(url).header(ACCEPT, "application/json").send()
    })
    .await?;
    if !response.status().is_success() {
        return Err(TaxonomyError::Status(response.status().as_u16()));
    }
    Ok(response.json::<T>().await?)
}

/// Collects the taxonomy and writes it to `path`, replacing any previous file.
///
/// # Errors
///
/// Fails when the brand list cannot be fetched or the file cannot be written.
pub async fn collect_taxonomy(
    client: &Client,
    api_base: &str,
    path: &Path,
) -> Result<TaxonomyReport> {
    let api_base = api_base.trim_end_matches('/');
    let stamp = Timestamps::now();

    let brands: Vec<Brand> = fetch_json(client, &format!("{api_base}/brands/"))
        .await
        .with_context(|| format!("could not fetch brand list from {api_base}"))?;
    info!("Collecting taxonomy for {} brands", brands.len());

    let mut report = TaxonomyReport {
        brands: brands.len(),
        model_groups: 0,
        models: 0,
        skipped_requests: 0,
        path: path.to_path_buf(),
    };
    let mut rows: Vec<Row> = Vec::new();

    for (i, brand) in brands.iter().enumerate() {
        info!("[{}/{}] brand: {}", i + 1, brands.len(), brand.name);
        let detail: BrandDetail =
            match fetch_json(client, &format!("{api_base}/brands/{}/", brand.hash_id)).await {
                Ok(detail) => detail,
                Err(e) => {
                    warn!("Skipping brand {}: {}", brand.name, e);
                    report.skipped_requests += 1;
                    continue;
                }
            };

        for group in &detail.model_groups {
            report.model_groups += 1;
            let models: ModelGroupDetail = match fetch_json(
                client,
                &format!("{api_base}/model_groups/{}/", group.hash_id),
            )
            .await
            {
                Ok(models) => models,
                Err(e) => {
                    warn!("Skipping model group {}: {}", group.name, e);
                    report.skipped_requests += 1;
                    continue;
                }
            };
            for model in &models.models {
                rows.push(Row::from([
                    ("brand_id".to_string(), brand.hash_id.clone()),
                    ("brand_name".to_string(), brand.name.clone()),
                    ("model_group_id".to_string(), group.hash_id.clone()),
                    ("model_group_name".to_string(), group.name.clone()),
                    ("model_id".to_string(), model.hash_id.clone()),
                    ("model_name".to_string(), model.name.clone()),
                    (
                        "model_count".to_string(),
                        model.count.unwrap_or(0).to_string(),
                    ),
                    (
                        "production_period".to_string(),
                        model.period.clone().unwrap_or_default(),
                    ),
                    ("date_crtr_pnttm".to_string(), stamp.date.clone()),
                    ("create_dt".to_string(), stamp.minute.clone()),
                ]));
            }
        }
        tokio::time::sleep(TAXONOMY_BRAND_PAUSE).await;
    }

    if rows.is_empty() {
        warn!("No models collected; {} left untouched", path.display());
        return Ok(report);
    }
    report.models = write_table(path, TAXONOMY_COLUMNS, &rows, true)
        .with_context(|| format!("could not write {}", path.display()))?;
    info!(
        "Taxonomy written: {} models from {} brands to {}",
        report.models,
        report.brands,
        path.display()
    );
    Ok(report)
}
