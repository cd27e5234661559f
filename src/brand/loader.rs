//! Taxonomy CSV loading.

use std::path::Path;

use csv::ReaderBuilder;
use log::{info, warn};

use super::BrandIndex;
use crate::error_handling::{ProcessingStats, TaxonomyError, WarningType};
use crate::models::BrandMatch;
use crate::site::TaxonomySpec;

fn column(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

/// Loads a taxonomy file into a [`BrandIndex`].
///
/// Every configured key column of a row is registered for that row's brand.
/// With a key separator (e.g. `'|'`), only the part before it is the key, so
/// `올 뉴K3|(18~21년)` is indexed as `올 뉴K3`. With a model group column
/// configured, a blank group is stored as `-`.
///
/// # Errors
///
/// Returns `TaxonomyError` if the file cannot be read, is not valid CSV, or
/// lacks the brand-name column or every key column.
pub fn load_index(path: &Path, spec: &TaxonomySpec) -> Result<BrandIndex, TaxonomyError> {
    let mut reader = ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let brand_name = column(&headers, spec.brand_name_column)
        .ok_or_else(|| TaxonomyError::MissingColumn(spec.brand_name_column.to_string()))?;
    let brand_id = spec.brand_id_column.and_then(|c| column(&headers, c));
    let model_group = spec.model_group_column.map(|c| column(&headers, c));
    let keys: Vec<usize> = spec
        .key_columns
        .iter()
        .filter_map(|c| column(&headers, c))
        .collect();
    if keys.is_empty() {
        return Err(TaxonomyError::MissingColumn(spec.key_columns.join("/")));
    }

    let mut index = BrandIndex::new();
    for record in reader.records() {
        let record = record?;
        let cell = |i: usize| record.get(i).unwrap_or("").trim();
        let group = match model_group {
            Some(position) => match position.map(cell).unwrap_or("") {
                "" => "-",
                g => g,
            },
            None => "",
        };
        let brand = BrandMatch {
            brand_id: brand_id.map(cell).unwrap_or("").to_string(),
            brand_name: cell(brand_name).to_string(),
            model_group: group.to_string(),
        };
        if brand.brand_name.is_empty() {
            continue;
        }
        for &key_column in &keys {
            let raw = cell(key_column);
            let key = match spec.key_separator {
                Some(sep) => raw.split(sep).next().unwrap_or(""),
                None => raw,
            };
            index.insert(key, brand.clone());
        }
    }
    Ok(index)
}

/// Loads the taxonomy, degrading to an empty index when it is unavailable.
///
/// A missing or unreadable file is logged as a warning and counted; the run
/// then proceeds with every brand left blank.
pub fn load_index_or_empty(
    path: &Path,
    spec: &TaxonomySpec,
    stats: &ProcessingStats,
) -> BrandIndex {
    if !path.exists() {
        warn!(
            "Taxonomy file not found: {} (brand columns will be empty)",
            path.display()
        );
        stats.increment_warning(WarningType::TaxonomyMissing);
        return BrandIndex::new();
    }
    match load_index(path, spec) {
        Ok(index) => {
            info!(
                "Loaded {} model keys from taxonomy {}",
                index.len(),
                path.display()
            );
            index
        }
        Err(e) => {
            warn!("Failed to load taxonomy {}: {}", path.display(), e);
            stats.increment_warning(WarningType::TaxonomyMissing);
            BrandIndex::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brand::MatchStrategy;
    use crate::site::TaxonomySource;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SPEC: TaxonomySpec = TaxonomySpec {
        source: TaxonomySource::CarMetaApi,
        file_name: "brand_list.csv",
        key_columns: &["model_name", "model_group_name"],
        brand_id_column: Some("brand_id"),
        brand_name_column: "brand_name",
        model_group_column: None,
        key_separator: None,
        strategies: &[MatchStrategy::Exact],
    };

    fn write(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write");
        file
    }

    #[test]
    fn test_load_with_bom_and_group_keys() {
        let file = write(
            "\u{feff}brand_id,brand_name,model_group_id,model_group_name,model_name\n\
             vw,폭스바겐,g1,파사트,파사트GT(B8)\n",
        );
        let index = load_index(file.path(), &SPEC).expect("load");
        assert_eq!(index.model("파사트GT(B8)").unwrap().brand_id, "vw");
        assert_eq!(index.model("파사트").unwrap().brand_name, "폭스바겐");
        assert_eq!(index.brand("폭스바겐").unwrap().brand_id, "vw");
    }

    #[test]
    fn test_key_separator() {
        let spec = TaxonomySpec {
            key_columns: &["model_list"],
            brand_id_column: None,
            brand_name_column: "brand_list",
            model_group_column: Some("car_list"),
            key_separator: Some('|'),
            ..SPEC
        };
        let file = write(
            "brand_list,model_list,car_list\n\
             기아,올 뉴K3|(18~21년),K3\n\
             기아,모닝,\n\
             ,무명|x,\n",
        );
        let index = load_index(file.path(), &spec).expect("load");
        assert_eq!(index.model("올 뉴K3").unwrap().brand_name, "기아");
        assert_eq!(index.model("올 뉴K3").unwrap().brand_id, "");
        assert_eq!(index.model("올 뉴K3").unwrap().model_group, "K3");
        assert_eq!(index.model("모닝").unwrap().model_group, "-");
        // rows without a brand are dropped
        assert!(index.model("무명").is_none());
    }

    #[test]
    fn test_missing_brand_column() {
        let file = write("foo,model_name\n1,2\n");
        let err = load_index(file.path(), &SPEC).unwrap_err();
        assert!(matches!(err, TaxonomyError::MissingColumn(c) if c == "brand_name"));
    }

    #[test]
    fn test_missing_file_degrades() {
        let stats = ProcessingStats::new();
        let index = load_index_or_empty(Path::new("/nonexistent/brand_list.csv"), &SPEC, &stats);
        assert!(index.is_empty());
        assert_eq!(stats.get_warning_count(WarningType::TaxonomyMissing), 1);
    }
}
