//! Statistics printing.

use log::info;
use strum::IntoEnumIterator;

use crate::error_handling::{ErrorType, InfoType, ProcessingStats, WarningType};

/// Formats the detail-stage success ratio, e.g. `detail success 9/10 (90.0%)`.
///
/// An empty stage reports `0/0 (0.0%)`.
pub fn detail_success_summary(success: usize, total: usize) -> String {
    let pct = if total == 0 {
        0.0
    } else {
        success as f64 * 100.0 / total as f64
    };
    format!("detail success {}/{} ({:.1}%)", success, total, pct)
}

/// Prints a one-line summary of the run.
pub fn print_run_summary(listed: usize, detail_rows: usize, images: usize, elapsed_seconds: f64) {
    info!(
        "✅ Collected {} listing{} and {} detail row{} ({} image{}) in {:.1}s",
        listed,
        if listed == 1 { "" } else { "s" },
        detail_rows,
        if detail_rows == 1 { "" } else { "s" },
        images,
        if images == 1 { "" } else { "s" },
        elapsed_seconds
    );
}

/// Prints error, warning, and info statistics to the log.
pub fn print_error_statistics(error_stats: &ProcessingStats) {
    let total_errors = error_stats.total_errors();
    let total_warnings = error_stats.total_warnings();
    let total_info = error_stats.total_info();

    if total_errors > 0 {
        info!("Error Counts ({} total):", total_errors);
        for error_type in ErrorType::iter() {
            let count = error_stats.get_error_count(error_type);
            if count > 0 {
                info!("   {}: {}", error_type.as_str(), count);
            }
        }
    }

    if total_warnings > 0 {
        info!("Warning Counts ({} total):", total_warnings);
        for warning_type in WarningType::iter() {
            let count = error_stats.get_warning_count(warning_type);
            if count > 0 {
                info!("   {}: {}", warning_type.as_str(), count);
            }
        }
    }

    if total_info > 0 {
        info!("Info Counts ({} total):", total_info);
        for info_type in InfoType::iter() {
            let count = error_stats.get_info_count(info_type);
            if count > 0 {
                info!("   {}: {}", info_type.as_str(), count);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_success_summary() {
        assert_eq!(detail_success_summary(9, 10), "detail success 9/10 (90.0%)");
        assert_eq!(detail_success_summary(1, 3), "detail success 1/3 (33.3%)");
        assert_eq!(detail_success_summary(0, 0), "detail success 0/0 (0.0%)");
    }

    #[test]
    fn test_print_error_statistics_no_errors() {
        let stats = ProcessingStats::new();
        // Should not panic when there are no errors
        print_error_statistics(&stats);
    }

    #[test]
    fn test_print_error_statistics_all_types() {
        let stats = ProcessingStats::new();
        stats.increment_error(ErrorType::DetailExhausted);
        stats.increment_warning(WarningType::ImageDownload);
        stats.increment_info(InfoType::DetailReload);
        print_error_statistics(&stats);
    }

    #[test]
    fn test_print_run_summary() {
        print_run_summary(1, 1, 0, 0.5);
        print_run_summary(12, 10, 80, 321.0);
    }
}
