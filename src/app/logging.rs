//! Progress logging utilities.

use log::info;

/// Logs listing progress for one partition.
///
/// # Arguments
///
/// * `partition` - Partition label (`"전체"` when the listing is not partitioned)
/// * `collected` - Items collected in this partition
/// * `target` - Per-partition target, if any
/// * `total` - Items collected across every partition so far
pub fn log_list_progress(partition: &str, collected: usize, target: Option<usize>, total: usize) {
    match target {
        Some(target) => info!(
            "list collection [{}]: {}/{} (total {})",
            partition, collected, target, total
        ),
        None => info!(
            "list collection [{}]: {} (total {})",
            partition, collected, total
        ),
    }
}

/// Logs the start of one detail visit.
pub fn log_detail_progress(index: usize, total: usize, code: &str) {
    info!("({}/{}) detail: {}", index, total, code);
}
