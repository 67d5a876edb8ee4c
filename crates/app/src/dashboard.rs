//! Statistics dashboard loader

use taskdeck_core::{DashboardCharts, ProgressView};
use taskdeck_net::{Api, CancellationToken};
use tracing::{debug, instrument};

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardData {
    pub progress: ProgressView,
    pub charts: DashboardCharts,
}

/// Fetch the four stat endpoints concurrently and shape them for display
///
/// The first failure aborts the rest and is returned unchanged.
#[instrument(skip_all)]
pub async fn load_dashboard(
    api: &Api,
    cancel: &CancellationToken,
) -> taskdeck_net::Result<DashboardData> {
    let tasks = api.tasks();
    let (stats, status, priority, new_tasks) = tokio::try_join!(
        tasks.stats(cancel),
        tasks.status_stats(cancel),
        tasks.priority_stats(cancel),
        tasks.new_tasks_stats(cancel),
    )?;

    debug!(
        total = stats.total_count,
        buckets = status.len(),
        "Dashboard stats loaded"
    );

    Ok(DashboardData {
        progress: ProgressView::from(stats),
        charts: DashboardCharts::shape(&status, &priority, &new_tasks),
    })
}
