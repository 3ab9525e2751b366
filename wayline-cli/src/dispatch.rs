//! Delivery fan-out for one scheduled update.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use wayline::ProgressRecord;

use crate::transport::address::Recipient;
use crate::transport::bridge::MessagingClient;

/// Pacing step between consecutive recipients.
///
/// The Nth recipient (zero-indexed) starts after `N * PACING_STEP`. The
/// schedule grows linearly with the list and has no upper bound; batch
/// latency is traded for staying under the transport's rate limits.
pub const PACING_STEP: Duration = Duration::from_millis(2000);

/// Delivery filename presented to recipients.
pub const IMAGE_FILENAME: &str = "journey-progress.png";

/// Outcome counts for one delivery batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Recipients that acknowledged delivery.
    pub sent: usize,
    /// Recipients whose delivery failed or timed out.
    pub failed: usize,
}

/// Start offset for the recipient at `index`.
pub fn pacing_delay(index: usize, step: Duration) -> Duration {
    step * index as u32
}

/// Multi-line message caption summarizing the record.
pub fn caption_for(record: &ProgressRecord) -> String {
    format!(
        "Journey update\n\nElapsed: {}\nRemaining: {}\nProgress: {:.1}%",
        record.elapsed, record.remaining, record.percent
    )
}

/// Fan one image out to every recipient.
///
/// Sends run as independent tasks with staggered starts; a failure in one
/// never cancels another, and every outcome is collected before the batch is
/// reported.
pub async fn dispatch<C: MessagingClient>(
    client: &Arc<C>,
    recipients: &[Recipient],
    image: Arc<Vec<u8>>,
    caption: &str,
    step: Duration,
) -> DispatchReport {
    let mut handles = Vec::with_capacity(recipients.len());
    for (index, recipient) in recipients.iter().cloned().enumerate() {
        let client = Arc::clone(client);
        let image = Arc::clone(&image);
        let caption = caption.to_string();
        handles.push(tokio::spawn(async move {
            let delay = pacing_delay(index, step);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            client
                .send_image(&recipient, &image, IMAGE_FILENAME, &caption)
                .await
                .map_err(|e| (recipient, e))
        }));
    }

    let mut report = DispatchReport::default();
    for handle in handles {
        match handle.await {
            Ok(Ok(())) => report.sent += 1,
            Ok(Err((recipient, e))) => {
                warn!(recipient = recipient.display(), error = %e, "delivery failed");
                report.failed += 1;
            }
            Err(e) => {
                warn!(error = %e, "delivery task panicked");
                report.failed += 1;
            }
        }
    }
    info!(
        sent = report.sent,
        failed = report.failed,
        "delivery batch finished"
    );
    report
}
