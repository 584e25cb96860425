use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::notification::{Notification, NotificationCategory};
use crate::state::AppState;
use crate::store::Database;

/// One message for the best-effort email channel.
#[derive(Debug, Clone)]
pub struct EmailJob {
    pub user_id: Uuid,
    pub subject: String,
    pub body: String,
}

/// Appends the notification row. Called while the caller still holds the
/// write guard, so the row commits (or aborts) with the rest of the unit.
pub fn record(
    db: &mut Database,
    user_id: Uuid,
    category: NotificationCategory,
    title: impl Into<String>,
    message: impl Into<String>,
    payload: serde_json::Value,
    now: DateTime<Utc>,
) -> Notification {
    let notification = Notification {
        id: Uuid::new_v4(),
        user_id,
        category,
        title: title.into(),
        message: message.into(),
        payload,
        is_read: false,
        created_at: now,
    };

    db.notifications.push(notification.clone());
    notification
}

/// Fan-out after the commit: real-time push over the broadcast channel and
/// a queued email per notification. Both channels are best-effort; a
/// failure is logged and never surfaced to the lifecycle caller.
pub fn dispatch(state: &AppState, notifications: &[Notification]) {
    for notification in notifications {
        let _ = state.notification_events_tx.send(notification.clone());

        let job = EmailJob {
            user_id: notification.user_id,
            subject: notification.title.clone(),
            body: notification.message.clone(),
        };

        match state.email_tx.try_send(job) {
            Ok(()) => state.metrics.emails_in_queue.inc(),
            Err(err) => {
                warn!(user_id = %notification.user_id, error = %err, "email queue rejected job");
            }
        }
    }
}

/// Background delivery worker. Hands each job to the external email
/// collaborator; delivery is fire-and-forget from the engine's point of
/// view.
pub async fn run_email_worker(state: Arc<AppState>, mut email_rx: mpsc::Receiver<EmailJob>) {
    info!("email worker started");

    while let Some(job) = email_rx.recv().await {
        state.metrics.emails_in_queue.dec();
        info!(user_id = %job.user_id, subject = %job.subject, "email handed to delivery");
    }

    warn!("email worker stopped: queue channel closed");
}
