use dashmap::DashMap;
use tokio::sync::{RwLock, broadcast, mpsc};
use uuid::Uuid;

use crate::models::notification::Notification;
use crate::models::user::User;
use crate::notify::EmailJob;
use crate::observability::metrics::Metrics;
use crate::store::Database;

pub struct AppState {
    /// Actor registry; not part of any atomic commit.
    pub users: DashMap<Uuid, User>,
    /// All transactional tables behind one lock (see `store::Database`).
    pub db: RwLock<Database>,
    pub notification_events_tx: broadcast::Sender<Notification>,
    pub email_tx: mpsc::Sender<EmailJob>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        email_queue_size: usize,
        event_buffer_size: usize,
    ) -> (Self, mpsc::Receiver<EmailJob>) {
        let (email_tx, email_rx) = mpsc::channel(email_queue_size);
        let (notification_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        (
            Self {
                users: DashMap::new(),
                db: RwLock::new(Database::new()),
                notification_events_tx,
                email_tx,
                metrics: Metrics::new(),
            },
            email_rx,
        )
    }
}
