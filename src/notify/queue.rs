//! Bounded notification queue and its background worker.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info, warn};

use super::{LeaveDecisionNotification, Notifier};

/// Sending half of the notification channel.
///
/// Enqueueing never waits: when the queue is full or the worker has stopped,
/// the message is dropped and a warning is logged.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    tx: mpsc::Sender<LeaveDecisionNotification>,
}

impl NotificationQueue {
    /// Creates a queue holding at most `capacity` undelivered messages.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<LeaveDecisionNotification>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Enqueues a notification. Returns false if it was dropped.
    pub fn enqueue(&self, notification: LeaveDecisionNotification) -> bool {
        match self.tx.try_send(notification) {
            Ok(()) => true,
            Err(TrySendError::Full(dropped)) => {
                warn!(
                    employee_code = %dropped.employee_id,
                    status = %dropped.status,
                    "Notification queue full, dropping leave decision notification"
                );
                false
            }
            Err(TrySendError::Closed(dropped)) => {
                warn!(
                    employee_code = %dropped.employee_id,
                    status = %dropped.status,
                    "Notification worker stopped, dropping leave decision notification"
                );
                false
            }
        }
    }
}

/// Drains the notification channel and hands each message to a [`Notifier`].
pub struct NotificationWorker {
    notifier: Arc<dyn Notifier>,
}

impl NotificationWorker {
    /// Creates a worker delivering through `notifier`.
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Runs until every sender is dropped.
    pub async fn run(self, mut rx: mpsc::Receiver<LeaveDecisionNotification>) {
        info!("Notification worker started");

        while let Some(notification) = rx.recv().await {
            match self.notifier.notify(&notification).await {
                Ok(()) => {
                    debug!(
                        employee_code = %notification.employee_id,
                        status = %notification.status,
                        "Notification delivered"
                    );
                }
                Err(e) => {
                    error!(
                        employee_code = %notification.employee_id,
                        error = %e,
                        "Failed to deliver leave decision notification"
                    );
                }
            }
        }

        info!("Notification channel closed, worker stopping");
    }
}
