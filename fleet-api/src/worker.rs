use std::sync::Arc;

use fleet_core::notify::{DeliveryNotice, Notifier};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Consumes terminal-transition notices off the in-process queue and hands
/// them to the notifier. State transitions commit before, or regardless of,
/// delivery; a failed send is logged and dropped, never retried into the
/// request path.
pub fn spawn_notifier(
    mut rx: mpsc::Receiver<DeliveryNotice>,
    notifier: Arc<dyn Notifier>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Notification dispatcher started");
        while let Some(notice) = rx.recv().await {
            if let Err(err) = notifier.send(&notice).await {
                error!(
                    work_item_id = %notice.work_item_id,
                    error = %err,
                    "failed to deliver notification"
                );
            }
        }
        info!("Notification dispatcher stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use fleet_core::notify::NoticeKind;
    use std::sync::Mutex;
    use uuid::Uuid;

    struct RecordingNotifier {
        sent: Mutex<Vec<Uuid>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(
            &self,
            notice: &DeliveryNotice,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.sent.lock().unwrap().push(notice.work_item_id);
            Ok(())
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn send(
            &self,
            _notice: &DeliveryNotice,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            Err("smtp unreachable".into())
        }
    }

    fn notice(id: Uuid) -> DeliveryNotice {
        DeliveryNotice {
            work_item_id: id,
            recipient: Some("client-1".into()),
            pickup_address: "Westlands".into(),
            dropoff_address: "Kilimani".into(),
            price_kes: 400,
            kind: NoticeKind::OrderDelivered,
        }
    }

    #[tokio::test]
    async fn dispatches_queued_notices_in_order() {
        let (tx, rx) = mpsc::channel(8);
        let notifier = Arc::new(RecordingNotifier {
            sent: Mutex::new(Vec::new()),
        });
        let handle = spawn_notifier(rx, notifier.clone());

        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        tx.send(notice(first)).await.unwrap();
        tx.send(notice(second)).await.unwrap();
        drop(tx);
        handle.await.unwrap();

        assert_eq!(*notifier.sent.lock().unwrap(), vec![first, second]);
    }

    #[tokio::test]
    async fn notifier_failures_do_not_stop_the_dispatcher() {
        let (tx, rx) = mpsc::channel(8);
        let handle = spawn_notifier(rx, Arc::new(FailingNotifier));

        tx.send(notice(Uuid::new_v4())).await.unwrap();
        tx.send(notice(Uuid::new_v4())).await.unwrap();
        drop(tx);
        // The task drains the queue and exits cleanly despite the failures.
        handle.await.unwrap();
    }
}
