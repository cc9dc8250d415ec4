use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event published when a work item reaches its terminal status. Dispatch is
/// best-effort: the state transition commits before, or regardless of,
/// delivery, and notifier failures are logged and swallowed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryNotice {
    pub work_item_id: Uuid,
    pub recipient: Option<String>,
    pub pickup_address: String,
    pub dropoff_address: String,
    pub price_kes: i64,
    pub kind: NoticeKind,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    OrderDelivered,
    RelocationCompleted,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        notice: &DeliveryNotice,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Default notifier: renders the message and logs it. The real email
/// collaborator lives outside the engine; this keeps the contract exercised
/// in development and tests.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(
        &self,
        notice: &DeliveryNotice,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let recipient = notice.recipient.as_deref().unwrap_or("<no recipient>");
        tracing::info!(
            work_item_id = %notice.work_item_id,
            recipient,
            kind = ?notice.kind,
            "work item reached terminal status: {} -> {} (KES {})",
            notice.pickup_address,
            notice.dropoff_address,
            notice.price_kes,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_notifier_accepts_notice_without_recipient() {
        let notice = DeliveryNotice {
            work_item_id: Uuid::new_v4(),
            recipient: None,
            pickup_address: "Westlands".into(),
            dropoff_address: "Kilimani".into(),
            price_kes: 400,
            kind: NoticeKind::OrderDelivered,
        };
        assert!(LogNotifier.send(&notice).await.is_ok());
    }
}
