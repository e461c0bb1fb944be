//! # テスト用モック送信実装
//!
//! ディスパッチャーのテストで使用するインメモリモック。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! trampolin-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use trampolin_domain::notification::{DeliveryResult, EmailMessage, NotificationError};

use crate::notification::NotificationSender;

// ===== MockNotificationSender =====

/// 送信されたメールを記録するモック送信実装
///
/// 常に成功を返し、渡された `EmailMessage` を記録する。
/// テストは `sent_emails()` で送信内容を検証する。
#[derive(Clone, Default)]
pub struct MockNotificationSender {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
}

impl MockNotificationSender {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// これまでに送信されたメールのスナップショットを返す
    pub fn sent_emails(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSender for MockNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<DeliveryResult, NotificationError> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(DeliveryResult {
            success:    true,
            message_id: Some("mock".to_string()),
        })
    }
}

// ===== FailingNotificationSender =====

/// 常に `SendFailed` を返すモック送信実装
///
/// 管理者通知の握りつぶし（suppression）テストで使用する。
#[derive(Clone, Default)]
pub struct FailingNotificationSender {
    attempts: Arc<Mutex<u32>>,
}

impl FailingNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// 送信が試行された回数を返す
    pub fn attempts(&self) -> u32 {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl NotificationSender for FailingNotificationSender {
    async fn send_email(&self, _email: &EmailMessage) -> Result<DeliveryResult, NotificationError> {
        *self.attempts.lock().unwrap() += 1;
        Err(NotificationError::SendFailed(
            "モック送信エラー".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_email() -> EmailMessage {
        EmailMessage {
            to:        vec!["test@example.com".to_string()],
            subject:   "テスト".to_string(),
            html_body: "<p>テスト</p>".to_string(),
            text_body: "テスト".to_string(),
            reply_to:  None,
            headers:   vec![],
        }
    }

    #[tokio::test]
    async fn mock_は送信メッセージを記録する() {
        let sender = MockNotificationSender::new();

        let result = sender.send_email(&make_email()).await.unwrap();

        assert!(result.success);
        let sent = sender.sent_emails();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "テスト");
    }

    #[tokio::test]
    async fn failing_は常にsend_failedを返す() {
        let sender = FailingNotificationSender::new();

        let result = sender.send_email(&make_email()).await;

        assert!(matches!(result, Err(NotificationError::SendFailed(_))));
        assert_eq!(sender.attempts(), 1);
    }
}
