//! Noop 通知送信実装
//!
//! メールを実際に送信せず、ログ出力のみ行う。
//! プロバイダ未設定時・テスト環境で使用する。

use async_trait::async_trait;
use trampolin_domain::notification::{DeliveryResult, EmailMessage, NotificationError};

use super::NotificationSender;

/// Noop 通知送信（ログ出力のみ）
///
/// ネットワークアクセスは一切行わず、常に成功を返す。
/// `message_id` は `"mock"` 固定。
#[derive(Debug, Clone)]
pub struct NoopNotificationSender;

#[async_trait]
impl NotificationSender for NoopNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<DeliveryResult, NotificationError> {
        tracing::info!(
            to = email.to.join(", "),
            subject = %email.subject,
            "Noop: メール送信をスキップ"
        );
        Ok(DeliveryResult {
            success:    true,
            message_id: Some("mock".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_email() -> EmailMessage {
        EmailMessage {
            to:        vec!["test@example.com".to_string()],
            subject:   "テスト件名".to_string(),
            html_body: "<p>テスト</p>".to_string(),
            text_body: "テスト".to_string(),
            reply_to:  None,
            headers:   vec![("X-Email-Type".to_string(), "general".to_string())],
        }
    }

    #[tokio::test]
    async fn send_email_は合成成功とmock_idを返す() {
        let sender = NoopNotificationSender;

        let result = sender.send_email(&make_email()).await.unwrap();

        assert!(result.success);
        assert_eq!(result.message_id.as_deref(), Some("mock"));
    }
}
