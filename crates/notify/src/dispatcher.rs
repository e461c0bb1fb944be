//! # 通知ディスパッチャー
//!
//! レート制限 → テンプレートレンダリング → メール送信を統合する公開 API。
//!
//! ## 設計方針
//!
//! - **カテゴリごとに 1 操作**: 新カテゴリ追加時に公開面の漏れがコンパイルで見える
//! - **エラー伝搬はカテゴリ依存**: welcome / subscription / password_reset / general は
//!   呼び出し元にエラーを返す。親の業務処理を失敗させるかは呼び出し元の判断
//!   （例: ウェルカムメール失敗でサインアップを失敗させない）
//! - **管理者通知は best-effort**: `notify_admins()` は決してエラーを返さず、
//!   失敗は握りつぶしてログと失敗カウンタに記録する
//! - **リトライなし**: 送信失敗はその呼び出しの終端。1 回試行のみ

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use trampolin_domain::notification::{
    AdminAlertNotification,
    DeliveryResult,
    GeneralNotification,
    Notification,
    NotificationError,
    PasswordResetNotification,
    SubscriptionNotification,
    WelcomeNotification,
};
use trampolin_infra::notification::NotificationSender;
use trampolin_shared::{event_log::event, log_business_event};

use crate::{config::NotifyConfig, rate_limit::RateLimiter, template_renderer::TemplateRenderer};

/// 管理者通知のレート制限識別子
///
/// 宛先一覧は設定由来のため、受信者ではなくカテゴリ全体で 1 枠を共有する。
const ADMIN_RATE_IDENTIFIER: &str = "admins";

/// 通知ディスパッチャー
///
/// レート制限テーブルを明示的に所有する（モジュールレベルのシングルトンにしない）。
/// テストでのリセットは新しいインスタンスの構築で行う。
pub struct NotificationDispatcher {
    sender: Arc<dyn NotificationSender>,
    template_renderer: TemplateRenderer,
    rate_limiter: RateLimiter,
    config: NotifyConfig,
    suppressed_admin_failures: AtomicU64,
}

impl NotificationDispatcher {
    pub fn new(
        sender: Arc<dyn NotificationSender>,
        template_renderer: TemplateRenderer,
        rate_limiter: RateLimiter,
        config: NotifyConfig,
    ) -> Self {
        Self {
            sender,
            template_renderer,
            rate_limiter,
            config,
            suppressed_admin_failures: AtomicU64::new(0),
        }
    }

    /// ウェルカムメールを送信する
    pub async fn send_welcome(
        &self,
        notification: WelcomeNotification,
    ) -> Result<DeliveryResult, NotificationError> {
        self.dispatch(notification.into()).await
    }

    /// サブスクリプション通知を送信する
    pub async fn send_subscription(
        &self,
        notification: SubscriptionNotification,
    ) -> Result<DeliveryResult, NotificationError> {
        self.dispatch(notification.into()).await
    }

    /// パスワードリセットメールを送信する
    pub async fn send_password_reset(
        &self,
        notification: PasswordResetNotification,
    ) -> Result<DeliveryResult, NotificationError> {
        self.dispatch(notification.into()).await
    }

    /// 汎用通知を送信する
    pub async fn send_general(
        &self,
        notification: GeneralNotification,
    ) -> Result<DeliveryResult, NotificationError> {
        self.dispatch(notification.into()).await
    }

    /// 管理者通知を送信する（best-effort）
    ///
    /// レート制限・バリデーション・送信のいずれで失敗しても呼び出し元には
    /// 伝搬させず、ログ出力と失敗カウンタへの記録のみ行う。
    /// トリガー元の業務処理を決して妨げない。
    pub async fn notify_admins(&self, notification: AdminAlertNotification) -> DeliveryResult {
        match self.dispatch(notification.into()).await {
            Ok(result) => result,
            Err(e) => {
                let suppressed = self.suppressed_admin_failures.fetch_add(1, Ordering::Relaxed) + 1;
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_SUPPRESSED,
                    event.result = event::result::FAILURE,
                    notification.event_type = "admin_alert",
                    notification.suppressed_total = suppressed,
                    error = %e,
                    "管理者通知の失敗を握りつぶしました"
                );
                DeliveryResult {
                    success:    false,
                    message_id: None,
                }
            }
        }
    }

    /// これまでに握りつぶした管理者通知の失敗数を返す
    ///
    /// エスカレーション（一定数超過でページング等）の判断材料として公開する。
    /// 閾値を設けるかどうかはプロダクト判断であり、本基盤では数えるだけに留める。
    pub fn suppressed_admin_failures(&self) -> u64 {
        self.suppressed_admin_failures.load(Ordering::Relaxed)
    }

    /// 共通のディスパッチフロー
    ///
    /// レート制限チェック → レンダリング（バリデーション込み） → 送信。
    /// ブロック時はレート制限の状態以外に副作用を残さない。
    async fn dispatch(
        &self,
        notification: Notification,
    ) -> Result<DeliveryResult, NotificationError> {
        let category = notification.category();
        let category_str: &str = category.into();
        let identifier = notification
            .recipient_email()
            .unwrap_or(ADMIN_RATE_IDENTIFIER)
            .to_string();

        if !self.rate_limiter.check_and_consume(category, &identifier) {
            log_business_event!(
                event.category = event::category::NOTIFICATION,
                event.action = event::action::NOTIFICATION_RATE_LIMITED,
                event.result = event::result::FAILURE,
                notification.event_type = category_str,
                notification.recipient = %identifier,
                "レート制限により通知をブロック"
            );
            return Err(NotificationError::RateLimited { category });
        }

        // レンダリングはバリデーションを含み、送信前に fail-fast する
        let email = self.template_renderer.render(&notification, &self.config)?;

        match self.sender.send_email(&email).await {
            Ok(result) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_SENT,
                    event.result = event::result::SUCCESS,
                    notification.event_type = category_str,
                    notification.recipient = email.to.join(", "),
                    notification.message_id = result.message_id.as_deref().unwrap_or(""),
                    "通知メール送信成功"
                );
                Ok(result)
            }
            Err(e) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_FAILED,
                    event.result = event::result::FAILURE,
                    notification.event_type = category_str,
                    notification.recipient = email.to.join(", "),
                    error = %e,
                    "通知メール送信失敗"
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use trampolin_domain::clock::AdjustableClock;
    use trampolin_infra::mock::{FailingNotificationSender, MockNotificationSender};

    use super::*;
    use crate::config::NotifyBackend;

    fn make_config() -> NotifyConfig {
        NotifyConfig {
            backend: NotifyBackend::Noop,
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            from_address: "noreply@trampolin.example".to_string(),
            reply_to_address: None,
            admin_recipients: vec!["admin@trampolin.example".to_string()],
            base_url: "https://app.trampolin.example".to_string(),
        }
    }

    fn make_dispatcher(sender: Arc<dyn NotificationSender>) -> NotificationDispatcher {
        let clock = Arc::new(AdjustableClock::new(
            Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0).unwrap(),
        ));
        NotificationDispatcher::new(
            sender,
            TemplateRenderer::new().unwrap(),
            RateLimiter::new(clock),
            make_config(),
        )
    }

    fn make_welcome() -> WelcomeNotification {
        WelcomeNotification {
            user_name:     "Ada".to_string(),
            user_email:    "ada@example.com".to_string(),
            dashboard_url: "https://app.trampolin.example/dashboard".to_string(),
        }
    }

    #[tokio::test]
    async fn send_welcome_はレンダリング結果を送信する() {
        let sender = MockNotificationSender::new();
        let dispatcher = make_dispatcher(Arc::new(sender.clone()));

        let result = dispatcher.send_welcome(make_welcome()).await.unwrap();

        assert!(result.success);
        let sent = sender.sent_emails();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, vec!["ada@example.com".to_string()]);
        assert_eq!(sent[0].subject, "[Trampolin] ようこそ Trampolin へ");
    }

    #[tokio::test]
    async fn 同一ウィンドウ内の2通目はレート制限エラーになる() {
        let sender = MockNotificationSender::new();
        let dispatcher = make_dispatcher(Arc::new(sender.clone()));

        dispatcher.send_welcome(make_welcome()).await.unwrap();
        let second = dispatcher.send_welcome(make_welcome()).await;

        assert!(matches!(
            second,
            Err(NotificationError::RateLimited { category })
                if category == trampolin_domain::notification::NotificationCategory::Welcome
        ));
        // ブロックされた分は送信されていない
        assert_eq!(sender.sent_emails().len(), 1);
    }

    #[tokio::test]
    async fn バリデーション失敗時は送信が試行されない() {
        let sender = MockNotificationSender::new();
        let dispatcher = make_dispatcher(Arc::new(sender.clone()));
        let mut broken = make_welcome();
        broken.user_name = String::new();

        let result = dispatcher.send_welcome(broken).await;

        assert!(matches!(result, Err(NotificationError::Validation(_))));
        assert_eq!(sender.sent_emails().len(), 0);
    }

    #[tokio::test]
    async fn notify_admins_は送信失敗を握りつぶす() {
        let sender = FailingNotificationSender::new();
        let dispatcher = make_dispatcher(Arc::new(sender.clone()));

        let result = dispatcher
            .notify_admins(AdminAlertNotification {
                subject: "決済失敗".to_string(),
                message: "ユーザーの決済が失敗しました".to_string(),
                details: vec![],
            })
            .await;

        assert!(!result.success);
        assert_eq!(sender.attempts(), 1);
        assert_eq!(dispatcher.suppressed_admin_failures(), 1);
    }

    #[tokio::test]
    async fn send_welcome_は送信失敗を呼び出し元へ伝搬する() {
        let sender = FailingNotificationSender::new();
        let dispatcher = make_dispatcher(Arc::new(sender));

        let result = dispatcher.send_welcome(make_welcome()).await;

        assert!(matches!(result, Err(NotificationError::SendFailed(_))));
    }
}
