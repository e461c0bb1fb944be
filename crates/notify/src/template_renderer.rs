//! # テンプレートレンダラー
//!
//! tera テンプレートエンジンで通知メールを HTML/plaintext 両形式で生成する。
//!
//! ## 設計方針
//!
//! - **`include_str!` によるコンパイル時埋め込み**: テンプレートはバイナリに埋め込まれる
//! - **共通スケルトン**: `base.html` / `base.txt` を継承し、ヘッダー・フッターを共有する
//! - **件名パターン**: `[Trampolin] {イベント種別}`
//! - **fail-fast**: レンダリング前に `Notification::validate()` を呼び、
//!   欠落ペイロードで不正なマークアップを生成しない
//! - **純粋関数**: 同じ（通知, 設定）からは常にバイト単位で同一の出力を生成する

use tera::{Context, Tera};
use trampolin_domain::notification::{
    EmailMessage,
    Notification,
    NotificationError,
    SubscriptionEvent,
    SubscriptionNotification,
};

use crate::config::NotifyConfig;

/// テンプレートレンダラー
///
/// tera テンプレートエンジンをラップし、`Notification` から
/// `EmailMessage` を生成する。
pub struct TemplateRenderer {
    engine: Tera,
}

impl TemplateRenderer {
    /// 新しいレンダラーインスタンスを作成
    ///
    /// `include_str!` で埋め込んだテンプレートを tera に登録する。
    pub fn new() -> Result<Self, NotificationError> {
        let mut engine = Tera::default();

        engine
            .add_raw_templates(vec![
                (
                    "base.html",
                    include_str!("../templates/notifications/base.html"),
                ),
                (
                    "base.txt",
                    include_str!("../templates/notifications/base.txt"),
                ),
                (
                    "welcome.html",
                    include_str!("../templates/notifications/welcome.html"),
                ),
                (
                    "welcome.txt",
                    include_str!("../templates/notifications/welcome.txt"),
                ),
                (
                    "subscription_new.html",
                    include_str!("../templates/notifications/subscription_new.html"),
                ),
                (
                    "subscription_new.txt",
                    include_str!("../templates/notifications/subscription_new.txt"),
                ),
                (
                    "subscription_renewed.html",
                    include_str!("../templates/notifications/subscription_renewed.html"),
                ),
                (
                    "subscription_renewed.txt",
                    include_str!("../templates/notifications/subscription_renewed.txt"),
                ),
                (
                    "subscription_cancelled.html",
                    include_str!("../templates/notifications/subscription_cancelled.html"),
                ),
                (
                    "subscription_cancelled.txt",
                    include_str!("../templates/notifications/subscription_cancelled.txt"),
                ),
                (
                    "subscription_payment_failed.html",
                    include_str!("../templates/notifications/subscription_payment_failed.html"),
                ),
                (
                    "subscription_payment_failed.txt",
                    include_str!("../templates/notifications/subscription_payment_failed.txt"),
                ),
                (
                    "password_reset.html",
                    include_str!("../templates/notifications/password_reset.html"),
                ),
                (
                    "password_reset.txt",
                    include_str!("../templates/notifications/password_reset.txt"),
                ),
                (
                    "admin_alert.html",
                    include_str!("../templates/notifications/admin_alert.html"),
                ),
                (
                    "admin_alert.txt",
                    include_str!("../templates/notifications/admin_alert.txt"),
                ),
                (
                    "general.html",
                    include_str!("../templates/notifications/general.html"),
                ),
                (
                    "general.txt",
                    include_str!("../templates/notifications/general.txt"),
                ),
            ])
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        Ok(Self { engine })
    }

    /// 通知ペイロードからメールメッセージを生成する
    ///
    /// ペイロードのバリデーションに失敗した場合、送信を試みる前に
    /// [`NotificationError::Validation`] で失敗する。
    pub fn render(
        &self,
        notification: &Notification,
        config: &NotifyConfig,
    ) -> Result<EmailMessage, NotificationError> {
        notification.validate()?;

        let to = match notification.recipient_email() {
            Some(email) => vec![email.to_string()],
            None => {
                if config.admin_recipients.is_empty() {
                    return Err(NotificationError::Validation(
                        "管理者宛先（admin_recipients）が設定されていません".to_string(),
                    ));
                }
                config.admin_recipients.clone()
            }
        };

        let (template_name, subject, context) = build_template_params(notification);

        let html_body = self
            .engine
            .render(&format!("{template_name}.html"), &context)
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        let text_body = self
            .engine
            .render(&format!("{template_name}.txt"), &context)
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        let category: &str = notification.category().into();
        let mut headers = vec![("X-Email-Type".to_string(), category.to_string())];
        if let Notification::Subscription(n) = notification {
            let event: &str = n.event.into();
            headers.push(("X-Subscription-Type".to_string(), event.to_string()));
        }

        Ok(EmailMessage {
            to,
            subject,
            html_body,
            text_body,
            reply_to: config.reply_to_address.clone(),
            headers,
        })
    }
}

/// テンプレート名、件名、コンテキストを構築する
fn build_template_params(notification: &Notification) -> (String, String, Context) {
    let mut context = Context::new();

    let (template_name, subject) = match notification {
        Notification::Welcome(n) => {
            context.insert("user_name", &n.user_name);
            context.insert("dashboard_url", &n.dashboard_url);
            (
                "welcome".to_string(),
                "[Trampolin] ようこそ Trampolin へ".to_string(),
            )
        }
        Notification::Subscription(n) => {
            context.insert("user_name", &n.user_name);
            context.insert("plan_name", &n.plan_name);
            context.insert("dashboard_url", &n.dashboard_url);
            if let Some(amount) = format_amount(n) {
                context.insert("amount", &amount);
            }
            if let Some(period_end) = &n.current_period_end {
                context.insert(
                    "current_period_end",
                    &period_end.format("%Y-%m-%d").to_string(),
                );
            }

            let plan_name = &n.plan_name;
            let (template_name, subject) = match n.event {
                SubscriptionEvent::New => (
                    "subscription_new",
                    format!("[Trampolin] ご契約ありがとうございます: {plan_name}"),
                ),
                SubscriptionEvent::Renewed => (
                    "subscription_renewed",
                    format!("[Trampolin] サブスクリプションを更新しました: {plan_name}"),
                ),
                SubscriptionEvent::Cancelled => (
                    "subscription_cancelled",
                    format!("[Trampolin] 解約を受け付けました: {plan_name}"),
                ),
                SubscriptionEvent::PaymentFailed => (
                    "subscription_payment_failed",
                    format!("[Trampolin] 決済に失敗しました: {plan_name}"),
                ),
            };
            (template_name.to_string(), subject)
        }
        Notification::PasswordReset(n) => {
            context.insert("user_name", &n.user_name);
            context.insert("reset_url", &n.reset_url);
            (
                "password_reset".to_string(),
                "[Trampolin] パスワードリセットのご案内".to_string(),
            )
        }
        Notification::AdminAlert(n) => {
            context.insert("subject", &n.subject);
            context.insert("message", &n.message);
            context.insert("details", &n.details);
            (
                "admin_alert".to_string(),
                format!("[Trampolin 管理者通知] {}", n.subject),
            )
        }
        Notification::General(n) => {
            context.insert("user_name", &n.user_name);
            context.insert("message", &n.message);
            if let Some(action_url) = &n.action_url {
                context.insert("action_url", action_url);
            }
            if let Some(action_label) = &n.action_label {
                context.insert("action_label", action_label);
            }
            (
                "general".to_string(),
                format!("[Trampolin] {}", n.subject),
            )
        }
    };

    (template_name, subject, context)
}

/// 金額を表示形式に整形する（例: 2900, "eur" → "29.00 EUR"）
fn format_amount(n: &SubscriptionNotification) -> Option<String> {
    let cents = n.amount_cents?;
    let currency = n.currency.as_deref()?;
    Some(format!(
        "{}.{:02} {}",
        cents / 100,
        cents % 100,
        currency.to_uppercase()
    ))
}
