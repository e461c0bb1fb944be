//! # 通知
//!
//! メール通知に関するドメインモデルを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`Notification`] | 通知ペイロード | カテゴリごとに 1 バリアント（5 種類） |
//! | [`NotificationCategory`] | 通知カテゴリ | レート制限ポリシーとテンプレートの選択キー |
//! | [`SubscriptionEvent`] | サブスクリプションイベント | new / renewed / cancelled / payment_failed |
//! | [`EmailMessage`] | メールメッセージ | テンプレートレンダリングの出力 |
//! | [`DeliveryResult`] | 送信結果 | 成否とプロバイダ発行のメッセージ ID |
//!
//! ## 設計方針
//!
//! - **enum による通知ペイロード**: カテゴリ追加漏れをコンパイル時に検出する
//! - **fail-fast バリデーション**: 必須フィールド欠落は送信前に `Validation` で弾く
//! - **宛先 URL は呼び出し側が構築**: ダッシュボードリンク等はペイロードに含める

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;
use thiserror::Error;

/// 通知送信エラー
#[derive(Debug, Error)]
pub enum NotificationError {
    /// レート制限により送信をブロック
    #[error("レート制限により送信をブロック: {category}")]
    RateLimited {
        /// ブロックされたカテゴリ
        category: NotificationCategory,
    },

    /// ペイロードのバリデーションに失敗
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// テンプレートレンダリングに失敗
    #[error("テンプレートレンダリングに失敗: {0}")]
    TemplateFailed(String),

    /// メール送信に失敗
    #[error("メール送信に失敗: {0}")]
    SendFailed(String),
}

/// 通知カテゴリ
///
/// レート制限の key 接頭辞、テンプレート選択、`X-Email-Type` ヘッダーに使われる。
/// snake_case でシリアライズされる。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
pub enum NotificationCategory {
    /// ウェルカムメール: サインアップ完了時 → 本人に送信
    Welcome,
    /// サブスクリプション通知: 課金ライフサイクルイベント → 本人に送信
    Subscription,
    /// 管理者通知: 運用イベント → 設定された管理者一覧に送信（best-effort）
    AdminAlert,
    /// パスワードリセット: リセット要求時 → 本人に送信
    PasswordReset,
    /// 汎用通知: 上記に収まらないお知らせ → 本人に送信
    General,
}

/// サブスクリプションのライフサイクルイベント
///
/// `X-Subscription-Type` ヘッダーとテンプレート選択に使われる。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
pub enum SubscriptionEvent {
    /// 新規契約
    New,
    /// 更新（継続課金成功）
    Renewed,
    /// 解約
    Cancelled,
    /// 決済失敗
    PaymentFailed,
}

/// ウェルカム通知ペイロード
#[derive(Debug, Clone)]
pub struct WelcomeNotification {
    /// 表示名
    pub user_name:     String,
    /// 宛先メールアドレス
    pub user_email:    String,
    /// ダッシュボード URL（呼び出し側が構築）
    pub dashboard_url: String,
}

/// サブスクリプション通知ペイロード
#[derive(Debug, Clone)]
pub struct SubscriptionNotification {
    /// 表示名
    pub user_name: String,
    /// 宛先メールアドレス
    pub user_email: String,
    /// ライフサイクルイベント
    pub event: SubscriptionEvent,
    /// プラン名
    pub plan_name: String,
    /// 金額（最小通貨単位）。`currency` とセットで指定する
    pub amount_cents: Option<i64>,
    /// 通貨コード（例: "eur"）。`amount_cents` とセットで指定する
    pub currency: Option<String>,
    /// 現在の課金期間の終了日時
    pub current_period_end: Option<DateTime<Utc>>,
    /// ダッシュボード URL（呼び出し側が構築）
    pub dashboard_url: String,
}

/// パスワードリセット通知ペイロード
#[derive(Debug, Clone)]
pub struct PasswordResetNotification {
    /// 表示名
    pub user_name:  String,
    /// 宛先メールアドレス
    pub user_email: String,
    /// リセット URL（呼び出し側が構築）
    pub reset_url:  String,
}

/// 管理者通知ペイロード
///
/// 宛先は設定（`admin_recipients`）から取得するため、ペイロードには含めない。
#[derive(Debug, Clone)]
pub struct AdminAlertNotification {
    /// 件名（`[Trampolin]` 接頭辞はレンダラーが付与）
    pub subject: String,
    /// 本文メッセージ
    pub message: String,
    /// 付帯情報（key-value、テンプレートでは表形式に展開）
    pub details: Vec<(String, String)>,
}

/// 汎用通知ペイロード
#[derive(Debug, Clone)]
pub struct GeneralNotification {
    /// 表示名
    pub user_name: String,
    /// 宛先メールアドレス
    pub user_email: String,
    /// 件名（`[Trampolin]` 接頭辞はレンダラーが付与）
    pub subject: String,
    /// 本文メッセージ
    pub message: String,
    /// アクションボタンの URL（省略可）
    pub action_url: Option<String>,
    /// アクションボタンのラベル。`action_url` とセットで指定する
    pub action_label: Option<String>,
}

/// 通知ペイロード
///
/// 各バリアントが通知カテゴリ（5 種類）に対応する。
/// Event Trigger（アプリケーション層）が構築し、Dispatcher が 1 回だけ消費する。
#[derive(Debug, Clone, derive_more::From)]
pub enum Notification {
    /// ウェルカムメール
    Welcome(WelcomeNotification),
    /// サブスクリプション通知
    Subscription(SubscriptionNotification),
    /// 管理者通知
    AdminAlert(AdminAlertNotification),
    /// パスワードリセット
    PasswordReset(PasswordResetNotification),
    /// 汎用通知
    General(GeneralNotification),
}

impl Notification {
    /// 通知カテゴリを返す
    pub fn category(&self) -> NotificationCategory {
        match self {
            Self::Welcome(_) => NotificationCategory::Welcome,
            Self::Subscription(_) => NotificationCategory::Subscription,
            Self::AdminAlert(_) => NotificationCategory::AdminAlert,
            Self::PasswordReset(_) => NotificationCategory::PasswordReset,
            Self::General(_) => NotificationCategory::General,
        }
    }

    /// 受信者のメールアドレスを返す
    ///
    /// 管理者通知は宛先を設定から取得するため `None` を返す。
    pub fn recipient_email(&self) -> Option<&str> {
        match self {
            Self::Welcome(n) => Some(&n.user_email),
            Self::Subscription(n) => Some(&n.user_email),
            Self::PasswordReset(n) => Some(&n.user_email),
            Self::General(n) => Some(&n.user_email),
            Self::AdminAlert(_) => None,
        }
    }

    /// ペイロードの必須フィールドを検証する（fail-fast）
    ///
    /// レンダリングの先頭で呼ばれ、欠落があれば送信を試みる前に
    /// [`NotificationError::Validation`] で失敗する。
    pub fn validate(&self) -> Result<(), NotificationError> {
        match self {
            Self::Welcome(n) => {
                require_non_empty("user_name", &n.user_name)?;
                require_email("user_email", &n.user_email)?;
                require_non_empty("dashboard_url", &n.dashboard_url)?;
            }
            Self::Subscription(n) => {
                require_non_empty("user_name", &n.user_name)?;
                require_email("user_email", &n.user_email)?;
                require_non_empty("plan_name", &n.plan_name)?;
                require_non_empty("dashboard_url", &n.dashboard_url)?;
                if n.amount_cents.is_some() != n.currency.is_some() {
                    return Err(NotificationError::Validation(
                        "amount_cents と currency はセットで指定する必要があります".to_string(),
                    ));
                }
            }
            Self::PasswordReset(n) => {
                require_non_empty("user_name", &n.user_name)?;
                require_email("user_email", &n.user_email)?;
                require_non_empty("reset_url", &n.reset_url)?;
            }
            Self::AdminAlert(n) => {
                require_non_empty("subject", &n.subject)?;
                require_non_empty("message", &n.message)?;
            }
            Self::General(n) => {
                require_non_empty("user_name", &n.user_name)?;
                require_email("user_email", &n.user_email)?;
                require_non_empty("subject", &n.subject)?;
                require_non_empty("message", &n.message)?;
                if n.action_url.is_some() != n.action_label.is_some() {
                    return Err(NotificationError::Validation(
                        "action_url と action_label はセットで指定する必要があります".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// 必須フィールドが空でないことを検証する
fn require_non_empty(field: &str, value: &str) -> Result<(), NotificationError> {
    if value.trim().is_empty() {
        return Err(NotificationError::Validation(format!(
            "{field} は必須です"
        )));
    }
    Ok(())
}

/// メールアドレス形式（最低限 `@` を含む非空文字列）を検証する
fn require_email(field: &str, value: &str) -> Result<(), NotificationError> {
    require_non_empty(field, value)?;
    if !value.contains('@') {
        return Err(NotificationError::Validation(format!(
            "{field} はメールアドレスである必要があります: {value}"
        )));
    }
    Ok(())
}

/// メールメッセージ
///
/// テンプレートレンダリングの出力。NotificationSender に渡される。
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// 送信先メールアドレス（管理者通知は複数宛先）
    pub to:        Vec<String>,
    /// 件名
    pub subject:   String,
    /// HTML 本文
    pub html_body: String,
    /// プレーンテキスト本文
    pub text_body: String,
    /// 返信先メールアドレス
    pub reply_to:  Option<String>,
    /// カスタムヘッダー（`X-Email-Type` 等、下流のフィルタリング用）
    pub headers:   Vec<(String, String)>,
}

/// 送信結果
///
/// `message_id` はプロバイダが発行した ID。Noop 送信では `"mock"` 固定、
/// SMTP ではプロバイダが ID を返さないため `None`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryResult {
    /// 送信に成功したか
    pub success:    bool,
    /// プロバイダ発行のメッセージ ID
    pub message_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn notification_category_の文字列変換が正しい() {
        assert_eq!(NotificationCategory::Welcome.to_string(), "welcome");
        assert_eq!(
            NotificationCategory::Subscription.to_string(),
            "subscription"
        );
        assert_eq!(NotificationCategory::AdminAlert.to_string(), "admin_alert");
        assert_eq!(
            NotificationCategory::PasswordReset.to_string(),
            "password_reset"
        );
        assert_eq!(NotificationCategory::General.to_string(), "general");

        assert_eq!(
            NotificationCategory::from_str("password_reset").unwrap(),
            NotificationCategory::PasswordReset
        );
        assert_eq!(
            NotificationCategory::from_str("admin_alert").unwrap(),
            NotificationCategory::AdminAlert
        );
    }

    #[test]
    fn subscription_event_の文字列変換が正しい() {
        assert_eq!(SubscriptionEvent::New.to_string(), "new");
        assert_eq!(SubscriptionEvent::Renewed.to_string(), "renewed");
        assert_eq!(SubscriptionEvent::Cancelled.to_string(), "cancelled");
        assert_eq!(
            SubscriptionEvent::PaymentFailed.to_string(),
            "payment_failed"
        );
    }

    fn make_welcome() -> WelcomeNotification {
        WelcomeNotification {
            user_name:     "Ada Lovelace".to_string(),
            user_email:    "ada@example.com".to_string(),
            dashboard_url: "https://app.trampolin.example/dashboard".to_string(),
        }
    }

    fn make_subscription() -> SubscriptionNotification {
        SubscriptionNotification {
            user_name: "Ada Lovelace".to_string(),
            user_email: "ada@example.com".to_string(),
            event: SubscriptionEvent::New,
            plan_name: "Pro".to_string(),
            amount_cents: Some(2900),
            currency: Some("eur".to_string()),
            current_period_end: None,
            dashboard_url: "https://app.trampolin.example/dashboard".to_string(),
        }
    }

    #[test]
    fn category_が各バリアントで正しい値を返す() {
        assert_eq!(
            Notification::from(make_welcome()).category(),
            NotificationCategory::Welcome
        );
        assert_eq!(
            Notification::from(make_subscription()).category(),
            NotificationCategory::Subscription
        );
        let admin = Notification::from(AdminAlertNotification {
            subject: "決済失敗".to_string(),
            message: "ユーザーの決済が失敗しました".to_string(),
            details: vec![],
        });
        assert_eq!(admin.category(), NotificationCategory::AdminAlert);
    }

    #[test]
    fn recipient_email_は管理者通知のみ_none_を返す() {
        assert_eq!(
            Notification::from(make_welcome()).recipient_email(),
            Some("ada@example.com")
        );
        let admin = Notification::from(AdminAlertNotification {
            subject: "障害".to_string(),
            message: "SES がエラーを返しています".to_string(),
            details: vec![],
        });
        assert_eq!(admin.recipient_email(), None);
    }

    #[test]
    fn validate_は正常なペイロードを受理する() {
        assert!(Notification::from(make_welcome()).validate().is_ok());
        assert!(Notification::from(make_subscription()).validate().is_ok());
    }

    #[rstest]
    #[case::user_name_が空("", "ada@example.com")]
    #[case::user_email_が空("Ada", "")]
    #[case::user_email_が不正("Ada", "not-an-address")]
    fn validate_は必須フィールド欠落を弾く(#[case] name: &str, #[case] email: &str) {
        let notification = Notification::from(WelcomeNotification {
            user_name:     name.to_string(),
            user_email:    email.to_string(),
            dashboard_url: "https://app.trampolin.example/dashboard".to_string(),
        });

        let result = notification.validate();
        assert!(matches!(result, Err(NotificationError::Validation(_))));
    }

    #[test]
    fn validate_は金額と通貨の片方のみの指定を弾く() {
        let mut subscription = make_subscription();
        subscription.currency = None;

        let result = Notification::from(subscription).validate();
        assert!(matches!(result, Err(NotificationError::Validation(_))));
    }

    #[test]
    fn validate_はアクションのurlとラベルの片方のみの指定を弾く() {
        let notification = Notification::from(GeneralNotification {
            user_name: "Ada".to_string(),
            user_email: "ada@example.com".to_string(),
            subject: "解析が完了しました".to_string(),
            message: "結果をダッシュボードで確認できます".to_string(),
            action_url: Some("https://app.trampolin.example/history".to_string()),
            action_label: None,
        });

        let result = notification.validate();
        assert!(matches!(result, Err(NotificationError::Validation(_))));
    }
}
