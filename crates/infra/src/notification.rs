//! # 通知送信
//!
//! メール通知の送信を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `NotificationSender` trait でメール送信を抽象化
//! - **3 つの実装**: SMTP（Mailpit 開発用）、SES（本番用）、Noop（未設定時・テスト用）
//! - **起動時に一度だけ選択**: composition root がバックエンドを選び、
//!   ホットパスに `if configured` 分岐を持ち込まない

mod noop;
mod ses;
mod smtp;

use async_trait::async_trait;
pub use noop::NoopNotificationSender;
pub use ses::SesNotificationSender;
pub use smtp::SmtpNotificationSender;
use trampolin_domain::notification::{DeliveryResult, EmailMessage, NotificationError};

/// メール送信トレイト
///
/// 通知基盤の中核。メール送信の具体的な方法を抽象化する。
/// SMTP / SES / Noop の 3 実装を設定で切り替える。
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// メールを送信する
    ///
    /// 1 回限りの試行。リトライはどの実装も行わない。
    async fn send_email(&self, email: &EmailMessage) -> Result<DeliveryResult, NotificationError>;
}
