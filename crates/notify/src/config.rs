//! # 通知設定
//!
//! 環境変数から通知基盤の設定を読み込み、構築時に検証する。
//!
//! ## 設計方針
//!
//! - **明示的な設定 struct**: モジュールロード時の隠れた env 読み取りを排除し、
//!   Dispatcher 構築時に注入する
//! - **構築時検証**: 設定不備は `from_env()` の時点で `ConfigError` になる
//! - **バックエンドは起動時に一度だけ選択**: `build_sender()` が composition root

use std::{env, str::FromStr, sync::Arc};

use aws_sdk_sesv2::Client;
use thiserror::Error;
use trampolin_infra::notification::{
    NoopNotificationSender,
    NotificationSender,
    SesNotificationSender,
    SmtpNotificationSender,
};

/// 設定エラー
///
/// 環境変数の欠落・不正値を構築時に検出する。
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 未知の送信バックエンド
    #[error("未知の送信バックエンド: {0}（smtp | ses | noop のいずれか）")]
    UnknownBackend(String),

    /// 不正な設定値
    #[error("設定値が不正です: {field}: {reason}")]
    InvalidValue {
        /// 対象フィールド
        field:  &'static str,
        /// 不正の内容
        reason: String,
    },
}

/// 送信バックエンド
///
/// `NOTIFY_BACKEND` 環境変数で切り替える:
/// - `smtp`: Mailpit（開発）/ SMTP サーバー経由で送信
/// - `ses`: Amazon SES v2 経由で送信（本番）
/// - `noop`: 送信しない（ログ出力のみ、未設定時のデフォルト）
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum NotifyBackend {
    Smtp,
    Ses,
    Noop,
}

/// 通知機能の設定
///
/// プロセス起動時に一度だけ読み込み、以後は不変として扱う。
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// 送信バックエンド
    pub backend: NotifyBackend,
    /// SMTP ホスト（backend=smtp の場合に使用）
    pub smtp_host: String,
    /// SMTP ポート（backend=smtp の場合に使用）
    pub smtp_port: u16,
    /// 送信元メールアドレス
    pub from_address: String,
    /// 返信先メールアドレス
    pub reply_to_address: Option<String>,
    /// 管理者通知の宛先一覧
    pub admin_recipients: Vec<String>,
    /// アプリケーションのベース URL（メール内リンク用）
    pub base_url: String,
}

impl NotifyConfig {
    /// 環境変数から通知設定を読み込む
    ///
    /// | 変数名 | 必須 | デフォルト |
    /// |--------|------|-----------|
    /// | `NOTIFY_BACKEND` | No | `noop` |
    /// | `SMTP_HOST` | No | `localhost` |
    /// | `SMTP_PORT` | No | `1025` |
    /// | `NOTIFY_FROM_ADDRESS` | No | `noreply@trampolin.example` |
    /// | `NOTIFY_REPLY_TO_ADDRESS` | No | なし |
    /// | `NOTIFY_ADMIN_RECIPIENTS` | No | 空（カンマ区切り） |
    /// | `NOTIFY_BASE_URL` | No | `http://localhost:3000` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend_raw = env::var("NOTIFY_BACKEND").unwrap_or_else(|_| "noop".to_string());
        let backend = NotifyBackend::from_str(&backend_raw)
            .map_err(|_| ConfigError::UnknownBackend(backend_raw))?;

        let smtp_port = env::var("SMTP_PORT").unwrap_or_else(|_| "1025".to_string());
        let smtp_port = smtp_port
            .parse()
            .map_err(|e| ConfigError::InvalidValue {
                field:  "SMTP_PORT",
                reason: format!("{e}"),
            })?;

        let admin_recipients = env::var("NOTIFY_ADMIN_RECIPIENTS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let config = Self {
            backend,
            smtp_host: env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
            smtp_port,
            from_address: env::var("NOTIFY_FROM_ADDRESS")
                .unwrap_or_else(|_| "noreply@trampolin.example".to_string()),
            reply_to_address: env::var("NOTIFY_REPLY_TO_ADDRESS").ok(),
            admin_recipients,
            base_url: env::var("NOTIFY_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    /// 設定値の整合性を検証する
    ///
    /// 不備は構築時に検出し、ディスパッチ中のランタイムエラーにしない。
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_address("from_address", &self.from_address)?;
        if let Some(reply_to) = &self.reply_to_address {
            require_address("reply_to_address", reply_to)?;
        }
        for recipient in &self.admin_recipients {
            require_address("admin_recipients", recipient)?;
        }
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field:  "base_url",
                reason: "空にできません".to_string(),
            });
        }
        Ok(())
    }
}

fn require_address(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() || !value.contains('@') {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("メールアドレスである必要があります: {value}"),
        });
    }
    Ok(())
}

/// 設定に応じた送信バックエンドを組み立てる（composition root）
///
/// 起動時に一度だけ呼び、以後はすべてのディスパッチが同じ実装を共有する。
pub async fn build_sender(config: &NotifyConfig) -> Arc<dyn NotificationSender> {
    match config.backend {
        NotifyBackend::Smtp => Arc::new(SmtpNotificationSender::new(
            &config.smtp_host,
            config.smtp_port,
            config.from_address.clone(),
        )),
        NotifyBackend::Ses => {
            let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
            Arc::new(SesNotificationSender::new(
                Client::new(&aws_config),
                config.from_address.clone(),
            ))
        }
        NotifyBackend::Noop => Arc::new(NoopNotificationSender),
    }
}
