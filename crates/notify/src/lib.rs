//! # Trampolin 通知ディスパッチャー
//!
//! 型付き通知ペイロードをメールにレンダリングし、受信者ごとの
//! レート制限を適用した上で外部メールプロバイダに送信する。
//!
//! ## 構成
//!
//! ```text
//! Event Trigger（アプリケーション層、本クレート外）
//!     ↓
//! NotificationDispatcher ── RateLimiter（固定ウィンドウ）
//!     ↓
//! TemplateRenderer（tera、コンパイル時埋め込み）
//!     ↓
//! NotificationSender（SMTP / SES / Noop）
//! ```
//!
//! ## モジュール構成
//!
//! - [`config`] - 通知設定と送信バックエンドの組み立て
//! - [`rate_limit`] - カテゴリ×受信者ごとの固定ウィンドウレート制限
//! - [`template_renderer`] - 通知ペイロード → メールメッセージ変換
//! - [`dispatcher`] - 公開 API（カテゴリごとに 1 操作）
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use trampolin_domain::{clock::SystemClock, notification::WelcomeNotification};
//! use trampolin_notify::{
//!     NotificationDispatcher,
//!     config::{self, NotifyConfig},
//!     rate_limit::RateLimiter,
//!     template_renderer::TemplateRenderer,
//! };
//!
//! let config = NotifyConfig::from_env()?;
//! let sender = config::build_sender(&config).await;
//! let dispatcher = NotificationDispatcher::new(
//!     sender,
//!     TemplateRenderer::new()?,
//!     RateLimiter::new(Arc::new(SystemClock)),
//!     config,
//! );
//!
//! dispatcher
//!     .send_welcome(WelcomeNotification {
//!         user_name:     "Ada".to_string(),
//!         user_email:    "ada@example.com".to_string(),
//!         dashboard_url: "https://app.trampolin.example/dashboard".to_string(),
//!     })
//!     .await?;
//! ```

pub mod config;
pub mod dispatcher;
pub mod rate_limit;
pub mod template_renderer;

pub use config::{ConfigError, NotifyConfig};
pub use dispatcher::NotificationDispatcher;
pub use rate_limit::RateLimiter;
pub use template_renderer::TemplateRenderer;
