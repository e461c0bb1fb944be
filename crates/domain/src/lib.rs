//! # Trampolin 通知ドメイン層
//!
//! 通知ディスパッチの中核となるドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **値オブジェクト**: 通知ペイロード・メールメッセージは不変オブジェクト
//! - **sum type による通知種別**: カテゴリ追加時にコンパイラが網羅性を検証する
//! - **ドメインエラー**: レート制限・バリデーション・送信失敗を型で分類
//!
//! ## 依存関係の方向
//!
//! ```text
//! notify → infra → domain
//! ```
//!
//! ドメイン層はインフラ層（SMTP、SES）には一切依存しない。
//!
//! ## モジュール構成
//!
//! - [`notification`] - 通知カテゴリ・ペイロード・エラーの定義
//! - [`clock`] - テスト可能な時刻プロバイダ

pub mod clock;
pub mod notification;

pub use notification::NotificationError;
