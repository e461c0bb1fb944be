//! # Trampolin 通知インフラ層
//!
//! 外部メールプロバイダとの通信を担当するインフラストラクチャ層。
//!
//! ## 設計方針
//!
//! ドメイン層で定義された通知モデルを実際に配信する実装を提供する。
//! 外部プロバイダの詳細をカプセル化し、ドメイン層をインフラの変更から保護する。
//!
//! ## 依存関係
//!
//! ```text
//! notify → infra → domain
//! ```
//!
//! インフラ層は `domain` に依存する。
//! ドメイン層はインフラ層に依存しない（依存性逆転の原則）。
//!
//! ## モジュール構成
//!
//! - [`notification`] - メール送信トレイトと SMTP / SES / Noop 実装
//! - [`mock`] - テスト用モック送信実装（`test-utils` feature）

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod notification;
