//! # レート制限
//!
//! 通知カテゴリ × 受信者ごとの固定ウィンドウカウンタ。
//!
//! ## 設計方針
//!
//! - **固定ウィンドウ**: ウィンドウ境界でカウンタをリセットする最も単純な方式。
//!   通知の過剰送信はソフトな抑止対象であり、厳密な公平性は要求されない
//! - **プロセススコープ**: 永続化しない。再起動でリセットされる
//! - **Clock 注入**: `Utc::now()` を直接呼ばず、テストでウィンドウ境界を再現できる
//!
//! ## 既知の制約
//!
//! 水平スケール時はインスタンスごとに独立したテーブルを持つため、
//! グローバルには一貫しない。分散ストアへの差し替えは
//! Dispatcher のコンストラクタ注入で呼び出し側を変えずに行える。

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use chrono::{DateTime, Duration, Utc};
use trampolin_domain::{clock::Clock, notification::NotificationCategory};

/// カテゴリごとのレート制限ポリシー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatePolicy {
    /// ウィンドウ内の最大送信数
    pub max_count: u32,
    /// ウィンドウ幅
    pub window:    Duration,
}

impl RatePolicy {
    /// カテゴリの既定ポリシーを返す
    ///
    /// | カテゴリ | 上限 |
    /// |---------|------|
    /// | welcome | 1 回 / 分 |
    /// | subscription | 5 回 / 分 |
    /// | admin_alert | 10 回 / 分 |
    /// | password_reset | 3 回 / 時 |
    /// | general | 20 回 / 分 |
    pub fn for_category(category: NotificationCategory) -> Self {
        match category {
            NotificationCategory::Welcome => Self {
                max_count: 1,
                window:    Duration::minutes(1),
            },
            NotificationCategory::Subscription => Self {
                max_count: 5,
                window:    Duration::minutes(1),
            },
            NotificationCategory::AdminAlert => Self {
                max_count: 10,
                window:    Duration::minutes(1),
            },
            NotificationCategory::PasswordReset => Self {
                max_count: 3,
                window:    Duration::hours(1),
            },
            NotificationCategory::General => Self {
                max_count: 20,
                window:    Duration::minutes(1),
            },
        }
    }
}

/// レート制限エントリ
///
/// 不変条件: `now < reset_at` の間、`count` はポリシー上限を超えない。
/// `now >= reset_at` に達したエントリは次の消費時に置き換えられる。
#[derive(Debug, Clone)]
struct RateLimitEntry {
    count:    u32,
    reset_at: DateTime<Utc>,
}

/// 固定ウィンドウレート制限
///
/// key は `"{category}:{identifier}"`。エントリはプロセス存続期間だけ生き、
/// 本構造体だけが書き換える。
pub struct RateLimiter {
    entries: Mutex<HashMap<String, RateLimitEntry>>,
    clock:   Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// 送信枠を検査し、許可なら同時に消費する
    ///
    /// - エントリなし、またはウィンドウ満了: `{count: 1, reset_at: now + window}`
    ///   で置き換えて許可
    /// - `count < max_count`: インクリメントして許可
    /// - それ以外: ブロック（状態は変更しない）
    pub fn check_and_consume(&self, category: NotificationCategory, identifier: &str) -> bool {
        let policy = RatePolicy::for_category(category);
        let now = self.clock.now();
        let key = format!("{category}:{identifier}");

        let mut entries = self.entries.lock().unwrap();
        match entries.get_mut(&key) {
            Some(entry) if now < entry.reset_at => {
                if entry.count < policy.max_count {
                    entry.count += 1;
                    true
                } else {
                    false
                }
            }
            _ => {
                entries.insert(
                    key,
                    RateLimitEntry {
                        count:    1,
                        reset_at: now + policy.window,
                    },
                );
                true
            }
        }
    }
}
