//! Progress Reporter Implementation
//!
//! indicatif による端末の進捗バー

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

use crate::domain::repositories::progress_reporter::ProgressReporter;

const TEMPLATE: &str = "{msg:>16} [{bar:40.cyan/blue}] {pos}/{len} ({elapsed})";

/// indicatif の進捗バー
pub struct IndicatifProgress {
    bar: Mutex<ProgressBar>,
    visible: bool,
}

impl IndicatifProgress {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(ProgressBar::hidden()),
            visible: true,
        }
    }

    /// 何も描画しない（テストや非対話実行用）
    pub fn hidden() -> Self {
        Self {
            bar: Mutex::new(ProgressBar::hidden()),
            visible: false,
        }
    }

    /// 現在のバーの位置
    pub fn position(&self) -> u64 {
        self.bar.lock().map(|bar| bar.position()).unwrap_or_default()
    }

    fn current(&self) -> Option<ProgressBar> {
        self.bar.lock().ok().map(|bar| bar.clone())
    }
}

impl Default for IndicatifProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for IndicatifProgress {
    fn start(&self, message: &str, total: u64) {
        let bar = if self.visible {
            let bar = ProgressBar::new(total);
            if let Ok(style) = ProgressStyle::with_template(TEMPLATE) {
                bar.set_style(style.progress_chars("=> "));
            }
            bar
        } else {
            let bar = ProgressBar::hidden();
            bar.set_length(total);
            bar
        };
        bar.set_message(message.to_string());

        if let Ok(mut current) = self.bar.lock() {
            *current = bar;
        }
    }

    fn advance(&self) {
        if let Some(bar) = self.current() {
            bar.inc(1);
        }
    }

    fn finish(&self) {
        if let Some(bar) = self.current() {
            bar.finish();
        }
    }
}
