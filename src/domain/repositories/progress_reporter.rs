//! # Progress Reporter Trait
//!
//! 進捗表示を抽象化

/// 進捗レポーター
///
/// 完了した作業単位（アップロードまたは追加）ごとにちょうど1回 `advance` される。
/// 値が減ることはない。
pub trait ProgressReporter: Send + Sync {
    /// 新しいフェーズを開始する
    fn start(&self, message: &str, total: u64);

    /// 完了数を1つ進める
    fn advance(&self);

    /// フェーズを終える
    fn finish(&self);
}
