//! # Worker Pool
//!
//! 並列度を制限したワーカープール
//!
//! 固定数のワーカーが共有キューから仕事を取り出し、完了した `(入力インデックス, 結果)` を
//! チャネルで返す。結果は完了順に並ぶので、入力順に依存する処理は
//! 全件が揃った後に呼び出し側で行う。

use log::error;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio::time::sleep;

/// ワーカープール
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
    stagger: Duration,
}

impl WorkerPool {
    /// 新しいワーカープールを作成
    ///
    /// # Arguments
    ///
    /// * `workers` - ワーカー数（0は1として扱う）
    /// * `stagger` - i番目のワーカーは最初の仕事の前に `i * stagger` 待つ
    pub fn new(workers: usize, stagger: Duration) -> Self {
        Self {
            workers: workers.max(1),
            stagger,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// すべての仕事を処理し、完了順に結果を返す
    ///
    /// 1つの仕事の失敗は他の仕事に影響しない（失敗は `R` で表現する）
    pub async fn run<T, R, F, Fut>(&self, items: Vec<T>, task: F) -> Vec<(usize, R)>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        let total = items.len();
        if total == 0 {
            return Vec::new();
        }

        let queue: Arc<Mutex<VecDeque<(usize, T)>>> =
            Arc::new(Mutex::new(items.into_iter().enumerate().collect()));
        let task = Arc::new(task);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut workers = JoinSet::new();
        for worker in 0..self.workers.min(total) {
            let queue = queue.clone();
            let task = task.clone();
            let tx = tx.clone();
            let ramp_up = self.stagger.saturating_mul(worker as u32);

            workers.spawn(async move {
                if !ramp_up.is_zero() {
                    sleep(ramp_up).await;
                }

                loop {
                    let next = queue.lock().await.pop_front();
                    let Some((index, item)) = next else {
                        break;
                    };

                    let result = task(item).await;
                    if tx.send((index, result)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx);

        let mut completed = Vec::with_capacity(total);
        while let Some(pair) = rx.recv().await {
            completed.push(pair);
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!("Worker task failed: {}", e);
            }
        }

        completed
    }
}
