// コマンド実行の抽象化インターフェース

use super::types::{ExecutionContext, OptionMap};
use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use serde_json::Value;

/// 登録済みコマンドの統一呼び出し規約
///
/// モジュールがどのスタイルで宣言されていても、パーサからは
/// `(位置引数, オプション, 実行コンテキスト)` の形で呼び出される。
/// 戻り値はプロセスの終了コード。
#[automock]
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn call(
        &self,
        args: Vec<Value>,
        options: OptionMap,
        context: ExecutionContext,
    ) -> Result<i32>;
}
