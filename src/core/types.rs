// コマンド登録・実行に関連するデータ型定義

use super::traits::CommandHandler;
use crate::grammar::{CommandArgument, CommandOption};
use serde_json::Value;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// オプション名（`--` を除いた long 名）から値へのマップ
pub type OptionMap = serde_json::Map<String, Value>;

/// 呼び出しごとに新しく作られる実行コンテキスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    /// 呼び出し時のカレントディレクトリ
    pub working_directory: PathBuf,
    /// 発見されたコマンドルート（`.wardrobe/cmd`）
    pub command_root_directory: PathBuf,
}

impl ExecutionContext {
    pub fn new(working_directory: impl Into<PathBuf>, command_root_directory: impl Into<PathBuf>) -> Self {
        Self {
            working_directory: working_directory.into(),
            command_root_directory: command_root_directory.into(),
        }
    }
}

/// どの記述スタイルで書かれたモジュールも最終的にこの形に正規化される
#[derive(Clone)]
pub struct CommandDescriptor {
    pub name: String,
    pub description: String,
    /// 宣言順を保持する。可変長引数は末尾に置くこと（パーサ側の前提）
    pub arguments: Vec<CommandArgument>,
    pub options: Vec<CommandOption>,
    pub handler: Arc<dyn CommandHandler>,
}

impl CommandDescriptor {
    /// ハンドラを除いた宣言部分が等しいかどうか
    pub fn same_declaration(&self, other: &CommandDescriptor) -> bool {
        self.name == other.name
            && self.description == other.description
            && self.arguments == other.arguments
            && self.options == other.options
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("arguments", &self.arguments)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// プロセス全体の暗黙状態（argv と cwd）を明示的に渡すための構造体
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEnvironment {
    /// 起動時の argv（UTF-8 とは限らない）
    pub args: Vec<OsString>,
    pub working_directory: PathBuf,
}

impl ProcessEnvironment {
    pub fn new<I, T>(args: I, working_directory: impl AsRef<Path>) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            working_directory: working_directory.as_ref().to_path_buf(),
        }
    }

    /// 実プロセスの argv と cwd から作成
    pub fn from_process() -> std::io::Result<Self> {
        Ok(Self {
            args: std::env::args_os().collect(),
            working_directory: std::env::current_dir()?,
        })
    }
}
