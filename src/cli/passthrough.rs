use crate::core::{CommandHandler, ExecutionContext, OptionMap};
use crate::process::run_inherited;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::ffi::OsString;
use std::path::PathBuf;
use tokio::process::Command;

/// argv のうちスクリプトに渡さない先頭部分（バイナリ名とサブコマンド名）
const SKIPPED_ARGS: usize = 2;

/// シェルスクリプトを子プロセスとして実行するハンドラ
///
/// パース済みの引数は使わず、起動時の argv をそのまま転送する。
#[derive(Debug, Clone)]
pub struct ShellScriptHandler {
    path: PathBuf,
    raw_args: Vec<OsString>,
}

impl ShellScriptHandler {
    pub fn new(path: impl Into<PathBuf>, raw_args: Vec<OsString>) -> Self {
        Self {
            path: path.into(),
            raw_args,
        }
    }

    /// スクリプトに渡される引数
    pub fn forwarded_args(&self) -> &[OsString] {
        self.raw_args.get(SKIPPED_ARGS..).unwrap_or_default()
    }
}

#[async_trait]
impl CommandHandler for ShellScriptHandler {
    async fn call(
        &self,
        _args: Vec<Value>,
        _options: OptionMap,
        context: ExecutionContext,
    ) -> Result<i32> {
        let mut command = Command::new(&self.path);
        command
            .args(self.forwarded_args())
            .current_dir(&context.working_directory);

        Ok(run_inherited(command, &self.path).await?)
    }
}
