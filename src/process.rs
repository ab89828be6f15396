// 子プロセスの起動と終了コードの扱い

use crate::core::WardrobeError;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tracing::debug;

/// 終了ステータスを終了コードに変換する（シグナル終了は 128 + シグナル番号）
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

/// 標準入出力を引き継いで子プロセスを実行し、終了を待つ
pub async fn run_inherited(mut command: Command, program: &Path) -> Result<i32, WardrobeError> {
    debug!("spawning {}", program.display());

    let status = command
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|source| WardrobeError::spawn(program, source))?;

    Ok(exit_code(status))
}
