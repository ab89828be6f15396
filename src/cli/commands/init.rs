use crate::config::WardrobeConfig;
use crate::core::{WardrobeError, WardrobeResult};
use crate::storage::StorageBackend;
use std::path::{Path, PathBuf};
use tracing::info;

/// 生成されるサンプルコマンドのファイル名
pub const EXAMPLE_FILE: &str = "hello.toml";

/// `wardrobe hello [name] [--scream]`
pub const EXAMPLE_COMMAND: &str = r#"[command]
description = "say hello"
run = ["sh", "-c", 'msg="hello ${1:-world}"; if [ -n "$WARDROBE_OPT_SCREAM" ]; then msg="$(printf "%s" "$msg" | tr a-z A-Z)!"; fi; echo "$msg"', "hello"]

[[command.arguments]]
name = "name"

[[command.options]]
name = "--scream"
description = "Scream the name"
"#;

/// init の実行結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitOutcome {
    pub command_root: PathBuf,
    /// サンプルを新しく書き込んだ場合はそのパス
    pub example: Option<PathBuf>,
}

/// `<cwd>/.wardrobe/cmd` を作成し、サンプルコマンドを置く
///
/// 既存のファイルは上書きしない。
pub async fn execute_init<S>(
    storage: &S,
    config: &WardrobeConfig,
    working_directory: &Path,
) -> WardrobeResult<InitOutcome>
where
    S: StorageBackend + ?Sized,
{
    let marker = working_directory.join(&config.marker_directory);
    let command_root = config.command_root(&marker);
    let root_id = command_root.to_string_lossy().to_string();

    storage
        .ensure_directory(&root_id)
        .await
        .map_err(|e| WardrobeError::scaffold(&command_root, e))?;

    let example_path = command_root.join(EXAMPLE_FILE);
    let example_id = example_path.to_string_lossy().to_string();
    let exists = storage
        .exists(&example_id)
        .await
        .map_err(|e| WardrobeError::scaffold(&example_path, e))?;

    let example = if exists {
        info!("{} already exists, leaving it alone", example_path.display());
        None
    } else {
        storage
            .write_item(&example_id, EXAMPLE_COMMAND.as_bytes().to_vec())
            .await
            .map_err(|e| WardrobeError::scaffold(&example_path, e))?;
        Some(example_path)
    };

    Ok(InitOutcome {
        command_root,
        example,
    })
}
