// 発見処理の設定管理
//
// 既定値 → マーカーディレクトリ内の config.toml の順で上書きする。

use crate::core::WardrobeError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 発見の起点となるマーカーディレクトリ名
pub const MARKER_DIRECTORY: &str = ".wardrobe";
/// マーカー内でスキャンされるコマンドルート名
pub const COMMAND_DIRECTORY: &str = "cmd";
/// マーカー内のプロジェクト設定ファイル名
pub const CONFIG_FILE: &str = "config.toml";

/// wardrobe の設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WardrobeConfig {
    /// 上位ディレクトリに向かって探すディレクトリ名
    pub marker_directory: String,
    /// マーカー直下のコマンドルート名
    pub command_directory: String,
    /// ソースモジュールとして扱う拡張子
    pub source_extensions: Vec<String>,
    /// 拡張子なしファイルをシェルスクリプトと判定する先頭バイト列
    pub shebang: String,
}

impl Default for WardrobeConfig {
    fn default() -> Self {
        Self {
            marker_directory: MARKER_DIRECTORY.to_string(),
            command_directory: COMMAND_DIRECTORY.to_string(),
            source_extensions: vec!["ts".to_string(), "js".to_string(), "toml".to_string()],
            shebang: "#!".to_string(),
        }
    }
}

/// config.toml に書ける項目（マーカー名は変更できない）
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProjectOverrides {
    command_directory: Option<String>,
    source_extensions: Option<Vec<String>>,
    shebang: Option<String>,
}

impl WardrobeConfig {
    pub fn with_marker_directory(mut self, name: impl Into<String>) -> Self {
        self.marker_directory = name.into();
        self
    }

    pub fn with_command_directory(mut self, name: impl Into<String>) -> Self {
        self.command_directory = name.into();
        self
    }

    pub fn with_source_extensions<I, T>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.source_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_shebang(mut self, shebang: impl Into<String>) -> Self {
        self.shebang = shebang.into();
        self
    }

    /// マーカーディレクトリからコマンドルートのパスを求める
    pub fn command_root(&self, marker: &Path) -> PathBuf {
        marker.join(&self.command_directory)
    }

    /// `<marker>/config.toml` があれば読み込んで上書きした設定を返す
    pub fn with_project_overrides(self, marker: &Path) -> Result<Self, WardrobeError> {
        let path = marker.join(CONFIG_FILE);
        if !path.is_file() {
            return Ok(self);
        }

        let contents = std::fs::read_to_string(&path)
            .map_err(|e| WardrobeError::configuration(&path, e.to_string()))?;
        self.apply_overrides(&path, &contents)
    }

    fn apply_overrides(mut self, path: &Path, contents: &str) -> Result<Self, WardrobeError> {
        let overrides: ProjectOverrides =
            toml::from_str(contents).map_err(|e| WardrobeError::configuration(path, e.to_string()))?;

        if let Some(command_directory) = overrides.command_directory {
            if command_directory.is_empty() {
                return Err(WardrobeError::configuration(
                    path,
                    "command_directory must not be empty",
                ));
            }
            self.command_directory = command_directory;
        }
        if let Some(extensions) = overrides.source_extensions {
            self.source_extensions = extensions;
        }
        if let Some(shebang) = overrides.shebang {
            if shebang.is_empty() {
                return Err(WardrobeError::configuration(path, "shebang must not be empty"));
            }
            self.shebang = shebang;
        }
        Ok(self)
    }
}
