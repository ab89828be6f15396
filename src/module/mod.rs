// コマンドモジュールの読み込みと正規化
//
// ローダーはファイルを PluginHandle（名前付きエクスポートの集合）として読み込む。
// `command` エクスポートが CommandSource であれば CommandDescriptor に正規化され、
// それ以外の値は登録されずにスキップされる。

pub mod builder;
pub mod descriptor;
pub mod manifest;
pub mod static_loader;

use crate::core::{CommandDescriptor, LoadError, NormalizeError};
use async_trait::async_trait;
use mockall::automock;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

pub use builder::{BuilderArgs, BuilderSnapshot, CommandBuilder};
pub use descriptor::{ActionMeta, DescriptorCommand};
pub use manifest::ManifestLoader;
pub use static_loader::StaticLoader;

/// コマンドとして扱われるエクスポート名
pub const COMMAND_EXPORT: &str = "command";

/// モジュールの記述スタイル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthoringStyle {
    /// 記述子オブジェクトをそのままエクスポート
    Descriptor,
    /// `read()` を持つビルダーをエクスポート
    Builder,
}

/// CommandDescriptor に正規化できるエクスポート値
pub trait CommandSource: Send + Sync {
    fn style(&self) -> AuthoringStyle;

    /// ファイル名から求めたコマンド名で正規化する
    fn normalize(self: Box<Self>, name: &str) -> Result<CommandDescriptor, NormalizeError>;
}

/// モジュールがエクスポートする値
pub enum Export {
    Command(Box<dyn CommandSource>),
    /// コマンドとして解釈できない任意の値
    Value(serde_json::Value),
}

impl fmt::Debug for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command(source) => f.debug_tuple("Command").field(&source.style()).finish(),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

/// 読み込まれたモジュール
#[derive(Debug)]
pub struct PluginHandle {
    path: PathBuf,
    exports: HashMap<String, Export>,
}

impl PluginHandle {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            exports: HashMap::new(),
        }
    }

    pub fn with_export(mut self, name: impl Into<String>, export: Export) -> Self {
        self.exports.insert(name.into(), export);
        self
    }

    /// `command` エクスポートとしてコマンドを設定
    pub fn with_command(self, source: impl CommandSource + 'static) -> Self {
        self.with_export(COMMAND_EXPORT, Export::Command(Box::new(source)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn take_export(&mut self, name: &str) -> Option<Export> {
        self.exports.remove(name)
    }
}

/// モジュールローダーのトレイト
#[automock]
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    /// ファイルをモジュールとして読み込む
    async fn load_module(&self, path: &Path) -> Result<PluginHandle, LoadError>;
}

// ModuleLoader for Box<dyn ModuleLoader>
#[async_trait]
impl ModuleLoader for Box<dyn ModuleLoader> {
    async fn load_module(&self, path: &Path) -> Result<PluginHandle, LoadError> {
        self.as_ref().load_module(path).await
    }
}
