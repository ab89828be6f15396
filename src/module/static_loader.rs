use super::{ModuleLoader, PluginHandle};
use crate::core::LoadError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

type ModuleFactory = Box<dyn Fn(&Path) -> PluginHandle + Send + Sync>;

/// プロセス内に組み込まれたモジュールをファイル名で引き当てるローダー
///
/// ライブラリとして wardrobe を組み込む場合に、ファイルの代わりに
/// Rust で書かれたコマンドを提供する。ファイル名が未登録なら Unsupported。
#[derive(Default)]
pub struct StaticLoader {
    modules: HashMap<String, ModuleFactory>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// ファイル名（例: `hello.ts`）に対するモジュールを登録
    pub fn with_module<F>(mut self, file_name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&Path) -> PluginHandle + Send + Sync + 'static,
    {
        self.modules.insert(file_name.into(), Box::new(factory));
        self
    }
}

#[async_trait]
impl ModuleLoader for StaticLoader {
    async fn load_module(&self, path: &Path) -> Result<PluginHandle, LoadError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        match self.modules.get(&file_name) {
            Some(factory) => Ok(factory(path)),
            None => {
                let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
                Err(LoadError::unsupported(path, extension))
            }
        }
    }
}
