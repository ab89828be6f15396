use super::{StorageBackend, StorageItem};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use tokio::io::AsyncReadExt;
use walkdir::WalkDir;

/// ローカルファイルシステム用のストレージバックエンド
#[derive(Clone)]
pub struct LocalStorageBackend;

impl Default for LocalStorageBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalStorageBackend {
    pub fn new() -> Self {
        Self
    }

    fn is_hidden(name: &str) -> bool {
        name.starts_with('.')
    }
}

#[async_trait]
impl StorageBackend for LocalStorageBackend {
    async fn list_items(&self, prefix: &str) -> Result<Vec<StorageItem>> {
        let mut items = Vec::new();

        // 直下のみ・ファイル名順（登録順とヘルプの表示順を決定的にする）
        let walker = WalkDir::new(prefix)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.with_context(|| format!("Failed to read directory: {prefix}"))?;
            let name = entry.file_name().to_string_lossy().to_string();
            if Self::is_hidden(&name) {
                continue;
            }

            items.push(StorageItem {
                id: entry.path().to_string_lossy().to_string(),
                name,
                // シンボリックリンク先がディレクトリの場合もディレクトリ扱い
                is_directory: entry.path().is_dir(),
            });
        }

        Ok(items)
    }

    async fn read_prefix(&self, id: &str, len: usize) -> Result<Vec<u8>> {
        let file = tokio::fs::File::open(id)
            .await
            .with_context(|| format!("Failed to open file: {id}"))?;

        let mut buffer = Vec::with_capacity(len);
        file.take(len as u64)
            .read_to_end(&mut buffer)
            .await
            .with_context(|| format!("Failed to read file: {id}"))?;
        Ok(buffer)
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        Ok(Path::new(id).exists())
    }

    async fn ensure_directory(&self, id: &str) -> Result<()> {
        tokio::fs::create_dir_all(id)
            .await
            .with_context(|| format!("Failed to create directory: {id}"))
    }

    async fn write_item(&self, id: &str, data: Vec<u8>) -> Result<()> {
        tokio::fs::write(id, data)
            .await
            .with_context(|| format!("Failed to write file: {id}"))
    }
}
