use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

pub mod local;

/// コマンドルート内のエントリを表す構造体
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageItem {
    /// アイテムの識別子（ローカルならパス）
    pub id: String,
    /// アイテム名（ファイル名）
    pub name: String,
    /// アイテムがディレクトリかどうか
    pub is_directory: bool,
}

impl StorageItem {
    pub fn file(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_directory: false,
        }
    }
}

/// ストレージバックエンドのトレイト
#[automock]
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// ディレクトリ直下のアイテムをファイル名順にリストする（`dir/*` 相当）
    async fn list_items(&self, prefix: &str) -> Result<Vec<StorageItem>>;

    /// アイテムの先頭 `len` バイトまでを読み込む
    async fn read_prefix(&self, id: &str, len: usize) -> Result<Vec<u8>>;

    /// アイテムが存在するかチェック
    async fn exists(&self, id: &str) -> Result<bool>;

    /// ディレクトリを（親も含めて）作成する
    async fn ensure_directory(&self, id: &str) -> Result<()>;

    /// アイテムにデータを書き込む
    async fn write_item(&self, id: &str, data: Vec<u8>) -> Result<()>;
}

// StorageBackend for Box<dyn StorageBackend>
#[async_trait]
impl StorageBackend for Box<dyn StorageBackend> {
    async fn list_items(&self, prefix: &str) -> Result<Vec<StorageItem>> {
        self.as_ref().list_items(prefix).await
    }

    async fn read_prefix(&self, id: &str, len: usize) -> Result<Vec<u8>> {
        self.as_ref().read_prefix(id, len).await
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        self.as_ref().exists(id).await
    }

    async fn ensure_directory(&self, id: &str) -> Result<()> {
        self.as_ref().ensure_directory(id).await
    }

    async fn write_item(&self, id: &str, data: Vec<u8>) -> Result<()> {
        self.as_ref().write_item(id, data).await
    }
}
