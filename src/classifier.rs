use crate::config::WardrobeConfig;
use crate::storage::{StorageBackend, StorageItem};
use std::path::PathBuf;

/// コマンドルート内のファイルの種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// 拡張子なしでシバンから始まる実行ファイル
    ShellScript,
    /// ローダーに渡すソースモジュール
    SourceModule,
    /// コマンドではないファイル
    Ignored,
}

/// 分類済みのファイル（スキャン中だけ使う一時的な値）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedFile {
    pub path: PathBuf,
    pub name: String,
    pub kind: FileKind,
}

/// 拡張子とシバンによるモジュール分類器
#[derive(Debug, Clone)]
pub struct ModuleClassifier {
    source_extensions: Vec<String>,
    shebang: Vec<u8>,
}

impl Default for ModuleClassifier {
    fn default() -> Self {
        Self::new(&WardrobeConfig::default())
    }
}

impl ModuleClassifier {
    pub fn new(config: &WardrobeConfig) -> Self {
        Self {
            source_extensions: config.source_extensions.clone(),
            shebang: config.shebang.as_bytes().to_vec(),
        }
    }

    /// 最後の `.` より後ろを拡張子とみなす
    ///
    /// `.` が無い・先頭にしか無い（ドットファイル）・末尾にある場合は空文字列。
    pub fn file_extension(name: &str) -> &str {
        match name.rfind('.') {
            None | Some(0) => "",
            Some(index) => &name[index + 1..],
        }
    }

    pub fn is_source_extension(&self, extension: &str) -> bool {
        self.source_extensions.iter().any(|e| e == extension)
    }

    /// ファイルを分類する
    ///
    /// 拡張子なしのファイルだけ先頭バイトを読む。読み込みに失敗した場合は Ignored。
    pub async fn classify<S>(&self, item: &StorageItem, storage: &S) -> ClassifiedFile
    where
        S: StorageBackend + ?Sized,
    {
        let kind = if item.is_directory {
            FileKind::Ignored
        } else {
            match Self::file_extension(&item.name) {
                "" => match storage.read_prefix(&item.id, self.shebang.len()).await {
                    Ok(prefix) if prefix.starts_with(&self.shebang) => FileKind::ShellScript,
                    _ => FileKind::Ignored,
                },
                extension if self.is_source_extension(extension) => FileKind::SourceModule,
                _ => FileKind::Ignored,
            }
        };

        ClassifiedFile {
            path: PathBuf::from(&item.id),
            name: item.name.clone(),
            kind,
        }
    }

    /// ファイル名からコマンド名を求める（ソース拡張子だけ取り除く）
    pub fn command_name(&self, file: &ClassifiedFile) -> String {
        let extension = Self::file_extension(&file.name);
        if file.kind == FileKind::SourceModule && self.is_source_extension(extension) {
            file.name[..file.name.len() - extension.len() - 1].to_string()
        } else {
            file.name.clone()
        }
    }
}
