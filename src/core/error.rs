// コマンド発見・登録・実行のエラー型定義

use std::path::{Path, PathBuf};
use thiserror::Error;

/// wardrobe 全体のエラー型
#[derive(Error, Debug)]
pub enum WardrobeError {
    #[error("failed to register command `{command}`: {reason}")]
    RegistrationError { command: String, reason: String },

    #[error("failed to spawn {}: {source}", path.display())]
    SpawnError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {}: {message}", path.display())]
    ConfigurationError { path: PathBuf, message: String },

    #[error("failed to scaffold {}: {source}", path.display())]
    ScaffoldError {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("command `{command}` failed: {source}")]
    HandlerError {
        command: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    ParseError(#[from] clap::Error),
}

impl WardrobeError {
    /// 登録エラーの作成
    pub fn registration(command: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::RegistrationError {
            command: command.into(),
            reason: reason.into(),
        }
    }

    /// 子プロセス起動エラーの作成
    pub fn spawn(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::SpawnError {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// 設定エラーの作成
    pub fn configuration(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// スキャフォールドエラーの作成
    pub fn scaffold(path: impl AsRef<Path>, source: anyhow::Error) -> Self {
        Self::ScaffoldError {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// ハンドラ実行エラーの作成
    pub fn handler(command: impl Into<String>, source: anyhow::Error) -> Self {
        Self::HandlerError {
            command: command.into(),
            source,
        }
    }

    /// プロセスの終了コード
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ParseError(error) => error.exit_code(),
            _ => 1,
        }
    }
}

/// モジュール読み込みのエラー型
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("no loader for `.{extension}` modules: {}", path.display())]
    Unsupported { path: PathBuf, extension: String },

    #[error("failed to read module {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse module {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

impl LoadError {
    pub fn unsupported(path: impl AsRef<Path>, extension: impl Into<String>) -> Self {
        Self::Unsupported {
            path: path.as_ref().to_path_buf(),
            extension: extension.into(),
        }
    }

    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn parse(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }
}

/// エクスポート値を CommandDescriptor に正規化できなかった理由
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("command has no action")]
    MissingAction,

    #[error("command manifest has an empty `run` list")]
    EmptyRun,
}

/// エラーの重要度レベル（ログ出力レベルの選択に使う）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// 低重要度 - 想定内のスキップ
    Low,
    /// 中重要度 - 利用者が気付くべき問題
    Medium,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
        }
    }
}

/// wardrobe の結果型
pub type WardrobeResult<T> = std::result::Result<T, WardrobeError>;
