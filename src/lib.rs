pub mod classifier;
pub mod cli;
pub mod config;
pub mod core;
pub mod grammar;
pub mod locator;
pub mod logging;
pub mod module;
pub mod process;
pub mod registry;
pub mod storage;

use crate::classifier::ModuleClassifier;
use crate::cli::{
    execute_init, execute_which, BuiltinCommand, CommandLine, ParseOutcome, WhichOutcome,
    NOT_FOUND_MESSAGE,
};
use crate::config::WardrobeConfig;
use crate::core::{ExecutionContext, ProcessEnvironment, WardrobeError, WardrobeResult};
use crate::locator::RootLocator;
use crate::module::ModuleLoader;
use crate::registry::{Binder, DiscoveryReport};
use crate::storage::StorageBackend;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const BINARY_NAME: &str = "wardrobe";
const ABOUT: &str = "Run project-local commands from the nearest .wardrobe directory";

/// 発見処理の結果。パース前のコマンドラインと発見されたディレクトリを持つ
pub struct Session {
    pub marker: Option<PathBuf>,
    pub command_root: Option<PathBuf>,
    pub line: CommandLine,
    pub report: DiscoveryReport,
}

// 依存関係を直接所有するジェネリックな App 構造体
pub struct Wardrobe<L, S>
where
    L: ModuleLoader,
    S: StorageBackend,
{
    pub loader: L,
    pub storage: S,
    pub config: WardrobeConfig,
}

impl<L, S> Wardrobe<L, S>
where
    L: ModuleLoader,
    S: StorageBackend,
{
    /// 新しいインスタンスを作成（コンストラクタインジェクション）
    pub fn new(loader: L, storage: S) -> Self {
        Self {
            loader,
            storage,
            config: WardrobeConfig::default(),
        }
    }

    pub fn with_config(mut self, config: WardrobeConfig) -> Self {
        self.config = config;
        self
    }

    /// 作業ディレクトリから上位に向かってマーカーディレクトリを探す
    pub fn locate(&self, working_directory: &Path) -> Option<PathBuf> {
        RootLocator::locate(working_directory, &self.config.marker_directory)
    }

    /// マーカー内の config.toml を反映した設定。壊れていれば警告して既定値を使う
    pub fn effective_config(&self, marker: &Path) -> WardrobeConfig {
        match self.config.clone().with_project_overrides(marker) {
            Ok(config) => config,
            Err(error) => {
                warn!("{error}; using defaults");
                self.config.clone()
            }
        }
    }

    /// マーカーを探し、見つかればコマンドルート直下のコマンドを登録する
    pub async fn discover(&self, env: &ProcessEnvironment) -> Session {
        let mut line = CommandLine::new(BINARY_NAME, ABOUT);
        let marker = self.locate(&env.working_directory);

        let Some(marker) = marker else {
            debug!("no {} directory above {}", self.config.marker_directory, env.working_directory.display());
            return Session {
                marker: None,
                command_root: None,
                line,
                report: DiscoveryReport::default(),
            };
        };

        let config = self.effective_config(&marker);
        let command_root = config.command_root(&marker);
        let classifier = ModuleClassifier::new(&config);
        let binder = Binder::new(&self.loader, &classifier, env.args.clone());
        let report = binder.discover(&self.storage, &command_root, &mut line).await;
        debug!(
            "registered {} command(s) from {}, skipped {}",
            report.registered().len(),
            command_root.display(),
            report.skipped_count()
        );

        Session {
            marker: Some(marker),
            command_root: Some(command_root),
            line,
            report,
        }
    }

    /// 発見・パース・実行を行い、プロセスの終了コードを返す
    pub async fn run(&self, env: ProcessEnvironment) -> WardrobeResult<i32> {
        let session = self.discover(&env).await;

        match session.line.parse(&env.args)? {
            ParseOutcome::Empty => {
                print!("{}", session.line.render_help());
                Ok(0)
            }
            ParseOutcome::Builtin(BuiltinCommand::Init) => {
                let outcome = execute_init(&self.storage, &self.config, &env.working_directory).await?;
                match outcome.example {
                    Some(example) => println!("created {}", example.display()),
                    None => println!("{} is ready", outcome.command_root.display()),
                }
                Ok(0)
            }
            ParseOutcome::Builtin(BuiltinCommand::Which) => {
                let outcome = execute_which(session.command_root.as_deref());
                match &outcome {
                    WhichOutcome::Found(root) => println!("{root}"),
                    WhichOutcome::NotFound => eprintln!("{NOT_FOUND_MESSAGE}"),
                }
                Ok(outcome.exit_code())
            }
            ParseOutcome::Command { name, args, options } => {
                let handler = session
                    .line
                    .handler(&name)
                    .ok_or_else(|| WardrobeError::registration(&name, "command has no action"))?;
                let context = ExecutionContext::new(
                    env.working_directory.clone(),
                    session.command_root.clone().unwrap_or_default(),
                );

                handler
                    .call(args, options, context)
                    .await
                    .map_err(|e| WardrobeError::handler(&name, e))
            }
            ParseOutcome::Invalid(tokens) => {
                eprintln!("Invalid command: {}", tokens.join(" "));
                Ok(1)
            }
        }
    }
}
