// コマンドの読み込み・正規化・登録
//
// 1 ファイルごとに Discovered → Classified → Loaded → Normalized →
// GrammarCompiled → Registered と進み、途中で失敗したものは Skipped になる。
// スキップは値として返すだけで、残りのファイルの処理は止めない。

use crate::classifier::{ClassifiedFile, FileKind, ModuleClassifier};
use crate::cli::{CommandLine, ShellScriptHandler, SubcommandSpec};
use crate::core::{CommandDescriptor, ErrorSeverity, LoadError, NormalizeError, WardrobeError, WardrobeResult};
use crate::grammar;
use crate::module::{Export, ModuleLoader, COMMAND_EXPORT};
use crate::storage::StorageBackend;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// シェルスクリプトコマンドのヘルプに出す説明
pub const SHELL_SCRIPT_DESCRIPTION: &str = "shell script";

/// ファイルが登録されなかった理由
#[derive(Error, Debug)]
pub enum SkipReason {
    #[error("not a command file")]
    Ignored,

    #[error(transparent)]
    Load(LoadError),

    #[error("module has no `command` export")]
    MissingExport,

    #[error("`command` export is not a command object")]
    MalformedExport,

    #[error(transparent)]
    Normalize(NormalizeError),

    #[error(transparent)]
    Registration(WardrobeError),
}

impl SkipReason {
    /// ログ出力レベルの判定に使う重要度
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Registration(_) => ErrorSeverity::Medium,
            _ => ErrorSeverity::Low,
        }
    }
}

/// 1 ファイルの登録結果
#[derive(Debug)]
pub enum RegisterOutcome {
    Registered(String),
    Skipped(SkipReason),
}

impl RegisterOutcome {
    pub fn is_registered(&self) -> bool {
        matches!(self, Self::Registered(_))
    }
}

/// 発見処理全体の結果（列挙順を保持する）
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    pub outcomes: Vec<(PathBuf, RegisterOutcome)>,
}

impl DiscoveryReport {
    /// 登録されたコマンド名（登録順）
    pub fn registered(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|(_, outcome)| match outcome {
                RegisterOutcome::Registered(name) => Some(name.as_str()),
                RegisterOutcome::Skipped(_) => None,
            })
            .collect()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| !o.is_registered()).count()
    }
}

/// 分類済みファイルを読み込んでコマンドラインに登録する
pub struct Binder<'a, L: ModuleLoader + ?Sized> {
    loader: &'a L,
    classifier: &'a ModuleClassifier,
    /// シェルスクリプトにそのまま渡す起動時の argv
    raw_args: Vec<OsString>,
}

impl<'a, L: ModuleLoader + ?Sized> Binder<'a, L> {
    pub fn new(loader: &'a L, classifier: &'a ModuleClassifier, raw_args: Vec<OsString>) -> Self {
        Self {
            loader,
            classifier,
            raw_args,
        }
    }

    /// コマンドルート直下を列挙し、1 ファイルずつ順に登録する
    ///
    /// 列挙に失敗した場合は何も登録しない。
    pub async fn discover<S>(
        &self,
        storage: &S,
        command_root: &Path,
        line: &mut CommandLine,
    ) -> DiscoveryReport
    where
        S: StorageBackend + ?Sized,
    {
        let mut report = DiscoveryReport::default();
        let prefix = command_root.to_string_lossy().to_string();

        let items = match storage.list_items(&prefix).await {
            Ok(items) => items,
            Err(error) => {
                debug!("cannot list {}: {error:#}", command_root.display());
                return report;
            }
        };

        for item in &items {
            let file = self.classifier.classify(item, storage).await;
            let outcome = self.bind_file(&file, line).await;
            log_outcome(&file.path, &outcome);
            report.outcomes.push((file.path, outcome));
        }

        report
    }

    /// 1 ファイルを登録する
    pub async fn bind_file(&self, file: &ClassifiedFile, line: &mut CommandLine) -> RegisterOutcome {
        let result = match file.kind {
            FileKind::Ignored => return RegisterOutcome::Skipped(SkipReason::Ignored),
            FileKind::ShellScript => self.register_shell_script(file, line),
            FileKind::SourceModule => match self.load_descriptor(file).await {
                Ok(descriptor) => register_descriptor(descriptor, line),
                Err(reason) => return RegisterOutcome::Skipped(reason),
            },
        };

        match result {
            Ok(name) => RegisterOutcome::Registered(name),
            Err(error) => RegisterOutcome::Skipped(SkipReason::Registration(error)),
        }
    }

    fn register_shell_script(&self, file: &ClassifiedFile, line: &mut CommandLine) -> WardrobeResult<String> {
        let mut subcommand = SubcommandSpec::parse(&file.name, SHELL_SCRIPT_DESCRIPTION)?;
        subcommand.allow_unknown_options().set_action(Arc::new(ShellScriptHandler::new(
            &file.path,
            self.raw_args.clone(),
        )));
        line.register(subcommand)?;
        Ok(file.name.clone())
    }

    async fn load_descriptor(&self, file: &ClassifiedFile) -> Result<CommandDescriptor, SkipReason> {
        let mut handle = self
            .loader
            .load_module(&file.path)
            .await
            .map_err(SkipReason::Load)?;

        let source = match handle.take_export(COMMAND_EXPORT) {
            None => return Err(SkipReason::MissingExport),
            Some(Export::Value(_)) => return Err(SkipReason::MalformedExport),
            Some(Export::Command(source)) => source,
        };

        let style = source.style();
        let name = self.classifier.command_name(file);
        debug!("normalizing {} ({style:?} style) as `{name}`", file.path.display());
        source.normalize(&name).map_err(SkipReason::Normalize)
    }
}

/// 正規化済みの記述子を文法文字列にコンパイルして登録する
pub fn register_descriptor(descriptor: CommandDescriptor, line: &mut CommandLine) -> WardrobeResult<String> {
    let compiled = grammar::compile(&descriptor);
    debug!("registering `{}` with options {:?}", compiled.grammar, compiled.options);

    let mut subcommand = SubcommandSpec::parse(&compiled.grammar, &descriptor.description)?;
    for option in &compiled.options {
        let (flags, help) = option.as_tuple();
        subcommand.add_option(flags, help)?;
    }
    subcommand.set_action(descriptor.handler);

    line.register(subcommand)?;
    Ok(descriptor.name)
}

fn log_outcome(path: &Path, outcome: &RegisterOutcome) {
    match outcome {
        RegisterOutcome::Registered(name) => debug!("registered `{name}` from {}", path.display()),
        RegisterOutcome::Skipped(reason) => match reason.severity() {
            ErrorSeverity::Low => debug!("skipped {}: {reason}", path.display()),
            severity => warn!("skipped {} [{}]: {reason}", path.display(), severity.as_str()),
        },
    }
}
