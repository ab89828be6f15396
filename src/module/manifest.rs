// TOML マニフェストによる記述子スタイルのコマンド
//
// [command]
// description = "say hello"
// run = ["sh", "-c", "echo hello ${1:-no one}", "hello"]
//
// [[command.arguments]]
// name = "name"
//
// [[command.options]]
// name = "--scream"
// description = "Scream the name"

use super::{AuthoringStyle, CommandSource, Export, ModuleLoader, PluginHandle, COMMAND_EXPORT};
use super::descriptor::DEFAULT_DESCRIPTION;
use crate::core::{
    CommandDescriptor, CommandHandler, ExecutionContext, LoadError, NormalizeError, OptionMap,
};
use crate::grammar::{CommandArgument, OptionSpec};
use crate::process::run_inherited;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::process::Command;
use tracing::debug;

/// マニフェストの拡張子
pub const MANIFEST_EXTENSION: &str = "toml";

pub const ENV_CWD: &str = "WARDROBE_CWD";
pub const ENV_COMMAND_ROOT: &str = "WARDROBE_COMMAND_ROOT";
pub const ENV_OPTIONS: &str = "WARDROBE_OPTIONS";
pub const ENV_OPTION_PREFIX: &str = "WARDROBE_OPT_";

/// `[command]` テーブルの内容
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestCommand {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub arguments: Vec<CommandArgument>,
    #[serde(default)]
    pub options: Vec<OptionSpec>,
    /// 実行するプログラムと固定引数
    #[serde(default)]
    pub run: Vec<String>,
}

impl CommandSource for ManifestCommand {
    fn style(&self) -> AuthoringStyle {
        AuthoringStyle::Descriptor
    }

    fn normalize(self: Box<Self>, name: &str) -> Result<CommandDescriptor, NormalizeError> {
        let manifest = *self;
        if manifest.run.is_empty() {
            return Err(NormalizeError::EmptyRun);
        }

        Ok(CommandDescriptor {
            name: name.to_string(),
            description: manifest
                .description
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            arguments: manifest.arguments,
            options: manifest.options.iter().map(OptionSpec::to_option).collect(),
            handler: Arc::new(RunHandler { run: manifest.run }),
        })
    }
}

/// マニフェストの `run` を子プロセスとして実行するハンドラ
struct RunHandler {
    run: Vec<String>,
}

#[async_trait]
impl CommandHandler for RunHandler {
    async fn call(
        &self,
        args: Vec<Value>,
        options: OptionMap,
        context: ExecutionContext,
    ) -> Result<i32> {
        let Some((program, fixed)) = self.run.split_first() else {
            anyhow::bail!("command manifest has an empty `run` list");
        };
        let program = resolve_program(program, &context.command_root_directory);

        let mut command = Command::new(&program);
        command
            .args(fixed)
            .args(positional_values(&args))
            .current_dir(&context.working_directory)
            .env(ENV_CWD, &context.working_directory)
            .env(ENV_COMMAND_ROOT, &context.command_root_directory)
            .env(ENV_OPTIONS, serde_json::to_string(&options)?);
        for (name, value) in &options {
            command.env(option_env_name(name), option_env_value(value));
        }

        Ok(run_inherited(command, &program).await?)
    }
}

/// 区切り文字を含む相対パスはコマンドルートからの相対とみなす
fn resolve_program(program: &str, command_root: &Path) -> PathBuf {
    let path = Path::new(program);
    if path.is_relative() && path.components().count() > 1 {
        command_root.join(path)
    } else {
        path.to_path_buf()
    }
}

/// 位置引数の値を子プロセスの argv に平坦化する（欠けた任意引数は渡さない）
fn positional_values(args: &[Value]) -> Vec<String> {
    let mut values = Vec::new();
    for arg in args {
        match arg {
            Value::Null => {}
            Value::Array(items) => values.extend(items.iter().map(scalar_to_string)),
            other => values.push(scalar_to_string(other)),
        }
    }
    values
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn option_env_name(name: &str) -> String {
    let suffix: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    format!("{ENV_OPTION_PREFIX}{suffix}")
}

fn option_env_value(value: &Value) -> String {
    scalar_to_string(value)
}

/// `.toml` マニフェストを読み込むローダー
#[derive(Debug, Clone, Default)]
pub struct ManifestLoader;

impl ManifestLoader {
    pub fn new() -> Self {
        Self
    }

    /// マニフェストの内容を PluginHandle に変換する
    ///
    /// トップレベルの各キーがエクスポートになる。`command` がテーブルとして
    /// 解釈できない場合は値のままエクスポートされ、登録時にスキップされる。
    pub fn parse(path: &Path, contents: &str) -> Result<PluginHandle, LoadError> {
        let table: toml::Table =
            toml::from_str(contents).map_err(|e| LoadError::parse(path, e.to_string()))?;

        let mut handle = PluginHandle::new(path);
        for (name, value) in table {
            let export = if name == COMMAND_EXPORT {
                Self::command_export(path, value)
            } else {
                Export::Value(to_json(&value))
            };
            handle = handle.with_export(name, export);
        }
        Ok(handle)
    }

    fn command_export(path: &Path, value: toml::Value) -> Export {
        let json = to_json(&value);
        match value.try_into::<ManifestCommand>() {
            Ok(command) => Export::Command(Box::new(command)),
            Err(error) => {
                debug!("{}: `command` is not a command table: {error}", path.display());
                Export::Value(json)
            }
        }
    }
}

fn to_json(value: &toml::Value) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

#[async_trait]
impl ModuleLoader for ManifestLoader {
    async fn load_module(&self, path: &Path) -> Result<PluginHandle, LoadError> {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if extension != MANIFEST_EXTENSION {
            return Err(LoadError::unsupported(path, extension));
        }

        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| LoadError::io(path, e))?;
        Self::parse(path, &contents)
    }
}
