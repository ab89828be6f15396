// ビルダースタイル: 流れるようなインターフェースで組み立て、`read()` で記述内容を取り出す

use super::descriptor::DEFAULT_DESCRIPTION;
use super::{AuthoringStyle, CommandSource};
use crate::core::{CommandDescriptor, CommandHandler, ExecutionContext, NormalizeError, OptionMap};
use crate::grammar::{builder_flag_name, CommandArgument, CommandOption, OptionArgument};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::ops::Deref;
use std::sync::Arc;

/// ビルダースタイルのアクションが受け取る位置引数
///
/// スライスとして位置引数に直接アクセスでき、オプションは `options()` で取得する。
#[derive(Debug, Clone, PartialEq)]
pub struct BuilderArgs {
    positional: Vec<Value>,
    options: OptionMap,
}

impl BuilderArgs {
    pub fn new(positional: Vec<Value>, options: OptionMap) -> Self {
        Self { positional, options }
    }

    pub fn options(&self) -> &OptionMap {
        &self.options
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.positional
    }
}

impl Deref for BuilderArgs {
    type Target = [Value];

    fn deref(&self) -> &Self::Target {
        &self.positional
    }
}

pub type BuilderAction = Arc<dyn Fn(BuilderArgs, ExecutionContext) -> Result<()> + Send + Sync>;

/// `read()` が返す記述内容
#[derive(Clone)]
pub struct BuilderSnapshot {
    pub description: Option<String>,
    pub command_arguments: Vec<CommandArgument>,
    pub options: Vec<CommandOption>,
    pub action: Option<BuilderAction>,
}

/// コマンドビルダー
#[derive(Clone, Default)]
pub struct CommandBuilder {
    description: Option<String>,
    arguments: Vec<CommandArgument>,
    options: Vec<CommandOption>,
    action: Option<BuilderAction>,
}

impl CommandBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn add_command_argument(mut self, argument: CommandArgument) -> Self {
        self.arguments.push(argument);
        self
    }

    /// 値を取らないフラグを追加（名前の内部ハイフンは取り除かれる）
    pub fn add_option(mut self, name: &str, description: impl Into<String>) -> Self {
        self.options
            .push(CommandOption::create(builder_flag_name(name), description, None));
        self
    }

    /// 値を取るオプションを追加
    pub fn add_option_with_argument(
        mut self,
        name: &str,
        description: impl Into<String>,
        argument: OptionArgument,
    ) -> Self {
        self.options.push(CommandOption::create(
            builder_flag_name(name),
            description,
            Some(&argument),
        ));
        self
    }

    pub fn action<F>(mut self, action: F) -> Self
    where
        F: Fn(BuilderArgs, ExecutionContext) -> Result<()> + Send + Sync + 'static,
    {
        self.action = Some(Arc::new(action));
        self
    }

    pub fn read(&self) -> BuilderSnapshot {
        BuilderSnapshot {
            description: self.description.clone(),
            command_arguments: self.arguments.clone(),
            options: self.options.clone(),
            action: self.action.clone(),
        }
    }
}

impl CommandSource for CommandBuilder {
    fn style(&self) -> AuthoringStyle {
        AuthoringStyle::Builder
    }

    fn normalize(self: Box<Self>, name: &str) -> Result<CommandDescriptor, NormalizeError> {
        let snapshot = self.read();
        let action = snapshot.action.ok_or(NormalizeError::MissingAction)?;

        Ok(CommandDescriptor {
            name: name.to_string(),
            description: snapshot
                .description
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            arguments: snapshot.command_arguments,
            options: snapshot.options,
            handler: Arc::new(BuilderHandler { action }),
        })
    }
}

/// `(args, options, context)` を `(BuilderArgs, ExecutionContext)` に詰め替えるアダプタ
struct BuilderHandler {
    action: BuilderAction,
}

#[async_trait]
impl CommandHandler for BuilderHandler {
    async fn call(
        &self,
        args: Vec<Value>,
        options: OptionMap,
        context: ExecutionContext,
    ) -> Result<i32> {
        (self.action)(BuilderArgs::new(args, options), context)?;
        Ok(0)
    }
}
