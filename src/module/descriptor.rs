// 記述子スタイル: 説明・引数・オプション・アクションを持つ素のオブジェクト

use super::{AuthoringStyle, CommandSource};
use crate::core::{CommandDescriptor, CommandHandler, ExecutionContext, NormalizeError, OptionMap};
use crate::grammar::{CommandArgument, CommandOption};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

/// 説明が無いモジュールに使う既定の説明文
pub const DEFAULT_DESCRIPTION: &str = "no description";

/// 記述子スタイルのアクションが受け取る単一のパラメータ
#[derive(Debug, Clone, PartialEq)]
pub struct ActionMeta {
    pub args: Vec<Value>,
    pub options: OptionMap,
    pub cwd: PathBuf,
    pub command_root_directory: PathBuf,
}

pub type DescriptorAction = Arc<dyn Fn(ActionMeta) -> Result<()> + Send + Sync>;

/// 記述子スタイルのコマンド
#[derive(Clone, Default)]
pub struct DescriptorCommand {
    pub description: Option<String>,
    pub command_arguments: Vec<CommandArgument>,
    pub options: Vec<CommandOption>,
    pub action: Option<DescriptorAction>,
}

impl DescriptorCommand {
    pub fn new<F>(description: impl Into<String>, action: F) -> Self
    where
        F: Fn(ActionMeta) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            description: Some(description.into()),
            command_arguments: Vec::new(),
            options: Vec::new(),
            action: Some(Arc::new(action)),
        }
    }

    pub fn with_argument(mut self, argument: CommandArgument) -> Self {
        self.command_arguments.push(argument);
        self
    }

    pub fn with_option(mut self, option: CommandOption) -> Self {
        self.options.push(option);
        self
    }
}

impl CommandSource for DescriptorCommand {
    fn style(&self) -> AuthoringStyle {
        AuthoringStyle::Descriptor
    }

    fn normalize(self: Box<Self>, name: &str) -> Result<CommandDescriptor, NormalizeError> {
        let DescriptorCommand {
            description,
            command_arguments,
            options,
            action,
        } = *self;
        let action = action.ok_or(NormalizeError::MissingAction)?;

        Ok(CommandDescriptor {
            name: name.to_string(),
            description: description
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            arguments: command_arguments,
            options,
            handler: Arc::new(DescriptorHandler { action }),
        })
    }
}

/// `(args, options, context)` を ActionMeta に詰め替えるアダプタ
struct DescriptorHandler {
    action: DescriptorAction,
}

#[async_trait]
impl CommandHandler for DescriptorHandler {
    async fn call(
        &self,
        args: Vec<Value>,
        options: OptionMap,
        context: ExecutionContext,
    ) -> Result<i32> {
        (self.action)(ActionMeta {
            args,
            options,
            cwd: context.working_directory,
            command_root_directory: context.command_root_directory,
        })?;
        Ok(0)
    }
}
