// 文法文字列とオプションタプルを clap のサブコマンドに変換するアダプタ
//
// 登録側は `SubcommandSpec::parse(grammar, description)` → `add_option` →
// `set_action` → `CommandLine::register` の順に呼ぶ。clap 自身は実行時に
// debug_assert で落ちるような定義（可変長の後に引数がある、フラグ重複など）を
// 受け付けないので、ここで登録エラーとして返す。

use super::args::BuiltinCommand;
use crate::core::{CommandHandler, OptionMap, WardrobeError, WardrobeResult};
use crate::grammar::{CommandArgument, OptionArgument};
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command, FromArgMatches, Subcommand};
use serde_json::Value;
use std::ffi::OsString;
use std::sync::Arc;

/// clap が自動で追加するサブコマンド名
const HELP_COMMAND: &str = "help";
/// シェルスクリプト用の生引数を受ける引数 ID
const PASSTHROUGH_ID: &str = "passthrough";

fn positional_id(index: usize) -> String {
    format!("@{index}")
}

/// フラグの long 名は英数字で始まり、英数字・`-`・`_` だけからなる
fn is_valid_long_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphanumeric())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// `<x>` / `[x]` / `<...x>` / `[...x]` を解釈する
fn parse_placeholder(token: &str) -> Option<CommandArgument> {
    let (required, inner) = if let Some(inner) = token.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
        (true, inner)
    } else if let Some(inner) = token.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        (false, inner)
    } else {
        return None;
    };

    let (variadic, name) = match inner.strip_prefix("...") {
        Some(name) => (true, name),
        None => (false, inner),
    };
    Some(CommandArgument::new(name, required, variadic))
}

/// `-s, --name <value>` 形式のフラグ構文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSyntax {
    pub long: String,
    pub short: Option<char>,
    pub value: Option<OptionArgument>,
}

impl FlagSyntax {
    pub fn parse(flags: &str) -> Result<Self, String> {
        let mut long = None;
        let mut short = None;
        let mut value = None;

        for token in flags
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            if let Some(name) = token.strip_prefix("--") {
                if !is_valid_long_name(name) || long.is_some() {
                    return Err(format!("invalid long flag `{token}` in `{flags}`"));
                }
                long = Some(name.to_string());
            } else if let Some(name) = token.strip_prefix('-') {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if short.is_none() && c.is_ascii_alphanumeric() => short = Some(c),
                    _ => return Err(format!("invalid short flag `{token}` in `{flags}`")),
                }
            } else {
                match parse_placeholder(token) {
                    Some(placeholder)
                        if value.is_none() && !placeholder.variadic && !placeholder.name.is_empty() =>
                    {
                        value = Some(OptionArgument::new(placeholder.name, placeholder.required));
                    }
                    _ => return Err(format!("unexpected token `{token}` in `{flags}`")),
                }
            }
        }

        let long = long.ok_or_else(|| format!("`{flags}` has no --long name"))?;
        Ok(Self { long, short, value })
    }
}

/// 登録前のサブコマンド定義
pub struct SubcommandSpec {
    name: String,
    grammar: String,
    description: String,
    arguments: Vec<CommandArgument>,
    options: Vec<(FlagSyntax, String)>,
    allow_unknown_options: bool,
    handler: Option<Arc<dyn CommandHandler>>,
}

impl SubcommandSpec {
    /// 文法文字列 `name <a> [b] [...rest]` を解釈する
    pub fn parse(grammar: &str, description: &str) -> WardrobeResult<Self> {
        let mut tokens = grammar.split(' ');
        let name = tokens.next().unwrap_or_default();
        if name.is_empty() || name.starts_with('-') {
            return Err(WardrobeError::registration(
                grammar,
                "grammar must start with a command name",
            ));
        }

        let mut arguments: Vec<CommandArgument> = Vec::new();
        for token in tokens {
            let argument = parse_placeholder(token).ok_or_else(|| {
                WardrobeError::registration(name, format!("invalid argument placeholder `{token}`"))
            })?;
            if argument.name.is_empty() {
                return Err(WardrobeError::registration(name, "argument with an empty name"));
            }
            if let Some(previous) = arguments.last() {
                if previous.variadic {
                    return Err(WardrobeError::registration(
                        name,
                        format!("variadic argument `{}` must be the last argument", previous.name),
                    ));
                }
                if argument.required && !previous.required {
                    return Err(WardrobeError::registration(
                        name,
                        format!("required argument `{}` follows an optional one", argument.name),
                    ));
                }
            }
            arguments.push(argument);
        }

        Ok(Self {
            name: name.to_string(),
            grammar: grammar.to_string(),
            description: description.to_string(),
            arguments,
            options: Vec::new(),
            allow_unknown_options: false,
            handler: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn grammar(&self) -> &str {
        &self.grammar
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn arguments(&self) -> &[CommandArgument] {
        &self.arguments
    }

    /// 登録されたオプションの (フラグ構文の long 名, ヘルプ文)
    pub fn option_names(&self) -> Vec<(&str, &str)> {
        self.options
            .iter()
            .map(|(flag, help)| (flag.long.as_str(), help.as_str()))
            .collect()
    }

    pub fn add_option(&mut self, flags: &str, help: &str) -> WardrobeResult<&mut Self> {
        let flag = FlagSyntax::parse(flags).map_err(|reason| WardrobeError::registration(&self.name, reason))?;

        if flag.long == "help" || flag.short == Some('h') {
            return Err(WardrobeError::registration(
                &self.name,
                format!("option `{flags}` conflicts with --help"),
            ));
        }
        let duplicate = self.options.iter().any(|(existing, _)| {
            existing.long == flag.long || (flag.short.is_some() && existing.short == flag.short)
        });
        if duplicate {
            return Err(WardrobeError::registration(
                &self.name,
                format!("option `{flags}` is declared twice"),
            ));
        }

        self.options.push((flag, help.to_string()));
        Ok(self)
    }

    pub fn set_action(&mut self, handler: Arc<dyn CommandHandler>) -> &mut Self {
        self.handler = Some(handler);
        self
    }

    /// 未知のフラグも含めて以降の引数をすべて受け入れる
    pub fn allow_unknown_options(&mut self) -> &mut Self {
        self.allow_unknown_options = true;
        self
    }

    fn to_clap(&self) -> Command {
        let mut command = Command::new(self.name.clone()).about(self.description.clone());

        if self.allow_unknown_options {
            command = command.disable_help_flag(true).arg(
                Arg::new(PASSTHROUGH_ID)
                    .value_name("ARGS")
                    .index(self.arguments.len() + 1)
                    .num_args(1..)
                    .action(ArgAction::Append)
                    .value_parser(clap::value_parser!(OsString))
                    .trailing_var_arg(true)
                    .allow_hyphen_values(true),
            );
        }

        for (index, argument) in self.arguments.iter().enumerate() {
            let mut arg = Arg::new(positional_id(index))
                .value_name(argument.name.clone())
                .index(index + 1)
                .required(argument.required);
            arg = if argument.variadic {
                arg.num_args(1..).action(ArgAction::Append)
            } else {
                arg.action(ArgAction::Set)
            };
            command = command.arg(arg);
        }

        for (flag, help) in &self.options {
            let mut arg = Arg::new(flag.long.clone())
                .long(flag.long.clone())
                .help(help.clone())
                .overrides_with(flag.long.clone());
            if let Some(short) = flag.short {
                arg = arg.short(short);
            }
            arg = match &flag.value {
                None => arg.action(ArgAction::SetTrue),
                Some(value) if value.required => arg
                    .action(ArgAction::Set)
                    .num_args(1)
                    .value_name(value.name.clone()),
                Some(value) => arg
                    .action(ArgAction::Set)
                    .num_args(0..=1)
                    .value_name(value.name.clone()),
            };
            command = command.arg(arg);
        }

        command
    }

    fn collect_args(&self, matches: &ArgMatches) -> Vec<Value> {
        self.arguments
            .iter()
            .enumerate()
            .map(|(index, argument)| {
                let id = positional_id(index);
                if argument.variadic {
                    let values = matches
                        .get_many::<String>(&id)
                        .map(|values| values.cloned().map(Value::String).collect())
                        .unwrap_or_default();
                    Value::Array(values)
                } else {
                    matches
                        .get_one::<String>(&id)
                        .cloned()
                        .map(Value::String)
                        .unwrap_or(Value::Null)
                }
            })
            .collect()
    }

    fn collect_options(&self, matches: &ArgMatches) -> OptionMap {
        let mut options = OptionMap::new();
        for (flag, _) in &self.options {
            if matches.value_source(&flag.long) != Some(ValueSource::CommandLine) {
                continue;
            }
            let value = match &flag.value {
                None => Value::Bool(true),
                Some(_) => matches
                    .get_one::<String>(&flag.long)
                    .cloned()
                    .map(Value::String)
                    .unwrap_or(Value::Bool(true)),
            };
            options.insert(flag.long.clone(), value);
        }
        options
    }
}

/// パース結果
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// サブコマンド無しで起動された
    Empty,
    Builtin(BuiltinCommand),
    /// 登録済みコマンドに一致した
    Command {
        name: String,
        args: Vec<Value>,
        options: OptionMap,
    },
    /// どのコマンドにも一致しなかった（トークン列をそのまま保持）
    Invalid(Vec<String>),
}

/// 実行時に組み立てられるトップレベルのコマンドライン
pub struct CommandLine {
    name: String,
    about: String,
    commands: Vec<SubcommandSpec>,
}

impl CommandLine {
    pub fn new(name: impl Into<String>, about: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            about: about.into(),
            commands: Vec::new(),
        }
    }

    /// サブコマンドを登録する（登録順がヘルプの表示順になる）
    pub fn register(&mut self, subcommand: SubcommandSpec) -> WardrobeResult<()> {
        if subcommand.handler.is_none() {
            return Err(WardrobeError::registration(&subcommand.name, "command has no action"));
        }
        if subcommand.name == HELP_COMMAND || BuiltinCommand::has_subcommand(&subcommand.name) {
            return Err(WardrobeError::registration(
                &subcommand.name,
                "name is reserved for a built-in command",
            ));
        }
        if self.find(&subcommand.name).is_some() {
            return Err(WardrobeError::registration(
                &subcommand.name,
                "a command with this name is already registered",
            ));
        }

        self.commands.push(subcommand);
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<&SubcommandSpec> {
        self.commands.iter().find(|c| c.name == name)
    }

    pub fn commands(&self) -> impl Iterator<Item = &SubcommandSpec> {
        self.commands.iter()
    }

    pub fn command_names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn handler(&self, name: &str) -> Option<Arc<dyn CommandHandler>> {
        self.find(name).and_then(|c| c.handler.clone())
    }

    pub fn build(&self) -> Command {
        let root = Command::new(self.name.clone())
            .about(self.about.clone())
            .version(env!("CARGO_PKG_VERSION"))
            .allow_external_subcommands(true);

        self.commands
            .iter()
            .fold(BuiltinCommand::augment_subcommands(root), |root, subcommand| {
                root.subcommand(subcommand.to_clap())
            })
    }

    pub fn render_help(&self) -> String {
        self.build().render_help().to_string()
    }

    /// argv（先頭はバイナリ名）をパースして一致したコマンドを返す
    pub fn parse<I, T>(&self, argv: I) -> Result<ParseOutcome, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self.build().try_get_matches_from(argv)?;
        let Some((name, sub_matches)) = matches.subcommand() else {
            return Ok(ParseOutcome::Empty);
        };

        if BuiltinCommand::has_subcommand(name) {
            return Ok(ParseOutcome::Builtin(BuiltinCommand::from_arg_matches(&matches)?));
        }

        match self.find(name) {
            Some(subcommand) => Ok(ParseOutcome::Command {
                name: name.to_string(),
                args: subcommand.collect_args(sub_matches),
                options: subcommand.collect_options(sub_matches),
            }),
            None => {
                let mut tokens = vec![name.to_string()];
                if let Some(rest) = sub_matches.get_many::<OsString>("") {
                    tokens.extend(rest.map(|s| s.to_string_lossy().to_string()));
                }
                Ok(ParseOutcome::Invalid(tokens))
            }
        }
    }
}
