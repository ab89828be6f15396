// 引数・オプション宣言から文法文字列へのコンパイラ
//
// 文法文字列は `コマンド名 <必須> [任意] <...必須可変長> [...任意可変長]` の形で、
// cli::parser がこれを解釈して clap のサブコマンドを組み立てる。
// ここでは妥当性の検証は行わない（不正な入力は不正な文字列になるだけ）。

use crate::core::CommandDescriptor;
use serde::{Deserialize, Serialize};

/// 位置引数の宣言 {必須, 任意} × {単数, 可変長}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandArgument {
    pub name: String,
    #[serde(default, alias = "is_required", alias = "isRequired")]
    pub required: bool,
    #[serde(default, alias = "is_variadic", alias = "isVariadic")]
    pub variadic: bool,
}

impl CommandArgument {
    pub fn new(name: impl Into<String>, required: bool, variadic: bool) -> Self {
        Self {
            name: name.into(),
            required,
            variadic,
        }
    }

    pub fn required(name: impl Into<String>) -> Self {
        Self::new(name, true, false)
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self::new(name, false, false)
    }

    /// 可変長にする
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    /// 括弧付きの文法トークンに変換
    pub fn render(&self) -> String {
        match (self.required, self.variadic) {
            (true, true) => format!("<...{}>", self.name),
            (true, false) => format!("<{}>", self.name),
            (false, true) => format!("[...{}]", self.name),
            (false, false) => format!("[{}]", self.name),
        }
    }
}

/// オプション自身が取る値の宣言
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionArgument {
    pub name: String,
    #[serde(default, alias = "is_required", alias = "isRequired")]
    pub required: bool,
}

impl OptionArgument {
    pub fn new(name: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            required,
        }
    }

    fn render(&self) -> String {
        if self.required {
            format!("<{}>", self.name)
        } else {
            format!("[{}]", self.name)
        }
    }
}

/// (フラグ構文, ヘルプ文) の組
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOption {
    pub flags: String,
    pub description: String,
}

impl CommandOption {
    pub fn new(flags: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            flags: flags.into(),
            description: description.into(),
        }
    }

    /// 名前・説明・値宣言からオプションを組み立てる
    ///
    /// `name` はそのままフラグ構文の先頭に使われる（`--scream` など）。
    pub fn create(
        name: impl Into<String>,
        description: impl Into<String>,
        argument: Option<&OptionArgument>,
    ) -> Self {
        let name = name.into();
        let flags = match argument {
            Some(argument) => format!("{name} {}", argument.render()),
            None => name,
        };
        Self::new(flags, description)
    }

    pub fn as_tuple(&self) -> (&str, &str) {
        (&self.flags, &self.description)
    }
}

/// 宣言的なオプション定義（マニフェストで使う）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub argument: Option<OptionArgument>,
}

impl OptionSpec {
    pub fn to_option(&self) -> CommandOption {
        CommandOption::create(&self.name, &self.description, self.argument.as_ref())
    }
}

/// ビルダースタイルのフラグ名正規化
///
/// 先頭のダッシュを外し、内部のハイフンも取り除いて `--` を付け直す。
/// 既存のコマンドモジュールとの互換のため `dry-run` は `--dryrun` になる。
pub fn builder_flag_name(name: &str) -> String {
    let bare: String = name.trim_start_matches('-').chars().filter(|c| *c != '-').collect();
    format!("--{bare}")
}

/// コンパイル結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledGrammar {
    pub grammar: String,
    pub options: Vec<CommandOption>,
}

/// コマンド名と引数列から文法文字列を作る
pub fn render_grammar(name: &str, arguments: &[CommandArgument]) -> String {
    let mut grammar = name.to_string();
    for argument in arguments {
        grammar.push(' ');
        grammar.push_str(&argument.render());
    }
    grammar
}

/// CommandDescriptor を文法文字列とオプション一覧にコンパイルする
pub fn compile(descriptor: &CommandDescriptor) -> CompiledGrammar {
    CompiledGrammar {
        grammar: render_grammar(&descriptor.name, &descriptor.arguments),
        options: descriptor.options.clone(),
    }
}
