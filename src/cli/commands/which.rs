use std::path::Path;

pub const NOT_FOUND_MESSAGE: &str = "no .wardrobe directory found";

/// `which` の出力行と終了コード
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhichOutcome {
    Found(String),
    NotFound,
}

impl WhichOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Found(_) => 0,
            Self::NotFound => 1,
        }
    }
}

pub fn execute_which(command_root: Option<&Path>) -> WhichOutcome {
    match command_root {
        Some(root) => WhichOutcome::Found(root.display().to_string()),
        None => WhichOutcome::NotFound,
    }
}
