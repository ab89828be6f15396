// 統合テスト用のプロジェクトツリーとヘルパー
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wardrobe::core::ProcessEnvironment;

/// 一時ディレクトリ上の `.wardrobe/cmd` を持つプロジェクト
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        let project = Self::bare();
        fs::create_dir_all(project.command_root()).unwrap();
        project
    }

    /// マーカーディレクトリを持たないプロジェクト
    pub fn bare() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn marker(&self) -> PathBuf {
        self.root().join(".wardrobe")
    }

    pub fn command_root(&self) -> PathBuf {
        self.marker().join("cmd")
    }

    pub fn subdirectory(&self, relative: &str) -> PathBuf {
        let path = self.root().join(relative);
        fs::create_dir_all(&path).unwrap();
        path
    }

    pub fn write_command(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.command_root().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[cfg(unix)]
    pub fn write_script(&self, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.write_command(name, &format!("#!/bin/sh\n{body}\n"));
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    pub fn env(&self, args: &[&str]) -> ProcessEnvironment {
        self.env_in(self.root(), args)
    }

    pub fn env_in(&self, cwd: &Path, args: &[&str]) -> ProcessEnvironment {
        ProcessEnvironment::new(args.iter().copied(), cwd)
    }
}

pub const HELLO_MANIFEST: &str = r#"
[command]
description = "say hello"
run = ["sh", "-c", "printf 'hello %s' \"${1:-no one}\"", "hello"]

[[command.arguments]]
name = "name"

[[command.options]]
name = "--scream"
description = "Scream the name"
"#;
