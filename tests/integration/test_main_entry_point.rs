// バイナリのエントリーポイントのテスト
#[path = "../fixtures/mod.rs"]
mod fixtures;

use fixtures::{Project, HELLO_MANIFEST};
use std::path::Path;
use std::process::{Command, Output};

fn wardrobe(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_wardrobe"))
        .args(args)
        .current_dir(cwd)
        .env_remove("WARDROBE_LOG")
        .output()
        .expect("Failed to execute binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_cli_help_and_version() {
    let project = Project::new();

    let output = wardrobe(project.root(), &["--help"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("init"));
    assert!(stdout(&output).contains("which"));

    let output = wardrobe(project.root(), &["--version"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_empty_invocation_prints_help() {
    let project = Project::new();
    project.write_command("hello.toml", HELLO_MANIFEST);

    let output = wardrobe(project.root(), &[]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("hello"));
    assert!(stdout(&output).contains("say hello"));
}

#[test]
fn test_which_prints_command_root() {
    let project = Project::new();
    let nested = project.subdirectory("a/b");

    let output = wardrobe(&nested, &["which"]);
    assert!(output.status.success());
    let expected = project.command_root().canonicalize().unwrap();
    let printed = Path::new(stdout(&output).trim()).canonicalize().unwrap();
    assert_eq!(printed, expected);
}

#[test]
fn test_which_without_marker() {
    let project = Project::bare();
    let output = wardrobe(project.root(), &["which"]);

    // tempdir の祖先にマーカーが無い環境でのみ意味がある
    if wardrobe::locator::RootLocator::locate(project.root(), ".wardrobe").is_none() {
        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output).contains("no .wardrobe directory found"));
    }
}

#[test]
fn test_init_scaffolds_example_command() {
    let project = Project::bare();

    let output = wardrobe(project.root(), &["init"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(project.command_root().join("hello.toml").is_file());

    let output = wardrobe(project.root(), &["init"]);
    assert!(output.status.success());

    let output = wardrobe(project.root(), &["hello", "there"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output).trim(), "hello there");

    let output = wardrobe(project.root(), &["hello", "--scream"]);
    assert_eq!(stdout(&output).trim(), "HELLO WORLD!");
}

#[test]
fn test_manifest_command_runs_with_arguments() {
    let project = Project::new();
    project.write_command("hello.toml", HELLO_MANIFEST);

    let output = wardrobe(project.root(), &["hello", "world"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "hello world");

    let output = wardrobe(project.root(), &["hello"]);
    assert_eq!(stdout(&output), "hello no one");
}

#[test]
fn test_invalid_command() {
    let project = Project::new();

    let output = wardrobe(project.root(), &["nope", "a", "b"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Invalid command: nope a b"));
}

#[test]
fn test_unknown_flag_on_manifest_command_is_usage_error() {
    let project = Project::new();
    project.write_command("hello.toml", HELLO_MANIFEST);

    let output = wardrobe(project.root(), &["hello", "--shout"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("--shout"));
}

#[cfg(unix)]
#[test]
fn test_shell_script_receives_raw_arguments() {
    let project = Project::new();
    project.write_script("args", "echo \"args:$*\"");

    let output = wardrobe(project.root(), &["args", "a", "--b", "-c"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output).trim(), "args:a --b -c");
}

#[cfg(unix)]
#[test]
fn test_non_utf8_arguments_do_not_crash() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let project = Project::new();
    project.write_script("echo-arg", "printf 'got: %s\\n' \"$1\"");
    project.write_command("hello.toml", HELLO_MANIFEST);
    let latin1 = OsStr::from_bytes(b"caf\xe9");

    let run = |args: &[&OsStr]| {
        Command::new(env!("CARGO_BIN_EXE_wardrobe"))
            .args(args)
            .current_dir(project.root())
            .env_remove("WARDROBE_LOG")
            .output()
            .expect("Failed to execute binary")
    };

    let output = run(&[OsStr::new("echo-arg"), latin1]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(output.stdout, b"got: caf\xe9\n");

    let output = run(&[OsStr::new("hello"), latin1]);
    assert_eq!(output.status.code(), Some(2));

    let output = run(&[OsStr::new("nope"), latin1]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Invalid command: nope"));
}

#[cfg(unix)]
#[test]
fn test_shell_script_exit_code_propagates() {
    let project = Project::new();
    project.write_script("fail", "echo failing >&2\nexit 3");

    let output = wardrobe(project.root(), &["fail"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("failing"));
}

#[cfg(unix)]
#[test]
fn test_shell_script_runs_in_invocation_directory() {
    let project = Project::new();
    project.write_script("where", "pwd");
    let nested = project.subdirectory("nested/dir");

    let output = wardrobe(&nested, &["where"]);
    assert!(output.status.success());
    let printed = Path::new(stdout(&output).trim()).canonicalize().unwrap();
    assert_eq!(printed, nested.canonicalize().unwrap());
}

#[test]
fn test_broken_module_does_not_crash() {
    let project = Project::new();
    project.write_command("broken.toml", "command = \"oops\"\n");
    project.write_command("hello.toml", HELLO_MANIFEST);

    let output = wardrobe(project.root(), &["hello", "x"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "hello x");
}
