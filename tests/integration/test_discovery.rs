// コマンドルートの発見と登録の統合テスト
#[path = "../fixtures/mod.rs"]
mod fixtures;

use fixtures::{Project, HELLO_MANIFEST};
use std::fs;
use wardrobe::{
    module::{ManifestLoader, StaticLoader},
    registry::{RegisterOutcome, SkipReason, SHELL_SCRIPT_DESCRIPTION},
    storage::local::LocalStorageBackend,
    Wardrobe,
};

#[tokio::test]
async fn test_marker_is_found_from_nested_directory() {
    let project = Project::new();
    let nested = project.subdirectory("src/components/deep");

    let app = Wardrobe::new(ManifestLoader::new(), LocalStorageBackend::new());
    let session = app.discover(&project.env_in(&nested, &["wardrobe"])).await;

    assert_eq!(session.marker, Some(project.marker()));
    assert_eq!(session.command_root, Some(project.command_root()));
}

#[tokio::test]
async fn test_manifests_register_in_listing_order() {
    let project = Project::new();
    project.write_command("zeta.toml", HELLO_MANIFEST);
    project.write_command("alpha.toml", HELLO_MANIFEST);
    project.write_command("README.md", "# not a command\n");
    project.write_command(".hidden.toml", HELLO_MANIFEST);

    let app = Wardrobe::new(ManifestLoader::new(), LocalStorageBackend::new());
    let session = app.discover(&project.env(&["wardrobe"])).await;

    assert_eq!(session.line.command_names(), vec!["alpha", "zeta"]);
    let alpha = session.line.find("alpha").unwrap();
    assert_eq!(alpha.grammar(), "alpha [name]");
    assert_eq!(alpha.description(), "say hello");
}

#[tokio::test]
async fn test_extension_less_files_need_a_shebang() {
    let project = Project::new();
    project.write_command("deploy", "#!/bin/sh\necho deploying\n");
    project.write_command("notes", "just some notes\n");
    project.write_command("run.sh", "#!/bin/sh\necho has an extension\n");
    fs::create_dir(project.command_root().join("lib")).unwrap();

    let app = Wardrobe::new(ManifestLoader::new(), LocalStorageBackend::new());
    let session = app.discover(&project.env(&["wardrobe"])).await;

    assert_eq!(session.line.command_names(), vec!["deploy"]);
    assert_eq!(
        session.line.find("deploy").unwrap().description(),
        SHELL_SCRIPT_DESCRIPTION
    );
}

#[tokio::test]
async fn test_one_bad_module_does_not_block_others() {
    let project = Project::new();
    project.write_command("broken.toml", "command = \"oops\"\n");
    project.write_command("garbage.toml", "[command\n");
    project.write_command("hello.toml", HELLO_MANIFEST);
    project.write_command("script.ts", "export const command = {};\n");

    let app = Wardrobe::new(ManifestLoader::new(), LocalStorageBackend::new());
    let session = app.discover(&project.env(&["wardrobe"])).await;

    assert_eq!(session.line.command_names(), vec!["hello"]);
    assert_eq!(session.report.registered(), vec!["hello"]);
    assert_eq!(session.report.skipped_count(), 3);

    let skipped: Vec<_> = session
        .report
        .outcomes
        .iter()
        .filter_map(|(path, outcome)| match outcome {
            RegisterOutcome::Skipped(reason) => Some((path.file_name().unwrap().to_owned(), reason)),
            RegisterOutcome::Registered(_) => None,
        })
        .collect();
    assert!(matches!(skipped[0].1, SkipReason::MalformedExport));
    assert!(matches!(skipped[1].1, SkipReason::Load(_)));
    assert!(matches!(skipped[2].1, SkipReason::Load(_)));
}

#[tokio::test]
async fn test_project_config_changes_command_directory() {
    let project = Project::new();
    fs::create_dir_all(project.marker().join("commands")).unwrap();
    fs::write(
        project.marker().join("config.toml"),
        "command_directory = \"commands\"\nsource_extensions = [\"toml\"]\n",
    )
    .unwrap();
    fs::write(project.marker().join("commands/build.toml"), HELLO_MANIFEST).unwrap();
    project.write_command("ignored.toml", HELLO_MANIFEST);

    let app = Wardrobe::new(ManifestLoader::new(), LocalStorageBackend::new());
    let session = app.discover(&project.env(&["wardrobe"])).await;

    assert_eq!(session.command_root, Some(project.marker().join("commands")));
    assert_eq!(session.line.command_names(), vec!["build"]);
}

#[tokio::test]
async fn test_command_name_comes_from_file_name() {
    let project = Project::new();
    project.write_command("release.notes.toml", HELLO_MANIFEST);
    project.write_command("Upper.TOML", HELLO_MANIFEST);

    let app = Wardrobe::new(ManifestLoader::new(), LocalStorageBackend::new());
    let session = app.discover(&project.env(&["wardrobe"])).await;

    // 拡張子は大文字小文字を区別する
    assert_eq!(session.line.command_names(), vec!["release.notes"]);
}

#[tokio::test]
async fn test_without_marker_only_builtins_exist() {
    let project = Project::bare();
    let app = Wardrobe::new(StaticLoader::new(), LocalStorageBackend::new()).with_config(
        wardrobe::config::WardrobeConfig::default().with_marker_directory(".wardrobe-not-here"),
    );

    let session = app.discover(&project.env(&["wardrobe"])).await;
    assert!(session.command_root.is_none());
    assert!(session.line.command_names().is_empty());
    assert!(session.report.outcomes.is_empty());
}
