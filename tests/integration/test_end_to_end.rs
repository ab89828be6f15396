// 発見からディスパッチまでのエンドツーエンド統合テスト
#[path = "../fixtures/mod.rs"]
mod fixtures;

use fixtures::Project;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use wardrobe::{
    core::{LoadError, OptionMap, WardrobeError},
    grammar::{CommandArgument, CommandOption},
    module::{
        ActionMeta, CommandBuilder, DescriptorCommand, Export, MockModuleLoader, PluginHandle,
        StaticLoader, COMMAND_EXPORT,
    },
    storage::local::LocalStorageBackend,
    Wardrobe,
};

type Recorded = Arc<Mutex<Vec<ActionMeta>>>;

/// `hello.ts` を記述子スタイルで提供するローダー
fn hello_loader(recorded: Recorded) -> StaticLoader {
    StaticLoader::new().with_module("hello.ts", move |path| {
        let recorded = recorded.clone();
        PluginHandle::new(path).with_command(
            DescriptorCommand::new("say hello", move |meta| {
                recorded.lock().unwrap().push(meta);
                Ok(())
            })
            .with_argument(CommandArgument::optional("name"))
            .with_option(CommandOption::new("--scream", "Scream the name")),
        )
    })
}

#[tokio::test]
async fn test_hello_grammar_and_dispatch() {
    let project = Project::new();
    project.write_command("hello.ts", "export const command = { /* ... */ };\n");
    let recorded = Recorded::default();

    let app = Wardrobe::new(hello_loader(recorded.clone()), LocalStorageBackend::new());

    let session = app.discover(&project.env(&["wardrobe"])).await;
    let hello = session.line.find("hello").unwrap();
    assert_eq!(hello.grammar(), "hello [name]");
    assert_eq!(hello.option_names(), vec![("scream", "Scream the name")]);

    let code = app
        .run(project.env(&["wardrobe", "hello", "world", "--scream"]))
        .await
        .unwrap();
    assert_eq!(code, 0);

    let calls = recorded.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let mut expected = OptionMap::new();
    expected.insert("scream".to_string(), json!(true));
    assert_eq!(calls[0].args, vec![json!("world")]);
    assert_eq!(calls[0].options, expected);
    assert_eq!(calls[0].cwd, project.root());
    assert_eq!(calls[0].command_root_directory, project.command_root());
}

#[tokio::test]
async fn test_empty_command_root_has_only_builtins() {
    let project = Project::new();
    let app = Wardrobe::new(StaticLoader::new(), LocalStorageBackend::new());

    let session = app.discover(&project.env(&["wardrobe"])).await;
    assert!(session.line.command_names().is_empty());

    let help = session.line.render_help();
    assert!(help.contains("init"));
    assert!(help.contains("which"));

    assert_eq!(app.run(project.env(&["wardrobe"])).await.unwrap(), 0);
    assert_eq!(app.run(project.env(&["wardrobe", "hello"])).await.unwrap(), 1);
}

#[tokio::test]
async fn test_string_export_is_inert_next_to_valid_module() {
    let project = Project::new();
    project.write_command("broken.ts", "export const command = \"oops\";\n");
    project.write_command("hello.ts", "export const command = { /* ... */ };\n");
    let recorded = Recorded::default();

    let loader = hello_loader(recorded.clone()).with_module("broken.ts", |path| {
        PluginHandle::new(path).with_export(COMMAND_EXPORT, Export::Value(json!("oops")))
    });
    let app = Wardrobe::new(loader, LocalStorageBackend::new());

    let session = app.discover(&project.env(&["wardrobe"])).await;
    assert_eq!(session.line.command_names(), vec!["hello"]);

    assert_eq!(app.run(project.env(&["wardrobe", "broken"])).await.unwrap(), 1);
    assert_eq!(app.run(project.env(&["wardrobe", "hello"])).await.unwrap(), 0);

    let calls = recorded.lock().unwrap();
    assert_eq!(calls[0].args, vec![Value::Null]);
    assert!(calls[0].options.is_empty());
}

#[tokio::test]
async fn test_builder_style_receives_positional_array_and_context() {
    let project = Project::new();
    project.write_command("deploy.js", "module.exports.command = new Command();\n");

    let recorded = Arc::new(Mutex::new(Vec::new()));
    let sink = recorded.clone();
    let loader = StaticLoader::new().with_module("deploy.js", move |path| {
        let sink = sink.clone();
        PluginHandle::new(path).with_command(
            CommandBuilder::new()
                .description("deploy things")
                .add_command_argument(CommandArgument::required("env"))
                .add_command_argument(CommandArgument::optional("targets").variadic())
                .add_option("dry-run", "Only print the plan")
                .action(move |args, context| {
                    sink.lock()
                        .unwrap()
                        .push((args.to_vec(), args.options().clone(), context));
                    Ok(())
                }),
        )
    });
    let app = Wardrobe::new(loader, LocalStorageBackend::new());

    let code = app
        .run(project.env(&["wardrobe", "deploy", "prod", "web", "api", "--dryrun"]))
        .await
        .unwrap();
    assert_eq!(code, 0);

    let calls = recorded.lock().unwrap();
    let (args, options, context) = &calls[0];
    assert_eq!(args, &vec![json!("prod"), json!(["web", "api"])]);
    assert_eq!(options.get("dryrun"), Some(&json!(true)));
    assert_eq!(context.working_directory, project.root());
    assert_eq!(context.command_root_directory, project.command_root());
}

#[tokio::test]
async fn test_failing_loader_skips_module() {
    let project = Project::new();
    project.write_command("a.ts", "");
    project.write_command("b.ts", "");

    let mut loader = MockModuleLoader::new();
    loader
        .expect_load_module()
        .times(2)
        .returning(|path| {
            if path.ends_with("a.ts") {
                Err(LoadError::parse(path, "SyntaxError: unexpected token"))
            } else {
                Ok(PluginHandle::new(path)
                    .with_command(DescriptorCommand::new("b command", |_| Ok(()))))
            }
        });
    let app = Wardrobe::new(loader, LocalStorageBackend::new());

    let session = app.discover(&project.env(&["wardrobe"])).await;
    assert_eq!(session.line.command_names(), vec!["b"]);
}

#[tokio::test]
async fn test_handler_error_is_reported() {
    let project = Project::new();
    project.write_command("fail.ts", "");

    let loader = StaticLoader::new().with_module("fail.ts", |path| {
        PluginHandle::new(path).with_command(DescriptorCommand::new("always fails", |_| {
            Err(anyhow::anyhow!("nothing to do"))
        }))
    });
    let app = Wardrobe::new(loader, LocalStorageBackend::new());

    let error = app.run(project.env(&["wardrobe", "fail"])).await.unwrap_err();
    assert!(matches!(error, WardrobeError::HandlerError { .. }));
    assert!(error.to_string().contains("nothing to do"));
}

#[tokio::test]
async fn test_missing_required_argument_is_a_parse_error() {
    let project = Project::new();
    project.write_command("copy.ts", "");

    let loader = StaticLoader::new().with_module("copy.ts", |path| {
        PluginHandle::new(path).with_command(
            DescriptorCommand::new("copy files", |_| Ok(()))
                .with_argument(CommandArgument::required("src")),
        )
    });
    let app = Wardrobe::new(loader, LocalStorageBackend::new());

    let error = app.run(project.env(&["wardrobe", "copy"])).await.unwrap_err();
    assert!(matches!(error, WardrobeError::ParseError(_)));
    assert_eq!(error.exit_code(), 2);
}
