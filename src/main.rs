use std::process::ExitCode;
use wardrobe::{
    core::{ProcessEnvironment, WardrobeError},
    logging::init_logging,
    module::ManifestLoader,
    storage::local::LocalStorageBackend,
    Wardrobe,
};

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let env = match ProcessEnvironment::from_process() {
        Ok(env) => env,
        Err(error) => {
            eprintln!("error: cannot read the current directory: {error}");
            return ExitCode::FAILURE;
        }
    };

    let app = Wardrobe::new(ManifestLoader::new(), LocalStorageBackend::new());
    let code = match app.run(env).await {
        Ok(code) => code,
        // clap がヘルプ・バージョン・使い方エラーを整形して出力する
        Err(WardrobeError::ParseError(error)) => {
            if let Err(print_error) = error.print() {
                tracing::debug!("failed to print usage error: {print_error}");
            }
            error.exit_code()
        }
        Err(error) => {
            eprintln!("error: {:#}", anyhow::Error::from(error));
            1
        }
    };

    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
