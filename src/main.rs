use clap::Parser;

/// Download CivitAI models into a library organised by type and base model.
///
/// Without arguments an interactive menu starts.
///
/// Examples:
///   civitai-downloader https://civitai.com/models/123456
///   civitai-downloader "https://civitai.com/models/123456?modelVersionId=789012"
#[derive(Parser)]
#[command(name = "civitai-downloader", version, about)]
struct Cli {
    /// Model URLs, processed in order
    #[arg(value_name = "URL")]
    urls: Vec<String>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    if let Err(e) = civitai_downloader_lib::cli::run(cli.urls) {
        log::error!("[CLI] {}", e);
        std::process::exit(1);
    }
}
