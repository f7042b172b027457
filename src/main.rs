mod cli;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands, ConfigAction};
use repo_grader::config::{Config, ReportFormat};
use repo_grader::operations::{record_io, run_batch, BatchRequest};
use repo_grader::scanner::RepoWalker;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志，默认 INFO，--verbose 时 DEBUG
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    // 加载配置
    let config = if let Some(config_path) = &cli.config {
        Config::load_from_file(config_path)?
    } else {
        Config::load_or_create_default()?
    };

    // 根据命令执行相应操作
    match cli.command {
        Commands::Run {
            input,
            output,
            temp_root,
            threshold,
            concurrency,
            timeout,
            keep_workspace,
            format,
        } => {
            let mut config = config;
            let settings = &mut config.analysis;
            if let Some(root) = temp_root {
                settings.temp_root = root;
            }
            if let Some(t) = threshold {
                settings.threshold = t;
            }
            if let Some(c) = concurrency {
                settings.concurrency_limit = c;
            }
            if timeout.is_some() {
                settings.clone_timeout_secs = timeout;
            }
            if keep_workspace {
                settings.cleanup = false;
            }
            config.validate()?;

            let format = format.map(ReportFormat::from).unwrap_or(config.output.format);
            let request = BatchRequest {
                input,
                output: output.or_else(|| config.output.path.clone()),
                settings: config.analysis.clone(),
                show_progress: true,
            };

            let result = run_batch(request).await?;

            match format {
                ReportFormat::Table => println!("{}", record_io::render_table(&result)),
                ReportFormat::Json => println!("{}", record_io::results_to_json(&result)?),
            }
            println!("\n{}", result.summary());
        }
        Commands::Measure { path, threshold } => {
            let threshold = threshold.unwrap_or(config.analysis.threshold);
            if threshold == 0 {
                anyhow::bail!("threshold 必须大于 0");
            }

            let mut settings = config.analysis.clone();
            settings.threshold = threshold;
            let walker = RepoWalker::from_config(&settings);
            let tally = walker.measure(&path);

            println!("目录: {}", path.display());
            println!("文件数: {}", tally.files);
            println!("总行数: {}", tally.total_lines);
            println!("小文件行数 (<{}): {}", walker.threshold(), tally.small_file_lines);
            println!("评分: {:.2}%", tally.grade());
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                println!("{}", toml::to_string_pretty(&config)?);
            }
            ConfigAction::Reset => {
                let path = match &cli.config {
                    Some(path) => path.clone(),
                    None => Config::default_config_path()?,
                };
                Config::default().save_to_file(&path)?;
                println!("已重置配置: {}", path.display());
            }
            ConfigAction::Path => {
                let path = match &cli.config {
                    Some(path) => path.clone(),
                    None => Config::default_config_path()?,
                };
                println!("{}", path.display());
            }
        },
    }

    Ok(())
}
