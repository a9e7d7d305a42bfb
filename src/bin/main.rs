//! 页面渲染命令行

use clap::{Parser, Subcommand, ValueEnum};
use page_render::config::{EngineConfig, EvaluatorKind};
use page_render::preview_sync::PreviewSync;
use page_render::{PageApp, PageDocument};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "page-render", about = "Render page-builder component trees")]
struct Cli {
    /// 引擎配置文件
    #[arg(long, default_value = "engine.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 渲染一个页面文件
    Render {
        page: PathBuf,
        /// 覆盖配置中的表达式引擎
        #[arg(long, value_enum)]
        engine: Option<Engine>,
        /// 渲染前通过 HTTP 加载数据源
        #[arg(long)]
        fetch: bool,
        #[arg(long, value_enum, default_value_t = Format::Html)]
        format: Format,
        /// 输出文件，缺省打印到标准输出
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// 列出已注册组件
    Components,
    /// 按同步请求写入预览工程
    Sync {
        request: PathBuf,
        #[arg(long)]
        target: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Engine {
    Path,
    Js,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Html,
    Json,
}

fn main() -> Result<(), String> {
    env_logger::init();
    let cli = Cli::parse();
    let mut config = EngineConfig::load_or_default(&cli.config);

    match cli.command {
        Command::Render { page, engine, fetch, format, output } => {
            if let Some(engine) = engine {
                config.evaluator = match engine {
                    Engine::Path => EvaluatorKind::Path,
                    Engine::Js => EvaluatorKind::Js,
                };
            }

            let document = PageDocument::load(&page).map_err(|e| e.to_string())?;
            let mut app = PageApp::new(config)?;
            document.install(&mut app).map_err(|e| e.to_string())?;
            if fetch {
                app.refresh(&document.page);
            }

            let pass = app.render_page(&document.page, &document.tree);
            let rendered = match format {
                Format::Html => pass.output.to_html(),
                Format::Json => serde_json::to_string_pretty(&serde_json::json!({
                    "output": pass.output,
                    "diagnostics": pass.diagnostics,
                }))
                .map_err(|e| e.to_string())?,
            };

            match output {
                Some(path) => std::fs::write(&path, rendered).map_err(|e| e.to_string())?,
                None => println!("{}", rendered),
            }

            for d in &pass.diagnostics {
                eprintln!(
                    "⚠️  {}{}: {}",
                    d.node_id,
                    d.prop.as_deref().map(|p| format!(".{}", p)).unwrap_or_default(),
                    d.message
                );
            }
        }
        Command::Components => {
            let app = PageApp::new(config)?;
            for name in app.registry().registered_components() {
                println!("{}", name);
            }
        }
        Command::Sync { request, target } => {
            let mut preview = config.preview.clone();
            if let Some(target) = target {
                preview.target_dir = target.to_string_lossy().into_owned();
            }
            let body = std::fs::read_to_string(&request).map_err(|e| e.to_string())?;
            let response = PreviewSync::from_config(&preview).handle("POST", &body);
            println!("{}", response.body);
            if response.status != 200 {
                return Err(format!("sync failed with status {}", response.status));
            }
        }
    }

    Ok(())
}
