use anyhow::{bail, Result};
use perceptor_client::utils::logging;
use perceptor_client::{CancellationToken, ClientSettings, PerceptorClient, PerceptorRequest};
use tracing::{error, info};

/// 配置文件路径的环境变量，未设置时从环境变量读取配置
const CONFIG_PATH_ENV: &str = "PERCEPTOR_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置
    let settings = match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) => ClientSettings::from_toml_file(path)?,
        Err(_) => ClientSettings::from_env(),
    };

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((text, instructions)) = args.split_first() else {
        bail!("用法: perceptor_client <文本> <指令>...");
    };
    if instructions.is_empty() {
        bail!("至少需要一条指令");
    }

    let client = PerceptorClient::from_settings(settings)?;

    // Ctrl-C 取消所有未完成的请求
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("🛑 收到中断信号，取消请求");
                cancel.cancel();
            }
        });
    }

    let instructions: Vec<&str> = instructions.iter().map(String::as_str).collect();
    let results = client
        .ask_text(
            text,
            &PerceptorRequest::with_flavor("original"),
            &instructions,
            &cancel,
        )
        .await?;

    for result in results {
        if result.is_success {
            println!(
                "✅ {}: {}",
                result.instruction_text,
                serde_json::to_string(&result.response)?
            );
        } else {
            error!("❌ {}: {}", result.instruction_text, result.error_text);
        }
    }

    Ok(())
}
