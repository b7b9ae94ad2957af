use clap::Parser;

/// OpenAI 兼容的 Banana 图片生成代理
#[derive(Parser, Debug)]
#[command(name = "banana-rs", version, about, long_about = None)]
pub struct Args {
    /// 配置文件路径（JSON），不指定时使用默认配置
    #[arg(short, long)]
    pub config: Option<String>,

    /// 监听地址，覆盖配置文件
    #[arg(long)]
    pub host: Option<String>,

    /// 监听端口，覆盖配置文件
    #[arg(short, long)]
    pub port: Option<u16>,
}
