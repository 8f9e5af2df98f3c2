use anyhow::Result;
use clap::Parser;
use log::info;

mod app;
mod core;
mod player;
mod ui;

use ui::Charset;

/// 终端字符画媒体播放器
#[derive(Parser)]
#[command(version, about = "终端字符画媒体播放器")]
struct Args {
    /// 媒体文件路径或 URL
    input: String,

    /// 每轨解码帧队列容量
    #[arg(long, default_value_t = player::DEFAULT_QUEUE_CAPACITY)]
    queue_capacity: usize,

    /// 字符画字符集
    #[arg(long, value_enum, default_value = "ascii")]
    charset: Charset,

    /// 放开 FFmpeg 自身的日志级别
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // 进程级日志只用于进入/退出终端会话前后
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    ffmpeg_next::init().map_err(|e| anyhow::anyhow!("FFmpeg 初始化失败: {}", e))?;
    ffmpeg_next::util::log::set_level(if args.verbose {
        ffmpeg_next::util::log::Level::Verbose
    } else {
        ffmpeg_next::util::log::Level::Error
    });

    info!("打开媒体源: {}", args.input);
    app::run(app::PlayOptions {
        input: args.input,
        capacity: args.queue_capacity.max(1),
        charset: args.charset,
    })?;
    info!("播放结束");

    Ok(())
}
