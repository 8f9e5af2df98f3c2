use std::time::Instant;

use crate::core::{Result, SessionLog, LOG_MAX_LINES};
use crate::player::{Media, PlaybackState, Released};
use crate::ui::{ascii, Charset, Command, PlaybackStatus, Ui};

/// 播放参数
pub struct PlayOptions {
    pub input: String,
    pub capacity: usize,
    pub charset: Charset,
}

/// 打开媒体源并运行协作式播放循环直到停止
///
/// 循环每轮：轮询输入（兼作让出点）、推进一个调度 tick、
/// 有新帧或有输入时重绘当前视图。
pub fn run(options: PlayOptions) -> Result<()> {
    let log = SessionLog::new(LOG_MAX_LINES);
    let mut ui = Ui::new()?;

    // 打开失败时 ui 随错误传播析构，终端先行恢复
    let media = Media::open(&options.input, ui.size(), options.capacity, &log)?;
    let summary = media.summary().clone();
    let ramp = options.charset.ramp();
    let mut scheduler = media.into_scheduler(log.clone());

    let mut frame_rows: Vec<String> = Vec::new();
    let mut status = PlaybackStatus::default();
    let mut first_draw = true;

    loop {
        let command = ui.poll_command()?;
        if let Some(command) = command {
            ui.apply(command);
        }
        let quit = command == Some(Command::Quit);

        let mut new_frame = false;
        let state = scheduler.tick_at(Instant::now(), quit, |released| match released {
            Released::Video(frame) => {
                frame_rows = ascii::frame_rows(
                    frame.data.data(0),
                    frame.data.stride(0),
                    frame.data.width(),
                    frame.data.height(),
                    ramp,
                );
                status.video_seq = frame.seq;
                status.video_pts = frame.pts;
                status.video_queued = frame.queued;
                new_frame = true;
            }
            Released::Audio(frame) => {
                status.audio_seq = frame.seq;
                status.audio_pts = frame.pts;
            }
        })?;

        if new_frame || command.is_some() || first_draw {
            ui.draw(&frame_rows, &status, &summary, &log, state)?;
            first_draw = false;
        }

        if state == PlaybackState::Stopped {
            break;
        }
    }

    Ok(())
}
