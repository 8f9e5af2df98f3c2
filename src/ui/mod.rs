// 终端 UI：字符画渲染、信息/日志视图与非阻塞输入轮询

pub mod ascii;

use std::io::{self, Write};
use std::time::Duration;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{
    self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, queue};

use crate::core::log::Level;
use crate::core::{MediaSummary, Result, SessionLog, TrackDetail};
use crate::player::PlaybackState;

pub use ascii::Charset;

/// 用户指令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    NextView,
    ScrollUp,
    ScrollDown,
}

/// 当前视图
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Video,
    Info,
    Logs,
}

impl View {
    fn next(self) -> Self {
        match self {
            View::Video => View::Info,
            View::Info => View::Logs,
            View::Logs => View::Video,
        }
    }

    fn title(self) -> &'static str {
        match self {
            View::Video => "视频",
            View::Info => "信息",
            View::Logs => "日志",
        }
    }
}

/// 播放状态行数据
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaybackStatus {
    pub video_seq: u64,
    pub video_pts: i64,
    pub video_queued: usize,
    pub audio_seq: u64,
    pub audio_pts: i64,
}

/// 终端 UI 会话
///
/// 创建时进入原始模式和备用屏幕，Drop 时恢复终端。
pub struct Ui {
    out: io::Stdout,
    view: View,
    log_scroll: usize,
    size: (u16, u16),
}

impl Ui {
    pub fn new() -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        execute!(out, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        let size = terminal::size()?;
        Ok(Self {
            out,
            view: View::Video,
            log_scroll: 0,
            size,
        })
    }

    pub fn size(&self) -> (u16, u16) {
        self.size
    }

    /// 非阻塞轮询一条用户指令；最多等待 1ms，兼作调度 tick 的让出点
    pub fn poll_command(&mut self) -> Result<Option<Command>> {
        if !event::poll(Duration::from_millis(1))? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                let command = match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        Some(Command::Quit)
                    }
                    KeyCode::Tab => Some(Command::NextView),
                    KeyCode::Up => Some(Command::ScrollUp),
                    KeyCode::Down => Some(Command::ScrollDown),
                    _ => None,
                };
                Ok(command)
            }
            Event::Resize(cols, rows) => {
                self.size = (cols, rows);
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    /// 应用一条视图指令（Quit 由调度器处理）
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::NextView => {
                self.view = self.view.next();
                self.log_scroll = 0;
            }
            Command::ScrollUp => self.log_scroll = self.log_scroll.saturating_add(1),
            Command::ScrollDown => self.log_scroll = self.log_scroll.saturating_sub(1),
            Command::Quit => {}
        }
    }

    /// 重绘当前视图
    pub fn draw(
        &mut self,
        frame: &[String],
        status: &PlaybackStatus,
        summary: &MediaSummary,
        log: &SessionLog,
        state: PlaybackState,
    ) -> Result<()> {
        self.draw_header()?;
        match self.view {
            View::Video => self.draw_video(frame)?,
            View::Info => self.draw_info(summary)?,
            View::Logs => self.draw_logs(log)?,
        }
        self.draw_status(status, state)?;
        self.out.flush()?;
        Ok(())
    }

    fn draw_header(&mut self) -> Result<()> {
        let header = format!(
            "[{}]  Tab 切换视图  ↑/↓ 滚动日志  q 退出",
            self.view.title()
        );
        queue!(
            self.out,
            MoveTo(0, 0),
            SetForegroundColor(Color::Cyan),
            Print(header),
            ResetColor,
            Clear(ClearType::UntilNewLine)
        )?;
        Ok(())
    }

    fn body_rows(&self) -> u16 {
        self.size.1.saturating_sub(2).max(1)
    }

    fn draw_video(&mut self, frame: &[String]) -> Result<()> {
        let body = self.body_rows() as usize;
        let cols = self.size.0 as usize;
        for y in 0..body {
            queue!(self.out, MoveTo(0, (y + 1) as u16))?;
            if let Some(line) = frame.get(y) {
                // 终端中途变窄时按列数截断
                let clipped: String = line.chars().take(cols).collect();
                queue!(self.out, Print(clipped))?;
            } else if y == 0 && frame.is_empty() {
                queue!(self.out, Print("正在缓冲..."))?;
            }
            queue!(self.out, Clear(ClearType::UntilNewLine))?;
        }
        Ok(())
    }

    fn draw_status(&mut self, status: &PlaybackStatus, state: PlaybackState) -> Result<()> {
        let state_label = match state {
            PlaybackState::Running => "播放中",
            PlaybackState::Draining => "排空中",
            PlaybackState::Stopped => "已停止",
        };
        let status_line = format!(
            "帧 {:4}  pts {:8}  队列 {:2}  |  音频帧 {:4}  |  {}",
            status.video_seq, status.video_pts, status.video_queued, status.audio_seq, state_label
        );
        queue!(
            self.out,
            MoveTo(0, self.size.1.saturating_sub(1)),
            Print(status_line),
            Clear(ClearType::UntilNewLine)
        )?;
        Ok(())
    }

    fn draw_info(&mut self, summary: &MediaSummary) -> Result<()> {
        let mut lines = vec![
            summary.url.clone(),
            format!(
                "格式: {}, 时长: {}",
                summary.format,
                format_duration(summary.duration_us)
            ),
            String::new(),
        ];
        lines.push(format!("视频 ({}):", summary.video.stream_index));
        if let TrackDetail::Video {
            width,
            height,
            frame_rate,
        } = summary.video.detail
        {
            lines.push(format!(
                "  分辨率: {}x{}, 帧率: {}/{}, 时间基: {}/{}",
                width,
                height,
                frame_rate.0,
                frame_rate.1,
                summary.video.time_base.num,
                summary.video.time_base.den
            ));
        }
        lines.push(format!(
            "  编码: {}, 码率: {}",
            summary.video.codec, summary.video.bit_rate
        ));
        lines.push(String::new());
        lines.push(format!("音频 ({}):", summary.audio.stream_index));
        if let TrackDetail::Audio {
            channels,
            sample_rate,
        } = summary.audio.detail
        {
            lines.push(format!(
                "  声道: {}, 采样率: {}, 时间基: {}/{}",
                channels,
                sample_rate,
                summary.audio.time_base.num,
                summary.audio.time_base.den
            ));
        }
        lines.push(format!(
            "  编码: {}, 码率: {}",
            summary.audio.codec, summary.audio.bit_rate
        ));

        let body = self.body_rows() as usize;
        for y in 0..body {
            queue!(self.out, MoveTo(0, (y + 1) as u16))?;
            if let Some(line) = lines.get(y) {
                queue!(self.out, Print(line))?;
            }
            queue!(self.out, Clear(ClearType::UntilNewLine))?;
        }
        Ok(())
    }

    fn draw_logs(&mut self, log: &SessionLog) -> Result<()> {
        let body = self.body_rows() as usize;
        let lines: Vec<(Level, String)> = log
            .with(|sink| {
                sink.iter()
                    .map(|line| {
                        let text = if line.repeats > 1 {
                            format!(
                                "[{}] {} (重复 {} 次)",
                                line.target, line.message, line.repeats
                            )
                        } else {
                            format!("[{}] {}", line.target, line.message)
                        };
                        (line.level, text)
                    })
                    .collect()
            })
            .unwrap_or_default();

        // 默认显示最末尾，向上滚动查看更早的行
        let max_scroll = lines.len().saturating_sub(body);
        let scroll = self.log_scroll.min(max_scroll);
        self.log_scroll = scroll;
        let start = max_scroll - scroll;

        for y in 0..body {
            queue!(self.out, MoveTo(0, (y + 1) as u16))?;
            if let Some((level, text)) = lines.get(start + y) {
                let color = match level {
                    Level::Error => Color::Red,
                    Level::Warn => Color::Yellow,
                    Level::Info => Color::Reset,
                    _ => Color::DarkGrey,
                };
                let clipped: String = text.chars().take(self.size.0 as usize).collect();
                queue!(
                    self.out,
                    SetForegroundColor(color),
                    Print(clipped),
                    ResetColor
                )?;
            }
            queue!(self.out, Clear(ClearType::UntilNewLine))?;
        }
        Ok(())
    }
}

impl Drop for Ui {
    fn drop(&mut self) {
        // 尽力恢复终端，失败也无能为力
        let _ = execute!(self.out, Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// 微秒时长格式化为 mm:ss / hh:mm:ss
pub fn format_duration(duration_us: i64) -> String {
    let total_seconds = (duration_us / 1_000_000).max(0);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(90_500_000), "1:30");
        assert_eq!(format_duration(5_025_000_000), "1:23:45");
        assert_eq!(format_duration(-3), "0:00");
    }

    #[test]
    fn test_view_cycle() {
        let view = View::Video;
        assert_eq!(view.next(), View::Info);
        assert_eq!(view.next().next(), View::Logs);
        assert_eq!(view.next().next().next(), View::Video);
    }
}
