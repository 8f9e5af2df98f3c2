use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub use log::Level;

/// 日志视图默认保留的行数上限
pub const LOG_MAX_LINES: usize = 1000;

/// 一条会话日志
#[derive(Debug, Clone)]
pub struct LogLine {
    pub level: Level,
    /// 来源类别（demux / decode / sched / ui）
    pub target: String,
    pub message: String,
    /// 同一条消息连续出现的次数
    pub repeats: u32,
}

/// 会话日志缓冲 - 有界行缓冲，重复消息折叠
///
/// 由调用方创建并传入会话各组件，不依赖进程级日志单例；
/// UI 的日志视图从这里读取最近若干行。
pub struct LogSink {
    lines: VecDeque<LogLine>,
    max_lines: usize,
}

impl LogSink {
    pub fn new(max_lines: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            max_lines: max_lines.max(1),
        }
    }

    pub fn push(&mut self, level: Level, target: &str, message: String) {
        // 与上一条完全相同的消息只累加计数
        if let Some(last) = self.lines.back_mut() {
            if last.level == level && last.target == target && last.message == message {
                last.repeats += 1;
                return;
            }
        }
        if self.lines.len() == self.max_lines {
            self.lines.pop_front();
        }
        self.lines.push_back(LogLine {
            level,
            target: target.to_string(),
            message,
            repeats: 1,
        });
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogLine> {
        self.lines.iter()
    }
}

/// 会话日志句柄 - 可克隆，各组件各持一份
#[derive(Clone)]
pub struct SessionLog {
    sink: Arc<Mutex<LogSink>>,
}

impl SessionLog {
    pub fn new(max_lines: usize) -> Self {
        Self {
            sink: Arc::new(Mutex::new(LogSink::new(max_lines))),
        }
    }

    pub fn push(&self, level: Level, target: &str, message: String) {
        if let Ok(mut sink) = self.sink.lock() {
            sink.push(level, target, message);
        }
    }

    pub fn debug(&self, target: &str, message: String) {
        self.push(Level::Debug, target, message);
    }

    pub fn info(&self, target: &str, message: String) {
        self.push(Level::Info, target, message);
    }

    pub fn warn(&self, target: &str, message: String) {
        self.push(Level::Warn, target, message);
    }

    pub fn error(&self, target: &str, message: String) {
        self.push(Level::Error, target, message);
    }

    /// 在持锁状态下读取缓冲内容
    pub fn with<R>(&self, f: impl FnOnce(&LogSink) -> R) -> Option<R> {
        self.sink.lock().ok().map(|sink| f(&sink))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_read() {
        let log = SessionLog::new(16);
        assert!(log.with(|sink| sink.is_empty()).unwrap());
        log.info("demux", "已打开".to_string());
        log.warn("decode", "解码告警".to_string());
        let lines: Vec<_> =
            log.with(|sink| sink.iter().cloned().collect::<Vec<_>>()).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].target, "demux");
        assert_eq!(lines[1].level, Level::Warn);
    }

    #[test]
    fn test_repeated_messages_collapse() {
        let mut sink = LogSink::new(16);
        for _ in 0..5 {
            sink.push(Level::Warn, "decode", "同一条".to_string());
        }
        sink.push(Level::Warn, "decode", "另一条".to_string());
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.iter().next().unwrap().repeats, 5);
    }

    #[test]
    fn test_bounded_lines() {
        let mut sink = LogSink::new(3);
        for i in 0..10 {
            sink.push(Level::Info, "ui", format!("第 {} 行", i));
        }
        assert_eq!(sink.len(), 3);
        // 保留的是最新的几行
        assert_eq!(sink.iter().next().unwrap().message, "第 7 行");
    }
}
