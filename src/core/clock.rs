use std::time::Instant;

use crate::core::types::TimeBase;

/// 演示时钟 - 把墙钟流逝时间映射到轨道自己的时间基刻度域
///
/// 每条轨道各自持有一个实例，原点在会话打开时捕获一次；
/// 调度器只拿本轨道的刻度与本轨道的帧时间戳比较，从不跨轨道换算。
pub struct TrackClock {
    origin: Instant,
    ticks_per_sec: f64,
}

impl TrackClock {
    pub fn new(time_base: TimeBase) -> Self {
        Self::with_origin(time_base, Instant::now())
    }

    /// 指定原点时刻创建（测试里用合成时刻驱动）
    pub fn with_origin(time_base: TimeBase, origin: Instant) -> Self {
        Self {
            origin,
            ticks_per_sec: time_base.ticks_per_second(),
        }
    }

    /// 给定时刻相对原点流逝的刻度数
    ///
    /// Instant 单调且早于原点的时刻按零处理，因此返回值在会话内单调不减。
    pub fn ticks_at(&self, now: Instant) -> i64 {
        let elapsed = now.saturating_duration_since(self.origin);
        (elapsed.as_secs_f64() * self.ticks_per_sec) as i64
    }

    /// 当前流逝刻度数
    pub fn elapsed_ticks(&self) -> i64 {
        self.ticks_at(Instant::now())
    }
}
