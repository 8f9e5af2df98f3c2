use clap::ValueEnum;

/// 亮度字符梯：由暗到亮
pub const ASCII_RAMP: &[char] = &[
    ' ', '.', ',', '-', '~', ':', ';', '=', '!', '*', '#', '$', '@',
];

/// 块状字符梯，观感更实
pub const BLOCK_RAMP: &[char] = &[' ', '░', '▒', '▓', '█'];

/// 字符画字符集
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Charset {
    Ascii,
    Blocks,
}

impl Charset {
    pub fn ramp(&self) -> &'static [char] {
        match self {
            Charset::Ascii => ASCII_RAMP,
            Charset::Blocks => BLOCK_RAMP,
        }
    }
}

/// BT.601 亮度
fn luminance(r: u8, g: u8, b: u8) -> f64 {
    0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64
}

/// 亮度映射到字符梯
pub fn glyph(ramp: &[char], luma: f64) -> char {
    let index = (luma / 256.0 * ramp.len() as f64) as usize;
    ramp[index.min(ramp.len() - 1)]
}

/// 由终端尺寸和视频宽高比推导字符画输出尺寸（像素）
///
/// 顶部标题行和底部状态行各占一行；终端字符约为 1:2 的宽高比，
/// 每个像素横向画两个字符补偿。
pub fn fit_size(term_size: (u16, u16), src_width: u32, src_height: u32) -> (u32, u32) {
    let cols = term_size.0.max(4) as f64;
    let rows = term_size.1.saturating_sub(2).max(1) as f64;
    let aspect = src_width.max(1) as f64 / src_height.max(1) as f64;

    let mut height = rows;
    let mut width = height * aspect;
    if width * 2.0 > cols {
        width = cols / 2.0;
        height = width / aspect;
    }

    ((width as u32).max(1), (height as u32).max(1))
}

/// 把一帧 RGB24 像素转成字符画行
///
/// `stride` 是帧缓冲的行跨度（字节），可能大于 `width * 3`。
pub fn frame_rows(data: &[u8], stride: usize, width: u32, height: u32, ramp: &[char]) -> Vec<String> {
    let width = width as usize;
    let mut rows = Vec::with_capacity(height as usize);
    for y in 0..height as usize {
        let row = &data[y * stride..y * stride + width * 3];
        let mut line = String::with_capacity(width * 2);
        for x in 0..width {
            let ch = glyph(ramp, luminance(row[x * 3], row[x * 3 + 1], row[x * 3 + 2]));
            // 每个像素画两个字符，抵消终端字符的纵向拉伸
            line.push(ch);
            line.push(ch);
        }
        rows.push(line);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_bounds() {
        assert_eq!(glyph(ASCII_RAMP, 0.0), ' ');
        assert_eq!(glyph(ASCII_RAMP, 255.0), '@');
        assert_eq!(glyph(BLOCK_RAMP, 255.0), '█');
        // 中间亮度落在梯内
        let mid = glyph(ASCII_RAMP, 128.0);
        assert!(ASCII_RAMP.contains(&mid));
        assert_ne!(mid, ' ');
        assert_ne!(mid, '@');
    }

    #[test]
    fn test_fit_size_narrow_terminal() {
        // 终端太窄时以列数定宽
        let (w, h) = fit_size((40, 50), 1920, 1080);
        assert_eq!(w, 20);
        assert!(h <= 48);
        assert!(h >= 1);
    }

    #[test]
    fn test_fit_size_wide_terminal() {
        // 终端够宽时吃满可用行数
        let (w, h) = fit_size((400, 26), 1920, 1080);
        assert_eq!(h, 24);
        assert!((w as f64 / h as f64 - 1920.0 / 1080.0).abs() < 0.1);
    }

    #[test]
    fn test_fit_size_never_zero() {
        let (w, h) = fit_size((1, 1), 1920, 1080);
        assert!(w >= 1 && h >= 1);
        let (w, h) = fit_size((80, 24), 0, 0);
        assert!(w >= 1 && h >= 1);
    }

    #[test]
    fn test_frame_rows_with_stride_padding() {
        // 2x2 帧，行跨度 8（含 2 字节对齐填充）
        let mut data = vec![0u8; 16];
        // 第二行第二个像素为纯白
        data[8 + 3] = 255;
        data[8 + 4] = 255;
        data[8 + 5] = 255;
        let rows = frame_rows(&data, 8, 2, 2, ASCII_RAMP);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], "    ");
        assert_eq!(rows[1], "  @@");
    }
}
