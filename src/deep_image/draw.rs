//! # 标注绘制模块
//!
//! ## 设计思路
//!
//! 颜色参数的三种形态（未指定 / 单色 / 每框一色）建模为 `BoxColors`，
//! 在绘制开始前一次性解析成逐框颜色表，数量不匹配时立即拒绝，不会画到一半才失败。
//!
//! ## 实现思路
//!
//! - 框坐标 `(x, y, width, height)` 转为包含首尾像素的两角坐标
//!   `(x, y)`–`(x + width - 1, y + height - 1)`。
//! - 外框按同心的一像素矩形环逐圈绘制，每条边交给 `imageproc` 的实心矩形，
//!   只遍历与画布相交的部分。线宽为 1 时只画标称外框。
//! - 标签使用 8x8 点阵字体，画在框左上角偏移 `(5, 5)` 处。

use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use crate::error::{ImageError, Result};

const LABEL_OFFSET: i64 = 5;
const GLYPH_SIZE: i64 = 8;
const LINE_GAP: i64 = 2;

/// 轴对齐矩形框，左上角 `(x, y)`，尺寸 `width x height`（像素）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl BoxRect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// 包含首尾像素的两角坐标 `(x0, y0, x1, y1)`。
    ///
    /// 右下角超出 `i32` 范围时返回 `Argument` 错误。
    pub fn corners(&self) -> Result<(i32, i32, i32, i32)> {
        let far_edge = |origin: i32, extent: u32| {
            i32::try_from(extent)
                .ok()
                .and_then(|extent| origin.checked_add(extent - 1))
        };

        match (far_edge(self.x, self.width), far_edge(self.y, self.height)) {
            (Some(x1), Some(y1)) => Ok((self.x, self.y, x1, y1)),
            _ => Err(ImageError::Argument(format!(
                "标注框超出坐标范围：({}, {}, {}, {})",
                self.x, self.y, self.width, self.height
            ))),
        }
    }
}

impl From<(i32, i32, u32, u32)> for BoxRect {
    fn from((x, y, width, height): (i32, i32, u32, u32)) -> Self {
        Self::new(x, y, width, height)
    }
}

/// 标注框颜色策略。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BoxColors {
    /// 所有框使用配置中的默认颜色。
    #[default]
    Default,
    /// 所有框使用同一颜色。
    Uniform(Rgb<u8>),
    /// 每个框一种颜色，数量必须与框数一致。
    PerItem(Vec<Rgb<u8>>),
}

impl BoxColors {
    /// 由颜色列表推断策略：空列表为默认色，单个颜色应用到全部框，否则逐框对应。
    pub fn from_list(colors: Vec<Rgb<u8>>) -> Self {
        match colors.len() {
            0 => Self::Default,
            1 => Self::Uniform(colors[0]),
            _ => Self::PerItem(colors),
        }
    }

    /// 解析为逐框颜色表。
    pub(crate) fn resolve(&self, box_count: usize, default: Rgb<u8>) -> Result<Vec<Rgb<u8>>> {
        match self {
            Self::Default => Ok(vec![default; box_count]),
            Self::Uniform(color) => Ok(vec![*color; box_count]),
            Self::PerItem(colors) if colors.len() == 1 => Ok(vec![colors[0]; box_count]),
            Self::PerItem(colors) if colors.len() == box_count => Ok(colors.clone()),
            Self::PerItem(colors) => Err(ImageError::Argument(format!(
                "颜色数量与框数量不一致：{} 种颜色，{} 个框",
                colors.len(),
                box_count
            ))),
        }
    }
}

/// 标注样式。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxStyle {
    pub colors: BoxColors,
    /// 外框线宽（像素），至少为 1。
    pub line_width: u32,
    /// 是否用框颜色填充框内区域。
    pub fill: bool,
}

impl Default for BoxStyle {
    fn default() -> Self {
        Self {
            colors: BoxColors::Default,
            line_width: 1,
            fill: false,
        }
    }
}

/// 在画布上绘制标注框，参数先整体校验再落笔。
pub(crate) fn draw_boxes_on(
    canvas: &mut RgbImage,
    boxes: &[BoxRect],
    style: &BoxStyle,
    labels: &[&str],
    default_color: Rgb<u8>,
) -> Result<()> {
    if !labels.is_empty() && labels.len() != boxes.len() {
        return Err(ImageError::Argument(format!(
            "标签数量必须为 0 或与框数量一致：{} 个标签，{} 个框",
            labels.len(),
            boxes.len()
        )));
    }
    if style.line_width == 0 {
        return Err(ImageError::Argument("line_width 至少为 1".to_string()));
    }
    let max_line_width = canvas.width().max(canvas.height());
    if style.line_width > max_line_width {
        return Err(ImageError::Argument(format!(
            "line_width 过大：{}（画布最长边 {}）",
            style.line_width, max_line_width
        )));
    }
    if let Some(rect) = boxes.iter().find(|rect| rect.width == 0 || rect.height == 0) {
        return Err(ImageError::Argument(format!(
            "标注框面积为 0：({}, {}, {}, {})",
            rect.x, rect.y, rect.width, rect.height
        )));
    }
    let origins = boxes
        .iter()
        .map(|rect| rect.corners().map(|(x0, y0, _, _)| (x0, y0)))
        .collect::<Result<Vec<_>>>()?;
    let colors = style.colors.resolve(boxes.len(), default_color)?;

    for (idx, ((rect, color), (x0, y0))) in boxes.iter().zip(colors).zip(origins).enumerate() {
        if style.fill {
            let interior = Rect::at(rect.x, rect.y).of_size(rect.width, rect.height);
            draw_filled_rect_mut(canvas, interior, color);
        }
        draw_outline(canvas, rect, style.line_width, color);

        if let Some(label) = labels.get(idx) {
            draw_label(
                canvas,
                label,
                x0 as i64 + LABEL_OFFSET,
                y0 as i64 + LABEL_OFFSET,
                color,
            );
        }
    }

    Ok(())
}

/// 以标称外框为中心逐圈绘制同心矩形，线宽为 1 时只画标称外框。
fn draw_outline(canvas: &mut RgbImage, rect: &BoxRect, line_width: u32, color: Rgb<u8>) {
    let inward = ((line_width - 1) / 2) as i64;
    let outward = (line_width / 2) as i64;

    for offset in -inward..=outward {
        if let Some(ring) = ring_rect(rect, offset) {
            draw_ring(canvas, ring, color);
        }
    }
}

/// 画一像素宽的矩形环。
fn draw_ring(canvas: &mut RgbImage, ring: Rect, color: Rgb<u8>) {
    let edges = [
        Rect::at(ring.left(), ring.top()).of_size(ring.width(), 1),
        Rect::at(ring.left(), ring.bottom()).of_size(ring.width(), 1),
        Rect::at(ring.left(), ring.top()).of_size(1, ring.height()),
        Rect::at(ring.right(), ring.top()).of_size(1, ring.height()),
    ];
    for edge in edges {
        draw_filled_rect_mut(canvas, edge, color);
    }
}

/// 向外扩 `offset` 像素（负数为向内收）后的矩形；退化或超出 `i32` 坐标范围时为 `None`。
fn ring_rect(rect: &BoxRect, offset: i64) -> Option<Rect> {
    let width = rect.width as i64 + 2 * offset;
    let height = rect.height as i64 + 2 * offset;
    if width <= 0 || height <= 0 {
        return None;
    }

    let left = i32::try_from(rect.x as i64 - offset).ok()?;
    let top = i32::try_from(rect.y as i64 - offset).ok()?;
    let width = i32::try_from(width).ok()?;
    let height = i32::try_from(height).ok()?;
    left.checked_add(width - 1)?;
    top.checked_add(height - 1)?;

    Some(Rect::at(left, top).of_size(width as u32, height as u32))
}

/// 用 8x8 点阵字体绘制文本，超出画布的像素直接裁掉。
fn draw_label(canvas: &mut RgbImage, text: &str, x: i64, y: i64, color: Rgb<u8>) {
    let (canvas_w, canvas_h) = (canvas.width() as i64, canvas.height() as i64);
    let mut cursor_x = x;
    let mut cursor_y = y;

    for ch in text.chars() {
        if ch == '\n' {
            cursor_x = x;
            cursor_y += GLYPH_SIZE + LINE_GAP;
            continue;
        }

        let glyph = BASIC_FONTS
            .get(ch)
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or([0; 8]);

        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_SIZE {
                if (bits >> col) & 1 == 0 {
                    continue;
                }
                let px = cursor_x + col;
                let py = cursor_y + row as i64;
                if (0..canvas_w).contains(&px) && (0..canvas_h).contains(&py) {
                    canvas.put_pixel(px as u32, py as u32, color);
                }
            }
        }
        cursor_x += GLYPH_SIZE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb<u8> = Rgb([255, 0, 0]);
    const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
    const BLUE: Rgb<u8> = Rgb([0, 0, 255]);

    fn changed_pixels(before: &RgbImage, after: &RgbImage) -> Vec<(u32, u32)> {
        before
            .enumerate_pixels()
            .filter(|(x, y, pixel)| after.get_pixel(*x, *y) != *pixel)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    #[test]
    fn corners_are_inclusive() {
        assert_eq!(BoxRect::new(10, 10, 50, 30).corners().expect("corners failed"), (10, 10, 59, 39));
        assert_eq!(BoxRect::new(3, 4, 1, 1).corners().expect("corners failed"), (3, 4, 3, 4));
    }

    #[test]
    fn colors_from_list_pick_policy_by_length() {
        assert_eq!(BoxColors::from_list(vec![]), BoxColors::Default);
        assert_eq!(BoxColors::from_list(vec![GREEN]), BoxColors::Uniform(GREEN));
        assert_eq!(
            BoxColors::from_list(vec![GREEN, BLUE]),
            BoxColors::PerItem(vec![GREEN, BLUE])
        );
    }

    #[test]
    fn colors_resolve_per_policy() {
        assert_eq!(BoxColors::Default.resolve(2, RED).expect("resolve failed"), vec![RED, RED]);
        assert_eq!(
            BoxColors::Uniform(BLUE).resolve(3, RED).expect("resolve failed"),
            vec![BLUE, BLUE, BLUE]
        );
        assert_eq!(
            BoxColors::PerItem(vec![GREEN]).resolve(2, RED).expect("resolve failed"),
            vec![GREEN, GREEN]
        );
        assert!(matches!(
            BoxColors::PerItem(vec![GREEN, BLUE]).resolve(3, RED),
            Err(ImageError::Argument(_))
        ));
    }

    #[test]
    fn outline_stays_within_inclusive_rectangle() {
        let blank = RgbImage::new(100, 100);
        let mut canvas = blank.clone();

        draw_boxes_on(&mut canvas, &[BoxRect::new(10, 10, 50, 30)], &BoxStyle::default(), &[], RED)
            .expect("draw failed");

        let changed = changed_pixels(&blank, &canvas);
        assert!(!changed.is_empty());
        assert!(changed.iter().all(|&(x, y)| (10..=59).contains(&x) && (10..=39).contains(&y)));
        for corner in [(10, 10), (59, 10), (10, 39), (59, 39)] {
            assert_eq!(canvas.get_pixel(corner.0, corner.1), &RED);
        }
        assert_eq!(canvas.get_pixel(30, 25), &Rgb([0, 0, 0]));
    }

    #[test]
    fn fill_paints_the_interior() {
        let mut canvas = RgbImage::new(40, 40);
        let style = BoxStyle {
            colors: BoxColors::Uniform(GREEN),
            fill: true,
            ..BoxStyle::default()
        };

        draw_boxes_on(&mut canvas, &[BoxRect::new(5, 5, 10, 10)], &style, &[], RED)
            .expect("draw failed");

        assert_eq!(canvas.get_pixel(9, 9), &GREEN);
        assert_eq!(canvas.get_pixel(20, 20), &Rgb([0, 0, 0]));
    }

    #[test]
    fn thick_outline_spreads_around_nominal_edge() {
        let mut canvas = RgbImage::new(60, 60);
        let style = BoxStyle {
            line_width: 3,
            ..BoxStyle::default()
        };

        draw_boxes_on(&mut canvas, &[BoxRect::new(20, 20, 20, 20)], &style, &[], RED)
            .expect("draw failed");

        assert_eq!(canvas.get_pixel(19, 30), &RED);
        assert_eq!(canvas.get_pixel(20, 30), &RED);
        assert_eq!(canvas.get_pixel(21, 30), &RED);
        assert_eq!(canvas.get_pixel(25, 30), &Rgb([0, 0, 0]));
    }

    #[test]
    fn labels_are_drawn_inside_the_box() {
        let blank = RgbImage::new(80, 80);
        let mut canvas = blank.clone();

        draw_boxes_on(&mut canvas, &[BoxRect::new(10, 10, 60, 30)], &BoxStyle::default(), &["cat"], RED)
            .expect("draw failed");

        let label_pixels = changed_pixels(&blank, &canvas)
            .into_iter()
            .filter(|&(x, y)| (15..15 + 24).contains(&x) && (15..23).contains(&y))
            .count();
        assert!(label_pixels > 0);
    }

    #[test]
    fn label_count_must_match_boxes() {
        let mut canvas = RgbImage::new(20, 20);
        let boxes = [BoxRect::new(0, 0, 5, 5), BoxRect::new(6, 6, 5, 5)];

        let result = draw_boxes_on(&mut canvas, &boxes, &BoxStyle::default(), &["only one"], RED);

        assert!(matches!(result, Err(ImageError::Argument(_))));
        assert_eq!(canvas, RgbImage::new(20, 20));
    }

    #[test]
    fn zero_area_boxes_are_rejected() {
        let mut canvas = RgbImage::new(20, 20);

        let result = draw_boxes_on(&mut canvas, &[BoxRect::new(1, 1, 0, 4)], &BoxStyle::default(), &[], RED);

        assert!(matches!(result, Err(ImageError::Argument(_))));
    }

    #[test]
    fn boxes_partly_outside_canvas_are_clipped() {
        let mut canvas = RgbImage::new(20, 20);

        draw_boxes_on(&mut canvas, &[BoxRect::new(-5, -5, 40, 40)], &BoxStyle::default(), &["edge"], RED)
            .expect("draw failed");

        assert_eq!(canvas.dimensions(), (20, 20));
    }

    #[test]
    fn corners_reject_coordinate_overflow() {
        assert!(matches!(
            BoxRect::new(i32::MAX - 3, 0, 10, 10).corners(),
            Err(ImageError::Argument(_))
        ));
        assert!(matches!(
            BoxRect::new(0, 0, u32::MAX, 10).corners(),
            Err(ImageError::Argument(_))
        ));
        assert_eq!(
            BoxRect::new(i32::MAX - 9, 0, 10, 1).corners().expect("corners failed"),
            (i32::MAX - 9, 0, i32::MAX, 0)
        );
    }

    #[test]
    fn boxes_past_coordinate_range_are_rejected_before_drawing() {
        let mut canvas = RgbImage::new(20, 20);
        let boxes = [BoxRect::new(1, 1, 5, 5), BoxRect::new(i32::MAX - 3, 0, 10, 10)];

        let result = draw_boxes_on(&mut canvas, &boxes, &BoxStyle::default(), &["a", "b"], RED);

        assert!(matches!(result, Err(ImageError::Argument(_))));
        assert_eq!(canvas, RgbImage::new(20, 20));
    }

    #[test]
    fn box_ending_at_coordinate_limit_draws_without_panicking() {
        let blank = RgbImage::new(20, 20);
        let mut canvas = blank.clone();
        let style = BoxStyle {
            line_width: 5,
            fill: true,
            ..BoxStyle::default()
        };

        draw_boxes_on(&mut canvas, &[BoxRect::new(i32::MAX - 9, 0, 10, 10)], &style, &["far"], RED)
            .expect("draw failed");

        assert_eq!(canvas, blank);
    }

    #[test]
    fn line_width_beyond_canvas_is_rejected() {
        let mut canvas = RgbImage::new(30, 20);
        let too_wide = BoxStyle {
            line_width: u32::MAX,
            ..BoxStyle::default()
        };
        let widest = BoxStyle {
            line_width: 30,
            ..BoxStyle::default()
        };

        let rejected = draw_boxes_on(&mut canvas, &[BoxRect::new(5, 5, 10, 10)], &too_wide, &[], RED);
        assert!(matches!(rejected, Err(ImageError::Argument(_))));
        assert_eq!(canvas, RgbImage::new(30, 20));

        draw_boxes_on(&mut canvas, &[BoxRect::new(5, 5, 10, 10)], &widest, &[], RED)
            .expect("draw failed");
        assert_eq!(canvas.get_pixel(0, 0), &RED);
    }
}
