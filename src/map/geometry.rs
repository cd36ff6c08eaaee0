use crate::braille::BrailleCanvas;

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel_signed(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Circle outline (midpoint algorithm). Every `stride`-th step is drawn, so
/// `stride > 1` gives a dotted ring.
pub fn draw_ring(canvas: &mut BrailleCanvas, cx: i32, cy: i32, radius: i32, stride: u32) {
    if radius <= 0 {
        canvas.set_pixel_signed(cx, cy);
        return;
    }
    let stride = stride.max(1);

    let mut x = radius;
    let mut y = 0;
    let mut err = 1 - radius;
    let mut step = 0u32;

    while x >= y {
        if step % stride == 0 {
            for (px, py) in [(x, y), (y, x), (-y, x), (-x, y), (-x, -y), (-y, -x), (y, -x), (x, -y)] {
                canvas.set_pixel_signed(cx + px, cy + py);
            }
        }
        step += 1;

        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_line() {
        let mut canvas = BrailleCanvas::new(5, 1);
        draw_line(&mut canvas, 0, 0, 9, 0);
        // top dots of every cell
        assert_eq!(canvas.to_string(), "⠉⠉⠉⠉⠉");
    }

    #[test]
    fn test_vertical_line() {
        let mut canvas = BrailleCanvas::new(1, 2);
        draw_line(&mut canvas, 0, 0, 0, 7);
        assert_eq!(canvas.to_string(), "⡇\n⡇");
    }

    #[test]
    fn ring_touches_its_extremes() {
        let mut canvas = BrailleCanvas::new(20, 10);
        draw_ring(&mut canvas, 20, 20, 10, 1);
        for (x, y) in [(30, 20), (10, 20), (20, 30), (20, 10)] {
            assert!(canvas.is_cell_set(x / 2, y / 4), "({x}, {y})");
        }
        // centre stays empty
        assert!(!canvas.is_cell_set(10, 5));
    }
}
