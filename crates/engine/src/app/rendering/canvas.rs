use crate::anim::FrameView;

/// Clipped drawing on an RGBA8 frame buffer. Out-of-bounds writes are
/// dropped, never panics.
pub(crate) struct Canvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> Canvas<'a> {
    pub(crate) fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    pub(crate) fn width(&self) -> u32 {
        self.width
    }

    pub(crate) fn height(&self) -> u32 {
        self.height
    }

    pub(crate) fn clear(&mut self, color: [u8; 4]) {
        for pixel in self.frame.chunks_exact_mut(4) {
            pixel.copy_from_slice(&color);
        }
    }

    pub(crate) fn put_pixel(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        if let Some(pixel) = self.frame.get_mut(offset..offset + 4) {
            pixel.copy_from_slice(&color);
        }
    }

    pub(crate) fn fill_rect(
        &mut self,
        x: i32,
        y: i32,
        rect_width: i32,
        rect_height: i32,
        color: [u8; 4],
    ) {
        let start_x = x.max(0);
        let start_y = y.max(0);
        let end_x = x.saturating_add(rect_width).min(self.width as i32);
        let end_y = y.saturating_add(rect_height).min(self.height as i32);
        for py in start_y..end_y {
            for px in start_x..end_x {
                self.put_pixel(px, py, color);
            }
        }
    }

    pub(crate) fn outline_rect(
        &mut self,
        x: i32,
        y: i32,
        rect_width: i32,
        rect_height: i32,
        color: [u8; 4],
    ) {
        if rect_width <= 1 || rect_height <= 1 {
            return;
        }
        self.fill_rect(x, y, rect_width, 1, color);
        self.fill_rect(x, y + rect_height - 1, rect_width, 1, color);
        self.fill_rect(x, y, 1, rect_height, color);
        self.fill_rect(x + rect_width - 1, y, 1, rect_height, color);
    }

    /// Nearest-neighbour blit of `image` centred on `(center_x, center_y)`.
    /// Fully transparent source pixels are skipped.
    pub(crate) fn blit_centered_scaled(
        &mut self,
        image: FrameView<'_>,
        center_x: i32,
        center_y: i32,
        scale: u32,
    ) {
        let expected_len = image.width as usize * image.height as usize * 4;
        if image.width == 0 || image.height == 0 || image.rgba.len() < expected_len {
            return;
        }
        let scale = scale.max(1);
        let scaled_width = (image.width * scale) as i32;
        let scaled_height = (image.height * scale) as i32;
        let left = center_x - scaled_width / 2;
        let top = center_y - scaled_height / 2;

        for dy in 0..scaled_height {
            let src_y = (dy as u32 / scale) as usize;
            for dx in 0..scaled_width {
                let src_x = (dx as u32 / scale) as usize;
                let offset = (src_y * image.width as usize + src_x) * 4;
                let source = &image.rgba[offset..offset + 4];
                if source[3] == 0 {
                    continue;
                }
                self.put_pixel(
                    left + dx,
                    top + dy,
                    [source[0], source[1], source[2], source[3]],
                );
            }
        }
    }
}

/// Largest whole-number scale that fits `image` inside the given box, at
/// least 1.
pub(crate) fn fit_scale(image: FrameView<'_>, box_width: u32, box_height: u32) -> u32 {
    if image.width == 0 || image.height == 0 {
        return 1;
    }
    (box_width / image.width).min(box_height / image.height).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(frame: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let offset = ((y * width + x) * 4) as usize;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    #[test]
    fn clipped_writes_never_leave_the_buffer() {
        let mut frame = vec![0u8; 4 * 4 * 4];
        let mut canvas = Canvas::new(&mut frame, 4, 4);
        canvas.fill_rect(-10, -10, 100, 100, [1, 2, 3, 4]);
        canvas.put_pixel(4, 0, [9, 9, 9, 9]);
        canvas.put_pixel(-1, 2, [9, 9, 9, 9]);
        canvas.outline_rect(2, 2, 50, 50, [5, 5, 5, 5]);
        assert_eq!(pixel(&frame, 4, 3, 3), [1, 2, 3, 4]);
        assert_eq!(pixel(&frame, 4, 2, 3), [5, 5, 5, 5]);
    }

    #[test]
    fn blit_scales_and_skips_transparent_pixels() {
        let rgba = [
            255, 0, 0, 255, //
            0, 0, 0, 0,
        ];
        let image = FrameView {
            width: 2,
            height: 1,
            rgba: &rgba,
        };
        let mut frame = vec![7u8; 8 * 4 * 4];
        let mut canvas = Canvas::new(&mut frame, 8, 4);
        canvas.blit_centered_scaled(image, 4, 2, 2);

        assert_eq!(pixel(&frame, 8, 2, 1), [255, 0, 0, 255]);
        assert_eq!(pixel(&frame, 8, 3, 2), [255, 0, 0, 255]);
        assert_eq!(pixel(&frame, 8, 4, 1), [7, 7, 7, 7]);
        assert_eq!(pixel(&frame, 8, 0, 0), [7, 7, 7, 7]);
    }

    #[test]
    fn short_pixel_data_is_ignored() {
        let image = FrameView {
            width: 4,
            height: 4,
            rgba: &[255; 8],
        };
        let mut frame = vec![0u8; 4 * 4 * 4];
        Canvas::new(&mut frame, 4, 4).blit_centered_scaled(image, 2, 2, 1);
        assert!(frame.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn fit_scale_uses_the_tighter_axis() {
        let image = FrameView {
            width: 10,
            height: 20,
            rgba: &[],
        };
        assert_eq!(fit_scale(image, 100, 100), 5);
        assert_eq!(fit_scale(image, 5, 5), 1);
    }
}
