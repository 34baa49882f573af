use super::Packer;
use crate::model::Rect;

/// One horizontal segment of the skyline: `[x, x + w)` is filled up to `y`.
#[derive(Clone, Copy, Debug)]
struct SkylineNode {
    x: u32,
    y: u32,
    w: u32,
}

impl SkylineNode {
    #[inline]
    fn right(&self) -> u32 {
        self.x + self.w
    }
}

/// Bottom-left skyline packer. Space below the skyline is never reused.
pub struct SkylinePacker {
    border: Rect,
    skylines: Vec<SkylineNode>,
}

impl SkylinePacker {
    pub fn new(border: Rect) -> Self {
        Self {
            border,
            skylines: vec![SkylineNode {
                x: border.x,
                y: border.y,
                w: border.w,
            }],
        }
    }

    /// Slot of size `w`x`h` resting on the skyline starting at segment `i`.
    fn can_put(&self, mut i: usize, w: u32, h: u32) -> Option<Rect> {
        if w > self.border.w || h > self.border.h {
            return None;
        }
        let mut rect = Rect::new(self.skylines[i].x, 0, w, h);
        let mut width_left = w;
        loop {
            rect.y = rect.y.max(self.skylines[i].y);
            if !self.border.contains(&rect) {
                return None;
            }
            if self.skylines[i].w >= width_left {
                return Some(rect);
            }
            width_left -= self.skylines[i].w;
            i += 1;
            if i >= self.skylines.len() {
                return None;
            }
        }
    }

    fn find_bottom_left(&self, w: u32, h: u32) -> Option<(usize, Rect)> {
        let mut best: Option<(usize, Rect)> = None;
        let mut best_width = u32::MAX;
        for i in 0..self.skylines.len() {
            let Some(r) = self.can_put(i, w, h) else {
                continue;
            };
            let better = match &best {
                None => true,
                Some((_, b)) => {
                    r.bottom() < b.bottom()
                        || (r.bottom() == b.bottom() && self.skylines[i].w < best_width)
                }
            };
            if better {
                best_width = self.skylines[i].w;
                best = Some((i, r));
            }
        }
        best
    }

    /// Raises the skyline under `rect`, inserted at segment `index`.
    fn add_level(&mut self, index: usize, rect: &Rect) {
        self.skylines.insert(
            index,
            SkylineNode {
                x: rect.x,
                y: rect.bottom(),
                w: rect.w,
            },
        );
        // Trim or drop the segments now covered by the new one.
        let i = index + 1;
        while i < self.skylines.len() {
            let prev_right = self.skylines[i - 1].right();
            let cur = self.skylines[i];
            if cur.x >= prev_right {
                break;
            }
            let shrink = prev_right - cur.x;
            if cur.w <= shrink {
                self.skylines.remove(i);
            } else {
                self.skylines[i].x += shrink;
                self.skylines[i].w -= shrink;
                break;
            }
        }
        self.merge();
    }

    fn merge(&mut self) {
        let mut i = 1;
        while i < self.skylines.len() {
            if self.skylines[i - 1].y == self.skylines[i].y {
                let w = self.skylines[i].w;
                self.skylines[i - 1].w += w;
                self.skylines.remove(i);
            } else {
                i += 1;
            }
        }
    }
}

impl Packer for SkylinePacker {
    fn pack(&mut self, w: u32, h: u32) -> Option<Rect> {
        if w == 0 || h == 0 {
            return None;
        }
        let (i, place) = self.find_bottom_left(w, h)?;
        self.add_level(i, &place);
        Some(place)
    }
}
