use super::Packer;
use crate::config::{GuillotineChoice, GuillotineSplit};
use crate::model::Rect;

/// Guillotine packer: each placement cuts its free rectangle in two along one axis.
pub struct GuillotinePacker {
    free: Vec<Rect>,
    choice: GuillotineChoice,
    split: GuillotineSplit,
}

impl GuillotinePacker {
    pub fn new(border: Rect, choice: GuillotineChoice, split: GuillotineSplit) -> Self {
        let free = if border.w > 0 && border.h > 0 {
            vec![border]
        } else {
            Vec::new()
        };
        Self {
            free,
            choice,
            split,
        }
    }

    fn score(&self, fr: &Rect, w: u32, h: u32) -> i64 {
        let area_fit = fr.area() as i64 - (w as i64 * h as i64);
        let leftover_h = fr.w as i64 - w as i64;
        let leftover_v = fr.h as i64 - h as i64;
        let short_fit = leftover_h.min(leftover_v);
        let long_fit = leftover_h.max(leftover_v);
        match self.choice {
            GuillotineChoice::BestAreaFit => area_fit,
            GuillotineChoice::BestShortSideFit => short_fit,
            GuillotineChoice::BestLongSideFit => long_fit,
            GuillotineChoice::WorstAreaFit => -area_fit,
            GuillotineChoice::WorstShortSideFit => -short_fit,
            GuillotineChoice::WorstLongSideFit => -long_fit,
        }
    }

    /// Index of the best free rectangle for a `w`x`h` slot; first wins on ties.
    fn choose(&self, w: u32, h: u32) -> Option<usize> {
        self.free
            .iter()
            .enumerate()
            .filter(|(_, fr)| fr.w >= w && fr.h >= h)
            .min_by_key(|(i, fr)| (self.score(fr, w, h), *i))
            .map(|(i, _)| i)
    }

    /// Splits `fr` around `placed` (at its top-left) into a bottom and a right piece.
    fn cut(&self, fr: &Rect, placed: &Rect) -> [Rect; 2] {
        let w_right = fr.w - placed.w;
        let h_bottom = fr.h - placed.h;
        let horizontal = match self.split {
            GuillotineSplit::SplitShorterLeftoverAxis => h_bottom < w_right,
            GuillotineSplit::SplitLongerLeftoverAxis => h_bottom > w_right,
            GuillotineSplit::SplitMinimizeArea => {
                (w_right as u64 * fr.h as u64) <= (fr.w as u64 * h_bottom as u64)
            }
            GuillotineSplit::SplitMaximizeArea => {
                (w_right as u64 * fr.h as u64) >= (fr.w as u64 * h_bottom as u64)
            }
            GuillotineSplit::SplitShorterAxis => fr.h < fr.w,
            GuillotineSplit::SplitLongerAxis => fr.h > fr.w,
        };
        if horizontal {
            // bottom spans the full width, right only the placed height
            [
                Rect::new(fr.x, placed.bottom(), fr.w, h_bottom),
                Rect::new(placed.right(), fr.y, w_right, placed.h),
            ]
        } else {
            [
                Rect::new(fr.x, placed.bottom(), placed.w, h_bottom),
                Rect::new(placed.right(), fr.y, w_right, fr.h),
            ]
        }
    }

    fn merge_free_list(&mut self) {
        loop {
            let mut merged = None;
            'outer: for i in 0..self.free.len() {
                for j in (i + 1)..self.free.len() {
                    let (a, b) = (self.free[i], self.free[j]);
                    let joined = if a.y == b.y && a.h == b.h && a.right() == b.x {
                        Some(Rect::new(a.x, a.y, a.w + b.w, a.h))
                    } else if a.y == b.y && a.h == b.h && b.right() == a.x {
                        Some(Rect::new(b.x, a.y, a.w + b.w, a.h))
                    } else if a.x == b.x && a.w == b.w && a.bottom() == b.y {
                        Some(Rect::new(a.x, a.y, a.w, a.h + b.h))
                    } else if a.x == b.x && a.w == b.w && b.bottom() == a.y {
                        Some(Rect::new(a.x, b.y, a.w, a.h + b.h))
                    } else {
                        None
                    };
                    if let Some(r) = joined {
                        merged = Some((i, j, r));
                        break 'outer;
                    }
                }
            }
            match merged {
                Some((i, j, r)) => {
                    self.free[i] = r;
                    self.free.remove(j);
                }
                None => break,
            }
        }
    }
}

impl Packer for GuillotinePacker {
    fn pack(&mut self, w: u32, h: u32) -> Option<Rect> {
        if w == 0 || h == 0 {
            return None;
        }
        let idx = self.choose(w, h)?;
        let fr = self.free.remove(idx);
        let placed = Rect::new(fr.x, fr.y, w, h);
        for piece in self.cut(&fr, &placed) {
            if piece.w > 0 && piece.h > 0 {
                self.free.push(piece);
            }
        }
        self.merge_free_list();
        Some(placed)
    }
}
