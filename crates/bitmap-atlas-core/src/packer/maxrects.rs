use super::Packer;
use crate::config::MaxRectsHeuristic;
use crate::model::Rect;

/// MaxRects free-list packer: keeps every maximal free rectangle and splits all
/// of them that a new slot touches.
pub struct MaxRectsPacker {
    border: Rect,
    free: Vec<Rect>,
    used: Vec<Rect>,
    heuristic: MaxRectsHeuristic,
}

impl MaxRectsPacker {
    pub fn new(border: Rect, heuristic: MaxRectsHeuristic) -> Self {
        let free = if border.w > 0 && border.h > 0 {
            vec![border]
        } else {
            Vec::new()
        };
        Self {
            border,
            free,
            used: Vec::new(),
            heuristic,
        }
    }

    fn place(&mut self, node: Rect) {
        let mut next: Vec<Rect> = Vec::with_capacity(self.free.len() + 4);
        for fr in &self.free {
            if !fr.intersects(&node) {
                next.push(*fr);
                continue;
            }
            // Up to four maximal pieces of `fr` around `node`.
            if node.y > fr.y {
                next.push(Rect::new(fr.x, fr.y, fr.w, node.y - fr.y));
            }
            if node.bottom() < fr.bottom() {
                next.push(Rect::new(fr.x, node.bottom(), fr.w, fr.bottom() - node.bottom()));
            }
            if node.x > fr.x {
                next.push(Rect::new(fr.x, fr.y, node.x - fr.x, fr.h));
            }
            if node.right() < fr.right() {
                next.push(Rect::new(node.right(), fr.y, fr.right() - node.right(), fr.h));
            }
        }
        self.free = next;
        self.prune();
        self.used.push(node);
    }

    /// Drops free rectangles contained in another one.
    fn prune(&mut self) {
        let mut i = 0;
        while i < self.free.len() {
            let a = self.free[i];
            let mut remove_i = false;
            let mut j = i + 1;
            while j < self.free.len() {
                let b = self.free[j];
                if b.contains(&a) {
                    remove_i = true;
                    break;
                }
                if a.contains(&b) {
                    self.free.remove(j);
                    continue;
                }
                j += 1;
            }
            if remove_i {
                self.free.remove(i);
            } else {
                i += 1;
            }
        }
    }

    fn score(&self, fr: &Rect, w: u32, h: u32) -> (i64, i64) {
        let leftover_h = fr.w as i64 - w as i64;
        let leftover_v = fr.h as i64 - h as i64;
        let short_fit = leftover_h.min(leftover_v);
        let long_fit = leftover_h.max(leftover_v);
        let area_fit = fr.area() as i64 - (w as i64 * h as i64);
        match self.heuristic {
            MaxRectsHeuristic::BestAreaFit => (area_fit, short_fit),
            MaxRectsHeuristic::BestShortSideFit => (short_fit, long_fit),
            MaxRectsHeuristic::BestLongSideFit => (long_fit, short_fit),
            MaxRectsHeuristic::BottomLeft => ((fr.y + h) as i64, fr.x as i64),
            MaxRectsHeuristic::ContactPoint => {
                // more contact is better; negate for minimization
                let contact = self.contact_score(&Rect::new(fr.x, fr.y, w, h));
                (-(contact as i64), area_fit)
            }
        }
    }

    fn find_position(&self, w: u32, h: u32) -> Option<Rect> {
        let mut best: Option<((i64, i64), Rect)> = None;
        for fr in self.free.iter().filter(|fr| fr.w >= w && fr.h >= h) {
            let s = self.score(fr, w, h);
            let better = match &best {
                None => true,
                Some((bs, br)) => s < *bs || (s == *bs && (fr.y, fr.x) < (br.y, br.x)),
            };
            if better {
                best = Some((s, Rect::new(fr.x, fr.y, w, h)));
            }
        }
        best.map(|(_, r)| r)
    }

    fn contact_score(&self, node: &Rect) -> u64 {
        let mut score = 0u64;
        if node.x == self.border.x || node.right() == self.border.right() {
            score += node.h as u64;
        }
        if node.y == self.border.y || node.bottom() == self.border.bottom() {
            score += node.w as u64;
        }
        for u in &self.used {
            if node.x == u.right() || u.x == node.right() {
                score += overlap_1d(node.y, node.bottom(), u.y, u.bottom()) as u64;
            }
            if node.y == u.bottom() || u.y == node.bottom() {
                score += overlap_1d(node.x, node.right(), u.x, u.right()) as u64;
            }
        }
        score
    }
}

fn overlap_1d(a1: u32, a2: u32, b1: u32, b2: u32) -> u32 {
    a2.min(b2).saturating_sub(a1.max(b1))
}

impl Packer for MaxRectsPacker {
    fn pack(&mut self, w: u32, h: u32) -> Option<Rect> {
        if w == 0 || h == 0 {
            return None;
        }
        let node = self.find_position(w, h)?;
        self.place(node);
        Some(node)
    }
}
