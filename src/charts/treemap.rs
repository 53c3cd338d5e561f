//! Squarified treemap layout (Bruls, Huizing & van Wijk).
//!
//! Sizes are expected largest first. Each step lays a strip of items along
//! the shorter side of the free rectangle, growing the strip while that
//! improves its worst aspect ratio, then recurses into what is left.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
}

impl Rect {
    pub fn area(&self) -> f64 {
        self.dx * self.dy
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.dx / 2.0, self.y + self.dy / 2.0)
    }

    /// Closed outline, suitable for a filled line trace.
    pub fn outline(&self) -> (Vec<f64>, Vec<f64>) {
        let (x0, y0, x1, y1) = (self.x, self.y, self.x + self.dx, self.y + self.dy);
        (vec![x0, x1, x1, x0, x0], vec![y0, y0, y1, y1, y0])
    }
}

/// Scales `sizes` so they sum to the area `dx * dy`.
pub fn normalize_sizes(sizes: &[f64], dx: f64, dy: f64) -> Vec<f64> {
    let total: f64 = sizes.iter().sum();
    if total <= 0.0 {
        return vec![0.0; sizes.len()];
    }
    sizes.iter().map(|s| s * dx * dy / total).collect()
}

fn layout(sizes: &[f64], area: Rect) -> Vec<Rect> {
    let covered: f64 = sizes.iter().sum();
    let mut rects = Vec::with_capacity(sizes.len());
    if area.dx >= area.dy {
        let width = covered / area.dy;
        let mut y = area.y;
        for size in sizes {
            rects.push(Rect { x: area.x, y, dx: width, dy: size / width });
            y += size / width;
        }
    } else {
        let height = covered / area.dx;
        let mut x = area.x;
        for size in sizes {
            rects.push(Rect { x, y: area.y, dx: size / height, dy: height });
            x += size / height;
        }
    }
    rects
}

fn leftover(sizes: &[f64], area: Rect) -> Rect {
    let covered: f64 = sizes.iter().sum();
    if area.dx >= area.dy {
        let width = covered / area.dy;
        Rect { x: area.x + width, y: area.y, dx: area.dx - width, dy: area.dy }
    } else {
        let height = covered / area.dx;
        Rect { x: area.x, y: area.y + height, dx: area.dx, dy: area.dy - height }
    }
}

fn worst_ratio(sizes: &[f64], area: Rect) -> f64 {
    layout(sizes, area)
        .iter()
        .map(|r| (r.dx / r.dy).max(r.dy / r.dx))
        .fold(0.0, f64::max)
}

/// Lays out already-normalized `sizes` inside `area`. Non-positive sizes
/// must be filtered out beforehand.
pub fn squarify(sizes: &[f64], area: Rect) -> Vec<Rect> {
    let mut rects = Vec::with_capacity(sizes.len());
    let mut remaining = sizes;
    let mut free = area;

    while !remaining.is_empty() {
        if remaining.len() == 1 {
            rects.extend(layout(remaining, free));
            break;
        }
        let mut split = 1;
        while split < remaining.len()
            && worst_ratio(&remaining[..split], free) >= worst_ratio(&remaining[..split + 1], free)
        {
            split += 1;
        }
        let (current, rest) = remaining.split_at(split);
        rects.extend(layout(current, free));
        free = leftover(current, free);
        remaining = rest;
    }
    rects
}
