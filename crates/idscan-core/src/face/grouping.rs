//! Clustering of raw sliding-window hits.
//!
//! Follows OpenCV's `groupRectangles`: hits are partitioned into classes of
//! similar rectangles, each class is averaged, weak classes are rejected and
//! classes nested inside a stronger neighbour are dropped.

/// Relative tolerance used when comparing rectangles.
pub const GROUP_EPS: f64 = 0.2;

/// Integer rectangle as produced by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl Rect {
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    fn similar(&self, other: &Rect, eps: f64) -> bool {
        let delta = eps
            * (self.width.min(other.width) + self.height.min(other.height)) as f64
            * 0.5;
        ((self.x - other.x).abs() as f64) <= delta
            && ((self.y - other.y).abs() as f64) <= delta
            && ((self.x + self.width - other.x - other.width).abs() as f64) <= delta
            && ((self.y + self.height - other.y - other.height).abs() as f64) <= delta
    }
}

pub(crate) fn cv_round(value: f64) -> i64 {
    value.round_ties_even() as i64
}

/// Group rectangles, keeping classes with more than `threshold` members.
///
/// A non-positive threshold returns the input unchanged.
pub fn group_rectangles(rects: &[Rect], threshold: i32, eps: f64) -> Vec<Rect> {
    if threshold <= 0 || rects.is_empty() {
        return rects.to_vec();
    }

    let (labels, class_count) = partition(rects, eps);

    let mut totals = vec![(0i64, 0i64, 0i64, 0i64); class_count];
    let mut weights = vec![0i32; class_count];
    for (rect, &label) in rects.iter().zip(&labels) {
        let t = &mut totals[label];
        t.0 += rect.x;
        t.1 += rect.y;
        t.2 += rect.width;
        t.3 += rect.height;
        weights[label] += 1;
    }

    let averaged: Vec<Rect> = totals
        .iter()
        .zip(&weights)
        .map(|(t, &n)| {
            let s = 1.0 / n as f64;
            Rect::new(
                cv_round(t.0 as f64 * s),
                cv_round(t.1 as f64 * s),
                cv_round(t.2 as f64 * s),
                cv_round(t.3 as f64 * s),
            )
        })
        .collect();

    let mut grouped = Vec::new();
    for (i, r1) in averaged.iter().enumerate() {
        let n1 = weights[i];
        if n1 <= threshold {
            continue;
        }

        let nested = averaged.iter().enumerate().any(|(j, r2)| {
            let n2 = weights[j];
            if j == i || n2 <= threshold {
                return false;
            }
            let dx = cv_round(r2.width as f64 * eps);
            let dy = cv_round(r2.height as f64 * eps);
            r1.x >= r2.x - dx
                && r1.y >= r2.y - dy
                && r1.x + r1.width <= r2.x + r2.width + dx
                && r1.y + r1.height <= r2.y + r2.height + dy
                && (n2 > n1.max(3) || n1 < 3)
        });

        if !nested {
            grouped.push(*r1);
        }
    }

    grouped
}

/// Union-find partition. Labels are numbered in order of first appearance.
fn partition(rects: &[Rect], eps: f64) -> (Vec<usize>, usize) {
    let mut parent: Vec<usize> = (0..rects.len()).collect();

    fn find(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    for i in 0..rects.len() {
        for j in 0..i {
            if rects[i].similar(&rects[j], eps) {
                let ri = find(&mut parent, i);
                let rj = find(&mut parent, j);
                if ri != rj {
                    parent[ri] = rj;
                }
            }
        }
    }

    let mut class_of_root = vec![usize::MAX; rects.len()];
    let mut labels = Vec::with_capacity(rects.len());
    let mut count = 0;
    for i in 0..rects.len() {
        let root = find(&mut parent, i);
        if class_of_root[root] == usize::MAX {
            class_of_root[root] = count;
            count += 1;
        }
        labels.push(class_of_root[root]);
    }

    (labels, count)
}
