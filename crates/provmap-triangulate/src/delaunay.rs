//! Incremental Delaunay triangulation
//!
//! Points are swept in lexicographic order. Each new point lies outside
//! the hull built so far; it is joined to every hull edge it can see, so
//! the triangles always tile the convex hull exactly. Lawson edge flips
//! then restore the empty-circumcircle property.

use crate::geometry::{Point, in_circumcircle, orient};
use std::collections::HashMap;

/// Triangulate `points`; returned indices are positions in `points`, every
/// triangle counter-clockwise. The triangles cover the convex hull.
///
/// Callers must pass distinct, not-all-collinear points.
pub(crate) fn triangulate(points: &[Point]) -> Vec<[usize; 3]> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        points[a]
            .x
            .total_cmp(&points[b].x)
            .then(points[a].y.total_cmp(&points[b].y))
    });

    let Some(mut triangles) = sweep(points, &order) else {
        return Vec::new();
    };
    flip_to_delaunay(points, &mut triangles);
    triangles
}

/// Hull-covering triangulation, `None` when every point is collinear.
fn sweep(points: &[Point], order: &[usize]) -> Option<Vec<[usize; 3]>> {
    let first = points[order[0]];
    let second = points[order[1]];
    // first point off the line through the two leftmost points
    let k = (2..order.len()).find(|&k| orient(first, second, points[order[k]]) != 0.0)?;
    let apex = order[k];

    let mut triangles: Vec<[usize; 3]> = Vec::with_capacity(2 * order.len());
    for pair in order[..k].windows(2) {
        triangles.push(ccw([pair[0], pair[1], apex], points));
    }

    // hull in counter-clockwise order
    let mut hull: Vec<usize> = if orient(first, points[order[k - 1]], points[apex]) > 0.0 {
        order[..k].iter().copied().chain([apex]).collect()
    } else {
        [order[0], apex]
            .into_iter()
            .chain(order[1..k].iter().rev().copied())
            .collect()
    };

    for &i in &order[k + 1..] {
        let p = points[i];
        let m = hull.len();
        let visible: Vec<bool> = (0..m)
            .map(|e| orient(points[hull[e]], points[hull[(e + 1) % m]], p) < 0.0)
            .collect();
        // start of the visible chain; a point outside a convex polygon
        // never sees every edge
        let start = (0..m).find(|&e| visible[e] && !visible[(e + m - 1) % m])?;

        hull.rotate_left(start);
        let mut count = 0;
        while visible[(start + count) % m] {
            let (a, b) = (hull[count], hull[count + 1]);
            triangles.push([b, a, i]);
            count += 1;
        }
        hull.splice(1..count, [i]);
    }
    Some(triangles)
}

/// Flip edges whose opposite vertex lies inside the neighbor's
/// circumcircle until none is left.
fn flip_to_delaunay(points: &[Point], triangles: &mut [[usize; 3]]) {
    let mut edges: HashMap<(usize, usize), usize> = HashMap::with_capacity(triangles.len() * 3);
    for (ti, &t) in triangles.iter().enumerate() {
        link(&mut edges, t, ti);
    }

    // exact arithmetic terminates; the cap guards against float cycles
    let mut budget = 4 * points.len() * points.len() + 16;
    let mut flipped = true;
    while flipped && budget > 0 {
        flipped = false;
        for ti in 0..triangles.len() {
            for k in 0..3 {
                let t = triangles[ti];
                let (a, b, c) = (t[k], t[(k + 1) % 3], t[(k + 2) % 3]);
                let Some(&ui) = edges.get(&(b, a)) else {
                    continue;
                };
                let Some(&d) = triangles[ui].iter().find(|&&v| v != a && v != b) else {
                    continue;
                };
                let (pa, pb, pc, pd) = (points[a], points[b], points[c], points[d]);
                if !in_circumcircle(pa, pb, pc, pd)
                    || orient(pa, pd, pc) <= 0.0
                    || orient(pd, pb, pc) <= 0.0
                {
                    continue;
                }

                unlink(&mut edges, triangles[ti]);
                unlink(&mut edges, triangles[ui]);
                triangles[ti] = [a, d, c];
                triangles[ui] = [d, b, c];
                link(&mut edges, triangles[ti], ti);
                link(&mut edges, triangles[ui], ui);
                flipped = true;
                budget -= 1;
                break;
            }
            if budget == 0 {
                log::warn!("edge flip budget exhausted, mesh may not be Delaunay");
                break;
            }
        }
    }
}

fn directed_edges(t: [usize; 3]) -> [(usize, usize); 3] {
    [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])]
}

fn link(edges: &mut HashMap<(usize, usize), usize>, t: [usize; 3], index: usize) {
    for edge in directed_edges(t) {
        edges.insert(edge, index);
    }
}

fn unlink(edges: &mut HashMap<(usize, usize), usize>, t: [usize; 3]) {
    for edge in directed_edges(t) {
        edges.remove(&edge);
    }
}

fn ccw(t: [usize; 3], vertices: &[Point]) -> [usize; 3] {
    if orient(vertices[t[0]], vertices[t[1]], vertices[t[2]]) < 0.0 {
        [t[0], t[2], t[1]]
    } else {
        t
    }
}
