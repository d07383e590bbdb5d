//! Integer rasterisation helpers used by the river painter.

/// Bresenham line from `from` to `to`, both endpoints included.
pub fn line(from: (i64, i64), to: (i64, i64)) -> Vec<(i64, i64)> {
    let (x0, y0) = from;
    let (x1, y1) = to;
    let mut path = Vec::new();

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        path.push((x, y));

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }

    path
}

/// Every cell within `radius` of `center`, column by column.
///
/// A radius of zero (or less) is just the center cell.
pub fn filled_circle(center: (i64, i64), radius: i64) -> Vec<(i64, i64)> {
    let (cx, cy) = center;
    let r = radius.max(0);
    let mut cells = Vec::new();

    for dx in -r..=r {
        for dy in -r..=r {
            if dx * dx + dy * dy <= r * r {
                cells.push((cx + dx, cy + dy));
            }
        }
    }

    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_includes_both_ends() {
        let pts = line((0, 0), (5, 2));
        assert_eq!(pts.first(), Some(&(0, 0)));
        assert_eq!(pts.last(), Some(&(5, 2)));
        assert_eq!(pts.len(), 6);
    }

    #[test]
    fn test_line_is_connected() {
        for &(to, from) in &[((7, -3), (0, 0)), ((-4, 9), (2, 1)), ((3, 3), (3, 3))] {
            let pts = line(from, to);
            for pair in pts.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                assert!((a.0 - b.0).abs() <= 1 && (a.1 - b.1).abs() <= 1);
            }
        }
    }

    #[test]
    fn test_single_point_line() {
        assert_eq!(line((4, 4), (4, 4)), vec![(4, 4)]);
    }

    #[test]
    fn test_filled_circle() {
        assert_eq!(filled_circle((2, 3), 0), vec![(2, 3)]);
        assert_eq!(filled_circle((0, 0), -2), vec![(0, 0)]);

        let disc = filled_circle((0, 0), 2);
        assert_eq!(disc.len(), 13);
        assert!(disc.contains(&(2, 0)));
        assert!(!disc.contains(&(2, 2)));
    }
}
