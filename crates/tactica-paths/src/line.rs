use tactica_core::Point;

/// Rasterize the segment between two points, from `a` to `b` inclusive.
fn raster(a: Point, b: Point) -> Vec<Point> {
    let dx = (b.x - a.x).abs();
    let dy = -(b.y - a.y).abs();
    let sx = if a.x < b.x { 1 } else { -1 };
    let sy = if a.y < b.y { 1 } else { -1 };
    let mut err = dx + dy;
    let mut p = a;
    let mut pts = Vec::with_capacity((dx - dy + 1) as usize);
    loop {
        pts.push(p);
        if p == b {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            p.x += sx;
        }
        if e2 <= dx {
            err += dx;
            p.y += sy;
        }
    }
    pts
}

/// Bresenham line from `(x0, y0)` to `(x1, y1)`.
///
/// `plot` is called for every visited cell in order, starting with
/// `(x0, y0)` and ending with `(x1, y1)`. Returning `false` from `plot`
/// stops the scan; the function then returns `false`. Returns `true` when
/// every cell was visited.
///
/// The segment is always rasterized from the smaller endpoint (row-major
/// order), so swapping the endpoints visits the same cells in reverse.
pub fn bresenham(x0: i32, y0: i32, x1: i32, y1: i32, mut plot: impl FnMut(i32, i32) -> bool) -> bool {
    let from = Point::new(x0, y0);
    let to = Point::new(x1, y1);
    let mut pts = if from <= to {
        raster(from, to)
    } else {
        raster(to, from)
    };
    if from > to {
        pts.reverse();
    }
    pts.into_iter().all(|p| plot(p.x, p.y))
}

/// All cells on the line from `from` to `to`, both endpoints included.
pub fn line(from: Point, to: Point) -> Vec<Point> {
    let mut pts = Vec::new();
    bresenham(from.x, from.y, to.x, to.y, |x, y| {
        pts.push(Point::new(x, y));
        true
    });
    pts
}
