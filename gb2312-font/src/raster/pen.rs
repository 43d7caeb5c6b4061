use kurbo::BezPath;
use skrifa::outline::OutlinePen;

/// Pen that records a scaled outline into a [`BezPath`] in bitmap space.
///
/// Font coordinates are y-up with the origin on the baseline; bitmap
/// coordinates are y-down with the origin at the top left corner. The pen
/// flips the y axis around `baseline`, the distance in pixels from the top
/// of the bitmap to the baseline.
///
/// Contours are closed explicitly so that winding queries on the resulting
/// path see every contour as closed.
pub struct BezPathPen<'a> {
    path: &'a mut BezPath,
    baseline: f64,
    open: bool,
}

impl<'a> BezPathPen<'a> {
    pub fn new(path: &'a mut BezPath, baseline: f64) -> Self {
        Self {
            path,
            baseline,
            open: false,
        }
    }

    fn point(&self, x: f32, y: f32) -> (f64, f64) {
        (x as f64, self.baseline - y as f64)
    }

    fn close_open_contour(&mut self) {
        if self.open {
            self.path.close_path();
            self.open = false;
        }
    }
}

impl OutlinePen for BezPathPen<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        self.close_open_contour();
        let p = self.point(x, y);
        self.path.move_to(p);
        self.open = true;
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.point(x, y);
        self.path.line_to(p);
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        let (c0, p) = (self.point(cx0, cy0), self.point(x, y));
        self.path.quad_to(c0, p);
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        let (c0, c1, p) = (self.point(cx0, cy0), self.point(cx1, cy1), self.point(x, y));
        self.path.curve_to(c0, c1, p);
    }

    fn close(&mut self) {
        self.close_open_contour();
    }
}

impl Drop for BezPathPen<'_> {
    fn drop(&mut self) {
        self.close_open_contour();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{PathEl, Point};

    #[test]
    fn flips_around_baseline() {
        let mut path = BezPath::new();
        let mut pen = BezPathPen::new(&mut path, 12.0);
        pen.move_to(0.0, 0.0);
        pen.line_to(4.0, 12.0);
        pen.quad_to(5.0, 10.0, 6.0, -2.0);
        pen.close();
        drop(pen);
        assert_eq!(
            path.elements(),
            &[
                PathEl::MoveTo(Point::new(0.0, 12.0)),
                PathEl::LineTo(Point::new(4.0, 0.0)),
                PathEl::QuadTo(Point::new(5.0, 2.0), Point::new(6.0, 14.0)),
                PathEl::ClosePath,
            ]
        );
    }

    #[test]
    fn closes_contours_left_open() {
        let mut path = BezPath::new();
        {
            let mut pen = BezPathPen::new(&mut path, 0.0);
            // Subpath 1: never closed by the caller
            pen.move_to(1.0, 1.0);
            pen.line_to(2.0, 1.0);
            // Subpath 2
            pen.move_to(5.0, 5.0);
            pen.curve_to(6.0, 5.0, 7.0, 6.0, 7.0, 7.0);
        }
        assert_eq!(
            path.elements(),
            &[
                PathEl::MoveTo(Point::new(1.0, -1.0)),
                PathEl::LineTo(Point::new(2.0, -1.0)),
                PathEl::ClosePath,
                PathEl::MoveTo(Point::new(5.0, -5.0)),
                PathEl::CurveTo(
                    Point::new(6.0, -5.0),
                    Point::new(7.0, -6.0),
                    Point::new(7.0, -7.0)
                ),
                PathEl::ClosePath,
            ]
        );
    }
}
