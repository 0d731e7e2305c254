use macroquad::color::{BLACK, Color, WHITE};
use macroquad::math::{Vec2, vec2};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("drawing surface unavailable ({width}x{height})")]
    Unavailable { width: f32, height: f32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct LineStyle {
    pub color: Color,
    /// Alternating on/off lengths in pixels; empty means solid.
    pub dash: Vec<f32>,
    pub width: f32,
}

impl LineStyle {
    pub fn solid(color: Color, width: f32) -> Self {
        Self {
            color,
            dash: Vec::new(),
            width,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScopeStyle {
    pub background: Color,
    pub center_line: LineStyle,
    pub trace: LineStyle,
}

impl Default for ScopeStyle {
    fn default() -> Self {
        Self {
            background: BLACK,
            center_line: LineStyle {
                color: WHITE,
                dash: vec![1.0, 1.0],
                width: 2.0,
            },
            trace: LineStyle::solid(WHITE, 2.0),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    pub points: Vec<Vec2>,
    pub style: LineStyle,
}

/// Retained 2D surface: whatever was stroked since the last `clear` stays visible
/// and is replayed on every display refresh.
#[derive(Debug)]
pub struct Canvas {
    width: f32,
    height: f32,
    strokes: Vec<Stroke>,
}

impl Canvas {
    pub fn new(width: f32, height: f32) -> Result<Self, SurfaceError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(SurfaceError::Unavailable { width, height });
        }
        Ok(Self {
            width,
            height,
            strokes: Vec::new(),
        })
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Resizing discards the current contents.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.strokes.clear();
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    pub fn stroke(&mut self, points: Vec<Vec2>, style: &LineStyle) {
        if points.len() < 2 {
            return;
        }
        self.strokes.push(Stroke {
            points,
            style: style.clone(),
        });
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }
}

/// Splits a polyline into the visible segments of a dash pattern. Odd-length
/// patterns repeat twice; empty or invalid patterns give a solid line.
pub fn dash_segments(points: &[Vec2], pattern: &[f32]) -> Vec<(Vec2, Vec2)> {
    let valid = pattern.iter().all(|len| len.is_finite() && *len >= 0.0)
        && pattern.iter().sum::<f32>() > 0.0;
    if !valid {
        return points.windows(2).map(|pair| (pair[0], pair[1])).collect();
    }
    let pattern: Vec<f32> = if pattern.len() % 2 == 1 {
        pattern.iter().chain(pattern).copied().collect()
    } else {
        pattern.to_vec()
    };

    let mut segments = Vec::new();
    let mut index = 0;
    let mut remaining = pattern[0];
    for pair in points.windows(2) {
        let (mut start, end) = (pair[0], pair[1]);
        let mut length = start.distance(end);
        if !length.is_finite() {
            continue;
        }
        while length > 0.0 {
            let step = remaining.min(length);
            let next = start + (end - start) * (step / length);
            if index % 2 == 0 && step > 0.0 {
                segments.push((start, next));
            }
            start = next;
            length -= step;
            remaining -= step;
            if remaining <= 0.0 {
                index = (index + 1) % pattern.len();
                remaining = pattern[index];
            }
        }
    }
    segments
}

pub struct Oscilloscope {
    canvas: Canvas,
    style: ScopeStyle,
}

impl Oscilloscope {
    pub fn new(canvas: Canvas, style: ScopeStyle) -> Self {
        Self { canvas, style }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn style(&self) -> &ScopeStyle {
        &self.style
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.canvas.resize(width, height);
    }

    pub fn clear(&mut self) {
        self.canvas.clear();
    }

    pub fn draw_center_line(&mut self) {
        let center = self.canvas.height() * 0.5;
        let points = vec![vec2(0.0, center), vec2(self.canvas.width(), center)];
        self.canvas.stroke(points, &self.style.center_line);
    }

    /// Sample `b` lands at `x = b * width / len`, `y = center + sample * height`.
    /// Out-of-range samples are drawn off the visible area rather than clamped.
    pub fn draw_wave(&mut self, buffer: &[f32]) {
        if buffer.is_empty() {
            return;
        }
        let width = self.canvas.width();
        let height = self.canvas.height();
        let center = height * 0.5;
        let dx = width / buffer.len() as f32;
        let points = buffer
            .iter()
            .enumerate()
            .map(|(b, sample)| vec2(b as f32 * dx, center + sample * height))
            .collect();
        self.canvas.stroke(points, &self.style.trace);
    }

    /// Full redraw: clear, reference line, then the wave if there is one.
    pub fn draw(&mut self, buffer: Option<&[f32]>) {
        self.clear();
        self.draw_center_line();
        if let Some(buffer) = buffer {
            self.draw_wave(buffer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(width: f32, height: f32) -> Oscilloscope {
        Oscilloscope::new(Canvas::new(width, height).unwrap(), ScopeStyle::default())
    }

    #[test]
    fn zero_sized_surface_is_unavailable() {
        assert!(matches!(
            Canvas::new(0.0, 100.0),
            Err(SurfaceError::Unavailable { .. })
        ));
        assert!(Canvas::new(f32::NAN, 100.0).is_err());
        assert!(Canvas::new(640.0, 200.0).is_ok());
    }

    #[test]
    fn center_line_spans_width_at_half_height() {
        let mut scope = scope(640.0, 200.0);
        scope.draw(None);
        let strokes = scope.canvas().strokes();
        assert_eq!(strokes.len(), 1);
        assert_eq!(strokes[0].points, vec![vec2(0.0, 100.0), vec2(640.0, 100.0)]);
        assert_eq!(strokes[0].style, scope.style().center_line);
    }

    #[test]
    fn wave_maps_samples_across_width() {
        let mut scope = scope(400.0, 100.0);
        scope.draw(Some(&[0.0, 0.5, -0.5, 1.0]));
        let wave = &scope.canvas().strokes()[1];
        assert_eq!(
            wave.points,
            vec![
                vec2(0.0, 50.0),
                vec2(100.0, 100.0),
                vec2(200.0, 0.0),
                vec2(300.0, 150.0),
            ]
        );
        assert_eq!(wave.style, scope.style().trace);
    }

    #[test]
    fn extreme_samples_are_not_clamped() {
        let mut scope = scope(100.0, 100.0);
        scope.draw_wave(&[3.0, -3.0]);
        let wave = &scope.canvas().strokes()[0];
        assert_eq!(wave.points[0].y, 350.0);
        assert_eq!(wave.points[1].y, -250.0);
    }

    #[test]
    fn redraw_replaces_previous_frame() {
        let mut scope = scope(100.0, 100.0);
        scope.draw(Some(&[0.0; 8]));
        scope.draw(Some(&[0.0; 8]));
        assert_eq!(scope.canvas().strokes().len(), 2);
    }

    #[test]
    fn resize_clears_and_changes_geometry() {
        let mut scope = scope(100.0, 100.0);
        scope.draw(Some(&[0.0; 8]));
        scope.resize(300.0, 60.0);
        assert!(scope.canvas().strokes().is_empty());
        scope.draw(Some(&[]));
        let strokes = scope.canvas().strokes();
        assert_eq!(strokes.len(), 1);
        assert_eq!(strokes[0].points[1], vec2(300.0, 30.0));
    }

    #[test]
    fn solid_pattern_keeps_every_segment() {
        let points = [vec2(0.0, 0.0), vec2(10.0, 0.0), vec2(10.0, 10.0)];
        let segments = dash_segments(&points, &[]);
        assert_eq!(segments.len(), 2);
        assert_eq!(dash_segments(&points, &[0.0, 0.0]).len(), 2);
        assert_eq!(dash_segments(&points, &[-1.0, 2.0]).len(), 2);
    }

    #[test]
    fn dashes_alternate_on_and_off() {
        let points = [vec2(0.0, 0.0), vec2(14.0, 0.0)];
        let segments = dash_segments(&points, &[5.0, 2.0]);
        let xs: Vec<(f32, f32)> = segments
            .iter()
            .map(|(a, b)| (a.x.round(), b.x.round()))
            .collect();
        assert_eq!(xs, vec![(0.0, 5.0), (7.0, 12.0)]);
    }

    #[test]
    fn dash_phase_carries_across_vertices() {
        let points = [vec2(0.0, 0.0), vec2(3.0, 0.0), vec2(3.0, 4.0)];
        let segments = dash_segments(&points, &[5.0, 1.0]);
        assert_eq!(segments[0], (vec2(0.0, 0.0), vec2(3.0, 0.0)));
        assert_eq!(segments[1], (vec2(3.0, 0.0), vec2(3.0, 2.0)));
        assert_eq!(segments[2], (vec2(3.0, 3.0), vec2(3.0, 4.0)));
    }

    #[test]
    fn odd_pattern_is_repeated() {
        let points = [vec2(0.0, 0.0), vec2(4.0, 0.0)];
        let segments = dash_segments(&points, &[1.0]);
        let xs: Vec<(f32, f32)> = segments
            .iter()
            .map(|(a, b)| (a.x.round(), b.x.round()))
            .collect();
        assert_eq!(xs, vec![(0.0, 1.0), (2.0, 3.0)]);
    }
}
