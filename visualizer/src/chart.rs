use iced::{
    mouse,
    widget::canvas::{self, Frame, Geometry, Path, Stroke},
    Color, Point, Rectangle, Renderer, Theme,
};
use sensorcore::render::{prepare_series, PlotSeries};
use sensorcore::{ChartRenderer, Metric, SeriesStore};

const PALETTE: [Color; 6] = [
    Color::from_rgb(0.18, 0.72, 0.89),
    Color::from_rgb(0.95, 0.55, 0.2),
    Color::from_rgb(0.45, 0.85, 0.4),
    Color::from_rgb(0.85, 0.35, 0.55),
    Color::from_rgb(0.95, 0.85, 0.3),
    Color::from_rgb(0.6, 0.5, 0.95),
];

const MARGIN: f32 = 28.0;

/// One metric's chart. `draw` only captures the prepared series; the iced
/// canvas paints them on the next frame.
#[derive(Debug, Clone)]
pub struct ChartPanel {
    metric: Metric,
    series: Vec<PlotSeries>,
}

impl ChartPanel {
    pub fn new(metric: Metric) -> Self {
        Self {
            metric,
            series: Vec::new(),
        }
    }

    pub fn canvas(&self) -> ChartView {
        ChartView {
            label: self.metric.label(),
            series: self.series.clone(),
        }
    }
}

impl ChartRenderer for ChartPanel {
    fn draw(&mut self, store: &SeriesStore, metric: Metric) {
        self.metric = metric;
        self.series = prepare_series(store, metric);
    }
}

/// Time and value extent of everything on a chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotBounds {
    pub min_t: i64,
    pub max_t: i64,
    pub min_v: f64,
    pub max_v: f64,
}

impl PlotBounds {
    pub fn of(series: &[PlotSeries]) -> Option<Self> {
        let mut points = series.iter().flat_map(|plot| plot.points.iter());
        let &(t, v) = points.next()?;
        let mut bounds = PlotBounds {
            min_t: t,
            max_t: t,
            min_v: v,
            max_v: v,
        };
        for &(t, v) in points {
            bounds.min_t = bounds.min_t.min(t);
            bounds.max_t = bounds.max_t.max(t);
            bounds.min_v = bounds.min_v.min(v);
            bounds.max_v = bounds.max_v.max(v);
        }
        Some(bounds)
    }

    /// Maps a point into `width` x `height`, y growing downwards.
    pub fn project(&self, (t, v): (i64, f64), width: f32, height: f32) -> (f32, f32) {
        let span_t = (self.max_t as f64 - self.min_t as f64).max(1.0);
        let span_v = (self.max_v - self.min_v).max(1.0);
        let x = (t as f64 - self.min_t as f64) / span_t * f64::from(width);
        let y = f64::from(height) - (v - self.min_v) / span_v * f64::from(height);
        (x as f32, y as f32)
    }
}

#[derive(Clone)]
pub struct ChartView {
    label: &'static str,
    series: Vec<PlotSeries>,
}

impl<Message> canvas::Program<Message> for ChartView {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.05, 0.05, 0.05),
        );

        let plot_width = (bounds.width - 2.0 * MARGIN).max(1.0);
        let plot_height = (bounds.height - 2.0 * MARGIN).max(1.0);

        let axes = Path::new(|builder| {
            builder.move_to(Point::new(MARGIN, MARGIN));
            builder.line_to(Point::new(MARGIN, MARGIN + plot_height));
            builder.line_to(Point::new(MARGIN + plot_width, MARGIN + plot_height));
        });
        frame.stroke(
            &axes,
            Stroke::default()
                .with_color(Color::from_rgb(0.35, 0.35, 0.45))
                .with_width(1.0),
        );

        frame.fill_text(canvas::Text {
            content: self.label.to_string(),
            position: Point::new(MARGIN, 6.0),
            color: Color::from_rgb(0.85, 0.85, 0.9),
            size: 14.0.into(),
            ..canvas::Text::default()
        });

        let Some(extent) = PlotBounds::of(&self.series) else {
            return vec![frame.into_geometry()];
        };

        for (idx, plot) in self.series.iter().enumerate() {
            let color = PALETTE[idx % PALETTE.len()];

            if plot.points.len() > 1 {
                let path = Path::new(|builder| {
                    for (i, &point) in plot.points.iter().enumerate() {
                        let (x, y) = extent.project(point, plot_width, plot_height);
                        let at = Point::new(MARGIN + x, MARGIN + y);
                        if i == 0 {
                            builder.move_to(at);
                        } else {
                            builder.line_to(at);
                        }
                    }
                });
                frame.stroke(&path, Stroke::default().with_width(2.0).with_color(color));
            } else if let Some(&point) = plot.points.first() {
                let (x, y) = extent.project(point, plot_width, plot_height);
                let marker = Path::new(|builder| {
                    builder.circle(Point::new(MARGIN + x, MARGIN + y), 3.0)
                });
                frame.fill(&marker, color);
            }

            let latest = plot
                .points
                .last()
                .map(|&(_, value)| format!("{:.1}", value))
                .unwrap_or_else(|| "n/a".into());
            frame.fill_text(canvas::Text {
                content: format!("{}: {}", plot.name, latest),
                position: Point::new(bounds.width - 160.0, 6.0 + idx as f32 * 14.0),
                color,
                size: 12.0.into(),
                ..canvas::Text::default()
            });
        }

        frame.fill_text(canvas::Text {
            content: format!("{:.1}", extent.max_v),
            position: Point::new(2.0, MARGIN),
            color: Color::from_rgb(0.6, 0.6, 0.65),
            size: 10.0.into(),
            ..canvas::Text::default()
        });
        frame.fill_text(canvas::Text {
            content: format!("{:.1}", extent.min_v),
            position: Point::new(2.0, MARGIN + plot_height - 10.0),
            color: Color::from_rgb(0.6, 0.6, 0.65),
            size: 10.0.into(),
            ..canvas::Text::default()
        });

        vec![frame.into_geometry()]
    }
}
