#![cfg(not(tarpaulin_include))]
#![cfg(feature = "web")]
use crate::chart::{ChartData, ChartSpec};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::error::Error;
use std::f64::consts::PI;

/// Slice colours for the pie chart, reused in order
const PALETTE: [RGBColor; 8] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(23, 190, 207),
];

/// Size options for SVG generation
///
/// Titles and axis labels come from the [`ChartSpec`] being drawn.
#[derive(Clone, Debug)]
pub struct GraphOptions {
    /// Width of the graph in pixels
    pub width: u32,

    /// Height of the graph in pixels
    pub height: u32,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            width: 640,
            height: 420,
        }
    }
}

/// Draws a chart specification as an SVG document
///
/// Dispatches on the kind of data the spec carries. A spec without data becomes a
/// captioned "No data" panel, matching what the page shows before any upload.
///
/// # Errors
/// * Returns an error if any value is not finite, or the axis range it implies
///   overflows; plotters cannot lay out such an axis
/// * Returns an error if plotters cannot lay out text, usually because no system
///   font matches "sans-serif"
///
/// # Examples
/// ```no_run
/// use sales_dashboard::chart::{ChartData, ChartSpec};
/// use sales_dashboard::graph::{GraphOptions, create_graph};
///
/// let spec = ChartSpec {
///     title: "Top 10 Products by Sales".to_string(),
///     x_label: "Product".to_string(),
///     y_label: "Sales".to_string(),
///     data: ChartData::Bar { x: vec!["Widget".to_string()], y: vec![12.5] },
///     svg: None,
/// };
///
/// match create_graph(&spec, &GraphOptions::default()) {
///     Ok(svg) => println!("Graph created successfully: {} bytes", svg.len()),
///     Err(e) => eprintln!("Failed to create graph: {}", e),
/// }
/// ```
pub fn create_graph(spec: &ChartSpec, options: &GraphOptions) -> Result<String, Box<dyn Error>> {
    check_finite(&spec.data)?;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        root.fill(&WHITE)?;

        if spec.is_empty() {
            draw_empty(&root, spec)?;
        } else {
            match &spec.data {
                ChartData::Line { x, y } => draw_line(&root, spec, x, y)?,
                ChartData::Bar { x, y } => draw_bar(&root, spec, x, y)?,
                ChartData::Pie { labels, values } => draw_pie(&root, spec, labels, values)?,
                ChartData::Heatmap { x, y, z } => draw_heatmap(&root, spec, x, y, z)?,
            }
        }

        root.present()?;
    }
    Ok(svg)
}

fn check_finite(data: &ChartData) -> Result<(), Box<dyn Error>> {
    let finite = match data {
        ChartData::Line { y, .. } | ChartData::Bar { y, .. } => y.iter().all(|v| v.is_finite()),
        ChartData::Pie { values, .. } => {
            values.iter().all(|v| v.is_finite())
                && values.iter().filter(|v| **v > 0.0).sum::<f64>().is_finite()
        }
        ChartData::Heatmap { z, .. } => z.iter().flatten().flatten().all(|v| v.is_finite()),
    };
    if finite {
        Ok(())
    } else {
        Err("chart values overflow the drawable range".into())
    }
}

// Y range that always contains 0 and never collapses to a point.
fn value_bounds(values: &[f64]) -> Result<(f64, f64), Box<dyn Error>> {
    let min = values.iter().copied().fold(0.0_f64, f64::min);
    let max = values.iter().copied().fold(0.0_f64, f64::max);
    let (low, high) = if max - min <= f64::EPSILON {
        (min, min + 1.0)
    } else {
        (min, max + (max - min) * 0.05)
    };
    if low.is_finite() && high.is_finite() {
        Ok((low, high))
    } else {
        Err(format!("axis range {}..{} is not drawable", min, max).into())
    }
}

fn draw_empty(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    spec: &ChartSpec,
) -> Result<(), Box<dyn Error>> {
    let (w, h) = root.dim_in_pixel();
    root.draw(&Text::new(
        spec.title.clone(),
        (10, 10),
        ("sans-serif", 24).into_font(),
    ))?;
    root.draw(&Text::new(
        "No data",
        (w as i32 / 2 - 30, h as i32 / 2),
        ("sans-serif", 18).into_font().color(&RGBColor(120, 120, 120)),
    ))?;
    Ok(())
}

fn draw_line(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    spec: &ChartSpec,
    x: &[String],
    y: &[f64],
) -> Result<(), Box<dyn Error>> {
    let n = x.len().min(y.len()) as i32;
    let (min_y, max_y) = value_bounds(y)?;

    let mut chart = ChartBuilder::on(root)
        .caption(&spec.title, ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0..n.max(1), min_y..max_y)?;

    let label = |v: &i32| x.get(*v as usize).cloned().unwrap_or_default();
    chart
        .configure_mesh()
        .x_desc(&spec.x_label)
        .y_desc(&spec.y_label)
        .x_labels((n as usize).clamp(1, 12))
        .x_label_formatter(&label)
        .draw()?;

    let points: Vec<(i32, f64)> = y
        .iter()
        .take(n as usize)
        .enumerate()
        .map(|(i, v)| (i as i32, *v))
        .collect();
    chart.draw_series(LineSeries::new(points.iter().copied(), &BLUE))?;
    chart.draw_series(
        points
            .iter()
            .map(|&(i, v)| Circle::new((i, v), 3, BLUE.filled())),
    )?;
    Ok(())
}

fn draw_bar(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    spec: &ChartSpec,
    x: &[String],
    y: &[f64],
) -> Result<(), Box<dyn Error>> {
    let n = x.len().min(y.len());
    let (min_y, max_y) = value_bounds(y)?;

    let mut chart = ChartBuilder::on(root)
        .caption(&spec.title, ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((0..n).into_segmented(), min_y..max_y)?;

    let label = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(i) => x.get(*i).cloned().unwrap_or_default(),
        _ => String::new(),
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(&spec.x_label)
        .y_desc(&spec.y_label)
        .x_labels(n)
        .x_label_formatter(&label)
        .draw()?;

    chart.draw_series(
        (0..n).map(|i| {
            Rectangle::new(
                [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), y[i])],
                BLUE.mix(0.8).filled(),
            )
        }),
    )?;
    Ok(())
}

fn draw_pie(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    spec: &ChartSpec,
    labels: &[String],
    values: &[f64],
) -> Result<(), Box<dyn Error>> {
    let (w, h) = root.dim_in_pixel();
    root.draw(&Text::new(
        spec.title.clone(),
        (10, 10),
        ("sans-serif", 24).into_font(),
    ))?;

    // Negative totals have no meaningful angle.
    let slices: Vec<(&String, f64)> = labels
        .iter()
        .zip(values.iter().copied())
        .filter(|(_, v)| *v > 0.0)
        .collect();
    let total: f64 = slices.iter().map(|(_, v)| v).sum();
    if total <= 0.0 {
        return Ok(());
    }

    let center = ((w as f64 * 0.4), (h as f64 * 0.55));
    let radius = (w.min(h) as f64) * 0.35;
    let mut angle = -PI / 2.0;

    for (idx, (label, value)) in slices.iter().enumerate() {
        let sweep = value / total * 2.0 * PI;
        let color = PALETTE[idx % PALETTE.len()];

        let steps = ((sweep / (2.0 * PI)) * 90.0).ceil().max(2.0) as usize;
        let mut outline = vec![(center.0 as i32, center.1 as i32)];
        for step in 0..=steps {
            let a = angle + sweep * step as f64 / steps as f64;
            outline.push((
                (center.0 + radius * a.cos()) as i32,
                (center.1 + radius * a.sin()) as i32,
            ));
        }
        root.draw(&Polygon::new(outline, color.filled()))?;

        // Legend entry with the percentage share.
        let legend_y = 50 + idx as i32 * 22;
        let legend_x = (w as f64 * 0.78) as i32;
        root.draw(&Rectangle::new(
            [(legend_x, legend_y), (legend_x + 14, legend_y + 14)],
            color.filled(),
        ))?;
        root.draw(&Text::new(
            format!("{} ({:.1}%)", label, value / total * 100.0),
            (legend_x + 20, legend_y),
            ("sans-serif", 14).into_font(),
        ))?;

        angle += sweep;
    }
    Ok(())
}

fn heat_color(value: f64, min: f64, max: f64) -> RGBColor {
    let t = if max - min <= f64::EPSILON {
        1.0
    } else {
        ((value - min) / (max - min)).clamp(0.0, 1.0)
    };
    let lerp = |from: u8, to: u8| (from as f64 + (to as f64 - from as f64) * t).round() as u8;
    RGBColor(lerp(240, 8), lerp(249, 48), lerp(255, 107))
}

fn draw_heatmap(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    spec: &ChartSpec,
    x: &[String],
    y: &[String],
    z: &[Vec<Option<f64>>],
) -> Result<(), Box<dyn Error>> {
    let cols = x.len();
    let rows = y.len();

    let present: Vec<f64> = z.iter().flatten().flatten().copied().collect();
    let min = present.iter().copied().fold(f64::INFINITY, f64::min);
    let max = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut chart = ChartBuilder::on(root)
        .caption(&spec.title, ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(90)
        .build_cartesian_2d((0..cols).into_segmented(), (0..rows).into_segmented())?;

    let x_label = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(i) => x.get(*i).cloned().unwrap_or_default(),
        _ => String::new(),
    };
    let y_label = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(i) => y.get(*i).cloned().unwrap_or_default(),
        _ => String::new(),
    };
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(&spec.x_label)
        .y_desc(&spec.y_label)
        .x_labels(cols)
        .y_labels(rows)
        .x_label_formatter(&x_label)
        .y_label_formatter(&y_label)
        .draw()?;

    let cells = z.iter().enumerate().flat_map(|(r, row)| {
        row.iter().enumerate().map(move |(c, cell)| (r, c, *cell))
    });
    chart.draw_series(cells.map(|(r, c, cell)| {
        let color = match cell {
            Some(v) => heat_color(v, min, max),
            None => RGBColor(230, 230, 230),
        };
        Rectangle::new(
            [
                (SegmentValue::Exact(c), SegmentValue::Exact(r)),
                (SegmentValue::Exact(c + 1), SegmentValue::Exact(r + 1)),
            ],
            color.filled(),
        )
    }))?;
    Ok(())
}
