//! SVG rendering of a [`Plot`]

use std::fmt::{self, Write};

use graphlp_solver::{Plot, Point};

const SIZE: f64 = 600.0;
const MARGIN: f64 = 50.0;
const TICKS: usize = 5;

const PALETTE: [&str; 5] = ["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd"];

/// Maps model coordinates onto the drawing area, y axis pointing up
struct Frame {
    x_max: f64,
    y_max: f64,
}

impl Frame {
    fn x(&self, x: f64) -> f64 {
        MARGIN + x / self.x_max * (SIZE - 2.0 * MARGIN)
    }

    fn y(&self, y: f64) -> f64 {
        SIZE - MARGIN - y / self.y_max * (SIZE - 2.0 * MARGIN)
    }

    fn point(&self, p: Point) -> (f64, f64) {
        (self.x(p.x), self.y(p.y))
    }
}

/// Render the plot with axes labelled by the model's variable names
pub fn render(plot: &Plot, axis_names: [&str; 2]) -> Result<String, fmt::Error> {
    let frame = Frame {
        x_max: plot.window.x_max,
        y_max: plot.window.y_max,
    };
    let mut out = String::new();

    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{SIZE}" height="{SIZE}" viewBox="0 0 {SIZE} {SIZE}" font-family="sans-serif" font-size="12">"#
    )?;
    writeln!(out, r#"<rect width="100%" height="100%" fill="white"/>"#)?;

    if plot.polygon.len() >= 3 {
        let points: Vec<String> = plot
            .polygon
            .vertices
            .iter()
            .map(|&v| {
                let (x, y) = frame.point(v);
                format!("{x:.2},{y:.2}")
            })
            .collect();
        writeln!(
            out,
            r##"<polygon class="feasible" points="{}" fill="#9ecae1" fill-opacity="0.6" stroke="#3182bd"/>"##,
            points.join(" ")
        )?;
    }

    write_axes(&mut out, &frame, axis_names)?;

    for (i, line) in plot.boundaries.iter().enumerate() {
        let Some(segment) = line.segment else { continue };
        let color = PALETTE[i % PALETTE.len()];
        let (x1, y1) = frame.point(segment.from);
        let (x2, y2) = frame.point(segment.to);
        writeln!(
            out,
            r#"<line class="boundary" x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}" stroke="{color}" stroke-width="2"/>"#
        )?;
        // Legend, top right
        let ly = MARGIN + 16.0 * i as f64;
        writeln!(
            out,
            r#"<text x="{:.2}" y="{ly:.2}" fill="{color}" text-anchor="end">{}</text>"#,
            SIZE - MARGIN,
            escape(&line.label)
        )?;
    }

    if let Some(optimum) = plot.optimum {
        let (cx, cy) = frame.point(optimum);
        writeln!(
            out,
            r#"<circle class="optimum" cx="{cx:.2}" cy="{cy:.2}" r="5" fill="black"/>"#
        )?;
        writeln!(
            out,
            r#"<text x="{:.2}" y="{:.2}">optimum {}</text>"#,
            cx + 8.0,
            cy - 8.0,
            optimum
        )?;
    }

    out.push_str("</svg>\n");
    Ok(out)
}

fn write_axes(out: &mut String, frame: &Frame, names: [&str; 2]) -> fmt::Result {
    let (ox, oy) = (frame.x(0.0), frame.y(0.0));
    let (xe, ye) = (frame.x(frame.x_max), frame.y(frame.y_max));
    writeln!(
        out,
        r#"<line x1="{ox:.2}" y1="{oy:.2}" x2="{xe:.2}" y2="{oy:.2}" stroke="black"/>"#
    )?;
    writeln!(
        out,
        r#"<line x1="{ox:.2}" y1="{oy:.2}" x2="{ox:.2}" y2="{ye:.2}" stroke="black"/>"#
    )?;

    for i in 0..=TICKS {
        let t = i as f64 / TICKS as f64;
        let (vx, vy) = (t * frame.x_max, t * frame.y_max);
        writeln!(
            out,
            r#"<text x="{:.2}" y="{:.2}" text-anchor="middle">{}</text>"#,
            frame.x(vx),
            oy + 16.0,
            tick_label(vx)
        )?;
        writeln!(
            out,
            r#"<text x="{:.2}" y="{:.2}" text-anchor="end">{}</text>"#,
            ox - 6.0,
            frame.y(vy) + 4.0,
            tick_label(vy)
        )?;
    }

    writeln!(
        out,
        r#"<text x="{:.2}" y="{:.2}" text-anchor="middle">{}</text>"#,
        (ox + xe) / 2.0,
        SIZE - 12.0,
        escape(names[0])
    )?;
    writeln!(
        out,
        r#"<text x="14" y="{:.2}" text-anchor="middle" transform="rotate(-90 14 {:.2})">{}</text>"#,
        (oy + ye) / 2.0,
        (oy + ye) / 2.0,
        escape(names[1])
    )
}

fn tick_label(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.1}")
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphlp_solver::{Constraint, Model, Objective, RegionBuilder, Solver, Window};

    fn cloth_model() -> Model {
        let mut model = Model::new(Objective::maximize(3.0, 2.0));
        model
            .add_constraint(Constraint::le(2.0, 1.0, 10.0).with_label("cloth"))
            .unwrap();
        model.add_constraint(Constraint::le(1.0, 1.0, 8.0)).unwrap();
        model
    }

    #[test]
    fn test_render_solved_model() {
        let model = cloth_model();
        let solution = Solver::new().solve_model(&model);
        let plot = Plot::build(&model, Some(&solution), &RegionBuilder::new(), None);
        let svg = render(&plot, model.variable_names()).unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches(r#"class="boundary""#).count(), 2);
        assert_eq!(svg.matches(r#"class="feasible""#).count(), 1);
        assert_eq!(svg.matches(r#"class="optimum""#).count(), 1);
        assert!(svg.contains("cloth: 2x0 + 1x1 &lt;= 10"));
    }

    #[test]
    fn test_render_without_region() {
        let mut model = Model::new(Objective::maximize(1.0, 1.0));
        model.add_constraint(Constraint::ge(1.0, 0.0, 5.0)).unwrap();
        model.add_constraint(Constraint::le(1.0, 0.0, 2.0)).unwrap();

        let solution = Solver::new().solve_model(&model);
        let plot = Plot::build(&model, Some(&solution), &RegionBuilder::new(), Some(Window::default()));
        let svg = render(&plot, model.variable_names()).unwrap();

        assert!(!svg.contains(r#"class="feasible""#));
        assert!(!svg.contains(r#"class="optimum""#));
    }

    #[test]
    fn test_frame_flips_y_axis() {
        let frame = Frame { x_max: 10.0, y_max: 10.0 };
        assert_eq!(frame.point(Point::new(0.0, 0.0)), (MARGIN, SIZE - MARGIN));
        assert_eq!(frame.point(Point::new(10.0, 10.0)), (SIZE - MARGIN, MARGIN));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a <= b & \"c\""), "a &lt;= b &amp; &quot;c&quot;");
    }
}
