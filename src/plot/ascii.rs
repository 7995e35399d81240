//! ASCII plotting of ECDF vs fitted CDF for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - ECDF at each distinct observed time: `o`
//! - fitted CDF: `-` line
//!
//! The x-axis always starts at `t = 0`; the y-axis is the probability range `[0, 1]`.

use crate::domain::{FittedModel, ModelFile};
use crate::models::cdf_grid;
use crate::report::CdfResidual;

/// Render a plot for an in-memory fit.
pub fn render_ascii_plot(residuals: &[CdfResidual], model: &FittedModel, width: usize, height: usize) -> String {
    let t_max = t_max_of(residuals.iter().map(|r| r.t));
    let (ts, ys) = cdf_grid(model.family, &model.params, t_max, width.max(2));
    let curve: Vec<(f64, f64)> = ts.into_iter().zip(ys).collect();
    let points: Vec<(f64, f64)> = residuals.iter().map(|r| (r.t, r.ecdf)).collect();
    render_plot(&points, &curve, t_max, width, height, model.family.display_name())
}

/// Render a plot from a saved model file (ECDF overlay when it was saved).
pub fn render_ascii_plot_from_model_file(file: &ModelFile, width: usize, height: usize) -> String {
    let curve: Vec<(f64, f64)> = file
        .grid
        .t
        .iter()
        .zip(file.grid.cdf.iter())
        .map(|(&t, &y)| (t, y))
        .collect();
    let points: Vec<(f64, f64)> = file
        .ecdf
        .as_ref()
        .map(|e| e.t.iter().copied().zip(e.cdf.iter().copied()).collect())
        .unwrap_or_default();

    let t_max = t_max_of(curve.iter().chain(points.iter()).map(|(t, _)| *t));
    render_plot(&points, &curve, t_max, width, height, file.model.family.display_name())
}

fn render_plot(
    points: &[(f64, f64)],
    curve: &[(f64, f64)],
    t_max: f64,
    width: usize,
    height: usize,
    label: &str,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let mut grid = vec![vec![' '; width]; height];

    // Curve first so points overlay it.
    draw_curve(&mut grid, curve, t_max);

    for &(t, p) in points {
        if !(t.is_finite() && p.is_finite()) {
            continue;
        }
        let x = map_x(t, t_max, width);
        let y = map_y(p, height);
        grid[y][x] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: t=[0.00, {t_max:.2}] | CDF=[0, 1] | o=ECDF -={label}\n"
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn t_max_of(ts: impl Iterator<Item = f64>) -> f64 {
    let max = ts.filter(|t| t.is_finite()).fold(0.0, f64::max);
    if max > 0.0 { max } else { 1.0 }
}

fn map_x(t: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = (t / t_max).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(p: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = p.clamp(0.0, 1.0);
    // p = 1 -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], t_max: f64) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, p) in curve {
        if !(t.is_finite() && p.is_finite()) {
            prev = None;
            continue;
        }
        let x = map_x(t, t_max, width);
        let y = map_y(p, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, y, '-');
        } else {
            grid[y][x] = '-';
        }
        prev = Some((x, y));
    }
}

/// Integer line drawing (Bresenham).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        let (xu, yu) = (x0 as usize, y0 as usize);
        if x0 >= 0 && y0 >= 0 && yu < grid.len() && xu < grid[0].len() && grid[yu][xu] == ' ' {
            grid[yu][xu] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Family;
    use crate::io::model_file::model_file;
    use crate::report::cdf_residuals;

    #[test]
    fn plot_golden_snapshot_small() {
        let model = FittedModel::new(Family::Exponential, vec![1.0], -2.0, 2, 0);
        let residuals = cdf_residuals(&[1.0, 2.0], &model).unwrap();

        let txt = render_ascii_plot(&residuals, &model, 10, 5);
        let expected = concat!(
            "Plot: t=[0.00, 2.00] | CDF=[0, 1] | o=ECDF -=Exponential\n",
            "         o\n",
            "     -----\n",
            "   --o    \n",
            " --       \n",
            "-         \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn model_file_plot_overlays_saved_ecdf() {
        let model = FittedModel::new(Family::Gamma, vec![2.0, 0.01], -900.0, 4, 5);
        let file = model_file(&model, "t", &[50.0, 120.0, 260.0, 400.0]);
        let txt = render_ascii_plot_from_model_file(&file, 40, 12);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 13);
        assert!(lines[0].starts_with("Plot: t=[0.00, 400.00]"));
        assert_eq!(txt.matches('o').count() - lines[0].matches('o').count(), 4);
        assert!(lines[12].starts_with('-'));

        let bare = ModelFile { ecdf: None, ..file };
        let txt = render_ascii_plot_from_model_file(&bare, 40, 12);
        assert!(!txt.lines().skip(1).any(|l| l.contains('o')));
    }
}
