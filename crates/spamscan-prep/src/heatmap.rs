//! Annotated terminal heatmap of a correlation matrix.

use crate::correlation::CorrelationMatrix;

/// How cells are coloured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeatmapMode {
    /// 256-colour ANSI backgrounds on a blue-white-red ramp.
    #[default]
    Ansi,
    /// Shade glyphs by magnitude; no escape codes.
    Plain,
}

/// Diverging ramp from -1 (blue) through 0 (near white) to +1 (red).
const ANSI_RAMP: [u8; 9] = [19, 26, 33, 75, 255, 217, 210, 203, 160];
/// Background for undefined coefficients.
const ANSI_NAN: u8 = 244;
/// Glyphs by increasing |r|.
const SHADES: [char; 5] = [' ', '░', '▒', '▓', '█'];
/// Width of a two-decimal coefficient such as `-0.25`.
const CELL: usize = 5;

/// Renders a [`CorrelationMatrix`] as text, one row per column, each cell
/// annotated with its value to two decimals.
pub struct Heatmap<'a> {
    matrix: &'a CorrelationMatrix,
}

impl<'a> Heatmap<'a> {
    /// Wrap a matrix for rendering.
    #[must_use]
    pub fn new(matrix: &'a CorrelationMatrix) -> Self {
        Self { matrix }
    }

    /// Render the grid.
    ///
    /// Columns are headed by index; rows carry `index name`.
    #[must_use]
    pub fn render(&self, mode: HeatmapMode) -> String {
        let names = self.matrix.names();
        let label_width = names
            .iter()
            .enumerate()
            .map(|(i, n)| format!("{i} {n}").len())
            .max()
            .unwrap_or(0);
        let cell_width = match mode {
            HeatmapMode::Ansi => CELL,
            HeatmapMode::Plain => CELL + 1,
        };

        let mut out = String::new();
        out.push_str(&format!("{:label_width$}", ""));
        for j in 0..names.len() {
            out.push_str(&format!(" {j:>cell_width$}"));
        }
        out.push('\n');

        for (i, row) in self.matrix.as_rows().iter().enumerate() {
            out.push_str(&format!("{:<label_width$}", format!("{i} {}", names[i])));
            for &r in row {
                out.push(' ');
                out.push_str(&render_cell(r, mode));
            }
            out.push('\n');
        }

        if mode == HeatmapMode::Plain {
            out.push_str("shade by |r|: ");
            for (k, c) in SHADES.iter().enumerate().skip(1) {
                out.push_str(&format!("{c} >= {:.2}  ", (k as f64 - 0.5) / 4.0));
            }
            out.push('\n');
        }
        out
    }
}

fn annotate(r: f64) -> String {
    if r.is_nan() {
        format!("{:>CELL$}", "nan")
    } else {
        format!("{r:>CELL$.2}")
    }
}

fn render_cell(r: f64, mode: HeatmapMode) -> String {
    match mode {
        HeatmapMode::Ansi => {
            let colour = ansi_colour(r);
            format!("\x1b[30;48;5;{colour}m{}\x1b[0m", annotate(r))
        }
        HeatmapMode::Plain => format!("{}{}", shade(r), annotate(r)),
    }
}

fn ansi_colour(r: f64) -> u8 {
    if r.is_nan() {
        return ANSI_NAN;
    }
    let steps = (ANSI_RAMP.len() - 1) as f64;
    let idx = ((r.clamp(-1.0, 1.0) + 1.0) / 2.0 * steps).round() as usize;
    ANSI_RAMP[idx.min(ANSI_RAMP.len() - 1)]
}

fn shade(r: f64) -> char {
    if r.is_nan() {
        return '?';
    }
    let steps = (SHADES.len() - 1) as f64;
    let idx = (r.abs().min(1.0) * steps).round() as usize;
    SHADES[idx.min(SHADES.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlation::correlation_matrix;

    fn matrix() -> CorrelationMatrix {
        let cols = vec![
            vec![1.0, 2.0, 3.0, 4.0],
            vec![4.0, 3.0, 2.0, 1.0],
            vec![1.0, 3.0, 2.0, 5.0],
            vec![0.0, 0.0, 0.0, 0.0],
        ];
        let names = vec!["make".into(), "address".into(), "free".into(), "target".into()];
        correlation_matrix(&cols, &names).unwrap()
    }

    #[test]
    fn plain_render_has_names_and_two_decimals() {
        let text = Heatmap::new(&matrix()).render(HeatmapMode::Plain);
        for name in ["make", "address", "free", "target"] {
            assert!(text.contains(name), "missing {name}");
        }
        assert!(text.contains(" 1.00"));
        assert!(text.contains("-1.00"));
        assert!(text.contains("nan"));
        assert!(!text.contains('\x1b'));
        // header + 4 rows + legend
        assert_eq!(text.lines().count(), 6);
    }

    #[test]
    fn header_and_row_labels_line_up() {
        let text = Heatmap::new(&matrix()).render(HeatmapMode::Plain);
        let lines: Vec<&str> = text.lines().collect();
        let header: Vec<&str> = lines[0].split_whitespace().collect();
        assert_eq!(header, vec!["0", "1", "2", "3"]);
        // Row labels are padded to the widest `index name`.
        let width = "1 address".len();
        assert!(lines[1].starts_with("0 make   "));
        assert!(lines[2].starts_with("1 address"));
        assert!(lines.iter().take(5).all(|l| l.chars().count() > width));
        assert!(lines[5].starts_with("shade by |r|: "));
    }

    #[test]
    fn ansi_render_uses_escape_codes() {
        let text = Heatmap::new(&matrix()).render(HeatmapMode::Ansi);
        assert!(text.contains("\x1b[30;48;5;160m"));
        assert!(text.contains("\x1b[30;48;5;19m"));
        assert!(text.contains("\x1b[0m"));
        assert!(text.contains("address"));
    }

    #[test]
    fn colour_and_shade_scales() {
        assert_eq!(ansi_colour(-1.0), 19);
        assert_eq!(ansi_colour(0.0), 255);
        assert_eq!(ansi_colour(1.0), 160);
        assert_eq!(ansi_colour(f64::NAN), ANSI_NAN);
        assert_eq!(shade(0.0), ' ');
        assert_eq!(shade(-1.0), '█');
        assert_eq!(shade(0.5), '▒');
    }
}
