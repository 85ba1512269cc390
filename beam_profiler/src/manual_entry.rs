//! Knife-edge measurements typed into a two-column table.
//!
//! Rows arrive as optional text cells `(x, y)`. Parsing stops at the first
//! row with a blank cell, the parsed series is fitted with the bounded edge
//! model, and the outcome is summarised in an [`EdgeFitReport`].

use crate::array_ops::range;
use crate::error::{Error, Result};
use crate::fit::{CURVE_SAMPLES, EdgeFit, SolverConfig, fit_edge};
use crate::plot::{PlotSink, XySeries};

/// One table row: `(x cell, y cell)`.
pub type Row<'a> = (Option<&'a str>, Option<&'a str>);

/// Parsed table columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeScan {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

impl EdgeScan {
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }
}

/// Reads rows until the first one with a blank or missing cell.
pub fn parse_rows(rows: &[Row<'_>]) -> Result<EdgeScan> {
    let mut scan = EdgeScan::default();

    for (row, &(x, y)) in rows.iter().enumerate() {
        let (Some(x), Some(y)) = (non_blank(x), non_blank(y)) else {
            break;
        };
        scan.xs.push(parse_cell(x, row, 0)?);
        scan.ys.push(parse_cell(y, row, 1)?);
    }

    tracing::debug!("Parsed {} table rows", scan.len());
    Ok(scan)
}

fn non_blank(cell: Option<&str>) -> Option<&str> {
    cell.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_cell(text: &str, row: usize, column: usize) -> Result<f64> {
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::InvalidCell {
            row,
            column,
            value: text.to_string(),
        })
}

/// Sampled fitted curve drawn over the scan.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeCurve {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

/// Result of fitting one scan, ready for display.
///
/// A failed fit still produces a report: the text carries the failure and
/// there is no overlay.
#[derive(Debug, Clone)]
pub struct EdgeFitReport {
    pub scan: EdgeScan,
    pub fit: Option<EdgeFit>,
    pub text: String,
    pub overlay: Option<EdgeCurve>,
}

impl EdgeFitReport {
    pub fn new(scan: EdgeScan, config: &SolverConfig) -> Self {
        match fit_scan(&scan, config) {
            Ok((fit, overlay)) => Self {
                text: report_text(&fit),
                scan,
                fit: Some(fit),
                overlay: Some(overlay),
            },
            Err(err) => {
                tracing::warn!("Edge fit failed: {err}");
                Self {
                    scan,
                    fit: None,
                    text: err.to_string(),
                    overlay: None,
                }
            }
        }
    }

    /// Parses `rows` and fits them. Only malformed cells are an error.
    pub fn from_rows(rows: &[Row<'_>], config: &SolverConfig) -> Result<Self> {
        Ok(Self::new(parse_rows(rows)?, config))
    }

    pub fn succeeded(&self) -> bool {
        self.fit.is_some()
    }

    /// Draws the scan and, when the fit succeeded, the fitted curve.
    pub fn render(&self, sink: &mut dyn PlotSink, name: &str) -> Result<()> {
        let overlay = self
            .overlay
            .as_ref()
            .map(|curve| XySeries::new(&curve.xs, &curve.ys));
        sink.render_xy(name, XySeries::new(&self.scan.xs, &self.scan.ys), overlay)
    }
}

fn fit_scan(scan: &EdgeScan, config: &SolverConfig) -> Result<(EdgeFit, EdgeCurve)> {
    let fit = fit_edge(&scan.xs, &scan.ys, config)?;
    let (x_min, x_max) = range(&scan.xs)?;
    let (xs, ys) = fit.params.curve(x_min, x_max, CURVE_SAMPLES);
    Ok((fit, EdgeCurve { xs, ys }))
}

fn report_text(fit: &EdgeFit) -> String {
    fit.params
        .named()
        .iter()
        .map(|(name, value)| format!("{name} = {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}
