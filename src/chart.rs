//! Progress chart rendering - stacked correct/incorrect bars per concept

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use plotters::prelude::*;
use std::collections::HashMap;

use crate::progress::ConceptMastery;
use crate::text;

const CHART_WIDTH: u32 = 1000;
const CHART_HEIGHT: u32 = 600;

/// Only the highest-attempt concepts are charted.
const MAX_BARS: usize = 10;

/// Bar labels are cut to this many characters.
const LABEL_MAX_CHARS: usize = 20;

/// Render the mastery aggregate as a stacked bar chart, base64-encoded SVG.
///
/// Returns `None` when nothing has been recorded yet.
pub fn render_mastery_chart(
    mastery: &HashMap<String, ConceptMastery>,
) -> Result<Option<String>, String> {
    if mastery.is_empty() {
        return Ok(None);
    }

    let mut rows: Vec<(&String, &ConceptMastery)> = mastery.iter().collect();
    rows.sort_by(|a, b| b.1.attempts.cmp(&a.1.attempts).then_with(|| a.0.cmp(b.0)));
    rows.truncate(MAX_BARS);

    let labels: Vec<String> = rows
        .iter()
        .map(|(concept, _)| text::truncate_chars(concept, LABEL_MAX_CHARS))
        .collect();
    let y_max = rows
        .iter()
        .map(|(_, m)| m.attempts)
        .max()
        .unwrap_or(1)
        .max(1) as f64;
    let n = rows.len();

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (CHART_WIDTH, CHART_HEIGHT))
            .into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| format!("Failed to fill chart background: {}", e))?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Concept Mastery Progress", ("sans-serif", 28))
            .margin(10)
            .x_label_area_size(90)
            .y_label_area_size(50)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..y_max)
            .map_err(|e| format!("Failed to build chart axes: {}", e))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&|x| {
                let i = x.round();
                if i >= 0.0 && (i as usize) < labels.len() && (x - i).abs() < 1e-6 {
                    labels[i as usize].clone()
                } else {
                    String::new()
                }
            })
            .y_desc("Number of Attempts")
            .draw()
            .map_err(|e| format!("Failed to draw chart mesh: {}", e))?;

        chart
            .draw_series(rows.iter().enumerate().map(|(i, (_, m))| {
                Rectangle::new(
                    [(i as f64 - 0.35, 0.0), (i as f64 + 0.35, m.correct as f64)],
                    GREEN.mix(0.7).filled(),
                )
            }))
            .map_err(|e| format!("Failed to draw correct bars: {}", e))?
            .label("Correct")
            .legend(|(x, y)| {
                Rectangle::new([(x, y - 5), (x + 10, y + 5)], GREEN.mix(0.7).filled())
            });

        chart
            .draw_series(rows.iter().enumerate().map(|(i, (_, m))| {
                Rectangle::new(
                    [
                        (i as f64 - 0.35, m.correct as f64),
                        (i as f64 + 0.35, (m.correct + m.incorrect) as f64),
                    ],
                    RED.mix(0.7).filled(),
                )
            }))
            .map_err(|e| format!("Failed to draw incorrect bars: {}", e))?
            .label("Incorrect")
            .legend(|(x, y)| {
                Rectangle::new([(x, y - 5), (x + 10, y + 5)], RED.mix(0.7).filled())
            });

        chart
            .configure_series_labels()
            .border_style(BLACK)
            .background_style(WHITE.mix(0.8))
            .draw()
            .map_err(|e| format!("Failed to draw chart legend: {}", e))?;

        root.present()
            .map_err(|e| format!("Failed to finalize chart: {}", e))?;
    }

    Ok(Some(STANDARD.encode(svg.as_bytes())))
}
