//! Static SVG charts of a probability vector.
//!
//! Geometry lives in plain functions so it can be checked without rendering;
//! the `render_*` functions only turn it into markup.

use shared::{ClassLabel, ProbabilityVector};
use std::f32::consts::{FRAC_PI_2, TAU};
use yew::prelude::*;

use super::utils::format_percent;

pub const BAR_WIDTH: f32 = 520.0;
pub const BAR_HEIGHT: f32 = 240.0;
const BAR_MARGIN_LEFT: f32 = 110.0;
const BAR_MARGIN_RIGHT: f32 = 24.0;
const BAR_MARGIN_TOP: f32 = 36.0;
const BAR_MARGIN_BOTTOM: f32 = 48.0;
const BAR_FILL: f32 = 0.6;

pub const PIE_WIDTH: f32 = 420.0;
pub const PIE_HEIGHT: f32 = 240.0;
const PIE_CX: f32 = 120.0;
const PIE_CY: f32 = 128.0;
const PIE_RADIUS: f32 = 96.0;

/// matplotlib's default cycle, so the charts look like the usual notebook output.
pub fn color(label: ClassLabel) -> &'static str {
    match label {
        ClassLabel::Glioma => "#1f77b4",
        ClassLabel::Meningioma => "#ff7f0e",
        ClassLabel::NoTumor => "#2ca02c",
        ClassLabel::Pituitary => "#d62728",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: ClassLabel,
    pub probability: f32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

fn plot_width() -> f32 {
    BAR_WIDTH - BAR_MARGIN_LEFT - BAR_MARGIN_RIGHT
}

/// One horizontal bar per class, top to bottom in label order, on a 0..1 axis.
pub fn bar_layout(probabilities: &ProbabilityVector) -> Vec<Bar> {
    let plot_height = BAR_HEIGHT - BAR_MARGIN_TOP - BAR_MARGIN_BOTTOM;
    let band = plot_height / probabilities.len() as f32;
    probabilities
        .labeled()
        .enumerate()
        .map(|(row, (label, probability))| Bar {
            label,
            probability,
            x: BAR_MARGIN_LEFT,
            y: BAR_MARGIN_TOP + band * row as f32 + band * (1.0 - BAR_FILL) / 2.0,
            width: probability.clamp(0.0, 1.0) * plot_width(),
            height: band * BAR_FILL,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: ClassLabel,
    pub probability: f32,
    pub start: f32,
    pub end: f32,
}

impl Slice {
    pub fn sweep(&self) -> f32 {
        self.end - self.start
    }

    pub fn is_full_circle(&self) -> bool {
        self.sweep() >= TAU - 1e-4
    }

    /// SVG path of the wedge. Angles run clockwise from twelve o'clock.
    pub fn path(&self) -> String {
        let (x0, y0) = point_on_circle(self.start, PIE_RADIUS);
        let (x1, y1) = point_on_circle(self.end, PIE_RADIUS);
        let large_arc = if self.sweep() > std::f32::consts::PI { 1 } else { 0 };
        format!(
            "M {:.2} {:.2} L {:.2} {:.2} A {r:.2} {r:.2} 0 {} 1 {:.2} {:.2} Z",
            PIE_CX,
            PIE_CY,
            x0,
            y0,
            large_arc,
            x1,
            y1,
            r = PIE_RADIUS
        )
    }

    pub fn label_position(&self) -> (f32, f32) {
        point_on_circle((self.start + self.end) / 2.0, PIE_RADIUS * 0.62)
    }
}

fn point_on_circle(angle: f32, radius: f32) -> (f32, f32) {
    let theta = angle - FRAC_PI_2;
    (PIE_CX + radius * theta.cos(), PIE_CY + radius * theta.sin())
}

/// Wedges for every class with non-zero probability, sweeping a full turn.
pub fn pie_slices(probabilities: &ProbabilityVector) -> Vec<Slice> {
    let total = probabilities.total();
    let mut start = 0.0;
    let mut slices = Vec::new();
    for (label, probability) in probabilities.labeled() {
        if probability <= 0.0 {
            continue;
        }
        let end = start + probability / total * TAU;
        slices.push(Slice {
            label,
            probability,
            start,
            end,
        });
        start = end;
    }
    slices
}

pub fn render_bar_chart(probabilities: &ProbabilityVector) -> Html {
    let axis_y = BAR_HEIGHT - BAR_MARGIN_BOTTOM;
    let ticks = (0..=5).map(|i| i as f32 / 5.0);

    html! {
        <svg class="chart bar-chart" viewBox={format!("0 0 {} {}", BAR_WIDTH, BAR_HEIGHT)}
             xmlns="http://www.w3.org/2000/svg" role="img" aria-label="Prediction probabilities bar chart">
            <text class="chart-title" x={(BAR_WIDTH / 2.0).to_string()} y="22" text-anchor="middle">
                {"Prediction Probabilities"}
            </text>
            { for ticks.map(|t| {
                let x = BAR_MARGIN_LEFT + t * plot_width();
                html! {
                    <g class="tick">
                        <line x1={x.to_string()} y1={BAR_MARGIN_TOP.to_string()}
                              x2={x.to_string()} y2={axis_y.to_string()} stroke="#d0d7e2" />
                        <text x={x.to_string()} y={(axis_y + 16.0).to_string()} text-anchor="middle">
                            {format!("{:.1}", t)}
                        </text>
                    </g>
                }
            })}
            { for bar_layout(probabilities).into_iter().map(|bar| html! {
                <g class="bar">
                    <text x={(bar.x - 8.0).to_string()} y={(bar.y + bar.height / 2.0 + 4.0).to_string()}
                          text-anchor="end">
                        {bar.label.display_name()}
                    </text>
                    <rect x={format!("{:.2}", bar.x)} y={format!("{:.2}", bar.y)}
                          width={format!("{:.2}", bar.width)} height={format!("{:.2}", bar.height)}
                          fill={color(bar.label)} />
                    <text x={format!("{:.2}", bar.x + bar.width + 4.0)}
                          y={(bar.y + bar.height / 2.0 + 4.0).to_string()} class="bar-value">
                        {format!("{:.3}", bar.probability)}
                    </text>
                </g>
            })}
            <line x1={BAR_MARGIN_LEFT.to_string()} y1={axis_y.to_string()}
                  x2={(BAR_MARGIN_LEFT + plot_width()).to_string()} y2={axis_y.to_string()} stroke="#333" />
            <text class="axis-label" x={(BAR_MARGIN_LEFT + plot_width() / 2.0).to_string()}
                  y={(BAR_HEIGHT - 8.0).to_string()} text-anchor="middle">
                {"Probability"}
            </text>
        </svg>
    }
}

pub fn render_pie_chart(probabilities: &ProbabilityVector) -> Html {
    let slices = pie_slices(probabilities);

    html! {
        <svg class="chart pie-chart" viewBox={format!("0 0 {} {}", PIE_WIDTH, PIE_HEIGHT)}
             xmlns="http://www.w3.org/2000/svg" role="img" aria-label="Prediction probabilities pie chart">
            { for slices.iter().map(|slice| {
                let (lx, ly) = slice.label_position();
                let wedge = if slice.is_full_circle() {
                    html! {
                        <circle cx={PIE_CX.to_string()} cy={PIE_CY.to_string()} r={PIE_RADIUS.to_string()}
                                fill={color(slice.label)} />
                    }
                } else {
                    html! { <path d={slice.path()} fill={color(slice.label)} stroke="#ffffff" stroke-width="1" /> }
                };
                html! {
                    <g class="slice">
                        { wedge }
                        <text x={format!("{:.2}", lx)} y={format!("{:.2}", ly + 4.0)} text-anchor="middle" class="slice-label">
                            {format_percent(slice.probability)}
                        </text>
                    </g>
                }
            })}
            { for probabilities.labeled().enumerate().map(|(row, (label, _))| {
                let y = 60.0 + row as f32 * 28.0;
                html! {
                    <g class="legend-item">
                        <rect x="260" y={(y - 12.0).to_string()} width="16" height="16" fill={color(label)} />
                        <text x="284" y={y.to_string()}>{label.display_name()}</text>
                    </g>
                }
            })}
        </svg>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probabilities(scores: [f32; 4]) -> ProbabilityVector {
        ProbabilityVector::from_scores(&scores).unwrap()
    }

    #[test]
    fn bar_widths_are_proportional_to_probability() {
        let bars = bar_layout(&probabilities([0.1, 0.2, 0.3, 0.4]));
        assert_eq!(bars.len(), 4);
        for bar in &bars {
            let expected = bar.probability * plot_width();
            assert!((bar.width - expected).abs() < 1e-3);
        }
        assert!(bars.windows(2).all(|pair| pair[0].y < pair[1].y));
        assert_eq!(bars[3].label, ClassLabel::Pituitary);
    }

    #[test]
    fn pie_sweeps_one_full_turn() {
        let slices = pie_slices(&probabilities([0.1, 0.2, 0.3, 0.4]));
        let sweep: f32 = slices.iter().map(Slice::sweep).sum();
        assert!((sweep - TAU).abs() < 1e-4);
        assert!(slices.windows(2).all(|pair| (pair[0].end - pair[1].start).abs() < 1e-6));
    }

    #[test]
    fn empty_classes_get_no_wedge() {
        let slices = pie_slices(&probabilities([0.0, 0.0, 1.0, 0.0]));
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].label, ClassLabel::NoTumor);
        assert!(slices[0].is_full_circle());
    }

    #[test]
    fn large_wedges_use_the_large_arc_flag() {
        let slices = pie_slices(&probabilities([0.75, 0.25, 0.0, 0.0]));
        assert!(slices[0].path().contains(" 0 1 1 "));
        assert!(slices[1].path().contains(" 0 0 1 "));
    }

    #[test]
    fn first_wedge_starts_at_twelve_o_clock() {
        let slices = pie_slices(&probabilities([0.25, 0.25, 0.25, 0.25]));
        let (x, y) = point_on_circle(slices[0].start, PIE_RADIUS);
        assert!((x - PIE_CX).abs() < 1e-3);
        assert!((y - (PIE_CY - PIE_RADIUS)).abs() < 1e-3);
    }
}
