use yew::prelude::*;

use super::charts::{render_bar_chart, render_pie_chart};
use super::utils::format_percent;
use crate::pipeline::Analysis;

pub fn render_results(analysis: &Analysis) -> Html {
    let prediction = &analysis.prediction;
    let label = prediction.label;

    html! {
        <div class={classes!("results-container", label.to_string())}>
            <figure class="uploaded-image">
                <img src={analysis.preview.data_uri.clone()}
                     alt={format!("Uploaded MRI: {}", analysis.file_name)} />
                <figcaption>
                    {"Uploaded MRI."}
                    <span class="image-meta">
                        {format!(" {} ({}x{})", analysis.file_name, analysis.preview.width, analysis.preview.height)}
                    </span>
                </figcaption>
            </figure>

            <div class="result-header">
                <h2>{"Prediction: "}<strong>{label.display_name()}</strong></h2>
                <div class="confidence-meter">
                    <div class="meter-label">{"Confidence:"}</div>
                    <div class="meter">
                        <div class="meter-fill" style={format!("width: {:.1}%", prediction.confidence() * 100.0)}></div>
                    </div>
                    <div class="meter-value">{format_percent(prediction.confidence())}</div>
                </div>
            </div>

            <div class="advice">
                { for analysis.advice.fields().into_iter().map(|(caption, text)| html! {
                    <p class="advice-field">
                        <strong>{format!("{}:", caption)}</strong>{" "}{text}
                    </p>
                })}
            </div>

            <div class="detailed-results">
                <h3>{"Class Probabilities"}</h3>
                <div class="charts">
                    { render_bar_chart(&prediction.probabilities) }
                    { render_pie_chart(&prediction.probabilities) }
                </div>
            </div>
        </div>
    }
}
