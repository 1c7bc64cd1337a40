use yew::prelude::*;

/// Probability as a one-decimal percentage, e.g. `0.4567` -> `45.7%`.
pub fn format_percent(probability: f32) -> String {
    format!("{:.1}%", probability * 100.0)
}

pub fn render_error_message(error: Option<&str>) -> Html {
    if let Some(error_msg) = error {
        html! {
            <div class="error-message" role="alert">
                <p>{ error_msg }</p>
            </div>
        }
    } else {
        html! {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentages_have_one_decimal() {
        assert_eq!(format_percent(0.4567), "45.7%");
        assert_eq!(format_percent(1.0), "100.0%");
        assert_eq!(format_percent(0.0), "0.0%");
    }
}
