use yew::prelude::*;

/// Renders the application header
pub fn render_header() -> Html {
    html! {
        <header class="app-header">
            <h1>{"Brain Tumor MRI Classification"}</h1>
            <p class="subtitle">{"Upload an MRI image and get predictions along with professional advice."}</p>
        </header>
    }
}
