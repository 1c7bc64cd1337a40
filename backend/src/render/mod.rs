//! Server-side rendering of the single page.
//!
//! Components are plain `render_*` functions returning [`Html`]; [`Page`] is the
//! only yew component and exists so `ServerRenderer` has a root to mount.

pub mod components;

use yew::prelude::*;
use yew::ServerRenderer;

use crate::pipeline::Analysis;
use components::header::render_header;
use components::results::render_results;
use components::upload_section::render_upload_section;
use components::utils::render_error_message;

pub const PAGE_TITLE: &str = "Brain Tumor MRI Classification";

#[derive(Debug, Clone, PartialEq)]
pub enum PageView {
    Upload,
    Result(Box<Analysis>),
    Error(String),
}

#[derive(Properties, PartialEq, Clone)]
pub struct PageProps {
    pub view: PageView,
}

#[function_component(Page)]
fn page(props: &PageProps) -> Html {
    let (error, results) = match &props.view {
        PageView::Upload => (None, html! {}),
        PageView::Result(analysis) => (None, render_results(analysis)),
        PageView::Error(message) => (Some(message.as_str()), html! {}),
    };

    html! {
        <div class="container">
            { render_header() }
            <main class="main-content">
                { render_upload_section() }
                { render_error_message(error) }
                { results }
            </main>
            <footer class="app-footer">
                <p>{"For informational purposes only. Always consult a qualified physician."}</p>
            </footer>
        </div>
    }
}

pub async fn render_page(view: PageView) -> String {
    let body = ServerRenderer::<Page>::with_props(move || PageProps { view })
        .hydratable(false)
        .render()
        .await;
    document(&body)
}

fn document(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{PAGE_TITLE}</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
{body}
</body>
</html>
"#
    )
}
