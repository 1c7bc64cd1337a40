use yew::prelude::*;

use crate::upload::{ACCEPTED_EXTENSIONS, FIELD_NAME};

pub fn render_upload_section() -> Html {
    let accept = ACCEPTED_EXTENSIONS
        .iter()
        .map(|ext| format!(".{}", ext))
        .collect::<Vec<_>>()
        .join(",");

    html! {
        <div class="upload-section">
            <form class="upload-form" method="post" action="/classify" enctype="multipart/form-data">
                <label class="upload-label">
                    {"Choose an MRI image..."}
                    <input type="file" id="file-input" name={FIELD_NAME} accept={accept} required=true />
                </label>
                <p class="file-types">{"Supported formats: JPG, JPEG, PNG"}</p>
                <button type="submit" class="analyze-btn">{"Classify"}</button>
            </form>
        </div>
    }
}
