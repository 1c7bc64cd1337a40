use actix_files::Files;
use actix_multipart::Multipart;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use log::{error, warn};
use std::path::PathBuf;

use crate::config::UploadConfig;
use crate::pipeline::{AnalysisError, Analyzer};
use crate::render::{render_page, PageView};
use crate::upload::read_image;

pub fn configure_routes(cfg: &mut web::ServiceConfig, static_dir: PathBuf) {
    cfg.service(web::resource("/").route(web::get().to(index)))
        .service(web::resource("/classify").route(web::post().to(classify)))
        .service(Files::new("/static", static_dir));
}

fn html_response(status: StatusCode, body: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(body)
}

async fn index() -> HttpResponse {
    html_response(StatusCode::OK, render_page(PageView::Upload).await)
}

async fn classify(
    analyzer: web::Data<Analyzer>,
    upload_config: web::Data<UploadConfig>,
    payload: Multipart,
) -> HttpResponse {
    let upload = match read_image(payload, upload_config.max_bytes).await {
        Ok(upload) => upload,
        Err(e) => {
            warn!("Rejected upload: {}", e);
            let page = render_page(PageView::Error(e.user_message())).await;
            return html_response(e.status_code(), page);
        }
    };

    let analyzer = analyzer.into_inner();
    let result = web::block(move || analyzer.analyze(&upload)).await;

    match result {
        Ok(Ok(analysis)) => html_response(
            StatusCode::OK,
            render_page(PageView::Result(Box::new(analysis))).await,
        ),
        Ok(Err(e)) => {
            match &e {
                AnalysisError::Preprocess(_) => warn!("Could not preprocess upload: {}", e),
                AnalysisError::Inference(_) => error!("Model inference error: {:?}", e),
            }
            html_response(
                e.status_code(),
                render_page(PageView::Error(e.user_message())).await,
            )
        }
        Err(e) => {
            error!("Analysis task failed: {:?}", e);
            html_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                render_page(PageView::Error(
                    "The classifier failed to process this image. Please try again.".into(),
                ))
                .await,
            )
        }
    }
}
