use actix_files::{Files, NamedFile};
use actix_multipart::{Multipart, MultipartError};
use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse};
use futures::TryStreamExt;
use std::path::PathBuf;

use crate::{
    error::{HairgenError, Result},
    generator::HairstyleGenerator,
    models::{ErrorBody, GenerationRequest, GenerationResult, SuccessBody},
};

pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;
const MAX_TEXT_FIELD_SIZE: usize = 1024;

/// Everything the handlers need, built once in `main` and shared read-only.
pub struct AppState {
    pub generator: HairstyleGenerator,
    pub index_file: PathBuf,
}

impl AppState {
    pub fn new(generator: HairstyleGenerator, index_file: impl Into<PathBuf>) -> Self {
        Self {
            generator,
            index_file: index_file.into(),
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/generate", web::post().to(generate));
}

pub fn static_files(dir: impl Into<PathBuf>) -> Files {
    Files::new("/static", dir.into())
}

async fn index(state: web::Data<AppState>) -> actix_web::Result<NamedFile> {
    Ok(NamedFile::open_async(&state.index_file).await?)
}

async fn generate(
    req: HttpRequest,
    body: web::Payload,
    state: web::Data<AppState>,
) -> HttpResponse {
    // Built by hand so a missing or non-multipart content type surfaces as a form error.
    let payload = Multipart::new(req.headers(), body);
    let request = match read_form(payload).await {
        Ok(request) => request,
        Err(e) => return reject_form(e),
    };

    // Unknown styles answer 400 before the image is looked at.
    if request.image.is_empty()
        && state.generator.registry().lookup(&request.hairstyle).is_some()
    {
        return reject_form(HairgenError::UploadError("field 'file' is empty".into()));
    }

    into_response(state.generator.generate(request).await)
}

fn reject_form(err: HairgenError) -> HttpResponse {
    log::warn!("⚠️  Rejected /generate form: {}", err);
    let status = match err {
        HairgenError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    };
    HttpResponse::build(status).json(ErrorBody::new(err.to_string()))
}

pub fn into_response(result: GenerationResult) -> HttpResponse {
    match result {
        GenerationResult::Success { image_url } => HttpResponse::Ok().json(SuccessBody {
            status: "success".to_string(),
            image_url,
        }),
        GenerationResult::Failure { kind, message } => {
            let status = StatusCode::from_u16(kind.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            HttpResponse::build(status).json(ErrorBody::new(message))
        }
    }
}

/// Collects the `file` and `hairstyle` fields; other fields are drained and ignored.
///
/// Each field is capped while it streams in, so an oversized upload is rejected
/// without being buffered.
async fn read_form(mut payload: Multipart) -> Result<GenerationRequest> {
    let mut image: Option<Vec<u8>> = None;
    let mut hairstyle: Option<String> = None;

    while let Some(mut field) = payload.try_next().await.map_err(upload_error)? {
        let name = field
            .content_disposition()
            .get_name()
            .unwrap_or_default()
            .to_string();
        let (label, limit) = match name.as_str() {
            "file" => ("file", MAX_IMAGE_SIZE),
            "hairstyle" => ("hairstyle", MAX_TEXT_FIELD_SIZE),
            _ => ("other", MAX_TEXT_FIELD_SIZE),
        };

        let mut data = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(upload_error)? {
            if data.len() + chunk.len() > limit {
                return Err(HairgenError::PayloadTooLarge {
                    field: label,
                    limit,
                });
            }
            data.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "file" => image = Some(data),
            "hairstyle" => {
                let value = String::from_utf8(data).map_err(|_| {
                    HairgenError::UploadError("field 'hairstyle' is not valid UTF-8".into())
                })?;
                hairstyle = Some(value);
            }
            _ => {}
        }
    }

    let image =
        image.ok_or_else(|| HairgenError::UploadError("field 'file' is required".into()))?;
    let hairstyle = hairstyle
        .ok_or_else(|| HairgenError::UploadError("field 'hairstyle' is required".into()))?;

    Ok(GenerationRequest::new(image, hairstyle))
}

fn upload_error(err: MultipartError) -> HairgenError {
    HairgenError::UploadError(err.to_string())
}
