use actix_web::{
    dev::Payload, http::ConnectionType, FromRequest, HttpMessage, HttpRequest, HttpResponse,
};
use futures::{Future, StreamExt, TryStreamExt};
use serde_json::Value;
use std::{
    ops::{Deref, DerefMut},
    pin::Pin,
};

use crate::{
    error::MultipartError,
    field::{RawField, RawFields, RawUpload},
    form::MultipartForm,
    pipeline::{pre_handler, pre_validation},
    MultipartConfig, DEFAULT_FILE_SIZE_LIMIT,
};

/// Extractor to extract normalized multipart forms from the request.
pub struct Multipart<T>(T);

impl<T> Multipart<T> {
    /// Unwrap into the inner form.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Multipart<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Multipart<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T: serde::de::DeserializeOwned + MultipartForm> FromRequest for Multipart<T> {
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let mut multipart = actix_multipart::Multipart::new(req.headers(), payload.take());
        let req_owned = req.to_owned();

        Box::pin(async move {
            let config = req_owned.app_data::<MultipartConfig>();

            if !req_owned
                .content_type()
                .eq_ignore_ascii_case("multipart/form-data")
            {
                return Err(handle_error(MultipartError::NotMultipart, config));
            }

            let limit = config.map_or(DEFAULT_FILE_SIZE_LIMIT, |c| c.file_size_limit);
            let fields = match read_fields(&mut multipart, limit).await {
                Ok(fields) => fields,
                Err(err) => return Err(handle_error(err, config)),
            };

            let body = match pre_validation(&fields, &T::schema()) {
                Ok(body) => body,
                Err(err) => return Err(handle_error(MultipartError::Validation(err), config)),
            };
            let body = pre_handler(body);

            match serde_json::from_value::<T>(Value::Object(body)) {
                Ok(parsed) => Ok(Multipart(parsed)),
                Err(err) => Err(handle_error(MultipartError::ParseError(err), config)),
            }
        })
    }
}

fn handle_error(error: MultipartError, config: Option<&MultipartConfig>) -> actix_web::Error {
    let mut res = match config.and_then(|config| config.error_handler.as_ref()) {
        Some(error_handler) => error_handler(error),
        None => default_response(error),
    };

    // We must do this manually because of a bug in actix_http
    // Ideally we would have all errors be a `actix_web::Error` by default
    // SEE: https://github.com/actix/actix-web/pull/2779
    res.head_mut().set_connection_type(ConnectionType::Close);

    actix_web::error::InternalError::from_response("invalid multipart", res).into()
}

/// Validation failures carry their structured 422 payload, everything else
/// is a plain bad request.
fn default_response(error: MultipartError) -> HttpResponse {
    match &error {
        MultipartError::Validation(validation) => {
            HttpResponse::UnprocessableEntity().json(validation.response_body())
        }
        _ => HttpResponse::BadRequest().body(error.to_string()),
    }
}

/// Buffer the whole stream into a flat field set, in submission order.
///
/// Every file part is checked against the size limit as it streams in, so
/// an oversized upload aborts the read without buffering the rest. A part
/// whose body read fails is dropped. A decode failure on the part stream
/// itself fails the whole read; the stream cannot resume past a failed part.
async fn read_fields(
    multipart: &mut actix_multipart::Multipart,
    file_size_limit: usize,
) -> Result<RawFields, MultipartError> {
    let mut fields = RawFields::new();

    loop {
        let mut field = match multipart.try_next().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => return Err(MultipartError::DecodeError(err)),
        };

        // The codec never yields a part without a form-data name.
        let field_name = field.name().to_owned();
        let filename = field
            .content_disposition()
            .get_filename()
            .map(str::to_owned);

        if let Some(filename) = filename {
            let mimetype = field.content_type().to_string();
            let encoding = field
                .headers()
                .get("content-transfer-encoding")
                .and_then(|value| value.to_str().ok())
                .unwrap_or("7bit")
                .to_owned();

            let mut data = Vec::new();
            let mut size = 0;
            let mut dropped = false;
            while let Some(chunk) = field.next().await {
                match chunk {
                    Ok(bytes) => {
                        size += bytes.len();
                        if size > file_size_limit {
                            return Err(MultipartError::FileSizeError {
                                field: field_name,
                                limit: file_size_limit,
                            });
                        }
                        data.extend_from_slice(&bytes);
                    }
                    Err(err) => {
                        log::warn!("dropping multipart file part {field_name}: {err}");
                        dropped = true;
                        break;
                    }
                }
            }
            if dropped {
                continue;
            }

            fields.push(
                field_name,
                RawField::Upload(RawUpload::new(filename, mimetype, encoding, data)),
            );
        } else {
            let mut data = Vec::new();
            let mut dropped = false;
            while let Some(chunk) = field.next().await {
                match chunk {
                    Ok(bytes) => data.extend_from_slice(&bytes),
                    Err(err) => {
                        log::warn!("dropping multipart text part {field_name}: {err}");
                        dropped = true;
                        break;
                    }
                }
            }
            if dropped {
                continue;
            }

            match String::from_utf8(data) {
                Ok(text) => fields.push(field_name, RawField::Text(text)),
                Err(_) => log::debug!("multipart field {field_name} is not utf-8, skipping"),
            }
        }
    }

    Ok(fields)
}
