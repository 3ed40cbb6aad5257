use actix_web::HttpResponse;

use crate::MultipartError;

/// Upload ceiling applied while decoding when no config is registered,
/// 1000 MiB.
pub const DEFAULT_FILE_SIZE_LIMIT: usize = 1000 * 1024 * 1024;

type MultipartErrorHandler = Box<dyn Fn(MultipartError) -> HttpResponse + Send + Sync + 'static>;

/// Config for multipart extraction, insert with [`actix_web::App::app_data`].
pub struct MultipartConfig {
    /// Bytes one file part may carry before decoding is aborted.
    pub file_size_limit: usize,
    pub error_handler: Option<MultipartErrorHandler>,
}

impl MultipartConfig {
    pub fn set_file_size_limit(mut self, limit: usize) -> Self {
        self.file_size_limit = limit;
        self
    }

    pub fn set_error_handler<F>(mut self, error_handler: F) -> Self
    where
        F: Fn(MultipartError) -> HttpResponse + Send + Sync + 'static,
    {
        self.error_handler = Some(Box::new(error_handler));
        self
    }
}

impl Default for MultipartConfig {
    fn default() -> Self {
        Self {
            file_size_limit: DEFAULT_FILE_SIZE_LIMIT,
            error_handler: None,
        }
    }
}
