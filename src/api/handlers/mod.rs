pub mod demo;
pub mod token;

use crate::error::AppError;

pub async fn not_found() -> AppError {
    AppError::NotFound
}
