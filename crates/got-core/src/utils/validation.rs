//! Argument validation for values that arrive from the command line.

use crate::error::CliError;
use crate::networking::Pagination;
use crate::storage::config::MAX_PAGE_SIZE;

/// Validate that a URL is properly formatted
pub fn validate_url(url: &str) -> crate::Result<()> {
    if url.is_empty() {
        return Err(CliError::InvalidArguments("URL cannot be empty".to_string()).into());
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(CliError::InvalidArguments(format!(
            "Invalid URL '{}': URL must start with http:// or https://",
            url
        ))
        .into());
    }

    Ok(())
}

pub fn validate_page(page: u32) -> crate::Result<()> {
    if page < Pagination::FIRST_PAGE {
        return Err(CliError::InvalidArguments(format!(
            "Invalid page {}: pages start at {}",
            page,
            Pagination::FIRST_PAGE
        ))
        .into());
    }
    Ok(())
}

pub fn validate_page_size(page_size: u32) -> crate::Result<()> {
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(CliError::InvalidArguments(format!(
            "Invalid page size {}: must be between 1 and {}",
            page_size, MAX_PAGE_SIZE
        ))
        .into());
    }
    Ok(())
}
