use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while opening workbooks and loading sheets
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Sheet not found: '{requested}' (keywords tried: {keywords:?}; available: {available:?})")]
    SheetNotFound {
        requested: String,
        keywords: Vec<String>,
        available: Vec<String>,
    },

    #[error("Failed to open workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    #[error("Failed to read sheet '{sheet}' in {path}: {message}")]
    SheetRead {
        path: PathBuf,
        sheet: String,
        message: String,
    },

    #[error("Row index out of bounds: {index} (sheet has {count} rows)")]
    RowIndexOutOfBounds { index: usize, count: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SheetError>;
