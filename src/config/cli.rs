use crate::utils::error::{FunctionsError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// 要上傳的程式碼：直接給字串，或從檔案讀
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeSource {
    Inline(String),
    File(PathBuf),
}

impl CodeSource {
    /// `code` 與 `code_file` 必須恰好給一個
    pub fn from_options(code: Option<&str>, code_file: Option<&str>) -> Result<Self> {
        match (code, code_file) {
            (Some(code), None) => Ok(CodeSource::Inline(code.to_string())),
            (None, Some(path)) => Ok(CodeSource::File(PathBuf::from(path))),
            (Some(_), Some(_)) => Err(FunctionsError::ConfigValidationError {
                field: "code".to_string(),
                message: "Use either code or code_file, not both".to_string(),
            }),
            (None, None) => Err(FunctionsError::MissingConfigError {
                field: "code or code_file".to_string(),
            }),
        }
    }

    /// 相對路徑以 `base_dir` 為起點
    pub fn read(&self, base_dir: Option<&Path>) -> Result<String> {
        match self {
            CodeSource::Inline(code) => Ok(code.clone()),
            CodeSource::File(path) => {
                let full_path = match base_dir {
                    Some(base) if path.is_relative() => base.join(path),
                    _ => path.clone(),
                };
                tracing::debug!("Reading code from {}", full_path.display());
                let code = fs::read_to_string(full_path)?;
                Ok(code)
            }
        }
    }
}
