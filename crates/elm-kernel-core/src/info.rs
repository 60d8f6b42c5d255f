//! Kernel identification reported to front-ends.

use serde::{Deserialize, Serialize};

/// Language information for syntax highlighting and file export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageInfo {
    pub name: String,
    pub codemirror_mode: String,
    pub mimetype: String,
    pub file_extension: String,
}

/// Reply body for a kernel info request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelInfo {
    pub implementation: String,
    pub implementation_version: String,
    /// Language the kernel evaluates. Cells are only compiled, never
    /// evaluated, hence `no-op`.
    pub language: String,
    pub language_version: String,
    pub language_info: LanguageInfo,
    pub banner: String,
}

impl Default for KernelInfo {
    fn default() -> Self {
        Self {
            implementation: "elm_kernel".to_string(),
            implementation_version: "1.0".to_string(),
            language: "no-op".to_string(),
            language_version: "0.1".to_string(),
            language_info: LanguageInfo {
                name: "elm".to_string(),
                codemirror_mode: "elm".to_string(),
                mimetype: "text/x-elm".to_string(),
                file_extension: ".elm".to_string(),
            },
            banner: "Display Elm output".to_string(),
        }
    }
}
