use crate::ts::lang::SourceLanguage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeSitterError {
    #[error("failed to set {language} language for parser")]
    LanguageSet { language: SourceLanguage },

    #[error("failed to parse {language} source code")]
    ParseFailed { language: SourceLanguage },

    #[error("syntax error introduced at byte {byte_start}..{byte_end}")]
    SyntaxError { byte_start: usize, byte_end: usize },

    #[error("multiple syntax errors introduced: {count} ERROR nodes")]
    MultipleSyntaxErrors { count: usize },
}
