//! Languages with a structural parser.
//!
//! Grammars come from `ast-grep-language`'s bundled tree-sitter parsers, so the
//! tree-sitter version stays pinned to the one ast-grep was built against.

use ast_grep_language::{LanguageExt, SupportLang};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceLanguage {
    CSharp,
    Java,
    Rust,
}

/// Declaration node kinds, searched in order: callables, then member
/// declarations, then types.
#[derive(Debug, Clone, Copy)]
pub struct DeclarationTiers {
    pub function: &'static [&'static str],
    pub property: &'static [&'static str],
    pub type_decl: &'static [&'static str],
}

impl DeclarationTiers {
    pub fn in_order(&self) -> [&'static [&'static str]; 3] {
        [self.function, self.property, self.type_decl]
    }
}

const CSHARP_TIERS: DeclarationTiers = DeclarationTiers {
    function: &[
        "method_declaration",
        "constructor_declaration",
        "destructor_declaration",
        "operator_declaration",
        "conversion_operator_declaration",
    ],
    property: &[
        "property_declaration",
        "indexer_declaration",
        "event_declaration",
    ],
    type_decl: &[
        "class_declaration",
        "struct_declaration",
        "record_declaration",
        "interface_declaration",
    ],
};

const JAVA_TIERS: DeclarationTiers = DeclarationTiers {
    function: &["method_declaration", "constructor_declaration"],
    property: &["field_declaration"],
    type_decl: &[
        "class_declaration",
        "interface_declaration",
        "enum_declaration",
        "record_declaration",
    ],
};

const RUST_TIERS: DeclarationTiers = DeclarationTiers {
    function: &["function_item"],
    property: &["const_item", "static_item"],
    type_decl: &["impl_item", "struct_item", "enum_item", "trait_item"],
};

impl SourceLanguage {
    pub const ALL: [SourceLanguage; 3] = [
        SourceLanguage::CSharp,
        SourceLanguage::Java,
        SourceLanguage::Rust,
    ];

    /// Detect the language from a file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?;
        match ext.to_ascii_lowercase().as_str() {
            "cs" => Some(SourceLanguage::CSharp),
            "java" => Some(SourceLanguage::Java),
            "rs" => Some(SourceLanguage::Rust),
            _ => None,
        }
    }

    pub fn support_lang(self) -> SupportLang {
        match self {
            SourceLanguage::CSharp => SupportLang::CSharp,
            SourceLanguage::Java => SupportLang::Java,
            SourceLanguage::Rust => SupportLang::Rust,
        }
    }

    pub fn ts_language(self) -> tree_sitter::Language {
        self.support_lang().get_ts_language()
    }

    pub fn declaration_tiers(self) -> &'static DeclarationTiers {
        match self {
            SourceLanguage::CSharp => &CSHARP_TIERS,
            SourceLanguage::Java => &JAVA_TIERS,
            SourceLanguage::Rust => &RUST_TIERS,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SourceLanguage::CSharp => "csharp",
            SourceLanguage::Java => "java",
            SourceLanguage::Rust => "rust",
        }
    }
}

impl fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SourceLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csharp" | "cs" | "c#" => Ok(SourceLanguage::CSharp),
            "java" => Ok(SourceLanguage::Java),
            "rust" | "rs" => Ok(SourceLanguage::Rust),
            other => Err(format!("unsupported language: {other}")),
        }
    }
}
