use crate::ts::errors::TreeSitterError;
use crate::ts::lang::SourceLanguage;
use tree_sitter::{Parser, Tree};

/// Tree-sitter parser bound to one source language.
pub struct SourceParser {
    parser: Parser,
    language: SourceLanguage,
}

impl SourceParser {
    pub fn new(language: SourceLanguage) -> Result<Self, TreeSitterError> {
        let mut parser = Parser::new();
        parser
            .set_language(&language.ts_language())
            .map_err(|_| TreeSitterError::LanguageSet { language })?;

        Ok(Self { parser, language })
    }

    pub fn language(&self) -> SourceLanguage {
        self.language
    }

    /// Parse source code into a tree-sitter Tree.
    pub fn parse(&mut self, source: &str) -> Result<Tree, TreeSitterError> {
        self.parser
            .parse(source, None)
            .ok_or(TreeSitterError::ParseFailed {
                language: self.language,
            })
    }

    /// Parse source code and return the tree along with the source.
    pub fn parse_with_source<'a>(
        &mut self,
        source: &'a str,
    ) -> Result<ParsedSource<'a>, TreeSitterError> {
        let tree = self.parse(source)?;
        Ok(ParsedSource { source, tree })
    }
}

/// A parsed source file with its tree-sitter tree.
pub struct ParsedSource<'a> {
    pub source: &'a str,
    pub tree: Tree,
}

impl<'a> ParsedSource<'a> {
    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    /// Check if the tree contains any ERROR or MISSING nodes.
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// Get all ERROR and MISSING nodes in the tree.
    pub fn error_nodes(&self) -> Vec<ErrorNode> {
        let mut errors = Vec::new();
        collect_error_nodes(self.tree.root_node(), &mut errors);
        errors
    }

    /// Extract text for a node's byte range.
    pub fn node_text(&self, node: tree_sitter::Node<'_>) -> &'a str {
        &self.source[node.byte_range()]
    }
}

/// Information about an ERROR node in the parse tree.
#[derive(Debug, Clone)]
pub struct ErrorNode {
    pub byte_start: usize,
    pub byte_end: usize,
    pub start_point: tree_sitter::Point,
    pub end_point: tree_sitter::Point,
}

fn collect_error_nodes(node: tree_sitter::Node<'_>, errors: &mut Vec<ErrorNode>) {
    if node.is_error() || node.is_missing() {
        errors.push(ErrorNode {
            byte_start: node.start_byte(),
            byte_end: node.end_byte(),
            start_point: node.start_position(),
            end_point: node.end_position(),
        });
    }

    // Subtrees without errors need no descent.
    if !node.has_error() {
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_error_nodes(child, errors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_csharp() {
        let mut parser = SourceParser::new(SourceLanguage::CSharp).unwrap();
        let source = "class A { void M() { var x = 1; } }";
        let parsed = parser.parse_with_source(source).unwrap();

        assert!(!parsed.has_errors());
        assert_eq!(parsed.root_node().kind(), "compilation_unit");
    }

    #[test]
    fn parse_invalid_csharp() {
        let mut parser = SourceParser::new(SourceLanguage::CSharp).unwrap();
        let source = "class A { void M( { }";
        let parsed = parser.parse_with_source(source).unwrap();

        assert!(parsed.has_errors());
        assert!(!parsed.error_nodes().is_empty());
    }

    #[test]
    fn parse_each_language() {
        let samples = [
            (SourceLanguage::Java, "class A { void m() {} }", "program"),
            (SourceLanguage::Rust, "fn main() {}", "source_file"),
        ];
        for (lang, source, root) in samples {
            let mut parser = SourceParser::new(lang).unwrap();
            let parsed = parser.parse_with_source(source).unwrap();
            assert_eq!(parsed.root_node().kind(), root, "{lang}");
            assert_eq!(parser.language(), lang);
        }
    }
}
