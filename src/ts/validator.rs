use crate::pool;
use crate::ts::errors::TreeSitterError;
use crate::ts::lang::SourceLanguage;
use crate::ts::parser::ErrorNode;

/// Validate that source code has no syntax errors.
///
/// Returns Ok(()) if the code parses without ERROR nodes.
pub fn validate_syntax(language: SourceLanguage, source: &str) -> Result<(), TreeSitterError> {
    let errors = pool::with_parser(language, |parser| {
        parser
            .parse_with_source(source)
            .map(|parsed| parsed.error_nodes())
    })??;

    match errors.len() {
        0 => Ok(()),
        1 => Err(TreeSitterError::SyntaxError {
            byte_start: errors[0].byte_start,
            byte_end: errors[0].byte_end,
        }),
        n => Err(TreeSitterError::MultipleSyntaxErrors { count: n }),
    }
}

/// Check that a patched file parses no worse than the original.
///
/// Files that were already broken stay patchable; only errors that the
/// replacement introduced count. Errors are compared by their distance from
/// the end of the file when they sit after the patched region, since the
/// replacement shifts their byte offsets.
pub fn validate_patch(
    language: SourceLanguage,
    original: &str,
    patched: &str,
) -> Result<(), TreeSitterError> {
    let (original_errors, patched_errors) = pool::with_parser(language, |parser| {
        let original_errors = parser.parse_with_source(original)?.error_nodes();
        let patched_errors = parser.parse_with_source(patched)?.error_nodes();
        Ok::<_, TreeSitterError>((original_errors, patched_errors))
    })??;

    let introduced: Vec<&ErrorNode> = patched_errors
        .iter()
        .filter(|e| {
            !original_errors.iter().any(|o| {
                let same_head = o.byte_start == e.byte_start && o.byte_end == e.byte_end;
                let same_tail = original.len().checked_sub(o.byte_start)
                    == patched.len().checked_sub(e.byte_start)
                    && original.len().checked_sub(o.byte_end)
                        == patched.len().checked_sub(e.byte_end);
                same_head || same_tail
            })
        })
        .collect();

    match introduced.len() {
        0 => Ok(()),
        1 => Err(TreeSitterError::SyntaxError {
            byte_start: introduced[0].byte_start,
            byte_end: introduced[0].byte_end,
        }),
        n => Err(TreeSitterError::MultipleSyntaxErrors { count: n }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_valid_syntax() {
        let source = "class A {\n    void M() { }\n}\n";
        assert!(validate_syntax(SourceLanguage::CSharp, source).is_ok());
    }

    #[test]
    fn validate_invalid_syntax() {
        let result = validate_syntax(SourceLanguage::CSharp, "class A { void M( { }");
        assert!(result.is_err());
    }

    #[test]
    fn patch_introducing_error_is_rejected() {
        let original = "class A {\n    void M() { var x = 1; }\n}\n";
        let patched = "class A {\n    void M() { var x = ; }\n}\n";
        assert!(validate_patch(SourceLanguage::CSharp, original, patched).is_err());
    }

    #[test]
    fn clean_patch_is_accepted() {
        let original = "class A {\n    void M() { var x = 1; }\n}\n";
        let patched = "class A {\n    void M()\n    {\n        var y = 2;\n    }\n}\n";
        assert!(validate_patch(SourceLanguage::CSharp, original, patched).is_ok());
    }

    #[test]
    fn rust_patch_on_already_broken_file() {
        let original = "fn foo( { let x = 1; }";
        let patched = "fn foo( { let y = 2; }";
        assert!(validate_patch(SourceLanguage::Rust, original, patched).is_ok());
    }
}
