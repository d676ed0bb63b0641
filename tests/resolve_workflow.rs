//! End-to-end workflow: issue report -> resolution -> reply -> patch on disk

use issue_patcher::issue::{one_per_file, parse_issues};
use issue_patcher::{
    expander_for, resolve, validate_patch, FilePatch, HeuristicExpander, LineEnding,
    LineSequence, PatchOutcome, ReplyCheck, SourceLanguage, SourceRoot, Strategy,
};
use std::fs;
use tempfile::TempDir;

const INVOICE: &str = "using System.Text;

namespace Billing
{
    public class Invoice
    {
        public string Id { get; set; }

        public string Render(string[] lines)
        {
            string body = \"\";
            for (int i = 0; i < lines.Length; i++)
            {
                body += lines[i];
            }
            return body;
        }
    }
}
";

const REPORT: &str = r#"{
    "total": 1,
    "issues": [{
        "key": "AZ-1",
        "rule": "csharpsquid:S1643",
        "component": "billing:src/Invoice.cs",
        "project": "billing",
        "textRange": {"startLine": 14, "endLine": 14, "startOffset": 16, "endOffset": 33},
        "message": "Use a StringBuilder instead."
    }]
}"#;

const REPLY: &str = "xxxx
        public string Render(string[] lines)
        {
            var body = new StringBuilder();
            foreach (var line in lines)
            {
                body.Append(line);
            }
            return body.ToString();
        }
";

fn checkout(contents: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src/Invoice.cs"), contents).unwrap();
    dir
}

#[test]
fn test_issue_to_patched_file() {
    let dir = checkout(INVOICE);
    let root = SourceRoot::new(dir.path()).unwrap();

    let issues = parse_issues(REPORT).unwrap();
    let selected = one_per_file(&issues);
    assert_eq!(selected.len(), 1);
    let issue = selected[0];

    let file = root.resolve(issue.relative_path()).unwrap();
    let original = fs::read_to_string(&file).unwrap();
    let lines = LineSequence::split(&original);

    let expander = expander_for(Strategy::Auto, &file, HeuristicExpander::default()).unwrap();
    let range = issue.text_range.unwrap();
    let resolution = resolve(&lines, &range, expander.as_ref()).unwrap();

    assert_eq!(resolution.error_spot, "body += lines[i];");
    assert_eq!(
        (resolution.context.start_line, resolution.context.end_line),
        (8, 17)
    );

    let replacement = ReplyCheck::default()
        .accept(REPLY, resolution.context.line_count())
        .unwrap();
    let patch = FilePatch::new(&file, &resolution.context, replacement);

    let patched = patch.preview(&original).unwrap().unwrap();
    validate_patch(SourceLanguage::CSharp, &original, &patched).unwrap();

    assert!(matches!(patch.apply().unwrap(), PatchOutcome::Applied { .. }));
    let on_disk = fs::read_to_string(&file).unwrap();
    assert_eq!(on_disk, patched);
    assert!(on_disk.contains("body.Append(line);"));
    assert!(on_disk.contains("public string Id { get; set; }"));
    assert!(on_disk.ends_with("        }\n    }\n}\n"));
}

#[test]
fn test_crlf_file_stays_crlf() {
    let crlf = LineEnding::CrLf.normalize(INVOICE);
    let dir = checkout(&crlf);
    let root = SourceRoot::new(dir.path()).unwrap();
    let file = root.resolve("src/Invoice.cs").unwrap();

    let original = fs::read_to_string(&file).unwrap();
    let lines = LineSequence::split(&original);
    assert_eq!(lines.ending(), LineEnding::CrLf);

    let issues = parse_issues(REPORT).unwrap();
    let range = issues[0].text_range.unwrap();
    let expander = expander_for(Strategy::Structural, &file, HeuristicExpander::default()).unwrap();
    let resolution = resolve(&lines, &range, expander.as_ref()).unwrap();
    assert_eq!(resolution.error_spot, "body += lines[i];");
    assert!(resolution.context.context.contains("{\r\n"));

    // Generator replies arrive with bare newlines.
    let replacement = ReplyCheck::default()
        .accept(REPLY, resolution.context.line_count())
        .unwrap();
    let replacement = lines.ending().normalize(&replacement);

    let patch = FilePatch::new(&file, &resolution.context, replacement);
    assert!(matches!(patch.apply().unwrap(), PatchOutcome::Applied { .. }));

    let on_disk = fs::read_to_string(&file).unwrap();
    assert!(on_disk.contains("body.Append(line);"));
    assert_eq!(on_disk.matches('\n').count(), on_disk.matches("\r\n").count());
}

#[test]
fn test_stale_issue_is_refused_after_edit() {
    let dir = checkout(INVOICE);
    let root = SourceRoot::new(dir.path()).unwrap();
    let file = root.resolve("src/Invoice.cs").unwrap();

    let original = fs::read_to_string(&file).unwrap();
    let lines = LineSequence::split(&original);
    let issues = parse_issues(REPORT).unwrap();
    let expander = expander_for(Strategy::Auto, &file, HeuristicExpander::default()).unwrap();
    let resolution = resolve(&lines, &issues[0].text_range.unwrap(), expander.as_ref()).unwrap();

    // Someone edits the method between resolution and patching.
    fs::write(&file, INVOICE.replace("body += lines[i];", "body = body + lines[i];")).unwrap();

    let patch = FilePatch::new(&file, &resolution.context, "        public string Render() => \"\";");
    assert!(patch.apply().is_err());
    assert!(fs::read_to_string(&file).unwrap().contains("body = body + lines[i];"));
}
