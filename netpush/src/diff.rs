//! Unified diffs between two configuration snapshots.
//!
//! Output follows the classic unified format: `--- old config` and
//! `+++ new config` headers, `@@ -a,b +c,d @@` hunk headers and three lines
//! of context. Lines carry no terminators.

use std::collections::VecDeque;
use std::path::Path;

use similar::algorithms::{Capture, myers};
use similar::{DiffOp, DiffTag, group_diff_ops};

use crate::error::{Error, Result};

const CONTEXT_LINES: usize = 3;

/// Lazily rendered diff lines. Consumed once.
pub struct DiffReport<'a> {
    old: Vec<&'a str>,
    new: Vec<&'a str>,
    hunks: std::vec::IntoIter<Vec<DiffOp>>,
    pending: VecDeque<String>,
    started: bool,
}

/// Diff two config texts; surrounding whitespace of each text is ignored.
pub fn diff<'a>(old: &'a str, new: &'a str) -> DiffReport<'a> {
    let old: Vec<&str> = old.trim().lines().collect();
    let new: Vec<&str> = new.trim().lines().collect();
    let mut capture = Capture::new();
    let Ok(()) = myers::diff(&mut capture, &old, 0..old.len(), &new, 0..new.len());
    let hunks = group_diff_ops(capture.into_ops(), CONTEXT_LINES);

    DiffReport {
        old,
        new,
        hunks: hunks.into_iter(),
        pending: VecDeque::new(),
        started: false,
    }
}

impl DiffReport<'_> {
    fn render_hunk(&mut self, hunk: &[DiffOp]) {
        let (Some(first), Some(last)) = (hunk.first(), hunk.last()) else {
            return;
        };
        self.pending.push_back(format!(
            "@@ -{} +{} @@",
            format_range(first.old_range().start, last.old_range().end),
            format_range(first.new_range().start, last.new_range().end),
        ));

        // Adjacent deletes and inserts print as one change block, removals first.
        let mut added = vec![];
        for op in hunk {
            let (tag, old, new) = op.as_tag_tuple();
            let pending = &mut self.pending;
            match tag {
                DiffTag::Equal => {
                    push_lines(pending, '+', &added);
                    added.clear();
                    push_lines(pending, ' ', &self.old[old]);
                }
                DiffTag::Delete => push_lines(pending, '-', &self.old[old]),
                DiffTag::Insert => added.extend_from_slice(&self.new[new]),
                DiffTag::Replace => {
                    push_lines(pending, '-', &self.old[old]);
                    added.extend_from_slice(&self.new[new]);
                }
            }
        }
        push_lines(&mut self.pending, '+', &added);
    }
}

fn push_lines(pending: &mut VecDeque<String>, marker: char, lines: &[&str]) {
    pending.extend(lines.iter().map(|line| format!("{marker}{line}")));
}

impl Iterator for DiffReport<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if let Some(line) = self.pending.pop_front() {
            return Some(line);
        }

        let hunk = self.hunks.next()?;
        if !self.started {
            self.started = true;
            self.pending.push_back("--- old config".to_string());
            self.pending.push_back("+++ new config".to_string());
        }
        self.render_hunk(&hunk);
        self.pending.pop_front()
    }
}

/// `start,length` with 1-based start; a single line is just `start` and an
/// empty range points at the line before it.
fn format_range(start: usize, end: usize) -> String {
    let length = end - start;
    match length {
        1 => format!("{}", start + 1),
        0 => format!("{start},0"),
        _ => format!("{},{length}", start + 1),
    }
}

/// Write diff lines joined by `\n` to `path`.
pub async fn write_diff(report: impl IntoIterator<Item = String>, path: &Path) -> Result<()> {
    let content = report.into_iter().collect::<Vec<_>>().join("\n");
    tokio::fs::write(path, content)
        .await
        .map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Rebuild the new text from the old one and a diff.
    fn patch(old: &str, diff_lines: &[String]) -> String {
        let old: Vec<&str> = old.trim().lines().collect();
        let mut out = vec![];
        let mut cursor = 0;

        for line in diff_lines.iter().skip(2) {
            if let Some(header) = line.strip_prefix("@@ -") {
                let range = header.split(' ').next().unwrap();
                let mut parts = range.split(',');
                let start: usize = parts.next().unwrap().parse().unwrap();
                let length: usize = parts.next().map_or(1, |l| l.parse().unwrap());
                let begin = if length == 0 { start } else { start - 1 };
                out.extend(old[cursor..begin].iter().map(|s| s.to_string()));
                cursor = begin;
            } else if let Some(kept) = line.strip_prefix(' ') {
                out.push(kept.to_string());
                cursor += 1;
            } else if line.starts_with('-') {
                cursor += 1;
            } else if let Some(added) = line.strip_prefix('+') {
                out.push(added.to_string());
            }
        }
        out.extend(old[cursor..].iter().map(|s| s.to_string()));
        out.join("\n")
    }

    /// Parse a `start[,length]` hunk range.
    fn range_length(range: &str) -> usize {
        range.split(',').nth(1).map_or(1, |l| l.parse().unwrap())
    }

    /// Hunk headers must count exactly the lines in each hunk body.
    fn assert_headers_match_bodies(diff_lines: &[String]) {
        let mut hunks = diff_lines.iter().skip(2).peekable();
        while let Some(header) = hunks.next() {
            let mut fields = header.split(' ');
            assert_eq!(fields.next(), Some("@@"), "{diff_lines:?}");
            let old_len = range_length(&fields.next().unwrap()[1..]);
            let new_len = range_length(&fields.next().unwrap()[1..]);

            let (mut old_seen, mut new_seen) = (0, 0);
            while let Some(line) = hunks.next_if(|l| !l.starts_with("@@")) {
                match line.chars().next() {
                    Some(' ') => (old_seen, new_seen) = (old_seen + 1, new_seen + 1),
                    Some('-') => old_seen += 1,
                    Some('+') => new_seen += 1,
                    _ => panic!("unexpected diff line {line:?}"),
                }
            }
            assert_eq!((old_seen, new_seen), (old_len, new_len), "{header} in {diff_lines:?}");
        }
    }

    /// Every sequence of up to `max_len` lines drawn from `alphabet`.
    fn sequences(alphabet: &[&str], max_len: usize) -> Vec<String> {
        let mut all = vec![vec![]];
        let mut frontier: Vec<Vec<&str>> = vec![vec![]];
        for _ in 0..max_len {
            frontier = frontier
                .iter()
                .flat_map(|seq| {
                    alphabet.iter().map(move |line| {
                        let mut next = seq.clone();
                        next.push(*line);
                        next
                    })
                })
                .collect();
            all.extend(frontier.iter().cloned());
        }
        all.into_iter().map(|seq| seq.join("\n")).collect()
    }

    #[test]
    fn test_identical_is_empty() {
        let text = "hostname r1\ninterface Gi0/1\n description uplink";
        assert_eq!(diff(text, text).count(), 0);
        assert_eq!(diff("  \nhostname r1\n\n", "hostname r1").count(), 0);
        assert_eq!(diff("", "").count(), 0);
    }

    #[test]
    fn test_single_change() {
        let old = "a\nb\nc\nd\ne";
        let new = "a\nb\nC\nd\ne";
        let lines: Vec<String> = diff(old, new).collect();
        assert_eq!(
            lines,
            vec![
                "--- old config",
                "+++ new config",
                "@@ -1,5 +1,5 @@",
                " a",
                " b",
                "-c",
                "+C",
                " d",
                " e",
            ]
        );
    }

    #[test]
    fn test_range_formats() {
        let lines: Vec<String> = diff("only", "").collect();
        assert_eq!(lines, vec!["--- old config", "+++ new config", "@@ -1 +0,0 @@", "-only"]);

        let lines: Vec<String> = diff("", "added").collect();
        assert_eq!(lines[2], "@@ -0,0 +1 @@");
    }

    #[test]
    fn test_distant_changes_make_two_hunks() {
        let old: Vec<String> = (1..=20).map(|i| format!("line {i}")).collect();
        let mut new = old.clone();
        new[1] = "changed 2".to_string();
        new[17] = "changed 18".to_string();
        let (old, new) = (old.join("\n"), new.join("\n"));

        let lines: Vec<String> = diff(&old, &new).collect();
        let hunks: Vec<&String> = lines.iter().filter(|l| l.starts_with("@@")).collect();
        assert_eq!(hunks, vec!["@@ -1,5 +1,5 @@", "@@ -15,6 +15,6 @@"]);
        assert!(lines.iter().all(|l| !l.contains('\n')));
    }

    #[test]
    fn test_patch_reproduces_new_text() {
        let old = "hostname r1\nntp server 10.0.0.1\ninterface Gi0/1\n shutdown\n!\nend";
        let new = concat!(
            "hostname r2\ninterface Gi0/1\n no shutdown\n",
            " description uplink\n!\nrouter ospf 1\nend",
        );
        let lines: Vec<String> = diff(old, new).collect();
        assert_headers_match_bodies(&lines);
        assert_eq!(patch(old, &lines), new);
    }

    #[test]
    fn test_repeated_lines_keep_hunks_consistent() {
        let old = "l2\nl0\nl0\nl5\nl1";
        let new = "l0\nl2\nl0\nl1\nl5\nl0";
        let lines: Vec<String> = diff(old, new).collect();
        assert_headers_match_bodies(&lines);
        assert_eq!(patch(old, &lines), new);
    }

    #[test]
    fn test_patch_round_trips_every_small_pair() {
        let inputs = sequences(&["a", "b", "c"], 4);
        for old in &inputs {
            for new in &inputs {
                let lines: Vec<String> = diff(old, new).collect();
                assert_eq!(lines.is_empty(), old == new, "{old:?} -> {new:?}");
                assert_headers_match_bodies(&lines);
                assert_eq!(&patch(old, &lines), new, "{old:?} -> {new:?}: {lines:?}");
            }
        }
    }

    #[tokio::test]
    async fn test_write_diff() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.diff");
        write_diff(diff("a", "b"), &path).await.unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "--- old config\n+++ new config\n@@ -1 +1 @@\n-a\n+b"
        );

        let err = write_diff(diff("a", "b"), &dir.path().join("missing/config.diff"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
