// YAML emitter
// Renders projected nodes as Azure DevOps style block YAML

use crate::config::SerializerConfig;
use crate::serializer::project::Node;
use crate::serializer::scalar::{self, Style};
use crate::value::Scalar;

use tracing::trace;

const INDENT: usize = 2;

/// Renders top-level sections separated by one blank line
pub(crate) fn render(sections: &[(String, Node)], config: &SerializerConfig) -> String {
    let mut emitter = Emitter {
        out: String::new(),
        config,
        after_keep: false,
    };

    if !config.header.is_empty() {
        for line in config.header.iter().flat_map(|line| line.split('\n')) {
            emitter.out.push_str(format!("### {}", line).trim_end());
            emitter.out.push('\n');
        }
        emitter.out.push('\n');
    }

    for (i, (key, node)) in sections.iter().enumerate() {
        if i > 0 {
            emitter.separator();
        }
        let start = emitter.out.len();
        emitter.entry(key, node, 0, false);
        trace!(section = %key, bytes = emitter.out.len() - start, "emitted section");
    }

    emitter.out
}

struct Emitter<'a> {
    out: String,
    config: &'a SerializerConfig,
    /// Last output was a keep-chomped block; a blank line now would join its value
    after_keep: bool,
}

impl Emitter<'_> {
    fn separator(&mut self) {
        if !self.after_keep {
            self.out.push('\n');
        }
    }

    fn pad(&mut self, indent: usize) {
        self.out.extend(std::iter::repeat(' ').take(indent));
    }

    /// Writes `key: value`; `inline` means the cursor already sits after `- `
    fn entry(&mut self, key: &str, node: &Node, indent: usize, inline: bool) {
        if !inline {
            self.pad(indent);
        }
        self.after_keep = false;
        self.out.push_str(&scalar::inline(key));
        self.out.push(':');

        match node {
            Node::Scalar(value) => self.scalar_value(value, indent + INDENT, true),
            Node::Seq(items) if items.is_empty() => self.out.push_str(" []\n"),
            Node::Map(entries) if entries.is_empty() => self.out.push_str(" {}\n"),
            Node::Seq(items) => {
                self.out.push('\n');
                // Sequences sit at their key's column
                self.sequence(items, indent);
            }
            Node::Map(entries) => {
                self.out.push('\n');
                self.mapping(entries, indent + INDENT, false);
            }
        }
    }

    fn mapping(&mut self, entries: &[(String, Node)], indent: usize, inline: bool) {
        for (i, (key, node)) in entries.iter().enumerate() {
            self.entry(key, node, indent, inline && i == 0);
        }
    }

    fn sequence(&mut self, items: &[Node], indent: usize) {
        for (i, item) in items.iter().enumerate() {
            let is_mapping = matches!(item, Node::Map(entries) if !entries.is_empty());
            if i > 0 && is_mapping && self.config.blank_lines_between_items {
                self.separator();
            }

            self.pad(indent);
            self.after_keep = false;
            self.out.push('-');

            match item {
                Node::Scalar(value) => self.scalar_value(value, indent + INDENT, false),
                Node::Seq(nested) if nested.is_empty() => self.out.push_str(" []\n"),
                Node::Map(entries) if entries.is_empty() => self.out.push_str(" {}\n"),
                Node::Seq(nested) => {
                    self.out.push('\n');
                    self.sequence(nested, indent + INDENT);
                }
                Node::Map(entries) => {
                    self.out.push(' ');
                    self.mapping(entries, indent + INDENT, true);
                }
            }
        }
    }

    /// Writes ` value` after a key or dash, ending the line. Block content goes at `content_indent`.
    fn scalar_value(&mut self, value: &Scalar, content_indent: usize, in_mapping: bool) {
        let text = match value {
            Scalar::String(_) | Scalar::Variable(_) | Scalar::Parameter(_) => value.as_string(),
            typed => {
                self.out.push(' ');
                self.out.push_str(&typed_scalar(typed));
                self.out.push('\n');
                return;
            }
        };

        if scalar::style_of(&text) != Style::Literal {
            self.out.push(' ');
            self.out.push_str(&scalar::inline(&text));
            self.out.push('\n');
            return;
        }

        let block = scalar::literal(&text);
        // An indentation indicator on a sequence entry is relative to the dash; avoid it
        if block.explicit_indent && !in_mapping {
            self.out.push(' ');
            self.out.push_str(&scalar::double_quoted(&text));
            self.out.push('\n');
            return;
        }

        self.out.push(' ');
        self.out.push_str(&block.header);
        self.out.push('\n');
        for line in &block.lines {
            if !line.is_empty() {
                self.pad(content_indent);
                self.out.push_str(line);
            }
            self.out.push('\n');
        }
        self.after_keep = block.keep;
    }
}

fn typed_scalar(value: &Scalar) -> String {
    match value {
        Scalar::Float(f) if f.is_nan() => ".nan".to_string(),
        Scalar::Float(f) if f.is_infinite() => {
            if *f > 0.0 {
                ".inf".to_string()
            } else {
                "-.inf".to_string()
            }
        }
        other => other.as_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> Node {
        Node::Scalar(Scalar::from(s))
    }

    fn map(entries: Vec<(&str, Node)>) -> Node {
        Node::Map(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    fn render_default(sections: Vec<(&str, Node)>) -> String {
        let sections: Vec<(String, Node)> =
            sections.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        render(&sections, &SerializerConfig::default())
    }

    #[test]
    fn test_indentless_sequences_and_blank_separators() {
        let yaml = render_default(vec![(
            "steps",
            Node::Seq(vec![
                map(vec![("script", text("make")), ("displayName", text("Build"))]),
                map(vec![("script", text("make test"))]),
            ]),
        )]);
        assert_eq!(
            yaml,
            "steps:\n- script: make\n  displayName: Build\n\n- script: make test\n"
        );
    }

    #[test]
    fn test_scalar_sequences_are_tight() {
        let yaml = render_default(vec![(
            "pool",
            map(vec![(
                "demands",
                Node::Seq(vec![text("msbuild"), text("visualstudio")]),
            )]),
        )]);
        assert_eq!(yaml, "pool:\n  demands:\n  - msbuild\n  - visualstudio\n");
    }

    #[test]
    fn test_sections_are_separated_by_one_blank_line() {
        let yaml = render_default(vec![("trigger", text("none")), ("pr", text("none"))]);
        assert_eq!(yaml, "trigger: none\n\npr: none\n");
    }

    #[test]
    fn test_empty_collections() {
        let yaml = render_default(vec![(
            "jobs",
            Node::Seq(vec![map(vec![
                ("job", text("A")),
                ("dependsOn", Node::Seq(Vec::new())),
                ("variables", Node::Map(Vec::new())),
            ])]),
        )]);
        assert_eq!(yaml, "jobs:\n- job: A\n  dependsOn: []\n  variables: {}\n");
    }

    #[test]
    fn test_no_blank_line_after_keep_block() {
        let yaml = render_default(vec![(
            "steps",
            Node::Seq(vec![
                map(vec![("bash", text("echo one\n"))]),
                map(vec![("bash", text("echo two"))]),
            ]),
        )]);
        assert_eq!(yaml, "steps:\n- bash: |+\n    echo one\n- bash: echo two\n");

        let parsed: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed["steps"][0]["bash"].as_str(), Some("echo one\n"));
    }

    #[test]
    fn test_compact_config_drops_item_separators() {
        let sections = vec![(
            "steps".to_string(),
            Node::Seq(vec![
                map(vec![("script", text("a"))]),
                map(vec![("script", text("b"))]),
            ]),
        )];
        let yaml = render(&sections, &SerializerConfig::default().compact());
        assert_eq!(yaml, "steps:\n- script: a\n- script: b\n");
    }

    #[test]
    fn test_header_lines() {
        let sections = vec![("trigger".to_string(), text("none"))];
        let config = SerializerConfig::default().with_header_line("Generated file, do not edit");
        assert_eq!(
            render(&sections, &config),
            "### Generated file, do not edit\n\ntrigger: none\n"
        );
    }

    #[test]
    fn test_typed_scalars_are_bare() {
        let yaml = render_default(vec![(
            "values",
            map(vec![
                ("flag", Node::Scalar(Scalar::Bool(true))),
                ("count", Node::Scalar(Scalar::Integer(3))),
                ("ratio", Node::Scalar(Scalar::Float(0.5))),
                ("text", text("true")),
            ]),
        )]);
        assert_eq!(
            yaml,
            "values:\n  flag: true\n  count: 3\n  ratio: 0.5\n  text: 'true'\n"
        );
    }

    #[test]
    fn test_indented_literal_in_sequence_falls_back_to_quotes() {
        let yaml = render_default(vec![("lines", Node::Seq(vec![text("  a\nb")]))]);
        assert_eq!(yaml, "lines:\n- \"  a\\nb\"\n");
    }
}
