use std::path::PathBuf;

use clap::Parser;
use meshvocab::{Config, RecordsIndex};
use serde::Serialize;
use tracing::instrument;

use super::{
    OutputFormat,
    terminal::{Style, fit, indent},
    tree::relative_depth,
};

#[derive(Debug, Parser)]
#[command(about = "List the tree numbers below a prefix with their descriptor headings")]
pub struct Expand {
    /// Descriptor record file (`*NEWRECORD` format)
    #[arg(long, value_name = "FILE")]
    records: PathBuf,

    /// Tree listing file (`label;tree.number` lines)
    #[arg(long, value_name = "FILE")]
    tree: PathBuf,

    /// The tree number to expand, e.g. `C01.100`
    prefix: String,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    output: OutputFormat,
}

/// One line of the expansion.
#[derive(Debug, Serialize, PartialEq, Eq)]
struct Row<'a> {
    tree_number: &'a str,
    id: Option<&'a str>,
    heading: Option<&'a str>,
}

impl Expand {
    #[instrument(level = "debug", skip(self, config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let root = super::load_tree(&self.tree)?;
        let (_records, index) = super::load_records(&self.records, config)?;

        if root.find(&self.prefix).is_none() {
            anyhow::bail!("tree number {} not found", self.prefix);
        }

        let mut paths = vec![self.prefix.clone()];
        paths.extend(root.same_prefix(&self.prefix));
        paths[1..].sort_unstable();

        let rows = expand(&paths, &index);
        let unresolved = rows.iter().filter(|row| row.id.is_none()).count();
        if unresolved > 0 {
            tracing::warn!(unresolved, "some tree numbers have no descriptor record");
        }

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
            OutputFormat::Pretty => {
                for row in &rows {
                    let pad = indent(relative_depth(&self.prefix, row.tree_number));
                    let used = pad.len() + row.tree_number.len() + 2;
                    let heading = row.heading.map_or_else(
                        || "(no record)".missing(),
                        |heading| fit(heading, used).into_owned(),
                    );
                    println!("{pad}{}  {heading}", row.tree_number.tree_number());
                }
            }
        }

        Ok(())
    }
}

fn expand<'a>(paths: &'a [String], index: &'a RecordsIndex) -> Vec<Row<'a>> {
    paths
        .iter()
        .map(|path| {
            let record = index.get(path);
            Row {
                tree_number: path,
                id: record.map(|record| record.id.as_str()),
                heading: record.map(|record| record.heading.as_str()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use meshvocab::RecordParser;

    use super::{
        super::tests::{DESCRIPTORS, TREE, write_temp},
        *,
    };

    #[test]
    fn rows_resolve_headings() {
        let (_records, index) = RecordParser::new(Cursor::new(DESCRIPTORS.as_bytes()))
            .parse_all()
            .unwrap();
        let paths: Vec<String> = ["A01.047", "A01.047.025.600"]
            .into_iter()
            .map(String::from)
            .collect();

        let rows = expand(&paths, &index);

        assert_eq!(
            rows,
            [
                Row {
                    tree_number: "A01.047",
                    id: Some("D000005"),
                    heading: Some("Abdomen"),
                },
                Row {
                    tree_number: "A01.047.025.600",
                    id: None,
                    heading: None,
                },
            ]
        );
    }

    #[test]
    fn expands_prefix() {
        let records = write_temp(DESCRIPTORS);
        let tree = write_temp(TREE);

        for output in [OutputFormat::Pretty, OutputFormat::Json] {
            Expand {
                records: records.path().to_path_buf(),
                tree: tree.path().to_path_buf(),
                prefix: "A01".to_string(),
                output,
            }
            .run(&Config::default())
            .unwrap();
        }
    }

    #[test]
    fn unknown_prefix_fails() {
        let records = write_temp(DESCRIPTORS);
        let tree = write_temp(TREE);

        let result = Expand {
            records: records.path().to_path_buf(),
            tree: tree.path().to_path_buf(),
            prefix: "B01".to_string(),
            output: OutputFormat::Json,
        }
        .run(&Config::default());

        assert!(result.is_err());
    }
}
