use std::path::PathBuf;

use clap::Parser;
use meshvocab::domain::PATH_SEPARATOR;
use tracing::instrument;

use super::{
    OutputFormat,
    terminal::{Style, indent},
};

#[derive(Debug, Parser)]
#[command(about = "List every tree number below a prefix")]
pub struct Tree {
    /// Tree listing file (`label;tree.number` lines)
    file: PathBuf,

    /// The tree number to expand, e.g. `C01.100`
    prefix: String,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    output: OutputFormat,
}

impl Tree {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self) -> anyhow::Result<()> {
        let root = super::load_tree(&self.file)?;

        if root.find(&self.prefix).is_none() {
            anyhow::bail!("tree number {} not found", self.prefix);
        }

        let mut descendants = root.same_prefix(&self.prefix);
        descendants.sort_unstable();

        match self.output {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&descendants)?);
            }
            OutputFormat::Pretty => {
                println!("{}", self.prefix.tree_number());
                for path in &descendants {
                    let depth = relative_depth(&self.prefix, path);
                    println!("{}{}", indent(depth), path.tree_number());
                }
            }
        }

        Ok(())
    }
}

/// How many levels `path` sits below `prefix`.
pub(super) fn relative_depth(prefix: &str, path: &str) -> usize {
    path.matches(PATH_SEPARATOR)
        .count()
        .saturating_sub(prefix.matches(PATH_SEPARATOR).count())
}

#[cfg(test)]
mod tests {
    use super::{
        super::tests::{TREE, write_temp},
        *,
    };

    #[test]
    fn depth_is_relative_to_prefix() {
        assert_eq!(relative_depth("A01", "A01.047"), 1);
        assert_eq!(relative_depth("A01", "A01.047.025.600"), 3);
        assert_eq!(relative_depth("A01.047", "A01.047.025"), 1);
    }

    #[test]
    fn lists_known_prefix() {
        let file = write_temp(TREE);

        for output in [OutputFormat::Pretty, OutputFormat::Json] {
            Tree {
                file: file.path().to_path_buf(),
                prefix: "A01".to_string(),
                output,
            }
            .run()
            .unwrap();
        }
    }

    #[test]
    fn unknown_prefix_fails() {
        let file = write_temp(TREE);

        let error = Tree {
            file: file.path().to_path_buf(),
            prefix: "C01".to_string(),
            output: OutputFormat::Pretty,
        }
        .run()
        .unwrap_err();

        assert_eq!(error.to_string(), "tree number C01 not found");
    }
}
