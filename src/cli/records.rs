use std::path::PathBuf;

use clap::Parser;
use meshvocab::{Config, Record};
use tracing::instrument;

use super::{
    OutputFormat,
    terminal::{Style, fit},
};

#[derive(Debug, Parser)]
#[command(about = "Parse a descriptor file and look up records by tree number")]
pub struct Records {
    /// Descriptor record file (`*NEWRECORD` format)
    file: PathBuf,

    /// Tree numbers to look up (repeatable)
    #[arg(short, long = "lookup", value_name = "TREE_NUMBER")]
    lookup: Vec<String>,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    output: OutputFormat,
}

impl Records {
    #[instrument(level = "debug", skip(self, config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let (records, index) = super::load_records(&self.file, config)?;

        if self.lookup.is_empty() {
            match self.output {
                OutputFormat::Json => {
                    let output = serde_json::json!({
                        "records": records.len(),
                        "tree_numbers": index.len(),
                    });
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                OutputFormat::Pretty => {
                    println!(
                        "{} records, {} tree numbers",
                        records.len().to_string().figure(),
                        index.len().to_string().figure()
                    );
                }
            }
            return Ok(());
        }

        let mut missing = Vec::new();
        let mut found = Vec::new();
        for tree_number in &self.lookup {
            match index.get(tree_number) {
                Some(record) => found.push((tree_number.as_str(), record)),
                None => missing.push(tree_number.as_str()),
            }
        }

        match self.output {
            OutputFormat::Json => {
                let output: serde_json::Map<_, _> = found
                    .iter()
                    .map(|(tree_number, record)| {
                        serde_json::to_value(&***record)
                            .map(|value| ((*tree_number).to_string(), value))
                    })
                    .collect::<Result<_, _>>()?;
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Pretty => {
                for (i, (tree_number, record)) in found.iter().enumerate() {
                    if i > 0 {
                        println!();
                    }
                    print_record(tree_number, record);
                }
            }
        }

        if !missing.is_empty() {
            anyhow::bail!("tree number(s) not found: {}", missing.join(", "));
        }

        Ok(())
    }
}

fn print_record(tree_number: &str, record: &Record) {
    println!("{} {}", tree_number.tree_number(), record.heading);
    println!("  {}  {}", "UI".label(), record.id);

    if !record.tree_numbers.is_empty() {
        println!("  {}", "Tree numbers".label());
        for other in &record.tree_numbers {
            println!("    • {}", other.tree_number());
        }
    }

    if !record.entries.is_empty() {
        println!("  {}", "Entries".label());
        for entry in &record.entries {
            println!("    • {entry}");
        }
    }

    if !record.scope_note.is_empty() {
        println!("  {}", "Scope note".label());
        println!("    {}", fit(&record.scope_note, 4));
    }
}

#[cfg(test)]
mod tests {
    use super::{
        super::tests::{DESCRIPTORS, write_temp},
        *,
    };

    fn records(file: PathBuf, lookup: &[&str]) -> Records {
        Records {
            file,
            lookup: lookup.iter().map(ToString::to_string).collect(),
            output: OutputFormat::Pretty,
        }
    }

    #[test]
    fn summary_without_lookup() {
        let file = write_temp(DESCRIPTORS);

        records(file.path().to_path_buf(), &[])
            .run(&Config::default())
            .unwrap();
    }

    #[test]
    fn lookup_known_tree_numbers() {
        let file = write_temp(DESCRIPTORS);

        records(file.path().to_path_buf(), &["A01", "A01.047"])
            .run(&Config::default())
            .unwrap();
    }

    #[test]
    fn lookup_json() {
        let file = write_temp(DESCRIPTORS);
        let mut command = records(file.path().to_path_buf(), &["A01.047.025"]);
        command.output = OutputFormat::Json;

        command.run(&Config::default()).unwrap();
    }

    #[test]
    fn lookup_unknown_tree_number_fails() {
        let file = write_temp(DESCRIPTORS);

        let error = records(file.path().to_path_buf(), &["A01", "Z99"])
            .run(&Config::default())
            .unwrap_err();

        assert_eq!(error.to_string(), "tree number(s) not found: Z99");
    }
}
