//! The `mcqeval init` command.

use std::path::Path;

use anyhow::{Context, Result};

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("mcqeval.toml"), SAMPLE_CONFIG)?;
    write_if_missing(Path::new("sample-responses.csv"), SAMPLE_RESPONSES)?;

    println!("\nNext steps:");
    println!("  1. Adjust the thresholds in mcqeval.toml if needed");
    println!("  2. Run: mcqeval validate --input sample-responses.csv --header --index-col");
    println!("  3. Run: mcqeval analyze --input sample-responses.csv --header --index-col");

    Ok(())
}

fn write_if_missing(path: &Path, contents: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# mcqeval configuration

# Percent correct: (0, low] is hard, (low, high] is medium, (high, 100] is easy.
# Both must lie in 5..=95 with low < high.
[difficulty]
low = 20
high = 70

# Discrimination index: (-1, fair] is poor, (fair, good] is fair, (good, 1] is good.
# Both must lie in 0.1..=0.9 with fair < good.
[discrimination]
fair = 0.2
good = 0.4
"#;

const SAMPLE_RESPONSES: &str = "\
student,Q1,Q2,Q3,Q4,Q5
KEY,A,C,B,D,A
ana,A,C,B,D,A
ben,A,C,B,A,A
cho,A,C,D,D,B
dev,A,B,B,D,
eli,B,C,B,C,A
fay,A,A,C,D,C
gus,C,C,D,B,A
hal,D,B,,A,C
";
