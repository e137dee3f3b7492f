//! Rendering of generated batches.

use std::{fmt, io, str::FromStr};

use crate::synthesizer::Program;

/// How a batch is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// One hex literal per line.
    #[default]
    Lines,
    /// CSV with a header: `program_id,bytecode` and, when requested, `dominant`.
    Csv,
}

impl fmt::Display for OutputMode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Lines => "lines",
            Self::Csv => "csv",
        })
    }
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        match mode {
            "lines" => Ok(Self::Lines),
            "csv" => Ok(Self::Csv),
            _ => Err(format!("unknown output mode `{mode}`")),
        }
    }
}

/// Failure to write a batch.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// Writing lines failed.
    #[error("failed to write programs: {0}")]
    Io(#[from] io::Error),
    /// Writing CSV rows failed.
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Writes `programs` to `writer`. The dominant column is only written if `with_dominant` is set.
///
/// # Errors
///
/// Propagates I/O errors of `writer`.
pub fn write_programs<W: io::Write>(
    mut writer: W,
    programs: &[Program],
    mode: OutputMode,
    with_dominant: bool,
) -> Result<(), OutputError> {
    match mode {
        OutputMode::Lines => {
            for program in programs {
                writeln!(writer, "{}", program.to_hex())?;
            }
            writer.flush()?;
        }
        OutputMode::Csv => {
            let mut csv = csv::Writer::from_writer(writer);
            if with_dominant {
                csv.write_record(["program_id", "bytecode", "dominant"])?;
            } else {
                csv.write_record(["program_id", "bytecode"])?;
            }
            for (index, program) in programs.iter().enumerate() {
                let index = index.to_string();
                let bytecode = program.to_hex();
                if with_dominant {
                    let dominant = program.dominant.as_deref().unwrap_or_default();
                    csv.write_record([index.as_str(), bytecode.as_str(), dominant])?;
                } else {
                    csv.write_record([index.as_str(), bytecode.as_str()])?;
                }
            }
            csv.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::synthesizer::ResourceUsage;

    fn programs() -> Vec<Program> {
        vec![
            Program {
                bytecode: vec![0x60, 0x01, 0x50],
                dominant: Some("ADD".to_owned()),
                usage: ResourceUsage::default(),
            },
            Program {
                bytecode: vec![0x5b],
                dominant: None,
                usage: ResourceUsage::default(),
            },
        ]
    }

    #[test]
    fn lines() {
        let mut out = Vec::new();
        write_programs(&mut out, &programs(), OutputMode::Lines, true).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "600150\n5b\n");
    }

    #[test]
    fn csv_with_and_without_dominant() {
        let mut out = Vec::new();
        write_programs(&mut out, &programs(), OutputMode::Csv, true).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "program_id,bytecode,dominant\n0,600150,ADD\n1,5b,\n"
        );

        let mut out = Vec::new();
        write_programs(&mut out, &programs(), OutputMode::Csv, false).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "program_id,bytecode\n0,600150\n1,5b\n"
        );
    }

    #[test]
    fn mode_names() {
        assert_eq!("csv".parse::<OutputMode>(), Ok(OutputMode::Csv));
        assert_eq!(OutputMode::Lines.to_string(), "lines");
        assert!("tsv".parse::<OutputMode>().is_err());
    }
}
