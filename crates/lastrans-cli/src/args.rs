use std::path::PathBuf;

use argh::FromArgs;
use lastrans::io::las::StreamTarget;
use lastrans::pipeline::TransformJob;

#[derive(FromArgs, Debug)]
/// Apply a 4x4 affine transform to every point of a LAS/LAZ stream.
#[argh(
    example = "{command_name} -t trans.txt in.las out.las",
    example = "{command_name} -t trans.txt -i in.las -o out.laz -v",
    example = "{command_name} -t trans.txt -i - -o - < in.las > out.las",
    note = "The transform file holds 4 rows of 4 numbers, the last row 0 0 0 1. Lines starting with V or M are skipped."
)]
pub struct Args {
    /// path to the transform file
    #[argh(option, short = 't')]
    pub transform: Option<PathBuf>,

    /// input LAS/LAZ file, '-' for standard input
    #[argh(option, short = 'i')]
    pub input: Option<StreamTarget>,

    /// output LAS/LAZ file, '-' for standard output
    #[argh(option, short = 'o')]
    pub output: Option<StreamTarget>,

    /// print timing and progress
    #[argh(switch, short = 'v')]
    pub verbose: bool,

    /// input and output files, when not given with -i and -o
    #[argh(positional)]
    pub files: Vec<StreamTarget>,
}

/// Error types for the command line.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    /// No transform file was given
    #[error("you should provide the transform like '-t trans.txt'")]
    MissingTransform,

    /// No input was given
    #[error("no input specified")]
    MissingInput,

    /// No output was given
    #[error("no output specified")]
    MissingOutput,

    /// A positional argument has no slot left
    #[error("cannot understand argument '{0}'")]
    UnexpectedArgument(String),
}

impl Args {
    /// Turn the parsed arguments into a transform job.
    pub fn into_job(self) -> Result<TransformJob, ConfigError> {
        let transform = self.transform.ok_or(ConfigError::MissingTransform)?;

        let mut files = self.files.into_iter();
        let input = match self.input {
            Some(input) => Some(input),
            None => files.next(),
        };
        let output = match self.output {
            Some(output) => Some(output),
            None => files.next(),
        };
        if let Some(extra) = files.next() {
            return Err(ConfigError::UnexpectedArgument(extra.to_string()));
        }

        Ok(TransformJob {
            transform,
            input: input.ok_or(ConfigError::MissingInput)?,
            output: output.ok_or(ConfigError::MissingOutput)?,
        })
    }
}

/// Render the usage text.
pub fn usage(command_name: &str) -> String {
    match Args::from_args(&[command_name], &["--help"]) {
        Err(early_exit) => early_exit.output,
        Ok(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::from_args(&["lastrans"], args).unwrap()
    }

    #[test]
    fn test_positional_files() {
        let job = parse(&["-t", "trans.txt", "in.las", "out.las"])
            .into_job()
            .unwrap();
        assert_eq!(job.transform, PathBuf::from("trans.txt"));
        assert_eq!(job.input, StreamTarget::Path(PathBuf::from("in.las")));
        assert_eq!(job.output, StreamTarget::Path(PathBuf::from("out.las")));
    }

    #[test]
    fn test_options() {
        let args = parse(&["-t", "trans.txt", "-i", "in.laz", "-o", "-", "-v"]);
        assert!(args.verbose);
        let job = args.into_job().unwrap();
        assert_eq!(job.input, StreamTarget::Path(PathBuf::from("in.laz")));
        assert_eq!(job.output, StreamTarget::Stdio);
    }

    #[test]
    fn test_input_option_output_positional() {
        let job = parse(&["--transform", "t.txt", "--input", "-", "out.las"])
            .into_job()
            .unwrap();
        assert_eq!(job.input, StreamTarget::Stdio);
        assert_eq!(job.output, StreamTarget::Path(PathBuf::from("out.las")));
    }

    #[test]
    fn test_missing_transform() {
        let res = parse(&["in.las", "out.las"]).into_job();
        assert_eq!(res.unwrap_err(), ConfigError::MissingTransform);
    }

    #[test]
    fn test_missing_input() {
        let res = parse(&["-t", "trans.txt"]).into_job();
        assert_eq!(res.unwrap_err(), ConfigError::MissingInput);
    }

    #[test]
    fn test_missing_output() {
        let res = parse(&["-t", "trans.txt", "in.las"]).into_job();
        assert_eq!(res.unwrap_err(), ConfigError::MissingOutput);
    }

    #[test]
    fn test_unexpected_argument() {
        let res = parse(&["-t", "trans.txt", "a.las", "b.las", "c.las"]).into_job();
        assert_eq!(
            res.unwrap_err(),
            ConfigError::UnexpectedArgument("c.las".to_string())
        );
    }

    #[test]
    fn test_usage_mentions_transform() {
        let text = usage("lastrans");
        assert!(text.contains("--transform"));
        assert!(text.contains("lastrans -t trans.txt in.las out.las"));
    }
}
