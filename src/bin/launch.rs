use clap::Parser;
use graceful_server::logging;
use graceful_server::process::{launch, LaunchSpec, ProcessError};
use std::path::PathBuf;
use tracing::error;

/// Start an external program and wait for its exit status
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Working directory for the child process
    #[arg(long, default_value = "/")]
    dir: PathBuf,

    /// Program followed by its arguments (default: ls -l /)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

impl Args {
    fn into_spec(self) -> LaunchSpec {
        let mut command = self.command.into_iter();
        match command.next() {
            Some(program) => LaunchSpec {
                program,
                args: command.collect(),
                dir: self.dir,
            },
            None => LaunchSpec {
                dir: self.dir,
                ..LaunchSpec::default()
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let spec = Args::parse().into_spec();
    match launch(&spec).await {
        Ok(code) => {
            println!("Process exited with status: {}", code);
            Ok(())
        }
        Err(e) => {
            match &e {
                ProcessError::Spawn { .. } => error!(error = %e, "Error starting process"),
                ProcessError::Wait(_) => error!(error = %e, "Error waiting for process"),
            }
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_command_uses_default_listing() {
        let spec = Args::try_parse_from(["launch"]).unwrap().into_spec();
        assert_eq!(spec, LaunchSpec::default());
    }

    #[test]
    fn test_command_with_hyphen_args() {
        let spec = Args::try_parse_from(["launch", "--dir", "/tmp", "ls", "-la", "/etc"])
            .unwrap()
            .into_spec();

        assert_eq!(spec.program, "ls");
        assert_eq!(spec.args, vec!["-la", "/etc"]);
        assert_eq!(spec.dir, PathBuf::from("/tmp"));
    }
}
