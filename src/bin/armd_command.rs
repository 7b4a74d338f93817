//! armd command formatter
//!
//! Prints a single daemon command as a JSON line, for piping into a
//! running `armd` or into a command file:
//!
//! ```text
//! armd_command joint -- 0.0 -0.5 0.3 0.7 | armd
//! ```

use anyhow::{anyhow, Result};
use armd::UiCommand;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "armd-command")]
#[command(about = "Format commands for the armd daemon")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Joint-space move: four joint angles in radians
    Joint {
        #[arg(num_args = 4, value_names = ["J1", "J2", "J3", "J4"], allow_negative_numbers = true)]
        angles: Vec<f64>,

        /// Requested motion duration in seconds (forwarded, planner decides)
        #[arg(short, long, default_value_t = 2.0)]
        path_time: f64,
    },
    /// Task-space move: end-effector x y z in meters
    Task {
        #[arg(num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
        position: Vec<f64>,

        /// Requested motion duration in seconds (forwarded, planner decides)
        #[arg(short, long, default_value_t = 2.0)]
        path_time: f64,
    },
    /// Gripper move: single joint angle in radians
    Gripper {
        #[arg(allow_negative_numbers = true)]
        angle: f64,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let command = match args.command {
        Commands::Joint { angles, path_time } => UiCommand::JointSpace {
            angles: angles
                .try_into()
                .map_err(|_| anyhow!("expected exactly 4 joint angles"))?,
            path_time,
        },
        Commands::Task {
            position,
            path_time,
        } => UiCommand::TaskSpace {
            position: position
                .try_into()
                .map_err(|_| anyhow!("expected exactly 3 coordinates"))?,
            path_time,
        },
        Commands::Gripper { angle } => UiCommand::Gripper { angle },
    };

    println!("{}", serde_json::to_string(&command)?);
    Ok(())
}
