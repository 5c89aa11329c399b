use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::fuel::FuelType;

#[derive(Parser, Debug)]
#[command(
    name = "fuel-usability",
    about = "Run the Alternative Fuel Finder usability test",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(short, long, env = "FUEL_USABILITY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default configuration file
    Init {
        /// Where to write the configuration file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Look up fuel stations near a location without running the test
    Lookup {
        /// City, address or zip code
        location: String,

        /// Fuel type code (can be repeated)
        #[arg(long = "fuel", value_name = "CODE", default_value = "ELEC")]
        fuel_types: Vec<FuelType>,

        /// Number of stations to retrieve
        #[arg(long, default_value = "10", value_parser = clap::value_parser!(u32).range(10..=100))]
        limit: u32,

        /// Show map points instead of the table
        #[arg(long)]
        map: bool,
    },
}
