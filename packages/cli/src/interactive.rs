//! Interactive menu shown when `wio_map` runs without a subcommand.

use dialoguer::{Input, MultiSelect, Select};
use wio_map_cli_utils::MultiProgress;
use wio_map_region_models::Metric;
use wio_map_view::{TIME_BANDS, TimeRange};

use crate::commands::{self, SourceArgs};

enum Action {
    Build,
    Grid,
    Breaks,
}

impl Action {
    const ALL: &[Self] = &[Self::Build, Self::Grid, Self::Breaks];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Build => "Build map artifacts",
            Self::Grid => "Summarize grid cells by time band",
            Self::Breaks => "Compute choropleth breaks",
        }
    }
}

/// Prompts for an action and its parameters, then runs it.
///
/// # Errors
///
/// Returns an error if a prompt fails or the chosen action fails.
pub async fn run(
    args: &SourceArgs,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("WIO Fisheries Map");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();
    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Action::ALL[idx] {
        Action::Build => commands::build(args, multi).await?,
        Action::Grid => {
            let ranges = prompt_bands()?;
            commands::summarize_grid(args, &ranges)?;
        }
        Action::Breaks => {
            let metric = prompt_metric()?;
            let classes: usize = Input::new()
                .with_prompt("Number of classes")
                .default(5)
                .interact_text()?;
            commands::breaks(args, metric, classes)?;
        }
    }

    Ok(())
}

fn prompt_bands() -> Result<Vec<TimeRange>, dialoguer::Error> {
    let labels: Vec<&str> = TIME_BANDS.iter().map(|band| band.label).collect();
    let defaults = vec![true; labels.len()];

    let picked = MultiSelect::new()
        .with_prompt("Time bands (space to toggle)")
        .items(&labels)
        .defaults(&defaults)
        .interact()?;

    Ok(picked.into_iter().map(|i| TIME_BANDS[i].range).collect())
}

fn prompt_metric() -> Result<Metric, dialoguer::Error> {
    let labels: Vec<&str> = Metric::ALL.iter().map(AsRef::as_ref).collect();
    let idx = Select::new()
        .with_prompt("Metric")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(Metric::ALL[idx])
}
