use crate::error::{SciportError, SciportResult};
use crate::excel;
use crate::factories::{self, DataFormat, ExportOptions, LoadOptions};
use crate::subset::{Subset, SubsetState};
use crate::types::{ComponentId, Dataset};
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Output format for `info`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

#[derive(Debug, Serialize)]
struct DatasetSummary {
    file: String,
    label: String,
    shape: Vec<usize>,
    components: Vec<ComponentSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    coordinates: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ComponentSummary {
    name: String,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    units: Option<String>,
}

impl DatasetSummary {
    fn new(file: &Path, data: &Dataset) -> Self {
        Self {
            file: file.display().to_string(),
            label: data.label.clone(),
            shape: data.shape().to_vec(),
            components: data
                .components()
                .map(|(id, c)| ComponentSummary {
                    name: id.label().to_string(),
                    kind: c.values.kind(),
                    units: c.units.clone(),
                })
                .collect(),
            coordinates: data.coords.as_ref().map(|c| c.cards.len()),
        }
    }
}

/// Execute the info command - list datasets and their components
pub fn info(files: Vec<PathBuf>, format: OutputFormat) -> SciportResult<()> {
    let mut summaries = Vec::new();
    for file in &files {
        for data in factories::load_data(file)? {
            summaries.push(DatasetSummary::new(file, &data));
        }
    }

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&summaries)
                .map_err(|e| SciportError::Serialize(e.to_string()))?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(&summaries)
                .map_err(|e| SciportError::Serialize(e.to_string()))?;
            print!("{}", yaml);
        }
        OutputFormat::Text => print_summaries(&summaries),
    }

    Ok(())
}

fn print_summaries(summaries: &[DatasetSummary]) {
    if summaries.is_empty() {
        println!("{}", "No datasets found".yellow());
        return;
    }

    for summary in summaries {
        println!(
            "📊 {} {}",
            summary.label.bright_blue().bold(),
            format!("shape {:?}", summary.shape).dimmed()
        );
        println!("   File: {}", summary.file);
        if let Some(cards) = summary.coordinates {
            println!("   WCS: {} header cards", cards);
        }
        for component in &summary.components {
            let units = match component.units.as_deref() {
                Some("") => " [dimensionless]".to_string(),
                Some(u) => format!(" [{}]", u),
                None => String::new(),
            };
            println!(
                "      {} ({}){}",
                component.name.cyan(),
                component.kind,
                units
            );
        }
        println!();
    }
}

/// Execute the sheets command - list workbook sheet names
pub fn sheets(file: PathBuf) -> SciportResult<()> {
    let names = excel::sheet_names(&file)?;
    println!("{}", format!("📗 {}", file.display()).bold().green());
    for (idx, name) in names.iter().enumerate() {
        println!("   {:>3}  {}", idx, name.bright_blue());
    }
    Ok(())
}

/// Arguments of the export command
#[derive(Debug, Clone)]
pub struct ExportArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    pub sheet: Option<String>,
    pub dataset: usize,
    pub components: Vec<String>,
    pub subset: Option<String>,
    pub format: Option<String>,
    pub no_overwrite: bool,
    pub verbose: bool,
}

/// Execute the export command - load one dataset and write it out
pub fn export(args: ExportArgs) -> SciportResult<()> {
    println!("{}", "🔭 Sciport - Export".bold().green());
    println!("   Input:  {}", args.input.display());
    println!("   Output: {}\n", args.output.display());

    let load = LoadOptions {
        format: None,
        sheet: args.sheet.clone(),
    };
    let datasets = factories::load_data_with(&args.input, &load)?;
    let count = datasets.len();
    let data = datasets.into_iter().nth(args.dataset).ok_or_else(|| {
        SciportError::Empty(format!(
            "dataset index {} requested but {} contains {} dataset(s)",
            args.dataset,
            args.input.display(),
            count
        ))
    })?;

    if args.verbose {
        println!("   Dataset: {}", data.label.bright_blue());
        println!(
            "   Components: {}",
            data.component_ids()
                .map(|id| id.label())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    let subset = match &args.subset {
        Some(expr) => {
            let subset = Subset::new(expr.clone(), SubsetState::parse(expr)?);
            if args.verbose {
                println!(
                    "   Subset: {} ({} of {} entries)",
                    subset.state.to_string().cyan(),
                    subset.count(&data)?,
                    data.size()
                );
            }
            Some(subset)
        }
        None => None,
    };

    let format = args
        .format
        .as_deref()
        .map(str::parse::<DataFormat>)
        .transpose()?;

    let options = ExportOptions {
        format,
        components: if args.components.is_empty() {
            None
        } else {
            Some(args.components.iter().map(|c| ComponentId::from(c.as_str())).collect())
        },
        subset,
        overwrite: !args.no_overwrite,
    };

    factories::export_data(&args.output, &data, &options)?;

    println!("{}", "✅ Export Complete!".bold().green());
    println!("   {} → {}\n", data.label, args.output.display());
    Ok(())
}
