use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use graphlp_solver::{Model, Plot, RegionBuilder, Solution, SolveStatus, Solver, Window};

mod svg;

#[derive(Parser)]
#[command(name = "graphlp")]
#[command(about = "Solve and plot two-variable linear programs", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a model and print the optimal solution
    Solve {
        /// Model file (.lp text format, or .json)
        file: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
    },
    /// Solve a model and draw its feasible region as SVG
    Plot {
        /// Model file (.lp text format, or .json)
        file: PathBuf,
        /// Output file
        #[arg(short, long, default_value = "plot.svg")]
        output: PathBuf,
        /// Square window bound; fit to the optimum when omitted
        #[arg(short, long)]
        window: Option<f64>,
        /// Close regions that are only bounded by the window
        #[arg(long)]
        clip: bool,
    },
    /// Check a model file for errors
    Check {
        /// Model file (.lp text format, or .json)
        file: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Pretty,
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Solve { file, format } => solve(&file, format),
        Commands::Plot {
            file,
            output,
            window,
            clip,
        } => plot(&file, &output, window, clip),
        Commands::Check { file } => check(&file),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Read a model from the text format, or from serialised JSON for `.json` files
fn load_model(path: &Path) -> Result<Model> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Error reading file: {}", path.display()))?;

    let model = if path.extension().is_some_and(|ext| ext == "json") {
        let model: Model = serde_json::from_str(&source)
            .with_context(|| format!("Invalid model JSON in {}", path.display()))?;
        model.validate()?;
        model
    } else {
        graphlp_lang::compile_source(&source)
            .with_context(|| format!("Invalid model in {}", path.display()))?
    };

    tracing::debug!(path = %path.display(), constraints = model.num_constraints(), "loaded model");
    Ok(model)
}

/// Returns whether an optimal solution was found
fn solve(file: &Path, format: Format) -> Result<bool> {
    let model = load_model(file)?;
    let solution = Solver::new().solve_model(&model);

    match format {
        Format::Json => {
            let output = serde_json::json!({
                "status": solution.status,
                "result": solution.to_result(),
                "binding": solution.binding.iter().map(|&i| model.constraint_name(i)).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Format::Pretty => print_solution(&model, &solution),
    }

    Ok(solution.is_optimal())
}

fn print_solution(model: &Model, solution: &Solution) {
    println!("Objective: {:?} {}", model.objective.sense, describe_objective(model));
    println!("Constraints:");
    let names = model.variable_names();
    for (i, c) in model.constraints.iter().enumerate() {
        match &c.description {
            Some(desc) => println!("  {:10} {}  ({})", model.constraint_name(i), c.describe(names), desc),
            None => println!("  {:10} {}", model.constraint_name(i), c.describe(names)),
        }
    }
    println!();

    let Some(point) = solution.point.filter(|_| solution.status == SolveStatus::Optimal) else {
        println!("Status: {:?}", solution.status);
        println!("{}", solution.status.message());
        println!("No optimal solution found.");
        return;
    };

    println!("Status: OPTIMAL");
    println!("Optimal value: {:.2}", solution.objective_value);
    for (i, (variable, value)) in model.variables.iter().zip([point.x, point.y]).enumerate() {
        let label = format!("X{} ({})", i, variable.name);
        match &variable.description {
            Some(desc) => println!("  {:16} {:10.2}  {}", label, value, desc),
            None => println!("  {:16} {:10.2}", label, value),
        }
    }

    if !solution.binding.is_empty() {
        println!();
        println!("Binding constraints:");
        for &i in &solution.binding {
            println!("  - {}", model.constraint_name(i));
        }
    }
}

fn plot(file: &Path, output: &Path, window: Option<f64>, clip: bool) -> Result<bool> {
    let model = load_model(file)?;
    let solution = Solver::new().solve_model(&model);

    if let Some(bound) = window {
        anyhow::ensure!(bound.is_finite() && bound > 0.0, "Window bound must be positive, got {}", bound);
    }
    let region = RegionBuilder::new().with_window_edges(clip);
    let plot = Plot::build(&model, Some(&solution), &region, window.map(Window::square));

    if plot.polygon.is_empty() {
        tracing::warn!("feasible region is empty inside the window");
    }

    let svg = svg::render(&plot, model.variable_names()).context("Error rendering SVG")?;
    std::fs::write(output, svg).with_context(|| format!("Error writing {}", output.display()))?;

    println!(
        "Wrote {} ({} vertices, window {}x{})",
        output.display(),
        plot.polygon.len(),
        plot.window.x_max,
        plot.window.y_max
    );
    if !solution.is_optimal() {
        println!("No optimal solution found.");
    }
    Ok(solution.is_optimal())
}

fn check(file: &Path) -> Result<bool> {
    let model = load_model(file)?;
    let names = model.variable_names();

    println!("✓ {} is valid", file.display());
    println!("  Variables: {}, {}", names[0], names[1]);
    println!(
        "  Objective: {:?} {}",
        model.objective.sense,
        describe_objective(&model)
    );
    println!("  Constraints: {}", model.num_constraints());
    for (i, c) in model.constraints.iter().enumerate() {
        println!("    {}: {}", model.constraint_name(i), c.describe(names));
    }
    Ok(true)
}

fn describe_objective(model: &Model) -> String {
    let names = model.variable_names();
    let o = &model.objective;
    let sign = if o.coeff_b < 0.0 { '-' } else { '+' };
    format!("{}{} {} {}{}", o.coeff_a, names[0], sign, o.coeff_b.abs(), names[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn model_file(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_text_model() {
        let file = model_file(".lp", "var x0 \"Trousers\"\nmax 3 x0 + 2 x1\n2 x0 + x1 <= 10\n");
        let model = load_model(file.path()).unwrap();
        assert_eq!(model.num_constraints(), 1);
        assert_eq!(model.variables[0].description.as_deref(), Some("Trousers"));
    }

    #[test]
    fn test_load_json_model() {
        let mut model = Model::new(graphlp_solver::Objective::minimize(1.0, 1.0));
        model
            .add_constraint(graphlp_solver::Constraint::ge(1.0, 1.0, 2.0))
            .unwrap();
        let file = model_file(".json", &serde_json::to_string(&model).unwrap());

        assert_eq!(load_model(file.path()).unwrap(), model);
    }

    #[test]
    fn test_load_rejects_invalid_json_model() {
        let model = Model::new(graphlp_solver::Objective::minimize(1.0, 1.0));
        let file = model_file(".json", &serde_json::to_string(&model).unwrap());
        assert!(load_model(file.path()).is_err());
    }

    #[test]
    fn test_load_reports_compile_errors() {
        let file = model_file(".lp", "max x0 + z\nx0 <= 1\n");
        let err = load_model(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Unknown variable: z"));
    }

    #[test]
    fn test_plot_writes_svg() {
        let file = model_file(".lp", "max 3 x0 + 2 x1\ncloth: 2 x0 + x1 <= 10\nx0 + x1 <= 8\n");
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.svg");

        assert!(plot(file.path(), &output, None, false).unwrap());
        let svg = std::fs::read_to_string(&output).unwrap();
        assert!(svg.contains(r#"class="optimum""#));
    }

    #[test]
    fn test_solve_reports_infeasible() {
        let file = model_file(".lp", "max x0 + x1\nx0 >= 5\nx0 <= 2\n");
        assert!(!solve(file.path(), Format::Json).unwrap());
    }
}
