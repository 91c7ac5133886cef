mod args;
mod lexer;
mod parser;
mod tree;

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser as _;
use colored::Colorize;

use args::CliArgs;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "ft_cli=info,warn".to_string()))
        .init();

    let args = CliArgs::parse();
    let source = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let filename = args.file.display().to_string();

    let (tree, program) = parser::parse(&source);

    if args.constraints {
        let start = Instant::now();
        let mut result = ft_engine::infer_with_constraints(&tree, &source, &filename, program);
        result.stats.solve_time = Some(start.elapsed());
        print_constraint_result(&result, args.json)
    } else {
        let result = ft_engine::infer(&tree, &source, &filename, program);
        print_annotation_result(&result, args.json)
    }
}

fn print_annotation_result(result: &ft_engine::AnnotationResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    for annotation in &result.annotations {
        let label = annotation.identifier.as_deref().unwrap_or("<expr>");
        println!("{} {} {}", label.cyan(), "::".dimmed(), annotation.type_string.green());
    }
    for error in &result.errors {
        println!("{} {}:{}:{} {}", "error".red().bold(), result.filename, error.line, error.column, error.message);
    }
    if !result.errors.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_constraint_result(result: &ft_engine::ConstraintInferenceResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    for annotation in &result.annotations {
        let label = annotation.identifier.as_deref().unwrap_or("<expr>");
        println!("{} {} {}", label.cyan(), "::".dimmed(), annotation.type_string.green());
    }
    for error in &result.errors {
        println!("{} {}:{}:{} {}", "error".red().bold(), result.filename, error.line, error.column, error.message);
    }
    println!(
        "{} {} constraints, {} type variables{}",
        "stats:".dimmed(),
        result.stats.constraint_count,
        result.stats.type_variable_count,
        result
            .stats
            .solve_time
            .map(|d| format!(", {:?}", d))
            .unwrap_or_default()
            .dimmed()
    );
    if !result.errors.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}
