//! Plain-text rendering of an analysis report.

use std::io::{self, Write};

use hindsight_core::{
    AnalysisReport, Config,
    analysis::{
        convergence::ConvergenceVerdict,
        correlation::CorrelationEntry,
        parameters::{ParameterConvergence, Spread},
        survival::BestOutcome,
    },
};
use uom::si::time::second;

const RULE_WIDTH: usize = 80;
const STRONGEST: usize = 5;

fn heading(out: &mut impl Write, title: &str) -> io::Result<()> {
    writeln!(out, "\n--- {title} ---")
}

fn names<'a>(rows: impl Iterator<Item = &'a ParameterConvergence>) -> (usize, String) {
    let names: Vec<&str> = rows.map(ParameterConvergence::name).collect();
    (names.len(), names.join(", "))
}

#[allow(clippy::cast_precision_loss)]
fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}

/// Writes the full text report.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_report(
    out: &mut impl Write,
    report: &AnalysisReport,
    config: &Config,
) -> io::Result<()> {
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "OPTIMIZATION ANALYSIS")?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;

    let model = config.survival();
    heading(out, "OVERVIEW")?;
    writeln!(out, "Total evaluations: {}", report.evaluations)?;
    writeln!(out, "Parameters analyzed: {}", report.parameters.len())?;
    writeln!(
        out,
        "Max ticks per run: {} ({:.0} sim-seconds)",
        model.max_ticks(),
        model.cap_duration().get::<second>()
    )?;

    write_convergence(out, report, config)?;
    write_survival(out, report, config)?;
    write_parameters(out, report, config)?;
    write_correlations(out, report)?;
    write_new_parameters(out, report, config)?;
    write_best(out, report, config)?;

    writeln!(out, "\n{}", "=".repeat(RULE_WIDTH))
}

fn write_convergence(
    out: &mut impl Write,
    report: &AnalysisReport,
    config: &Config,
) -> io::Result<()> {
    let summary = &report.convergence;
    let tail = config.convergence().tail_window();

    heading(out, "1. CONVERGENCE")?;
    writeln!(
        out,
        "Best fitness: {:.2} (eval #{})",
        summary.best.fitness, summary.best.eval
    )?;
    writeln!(out, "Worst fitness: {:.2}", summary.worst_fitness)?;
    writeln!(out, "Mean fitness (all): {:.2}", summary.mean_fitness)?;
    writeln!(out, "Mean fitness (last {tail}): {:.2}", summary.tail_mean_fitness)?;
    for checkpoint in &summary.checkpoints {
        writeln!(
            out,
            "Best-so-far at eval {}: {:.2}",
            checkpoint.evaluations, checkpoint.best_so_far
        )?;
    }

    let split = &summary.split;
    writeln!(out, "\nFirst {} evals best: {:.2}", split.size, split.first_best)?;
    writeln!(out, "Last {} evals best: {:.2}", split.size, split.second_best)?;
    writeln!(out, "Improvement in second half: {:.2}", split.improvement)?;

    if let Some(previous) = summary.previous_tail_best_fitness {
        writeln!(out, "Best in previous {tail} evals: {previous:.2}")?;
    }
    writeln!(out, "Best in last {tail} evals: {:.2}", summary.tail_best_fitness)?;

    let plateau = config.convergence().plateau_fraction() * 100.0;
    let verdict = match summary.verdict {
        ConvergenceVerdict::LargelyConverged => {
            format!("Largely converged (< {plateau:.0}% change between halves)")
        }
        ConvergenceVerdict::StillImproving => {
            "Still improving (second half found better solutions)".to_owned()
        }
        ConvergenceVerdict::ConvergedEarly => {
            "Converged early; no improvement in second half".to_owned()
        }
    };
    writeln!(out, "VERDICT: {verdict}")
}

fn write_survival(
    out: &mut impl Write,
    report: &AnalysisReport,
    config: &Config,
) -> io::Result<()> {
    let summary = &report.survival;
    let model = config.survival();
    let total = summary.estimates.len();

    heading(out, "2. SURVIVAL ANALYSIS")?;
    writeln!(
        out,
        "Approx survival (mean): {:.0}s",
        summary.mean_duration.get::<second>()
    )?;
    writeln!(
        out,
        "Approx survival (median): {:.0}s",
        summary.median_duration.get::<second>()
    )?;
    writeln!(
        out,
        "Approx survival (max): {:.0}s",
        summary.max_duration.get::<second>()
    )?;
    writeln!(
        out,
        "Approx survival (min): {:.0}s",
        summary.min_duration.get::<second>()
    )?;
    writeln!(
        out,
        "Runs hitting max cap (fitness <= -{}): {}/{total} ({:.1}%)",
        model.max_ticks(),
        summary.likely_cap_hits,
        percent(summary.likely_cap_hits, total)
    )?;

    #[allow(clippy::cast_precision_loss)]
    let definite = model.max_ticks() as f64 * (1.0 + model.quality_weight());
    writeln!(
        out,
        "Runs with fitness <= -{definite:.0} (cap + max quality): {}/{total} ({:.1}%)",
        summary.definite_cap_hits,
        percent(summary.definite_cap_hits, total)
    )?;

    for quarter in &summary.quarters {
        writeln!(
            out,
            "  Evals {}-{}: mean surv={:.0}s, hit cap={}/{} ({:.0}%)",
            quarter.first_eval,
            quarter.last_eval,
            quarter.mean_duration.get::<second>(),
            quarter.cap_hits,
            quarter.count,
            quarter.cap_hit_rate() * 100.0
        )?;
    }
    Ok(())
}

fn write_parameters(
    out: &mut impl Write,
    report: &AnalysisReport,
    config: &Config,
) -> io::Result<()> {
    let tail = config.classifier().tail_window();

    heading(out, "3. PARAMETER CONVERGENCE")?;
    writeln!(
        out,
        "\n{:<25} {:>10} {:>12} {:>11} {:>8} Status",
        "Parameter",
        "Best",
        format!("Last{tail} Mean"),
        format!("Last{tail} Std"),
        "NormStd"
    )?;
    writeln!(out, "{}", "-".repeat(100))?;
    for row in &report.parameters {
        writeln!(
            out,
            "{:<25} {:>10.4} {:>12.4} {:>11.4} {:>8.3} {}",
            row.name(),
            row.best_value,
            row.tail_mean,
            row.tail_std,
            row.norm_std,
            row.status
        )?;
    }

    writeln!(out)?;
    for (label, spread) in [
        ("Converged", Spread::Converged),
        ("Narrowing", Spread::Narrowing),
        ("Exploring", Spread::Exploring),
    ] {
        let (count, list) = names(report.with_spread(spread));
        writeln!(out, "{label} ({count}): {list}")?;
    }
    let (count, list) = names(report.hugging_bounds());
    writeln!(out, "Hitting bounds ({count}): {list}")
}

fn write_correlation_line(out: &mut impl Write, entry: &CorrelationEntry) -> io::Result<()> {
    writeln!(out, "  {}: r={:+.3}", entry.parameter, entry.all)
}

fn write_correlations(out: &mut impl Write, report: &AnalysisReport) -> io::Result<()> {
    let correlations = &report.correlations;

    heading(out, "4. PARAMETER CORRELATIONS WITH FITNESS")?;
    writeln!(out, "\n(Negative correlation = associated with BETTER fitness)")?;
    writeln!(
        out,
        "\n{:<25} {:>12} {:>14}",
        "Parameter",
        "Corr (all)",
        format!("Corr (top {})", correlations.top_count)
    )?;
    writeln!(out, "{}", "-".repeat(55))?;
    for entry in &correlations.entries {
        writeln!(
            out,
            "{:<25} {:>+12.3} {:>+14.3} {}",
            entry.parameter, entry.all, entry.top, entry.significance
        )?;
    }

    writeln!(
        out,
        "\nStrongest positive correlations with fitness (BAD - higher value = worse fitness):"
    )?;
    for entry in correlations.strongest_positive(STRONGEST) {
        write_correlation_line(out, entry)?;
    }

    writeln!(
        out,
        "\nStrongest negative correlations with fitness (GOOD - higher value = better fitness):"
    )?;
    for entry in correlations.strongest_negative(STRONGEST) {
        write_correlation_line(out, entry)?;
    }
    Ok(())
}

fn write_new_parameters(
    out: &mut impl Write,
    report: &AnalysisReport,
    config: &Config,
) -> io::Result<()> {
    let rows = report.new_parameter_rows();
    if rows.is_empty() {
        return Ok(());
    }
    let tail = config.classifier().tail_window();

    heading(out, "5. NEW PARAMETERS")?;
    for row in rows {
        let p = row.convergence;
        let spec = &p.spec;
        writeln!(out, "\n  {}:", spec.name())?;
        writeln!(
            out,
            "    Bounds: [{}, {}], Default: {}, Best: {:.4}",
            spec.lower(),
            spec.upper(),
            spec.default_value(),
            p.best_value
        )?;
        writeln!(
            out,
            "    Last {tail} mean: {:.4} +/- {:.4}",
            p.tail_mean, p.tail_std
        )?;
        if let Some(shift) = p.shift_from_default_pct {
            writeln!(out, "    Shift from default: {shift:+.1}% of range")?;
        }
        if let Some(entry) = row.correlation {
            writeln!(out, "    Fitness correlation: r={:+.3}", entry.all)?;
        }
        writeln!(out, "    Status: {}", p.status)?;
    }
    Ok(())
}

fn write_best(out: &mut impl Write, report: &AnalysisReport, config: &Config) -> io::Result<()> {
    let best = &report.convergence.best;

    heading(out, "6. BEST CONFIG SUMMARY")?;
    writeln!(out, "Best evaluation: #{}", best.eval)?;
    writeln!(out, "Best fitness: {:.2}", best.fitness)?;
    match report.survival.best_outcome {
        BestOutcome::HitCap { quality } => writeln!(
            out,
            "Implied: hit {} tick cap with quality ~{quality:.2}",
            config.survival().max_ticks()
        )?,
        BestOutcome::Survived { ticks, duration } => writeln!(
            out,
            "Implied: survived ~{ticks:.0} ticks (~{:.0} sim-seconds)",
            duration.get::<second>()
        )?,
    }

    if !report.best_configuration.is_empty() {
        writeln!(out, "\nBest parameter values:")?;
    }
    for p in &report.best_configuration {
        writeln!(
            out,
            "  {:<25} = {:>10.4}  ({:>5.1}% of range)",
            p.name, p.value, p.percent_of_range
        )?;
    }
    Ok(())
}
