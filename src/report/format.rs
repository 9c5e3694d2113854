//! Terminal formatting of solve results.
//!
//! We keep formatting code in one place so the solver code stays clean and
//! output changes are localized.

use crate::app::pipeline::{MethodOutcome, ProblemRun};
use crate::diagnostics::FitComparison;

/// Format a full run: problem shape, one block per method, then agreement.
pub fn format_run(run: &ProblemRun, labels: Option<&[&str]>) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== {} ===\n", run.label));
    out.push_str(&format!(
        "Design: {} observations x {} regressors\n",
        run.problem.design.nrows(),
        run.problem.design.ncols()
    ));

    for outcome in &run.outcomes {
        out.push('\n');
        out.push_str(&format_outcome(outcome, labels));
    }

    if let Some(cmp) = &run.comparison {
        out.push('\n');
        out.push_str(&format_comparison(cmp));
    }

    out
}

/// Format one method's result (coefficients + residuals, or the failure).
pub fn format_outcome(outcome: &MethodOutcome, labels: Option<&[&str]>) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "[{}] error ~ cond(X)^{}\n",
        outcome.method.display_name(),
        outcome.method.condition_exponent()
    ));

    let fit = match &outcome.result {
        Ok(fit) => fit,
        Err(err) => {
            out.push_str(&format!("  failed: {err}\n"));
            return out;
        }
    };

    out.push_str(&format!("  {:<12} {:>18}\n", "coefficient", "value"));
    out.push_str(&format!("  {:-<12} {:-<18}\n", "", ""));
    for (i, b) in fit.coefficients.iter().enumerate() {
        let name = labels
            .and_then(|l| l.get(i).map(|s| s.to_string()))
            .unwrap_or_else(|| format!("beta[{i}]"));
        out.push_str(&format!("  {:<12} {:>18.10}\n", truncate(&name, 12), b));
    }

    out.push_str(&format!("  residuals (Xb - y): {}\n", fmt_vec(fit.residuals.as_slice(), 12)));
    out.push_str(&format!(
        "  SSE={:.6} RMSE={:.6} R2={} rcond~{:.3e}\n",
        fit.sse,
        fit.rmse,
        outcome
            .r_squared
            .map(|v| format!("{v:.6}"))
            .unwrap_or_else(|| "n/a".to_string()),
        fit.rcond_estimate
    ));
    out
}

/// Format solver agreement.
pub fn format_comparison(cmp: &FitComparison) -> String {
    format!(
        "Agreement: max|db|={:.3e} (relative {:.3e}), SSE gap={:.3e}\n",
        cmp.max_coef_diff, cmp.max_rel_coef_diff, cmp.sse_gap
    )
}

/// One line per run, for batches.
pub fn format_batch_summary(runs: &[ProblemRun]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<16} {:>6} {:>6} {:>14} {:>14} {:>12}\n",
        "problem", "rows", "cols", "sse", "max_rel_db", "failures"
    ));
    out.push_str(&format!(
        "{:-<16} {:-<6} {:-<6} {:-<14} {:-<14} {:-<12}\n",
        "", "", "", "", "", ""
    ));
    for run in runs {
        let sse = run
            .outcomes
            .iter()
            .find_map(|o| o.result.as_ref().ok().map(|f| format!("{:.6}", f.sse)))
            .unwrap_or_else(|| "-".to_string());
        let rel = run
            .comparison
            .map(|c| format!("{:.3e}", c.max_rel_coef_diff))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:<16} {:>6} {:>6} {:>14} {:>14} {:>12}\n",
            truncate(&run.label, 16),
            run.problem.design.nrows(),
            run.problem.design.ncols(),
            sse,
            rel,
            run.failures().count()
        ));
    }
    out
}

fn fmt_vec(v: &[f64], max: usize) -> String {
    let mut parts: Vec<String> = v.iter().take(max).map(|x| format!("{x:.6}")).collect();
    if v.len() > max {
        parts.push(format!("... ({} more)", v.len() - max));
    }
    format!("[{}]", parts.join(", "))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
