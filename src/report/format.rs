//! Formatted run summaries.
//!
//! Pure string formatting; nothing here touches stdout. Keeping it in one
//! place means output tweaks never leak into the math modules.

use crate::domain::{ExperimentConfig, FitQuality, FitResult};

/// Format the full run summary: configuration, fitted parameters with
/// standard errors, the covariance matrix, and the chi-square diagnostics.
pub fn format_run_summary(
    config: &ExperimentConfig,
    fit: &FitResult,
    quality: &FitQuality,
) -> String {
    let mut out = String::new();

    out.push_str("=== mmfit - Michaelis-Menten fit ===\n");
    out.push_str(&format!(
        "Truth: Vmax={:.4} Km={:.4} | noise sd={:.4}\n",
        config.truth.vmax, config.truth.km, config.noise_sd
    ));
    out.push_str(&format!(
        "Sample: n={} | s=[0, {:.2}) | seed={}\n",
        config.n_obs, config.s_max, config.seed
    ));
    out.push_str(&format!(
        "Guess: Vmax={:.2} Km={:.2}\n",
        config.initial.vmax, config.initial.km
    ));

    out.push_str("\nFit:\n");
    out.push_str(&format!(
        "  Vmax = {:.6} +/- {:.6}\n",
        fit.params.vmax,
        fit.vmax_std_err()
    ));
    out.push_str(&format!(
        "  Km   = {:.6} +/- {:.6}\n",
        fit.params.km,
        fit.km_std_err()
    ));
    out.push_str(&format!(
        "  corr(Vmax, Km) = {:.4} | iterations = {}\n",
        fit.correlation(),
        fit.iterations
    ));

    out.push_str("\nCovariance:\n");
    for row in &fit.covariance {
        out.push_str(&format!("  [{:>14.6e}, {:>14.6e}]\n", row[0], row[1]));
    }

    out.push_str(&format!(
        "\nchisq = {:.6}  df = {}  reduced = {:.6}\n",
        quality.chisq, quality.dof, quality.reduced_chisq
    ));

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::KineticParams;

    #[test]
    fn summary_contains_the_headline_numbers() {
        let config = ExperimentConfig::default();
        let fit = FitResult {
            params: KineticParams::new(99.5, 2.9),
            covariance: [[1.44, -0.2], [-0.2, 0.09]],
            cost: 47.0,
            iterations: 8,
        };
        let quality = FitQuality {
            chisq: 47.0,
            dof: 48,
            reduced_chisq: 47.0 / 48.0,
        };

        let text = format_run_summary(&config, &fit, &quality);
        assert!(text.contains("99.5"));
        assert!(text.contains("Km   = 2.9"));
        assert!(text.contains("df = 48"));
        assert!(text.contains("+/- 1.2"));
        assert!(text.contains("iterations = 8"));
    }
}
