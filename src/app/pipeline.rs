//! The end-to-end experiment pipeline.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! synthesize dataset -> fit -> goodness of fit -> plot-contract assembly
//!
//! A presentation layer (plots, notebooks) consumes `RunOutput` and focuses
//! purely on rendering.

use log::debug;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::data::generate_dataset;
use crate::domain::{
    CurveSeries, Dataset, ExperimentConfig, FitOptions, FitQuality, FitResult, ReciprocalSeries,
    SynthConfig,
};
use crate::error::Result;
use crate::fit::fit_michaelis_menten;
use crate::report::{curve_series, goodness_of_fit, reciprocal_series};

/// All computed outputs of a single simulated experiment.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub dataset: Dataset,
    pub fit: FitResult,
    pub quality: FitQuality,
    /// Direct-plot contract: v vs. s with error bars and the fitted curve.
    pub curve: CurveSeries,
    /// Double-reciprocal plot contract, including both axis intercepts.
    pub reciprocal: ReciprocalSeries,
}

/// Execute the full experiment and return the computed outputs.
///
/// The RNG is seeded from `config.seed` here and nowhere else, so the same
/// configuration always produces the same output.
pub fn run_experiment(config: &ExperimentConfig) -> Result<RunOutput> {
    // 1) Synthesize the noisy dataset.
    let mut rng = StdRng::seed_from_u64(config.seed);
    let synth = SynthConfig {
        truth: config.truth,
        noise_sd: config.noise_sd,
        n_obs: config.n_obs,
        s_max: config.s_max,
    };
    let dataset = generate_dataset(&synth, &mut rng)?;

    // 2) Recover the parameters from the noise.
    let options = FitOptions {
        initial: config.initial,
        sigma_mode: config.sigma_mode,
    };
    let fit = fit_michaelis_menten(&dataset.points, &options)?;

    // 3) Judge the fit.
    let quality = goodness_of_fit(&dataset.points, &fit.params)?;
    debug!(
        "run complete: chisq = {:.4}, dof = {}",
        quality.chisq, quality.dof
    );

    // 4) Assemble what the plotting layer needs.
    let curve = curve_series(&dataset.points, &fit.params)?;
    let reciprocal = reciprocal_series(&curve, &fit.params);

    Ok(RunOutput {
        dataset,
        fit,
        quality,
        curve,
        reciprocal,
    })
}
