//! Cost-model driven strategy selection.

use super::direct::{DirectCorrelateConfig, DirectCorrelateKernel};
use super::fft::{FftCorrelateConfig, FftCorrelateKernel};
use super::overlap_save::{OverlapSaveConfig, OverlapSaveKernel, DEFAULT_SEGMENT_FACTOR};
use super::SignalShape;
use crate::kernel::{ConfigError, ExecInvariantViolation, HandleLifecycle, Samples, SamplesMut};
use crate::signal::traits::CrossCorrelate1D;
use core::fmt;
use sigcorr_core::vector::VectorBackend;

/// The three correlation algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Sliding dot products, see [`DirectCorrelateKernel`].
    Direct,
    /// One padded transform pair, see [`FftCorrelateKernel`].
    Fft,
    /// Segmented transforms, see [`OverlapSaveKernel`].
    OverlapSave,
}

impl Strategy {
    /// All strategies in tie-break order, lowest per-call overhead first.
    pub const ALL: [Strategy; 3] = [Strategy::Direct, Strategy::Fft, Strategy::OverlapSave];

    /// Short lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Direct => "direct",
            Strategy::Fft => "fft",
            Strategy::OverlapSave => "overlap_save",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Relative cost estimates for each strategy.
///
/// Estimates are in arbitrary units: `direct_weight` per multiply-accumulate
/// or elementwise step, `transform_weight` per butterfly-ish unit of
/// `n · log2(n)` transform work.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostModel {
    /// Cost of one multiply-accumulate.
    pub direct_weight: f64,
    /// Cost of one `n · log2(n)` unit of transform work.
    pub transform_weight: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            direct_weight: 1.0,
            transform_weight: 1.5,
        }
    }
}

fn transform_units(n: usize) -> f64 {
    let n = n as f64;
    n * n.log2().max(1.0)
}

impl CostModel {
    /// Estimated cost of one call with `strategy`, or `None` when the
    /// strategy cannot be sized for `shape`.
    pub fn estimate(
        &self,
        strategy: Strategy,
        shape: &SignalShape,
        segment_factor: usize,
    ) -> Option<f64> {
        let x_len = shape.x_len() as f64;
        match strategy {
            Strategy::Direct => Some(self.direct_weight * x_len * shape.h_len() as f64),
            Strategy::Fft => {
                // Two forward transforms and one inverse.
                let n = shape.padded_len()?;
                Some(self.transform_weight * 3.0 * transform_units(n) + self.direct_weight * n as f64)
            }
            Strategy::OverlapSave => {
                let l = shape.segment_len(segment_factor)?;
                let stride = l - shape.h_len() + 1;
                let segments = shape.x_len().div_ceil(stride) as f64;
                // Forward and inverse per segment plus one forward for `h`.
                Some(
                    self.transform_weight * (2.0 * segments + 1.0) * transform_units(l)
                        + self.direct_weight * segments * l as f64,
                )
            }
        }
    }

    /// The cheapest strategy for `shape`; ties go to the earlier entry of
    /// [`Strategy::ALL`].
    pub fn select(&self, shape: &SignalShape, segment_factor: usize) -> Strategy {
        let mut best = Strategy::Direct;
        let mut best_cost = f64::INFINITY;
        for strategy in Strategy::ALL {
            if let Some(cost) = self.estimate(strategy, shape, segment_factor) {
                if cost < best_cost {
                    best = strategy;
                    best_cost = cost;
                }
            }
        }
        best
    }
}

/// Constructor config for [`CrossCorrelateKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossCorrelateConfig {
    /// Length of the long signal.
    pub x_len: usize,
    /// Length of the reference.
    pub h_len: usize,
    /// Elementwise kernels handed to the selected strategy.
    pub backend: VectorBackend,
    /// Overlap-save segment factor, used both for costing and construction.
    pub segment_factor: usize,
    /// Weights of the selection model.
    pub cost: CostModel,
    /// Skip the cost model and build this strategy.
    pub strategy: Option<Strategy>,
}

impl CrossCorrelateConfig {
    /// Defaults for the given shape: detected backend, default segment
    /// factor and cost weights, model-driven selection.
    pub fn new(x_len: usize, h_len: usize) -> Self {
        Self {
            x_len,
            h_len,
            backend: VectorBackend::detect(),
            segment_factor: DEFAULT_SEGMENT_FACTOR,
            cost: CostModel::default(),
            strategy: None,
        }
    }

    /// Force `strategy` instead of consulting the cost model.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Use `backend` for the selected strategy.
    pub fn with_backend(mut self, backend: VectorBackend) -> Self {
        self.backend = backend;
        self
    }
}

#[derive(Debug)]
enum Selected {
    Direct(DirectCorrelateKernel),
    Fft(FftCorrelateKernel),
    OverlapSave(OverlapSaveKernel),
}

/// Correlation handle that runs whichever strategy is cheapest for its shape.
///
/// Selection happens once in [`HandleLifecycle::try_new`]. Every call is
/// forwarded unchanged, so results are identical to building the selected
/// strategy directly with the same backend.
#[derive(Debug)]
pub struct CrossCorrelateKernel {
    selected: Selected,
}

impl CrossCorrelateKernel {
    /// The strategy this handle runs.
    pub fn strategy(&self) -> Strategy {
        match &self.selected {
            Selected::Direct(_) => Strategy::Direct,
            Selected::Fft(_) => Strategy::Fft,
            Selected::OverlapSave(_) => Strategy::OverlapSave,
        }
    }

    /// Shape this handle was built for.
    pub fn shape(&self) -> SignalShape {
        match &self.selected {
            Selected::Direct(k) => k.shape(),
            Selected::Fft(k) => k.shape(),
            Selected::OverlapSave(k) => k.shape(),
        }
    }
}

impl HandleLifecycle for CrossCorrelateKernel {
    type Config = CrossCorrelateConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        let shape = SignalShape::try_new(config.x_len, config.h_len)?;
        let strategy = match config.strategy {
            Some(strategy) => strategy,
            None => {
                let strategy = config.cost.select(&shape, config.segment_factor);
                log::debug!(
                    "cost model for x_len={} h_len={}: direct={:?} fft={:?} overlap_save={:?} -> {strategy}",
                    shape.x_len(),
                    shape.h_len(),
                    config.cost.estimate(Strategy::Direct, &shape, config.segment_factor),
                    config.cost.estimate(Strategy::Fft, &shape, config.segment_factor),
                    config.cost.estimate(Strategy::OverlapSave, &shape, config.segment_factor),
                );
                strategy
            }
        };

        let selected = match strategy {
            Strategy::Direct => Selected::Direct(DirectCorrelateKernel::try_new(DirectCorrelateConfig {
                x_len: config.x_len,
                h_len: config.h_len,
                vector_path: true,
                backend: config.backend,
            })?),
            Strategy::Fft => Selected::Fft(FftCorrelateKernel::try_new(FftCorrelateConfig {
                x_len: config.x_len,
                h_len: config.h_len,
                backend: config.backend,
            })?),
            Strategy::OverlapSave => {
                Selected::OverlapSave(OverlapSaveKernel::try_new(OverlapSaveConfig {
                    x_len: config.x_len,
                    h_len: config.h_len,
                    segment_factor: config.segment_factor,
                    backend: config.backend,
                })?)
            }
        };
        Ok(Self { selected })
    }

    fn finalize(self) {
        match self.selected {
            Selected::Direct(k) => k.finalize(),
            Selected::Fft(k) => k.finalize(),
            Selected::OverlapSave(k) => k.finalize(),
        }
    }
}

impl CrossCorrelate1D for CrossCorrelateKernel {
    fn run_into<X, H, O>(&mut self, x: &X, h: &H, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        X: Samples<f32> + ?Sized,
        H: Samples<f32> + ?Sized,
        O: SamplesMut<f32> + ?Sized,
    {
        match &mut self.selected {
            Selected::Direct(k) => k.run_into(x, h, out),
            Selected::Fft(k) => k.run_into(x, h, out),
            Selected::OverlapSave(k) => k.run_into(x, h, out),
        }
    }

    fn run_in_place<X, H>(&mut self, x: &mut X, h: &H) -> Result<(), ExecInvariantViolation>
    where
        X: SamplesMut<f32> + ?Sized,
        H: Samples<f32> + ?Sized,
    {
        match &mut self.selected {
            Selected::Direct(k) => k.run_in_place(x, h),
            Selected::Fft(k) => k.run_in_place(x, h),
            Selected::OverlapSave(k) => k.run_in_place(x, h),
        }
    }
}
