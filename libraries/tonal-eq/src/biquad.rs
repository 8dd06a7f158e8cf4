/// Biquad filter with a coefficient ramp state machine
///
/// Runs the second-order recursion on one or two interleaved channels and
/// smooths every coefficient change with a bounded per-block ramp, so that
/// parameter edits and bypass toggles never cause audible discontinuities.
///
/// The recursion is `y[n] = b0·x[n] + b1·x[n-1] + b2·x[n-2] + a1·y[n-1] + a2·y[n-2]`
/// where the stored feedback terms already carry the sign that makes them
/// added.
use crate::error::{EqError, Result};
use crate::fixed::{acc_to_sample, mac_coef_sample, mul_coef_sample, Coef, Sample, COEF_ONE};

/// Maximum channels a filter can process.
pub const MAX_CHANNELS: usize = 2;

/// Coefficients per section: `b0, b1, b2, -a1, -a2`.
pub const NUM_COEFS: usize = 5;

/// Maximum coefficient change per second, in coefficient units.
pub const MAX_DELTA_PER_SEC: i64 = 2000;

/// Passthrough coefficients.
pub const IDENTITY_COEFS: [Coef; NUM_COEFS] = [COEF_ONE, 0, 0, 0, 0];

const ALL_DIRTY: u32 = (1 << NUM_COEFS) - 1;

/// Processing state of a [`BiquadFilter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterState {
    /// Samples are copied through untouched
    #[default]
    Bypass,
    /// Ramping toward identity coefficients
    TransitionToBypass,
    /// Ramping toward the target coefficients
    TransitionToNormal,
    /// Filtering with converged coefficients
    Normal,
}

impl FilterState {
    /// Whether a client considers the filter enabled.
    ///
    /// A smooth disable converges into `Normal` running identity
    /// coefficients, and that state still reports as enabled.
    pub fn is_enabled(self) -> bool {
        matches!(self, Self::TransitionToNormal | Self::Normal)
    }

    fn is_transition(self) -> bool {
        matches!(self, Self::TransitionToBypass | Self::TransitionToNormal)
    }
}

/// Selects the delay line a mono filter uses.
///
/// One mono filter can serve two separately fed mono tracks; multi-channel
/// filters ignore the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Track {
    #[default]
    Left = 0,
    Right = 1,
}

impl Track {
    fn index(self) -> usize {
        self as usize
    }
}

/// Delay line of one channel: `x[n-1], x[n-2], y[n-1], y[n-2]`.
type DelayLine = [Sample; 4];

/// Second-order IIR section with per-channel history and coefficient ramping
#[derive(Debug, Clone)]
pub struct BiquadFilter {
    num_channels: usize,
    state: FilterState,
    // Maximum change of any coefficient per sample
    max_delta: Coef,
    // Bit i set while coefs[i] has not reached its ramp target
    dirty_bits: u32,
    coefs: [Coef; NUM_COEFS],
    target_coefs: [Coef; NUM_COEFS],
    delays: [DelayLine; MAX_CHANNELS],
}

impl BiquadFilter {
    /// Create a bypassed filter with identity coefficients.
    pub fn new(num_channels: usize, sample_rate: u32) -> Result<Self> {
        let mut filter = Self {
            num_channels: 1,
            state: FilterState::Bypass,
            max_delta: 0,
            dirty_bits: 0,
            coefs: IDENTITY_COEFS,
            target_coefs: IDENTITY_COEFS,
            delays: [[0; 4]; MAX_CHANNELS],
        };
        filter.configure(num_channels, sample_rate)?;
        filter.reset();
        Ok(filter)
    }

    /// Set channel count and ramp rate. Clears the delay lines.
    pub fn configure(&mut self, num_channels: usize, sample_rate: u32) -> Result<()> {
        if num_channels == 0 || num_channels > MAX_CHANNELS {
            return Err(EqError::InvalidChannels(num_channels));
        }
        if sample_rate == 0 {
            return Err(EqError::InvalidSampleRate(sample_rate));
        }
        self.num_channels = num_channels;
        self.max_delta = (MAX_DELTA_PER_SEC * i64::from(COEF_ONE) / i64::from(sample_rate))
            .min(i64::from(Coef::MAX)) as Coef;
        self.clear();
        Ok(())
    }

    /// Force identity coefficients and bypass.
    pub fn reset(&mut self) {
        self.coefs = IDENTITY_COEFS;
        self.dirty_bits = 0;
        self.set_state(FilterState::Bypass);
    }

    /// Zero the delay lines.
    pub fn clear(&mut self) {
        self.delays = [[0; 4]; MAX_CHANNELS];
    }

    /// Store new target coefficients.
    ///
    /// An enabled filter jumps to them when `immediate` is set and ramps
    /// otherwise. A disabled filter only stages them for the next enable.
    pub fn set_coefficients(&mut self, coefs: &[Coef; NUM_COEFS], immediate: bool) {
        self.target_coefs = *coefs;
        if self.state.is_enabled() {
            if immediate {
                self.coefs = *coefs;
                self.set_state(FilterState::Normal);
            } else {
                self.set_state(FilterState::TransitionToNormal);
            }
        }
    }

    /// Move toward the target coefficients.
    pub fn enable(&mut self, immediate: bool) {
        if immediate {
            self.coefs = self.target_coefs;
            self.set_state(FilterState::Normal);
        } else {
            self.set_state(FilterState::TransitionToNormal);
        }
    }

    /// Move toward identity coefficients.
    pub fn disable(&mut self, immediate: bool) {
        if immediate {
            self.coefs = IDENTITY_COEFS;
            self.set_state(FilterState::Bypass);
        } else {
            self.set_state(FilterState::TransitionToBypass);
        }
    }

    /// Filter `input` into `output` (interleaved, equal lengths).
    pub fn process(&mut self, input: &[Sample], output: &mut [Sample], track: Track) {
        debug_assert_eq!(input.len(), output.len());
        output.copy_from_slice(input);
        self.process_in_place(output, track);
    }

    /// Filter an interleaved buffer in place.
    pub fn process_in_place(&mut self, buffer: &mut [Sample], track: Track) {
        debug_assert_eq!(buffer.len() % self.num_channels, 0);
        let frames = buffer.len() / self.num_channels;
        match self.state {
            FilterState::Bypass => {}
            FilterState::TransitionToBypass => {
                if self.update_coefs(&IDENTITY_COEFS, frames) {
                    self.set_state(FilterState::Normal);
                }
                self.run(buffer, track);
            }
            FilterState::TransitionToNormal => {
                let target = self.target_coefs;
                if self.update_coefs(&target, frames) {
                    self.set_state(FilterState::Normal);
                }
                self.run(buffer, track);
            }
            FilterState::Normal => self.run(buffer, track),
        }
    }

    /// Current processing state
    pub fn state(&self) -> FilterState {
        self.state
    }

    /// Whether a client considers the filter enabled
    pub fn is_enabled(&self) -> bool {
        self.state.is_enabled()
    }

    /// Coefficients currently used for processing
    pub fn coefficients(&self) -> &[Coef; NUM_COEFS] {
        &self.coefs
    }

    /// Coefficients the filter ramps toward when enabled
    pub fn target_coefficients(&self) -> &[Coef; NUM_COEFS] {
        &self.target_coefs
    }

    /// Ramp cap per sample
    pub fn max_delta_per_sample(&self) -> Coef {
        self.max_delta
    }

    /// Configured channel count
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    fn set_state(&mut self, state: FilterState) {
        if state.is_transition() {
            self.dirty_bits = ALL_DIRTY;
        }
        self.state = state;
    }

    /// Step every dirty coefficient toward `target` by at most the per-block
    /// cap. Returns true once all coefficients have arrived.
    fn update_coefs(&mut self, target: &[Coef; NUM_COEFS], frames: usize) -> bool {
        let max_delta = i64::from(self.max_delta) * frames as i64;
        for (i, (coef, &goal)) in self.coefs.iter_mut().zip(target).enumerate() {
            if self.dirty_bits & (1 << i) == 0 {
                continue;
            }
            let current = i64::from(*coef);
            let diff = i64::from(goal) - current;
            if diff > max_delta {
                *coef = (current + max_delta) as Coef;
            } else if diff < -max_delta {
                *coef = (current - max_delta) as Coef;
            } else {
                *coef = goal;
                self.dirty_bits &= !(1 << i);
            }
        }
        self.dirty_bits == 0
    }

    fn run(&mut self, buffer: &mut [Sample], track: Track) {
        let coefs = self.coefs;
        if self.num_channels == 1 {
            filter_channel(&coefs, &mut self.delays[track.index()], buffer.iter_mut());
        } else {
            let stride = self.num_channels;
            for (ch, delay) in self.delays[..stride].iter_mut().enumerate() {
                filter_channel(&coefs, delay, buffer.iter_mut().skip(ch).step_by(stride));
            }
        }
    }
}

#[inline]
fn filter_channel<'a>(
    coefs: &[Coef; NUM_COEFS],
    delay: &mut DelayLine,
    samples: impl Iterator<Item = &'a mut Sample>,
) {
    let [b0, b1, b2, a1, a2] = *coefs;
    let [mut x1, mut x2, mut y1, mut y2] = *delay;
    for sample in samples {
        let x0 = *sample;
        let mut acc = mul_coef_sample(b0, x0);
        acc = mac_coef_sample(b1, x1, acc);
        acc = mac_coef_sample(b2, x2, acc);
        acc = mac_coef_sample(a1, y1, acc);
        acc = mac_coef_sample(a2, y2, acc);
        let y0 = acc_to_sample(acc);
        y2 = y1;
        y1 = y0;
        x2 = x1;
        x1 = x0;
        *sample = y0;
    }
    *delay = [x1, x2, y1, y2];
}
