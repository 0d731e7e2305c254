use rustfft::{FftPlanner, num_complex::Complex};

pub const TABLE_SIZE: usize = 2048;

// Cosine (real) and sine (imag) amplitudes per harmonic; index 0 is DC and ignored.
const TIMBRE_REAL: [f64; 8] = [0.0, 0.0, 0.0, -0.1, 0.0, 0.0, 0.0, 0.0];
const TIMBRE_IMAG: [f64; 8] = [0.0, 1.0, 0.0, 0.45, 0.0, 0.25, 0.0, 0.12];

/// One cycle of a waveform described by a short Fourier series.
#[derive(Clone, Debug)]
pub struct PeriodicWave {
    table: Vec<f32>,
}

impl PeriodicWave {
    /// The keyboard's voice: odd harmonics only, falling off roughly like a soft square.
    pub fn keyboard_timbre() -> Self {
        Self::from_coefficients(&TIMBRE_REAL, &TIMBRE_IMAG)
    }

    /// Synthesizes `sum(real[k] cos(2πkt) + imag[k] sin(2πkt))` with an inverse FFT and
    /// normalizes the cycle to a peak of 1.0.
    pub fn from_coefficients(real: &[f64], imag: &[f64]) -> Self {
        let size = TABLE_SIZE;
        let harmonics = real.len().max(imag.len()).min(size / 2);
        let mut bins = vec![Complex::new(0.0f64, 0.0); size];
        for k in 1..harmonics {
            let re = real.get(k).copied().unwrap_or(0.0) * 0.5;
            let im = imag.get(k).copied().unwrap_or(0.0) * 0.5;
            bins[k] = Complex::new(re, -im);
            bins[size - k] = Complex::new(re, im);
        }

        let mut planner = FftPlanner::<f64>::new();
        let ifft = planner.plan_fft_inverse(size);
        ifft.process(&mut bins);

        let peak = bins.iter().map(|c| c.re.abs()).fold(0.0, f64::max);
        let scale = if peak > f64::EPSILON { 1.0 / peak } else { 0.0 };
        let table = bins.iter().map(|c| (c.re * scale) as f32).collect();
        Self { table }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// `phase` is in cycles; values outside [0, 1) wrap.
    pub fn sample(&self, phase: f64) -> f32 {
        let len = self.table.len();
        let position = phase.rem_euclid(1.0) * len as f64;
        let index = (position as usize).min(len - 1);
        let frac = (position - index as f64) as f32;
        let a = self.table[index];
        let b = self.table[(index + 1) % len];
        a + (b - a) * frac
    }

    pub fn table(&self) -> &[f32] {
        &self.table
    }
}
