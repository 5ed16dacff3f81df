//! State-vector storage and kernels for QCUT
//!
//! Gantree: L2_Backend → StateVector
//!
//! Dense amplitude and probability buffers in reduced (f32) or full (f64)
//! precision, plus the in-place gate kernels. Kernels are generic over
//! `num_traits::Float`; buffers dispatch on precision once per gate.

use num_complex::{Complex, Complex32, Complex64};
use num_traits::{Float, NumCast, ToPrimitive};
use qcut_core::{
    types::{checked_bytes, try_alloc},
    CostVector, Gate, Precision, QcutError, QcutResult,
};

#[inline]
fn cast<T: Float>(x: f64) -> T {
    <T as NumCast>::from(x).unwrap_or_else(T::nan)
}

#[inline]
fn widen<T: Float>(x: T) -> f64 {
    ToPrimitive::to_f64(&x).unwrap_or(f64::NAN)
}

// ============================================================================
// Kernels
// ============================================================================

/// Set `|0…0⟩`
pub fn init_zero<T: Float>(state: &mut [Complex<T>]) {
    for amp in state.iter_mut() {
        *amp = Complex::new(T::zero(), T::zero());
    }
    if let Some(first) = state.first_mut() {
        *first = Complex::new(T::one(), T::zero());
    }
}

fn apply_single_qubit_gate<T, F>(state: &mut [Complex<T>], q: usize, f: F)
where
    T: Float,
    F: Fn(Complex<T>, Complex<T>) -> (Complex<T>, Complex<T>),
{
    let mask = 1usize << q;
    for i in 0..state.len() {
        if i & mask == 0 {
            let j = i | mask;
            let (new_i, new_j) = f(state[i], state[j]);
            state[i] = new_i;
            state[j] = new_j;
        }
    }
}

/// Hadamard on qubit `q`
pub fn apply_h<T: Float>(state: &mut [Complex<T>], q: usize) {
    let sqrt2_inv: T = cast(std::f64::consts::FRAC_1_SQRT_2);
    apply_single_qubit_gate(state, q, |a, b| ((a + b) * sqrt2_inv, (a - b) * sqrt2_inv));
}

/// `exp(-iθX/2)` on qubit `q`
pub fn apply_rx<T: Float>(state: &mut [Complex<T>], q: usize, theta: f64) {
    let c: T = cast((theta / 2.0).cos());
    let s: T = cast((theta / 2.0).sin());
    let minus_i_s = Complex::new(T::zero(), -s);
    apply_single_qubit_gate(state, q, |a, b| (a * c + b * minus_i_s, a * minus_i_s + b * c));
}

/// `exp(-iθ Z⊗Z/2)` on qubits `u`, `v`
pub fn apply_rzz<T: Float>(state: &mut [Complex<T>], u: usize, v: usize, theta: f64) {
    let even: Complex<T> = Complex::new(cast((theta / 2.0).cos()), cast(-(theta / 2.0).sin()));
    let odd = even.conj();
    let mask_u = 1usize << u;
    let mask_v = 1usize << v;

    for (i, amp) in state.iter_mut().enumerate() {
        let parity = ((i & mask_u) != 0) != ((i & mask_v) != 0);
        let phase = if parity { odd } else { even };
        *amp = *amp * phase;
    }
}

/// Multiply amplitude `k` by `phases[k]`
pub fn apply_diagonal<T: Float>(state: &mut [Complex<T>], phases: &[Complex64]) {
    for (amp, phase) in state.iter_mut().zip(phases) {
        *amp = *amp * Complex::new(cast(phase.re), cast(phase.im));
    }
}

/// Dispatch one lowered gate
pub fn apply_gate<T: Float>(state: &mut [Complex<T>], gate: &Gate<'_>) {
    match *gate {
        Gate::H(q) => apply_h(state, q),
        Gate::Rx(q, theta) => apply_rx(state, q, theta),
        Gate::Rzz(u, v, theta) => apply_rzz(state, u, v, theta),
        Gate::Diagonal(phases) => apply_diagonal(state, phases),
    }
}

/// `|a_k|²` into `out`
pub fn probabilities<T: Float>(state: &[Complex<T>], out: &mut [T]) {
    for (p, amp) in out.iter_mut().zip(state) {
        *p = amp.norm_sqr();
    }
}

/// Σ |a_k|² · value(k), accumulated in f64
pub fn expectation<T, F>(state: &[Complex<T>], value: F) -> f64
where
    T: Float,
    F: Fn(usize) -> f64,
{
    state
        .iter()
        .enumerate()
        .map(|(k, amp)| widen(amp.norm_sqr()) * value(k))
        .sum()
}

// ============================================================================
// State Buffer
// ============================================================================

/// Amplitude storage
/// Gantree: StateBuffer // f32/f64 진폭
#[derive(Debug, Clone, PartialEq)]
pub enum StateBuffer {
    /// Reduced precision
    Single(Vec<Complex32>),
    /// Full precision
    Double(Vec<Complex64>),
}

impl StateBuffer {
    /// Allocate a `|0…0⟩` state, refusing more than `limit` bytes
    pub fn zeros(num_qubits: usize, precision: Precision, limit: Option<u128>) -> QcutResult<Self> {
        checked_bytes(num_qubits, precision.bytes_per_amplitude(), limit)?;

        let mut buffer = match precision {
            Precision::Reduced => StateBuffer::Single(try_alloc(num_qubits, Complex32::new(0.0, 0.0))?),
            Precision::Full => StateBuffer::Double(try_alloc(num_qubits, Complex64::new(0.0, 0.0))?),
        };
        buffer.reset();
        Ok(buffer)
    }

    /// Storage precision
    pub fn precision(&self) -> Precision {
        match self {
            StateBuffer::Single(_) => Precision::Reduced,
            StateBuffer::Double(_) => Precision::Full,
        }
    }

    /// Number of amplitudes
    pub fn len(&self) -> usize {
        match self {
            StateBuffer::Single(s) => s.len(),
            StateBuffer::Double(s) => s.len(),
        }
    }

    /// Check if released
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Heap bytes
    pub fn bytes(&self) -> usize {
        self.len() * self.precision().bytes_per_amplitude()
    }

    /// Amplitude `k` widened to f64
    pub fn amplitude(&self, k: usize) -> Option<Complex64> {
        match self {
            StateBuffer::Single(s) => s.get(k).map(|a| Complex64::new(a.re as f64, a.im as f64)),
            StateBuffer::Double(s) => s.get(k).copied(),
        }
    }

    /// `|a_k|²`
    pub fn probability(&self, k: usize) -> Option<f64> {
        self.amplitude(k).map(|a| a.norm_sqr())
    }

    /// Σ |a_k|²
    pub fn total_probability(&self) -> f64 {
        self.expectation_with(|_| 1.0)
    }

    /// Σ |a_k|² · value(k)
    pub fn expectation_with<F: Fn(usize) -> f64>(&self, value: F) -> f64 {
        match self {
            StateBuffer::Single(s) => expectation(s, value),
            StateBuffer::Double(s) => expectation(s, value),
        }
    }

    /// Σ |a_k|² · c_k
    pub fn expectation(&self, costs: &CostVector) -> QcutResult<f64> {
        if costs.len() != self.len() {
            return Err(QcutError::DiagonalLengthMismatch {
                expected: self.len(),
                actual: costs.len(),
            });
        }
        let values = costs.as_slice();
        Ok(self.expectation_with(|k| values[k]))
    }

    /// Back to `|0…0⟩` in place
    pub fn reset(&mut self) {
        match self {
            StateBuffer::Single(s) => init_zero(s),
            StateBuffer::Double(s) => init_zero(s),
        }
    }

    /// Apply a lowered gate in place
    pub fn apply(&mut self, gate: &Gate<'_>) {
        match self {
            StateBuffer::Single(s) => apply_gate(s, gate),
            StateBuffer::Double(s) => apply_gate(s, gate),
        }
    }

    /// Write `|a_k|²` into `out`, reusing its storage when shapes agree
    pub fn probabilities_into(&self, out: &mut ProbBuffer) -> QcutResult<()> {
        if out.precision() != self.precision() || out.len() != self.len() {
            *out = ProbBuffer::zeros_like(self)?;
        }
        match (self, out) {
            (StateBuffer::Single(s), ProbBuffer::Single(p)) => probabilities(s, p),
            (StateBuffer::Double(s), ProbBuffer::Double(p)) => probabilities(s, p),
            _ => {
                return Err(QcutError::InternalError(
                    "probability buffer precision differs from state".into(),
                ))
            }
        }
        Ok(())
    }

    /// Copy `other` into `self`, reusing storage when shapes agree
    pub fn copy_from(&mut self, other: &StateBuffer) {
        match (self, other) {
            (StateBuffer::Single(dst), StateBuffer::Single(src)) if dst.len() == src.len() => {
                dst.copy_from_slice(src)
            }
            (StateBuffer::Double(dst), StateBuffer::Double(src)) if dst.len() == src.len() => {
                dst.copy_from_slice(src)
            }
            (dst, src) => *dst = src.clone(),
        }
    }

    /// Drop storage
    pub fn release(&mut self) {
        match self {
            StateBuffer::Single(s) => *s = Vec::new(),
            StateBuffer::Double(s) => *s = Vec::new(),
        }
    }
}

// ============================================================================
// Probability Buffer
// ============================================================================

/// Probability storage
/// Gantree: ProbBuffer // f32/f64 확률
#[derive(Debug, Clone, PartialEq)]
pub enum ProbBuffer {
    /// Reduced precision
    Single(Vec<f32>),
    /// Full precision
    Double(Vec<f64>),
}

impl ProbBuffer {
    /// Zeroed buffer matching `state`
    pub fn zeros_like(state: &StateBuffer) -> QcutResult<Self> {
        let num_qubits = state.len().trailing_zeros() as usize;
        Ok(match state.precision() {
            Precision::Reduced => ProbBuffer::Single(try_alloc(num_qubits, 0.0f32)?),
            Precision::Full => ProbBuffer::Double(try_alloc(num_qubits, 0.0f64)?),
        })
    }

    /// Storage precision
    pub fn precision(&self) -> Precision {
        match self {
            ProbBuffer::Single(_) => Precision::Reduced,
            ProbBuffer::Double(_) => Precision::Full,
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        match self {
            ProbBuffer::Single(p) => p.len(),
            ProbBuffer::Double(p) => p.len(),
        }
    }

    /// Check if released
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Heap bytes
    pub fn bytes(&self) -> usize {
        self.len() * self.precision().bytes_per_real()
    }

    /// Probability of assignment `k`
    pub fn get(&self, k: usize) -> Option<f64> {
        match self {
            ProbBuffer::Single(p) => p.get(k).map(|&x| x as f64),
            ProbBuffer::Double(p) => p.get(k).copied(),
        }
    }

    /// Σ p_k
    pub fn sum(&self) -> f64 {
        match self {
            ProbBuffer::Single(p) => p.iter().map(|&x| x as f64).sum(),
            ProbBuffer::Double(p) => p.iter().sum(),
        }
    }

    /// Most likely assignment (lowest index on ties)
    pub fn argmax(&self) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for k in 0..self.len() {
            let p = self.get(k).unwrap_or(f64::NAN);
            if best.map_or(true, |(_, b)| p > b) {
                best = Some((k, p));
            }
        }
        best
    }

    /// Σ p_k · c_k
    pub fn expectation(&self, costs: &CostVector) -> QcutResult<f64> {
        match self {
            ProbBuffer::Single(p) => costs.expectation(p),
            ProbBuffer::Double(p) => costs.expectation(p),
        }
    }

    /// Copy `other` into `self`, reusing storage when shapes agree
    pub fn copy_from(&mut self, other: &ProbBuffer) {
        match (self, other) {
            (ProbBuffer::Single(dst), ProbBuffer::Single(src)) if dst.len() == src.len() => {
                dst.copy_from_slice(src)
            }
            (ProbBuffer::Double(dst), ProbBuffer::Double(src)) if dst.len() == src.len() => {
                dst.copy_from_slice(src)
            }
            (dst, src) => *dst = src.clone(),
        }
    }

    /// Drop storage
    pub fn release(&mut self) {
        match self {
            ProbBuffer::Single(p) => *p = Vec::new(),
            ProbBuffer::Double(p) => *p = Vec::new(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_h_creates_superposition() {
        let mut state = StateBuffer::zeros(2, Precision::Full, None).unwrap();
        state.apply(&Gate::H(0));
        state.apply(&Gate::H(1));
        for k in 0..4 {
            assert_relative_eq!(state.probability(k).unwrap(), 0.25, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_rx_pi_flips() {
        let mut state = StateBuffer::zeros(1, Precision::Full, None).unwrap();
        state.apply(&Gate::Rx(0, PI));
        assert_relative_eq!(state.probability(1).unwrap(), 1.0, epsilon = 1e-12);
        // Rx(π)|0⟩ = -i|1⟩
        let a = state.amplitude(1).unwrap();
        assert_relative_eq!(a.im, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rzz_phases() {
        let mut state = StateBuffer::zeros(2, Precision::Full, None).unwrap();
        state.apply(&Gate::H(0));
        state.apply(&Gate::H(1));
        let theta = 0.8;
        state.apply(&Gate::Rzz(0, 1, theta));

        let even = state.amplitude(0).unwrap();
        let odd = state.amplitude(1).unwrap();
        assert_relative_eq!(even.arg(), -theta / 2.0, epsilon = 1e-12);
        assert_relative_eq!(odd.arg(), theta / 2.0, epsilon = 1e-12);
        assert_relative_eq!(state.total_probability(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_diagonal_gate() {
        let mut state = StateBuffer::zeros(1, Precision::Full, None).unwrap();
        state.apply(&Gate::H(0));
        let phases = [Complex64::new(1.0, 0.0), Complex64::new(0.0, 1.0)];
        state.apply(&Gate::Diagonal(&phases));
        let b = state.amplitude(1).unwrap();
        assert_relative_eq!(b.re, 0.0, epsilon = 1e-12);
        assert_relative_eq!(b.im, std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-12);
    }

    #[test]
    fn test_reduced_matches_full() {
        let mut full = StateBuffer::zeros(3, Precision::Full, None).unwrap();
        let mut reduced = StateBuffer::zeros(3, Precision::Reduced, None).unwrap();
        let gates = [
            Gate::H(0),
            Gate::H(1),
            Gate::H(2),
            Gate::Rzz(0, 1, 0.3),
            Gate::Rzz(1, 2, -0.7),
            Gate::Rx(0, 0.4),
            Gate::Rx(2, 1.1),
        ];
        for g in &gates {
            full.apply(g);
            reduced.apply(g);
        }
        for k in 0..8 {
            assert!((full.probability(k).unwrap() - reduced.probability(k).unwrap()).abs() < 1e-6);
        }
        assert_eq!(reduced.bytes() * 2, full.bytes());
    }

    #[test]
    fn test_probabilities_into_reuses() {
        let mut state = StateBuffer::zeros(3, Precision::Reduced, None).unwrap();
        state.apply(&Gate::H(1));
        let mut probs = ProbBuffer::Single(Vec::new());
        state.probabilities_into(&mut probs).unwrap();
        assert_eq!(probs.len(), 8);
        assert_relative_eq!(probs.sum(), 1.0, epsilon = 1e-6);

        let ptr = match &probs {
            ProbBuffer::Single(p) => p.as_ptr(),
            ProbBuffer::Double(_) => unreachable!(),
        };
        state.reset();
        state.probabilities_into(&mut probs).unwrap();
        let again = match &probs {
            ProbBuffer::Single(p) => p.as_ptr(),
            ProbBuffer::Double(_) => unreachable!(),
        };
        assert_eq!(ptr, again);
        assert_eq!(probs.argmax(), Some((0, 1.0)));
    }

    #[test]
    fn test_memory_limit() {
        let err = StateBuffer::zeros(10, Precision::Full, Some(1024)).unwrap_err();
        assert!(matches!(err, QcutError::MemoryLimitExceeded { .. }));
        // Same register fits at half the width
        assert!(StateBuffer::zeros(6, Precision::Reduced, Some(512)).is_ok());
    }

    #[test]
    fn test_nan_propagates() {
        let mut state = StateBuffer::zeros(1, Precision::Full, None).unwrap();
        state.apply(&Gate::Rx(0, f64::NAN));
        assert!(state.total_probability().is_nan());
    }
}
