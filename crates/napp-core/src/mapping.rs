//! Bijection between circuit qubits and hardware qubits.

use rustc_hash::FxHashMap;

use crate::error::{MapError, MapResult};
use crate::hardware::HwQubit;

/// Dense index of a qubit as it appears in the input circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CircQubit(pub usize);

/// Bijection `circToHw` between circuit qubits and hardware qubits.
#[derive(Debug, Clone)]
pub struct Mapping {
    circ_to_hw: Vec<HwQubit>,
    hw_to_circ: FxHashMap<HwQubit, CircQubit>,
}

impl Mapping {
    /// Identity mapping: circuit qubit `i` maps to hardware qubit `i`.
    pub fn identity(num_qubits: usize) -> Self {
        let circ_to_hw: Vec<HwQubit> = (0..num_qubits).map(HwQubit).collect();
        let hw_to_circ = circ_to_hw
            .iter()
            .enumerate()
            .map(|(c, &hw)| (hw, CircQubit(c)))
            .collect();
        Self {
            circ_to_hw,
            hw_to_circ,
        }
    }

    pub fn num_qubits(&self) -> usize {
        self.circ_to_hw.len()
    }

    pub fn get_hw(&self, q: CircQubit) -> HwQubit {
        self.circ_to_hw[q.0]
    }

    pub fn get_circ(&self, hw: HwQubit) -> MapResult<CircQubit> {
        self.hw_to_circ
            .get(&hw)
            .copied()
            .ok_or(MapError::UnmappedHwQubit(hw.0))
    }

    /// Swaps the hardware qubits assigned to two circuit qubits. At least
    /// one of `a`, `b` must currently be mapped (both always are, since
    /// this is a total bijection over a fixed qubit count — kept as a
    /// cheap assertion rather than a public precondition).
    pub fn swap(&mut self, a: CircQubit, b: CircQubit) {
        let hw_a = self.circ_to_hw[a.0];
        let hw_b = self.circ_to_hw[b.0];
        self.circ_to_hw[a.0] = hw_b;
        self.circ_to_hw[b.0] = hw_a;
        self.hw_to_circ.insert(hw_b, a);
        self.hw_to_circ.insert(hw_a, b);
    }

    pub fn iter(&self) -> impl Iterator<Item = (CircQubit, HwQubit)> + '_ {
        self.circ_to_hw
            .iter()
            .enumerate()
            .map(|(c, &hw)| (CircQubit(c), hw))
    }
}
