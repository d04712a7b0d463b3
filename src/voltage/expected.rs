// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Expected voltage per probe point on the inspected board

/// Allowed deviation from the expected voltage, in volts
pub const VOLTAGE_TOLERANCE: f64 = 0.25;

const GND: f64 = 0.0;
const VCC: f64 = 3.3;

/// Probe point -> expected volts
#[rustfmt::skip]
pub const EXPECTED_VOLTAGES: &[(&str, f64)] = &[
    ("A1", GND), ("A2", GND), ("A3", GND), ("A4", GND), ("A5", GND),
    ("A6", GND), ("A7", GND), ("A8", GND), ("A9", GND),
    ("B1", VCC), ("B2", VCC), ("B3", VCC), ("B4", VCC), ("B5", VCC),
    ("B6", VCC), ("B7", VCC), ("B8", VCC), ("B9", VCC),
    ("C1", GND), ("C2", GND),
    ("D1", VCC), ("D2", VCC), ("D3", VCC),
    ("E1", GND), ("E2", GND),
    ("F1", GND), ("F2", GND), ("F3", GND), ("F4", GND), ("F5", GND),
    ("G1", VCC), ("G2", VCC), ("G3", VCC), ("G4", VCC), ("G5", VCC), ("G6", VCC),
    ("H1", GND), ("H2", GND),
    ("I1", GND), ("I2", GND),
    ("J1", GND), ("J2", GND),
    ("K1", GND), ("K2", GND),
    ("L1", VCC), ("L2", VCC), ("L3", VCC),
    ("M1", VCC), ("M2", VCC), ("M3", VCC),
    ("N1", VCC), ("N2", VCC), ("N3", VCC),
    ("O1", GND), ("O2", GND),
    ("P1", GND), ("P2", GND),
    ("Q1", GND), ("Q2", GND),
    ("R1", VCC), ("R2", VCC),
    ("S1", GND), ("S2", GND),
    ("T1", GND), ("T2", GND),
    ("U1", VCC), ("U2", VCC), ("U3", VCC),
    ("V1", GND), ("V2", GND),
    ("W1", GND), ("W2", GND),
    ("X1", GND), ("X2", GND),
    ("Y1", GND), ("Y2", GND),
    ("Z1", GND), ("Z2", GND),
    ("RF", GND),
];

/// Expected voltage for a probe point, `None` for points not on the map.
///
/// Point names are matched exactly (case-sensitive).
pub fn expected_voltage(point: &str) -> Option<f64> {
    EXPECTED_VOLTAGES
        .iter()
        .find(|(name, _)| *name == point)
        .map(|&(_, volts)| volts)
}
