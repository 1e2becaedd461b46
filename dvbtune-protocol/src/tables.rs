//! Lookup tables from configuration values to device enumerations.
//!
//! Every table is sorted ascending on its key and searched with a binary
//! search. Strings compare byte-for-byte, so "16QAM" sorts before "8PSK".
//! A missing or unknown key yields the caller's default.

use crate::types::{fec, guard, hierarchy, inversion, modulation, pilot, rolloff, transmission};

type StrMap = [(&'static str, u32)];
type IntMap = [(i32, u32)];

/// Maps a configuration string through a sorted string table.
pub fn parse_str(value: Option<&str>, map: &StrMap, default: u32) -> u32 {
    value
        .and_then(|key| map.binary_search_by(|(k, _)| k.as_bytes().cmp(key.as_bytes())).ok())
        .map(|idx| map[idx].1)
        .unwrap_or(default)
}

/// Maps a configuration integer through a sorted integer table.
pub fn parse_int(value: i32, map: &IntMap, default: u32) -> u32 {
    map.binary_search_by(|(k, _)| k.cmp(&value))
        .map(|idx| map[idx].1)
        .unwrap_or(default)
}

const MODULATIONS: [(&str, u32); 13] = [
    ("128QAM", modulation::QAM_128),
    ("16APSK", modulation::APSK_16),
    ("16QAM", modulation::QAM_16),
    ("16VSB", modulation::VSB_16),
    ("256QAM", modulation::QAM_256),
    ("32APSK", modulation::APSK_32),
    ("32QAM", modulation::QAM_32),
    ("64QAM", modulation::QAM_64),
    ("8PSK", modulation::PSK_8),
    ("8VSB", modulation::VSB_8),
    ("DQPSK", modulation::DQPSK),
    ("QAM", modulation::QAM_AUTO),
    ("QPSK", modulation::QPSK),
];

const CODE_RATES: [(&str, u32); 10] = [
    ("", fec::FEC_AUTO),
    ("1/2", fec::FEC_1_2),
    ("2/3", fec::FEC_2_3),
    ("3/4", fec::FEC_3_4),
    ("4/5", fec::FEC_4_5),
    ("5/6", fec::FEC_5_6),
    ("6/7", fec::FEC_6_7),
    ("7/8", fec::FEC_7_8),
    ("8/9", fec::FEC_8_9),
    ("9/10", fec::FEC_9_10),
];

// 16K and 32K are DVB-T2 only and left out on purpose.
const TRANSMISSION_MODES: [(i32, u32); 4] = [
    (-1, transmission::TRANSMISSION_MODE_AUTO),
    (2, transmission::TRANSMISSION_MODE_2K),
    (4, transmission::TRANSMISSION_MODE_4K),
    (8, transmission::TRANSMISSION_MODE_8K),
];

// 1/128, 19/128 and 9/256 are valid DVB-T2 intervals but not supported here.
const GUARD_INTERVALS: [(&str, u32); 5] = [
    ("", guard::GUARD_INTERVAL_AUTO),
    ("1/16", guard::GUARD_INTERVAL_1_16),
    ("1/32", guard::GUARD_INTERVAL_1_32),
    ("1/4", guard::GUARD_INTERVAL_1_4),
    ("1/8", guard::GUARD_INTERVAL_1_8),
];

const HIERARCHIES: [(i32, u32); 5] = [
    (-1, hierarchy::HIERARCHY_AUTO),
    (0, hierarchy::HIERARCHY_NONE),
    (1, hierarchy::HIERARCHY_1),
    (2, hierarchy::HIERARCHY_2),
    (4, hierarchy::HIERARCHY_4),
];

const INVERSIONS: [(i32, u32); 2] = [(0, inversion::INVERSION_OFF), (1, inversion::INVERSION_ON)];

const PILOTS: [(i32, u32); 2] = [(0, pilot::PILOT_OFF), (1, pilot::PILOT_ON)];

/// Roll-off factors keyed by percent (0.20, 0.25, 0.35).
const ROLLOFFS: [(i32, u32); 3] = [
    (20, rolloff::ROLLOFF_20),
    (25, rolloff::ROLLOFF_25),
    (35, rolloff::ROLLOFF_35),
];

pub fn parse_modulation(value: Option<&str>, default: u32) -> u32 {
    parse_str(value, &MODULATIONS, default)
}

pub fn parse_fec(value: Option<&str>) -> u32 {
    parse_str(value, &CODE_RATES, fec::FEC_AUTO)
}

pub fn parse_transmission_mode(value: i32) -> u32 {
    parse_int(value, &TRANSMISSION_MODES, transmission::TRANSMISSION_MODE_AUTO)
}

pub fn parse_guard(value: Option<&str>) -> u32 {
    parse_str(value, &GUARD_INTERVALS, guard::GUARD_INTERVAL_AUTO)
}

pub fn parse_hierarchy(value: i32) -> u32 {
    parse_int(value, &HIERARCHIES, hierarchy::HIERARCHY_AUTO)
}

pub fn parse_inversion(value: i32) -> u32 {
    parse_int(value, &INVERSIONS, inversion::INVERSION_AUTO)
}

pub fn parse_pilot(value: i32) -> u32 {
    parse_int(value, &PILOTS, pilot::PILOT_AUTO)
}

pub fn parse_rolloff(value: i32) -> u32 {
    parse_int(value, &ROLLOFFS, rolloff::ROLLOFF_AUTO)
}
