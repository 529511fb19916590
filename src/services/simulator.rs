use rand::seq::index;
use rand::Rng;
use serde::Serialize;

use crate::services::decoder::DeviceMap;

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct SimulatedSignal {
    pub received_signal: Vec<i64>,
    pub active_device_count: usize,
    pub active_devices: Vec<String>,
    pub signal_length: usize,
    pub total_devices: usize,
}

/// Picks between one and all of `devices` at random and sums their patterns.
///
/// Callers validate the map first (see `routes::signal`), including that the
/// per-sample sum over all devices fits in an `i64`.
pub fn simulate<R: Rng>(devices: &DeviceMap, rng: &mut R) -> SimulatedSignal {
    let total_devices = devices.len();
    let signal_length = devices.values().next().map(Vec::len).unwrap_or(0);
    if total_devices == 0 {
        return SimulatedSignal {
            received_signal: Vec::new(),
            active_device_count: 0,
            active_devices: Vec::new(),
            signal_length,
            total_devices,
        };
    }

    let active_count = rng.gen_range(1..=total_devices);
    let mut picked = index::sample(rng, total_devices, active_count).into_vec();
    picked.sort_unstable();

    let mut received_signal = vec![0i64; signal_length];
    let mut active_devices = Vec::with_capacity(active_count);
    let mut next = picked.iter().peekable();
    for (position, (device_id, pattern)) in devices.iter().enumerate() {
        if next.peek() != Some(&&position) {
            continue;
        }
        next.next();
        for (slot, sample) in received_signal.iter_mut().zip(pattern) {
            *slot += sample;
        }
        active_devices.push(device_id.clone());
    }

    SimulatedSignal {
        received_signal,
        active_device_count: active_count,
        active_devices,
        signal_length,
        total_devices,
    }
}
