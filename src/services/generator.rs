use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::services::decoder::DeviceMap;

#[derive(Debug, Clone, Copy)]
pub struct GenerateParams {
    pub count: u32,
    pub signal_length: u32,
    pub max_strength: u32,
}

/// Builds `count` devices named `D01`, `D02`, ... each with `signal_length`
/// samples drawn uniformly from `0..=max_strength`.
pub fn generate_devices<R: Rng>(params: GenerateParams, rng: &mut R) -> DeviceMap {
    (1..=params.count)
        .map(|idx| {
            let pattern: Vec<i64> = (0..params.signal_length)
                .map(|_| rng.gen_range(0..=i64::from(params.max_strength)))
                .collect();
            (device_label(idx), pattern)
        })
        .collect()
}

pub fn device_label(idx: u32) -> String {
    format!("D{idx:02}")
}

/// Seeded when the caller wants reproducible output, OS entropy otherwise.
pub fn request_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAMS: GenerateParams = GenerateParams {
        count: 12,
        signal_length: 6,
        max_strength: 9,
    };

    #[test]
    fn labels_are_zero_padded() {
        assert_eq!(device_label(1), "D01");
        assert_eq!(device_label(42), "D42");
        assert_eq!(device_label(100), "D100");
    }

    #[test]
    fn generates_requested_shape_within_range() {
        let mut rng = StdRng::seed_from_u64(11);
        let devices = generate_devices(PARAMS, &mut rng);
        assert_eq!(devices.len(), 12);
        assert!(devices.contains_key("D01"));
        assert!(devices.contains_key("D12"));
        for pattern in devices.values() {
            assert_eq!(pattern.len(), 6);
            assert!(pattern.iter().all(|v| (0..=9).contains(v)));
        }
    }

    #[test]
    fn same_seed_same_devices() {
        let first = generate_devices(PARAMS, &mut request_rng(Some(99)));
        let second = generate_devices(PARAMS, &mut request_rng(Some(99)));
        assert_eq!(first, second);
    }
}
