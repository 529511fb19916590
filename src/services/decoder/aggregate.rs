use super::types::{DeviceMap, DeviceStrength};
use super::DecodeError;

#[derive(Debug, Clone)]
pub struct AggregatedSignal {
    pub strengths: Vec<DeviceStrength>,
    pub target: u64,
    pub signal_length: usize,
}

pub fn validate_tolerance(tolerance: i64) -> Result<u64, DecodeError> {
    u64::try_from(tolerance)
        .map_err(|_| DecodeError::InvalidInput("tolerance must be non-negative".to_string()))
}

/// Reduces every device pattern and the received signal to scalar sums.
///
/// All element-wise sums produced later are bounded by the grand total of
/// every device sample, so that total is required to fit in `i64` up front.
pub fn aggregate(devices: &DeviceMap, received: &[i64]) -> Result<AggregatedSignal, DecodeError> {
    if devices.is_empty() {
        return Err(DecodeError::InvalidInput(
            "at least one device is required".to_string(),
        ));
    }
    if received.is_empty() {
        return Err(DecodeError::InvalidInput(
            "received signal must not be empty".to_string(),
        ));
    }

    let signal_length = received.len();
    let target = pattern_sum("received signal", received)?;

    let mut grand_total: i64 = 0;
    let mut strengths = Vec::with_capacity(devices.len());
    for (device_id, pattern) in devices {
        if device_id.trim().is_empty() {
            return Err(DecodeError::InvalidInput(
                "device identifiers must not be empty".to_string(),
            ));
        }
        if pattern.len() != signal_length {
            return Err(DecodeError::InvalidInput(format!(
                "device {device_id} has {} samples, expected {signal_length}",
                pattern.len()
            )));
        }
        let strength = pattern_sum(device_id, pattern)?;
        grand_total = grand_total
            .checked_add(strength)
            .ok_or_else(overflow_error)?;
        strengths.push(DeviceStrength {
            device_id: device_id.clone(),
            strength: strength as u64,
        });
    }

    Ok(AggregatedSignal {
        strengths,
        target: target as u64,
        signal_length,
    })
}

/// Ascending by strength. The sort is stable and the input arrives in
/// identifier order, so ties always land in identifier order.
pub fn order_by_strength(strengths: &mut [DeviceStrength]) {
    strengths.sort_by_key(|entry| entry.strength);
}

fn pattern_sum(label: &str, samples: &[i64]) -> Result<i64, DecodeError> {
    let mut sum: i64 = 0;
    for &sample in samples {
        if sample < 0 {
            return Err(DecodeError::InvalidInput(format!(
                "{label} contains a negative sample ({sample})"
            )));
        }
        sum = sum.checked_add(sample).ok_or_else(overflow_error)?;
    }
    Ok(sum)
}

fn overflow_error() -> DecodeError {
    DecodeError::InvalidInput("signal values are too large to sum".to_string())
}
