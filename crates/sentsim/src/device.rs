use candle_core::Device;
use once_cell::sync::Lazy;

#[cfg(all(feature = "metal", feature = "cuda"))]
compile_error!("feature \"metal\" and feature \"cuda\" cannot be enabled at the same time");

/// Index of the accelerator the encoder runs on when `metal` or `cuda` is enabled.
pub const DEVICE_ORDINAL: usize = 0;

/// Device the encoder runs on.
///
/// Chosen by the `metal` / `cuda` cargo features. If the requested accelerator
/// can't be opened, the encoder runs on the CPU instead.
pub static DEVICE: Lazy<Device> = Lazy::new(select_device);

#[cfg(feature = "metal")]
fn select_device() -> Device {
    Device::new_metal(DEVICE_ORDINAL).unwrap_or_else(|err| {
        tracing::warn!("Metal device {DEVICE_ORDINAL} unavailable, falling back to CPU: {err}");
        Device::Cpu
    })
}

#[cfg(feature = "cuda")]
fn select_device() -> Device {
    Device::new_cuda(DEVICE_ORDINAL).unwrap_or_else(|err| {
        tracing::warn!("CUDA device {DEVICE_ORDINAL} unavailable, falling back to CPU: {err}");
        Device::Cpu
    })
}

#[cfg(not(any(feature = "metal", feature = "cuda")))]
fn select_device() -> Device {
    Device::Cpu
}

/// Human readable name of `device`, e.g. `cpu`, `cuda:0`.
pub fn device_description(device: &Device) -> String {
    match device {
        Device::Cpu if cfg!(feature = "accelerate") => "cpu (accelerate)".to_string(),
        Device::Cpu => "cpu".to_string(),
        Device::Cuda(_) => format!("cuda:{DEVICE_ORDINAL}"),
        Device::Metal(_) => format!("metal:{DEVICE_ORDINAL}"),
    }
}

/// Log the device sentence encoders are placed on.
pub fn print_device_info() {
    tracing::info!(device = %device_description(&DEVICE), "Selected inference device");
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_device_description() {
        let description = device_description(&Device::Cpu);
        assert!(description.starts_with("cpu"), "{description}");
    }

    #[cfg(not(any(feature = "metal", feature = "cuda")))]
    #[test]
    fn test_default_device_is_cpu() {
        assert!(DEVICE.is_cpu());
        assert_eq!(device_description(&DEVICE), device_description(&Device::Cpu));
    }
}
