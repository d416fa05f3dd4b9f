use candle_core::Device;
use tracing::info;

/// Pick the compute device once at model load.
pub fn select_device() -> Device {
    #[cfg(feature = "metal")]
    {
        if let Ok(dev) = Device::new_metal(0) {
            info!("device: Metal (MPS)");
            return dev;
        }
    }
    info!("device: CPU");
    Device::Cpu
}
