//! Bluetooth adapter error types.
//!
//! These only surface during startup probing and discovery; link-level
//! call failures are degraded to a logged `false` inside the backend.

use homelite_domain::error::HubError;

/// Errors specific to the Bluetooth backend.
#[derive(Debug, thiserror::Error)]
pub enum BluetoothError {
    /// No native Bluetooth adapter found on the host.
    #[error("no usable Bluetooth adapter")]
    NotAvailable,

    /// btleplug scan or adapter operation failed.
    #[error("native Bluetooth error")]
    Native(#[from] btleplug::Error),

    /// The `bluetoothctl` subprocess could not be spawned or awaited.
    #[error("failed to run bluetoothctl")]
    CommandIo(#[source] std::io::Error),
}

impl From<BluetoothError> for HubError {
    fn from(err: BluetoothError) -> Self {
        HubError::Backend(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_not_available_error() {
        assert_eq!(
            BluetoothError::NotAvailable.to_string(),
            "no usable Bluetooth adapter"
        );
    }

    #[test]
    fn should_convert_into_backend_hub_error() {
        let err: HubError = BluetoothError::NotAvailable.into();
        assert!(matches!(err, HubError::Backend(_)));
    }

    #[test]
    fn should_wrap_io_error_from_command() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = BluetoothError::CommandIo(io);
        assert_eq!(err.to_string(), "failed to run bluetoothctl");
    }
}
