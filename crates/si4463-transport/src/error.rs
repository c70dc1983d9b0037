/// Errors that can occur in serial transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the serial port.
    #[error("failed to open {port}: {source}")]
    Open {
        port: String,
        source: serialport::Error,
    },

    /// Failed to apply a setting to an open port.
    #[error("failed to configure serial port: {0}")]
    Configure(serialport::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;

impl TransportError {
    /// The OS error kind behind this failure, if there is one.
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            TransportError::Open { source, .. } | TransportError::Configure(source) => {
                match source.kind() {
                    serialport::ErrorKind::Io(kind) => Some(kind),
                    _ => None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn io_kind_sees_through_serialport_errors() {
        let err = TransportError::Open {
            port: "/dev/ttyUSB9".to_string(),
            source: serialport::Error::new(
                serialport::ErrorKind::Io(io::ErrorKind::PermissionDenied),
                "denied",
            ),
        };
        assert_eq!(err.io_kind(), Some(io::ErrorKind::PermissionDenied));

        let err = TransportError::Configure(serialport::Error::new(
            serialport::ErrorKind::NoDevice,
            "gone",
        ));
        assert_eq!(err.io_kind(), None);
    }
}
