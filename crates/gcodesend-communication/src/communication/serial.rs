//! Serial port communication implementation
//!
//! Provides the serial side of the link for direct hardware connection
//! to printer and CNC firmware via USB or RS-232.
//!
//! Supports:
//! - Port enumeration and discovery
//! - Baud rate configuration
//! - Flow control settings
//! - Parity and stop bit configuration
//! - Blocking reads bounded by the link read timeout

use super::{Channel, ConnectionParams, LineLink, SerialParity};
use gcodesend_core::{ConnectionError, Error, Result};
use std::io;
use std::time::Duration;

/// Line link over a native serial port
pub type SerialLink = LineLink<Box<dyn serialport::SerialPort>>;

impl Channel for Box<dyn serialport::SerialPort> {
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        self.set_timeout(timeout).map_err(io::Error::from)
    }
}

/// Information about an available serial port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialPortInfo {
    /// Port name (e.g., "/dev/ttyUSB0", "COM3")
    pub port_name: String,

    /// Port description (e.g., "USB Serial Port")
    pub description: String,

    /// Manufacturer name if available
    pub manufacturer: Option<String>,

    /// Serial number if available
    pub serial_number: Option<String>,

    /// USB vendor ID if applicable
    pub vid: Option<u16>,

    /// USB product ID if applicable
    pub pid: Option<u16>,
}

impl SerialPortInfo {
    /// Create a new port info
    pub fn new(port_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            description: description.into(),
            manufacturer: None,
            serial_number: None,
            vid: None,
            pid: None,
        }
    }

    /// Set manufacturer
    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    /// Set serial number
    pub fn with_serial_number(mut self, serial_number: impl Into<String>) -> Self {
        self.serial_number = Some(serial_number.into());
        self
    }

    /// Set USB IDs
    pub fn with_usb_ids(mut self, vid: u16, pid: u16) -> Self {
        self.vid = Some(vid);
        self.pid = Some(pid);
        self
    }
}

impl std::fmt::Display for SerialPortInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.port_name, self.description)?;
        if let (Some(vid), Some(pid)) = (self.vid, self.pid) {
            write!(f, " [{:04x}:{:04x}]", vid, pid)?;
        }
        if let Some(serial) = &self.serial_number {
            write!(f, " s/n {}", serial)?;
        }
        Ok(())
    }
}

/// List serial ports that look like printer or CNC controllers
///
/// Filters ports to include only controller patterns:
/// - Windows: COM* (e.g., COM1, COM3)
/// - Linux: /dev/ttyUSB*, /dev/ttyACM*
/// - macOS: /dev/cu.usbserial-*, /dev/cu.usbmodem*
pub fn list_ports() -> Result<Vec<SerialPortInfo>> {
    let ports = serialport::available_ports().map_err(|e| {
        tracing::error!("Failed to enumerate serial ports: {}", e);
        ConnectionError::SerialError {
            reason: format!("Failed to enumerate ports: {}", e),
        }
    })?;

    Ok(ports
        .iter()
        .filter(|port| is_device_port(&port.port_name))
        .map(|port| {
            let info = SerialPortInfo::new(&port.port_name, get_port_description(port));

            match &port.port_type {
                serialport::SerialPortType::UsbPort(usb_info) => {
                    let mut info = info.with_usb_ids(usb_info.vid, usb_info.pid);
                    if let Some(ref mfg) = usb_info.manufacturer {
                        info = info.with_manufacturer(mfg);
                    }
                    if let Some(ref serial) = usb_info.serial_number {
                        info = info.with_serial_number(serial);
                    }
                    info
                }
                _ => info,
            }
        })
        .collect())
}

/// Check if a port name matches a USB/serial controller pattern
fn is_device_port(port_name: &str) -> bool {
    if let Some(number) = port_name.strip_prefix("COM") {
        return !number.is_empty() && number.chars().all(|c| c.is_ascii_digit());
    }

    port_name.starts_with("/dev/ttyUSB")
        || port_name.starts_with("/dev/ttyACM")
        || port_name.starts_with("/dev/cu.usbserial-")
        || port_name.starts_with("/dev/cu.usbmodem")
}

/// Get a user-friendly description for a port
fn get_port_description(port: &serialport::SerialPortInfo) -> String {
    match &port.port_type {
        serialport::SerialPortType::UsbPort(usb_info) => {
            format!(
                "USB {} {}",
                usb_info.manufacturer.as_deref().unwrap_or("Device"),
                usb_info.product.as_deref().unwrap_or("Serial Port")
            )
        }
        serialport::SerialPortType::BluetoothPort => "Bluetooth Serial".to_string(),
        serialport::SerialPortType::PciPort => "PCI Serial".to_string(),
        _ => "Serial Port".to_string(),
    }
}

/// Convert a parity setting to serialport format
fn to_serialport_parity(parity: SerialParity) -> serialport::Parity {
    match parity {
        SerialParity::None => serialport::Parity::None,
        SerialParity::Even => serialport::Parity::Even,
        SerialParity::Odd => serialport::Parity::Odd,
    }
}

fn to_serialport_data_bits(data_bits: u8) -> Result<serialport::DataBits> {
    match data_bits {
        5 => Ok(serialport::DataBits::Five),
        6 => Ok(serialport::DataBits::Six),
        7 => Ok(serialport::DataBits::Seven),
        8 => Ok(serialport::DataBits::Eight),
        _ => Err(ConnectionError::InvalidParameters {
            reason: format!("Invalid data bits: {}", data_bits),
        }
        .into()),
    }
}

fn to_serialport_stop_bits(stop_bits: u8) -> Result<serialport::StopBits> {
    match stop_bits {
        1 => Ok(serialport::StopBits::One),
        2 => Ok(serialport::StopBits::Two),
        _ => Err(ConnectionError::InvalidParameters {
            reason: format!("Invalid stop bits: {}", stop_bits),
        }
        .into()),
    }
}

/// Open a serial port and wrap it in a line link
///
/// The link narrows the port's read timeout to whatever is left of the line
/// deadline, so every `read_line` returns within `params.timeout_ms`.
pub fn open_serial(params: &ConnectionParams) -> Result<SerialLink> {
    if params.port.is_empty() {
        return Err(ConnectionError::InvalidParameters {
            reason: "No port given".to_string(),
        }
        .into());
    }
    if params.timeout_ms == 0 {
        return Err(ConnectionError::InvalidParameters {
            reason: "Read timeout must be > 0".to_string(),
        }
        .into());
    }

    let builder = serialport::new(&params.port, params.baud_rate)
        .timeout(params.timeout())
        .data_bits(to_serialport_data_bits(params.data_bits)?)
        .stop_bits(to_serialport_stop_bits(params.stop_bits)?)
        .parity(to_serialport_parity(params.parity))
        .flow_control(if params.flow_control {
            serialport::FlowControl::Hardware
        } else {
            serialport::FlowControl::None
        });

    match builder.open() {
        Ok(port) => {
            tracing::info!(
                "Opened serial port {} at {} baud",
                params.port,
                params.baud_rate
            );
            Ok(LineLink::new(port, params.port.clone(), params.timeout()))
        }
        Err(e) => {
            tracing::warn!("Failed to open serial port {}: {}", params.port, e);
            Err(Error::from(ConnectionError::FailedToOpen {
                port: params.port.clone(),
                reason: e.to_string(),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_port_patterns() {
        assert!(is_device_port("COM3"));
        assert!(is_device_port("COM12"));
        assert!(!is_device_port("COM"));
        assert!(!is_device_port("COMX"));
        assert!(is_device_port("/dev/ttyUSB0"));
        assert!(is_device_port("/dev/ttyACM1"));
        assert!(is_device_port("/dev/cu.usbmodem14101"));
        assert!(is_device_port("/dev/cu.usbserial-A50285BI"));
        assert!(!is_device_port("/dev/ttyS0"));
        assert!(!is_device_port("/dev/cu.Bluetooth-Incoming-Port"));
    }

    #[test]
    fn test_port_info_display() {
        let info = SerialPortInfo::new("/dev/ttyACM0", "USB Prusa Original Prusa i3")
            .with_usb_ids(0x2c99, 0x0002)
            .with_serial_number("CZPX1234");
        assert_eq!(
            info.to_string(),
            "/dev/ttyACM0 (USB Prusa Original Prusa i3) [2c99:0002] s/n CZPX1234"
        );
    }

    #[test]
    fn test_invalid_line_settings() {
        assert!(to_serialport_data_bits(9).is_err());
        assert!(to_serialport_stop_bits(3).is_err());
        assert_eq!(
            to_serialport_parity(SerialParity::Even),
            serialport::Parity::Even
        );
    }

    #[test]
    fn test_open_rejects_empty_port() {
        let err = open_serial(&ConnectionParams::default()).unwrap_err();
        assert!(err.is_connection_error());
    }

    #[test]
    fn test_open_missing_port_fails() {
        let params = ConnectionParams::serial("/dev/gcodesend-does-not-exist");
        let err = open_serial(&params).unwrap_err();
        assert!(matches!(
            err,
            Error::Connection(ConnectionError::FailedToOpen { .. })
        ));
    }
}
