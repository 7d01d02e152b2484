//! Sensor information structures

use std::fmt;
use std::io::Cursor;

use bitflags::bitflags;
use byteorder::{BigEndian, ReadBytesExt};

use crate::error::{Error, Result};

bitflags! {
    /// Status register bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StatusFlags: u16 {
        /// Module is executing a command
        const BUSY = 1 << 0;
        /// Last match succeeded
        const PASS = 1 << 1;
        /// Handshake password verified
        const PASSWORD = 1 << 2;
        /// Image buffer holds a valid image
        const IMAGE_BUFFER = 1 << 3;
    }
}

/// Basic module parameters, as returned by `ReadSysPara`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemParameters {
    pub status: StatusFlags,
    pub system_id: u16,

    /// Template library capacity
    pub capacity: u16,

    /// Match threshold, 1 (lenient) to 5 (strict)
    pub security_level: u16,
    pub address: u32,

    /// Data packet size in bytes
    pub packet_size: u16,

    /// UART baud rate
    pub baud_rate: u32,
}

impl SystemParameters {
    /// Size of the parameter block
    pub const SIZE: usize = 16;

    /// Parse the block that follows the confirmation code
    ///
    /// # Examples
    ///
    /// ```
    /// use fpsensor_types::SystemParameters;
    ///
    /// let block = [
    ///     0x00, 0x04, 0x00, 0x00, 0x00, 0xA3, 0x00, 0x03,
    ///     0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x02, 0x00, 0x06,
    /// ];
    /// let params = SystemParameters::parse(&block).unwrap();
    /// assert_eq!(params.capacity, 163);
    /// assert_eq!(params.packet_size, 128);
    /// assert_eq!(params.baud_rate, 57600);
    /// ```
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(Error::Parse(format!(
                "system parameters need {} bytes, got {}",
                Self::SIZE,
                bytes.len()
            )));
        }

        let mut cursor = Cursor::new(bytes);
        let read_err = |e: std::io::Error| Error::Parse(e.to_string());

        let status = cursor.read_u16::<BigEndian>().map_err(read_err)?;
        let system_id = cursor.read_u16::<BigEndian>().map_err(read_err)?;
        let capacity = cursor.read_u16::<BigEndian>().map_err(read_err)?;
        let security_level = cursor.read_u16::<BigEndian>().map_err(read_err)?;
        let address = cursor.read_u32::<BigEndian>().map_err(read_err)?;
        let size_code = cursor.read_u16::<BigEndian>().map_err(read_err)?;
        let baud_code = cursor.read_u16::<BigEndian>().map_err(read_err)?;

        if size_code > 3 {
            return Err(Error::Parse(format!("unknown packet size code {}", size_code)));
        }

        Ok(Self {
            status: StatusFlags::from_bits_truncate(status),
            system_id,
            capacity,
            security_level,
            address,
            packet_size: 32 << size_code,
            baud_rate: u32::from(baud_code) * 9600,
        })
    }
}

/// Module parameters plus library occupancy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorInfo {
    pub parameters: SystemParameters,

    /// Number of templates stored on the module
    pub template_count: u16,
}

impl SensorInfo {
    pub fn new(parameters: SystemParameters, template_count: u16) -> Self {
        Self {
            parameters,
            template_count,
        }
    }

    /// Free library positions
    pub fn free_slots(&self) -> u16 {
        self.parameters.capacity.saturating_sub(self.template_count)
    }
}

impl fmt::Display for SensorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sensor[addr: {:08X}, templates: {}/{}, security: {}, baud: {}]",
            self.parameters.address,
            self.template_count,
            self.parameters.capacity,
            self.parameters.security_level,
            self.parameters.baud_rate
        )
    }
}
