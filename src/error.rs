use thiserror::Error;

pub type Result<T> = std::result::Result<T, DatError>;

#[derive(Debug, Error)]
pub enum DatError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("frame too short: {len} bytes")]
    TooShort { len: usize },

    #[error("declared length ({declared}) is not equal to number of bytes read ({actual})")]
    LengthMismatch { declared: u8, actual: usize },

    #[error("not a GPS packet type: {0:#06x}")]
    WrongPacketType(u16),

    #[error("reserved byte is not 0x00: {0:#04x}")]
    WrongReservedByte(u8),

    #[error("no packets found in input")]
    NoPacketsFound,
}
