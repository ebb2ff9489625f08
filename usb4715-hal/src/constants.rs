/// USB vendor ID of the USB4715 (Microchip, formerly SMSC).
pub(crate) const MICROCHIP_VID: u16 = 0x0424;
/// USB product ID of the USB4715 hub controller function.
pub(crate) const USB4715_PID: u16 = 0x494C;

/// Base of the memory-mapped register bank as seen over the control interface.
pub(crate) const REGISTER_BASE: u32 = 0xBF80_0000;

/// Vendor request: write a register.
pub(crate) const CMD_REG_WRITE: u8 = 0x03;
/// Vendor request: read a register.
pub(crate) const CMD_REG_READ: u8 = 0x04;
/// Vendor request: put the hub's I2C master into pass-through mode.
pub(crate) const CMD_I2C_ENTER: u8 = 0x70;

/// Number of bytes held by each bridge transmit/receive buffer.
pub(crate) const BRIDGE_BUFFER_LEN: usize = 32;
