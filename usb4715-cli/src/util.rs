use std::num::ParseIntError;

fn strip_hex_prefix(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

pub(crate) fn u8_from_hex(value: &str) -> Result<u8, ParseIntError> {
    u8::from_str_radix(strip_hex_prefix(value), 16)
}

pub(crate) fn u16_from_hex(value: &str) -> Result<u16, ParseIntError> {
    u16::from_str_radix(strip_hex_prefix(value), 16)
}

/// Decimal, or hexadecimal with a `0x` prefix.
pub(crate) fn u32_from_int(value: &str) -> Result<u32, ParseIntError> {
    let stripped = strip_hex_prefix(value);
    if stripped.len() != value.len() {
        u32::from_str_radix(stripped, 16)
    } else {
        value.parse()
    }
}

/// A 7-bit I2C address in hexadecimal.
pub(crate) fn i2c_address(value: &str) -> Result<u8, String> {
    let address = u8_from_hex(value).map_err(|e| e.to_string())?;
    if address > 0x7F {
        return Err(format!("{address:#04X} is not a 7-bit address"));
    }
    Ok(address)
}

/// Print bytes as space-separated hex.
pub(crate) fn print_bytes(bytes: &[u8]) {
    let hex: Vec<String> = bytes.iter().map(|b| format!("{b:02X}")).collect();
    println!("{}", hex.join(" "));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_with_and_without_prefix() {
        assert_eq!(u16_from_hex("0x494C"), Ok(0x494C));
        assert_eq!(u16_from_hex("494c"), Ok(0x494C));
        assert_eq!(u8_from_hex("0XFF"), Ok(0xFF));
    }

    #[test]
    fn integers_default_to_decimal() {
        assert_eq!(u32_from_int("10"), Ok(10));
        assert_eq!(u32_from_int("0x10"), Ok(16));
    }

    #[test]
    fn i2c_addresses_are_seven_bit() {
        assert_eq!(i2c_address("40"), Ok(0x40));
        assert!(i2c_address("80").is_err());
    }
}
