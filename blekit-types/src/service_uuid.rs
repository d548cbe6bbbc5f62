//! GATT service and characteristic UUIDs

use uuid::Uuid;

use crate::error::{Error, Result};

/// Length of the canonical textual form, `8-4-4-4-12` hex digits with hyphens
pub const CANONICAL_LEN: usize = 36;

/// Bluetooth base UUID, `00000000-0000-1000-8000-00805f9b34fb`
pub const BLUETOOTH_BASE_UUID: u128 = 0x0000_0000_0000_1000_8000_0080_5f9b_34fb;

/// Parse a UUID in canonical hyphenated form.
///
/// Only the 36 character `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx` spelling is
/// accepted. Hex digits may be upper or lower case.
///
/// # Examples
///
/// ```
/// use blekit_types::parse_service_uuid;
///
/// assert!(parse_service_uuid("0000180f-0000-1000-8000-00805f9b34fb").is_ok());
/// assert!(parse_service_uuid("not-a-uuid").is_err());
/// assert!(parse_service_uuid("0000180f00001000800000805f9b34fb").is_err());
/// ```
pub fn parse_service_uuid(value: &str) -> Result<Uuid> {
    // uuid also accepts the simple, braced and urn forms, none of which are 36 chars
    if value.len() != CANONICAL_LEN {
        return Err(Error::InvalidUuid(value.to_string()));
    }

    Uuid::try_parse(value).map_err(|_| Error::InvalidUuid(value.to_string()))
}

/// Check whether `value` is a UUID in canonical hyphenated form
pub fn is_valid(value: &str) -> bool {
    parse_service_uuid(value).is_ok()
}

/// Expand a 16-bit SIG assigned number onto the Bluetooth base UUID
///
/// # Examples
///
/// ```
/// use blekit_types::from_short;
///
/// assert_eq!(
///     from_short(0x180F).to_string(),
///     "0000180f-0000-1000-8000-00805f9b34fb"
/// );
/// ```
pub fn from_short(assigned_number: u16) -> Uuid {
    Uuid::from_u128(BLUETOOTH_BASE_UUID | ((assigned_number as u128) << 96))
}

/// Compare two textual UUIDs the way the registry keys them.
///
/// Returns `false` if either side is not a canonical UUID.
pub fn same_uuid(a: &str, b: &str) -> bool {
    match (parse_service_uuid(a), parse_service_uuid(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
