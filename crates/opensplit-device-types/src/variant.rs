//! Keyboard variant identity and USB id mapping

use serde::{Deserialize, Serialize};

/// USB vendor/product id pair as advertised by the right unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UsbId {
    pub vendor_id: u16,
    pub product_id: u16,
}

impl std::fmt::Display for UsbId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vendor_id, self.product_id)
    }
}

/// Supported keyboard variants.
///
/// The right unit is the USB-attached half; the left module is flashed
/// through it over the internal link. `device_id` is the match key used by
/// release-bundle manifests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceVariant {
    /// 60% split board
    Split60,
    /// 40% split board
    Split40,
}

// pid.codes shared open-hardware VID
const OPENSPLIT_VID: u16 = 0x1209;

impl DeviceVariant {
    /// Every variant, in manifest device-id order.
    pub const ALL: [DeviceVariant; 2] = [DeviceVariant::Split60, DeviceVariant::Split40];

    /// Manifest match key for this variant.
    pub fn device_id(self) -> u16 {
        match self {
            DeviceVariant::Split60 => 1,
            DeviceVariant::Split40 => 2,
        }
    }

    /// USB id the right unit enumerates with in normal operation.
    pub fn usb_id(self) -> UsbId {
        let product_id = match self {
            DeviceVariant::Split60 => 0x5360, // Split60 right unit
            DeviceVariant::Split40 => 0x5340, // Split40 right unit
        };
        UsbId {
            vendor_id: OPENSPLIT_VID,
            product_id,
        }
    }

    /// Map a scanned USB id back to a variant, `None` for foreign hardware.
    pub fn from_usb_id(vendor_id: u16, product_id: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|variant| {
            let id = variant.usb_id();
            id.vendor_id == vendor_id && id.product_id == product_id
        })
    }

    /// Conventional right-unit directory name inside release bundles.
    pub fn right_unit_name(self) -> &'static str {
        match self {
            DeviceVariant::Split60 => "split60-right",
            DeviceVariant::Split40 => "split40-right",
        }
    }

    /// Conventional left-module image stem inside release bundles.
    pub fn left_module_name(self) -> &'static str {
        match self {
            DeviceVariant::Split60 => "split60-left",
            DeviceVariant::Split40 => "split40-left",
        }
    }
}

impl std::fmt::Display for DeviceVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceVariant::Split60 => write!(f, "Split60"),
            DeviceVariant::Split40 => write!(f, "Split40"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_ids_are_unique() {
        let ids: Vec<u16> = DeviceVariant::ALL.iter().map(|v| v.device_id()).collect();
        let mut deduped = ids.clone();
        deduped.dedup();
        assert_eq!(ids, deduped);
    }

    #[test]
    fn usb_roundtrip() {
        for variant in DeviceVariant::ALL {
            let id = variant.usb_id();
            assert_eq!(
                DeviceVariant::from_usb_id(id.vendor_id, id.product_id),
                Some(variant)
            );
        }
    }

    #[test]
    fn foreign_usb_ids_are_rejected() {
        assert_eq!(DeviceVariant::from_usb_id(0x046d, 0xc24f), None);
        assert_eq!(DeviceVariant::from_usb_id(0x1209, 0xffff), None);
    }

    #[test]
    fn usb_id_formats_as_lower_hex() {
        let id = DeviceVariant::Split60.usb_id();
        assert_eq!(id.to_string(), "1209:5360");
    }
}
