use postcard::{from_bytes, to_slice};
use strum::EnumCount;

use crate::{
    advance_table::AdvanceTable,
    crc::crc32_ieee,
    ignition_hal::{TableError, TableRef, TableService, TableSlot},
};

pub const TABLE_PAGE_SIZE: usize = 4096;

const LEN_SIZE: usize = 2;
const CRC_SIZE: usize = 4;
const MAX_PAYLOAD_SIZE: usize = TABLE_PAGE_SIZE - LEN_SIZE - CRC_SIZE;
const ERASED_LEN: u16 = 0xFFFF;

/// Calibration tables kept one per flash page.
///
/// Page layout is `[len: u16 LE][postcard payload][crc32: u32 LE]` with the
/// CRC taken over the payload only. Erased pages read back as 0xFF.
pub struct FlashTableStore {
    pages: [[u8; TABLE_PAGE_SIZE]; TableSlot::COUNT],
}

impl FlashTableStore {
    pub fn new() -> Self {
        Self {
            pages: [[0xFF; TABLE_PAGE_SIZE]; TableSlot::COUNT],
        }
    }

    pub fn write_table(&mut self, slot: TableSlot, table: &AdvanceTable) -> Result<(), TableError> {
        let mut payload = [0u8; MAX_PAYLOAD_SIZE];
        let len = Self::encode(table, &mut payload)?;
        let crc = crc32_ieee(&payload[..len]);

        let page = &mut self.pages[slot.index()];
        page[..LEN_SIZE].copy_from_slice(&(len as u16).to_le_bytes());
        page[LEN_SIZE..LEN_SIZE + len].copy_from_slice(&payload[..len]);
        page[LEN_SIZE + len..LEN_SIZE + len + CRC_SIZE].copy_from_slice(&crc.to_le_bytes());

        Ok(())
    }

    pub fn erase(&mut self, slot: TableSlot) {
        self.pages[slot.index()] = [0xFF; TABLE_PAGE_SIZE];
    }

    pub fn page(&self, slot: TableSlot) -> &[u8; TABLE_PAGE_SIZE] {
        &self.pages[slot.index()]
    }

    /// Raw page access for flashing tools.
    pub fn page_mut(&mut self, slot: TableSlot) -> &mut [u8; TABLE_PAGE_SIZE] {
        &mut self.pages[slot.index()]
    }

    fn payload(&self, slot: TableSlot) -> Result<(&[u8], u32), TableError> {
        let page = &self.pages[slot.index()];
        let len = u16::from_le_bytes([page[0], page[1]]);

        if len == ERASED_LEN || len == 0 {
            return Err(TableError::EmptySlot);
        }

        let len = len as usize;
        if len > MAX_PAYLOAD_SIZE {
            return Err(TableError::PageTooSmall);
        }

        let payload = &page[LEN_SIZE..LEN_SIZE + len];
        let crc_bytes = &page[LEN_SIZE + len..LEN_SIZE + len + CRC_SIZE];
        let stored_crc = u32::from_le_bytes([crc_bytes[0], crc_bytes[1], crc_bytes[2], crc_bytes[3]]);

        Ok((payload, stored_crc))
    }

    fn encode(table: &AdvanceTable, buffer: &mut [u8]) -> Result<usize, TableError> {
        match to_slice(table, buffer) {
            Ok(encoded) => Ok(encoded.len()),
            Err(postcard::Error::SerializeBufferFull) => Err(TableError::PageTooSmall),
            Err(_) => Err(TableError::Encoding),
        }
    }
}

impl Default for FlashTableStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TableService for FlashTableStore {
    fn load_table(&self, reference: TableRef) -> Result<AdvanceTable, TableError> {
        let (payload, _) = self.payload(reference.slot)?;
        let table: AdvanceTable = from_bytes(payload).map_err(|_| TableError::Decoding)?;
        table.verify_shape().map_err(TableError::Shape)?;

        Ok(table)
    }

    fn validate(&self, reference: TableRef, table: &AdvanceTable) -> bool {
        let Ok((_, stored_crc)) = self.payload(reference.slot) else {
            return false;
        };

        let mut scratch = [0u8; MAX_PAYLOAD_SIZE];
        match Self::encode(table, &mut scratch) {
            Ok(len) => crc32_ieee(&scratch[..len]) == stored_crc,
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ignition_hal::IGNITION_TABLE_REF;

    fn fixture_table() -> AdvanceTable {
        AdvanceTable::new(
            &[0, 50, 100],
            &[1000, 3000, 5000],
            &[[160, 200, 260], [150, 190, 250], [140, 180, 240]],
        )
        .unwrap()
    }

    #[test]
    fn test_written_table_loads_and_validates() {
        let mut store = FlashTableStore::new();
        let table = fixture_table();
        store.write_table(TableSlot::IgnitionTpsRpm, &table).unwrap();

        let loaded = store.load_table(IGNITION_TABLE_REF).unwrap();
        assert_eq!(loaded, table);
        assert!(store.validate(IGNITION_TABLE_REF, &loaded));
    }

    #[test]
    fn test_erased_slot() {
        let store = FlashTableStore::new();

        assert_eq!(store.load_table(IGNITION_TABLE_REF), Err(TableError::EmptySlot));
        assert!(!store.validate(IGNITION_TABLE_REF, &fixture_table()));
    }

    #[test]
    fn test_crc_detects_corruption() {
        let mut store = FlashTableStore::new();
        store.write_table(TableSlot::IgnitionTpsRpm, &fixture_table()).unwrap();

        // Flip a bit in the stored CRC, the payload still decodes
        let page = store.page(TableSlot::IgnitionTpsRpm);
        let len = u16::from_le_bytes([page[0], page[1]]) as usize;
        store.page_mut(TableSlot::IgnitionTpsRpm)[LEN_SIZE + len] ^= 0x01;

        let loaded = store.load_table(IGNITION_TABLE_REF).unwrap();
        assert!(!store.validate(IGNITION_TABLE_REF, &loaded));
    }

    #[test]
    fn test_validate_rejects_other_table() {
        let mut store = FlashTableStore::new();
        store.write_table(TableSlot::IgnitionTpsRpm, &fixture_table()).unwrap();

        let other = AdvanceTable::new(&[0, 50], &[1000], &[[120], [130]]).unwrap();
        assert!(!store.validate(IGNITION_TABLE_REF, &other));
    }

    #[test]
    fn test_slots_are_independent() {
        let mut store = FlashTableStore::new();
        store.write_table(TableSlot::IgnitionMapRpm, &fixture_table()).unwrap();

        assert_eq!(store.load_table(IGNITION_TABLE_REF), Err(TableError::EmptySlot));

        store.erase(TableSlot::IgnitionMapRpm);
        let map_ref = TableRef {
            slot: TableSlot::IgnitionMapRpm,
            ..IGNITION_TABLE_REF
        };
        assert_eq!(store.load_table(map_ref), Err(TableError::EmptySlot));
    }
}
