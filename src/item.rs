//! Sealed items and their display views
//!
//! An item is a single user-owned value. It is only ever persisted in sealed
//! form; callers that display items go through [`ItemView`], which opens the
//! value and substitutes `None` when a record cannot be opened so that one
//! corrupted row never blocks a listing.

use crate::cipher::FieldCipher;
use crate::error::Result;
use crate::owner::OwnerId;
use serde::Serialize;

/// The persisted form of an item. `data` always holds a blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedItem {
    /// Storage id, absent until the storage layer assigns one.
    pub id: Option<u64>,
    pub owner: OwnerId,
    pub data: String,
}

impl SealedItem {
    /// Seal a new item's plaintext for `owner`.
    pub fn seal(
        cipher: &FieldCipher,
        id: Option<u64>,
        owner: OwnerId,
        plaintext: &str,
    ) -> Result<Self> {
        let data = cipher.encrypt_str(&owner, plaintext)?;
        Ok(Self { id, owner, data })
    }

    /// Replace the item's value with a fresh blob of `plaintext`.
    ///
    /// On failure the existing blob is left untouched.
    pub fn reseal(&mut self, cipher: &FieldCipher, plaintext: &str) -> Result<()> {
        self.data = cipher
            .encrypt_str(&self.owner, plaintext)
            .map_err(|e| e.with_context("unable to encrypt item data"))?;
        Ok(())
    }

    /// Open the item's value, propagating any failure.
    pub fn open(&self, cipher: &FieldCipher) -> Result<String> {
        cipher.decrypt_string(&self.owner, &self.data)
    }
}

/// What readers see of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemView {
    pub id: Option<u64>,
    /// `None` when the stored blob could not be opened.
    pub data: Option<String>,
}

impl ItemView {
    pub fn from_sealed(cipher: &FieldCipher, item: &SealedItem) -> Self {
        let data = match item.open(cipher) {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::warn!(item_id = ?item.id, error = %e, "item data unreadable, showing as empty");
                None
            }
        };
        Self { id: item.id, data }
    }

    /// Views for a whole listing, in input order.
    pub fn list<'a>(
        cipher: &FieldCipher,
        items: impl IntoIterator<Item = &'a SealedItem>,
    ) -> Vec<Self> {
        items
            .into_iter()
            .map(|item| Self::from_sealed(cipher, item))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyMode;

    #[test]
    fn test_seal_and_view() {
        let cipher = FieldCipher::default();
        let item = SealedItem::seal(&cipher, Some(1), OwnerId::from(42u64), "Some text").unwrap();

        assert_ne!(item.data, "Some text");
        let view = ItemView::from_sealed(&cipher, &item);
        assert_eq!(
            view,
            ItemView {
                id: Some(1),
                data: Some("Some text".to_string()),
            }
        );
    }

    #[test]
    fn test_reseal_replaces_data() {
        let cipher = FieldCipher::default();
        let mut item = SealedItem::seal(&cipher, Some(3), OwnerId::from(5u64), "before").unwrap();
        let old_blob = item.data.clone();

        item.reseal(&cipher, "after").unwrap();

        assert_ne!(item.data, old_blob);
        assert_eq!(item.open(&cipher).unwrap(), "after");
    }

    #[test]
    fn test_corrupted_item_shows_null() {
        let cipher = FieldCipher::default();
        let mut item = SealedItem::seal(&cipher, Some(2), OwnerId::from(42u64), "some text").unwrap();
        item.data.remove(0);

        let view = ItemView::from_sealed(&cipher, &item);
        assert_eq!(view.id, Some(2));
        assert_eq!(view.data, None);
        assert_eq!(
            serde_json::to_string(&view).unwrap(),
            r#"{"id":2,"data":null}"#
        );
    }

    #[test]
    fn test_listing_survives_bad_record() {
        let cipher = FieldCipher::new(KeyMode::Split);
        let good = SealedItem::seal(&cipher, Some(1), OwnerId::from(1u64), "one").unwrap();
        let mut foreign = SealedItem::seal(&cipher, Some(2), OwnerId::from(2u64), "two").unwrap();
        // Blob moved to another owner's row.
        foreign.owner = OwnerId::from(1u64);
        let also_good = SealedItem::seal(&cipher, Some(3), OwnerId::from(1u64), "three").unwrap();

        let views = ItemView::list(&cipher, [&good, &foreign, &also_good]);

        let data: Vec<_> = views.iter().map(|v| v.data.as_deref()).collect();
        assert_eq!(data, vec![Some("one"), None, Some("three")]);
    }
}
