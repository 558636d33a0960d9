//! Repository for the contact message collection.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rioframe_core::types::new_record_id;

use crate::models::contact::{Contact, CreateContact};
use crate::store::{JsonStore, StoreError};
use crate::CONTACTS_FILE;

#[derive(Debug)]
pub struct ContactRepo {
    store: JsonStore<Contact>,
}

impl ContactRepo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            store: JsonStore::new(path),
        }
    }

    pub fn open(data_dir: &Path) -> Self {
        Self::new(data_dir.join(CONTACTS_FILE))
    }

    /// Store a new, unread message.
    pub async fn create(&self, input: &CreateContact) -> Result<Contact, StoreError> {
        let contact = Contact {
            id: new_record_id(),
            name: input.name.clone(),
            phone: input.phone.clone(),
            message: input.message.clone(),
            created_at: Utc::now(),
            is_read: false,
        };
        self.store
            .mutate(|items| {
                items.push(contact.clone());
                Some(())
            })
            .await?;
        Ok(contact)
    }

    /// All messages, newest first.
    pub async fn list(&self) -> Result<Vec<Contact>, StoreError> {
        let mut contacts = self.store.load().await?;
        contacts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(contacts)
    }

    /// Mark a message as read. Returns `None` if it does not exist.
    pub async fn mark_read(&self, id: &str) -> Result<Option<Contact>, StoreError> {
        self.store
            .mutate(|items| {
                let contact = items.iter_mut().find(|c| c.id == id)?;
                contact.is_read = true;
                Some(contact.clone())
            })
            .await
    }

    /// Delete a message. Returns `true` if one was removed.
    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let removed = self
            .store
            .mutate(|items| {
                let index = items.iter().position(|c| c.id == id)?;
                items.remove(index);
                Some(())
            })
            .await?;
        Ok(removed.is_some())
    }
}
