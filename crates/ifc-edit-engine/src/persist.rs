// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Two-phase save
//!
//! A [`SaveTransaction`] writes a backup copy first and only touches the
//! canonical file once that backup has been verified on disk.

use crate::error::PersistenceError;
use crate::options::EngineOptions;
use ifc_edit_model::ModelStore;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SaveState {
    Pending,
    BackedUp,
    Committed,
    Aborted,
}

/// Paths written by a successful save
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveReport {
    pub canonical: PathBuf,
    pub backup: PathBuf,
}

/// Write intent for one save
#[derive(Debug)]
pub struct SaveTransaction {
    canonical: PathBuf,
    backup: PathBuf,
    state: SaveState,
}

impl SaveTransaction {
    /// Start a save of `path`; the backup goes to `path` + backup suffix
    pub fn begin(path: impl AsRef<Path>, options: &EngineOptions) -> Self {
        let canonical = path.as_ref().to_path_buf();
        let mut backup = canonical.clone().into_os_string();
        backup.push(&options.backup_suffix);
        Self {
            canonical,
            backup: PathBuf::from(backup),
            state: SaveState::Pending,
        }
    }

    pub fn canonical_path(&self) -> &Path {
        &self.canonical
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup
    }

    /// Phase one: write and verify the backup copy
    pub fn materialize_backup<S: ModelStore + ?Sized>(
        &mut self,
        store: &S,
    ) -> Result<(), PersistenceError> {
        store
            .write(&self.backup)
            .map_err(|source| PersistenceError::Backup {
                path: self.backup.clone(),
                source,
            })?;

        let written = fs::metadata(&self.backup)
            .map(|meta| meta.is_file() && meta.len() > 0)
            .unwrap_or(false);
        if !written {
            return Err(PersistenceError::Verification(self.backup.clone()));
        }

        log::debug!("Backup written to {}", self.backup.display());
        self.state = SaveState::BackedUp;
        Ok(())
    }

    /// Phase two: overwrite the canonical file
    pub fn commit<S: ModelStore + ?Sized>(
        mut self,
        store: &S,
    ) -> Result<SaveReport, PersistenceError> {
        if self.state != SaveState::BackedUp {
            return Err(PersistenceError::NotBackedUp);
        }

        store
            .write(&self.canonical)
            .map_err(|source| PersistenceError::Canonical {
                path: self.canonical.clone(),
                backup: self.backup.clone(),
                source,
            })?;

        self.state = SaveState::Committed;
        log::info!("Saved {}", self.canonical.display());
        Ok(SaveReport {
            canonical: self.canonical.clone(),
            backup: self.backup.clone(),
        })
    }

    /// Give up; whatever backup exists stays on disk
    pub fn abort(mut self) {
        self.state = SaveState::Aborted;
        log::info!("Save of {} aborted", self.canonical.display());
    }
}

impl Drop for SaveTransaction {
    fn drop(&mut self) {
        match self.state {
            SaveState::Pending => {
                log::warn!("Save of {} ended before a backup was written", self.canonical.display())
            }
            SaveState::BackedUp => log::warn!(
                "Save of {} not committed, backup left at {}",
                self.canonical.display(),
                self.backup.display()
            ),
            SaveState::Committed | SaveState::Aborted => {}
        }
    }
}

/// Backup, then overwrite `path`
pub fn persist<S: ModelStore + ?Sized>(
    store: &S,
    path: impl AsRef<Path>,
    options: &EngineOptions,
) -> Result<SaveReport, PersistenceError> {
    let mut transaction = SaveTransaction::begin(path, options);
    transaction.materialize_backup(store)?;
    transaction.commit(store)
}
