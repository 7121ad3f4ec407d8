use std::path::Path;

use anyhow::{Context, Result};

use crate::api::{FileUpload, FilesSubmission};

/// Document types the backend can index.
pub const ACCEPTED_MIME_TYPES: [&str; 2] = ["application/pdf", "text/plain"];

pub const IGNORED_FILES_WARNING: &str = "Duplicate files and unsupported files have been ignored";

/// Guesses a MIME type from the file extension.
pub fn mime_for(name: &str) -> String {
    mime_guess::from_path(name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Reads a local file into an upload candidate.
pub async fn read_candidate(path: &Path) -> Result<FileUpload> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .with_context(|| format!("invalid file name: {}", path.display()))?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(FileUpload {
        mime: mime_for(&name),
        name,
        bytes,
    })
}

/// Result of one `stage_add` batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageReport {
    pub accepted: Vec<String>,
    pub unsupported: Vec<String>,
    pub duplicates: Vec<String>,
}

impl StageReport {
    /// One warning for the whole batch when anything was dropped.
    pub fn warning(&self) -> Option<&'static str> {
        if self.unsupported.is_empty() && self.duplicates.is_empty() {
            None
        } else {
            Some(IGNORED_FILES_WARNING)
        }
    }
}

/// A row of the numbered document list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedEntry {
    /// 1-based, continuous across existing and pending files.
    pub number: usize,
    pub name: String,
    pub pending: bool,
}

/// Document changes collected before a single save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileStaging {
    existing: Vec<String>,
    pending_adds: Vec<FileUpload>,
    pending_deletes: Vec<String>,
}

impl FileStaging {
    pub fn from_files(files: &[String]) -> Self {
        let mut staging = Self::default();
        staging.reset(files);
        staging
    }

    /// Drops all pending changes and starts over from `files`.
    pub fn reset(&mut self, files: &[String]) {
        self.existing = files.to_vec();
        self.pending_adds.clear();
        self.pending_deletes.clear();
    }

    pub fn existing(&self) -> &[String] {
        &self.existing
    }

    pub fn pending_adds(&self) -> &[FileUpload] {
        &self.pending_adds
    }

    pub fn pending_deletes(&self) -> &[String] {
        &self.pending_deletes
    }

    pub fn has_changes(&self) -> bool {
        !self.pending_adds.is_empty() || !self.pending_deletes.is_empty()
    }

    fn contains(&self, name: &str) -> bool {
        self.existing.iter().any(|existing| existing == name)
            || self.pending_adds.iter().any(|pending| pending.name == name)
    }

    /// Appends supported, not yet listed files in the order given.
    pub fn stage_add(&mut self, files: Vec<FileUpload>) -> StageReport {
        let mut report = StageReport::default();
        for file in files {
            if !ACCEPTED_MIME_TYPES.contains(&file.mime.as_str()) {
                report.unsupported.push(file.name);
            } else if self.contains(&file.name) {
                report.duplicates.push(file.name);
            } else {
                report.accepted.push(file.name.clone());
                self.pending_adds.push(file);
            }
        }
        report
    }

    /// Existing files move to the delete list, pending ones are dropped.
    pub fn stage_remove(&mut self, name: &str) -> bool {
        if let Some(index) = self.existing.iter().position(|existing| existing == name) {
            let removed = self.existing.remove(index);
            self.pending_deletes.push(removed);
            return true;
        }
        if let Some(index) = self.pending_adds.iter().position(|pending| pending.name == name) {
            self.pending_adds.remove(index);
            return true;
        }
        false
    }

    /// Removes the entry with the given display number.
    pub fn stage_remove_number(&mut self, number: usize) -> bool {
        let name = self
            .entries()
            .into_iter()
            .find(|entry| entry.number == number)
            .map(|entry| entry.name);
        match name {
            Some(name) => self.stage_remove(&name),
            None => false,
        }
    }

    pub fn entries(&self) -> Vec<StagedEntry> {
        let existing = self.existing.iter().map(|name| (name.clone(), false));
        let pending = self
            .pending_adds
            .iter()
            .map(|file| (file.name.clone(), true));
        existing
            .chain(pending)
            .enumerate()
            .map(|(i, (name, pending))| StagedEntry {
                number: i + 1,
                name,
                pending,
            })
            .collect()
    }

    pub fn submission(&self, agent_name: &str) -> FilesSubmission {
        FilesSubmission {
            agent_name: agent_name.to_string(),
            new_files: self.pending_adds.clone(),
            deleted_files: self.pending_deletes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn upload(name: &str) -> FileUpload {
        FileUpload {
            name: name.to_string(),
            mime: mime_for(name),
            bytes: name.as_bytes().to_vec(),
        }
    }

    fn names(list: &[String]) -> Vec<&str> {
        list.iter().map(String::as_str).collect()
    }

    #[test]
    fn guesses_mime_from_extension() {
        assert_eq!(mime_for("Report.PDF"), "application/pdf");
        assert_eq!(mime_for("notes.txt"), "text/plain");
        assert_eq!(mime_for("image.png"), "image/png");
        assert_eq!(mime_for("README"), "application/octet-stream");
    }

    #[test]
    fn plain_text_under_other_extensions_is_accepted() {
        for name in ["server.log", "readme.text", "app.conf"] {
            assert_eq!(mime_for(name), "text/plain", "{name}");
        }
        let mut staging = FileStaging::default();
        let report = staging.stage_add(vec![
            upload("server.log"),
            upload("readme.text"),
            upload("app.conf"),
            upload("photo.png"),
        ]);
        assert_eq!(report.accepted, vec!["server.log", "readme.text", "app.conf"]);
        assert_eq!(report.unsupported, vec!["photo.png"]);
    }

    #[test]
    fn second_copy_of_a_file_is_rejected() {
        let mut staging = FileStaging::default();
        let first = staging.stage_add(vec![upload("a.pdf")]);
        assert_eq!(first.warning(), None);
        let second = staging.stage_add(vec![upload("a.pdf")]);
        assert_eq!(second.duplicates, vec!["a.pdf"]);
        assert_eq!(second.warning(), Some(IGNORED_FILES_WARNING));
        assert_eq!(staging.pending_adds().len(), 1);
    }

    #[test]
    fn one_warning_for_mixed_rejections() {
        let mut staging = FileStaging::from_files(&[String::from("kept.pdf")]);
        let report = staging.stage_add(vec![
            upload("photo.png"),
            upload("kept.pdf"),
            upload("new.txt"),
            upload("new.txt"),
            upload("other.pdf"),
        ]);
        assert_eq!(report.accepted, vec!["new.txt", "other.pdf"]);
        assert_eq!(report.unsupported, vec!["photo.png"]);
        assert_eq!(report.duplicates, vec!["kept.pdf", "new.txt"]);
        assert_eq!(report.warning(), Some(IGNORED_FILES_WARNING));
    }

    #[test]
    fn names_never_repeat_across_lists() {
        let mut staging = FileStaging::from_files(&[String::from("a.pdf"), String::from("b.txt")]);
        for batch in [
            vec![upload("a.pdf"), upload("c.pdf")],
            vec![upload("c.pdf"), upload("b.txt"), upload("d.txt")],
            vec![upload("d.txt"), upload("d.txt")],
        ] {
            staging.stage_add(batch);
            let entries = staging.entries();
            let mut seen: Vec<&str> = entries.iter().map(|entry| entry.name.as_str()).collect();
            let total = seen.len();
            seen.sort();
            seen.dedup();
            assert_eq!(seen.len(), total);
        }
    }

    #[test]
    fn removing_existing_and_pending_files() {
        let mut staging = FileStaging::from_files(&[String::from("a.pdf"), String::from("b.txt")]);
        staging.stage_add(vec![upload("c.pdf")]);
        assert!(staging.stage_remove("a.pdf"));
        assert!(staging.stage_remove("c.pdf"));
        assert!(!staging.stage_remove("missing.pdf"));
        assert_eq!(names(staging.existing()), vec!["b.txt"]);
        assert_eq!(names(staging.pending_deletes()), vec!["a.pdf"]);
        assert!(staging.pending_adds().is_empty());
        assert!(staging.has_changes());
    }

    #[test]
    fn removed_existing_name_can_be_added_again() {
        let mut staging = FileStaging::from_files(&[String::from("a.pdf")]);
        staging.stage_remove("a.pdf");
        let report = staging.stage_add(vec![upload("a.pdf")]);
        assert_eq!(report.accepted, vec!["a.pdf"]);
    }

    #[test]
    fn numbering_continues_into_pending_files() {
        let mut staging = FileStaging::from_files(&[String::from("a.pdf"), String::from("b.txt")]);
        staging.stage_add(vec![upload("c.pdf")]);
        let entries = staging.entries();
        assert_eq!(
            entries,
            vec![
                StagedEntry { number: 1, name: String::from("a.pdf"), pending: false },
                StagedEntry { number: 2, name: String::from("b.txt"), pending: false },
                StagedEntry { number: 3, name: String::from("c.pdf"), pending: true },
            ]
        );
        assert!(staging.stage_remove_number(3));
        assert!(!staging.stage_remove_number(3));
    }

    #[test]
    fn reset_discards_pending_changes() {
        let files = vec![String::from("a.pdf")];
        let mut staging = FileStaging::from_files(&files);
        staging.stage_add(vec![upload("b.pdf")]);
        staging.stage_remove("a.pdf");
        staging.reset(&files);
        assert_eq!(staging, FileStaging::from_files(&files));
        assert!(!staging.has_changes());
    }

    #[test]
    fn submission_carries_uploads_and_deletions() {
        let mut staging = FileStaging::from_files(&[String::from("old.txt")]);
        staging.stage_add(vec![upload("new.pdf")]);
        staging.stage_remove("old.txt");
        let submission = staging.submission("support-bot");
        assert_eq!(submission.agent_name, "support-bot");
        assert_eq!(submission.new_files[0].name, "new.pdf");
        assert_eq!(submission.deleted_files, vec!["old.txt"]);
    }

    #[tokio::test]
    async fn reads_candidates_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("guide.txt");
        fs::write(&path, b"hello").unwrap();
        let candidate = read_candidate(&path).await.unwrap();
        assert_eq!(candidate.name, "guide.txt");
        assert_eq!(candidate.mime, "text/plain");
        assert_eq!(candidate.bytes, b"hello");
        assert!(read_candidate(&dir.path().join("missing.pdf")).await.is_err());
    }
}
