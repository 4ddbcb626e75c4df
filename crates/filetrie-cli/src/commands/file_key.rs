//! `filetrie file-key`.

use std::fmt;
use std::path::Path;

use anyhow::Context;
use filetrie_crypto::encoding::to_prefixed_hex;
use filetrie_storage::{engine, ByteSource, FileMetadata, FileSource};
use filetrie_types::{BucketId, FileKey};
use serde::Serialize;

use super::emit;
use crate::config::OutputFormat;

#[derive(Debug, Serialize)]
pub struct FileKeyReport {
    pub file_key: FileKey,
    #[serde(flatten)]
    pub metadata: FileMetadata,
}

impl fmt::Display for FileKeyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.metadata;
        writeln!(f, "owner:       {}", to_prefixed_hex(&m.owner))?;
        writeln!(f, "bucket_id:   {}", m.bucket_id)?;
        writeln!(f, "location:    {}", String::from_utf8_lossy(&m.location))?;
        writeln!(f, "file_size:   {}", m.file_size)?;
        writeln!(f, "fingerprint: {}", m.fingerprint)?;
        write!(f, "file_key:    {}", self.file_key)
    }
}

/// Decode a hex owner, with or without a `0x` prefix.
pub fn parse_owner(owner: &str) -> anyhow::Result<Vec<u8>> {
    let digits = owner
        .strip_prefix("0x")
        .or_else(|| owner.strip_prefix("0X"))
        .unwrap_or(owner);
    hex::decode(digits).context("owner must be hex")
}

/// Fingerprint `path` and derive its file key.
pub async fn run(
    owner: &str,
    bucket_id: BucketId,
    location: &str,
    path: &Path,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let owner = parse_owner(owner)?;
    let engine = engine().await?;

    let source = FileSource::new(path)
        .await
        .with_context(|| format!("cannot open {}", path.display()))?;
    let fingerprint = engine.fingerprint(&source).await?;

    let metadata = FileMetadata::new(
        owner,
        bucket_id,
        location.as_bytes().to_vec(),
        source.size(),
        fingerprint,
    );
    let file_key = engine.file_key(&metadata)?;

    emit(format, &FileKeyReport { file_key, metadata })
}
